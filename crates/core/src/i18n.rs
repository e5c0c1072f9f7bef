//! Static bilingual dictionary.
//!
//! Lookups never fail: a key missing from the dictionary (or mapped to an
//! empty string) translates to the key itself.

use crate::language::Language;

/// `(key, english, arabic)` rows.
const ENTRIES: &[(&str, &str, &str)] = &[
    // Navigation
    ("home", "Home", "الرئيسية"),
    ("portfolio", "Portfolio", "المشاريع"),
    ("about", "About", "من نحن"),
    ("services", "Services", "الخدمات"),
    ("contact", "Contact", "اتصل بنا"),
    // Hero
    ("brandName", "BEYOND BASIC", "بيوند بيسيك"),
    (
        "tagline",
        "Interior Design - Architecture - Execution",
        "تصميم داخلي - معماري - تنفيذ",
    ),
    (
        "heroSubtitle",
        "Transforming spaces into timeless luxury environments",
        "نحول المساحات إلى بيئات فاخرة خالدة",
    ),
    ("viewProjects", "View Projects", "عرض المشاريع"),
    // Services
    ("servicesTitle", "Our Services", "خدماتنا"),
    (
        "serviceDescription",
        "Tailored design solutions for your space.",
        "حلول تصميم مصممة خصيصاً لمساحتك.",
    ),
    ("serviceNotFound", "Service Not Found", "الخدمة غير موجودة"),
    ("backToServices", "Back to Services", "العودة إلى الخدمات"),
    // About
    ("aboutTitle", "About BEYOND BASIC", "عن بيوند بيسيك"),
    (
        "aboutText",
        "We are a luxury interior design firm based in Kuwait, specializing in creating timeless, sophisticated spaces that go beyond the ordinary.",
        "نحن شركة تصميم داخلي فاخرة مقرها الكويت، متخصصة في إنشاء مساحات خالدة ومتطورة تتجاوز المألوف.",
    ),
    // Projects
    ("projectsTitle", "Featured Projects", "مشاريع مميزة"),
    ("viewProject", "View Project", "عرض المشروع"),
    (
        "portfolioSubtitle",
        "Explore our collection of luxury interior design projects",
        "استكشف مجموعتنا من مشاريع التصميم الداخلي الفاخرة",
    ),
    ("latestProjects", "Our Latest Projects", "أحدث مشاريعنا"),
    ("noImages", "No images uploaded yet.", "لا توجد صور بعد."),
    // Contact
    ("getInTouch", "Get In Touch", "تواصل معنا"),
    (
        "contactDescription",
        "Tell us about your space and we will bring it to life.",
        "حدثنا عن مساحتك وسنحولها إلى واقع.",
    ),
    ("email", "Email", "البريد الإلكتروني"),
    ("phone", "Phone", "الهاتف"),
    ("location", "Location", "الموقع"),
    ("kuwaitCity", "Kuwait , Hawalli", "مدينة الكويت، الكويت"),
    ("followUs", "Follow Us", "تابعنا"),
    // Page states
    ("loading", "Loading...", "جاري التحميل..."),
    (
        "loadError",
        "Something went wrong while loading this page.",
        "حدث خطأ أثناء تحميل هذه الصفحة.",
    ),
    // Footer
    (
        "footerTagline",
        "Luxury Interior Design, Architecture & Execution in Kuwait",
        "تصميم داخلي فاخر، هندسة معمارية، وتنفيذ في الكويت",
    ),
    ("rights", "All rights reserved.", "جميع الحقوق محفوظة."),
];

/// Look up `key` without falling back.
pub fn lookup(language: Language, key: &str) -> Option<&'static str> {
    ENTRIES
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, en, ar)| match language {
            Language::En => *en,
            Language::Ar => *ar,
        })
        .filter(|s| !s.is_empty())
}

/// Translate `key`, falling back to the key itself.
pub fn t(language: Language, key: &str) -> &str {
    lookup(language, key).unwrap_or(key)
}

/// Every `(key, translation)` pair for one language, in dictionary order.
pub fn entries(language: Language) -> impl Iterator<Item = (&'static str, &'static str)> {
    ENTRIES.iter().map(move |(k, en, ar)| match language {
        Language::En => (*k, *en),
        Language::Ar => (*k, *ar),
    })
}

/// Browser document title for the whole site.
pub fn document_title(language: Language) -> &'static str {
    match language {
        Language::En => "BEYOND BASIC | Luxury Interior Design Kuwait",
        Language::Ar => "بيوند بيسيك | تصميم داخلي فاخر في الكويت",
    }
}

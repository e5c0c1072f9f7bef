//! Bilingual field selection.
//!
//! Records expose their bilingual pairs through an explicit accessor table
//! ([`Bilingual::pair`]) instead of attribute names built at runtime, so a
//! renamed or irregular column is a compile error rather than a blank page.

use crate::i18n;
use crate::language::Language;

/// One bilingual attribute pair on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair<'a> {
    pub en: Option<&'a str>,
    pub ar: Option<&'a str>,
}

impl<'a> Pair<'a> {
    pub fn new(en: &'a Option<String>, ar: &'a Option<String>) -> Self {
        Self {
            en: en.as_deref(),
            ar: ar.as_deref(),
        }
    }

    pub fn get(&self, language: Language) -> Option<&'a str> {
        match language {
            Language::En => self.en,
            Language::Ar => self.ar,
        }
    }
}

/// A record with bilingual fields.
pub trait Bilingual {
    /// The record's bilingual fields.
    type Field: Copy;

    /// Accessor table: both language values of `field`.
    fn pair(&self, field: Self::Field) -> Pair<'_>;

    /// Dictionary key used when the record has no usable value.
    fn fallback_key(field: Self::Field) -> &'static str;
}

/// Pick the display string for `field` in `language`.
///
/// Order: the record's value (if not blank), then the dictionary entry for
/// the field's fallback key, then the fallback key itself.
pub fn select<R: Bilingual>(record: &R, field: R::Field, language: Language) -> String {
    if let Some(value) = record.pair(field).get(language) {
        if !value.trim().is_empty() {
            return value.to_string();
        }
    }
    let key = R::fallback_key(field);
    i18n::t(language, key).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Card {
        en_title: Option<String>,
        ar_title: Option<String>,
        en_note: Option<String>,
        ar_note: Option<String>,
    }

    #[derive(Clone, Copy)]
    enum CardField {
        Title,
        Note,
    }

    impl Bilingual for Card {
        type Field = CardField;

        fn pair(&self, field: CardField) -> Pair<'_> {
            match field {
                CardField::Title => Pair::new(&self.en_title, &self.ar_title),
                CardField::Note => Pair::new(&self.en_note, &self.ar_note),
            }
        }

        fn fallback_key(field: CardField) -> &'static str {
            match field {
                CardField::Title => "brandName",
                CardField::Note => "cardNote",
            }
        }
    }

    fn card() -> Card {
        Card {
            en_title: Some("Villa".into()),
            ar_title: Some("فيلا".into()),
            en_note: None,
            ar_note: Some("   ".into()),
        }
    }

    #[test]
    fn picks_attribute_for_language() {
        let c = card();
        assert_eq!(select(&c, CardField::Title, Language::En), "Villa");
        assert_eq!(select(&c, CardField::Title, Language::Ar), "فيلا");
    }

    #[test]
    fn missing_attribute_uses_dictionary() {
        let mut c = card();
        c.ar_title = None;
        assert_eq!(select(&c, CardField::Title, Language::Ar), "بيوند بيسيك");
    }

    #[test]
    fn blank_attribute_and_no_dictionary_entry_returns_key() {
        let c = card();
        assert_eq!(select(&c, CardField::Note, Language::En), "cardNote");
        assert_eq!(select(&c, CardField::Note, Language::Ar), "cardNote");
    }

    #[test]
    fn never_empty_for_either_language() {
        let empty = Card {
            en_title: Some(String::new()),
            ar_title: None,
            en_note: None,
            ar_note: None,
        };
        for lang in Language::ALL {
            for field in [CardField::Title, CardField::Note] {
                assert!(!select(&empty, field, lang).is_empty());
            }
        }
    }

    #[test]
    fn does_not_mutate_record() {
        let c = card();
        let before = (c.en_title.clone(), c.ar_note.clone());
        let _ = select(&c, CardField::Note, Language::Ar);
        assert_eq!(before, (c.en_title.clone(), c.ar_note.clone()));
    }
}

//! Image reference resolution.
//!
//! A stored image reference is either a full URL (legacy rows) or an object
//! key inside a storage bucket. Both forms resolve to a fetchable URL with a
//! cache-busting suffix; a missing reference resolves to the placeholder.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use regex::Regex;

/// Shown wherever a record has no image.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Query parameter carrying the cache-buster.
const CACHE_BUST_PARAM: &str = "t";

/// Buckets known to the site.
pub mod buckets {
    pub const HERO: &str = "hero-images";
    pub const SERVICES: &str = "services-images";
    pub const PROJECTS: &str = "project-images";
    pub const AUTOSCROLL: &str = "autoscroll-gallery";

    pub const ALL: [&str; 4] = [HERO, SERVICES, PROJECTS, AUTOSCROLL];

    pub fn is_known(bucket: &str) -> bool {
        ALL.contains(&bucket)
    }
}

/// Computes the public URL of an object. Implemented by the object store.
pub trait PublicUrlSource: Send + Sync {
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Turns stored image references into display URLs.
#[derive(Clone)]
pub struct ImageResolver {
    urls: Arc<dyn PublicUrlSource>,
    last_stamp: Arc<AtomicI64>,
}

impl ImageResolver {
    pub fn new(urls: Arc<dyn PublicUrlSource>) -> Self {
        Self {
            urls,
            last_stamp: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Resolve `raw` against `bucket`.
    pub fn resolve(&self, raw: Option<&str>, bucket: &str) -> String {
        let raw = match raw.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => return PLACEHOLDER_IMAGE.to_string(),
        };

        let base = if is_absolute_url(raw) {
            raw.to_string()
        } else {
            self.urls.public_url(bucket, raw)
        };
        self.with_cache_buster(&base)
    }

    /// Append `t=<stamp>` to `url`, choosing `?` or `&`.
    pub fn with_cache_buster(&self, url: &str) -> String {
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{url}{sep}{CACHE_BUST_PARAM}={}", self.next_stamp())
    }

    /// Wall-clock millis, bumped when needed so every stamp is unique.
    fn next_stamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut prev = self.last_stamp.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_stamp.compare_exchange_weak(
                prev,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

fn is_absolute_url(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

/// Recover an object key from a public URL pointing into `bucket`.
///
/// Any query string is dropped and the key is percent-decoded, so the
/// result matches the name the object was stored under. Returns `None`
/// when the URL does not reference the bucket.
pub fn object_key_from_url(url: &str, bucket: &str) -> Option<String> {
    let pattern = format!("{}/(.+)$", regex::escape(bucket));
    let re = Regex::new(&pattern).ok()?;
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let encoded = re.captures(path)?.get(1)?.as_str();
    let key = match urlencoding::decode(encoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => encoded.to_string(),
    };
    Some(key).filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeStorage;

    impl PublicUrlSource for FakeStorage {
        fn public_url(&self, bucket: &str, key: &str) -> String {
            format!("https://cdn.test/storage/v1/object/public/{bucket}/{key}")
        }
    }

    fn resolver() -> ImageResolver {
        ImageResolver::new(Arc::new(FakeStorage))
    }

    #[test]
    fn blank_reference_is_placeholder() {
        let r = resolver();
        assert_eq!(r.resolve(None, buckets::HERO), PLACEHOLDER_IMAGE);
        assert_eq!(r.resolve(Some(""), buckets::HERO), PLACEHOLDER_IMAGE);
        assert_eq!(r.resolve(Some("   "), buckets::HERO), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn absolute_url_keeps_prefix() {
        let r = resolver();
        let url = r.resolve(Some("https://img.test/a.jpg"), buckets::HERO);
        assert!(url.starts_with("https://img.test/a.jpg?t="));

        let url = r.resolve(Some("http://img.test/a.jpg?w=200"), buckets::HERO);
        assert!(url.starts_with("http://img.test/a.jpg?w=200&t="));
    }

    #[test]
    fn object_key_goes_through_bucket() {
        let r = resolver();
        let url = r.resolve(Some("living/room.jpg"), buckets::SERVICES);
        assert!(url.starts_with(
            "https://cdn.test/storage/v1/object/public/services-images/living/room.jpg?t="
        ));
    }

    #[test]
    fn cache_buster_never_repeats() {
        let r = resolver();
        let a = r.resolve(Some("x.jpg"), buckets::HERO);
        let b = r.resolve(Some("x.jpg"), buckets::HERO);
        assert_ne!(a, b);

        let stamps: Vec<i64> = (0..100).map(|_| r.next_stamp()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn key_recovered_from_public_url() {
        let url = "https://x.supabase.co/storage/v1/object/public/hero-images/hero-1700000000000.jpg?t=5";
        assert_eq!(
            object_key_from_url(url, buckets::HERO).as_deref(),
            Some("hero-1700000000000.jpg")
        );
        assert_eq!(object_key_from_url("https://elsewhere.test/a.jpg", buckets::HERO), None);
    }

    #[test]
    fn encoded_key_is_decoded() {
        let url = "https://x.supabase.co/storage/v1/object/public/hero-images/hero-1-my%20photo.jpg?t=9";
        assert_eq!(
            object_key_from_url(url, buckets::HERO).as_deref(),
            Some("hero-1-my photo.jpg")
        );

        let url = "https://x.supabase.co/storage/v1/object/public/hero-images/%D8%B5%D9%88%D8%B1%D8%A9.jpg";
        assert_eq!(object_key_from_url(url, buckets::HERO).as_deref(), Some("صورة.jpg"));
    }

    #[test]
    fn known_buckets() {
        assert!(buckets::is_known("project-images"));
        assert!(!buckets::is_known("secrets"));
    }
}

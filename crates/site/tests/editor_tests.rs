//! ContentEditor writes against the in-memory stores.

mod common;

use std::sync::Mutex;
use std::time::Duration;

use assert_matches::assert_matches;
use beyond_core::content::{
    AboutUpdate, ContactInput, HeroInput, ServiceInput, ServiceUpdate,
};
use beyond_core::error::CoreError;
use beyond_core::media::buckets;
use beyond_events::ChangeKind;
use beyond_site::editor::{UploadFile, UploadProgress};
use beyond_site::{Gallery, SiteError};
use beyond_store::{ObjectStorage, UploadOptions};
use common::{fixture, png, public_url};
use serde_json::json;

fn file(name: &str) -> UploadFile {
    UploadFile {
        name: name.to_string(),
        bytes: png(40, 30),
    }
}

fn service_input(en_title: &str) -> ServiceInput {
    ServiceInput {
        slug: None,
        en_title: en_title.to_string(),
        ar_title: "خدمة".to_string(),
        en_description: Some("Full service".to_string()),
        ar_description: None,
        image_url: "living.jpg".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Test: singleton saves update the latest row or create the first
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_hero_inserts_first_row() {
    let fx = fixture();
    let hero = fx
        .editor
        .save_hero(HeroInput {
            en_title: Some("Beyond".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(hero.en_title.as_deref(), Some("Beyond"));
    assert_eq!(fx.store.rows("hero_content").await.len(), 1);
}

#[tokio::test]
async fn save_hero_updates_latest_row_only() {
    let fx = fixture();
    fx.store
        .seed(
            "hero_content",
            [
                json!({ "id": 1, "en_title": "Old" }),
                json!({ "id": 4, "en_title": "Current", "ar_title": "حالي" }),
            ],
        )
        .await;

    let hero = fx
        .editor
        .save_hero(HeroInput {
            en_title: Some("Updated".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(hero.id, 4);
    assert_eq!(hero.en_title.as_deref(), Some("Updated"));
    assert_eq!(hero.ar_title.as_deref(), Some("حالي"));
    let rows = fx.store.rows("hero_content").await;
    assert_eq!(rows[0]["en_title"], "Old");
}

#[tokio::test]
async fn save_contact_rejects_bad_email() {
    let fx = fixture();
    let result = fx
        .editor
        .save_contact(ContactInput {
            email: Some("nope".into()),
            ..Default::default()
        })
        .await;
    assert_matches!(result, Err(SiteError::Core(CoreError::Validation(_))));
    assert!(fx.store.rows("contact_content").await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: writes publish change events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn write_publishes_change_event() {
    let fx = fixture();
    let mut sub = fx.bus.subscribe("test-contact", "contact_content").unwrap();

    fx.editor
        .save_contact(ContactInput {
            phone: Some("+965 1234".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.table, "contact_content");
    assert_eq!(event.kind, ChangeKind::Insert);
}

// ---------------------------------------------------------------------------
// Test: about sections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_missing_about_section_is_not_found() {
    let fx = fixture();
    let result = fx
        .editor
        .update_about(
            42,
            AboutUpdate {
                en_heading: "Who".into(),
                ar_heading: "من".into(),
                en_text: String::new(),
                ar_text: String::new(),
            },
        )
        .await;
    assert_matches!(result, Err(SiteError::Core(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn update_about_keeps_section_key() {
    let fx = fixture();
    fx.store
        .seed("about_content", [json!({ "id": 2, "section_key": "story" })])
        .await;
    let section = fx
        .editor
        .update_about(
            2,
            AboutUpdate {
                en_heading: "Our Story".into(),
                ar_heading: "قصتنا".into(),
                en_text: "Since 2015".into(),
                ar_text: "منذ ٢٠١٥".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(section.section_key.as_deref(), Some("story"));
    assert_eq!(section.en_heading.as_deref(), Some("Our Story"));
}

// ---------------------------------------------------------------------------
// Test: service slugs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_service_derives_slug() {
    let fx = fixture();
    let service = fx
        .editor
        .create_service(service_input("Interior Design"))
        .await
        .unwrap();
    assert_eq!(service.slug, "interior-design");
}

#[tokio::test]
async fn duplicate_slug_is_conflict() {
    let fx = fixture();
    fx.editor
        .create_service_detail(service_input("Landscape"))
        .await
        .unwrap();
    let result = fx
        .editor
        .create_service_detail(service_input("Landscape"))
        .await;
    assert_matches!(result, Err(SiteError::Core(CoreError::Conflict(_))));

    // Slugs are unique per table, not across tables.
    fx.editor
        .create_service(service_input("Landscape"))
        .await
        .unwrap();
}

#[tokio::test]
async fn explicit_slug_is_validated() {
    let fx = fixture();
    let mut input = service_input("Fit Out");
    input.slug = Some("Fit Out".into());
    let result = fx.editor.create_service(input).await;
    assert_matches!(result, Err(SiteError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn update_service_may_keep_its_own_slug() {
    let fx = fixture();
    let created = fx
        .editor
        .create_service(service_input("Execution"))
        .await
        .unwrap();
    let updated = fx
        .editor
        .update_service(
            created.id,
            ServiceUpdate {
                slug: Some("execution".into()),
                en_title: Some("Execution & Delivery".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.en_title.as_deref(), Some("Execution & Delivery"));
}

#[tokio::test]
async fn delete_service_twice_is_not_found() {
    let fx = fixture();
    let created = fx
        .editor
        .create_service(service_input("Consulting"))
        .await
        .unwrap();
    fx.editor.delete_service(created.id).await.unwrap();
    assert_matches!(
        fx.editor.delete_service(created.id).await,
        Err(SiteError::Core(CoreError::NotFound { .. }))
    );
}

// ---------------------------------------------------------------------------
// Test: hero image replacement
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replace_hero_image_swaps_objects() {
    let fx = fixture();
    fx.storage
        .upload(buckets::HERO, "hero-1-old.jpg", vec![1, 2, 3], &Default::default())
        .await
        .unwrap();
    fx.store
        .seed(
            "hero_content",
            [json!({ "id": 1, "hero_image": public_url(buckets::HERO, "hero-1-old.jpg") })],
        )
        .await;

    let hero = fx.editor.replace_hero_image(file("Banner.png")).await.unwrap();

    let keys = fx.storage.keys(buckets::HERO).await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("hero-"));
    assert!(keys[0].ends_with("-Banner.jpg"));
    assert_eq!(
        hero.hero_image.as_deref(),
        Some(public_url(buckets::HERO, &keys[0]).as_str())
    );
}

#[tokio::test]
async fn replace_hero_image_removes_object_behind_encoded_url() {
    let fx = fixture();
    fx.storage
        .upload(buckets::HERO, "hero-1-my photo.jpg", vec![1, 2, 3], &Default::default())
        .await
        .unwrap();
    fx.store
        .seed(
            "hero_content",
            [json!({ "id": 1, "hero_image": public_url(buckets::HERO, "hero-1-my%20photo.jpg") })],
        )
        .await;

    fx.editor.replace_hero_image(file("next.png")).await.unwrap();

    let keys = fx.storage.keys(buckets::HERO).await;
    assert_eq!(keys.len(), 1);
    assert!(!keys.iter().any(|k| k == "hero-1-my photo.jpg"));
}

#[tokio::test]
async fn replace_hero_image_without_row_inserts_one() {
    let fx = fixture();
    let hero = fx.editor.replace_hero_image(file("a.png")).await.unwrap();
    assert!(hero.hero_image.is_some());
    assert_eq!(fx.store.rows("hero_content").await.len(), 1);
}

#[tokio::test]
async fn unreadable_hero_image_uploads_nothing() {
    let fx = fixture();
    let result = fx
        .editor
        .replace_hero_image(UploadFile {
            name: "x.png".into(),
            bytes: b"not an image".to_vec(),
        })
        .await;
    assert_matches!(result, Err(SiteError::Core(CoreError::Validation(_))));
    assert!(fx.storage.keys(buckets::HERO).await.is_empty());
}

// ---------------------------------------------------------------------------
// Test: gallery batch uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn portfolio_upload_records_trigger_rows() {
    let fx = fixture();
    let seen = Mutex::new(Vec::new());

    let uploaded = fx
        .editor
        .upload_gallery(
            Gallery::Portfolio,
            vec![file("one.png"), file("two.png")],
            |p| seen.lock().unwrap().push(p),
        )
        .await
        .unwrap();

    assert_eq!(uploaded.len(), 2);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            UploadProgress { uploaded: 1, total: 2 },
            UploadProgress { uploaded: 2, total: 2 },
        ]
    );
    let rows = fx.store.rows("portfolio").await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["image_url"], uploaded[0].url.as_str());
}

#[tokio::test]
async fn autoscroll_upload_writes_no_rows() {
    let fx = fixture();
    fx.editor
        .upload_gallery(Gallery::Autoscroll, vec![file("wide.png")], |_| {})
        .await
        .unwrap();
    assert_eq!(fx.storage.keys(buckets::AUTOSCROLL).await.len(), 1);
    assert!(fx.store.rows("autoscroll_gallery").await.is_empty());
}

#[tokio::test]
async fn batch_stops_at_first_failure() {
    let fx = fixture();
    fx.storage.fail_uploads_matching(Some("broken"));

    let result = fx
        .editor
        .upload_gallery(
            Gallery::Portfolio,
            vec![file("ok.png"), file("broken.png"), file("never.png")],
            |_| {},
        )
        .await;

    assert_matches!(
        result,
        Err(SiteError::UploadFailed { uploaded, failed_file, .. }) => {
            assert_eq!(uploaded.len(), 1);
            assert_eq!(failed_file, "broken.png");
        }
    );
    let keys = fx.storage.keys(buckets::PROJECTS).await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].ends_with("-ok.jpg"));
}

#[tokio::test]
async fn delete_portfolio_image_removes_trigger_row() {
    let fx = fixture();
    let uploaded = fx
        .editor
        .upload_gallery(Gallery::Portfolio, vec![file("gone.png")], |_| {})
        .await
        .unwrap();

    fx.editor
        .delete_gallery_image(Gallery::Portfolio, &uploaded[0].key)
        .await
        .unwrap();

    assert!(fx.storage.keys(buckets::PROJECTS).await.is_empty());
    assert!(fx.store.rows("portfolio").await.is_empty());
    assert_matches!(
        fx.editor
            .delete_gallery_image(Gallery::Portfolio, &uploaded[0].key)
            .await,
        Err(SiteError::Core(CoreError::NotFound { .. }))
    );
}

#[tokio::test]
async fn failed_row_insert_removes_uploaded_object() {
    let fx = fixture();
    fx.store.set_unavailable(true);

    let result = fx
        .editor
        .upload_gallery(Gallery::Portfolio, vec![file("orphan.png")], |_| {})
        .await;

    assert_matches!(
        result,
        Err(SiteError::UploadFailed { uploaded, failed_file, .. }) => {
            assert!(uploaded.is_empty());
            assert_eq!(failed_file, "orphan.png");
        }
    );
    assert!(fx.storage.keys(buckets::PROJECTS).await.is_empty());
    fx.store.set_unavailable(false);
    assert!(fx.store.rows("portfolio").await.is_empty());
}

#[tokio::test]
async fn delete_matches_rows_with_encoded_url() {
    let fx = fixture();
    fx.storage
        .upload(buckets::PROJECTS, "my photo.jpg", vec![1], &Default::default())
        .await
        .unwrap();
    fx.store
        .seed(
            "portfolio",
            [
                json!({ "id": 1, "image_url": public_url(buckets::PROJECTS, "my%20photo.jpg") }),
                json!({ "id": 2, "image_url": public_url(buckets::PROJECTS, "other.jpg") }),
            ],
        )
        .await;

    fx.editor
        .delete_gallery_image(Gallery::Portfolio, "my photo.jpg")
        .await
        .unwrap();

    let rows = fx.store.rows("portfolio").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 2);
}

#[tokio::test]
async fn delete_finds_image_beyond_first_listing_page() {
    let fx = fixture();
    let opts = UploadOptions::default();
    for i in 0..1000 {
        fx.storage
            .upload(buckets::AUTOSCROLL, &format!("a-{i:04}.jpg"), vec![0], &opts)
            .await
            .unwrap();
    }
    fx.storage
        .upload(buckets::AUTOSCROLL, "z-last.jpg", vec![0], &opts)
        .await
        .unwrap();

    fx.editor
        .delete_gallery_image(Gallery::Autoscroll, "z-last.jpg")
        .await
        .unwrap();

    let keys = fx.storage.keys(buckets::AUTOSCROLL).await;
    assert_eq!(keys.len(), 1000);
    assert!(!keys.iter().any(|k| k == "z-last.jpg"));
}

#[tokio::test]
async fn upload_to_unknown_bucket_is_rejected() {
    let fx = fixture();
    let result = fx.editor.upload_image("secrets", file("a.png")).await;
    assert_matches!(result, Err(SiteError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn service_image_upload_returns_public_url() {
    let fx = fixture();
    let image = fx
        .editor
        .upload_image(buckets::SERVICES, file("kitchen.png"))
        .await
        .unwrap();
    assert_eq!(image.bucket, buckets::SERVICES);
    assert_eq!(image.url, public_url(buckets::SERVICES, &image.key));
    assert!(fx.storage.bytes(buckets::SERVICES, &image.key).await.is_some());
}

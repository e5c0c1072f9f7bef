//! Shared fixtures for site tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use beyond_core::media::ImageResolver;
use beyond_events::ChangeBus;
use beyond_site::{ContentEditor, SiteContent};
use beyond_store::memory::{MemoryDataStore, MemoryObjectStorage};
use beyond_store::ContentFetcher;
use image::{ImageFormat, RgbImage};

pub const STORAGE_BASE: &str = "http://storage.test";

pub struct Fixture {
    pub store: Arc<MemoryDataStore>,
    pub storage: Arc<MemoryObjectStorage>,
    pub bus: Arc<ChangeBus>,
    pub content: SiteContent,
    pub editor: ContentEditor,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryDataStore::new());
    let storage = Arc::new(MemoryObjectStorage::new(STORAGE_BASE));
    let bus = Arc::new(ChangeBus::default());
    let fetcher = ContentFetcher::new(store.clone());
    let images = ImageResolver::new(storage.clone());
    let content = SiteContent::new(fetcher.clone(), storage.clone(), images);
    let editor = ContentEditor::new(fetcher, storage.clone(), bus.clone());
    Fixture {
        store,
        storage,
        bus,
        content,
        editor,
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 90])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn public_url(bucket: &str, key: &str) -> String {
    format!("{STORAGE_BASE}/storage/v1/object/public/{bucket}/{key}")
}

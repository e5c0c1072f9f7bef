//! Upload-time image compression and object naming.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::CoreError;

/// Longest edge after downscaling.
pub const MAX_DIMENSION: u32 = 1920;

/// Target upper bound for an encoded upload.
pub const MAX_ENCODED_BYTES: usize = 512 * 1024;

const INITIAL_QUALITY: u8 = 70;
const QUALITY_STEP: u8 = 10;
const MIN_QUALITY: u8 = 30;

/// A compressed image ready for upload.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl CompressedImage {
    pub const CONTENT_TYPE: &'static str = "image/jpeg";
}

/// Decode `input`, downscale it to fit [`MAX_DIMENSION`] and re-encode as
/// JPEG, lowering quality until the output fits [`MAX_ENCODED_BYTES`] or
/// the quality floor is reached.
///
/// CPU-bound; run it on the blocking pool from async code.
pub fn compress(input: &[u8]) -> Result<CompressedImage, CoreError> {
    let decoded = image::load_from_memory(input)
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;

    let (w, h) = decoded.dimensions();
    let resized = if w > MAX_DIMENSION || h > MAX_DIMENSION {
        decoded.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        decoded
    };
    let rgb = resized.to_rgb8();

    let mut quality = INITIAL_QUALITY;
    loop {
        let bytes = encode_jpeg(&rgb, quality)?;
        if bytes.len() <= MAX_ENCODED_BYTES || quality <= MIN_QUALITY {
            return Ok(CompressedImage {
                bytes,
                width: rgb.width(),
                height: rgb.height(),
                quality,
            });
        }
        quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
    }
}

fn encode_jpeg(rgb: &image::RgbImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(rgb)
        .map_err(|e| CoreError::Internal(format!("JPEG encode failed: {e}")))?;
    Ok(out.into_inner())
}

/// Object key for an upload: `<prefix><millis>-<stem>.jpg`.
///
/// The stem keeps ASCII alphanumerics, `-` and `_`; everything else becomes
/// `-`. An empty stem becomes `image`.
pub fn object_key(prefix: &str, original_name: &str, millis: i64) -> String {
    let stem = original_name
        .rsplit_once('.')
        .map(|(s, _)| s)
        .unwrap_or(original_name);
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('-');
    let stem = if cleaned.is_empty() { "image" } else { cleaned };
    format!("{prefix}{millis}-{stem}.jpg")
}

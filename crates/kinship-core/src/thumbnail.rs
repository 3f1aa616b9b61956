//! # Thumbnail Derivation
//!
//! Decodes an uploaded image asset and produces a bounded-dimension
//! preview, decoupling large binary originals (kept in the blob
//! collection) from the lightweight record used for listing and graph
//! rendering.
//!
//! The transform is pure and single-shot: decode, measure, shrink to a
//! maximum edge of [`THUMBNAIL_MAX_EDGE`] preserving aspect ratio,
//! re-encode as JPEG, and return a base64 data URL suitable for inline
//! embedding. Unreadable bytes surface as `DecodeFailure`; no fallback
//! image is ever substituted.

use crate::schema::THUMBNAIL_MAX_EDGE;
use crate::types::KinshipError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::io::Cursor;

/// JPEG re-encode quality for derived previews.
const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// Compute the bounded-box target dimensions for a thumbnail.
///
/// Shrink-only: if both edges are already within the cap the input
/// dimensions pass through unchanged. Otherwise both edges scale by the
/// same factor, rounded to the nearest pixel (never below 1), so the
/// aspect ratio is preserved to within rounding.
#[must_use]
pub fn bounded_dimensions(width: u32, height: u32) -> (u32, u32) {
    let max_edge = width.max(height);
    if max_edge <= THUMBNAIL_MAX_EDGE {
        return (width, height);
    }
    let scale = |edge: u32| -> u32 {
        let scaled =
            (u64::from(edge) * u64::from(THUMBNAIL_MAX_EDGE) + u64::from(max_edge) / 2)
                / u64::from(max_edge);
        (scaled as u32).max(1)
    };
    (scale(width), scale(height))
}

/// Derive an inline-embeddable thumbnail from raw image bytes.
///
/// Returns a `data:image/jpeg;base64,…` string bounded to
/// [`THUMBNAIL_MAX_EDGE`] on its longest edge.
pub fn create_thumbnail(bytes: &[u8]) -> Result<String, KinshipError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| KinshipError::DecodeFailure(e.to_string()))?;

    let (width, height) = (decoded.width(), decoded.height());
    let (target_width, target_height) = bounded_dimensions(width, height);
    let preview = if (target_width, target_height) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(target_width, target_height, FilterType::Triangle)
    };

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), THUMBNAIL_JPEG_QUALITY);
    preview
        .write_with_encoder(encoder)
        .map_err(|e| KinshipError::DecodeFailure(e.to_string()))?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    /// Encode a flat-color PNG of the given size.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([40, 80, 120]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    /// Decode a data URL back into an image to measure it.
    fn decode_data_url(data_url: &str) -> image::DynamicImage {
        let encoded = data_url
            .strip_prefix("data:image/jpeg;base64,")
            .expect("data url prefix");
        let jpeg = BASE64.decode(encoded).expect("base64");
        image::load_from_memory(&jpeg).expect("decode jpeg")
    }

    #[test]
    fn large_landscape_bounded_to_max_edge() {
        let thumb = decode_data_url(&create_thumbnail(&png_bytes(800, 600)).expect("thumbnail"));
        assert_eq!((thumb.width(), thumb.height()), (200, 150));
    }

    #[test]
    fn large_portrait_bounded_to_max_edge() {
        let thumb = decode_data_url(&create_thumbnail(&png_bytes(300, 900)).expect("thumbnail"));
        assert_eq!((thumb.width(), thumb.height()), (67, 200));
    }

    #[test]
    fn small_image_keeps_dimensions() {
        let thumb = decode_data_url(&create_thumbnail(&png_bytes(120, 80)).expect("thumbnail"));
        assert_eq!((thumb.width(), thumb.height()), (120, 80));
    }

    #[test]
    fn corrupt_bytes_surface_decode_failure() {
        let err = create_thumbnail(b"not an image").expect_err("must fail");
        assert!(matches!(err, KinshipError::DecodeFailure(_)));
    }

    #[test]
    fn bounded_dimensions_shrink_only() {
        assert_eq!(bounded_dimensions(200, 200), (200, 200));
        assert_eq!(bounded_dimensions(100, 50), (100, 50));
        assert_eq!(bounded_dimensions(400, 400), (200, 200));
        assert_eq!(bounded_dimensions(1000, 10), (200, 2));
        // Extreme ratios never collapse an edge to zero.
        assert_eq!(bounded_dimensions(10000, 1), (200, 1));
    }
}

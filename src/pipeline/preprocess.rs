//! Image pre-processing: fit a document image inside a pixel envelope.
//!
//! ## Why spawn_blocking?
//!
//! Decoding, resampling and PNG-encoding a phone photo is CPU-bound work
//! measured in tens of milliseconds. Running it on
//! `tokio::task::spawn_blocking` keeps the async workers free to drive the
//! other documents' network calls.
//!
//! Images already inside the envelope are passed through byte-for-byte.
//! Buffers that are not a recognised image format (PDF, for instance) are
//! passed through as well; the analysis service decides whether it accepts
//! them.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Resize `bytes` to fit within `max_dimension × max_dimension`.
///
/// Returns the original bytes when no resize is needed.
pub async fn fit_within(bytes: Vec<u8>, max_dimension: u32) -> Result<Vec<u8>, String> {
    tokio::task::spawn_blocking(move || fit_within_blocking(bytes, max_dimension))
        .await
        .map_err(|e| format!("resize task panicked: {e}"))?
}

/// Blocking implementation of [`fit_within`].
pub fn fit_within_blocking(bytes: Vec<u8>, max_dimension: u32) -> Result<Vec<u8>, String> {
    let format = match image::guess_format(&bytes) {
        Ok(format) => format,
        Err(_) => {
            debug!("Unrecognised image format, passing {} bytes through", bytes.len());
            return Ok(bytes);
        }
    };

    let img = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| format!("cannot decode {format:?} image: {e}"))?;

    if img.width() <= max_dimension && img.height() <= max_dimension {
        return Ok(bytes);
    }

    let resized = img.resize(max_dimension, max_dimension, image::imageops::FilterType::Lanczos3);
    debug!(
        "Resized {}x{} → {}x{}",
        img.width(),
        img.height(),
        resized.width(),
        resized.height()
    );
    encode_png(&resized).map_err(|e| format!("cannot encode resized image: {e}"))
}

/// Encode an image as PNG.
///
/// PNG is lossless; JPEG artefacts around glyph edges cost recognition
/// accuracy.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])));
        encode_png(&img).expect("encode should succeed")
    }

    #[test]
    fn small_image_passes_through() {
        let bytes = png(10, 20);
        let out = fit_within_blocking(bytes.clone(), 100).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn large_image_fits_inside_envelope() {
        let out = fit_within_blocking(png(400, 100), 200).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.width(), 200);
        assert_eq!(img.height(), 50);
    }

    #[test]
    fn tall_image_keeps_aspect_ratio() {
        let out = fit_within_blocking(png(60, 300), 150).unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.height(), 150);
        assert_eq!(img.width(), 30);
    }

    #[test]
    fn unknown_format_passes_through() {
        let bytes = b"%PDF-1.7 not an image".to_vec();
        assert_eq!(fit_within_blocking(bytes.clone(), 10).unwrap(), bytes);
    }

    #[test]
    fn truncated_image_is_an_error() {
        let mut bytes = png(50, 50);
        bytes.truncate(40);
        assert!(fit_within_blocking(bytes, 10).is_err());
    }

    #[tokio::test]
    async fn async_wrapper() {
        let out = fit_within(png(300, 300), 100).await.unwrap();
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (100, 100));
    }
}

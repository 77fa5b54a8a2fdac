//! Photo preparation before upload.

use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, GenericImageView};

use crate::config::ClientConfig;
use crate::{Error, Result};

/// Content type of every photo produced by [`resize_for_upload`].
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Bounds and quality used when preparing a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    /// Longest allowed edge in pixels.
    pub max_dimension: u32,
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

impl ResizeOptions {
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_dimension: config.max_photo_dimension,
            jpeg_quality: config.photo_jpeg_quality,
        }
    }
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// JPEG payload ready for object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode `source_bytes`, shrink to fit `max_dimension` on both edges while
/// keeping the aspect ratio, and re-encode as JPEG. Smaller images are not
/// upscaled.
pub fn resize_for_upload(source_bytes: &[u8], options: ResizeOptions) -> Result<ResizedImage> {
    if source_bytes.is_empty() {
        return Err(Error::InvalidInput("Photo bytes cannot be empty".to_string()));
    }
    if options.max_dimension == 0 {
        return Err(Error::InvalidInput(
            "Photo max dimension must be greater than zero".to_string(),
        ));
    }

    let source = image::load_from_memory(source_bytes)
        .map_err(|error| Error::Media(format!("Failed to decode photo: {error}")))?;

    let (source_width, source_height) = source.dimensions();
    let resized = if source_width <= options.max_dimension && source_height <= options.max_dimension
    {
        source
    } else {
        source.thumbnail(options.max_dimension, options.max_dimension)
    };

    // JPEG has no alpha channel.
    let rgb = resized.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut cursor = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut cursor, options.jpeg_quality)
        .encode_image(&rgb)
        .map_err(|error| Error::Media(format!("Failed to encode photo as JPEG: {error}")))?;

    Ok(ResizedImage {
        bytes: cursor.into_inner(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};

    fn source_png(width: u32, height: u32) -> Vec<u8> {
        let image = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_fn(width, height, |_x, _y| {
            Rgba([200, 120, 40, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn resize_bounds_longest_edge_and_keeps_ratio() {
        let result = resize_for_upload(
            &source_png(800, 400),
            ResizeOptions {
                max_dimension: 200,
                jpeg_quality: 80,
            },
        )
        .unwrap();

        assert_eq!(result.width, 200);
        assert_eq!(result.height, 100);
        assert_eq!(&result.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn resize_does_not_upscale() {
        let result = resize_for_upload(&source_png(60, 30), ResizeOptions::default()).unwrap();
        assert_eq!((result.width, result.height), (60, 30));
    }

    #[test]
    fn resize_rejects_garbage() {
        let err = resize_for_upload(b"not a photo", ResizeOptions::default()).unwrap_err();
        match err {
            Error::Media(message) => assert!(message.contains("decode")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

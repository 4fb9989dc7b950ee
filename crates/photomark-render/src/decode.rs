//! Bitmap decoding into a premultiplied base image.

use crate::renderer::BaseImage;
use photomark_core::EditorError;
use thiserror::Error;

/// Supported encoded formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Empty image data")]
    Empty,
    #[error("Unrecognized image format")]
    UnknownFormat,
    #[error("Failed to decode image: {0}")]
    Codec(#[from] image::ImageError),
    #[error("Unsupported image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

impl From<DecodeError> for EditorError {
    fn from(err: DecodeError) -> Self {
        EditorError::DecodeFailure(err.to_string())
    }
}

/// Decode fetched bytes at their intrinsic resolution.
pub fn decode_bitmap(bytes: &[u8]) -> Result<BaseImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let format = ImageFormat::from_magic_bytes(bytes).ok_or(DecodeError::UnknownFormat)?;
    let rgba = image::load_from_memory_with_format(bytes, format.codec())?.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Decoded {} image {width}x{height}", format.mime_type());
    BaseImage::from_rgba8(width, height, rgba.as_raw())
        .ok_or(DecodeError::InvalidSize { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_decode_png_keeps_intrinsic_size() {
        let image: RgbaImage = ImageBuffer::from_pixel(40, 30, Rgba([10, 20, 30, 255]));
        let base = decode_bitmap(&encode_png(&image)).unwrap();
        assert_eq!((base.width(), base.height()), (40, 30));
        let px = base.pixmap().pixel(5, 5).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (10, 20, 30, 255));
    }

    #[test]
    fn test_decode_premultiplies_alpha() {
        let image: RgbaImage = ImageBuffer::from_pixel(2, 2, Rgba([200, 100, 0, 128]));
        let base = decode_bitmap(&encode_png(&image)).unwrap();
        let px = base.pixmap().pixel(0, 0).unwrap();
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), 100);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_bitmap(&[]), Err(DecodeError::Empty)));
        assert!(matches!(
            decode_bitmap(b"not an image"),
            Err(DecodeError::UnknownFormat)
        ));
        let truncated = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert!(matches!(decode_bitmap(&truncated), Err(DecodeError::Codec(_))));
    }

    #[test]
    fn test_decode_error_maps_to_editor_error() {
        let err: EditorError = DecodeError::UnknownFormat.into();
        assert!(matches!(err, EditorError::DecodeFailure(_)));
        assert!(!err.is_retryable());
    }
}

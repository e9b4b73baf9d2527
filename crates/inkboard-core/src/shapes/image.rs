//! Image shape for embedding raster images.

use super::{ShapeId, ShapeStyle, ShapeTrait};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;
use uuid::Uuid;

/// Image import errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Invalid image payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Encodings accepted for uploaded and background images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// File extensions accepted by image pickers.
    pub fn extensions() -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "webp"]
    }

    /// Sniff the format from the file signature.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::WebP)
            }
            _ => None,
        }
    }
}

/// A raster image placed on the board, or the board's background.
///
/// The encoded file is kept as base64 so documents stay plain JSON; pixels are
/// only decoded by the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub(crate) id: ShapeId,
    pub position: Point,
    /// Displayed size, which may differ from the pixel size.
    pub width: f64,
    pub height: f64,
    pub source_width: u32,
    pub source_height: u32,
    pub format: ImageFormat,
    pub data_base64: String,
    /// Only the opacity applies to images.
    pub style: ShapeStyle,
}

impl Image {
    /// Create a new image shape from encoded image data with known dimensions.
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: source_width as f64,
            height: source_height as f64,
            source_width,
            source_height,
            format,
            data_base64: STANDARD.encode(data),
            style: ShapeStyle::default(),
        }
    }

    /// Create an image shape at its natural size from an encoded file.
    ///
    /// Only the header is decoded here; pixels are decoded when rendering.
    pub fn from_bytes(position: Point, data: &[u8]) -> Result<Self, ImageError> {
        let format = ImageFormat::from_magic_bytes(data).ok_or(ImageError::UnsupportedFormat)?;
        let (width, height) = ::image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImageError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(ImageError::Decode("image has no pixels".to_string()));
        }
        Ok(Self::new(position, data, width, height, format))
    }

    /// Create an image shape with specific display dimensions.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Scale the image to cover a `width` x `height` area anchored at the origin,
    /// preserving aspect ratio.
    pub fn cover(mut self, width: f64, height: f64) -> Self {
        let scale = (width / self.source_width as f64).max(height / self.source_height as f64);
        self.position = Point::ZERO;
        self.width = self.source_width as f64 * scale;
        self.height = self.source_height as f64 * scale;
        self
    }

    /// The encoded file bytes.
    pub fn data(&self) -> Result<Vec<u8>, ImageError> {
        Ok(STANDARD.decode(&self.data_base64)?)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }
}

impl ShapeTrait for Image {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_rect().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn transform(&mut self, affine: Affine) {
        let [sx, _, _, sy, _, _] = affine.as_coeffs();
        self.position = affine * self.position;
        self.width *= sx.abs();
        self.height *= sy.abs();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a solid-color RGBA PNG for tests.
    pub(crate) fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = ::image::RgbaImage::from_pixel(width, height, ::image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ::image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&png_bytes(1, 1, [0, 0, 0, 255])),
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
        assert_eq!(ImageFormat::from_magic_bytes(b"PN"), None);
    }

    #[test]
    fn test_from_bytes_natural_size() {
        let data = png_bytes(12, 8, [255, 0, 0, 255]);
        let img = Image::from_bytes(Point::ZERO, &data).unwrap();
        assert_eq!(img.format, ImageFormat::Png);
        assert_eq!((img.source_width, img.source_height), (12, 8));
        assert!((img.width - 12.0).abs() < f64::EPSILON);
        assert_eq!(img.data().unwrap(), data);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            Image::from_bytes(Point::ZERO, b"not an image"),
            Err(ImageError::UnsupportedFormat)
        ));
        // PNG signature without a valid header
        let truncated = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(matches!(
            Image::from_bytes(Point::ZERO, &truncated),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_cover() {
        let data = vec![0u8; 10];
        let img = Image::new(Point::new(5.0, 5.0), &data, 100, 100, ImageFormat::Png);
        let covered = img.cover(720.0, 400.0);
        assert_eq!(covered.position, Point::ZERO);
        assert!((covered.width - 720.0).abs() < 0.01);
        assert!((covered.height - 720.0).abs() < 0.01);
    }

    #[test]
    fn test_bounds() {
        let data = vec![0u8; 10];
        let img = Image::new(Point::new(10.0, 20.0), &data, 100, 50, ImageFormat::Png);
        let bounds = img.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}

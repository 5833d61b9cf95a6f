//! Screenshot cropping

use crate::session::ElementRect;
use image::ImageFormat;
use std::io::Cursor;

/// Default margin around the chart container, in pixels
pub const DEFAULT_PADDING: u32 = 10;

/// Errors while cropping a screenshot
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// Screenshot was not a decodable PNG
    #[error("screenshot decode failed: {0}")]
    Decode(#[source] image::ImageError),

    /// Cropped image could not be encoded
    #[error("crop encode failed: {0}")]
    Encode(#[source] image::ImageError),

    /// Padded rect does not overlap the frame
    #[error("crop region {rect:?} lies outside the {frame_width}x{frame_height} frame")]
    EmptyRegion {
        /// Container rect
        rect: ElementRect,
        /// Frame width
        frame_width: u32,
        /// Frame height
        frame_height: u32,
    },
}

/// Pixel region inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width, never zero
    pub width: u32,
    /// Height, never zero
    pub height: u32,
}

impl CropRegion {
    /// `rect` grown by `padding` on every side, clamped to the frame
    ///
    /// # Errors
    /// Returns [`CropError::EmptyRegion`] when nothing of the padded rect is
    /// inside the frame
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn around(
        rect: ElementRect,
        padding: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, CropError> {
        let empty = || CropError::EmptyRegion {
            rect,
            frame_width,
            frame_height,
        };
        let coords = [rect.x, rect.y, rect.width, rect.height];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(empty());
        }

        let pad = f64::from(padding);
        let clamp = |value: f64, limit: u32| value.clamp(0.0, f64::from(limit)) as u32;

        let left = clamp((rect.x - pad).floor(), frame_width);
        let top = clamp((rect.y - pad).floor(), frame_height);
        let right = clamp((rect.x + rect.width + pad).ceil(), frame_width);
        let bottom = clamp((rect.y + rect.height + pad).ceil(), frame_height);

        if right <= left || bottom <= top {
            return Err(empty());
        }
        Ok(Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        })
    }
}

/// Crop a full-frame PNG to `rect` plus `padding` and re-encode as PNG
///
/// # Errors
/// Returns [`CropError`] if decoding, clamping or encoding fails
pub fn crop_png(png: &[u8], rect: ElementRect, padding: u32) -> Result<Vec<u8>, CropError> {
    let frame = image::load_from_memory_with_format(png, ImageFormat::Png).map_err(CropError::Decode)?;
    let region = CropRegion::around(rect, padding, frame.width(), frame.height())?;

    let cropped = frame.crop_imm(region.x, region.y, region.width, region.height);
    let mut out = Vec::new();
    cropped
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(CropError::Encode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([20, 40, 60, 255]));
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn region_adds_padding() {
        let region =
            CropRegion::around(ElementRect::new(100.0, 50.0, 200.0, 100.0), 10, 1920, 1080).unwrap();
        assert_eq!(
            region,
            CropRegion {
                x: 90,
                y: 40,
                width: 220,
                height: 120
            }
        );
    }

    #[test]
    fn region_is_clamped_to_frame() {
        let region =
            CropRegion::around(ElementRect::new(-20.0, 5.0, 2000.0, 1200.0), 10, 1920, 1080).unwrap();
        assert_eq!(region.x, 0);
        assert_eq!(region.y, 0);
        assert_eq!(region.width, 1920);
        assert_eq!(region.height, 1080);
    }

    #[test]
    fn region_outside_frame_is_error() {
        let err = CropRegion::around(ElementRect::new(3000.0, 10.0, 50.0, 50.0), 10, 1920, 1080)
            .unwrap_err();
        assert!(matches!(err, CropError::EmptyRegion { .. }));

        let nan = CropRegion::around(ElementRect::new(f64::NAN, 0.0, 1.0, 1.0), 0, 10, 10);
        assert!(nan.is_err());
    }

    #[test]
    fn crop_png_produces_padded_image() {
        let cropped = crop_png(&png(400, 300), ElementRect::new(50.0, 60.0, 100.0, 80.0), 10).unwrap();
        let decoded = image::load_from_memory_with_format(&cropped, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 100));
    }

    #[test]
    fn crop_png_rejects_garbage() {
        let err = crop_png(b"not a png", ElementRect::new(0.0, 0.0, 1.0, 1.0), 0).unwrap_err();
        assert!(matches!(err, CropError::Decode(_)));
    }
}

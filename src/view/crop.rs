//! # Crop to File
//!
//! Turns a crop rectangle over a decoded source image into an encoded JPEG
//! file. Pixel work goes through a [`DrawingSurface`], so the transformation
//! can run against the `image` crate on the server, in tests, or against any
//! other raster backend.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage, imageops};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::utils::constant::{CROP_JPEG_QUALITY, MAX_CANVAS_AREA};

/// Errors raised by a drawing surface while decoding or encoding.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Platform that provides canvases and codecs.
pub trait DrawingSurface {
    /// Allocates a blank, fully transparent canvas.
    ///
    /// Returns `None` when no canvas of that size can be obtained.
    fn canvas(&self, width: u32, height: u32) -> Option<RgbaImage>;

    /// Decodes encoded image bytes into a pixel buffer.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, SurfaceError>;

    /// Encodes a canvas as JPEG.
    fn encode_jpeg(&self, canvas: &RgbaImage) -> Result<Vec<u8>, SurfaceError>;
}

/// [`DrawingSurface`] backed by the `image` crate.
#[derive(Debug, Clone, Copy)]
pub struct RasterSurface {
    pub jpeg_quality: u8,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self {
            jpeg_quality: CROP_JPEG_QUALITY,
        }
    }
}

impl DrawingSurface for RasterSurface {
    fn canvas(&self, width: u32, height: u32) -> Option<RgbaImage> {
        let area = u64::from(width) * u64::from(height);
        if area == 0 || area > MAX_CANVAS_AREA {
            debug!(width, height, "Refusing to allocate canvas");
            return None;
        }
        Some(RgbaImage::new(width, height))
    }

    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, SurfaceError> {
        image::load_from_memory(bytes)
            .map(|decoded| decoded.to_rgba8())
            .map_err(SurfaceError::Decode)
    }

    fn encode_jpeg(&self, canvas: &RgbaImage) -> Result<Vec<u8>, SurfaceError> {
        // JPEG has no alpha channel; transparent pixels keep their color values.
        let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut Cursor::new(&mut buffer), self.jpeg_quality)
            .encode_image(&rgb)
            .map_err(SurfaceError::Encode)?;

        trace!(size = buffer.len(), "Canvas encoded as JPEG");
        Ok(buffer)
    }
}

/// A decoded image with its natural pixel dimensions.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn decode(surface: &impl DrawingSurface, bytes: &[u8]) -> Result<Self, SurfaceError> {
        surface.decode(bytes).map(|pixels| Self { pixels })
    }

    pub fn from_pixels(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Crop rectangle in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCrop {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelCrop {
    /// A crop covering the whole image.
    pub fn full(source: &SourceImage) -> Self {
        Self {
            x: 0,
            y: 0,
            width: source.width(),
            height: source.height(),
        }
    }
}

/// Crop rectangle as reported by the crop widget, in the coordinates of the
/// displayed (possibly scaled) image element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayedCrop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayedCrop {
    /// Scales the rectangle from displayed size to the source's natural size.
    ///
    /// Returns `None` if the displayed size is degenerate.
    pub fn to_source_pixels(
        &self,
        displayed_width: f64,
        displayed_height: f64,
        source: &SourceImage,
    ) -> Option<PixelCrop> {
        if displayed_width <= 0.0 || displayed_height <= 0.0 {
            return None;
        }

        let scale_x = f64::from(source.width()) / displayed_width;
        let scale_y = f64::from(source.height()) / displayed_height;

        let scaled = |value: f64, scale: f64| (value * scale).round().max(0.0) as u32;
        Some(PixelCrop {
            x: scaled(self.x, scale_x),
            y: scaled(self.y, scale_y),
            width: scaled(self.width, scale_x),
            height: scaled(self.height, scale_y),
        })
    }
}

/// An encoded file ready to be placed in the form's file field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedFile {
    pub name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Crops `source` to `crop` and encodes the result as a JPEG file.
///
/// The full source is first drawn onto an intermediate canvas of its own
/// size, then the crop region of that canvas is drawn onto a canvas sized to
/// the crop. Regions outside the source stay blank. Returns `None` when the
/// surface cannot provide either canvas or fails to encode.
pub fn crop_to_file(
    surface: &impl DrawingSurface,
    source: &SourceImage,
    crop: PixelCrop,
    file_name: &str,
) -> Option<CroppedFile> {
    let mut full = surface.canvas(source.width(), source.height())?;
    imageops::replace(&mut full, &source.pixels, 0, 0);

    let mut cropped = surface.canvas(crop.width, crop.height)?;
    let region = imageops::crop_imm(&full, crop.x, crop.y, crop.width, crop.height).to_image();
    imageops::replace(&mut cropped, &region, 0, 0);

    let bytes = surface
        .encode_jpeg(&cropped)
        .inspect_err(|e| warn!(error = %e, "Failed to encode cropped image"))
        .ok()?;

    debug!(
        width = crop.width,
        height = crop.height,
        size = bytes.len(),
        "Cropped image encoded"
    );
    Some(CroppedFile {
        name: file_name.to_string(),
        content_type: "image/jpeg",
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, ImageFormat, Rgba};

    use super::*;

    fn checkerboard(width: u32, height: u32) -> SourceImage {
        SourceImage::from_pixels(RgbaImage::from_fn(width, height, |x, y| {
            if (x / 10 + y / 10) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        }))
    }

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    /// A surface that never hands out canvases.
    struct NoCanvas;

    impl DrawingSurface for NoCanvas {
        fn canvas(&self, _width: u32, _height: u32) -> Option<RgbaImage> {
            None
        }

        fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, SurfaceError> {
            RasterSurface::default().decode(bytes)
        }

        fn encode_jpeg(&self, canvas: &RgbaImage) -> Result<Vec<u8>, SurfaceError> {
            RasterSurface::default().encode_jpeg(canvas)
        }
    }

    #[test]
    fn identity_crop_keeps_dimensions() {
        let surface = RasterSurface::default();
        let source = checkerboard(64, 48);

        let file = crop_to_file(&surface, &source, PixelCrop::full(&source), "out.jpg").unwrap();
        let decoded = image::load_from_memory(&file.bytes).unwrap();

        assert_eq!(decoded.dimensions(), (64, 48));
    }

    #[test]
    fn output_is_always_jpeg() {
        let surface = RasterSurface::default();
        let png = png_bytes(&RgbaImage::from_pixel(30, 20, Rgba([10, 200, 10, 255])));
        let source = SourceImage::decode(&surface, &png).unwrap();

        let file = crop_to_file(
            &surface,
            &source,
            PixelCrop { x: 5, y: 5, width: 10, height: 8 },
            "avatar.jpg",
        )
        .unwrap();

        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.name, "avatar.jpg");
        assert_eq!(image::guess_format(&file.bytes).unwrap(), ImageFormat::Jpeg);
        assert_eq!(image::load_from_memory(&file.bytes).unwrap().dimensions(), (10, 8));
    }

    #[test]
    fn crop_takes_the_requested_region() {
        let surface = RasterSurface::default();
        let source = checkerboard(40, 40);

        // The 10x10 tile at (10, 0) is blue.
        let file = crop_to_file(
            &surface,
            &source,
            PixelCrop { x: 10, y: 0, width: 10, height: 10 },
            "tile.jpg",
        )
        .unwrap();
        let pixel = image::load_from_memory(&file.bytes).unwrap().to_rgb8();
        let center = pixel.get_pixel(5, 5);

        assert!(center[2] > 200 && center[0] < 60, "expected blue, got {center:?}");
    }

    #[test]
    fn out_of_bounds_crop_does_not_panic() {
        let surface = RasterSurface::default();
        let source = checkerboard(20, 20);

        let file = crop_to_file(
            &surface,
            &source,
            PixelCrop { x: 15, y: 15, width: 20, height: 20 },
            "edge.jpg",
        )
        .unwrap();

        assert_eq!(image::load_from_memory(&file.bytes).unwrap().dimensions(), (20, 20));
    }

    #[test]
    fn missing_surface_yields_none() {
        let source = checkerboard(10, 10);
        assert!(crop_to_file(&NoCanvas, &source, PixelCrop::full(&source), "x.jpg").is_none());
    }

    #[test]
    fn empty_crop_yields_none() {
        let surface = RasterSurface::default();
        let source = checkerboard(10, 10);
        let crop = PixelCrop { x: 0, y: 0, width: 0, height: 5 };

        assert!(crop_to_file(&surface, &source, crop, "x.jpg").is_none());
    }

    #[test]
    fn displayed_crop_scales_to_natural_size() {
        let source = checkerboard(800, 600);
        let displayed = DisplayedCrop { x: 10.0, y: 20.0, width: 100.0, height: 50.0 };

        let crop = displayed.to_source_pixels(400.0, 300.0, &source).unwrap();

        assert_eq!(crop, PixelCrop { x: 20, y: 40, width: 200, height: 100 });
        assert!(displayed.to_source_pixels(0.0, 300.0, &source).is_none());
    }
}

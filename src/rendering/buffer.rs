use crate::tiles::TileImage;
use crate::Result;
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// RGBA output surface the viewport composites tiles into.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pixels: RgbaImage,
}

impl PixelBuffer {
    /// Allocates a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y)
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
    }

    /// Opaque paste of `tile` with its top-left corner at `(x, y)`. Parts that
    /// fall outside the buffer are clipped; destination pixels are replaced,
    /// not blended.
    pub fn paste(&mut self, tile: &TileImage, x: i64, y: i64) {
        imageops::replace(&mut self.pixels, tile.pixels(), x, y);
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.pixels.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

use crate::core::geo::TileCoord;
use image::RgbaImage;
use std::sync::Arc;

/// Error raised while fetching a single tile. Never fatal for a render.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP {status} for tile {coord}")]
    Status { status: u16, coord: TileCoord },

    #[error("could not decode tile: {0}")]
    Decode(#[from] image::ImageError),

    #[error("tile {0} is outside the grid")]
    OutOfRange(TileCoord),

    #[error("{0}")]
    Other(String),
}

/// Immutable RGBA tile image. Clones share the pixel storage.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pixels: Arc<RgbaImage>,
}

impl TileImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Decodes PNG/JPEG bytes as served by tile servers.
    pub fn decode(bytes: &[u8]) -> Result<Self, FetchError> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::new(image.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl From<RgbaImage> for TileImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

/// Anything that can produce the image for a tile coordinate.
///
/// The same coordinate must resolve to the same content (modulo upstream
/// updates). Implementations are shared across fetch workers.
pub trait TileSource: Send + Sync {
    fn fetch(&self, coord: TileCoord) -> Result<TileImage, FetchError>;
}

impl<S: TileSource + ?Sized> TileSource for Arc<S> {
    fn fetch(&self, coord: TileCoord) -> Result<TileImage, FetchError> {
        (**self).fetch(coord)
    }
}

impl<S: TileSource + ?Sized> TileSource for Box<S> {
    fn fetch(&self, coord: TileCoord) -> Result<TileImage, FetchError> {
        (**self).fetch(coord)
    }
}

/// Fills a URL template's `{z}`, `{x}` and `{y}` placeholders.
pub fn expand_url(template: &str, coord: TileCoord) -> String {
    template
        .replace("{z}", &coord.z.to_string())
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
}

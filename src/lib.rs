//! # tileview
//!
//! Renders OpenStreetMap-style raster tiles into a pixel buffer.
//!
//! A [`ViewportState`] holds the zoom level, the center offset and the output
//! geometry; [`TileViewport`] turns that state into tile fetches through an
//! injected [`TileSource`], resamples tiles for high-density displays and
//! composites them into a reusable [`PixelBuffer`]. Embedding the buffer in a
//! GUI is left to the host application.

pub mod core;
pub mod input;
pub mod rendering;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{FetchConfig, ResizeFilter, ViewportConfig},
    geo::{LatLng, TileCoord},
    state::{Direction, HostSurface, ViewportState},
};

pub use input::MapAction;

pub use rendering::{
    Frame, ImageResampler, PixelBuffer, RenderReport, Resampler, TileFailure, TileLayout,
    TilePlacement, TileViewport,
};

pub use tiles::{CachedTileSource, FetchError, TileImage, TileSource};

#[cfg(feature = "http")]
pub use tiles::HttpTileSource;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Tile fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Viewport over the configured HTTP tile server (OpenStreetMap by default),
/// behind an in-memory cache unless `cache_capacity` is 0.
#[cfg(feature = "http")]
pub fn http_viewport(config: &ViewportConfig) -> Result<TileViewport<Box<dyn TileSource>>> {
    config.validate()?;
    let http = HttpTileSource::new(config.fetch.clone())?;
    let source: Box<dyn TileSource> = if config.cache_capacity == 0 {
        Box::new(http)
    } else {
        Box::new(CachedTileSource::new(http, config.cache_capacity))
    };
    Ok(TileViewport::with_config(source, config))
}

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

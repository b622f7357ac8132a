pub mod cache;
#[cfg(feature = "http")]
pub mod http;
pub mod source;

// Re-exports for convenience
pub use cache::CachedTileSource;
#[cfg(feature = "http")]
pub use http::HttpTileSource;
pub use source::{expand_url, FetchError, TileImage, TileSource};

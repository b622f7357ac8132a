pub mod buffer;
pub mod layout;
pub mod resample;
pub mod viewport;

// Re-export main types
pub use buffer::PixelBuffer;
pub use layout::{TileLayout, TilePlacement};
pub use resample::{ImageResampler, Resampler};
pub use viewport::{Frame, RenderReport, TileFailure, TileViewport};

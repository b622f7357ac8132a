pub mod config;
pub mod constants;
pub mod geo;
pub mod state;

pub use config::{FetchConfig, ResizeFilter, ViewportConfig};
pub use geo::{tile_count, LatLng, TileCoord};
pub use state::{Direction, HostSurface, ViewportState};

//! Core constants for the slippy-map tile scheme and the OpenStreetMap
//! tile server. Keeping them in a single place makes it easier to tweak
//! engine-wide magic numbers.

/// Native square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Highest zoom level most public tile servers serve.
pub const MAX_ZOOM: u8 = 19;

/// Largest display density multiplier tiles are scaled for.
pub const MAX_PIXEL_SCALE: u32 = 8;

/// Smallest useful viewport edge in logical pixels: one tile on a 4× display.
pub const MIN_VIEWPORT_SIZE: u32 = 64;

/// Default OpenStreetMap tile URL template.
pub const OSM_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Attribution label the host must display next to OSM tiles.
pub const ATTRIBUTION_TEXT: &str = "OpenStreetMap";

/// Link target for the attribution label.
pub const ATTRIBUTION_URL: &str = "https://openstreetmap.org";

/// User-Agent sent to tile servers (OSM rejects requests without one).
pub const DEFAULT_USER_AGENT: &str = concat!("tileview/", env!("CARGO_PKG_VERSION"));

//! Logical map state: zoom level, center offset and output geometry.
//!
//! The center is stored as a signed tile offset from the middle of the grid
//! rather than an absolute tile index, so panning and zooming are plain
//! integer arithmetic and never have to know the grid size.

use crate::core::constants::{MAX_PIXEL_SCALE, MAX_ZOOM, TILE_SIZE};
use crate::core::geo::{tile_count, LatLng, TileCoord};
use serde::{Deserialize, Deserializer, Serialize};

/// Direction of a single pan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Host queries the viewport needs before each render.
pub trait HostSurface {
    /// Current output size in device pixels.
    fn size_px(&self) -> (u32, u32);

    /// Display density multiplier (1.0 on standard displays, 2.0 on retina-class ones).
    fn scale_factor(&self) -> f32;
}

/// Current view of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Zoom level, kept in `[0, MAX_ZOOM]`
    #[serde(deserialize_with = "deserialize_zoom")]
    pub zoom: u8,
    /// Horizontal tile offset of the center from the grid midpoint
    pub center_x: i64,
    /// Vertical tile offset of the center from the grid midpoint
    pub center_y: i64,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Display density multiplier in `[1, MAX_PIXEL_SCALE]`
    pub pixel_scale: u32,
}

fn deserialize_zoom<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let zoom = u8::deserialize(deserializer)?;
    if zoom > MAX_ZOOM {
        return Err(serde::de::Error::custom(format!(
            "zoom {zoom} exceeds {MAX_ZOOM}"
        )));
    }
    Ok(zoom)
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 0,
            center_x: 0,
            center_y: 0,
            width: TILE_SIZE,
            height: TILE_SIZE,
            pixel_scale: 1,
        }
    }
}

impl ViewportState {
    /// Creates a state centered on the grid midpoint.
    pub fn new(width: u32, height: u32, zoom: u8) -> Self {
        Self {
            zoom: zoom.min(MAX_ZOOM),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_center(mut self, center_x: i64, center_y: i64) -> Self {
        self.center_x = center_x;
        self.center_y = center_y;
        self
    }

    pub fn with_pixel_scale(mut self, pixel_scale: u32) -> Self {
        self.pixel_scale = pixel_scale.clamp(1, MAX_PIXEL_SCALE);
        self
    }

    /// Zoom clamped to `MAX_ZOOM`, for states whose fields were set directly.
    pub fn zoom_level(&self) -> u8 {
        self.zoom.min(MAX_ZOOM)
    }

    /// Pixel scale clamped to `[1, MAX_PIXEL_SCALE]`.
    pub fn scale(&self) -> u32 {
        self.pixel_scale.clamp(1, MAX_PIXEL_SCALE)
    }

    /// Tiles per axis at the current zoom.
    pub fn tile_count(&self) -> i64 {
        tile_count(self.zoom_level())
    }

    /// Offset of the grid midpoint tile, `trunc(count / 2 - 0.5)`.
    pub fn grid_midpoint(&self) -> i64 {
        (self.tile_count() - 1) / 2
    }

    /// Absolute tile index under the viewport center, if it lies on the grid.
    pub fn center_tile(&self) -> Option<TileCoord> {
        let mid = self.grid_midpoint();
        TileCoord::checked(self.center_x + mid, self.center_y + mid, self.zoom_level())
    }

    /// Zooms in one level, doubling the center offsets so the same point stays
    /// centered. Returns `false` when already at the maximum zoom.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_in_to(MAX_ZOOM)
    }

    /// Like [`zoom_in`](Self::zoom_in) with a caller-supplied ceiling.
    pub fn zoom_in_to(&mut self, max_zoom: u8) -> bool {
        if self.zoom >= max_zoom.min(MAX_ZOOM) {
            return false;
        }
        self.zoom += 1;
        self.center_x *= 2;
        self.center_y *= 2;
        true
    }

    /// Zooms out one level, halving the center offsets (truncating toward
    /// zero). Returns `false` when already at zoom 0.
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom == 0 {
            return false;
        }
        self.zoom -= 1;
        self.center_x /= 2;
        self.center_y /= 2;
        true
    }

    /// Moves the center one tile. Not clamped: a center off the grid simply
    /// renders blank.
    pub fn pan(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.center_y -= 1,
            Direction::Down => self.center_y += 1,
            Direction::Left => self.center_x -= 1,
            Direction::Right => self.center_x += 1,
        }
    }

    /// Centers the view on the tile containing `location` at the current zoom.
    pub fn center_on(&mut self, location: &LatLng) {
        let tile = TileCoord::from_lat_lng(location, self.zoom_level());
        let mid = self.grid_midpoint();
        self.center_x = tile.x as i64 - mid;
        self.center_y = tile.y as i64 - mid;
    }

    /// Reads output size and display scale from the host. Fractional scales
    /// are truncated, anything below 1 counts as 1 and the result is capped
    /// at `MAX_PIXEL_SCALE`.
    pub fn sync_surface(&mut self, surface: &dyn HostSurface) {
        let (width, height) = surface.size_px();
        self.width = width;
        self.height = height;

        let scale = surface.scale_factor();
        self.pixel_scale = if scale.is_finite() && scale >= 1.0 {
            (scale as u32).min(MAX_PIXEL_SCALE)
        } else {
            1
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSurface(u32, u32, f32);

    impl HostSurface for FixedSurface {
        fn size_px(&self) -> (u32, u32) {
            (self.0, self.1)
        }

        fn scale_factor(&self) -> f32 {
            self.2
        }
    }

    #[test]
    fn test_zoom_in_doubles_offsets() {
        let mut state = ViewportState::new(512, 512, 3).with_center(2, -3);
        assert!(state.zoom_in());
        assert_eq!((state.zoom, state.center_x, state.center_y), (4, 4, -6));
    }

    #[test]
    fn test_zoom_out_truncates_toward_zero() {
        let mut state = ViewportState::new(512, 512, 3).with_center(3, -3);
        assert!(state.zoom_out());
        assert_eq!((state.zoom, state.center_x, state.center_y), (2, 1, -1));
    }

    #[test]
    fn test_zoom_limits_are_noops() {
        let mut state = ViewportState::new(512, 512, 0).with_center(1, 1);
        assert!(!state.zoom_out());
        assert_eq!((state.zoom, state.center_x), (0, 1));

        let mut state = ViewportState::new(512, 512, MAX_ZOOM).with_center(1, 1);
        assert!(!state.zoom_in());
        assert_eq!((state.zoom, state.center_x), (MAX_ZOOM, 1));
    }

    #[test]
    fn test_zoom_in_to_respects_ceiling() {
        let mut state = ViewportState::new(512, 512, 5);
        assert!(!state.zoom_in_to(5));
        assert!(state.zoom_in_to(6));
        assert_eq!(state.zoom, 6);
    }

    #[test]
    fn test_new_clamps_zoom() {
        assert_eq!(ViewportState::new(1, 1, 42).zoom, MAX_ZOOM);
    }

    #[test]
    fn test_pan_directions() {
        let mut state = ViewportState::default();
        state.pan(Direction::Right);
        state.pan(Direction::Right);
        state.pan(Direction::Up);
        assert_eq!((state.center_x, state.center_y), (2, -1));
        state.pan(Direction::Left);
        state.pan(Direction::Left);
        state.pan(Direction::Down);
        assert_eq!((state.center_x, state.center_y), (0, 0));
    }

    #[test]
    fn test_grid_midpoint_matches_truncated_half() {
        for zoom in 0..=MAX_ZOOM {
            let state = ViewportState::new(1, 1, zoom);
            let count = state.tile_count() as f32;
            assert_eq!(state.grid_midpoint(), (count / 2.0 - 0.5) as i64, "zoom {zoom}");
        }
    }

    #[test]
    fn test_center_on_places_tile_at_center() {
        let mut state = ViewportState::new(800, 600, 10);
        let berlin = LatLng::new(52.52, 13.405);
        state.center_on(&berlin);
        assert_eq!(state.center_tile(), Some(TileCoord::from_lat_lng(&berlin, 10)));
    }

    #[test]
    fn test_center_tile_off_grid() {
        let state = ViewportState::new(256, 256, 1).with_center(5, 0);
        assert_eq!(state.center_tile(), None);
    }

    #[test]
    fn test_sync_surface_truncates_scale() {
        let mut state = ViewportState::default();
        state.sync_surface(&FixedSurface(1024, 768, 2.5));
        assert_eq!((state.width, state.height, state.pixel_scale), (1024, 768, 2));

        state.sync_surface(&FixedSurface(10, 10, 0.75));
        assert_eq!(state.pixel_scale, 1);

        state.sync_surface(&FixedSurface(10, 10, 1000.0));
        assert_eq!(state.pixel_scale, MAX_PIXEL_SCALE);
    }

    #[test]
    fn test_pixel_scale_is_capped() {
        let state = ViewportState::new(512, 512, 0).with_pixel_scale(u32::MAX);
        assert_eq!(state.pixel_scale, MAX_PIXEL_SCALE);

        let mut state = ViewportState::default();
        state.pixel_scale = u32::MAX;
        assert_eq!(state.scale(), MAX_PIXEL_SCALE);
        state.pixel_scale = 0;
        assert_eq!(state.scale(), 1);
    }

    #[test]
    fn test_out_of_range_zoom_is_clamped_or_rejected() {
        let mut state = ViewportState::new(512, 512, 0);
        state.zoom = 64;
        assert_eq!(state.zoom_level(), MAX_ZOOM);
        assert_eq!(state.tile_count(), 1 << MAX_ZOOM);
        assert!(state.center_tile().is_some());

        let json = r#"{"zoom":64,"center_x":0,"center_y":0,"width":256,"height":256,"pixel_scale":1}"#;
        let err = serde_json::from_str::<ViewportState>(json).unwrap_err();
        assert!(err.to_string().contains("zoom 64"), "{err}");
    }

    #[test]
    fn test_state_serializes_to_json() {
        let state = ViewportState::new(640, 480, 4).with_center(-1, 2);
        let json = serde_json::to_string(&state).unwrap();
        let back: ViewportState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}

//! Maps a [`ViewportState`] onto the tile grid: which tiles are visible and
//! where each one lands in the output buffer. Pure arithmetic, no I/O.

use crate::core::constants::TILE_SIZE;
use crate::core::geo::{tile_count, TileCoord};
use crate::core::state::ViewportState;

/// Where a tile's top-left corner lands in the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    pub coord: TileCoord,
    pub dest_x: i64,
    pub dest_y: i64,
}

/// Tile grid geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    /// Edge length of a tile on screen
    pub tile_px: i64,
    /// Screen offset of the center tile
    pub mid_x: i64,
    pub mid_y: i64,
    /// Absolute index of the center tile
    pub center_x: i64,
    pub center_y: i64,
    /// First candidate tile on each axis
    pub first_x: i64,
    pub first_y: i64,
    pub width: i64,
    pub height: i64,
    pub zoom: u8,
    pub count: i64,
}

impl TileLayout {
    pub fn new(state: &ViewportState) -> Self {
        let tile_px = TILE_SIZE as i64 * state.scale() as i64;
        let width = state.width as i64;
        let height = state.height as i64;

        let mut mid_x = (width - tile_px * 2) / 2;
        let mut mid_y = (height - tile_px * 2) / 2;
        let zoom = state.zoom_level();
        if zoom == 0 {
            // a single tile covers the world, center it
            mid_x += tile_px / 2;
            mid_y += tile_px / 2;
        }

        let count = tile_count(zoom);
        let center_x = state.center_x + state.grid_midpoint();
        let center_y = state.center_y + state.grid_midpoint();

        Self {
            tile_px,
            mid_x,
            mid_y,
            center_x,
            center_y,
            first_x: center_x - ceil_div(mid_x, tile_px),
            first_y: center_y - ceil_div(mid_y, tile_px),
            width,
            height,
            zoom,
            count,
        }
    }

    /// Screen position of the top-left corner of tile `(x, y)`.
    pub fn position(&self, x: i64, y: i64) -> (i64, i64) {
        (
            self.mid_x + (x - self.center_x) * self.tile_px,
            self.mid_y + (y - self.center_y) * self.tile_px,
        )
    }

    /// Candidate column indices: the viewport plus one tile of trailing margin.
    fn columns(&self) -> impl Iterator<Item = i64> {
        let (first, tile_px, limit) = (self.first_x, self.tile_px, self.width + self.tile_px);
        (first..).take_while(move |x| (x - first) * tile_px <= limit)
    }

    fn rows(&self) -> impl Iterator<Item = i64> {
        let (first, tile_px, limit) = (self.first_y, self.tile_px, self.height + self.tile_px);
        (first..).take_while(move |y| (y - first) * tile_px <= limit)
    }

    /// Visible tiles that exist on the grid, column by column.
    pub fn placements(&self) -> Vec<TilePlacement> {
        let rows: Vec<i64> = self.rows().collect();
        self.columns()
            .flat_map(|x| rows.iter().map(move |&y| (x, y)))
            .filter_map(|(x, y)| {
                let coord = TileCoord::checked(x, y, self.zoom)?;
                let (dest_x, dest_y) = self.position(x, y);
                Some(TilePlacement {
                    coord,
                    dest_x,
                    dest_y,
                })
            })
            .collect()
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value as f64 / divisor as f64).ceil() as i64
}

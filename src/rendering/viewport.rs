//! Tile viewport: fetches the tiles a [`TileLayout`] calls for and composites
//! them into a pixel buffer owned by the viewport.
//!
//! Rendering blocks until every visible tile has been fetched or has failed.
//! Fetching and resampling run on a bounded pool of scoped worker threads;
//! results come back over a channel and are pasted on the calling thread, so
//! the buffer is only ever written from one place. A failed tile is logged,
//! reported and skipped, never fatal for the frame.

use super::buffer::PixelBuffer;
use super::layout::{TileLayout, TilePlacement};
use super::resample::{ImageResampler, Resampler};
use crate::core::config::ViewportConfig;
use crate::core::geo::TileCoord;
use crate::core::state::{HostSurface, ViewportState};
use crate::tiles::{FetchError, TileImage, TileSource};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// A tile that could not be drawn.
#[derive(Debug, Clone)]
pub struct TileFailure {
    pub coord: TileCoord,
    pub error: Arc<FetchError>,
}

/// Outcome of one render.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    /// Tiles pasted into the buffer, in completion order
    pub drawn: Vec<TileCoord>,
    pub failures: Vec<TileFailure>,
}

impl RenderReport {
    /// True when every visible tile was drawn.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn requested(&self) -> usize {
        self.drawn.len() + self.failures.len()
    }
}

/// Composited frame borrowed from the viewport.
#[derive(Debug)]
pub struct Frame<'a> {
    pub buffer: &'a PixelBuffer,
    pub report: RenderReport,
}

/// Renders slippy-map tiles from a [`TileSource`] into a reusable buffer.
pub struct TileViewport<S> {
    source: S,
    resampler: Box<dyn Resampler>,
    max_concurrent: usize,
    buffer: Option<PixelBuffer>,
    subscribers: Vec<Sender<TileFailure>>,
}

impl<S: TileSource> TileViewport<S> {
    /// Viewport with the default Lanczos resampler and concurrency.
    pub fn new(source: S) -> Self {
        Self::with_config(source, &ViewportConfig::default())
    }

    pub fn with_config(source: S, config: &ViewportConfig) -> Self {
        Self {
            source,
            resampler: Box::new(ImageResampler::new(config.resize_filter)),
            max_concurrent: config.fetch.max_concurrent.max(1),
            buffer: None,
            subscribers: Vec::new(),
        }
    }

    pub fn with_resampler(mut self, resampler: impl Resampler + 'static) -> Self {
        self.resampler = Box::new(resampler);
        self
    }

    /// Upper bound on worker threads; 1 fetches inline on the caller's thread.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Last rendered buffer, if any.
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    /// Receives a [`TileFailure`] for every tile that fails in later
    /// renders. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<TileFailure> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Reads size and scale from the host into `state`, then renders it.
    pub fn render_surface(
        &mut self,
        state: &mut ViewportState,
        surface: &dyn HostSurface,
    ) -> Frame<'_> {
        state.sync_surface(surface);
        self.render(state)
    }

    /// Fetches and composites every visible tile for `state`.
    ///
    /// The buffer is reused when the output size is unchanged and reallocated
    /// otherwise. Pixels no tile covers keep whatever the buffer held.
    pub fn render(&mut self, state: &ViewportState) -> Frame<'_> {
        let layout = TileLayout::new(state);
        let placements = layout.placements();
        log::debug!(
            "render zoom {} center ({}, {}): {} candidate tiles",
            layout.zoom,
            layout.center_x,
            layout.center_y,
            placements.len()
        );

        let Self {
            source,
            resampler,
            max_concurrent,
            buffer,
            subscribers,
        } = self;
        let source: &S = source;
        let resampler: &dyn Resampler = &**resampler;
        let buffer = ensure_buffer(buffer, state.width, state.height);
        // bounded by TILE_SIZE * MAX_PIXEL_SCALE
        let tile_px = u32::try_from(layout.tile_px).unwrap_or(u32::MAX);
        let mut report = RenderReport::default();

        let mut composite = |placement: TilePlacement, outcome: Result<TileImage, FetchError>| {
            match outcome {
                Ok(tile) => {
                    buffer.paste(&tile, placement.dest_x, placement.dest_y);
                    report.drawn.push(placement.coord);
                }
                Err(error) => {
                    log::warn!("tile fetch error for {}: {}", placement.coord, error);
                    let failure = TileFailure {
                        coord: placement.coord,
                        error: Arc::new(error),
                    };
                    subscribers.retain(|tx| tx.send(failure.clone()).is_ok());
                    report.failures.push(failure);
                }
            }
        };

        let workers = (*max_concurrent).min(placements.len());
        if workers <= 1 {
            for placement in placements {
                let outcome = load_tile(source, resampler, placement.coord, tile_px);
                composite(placement, outcome);
            }
        } else {
            let (task_tx, task_rx) = unbounded::<TilePlacement>();
            let (result_tx, result_rx) = unbounded();
            for placement in placements {
                // receiver is alive until the end of this function
                let _ = task_tx.send(placement);
            }
            drop(task_tx);

            thread::scope(|scope| {
                for _ in 0..workers {
                    let task_rx = task_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || {
                        for placement in task_rx.iter() {
                            let outcome = load_tile(source, resampler, placement.coord, tile_px);
                            if result_tx.send((placement, outcome)).is_err() {
                                break;
                            }
                        }
                    });
                }
                drop(result_tx);

                for (placement, outcome) in result_rx.iter() {
                    composite(placement, outcome);
                }
            });
        }

        log::info!(
            "rendered {} of {} tiles at zoom {} ({} failed)",
            report.drawn.len(),
            report.requested(),
            layout.zoom,
            report.failures.len()
        );

        Frame {
            buffer: &*buffer,
            report,
        }
    }
}

fn ensure_buffer(slot: &mut Option<PixelBuffer>, width: u32, height: u32) -> &mut PixelBuffer {
    if slot.as_ref().map(PixelBuffer::dimensions) != Some((width, height)) {
        log::debug!("allocating {}x{} pixel buffer", width, height);
        *slot = Some(PixelBuffer::new(width, height));
    }
    slot.get_or_insert_with(|| PixelBuffer::new(width, height))
}

/// Fetches one tile and scales it to the on-screen tile size if needed.
fn load_tile(
    source: &(impl TileSource + ?Sized),
    resampler: &dyn Resampler,
    coord: TileCoord,
    tile_px: u32,
) -> Result<TileImage, FetchError> {
    let tile = source.fetch(coord)?;
    if tile.width() == tile_px && tile.height() == tile_px {
        return Ok(tile);
    }
    Ok(resampler.resize(&tile, tile_px, tile_px))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ResizeFilter;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;

    /// Source that paints each tile a color derived from its coordinate and
    /// records every request.
    #[derive(Default)]
    struct ColorSource {
        requests: Mutex<Vec<TileCoord>>,
        fail_all: bool,
    }

    fn color_of(coord: TileCoord) -> Rgba<u8> {
        // wraps past x/y = 6 so deep zooms stay panic-free
        Rgba([
            (coord.x as u8).wrapping_mul(40),
            (coord.y as u8).wrapping_mul(40),
            coord.z.wrapping_mul(10),
            255,
        ])
    }

    impl TileSource for ColorSource {
        fn fetch(&self, coord: TileCoord) -> Result<TileImage, FetchError> {
            self.requests.lock().unwrap().push(coord);
            if self.fail_all {
                return Err(FetchError::Other(format!("offline for {coord}")));
            }
            Ok(TileImage::new(RgbaImage::from_pixel(256, 256, color_of(coord))))
        }
    }

    #[test]
    fn test_zoom_zero_fetches_one_centered_tile() {
        let mut viewport = TileViewport::new(ColorSource::default()).with_max_concurrent(1);
        let state = ViewportState::new(512, 512, 0);
        let frame = viewport.render(&state);

        assert_eq!(frame.report.drawn, vec![TileCoord::new(0, 0, 0)]);
        assert_eq!(frame.buffer.dimensions(), (512, 512));
        assert_eq!(frame.buffer.get_pixel(127, 127), Some(&Rgba([0, 0, 0, 0])));
        assert_eq!(frame.buffer.get_pixel(128, 128), Some(&color_of(TileCoord::new(0, 0, 0))));
        assert_eq!(frame.buffer.get_pixel(383, 383), Some(&color_of(TileCoord::new(0, 0, 0))));
        assert_eq!(frame.buffer.get_pixel(384, 384), Some(&Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_failures_are_reported_not_fatal() {
        let source = ColorSource {
            fail_all: true,
            ..ColorSource::default()
        };
        let mut viewport = TileViewport::new(source);
        let diagnostics = viewport.subscribe();
        let state = ViewportState::new(300, 200, 3);
        let frame = viewport.render(&state);

        assert_eq!(frame.buffer.dimensions(), (300, 200));
        assert!(frame.report.drawn.is_empty());
        assert!(!frame.report.is_complete());
        let failed = frame.report.failures.len();
        assert!(failed > 0);
        assert_eq!(diagnostics.try_iter().count(), failed);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let source = ColorSource {
            fail_all: true,
            ..ColorSource::default()
        };
        let mut viewport = TileViewport::new(source).with_max_concurrent(1);
        drop(viewport.subscribe());
        viewport.render(&ViewportState::new(256, 256, 0));
        assert!(viewport.subscribers.is_empty());
    }

    #[test]
    fn test_buffer_reused_when_size_unchanged() {
        let mut viewport = TileViewport::new(ColorSource::default());
        let state = ViewportState::new(512, 512, 0);
        let first = viewport.render(&state).buffer.as_raw().as_ptr();
        let second = viewport.render(&state).buffer.as_raw().as_ptr();
        assert_eq!(first, second);

        let resized = ViewportState::new(640, 480, 0);
        assert_eq!(viewport.render(&resized).buffer.dimensions(), (640, 480));
    }

    #[test]
    fn test_concurrent_matches_sequential() {
        let state = ViewportState::new(700, 500, 4).with_center(-2, 1);

        let mut sequential = TileViewport::new(ColorSource::default()).with_max_concurrent(1);
        let mut concurrent = TileViewport::new(ColorSource::default()).with_max_concurrent(6);

        let a = sequential.render(&state).buffer.clone();
        let frame = concurrent.render(&state);
        assert_eq!(&a, frame.buffer);
        assert!(frame.report.is_complete());
    }

    #[test]
    fn test_out_of_range_state_renders_clamped() {
        let mut viewport = TileViewport::new(ColorSource::default())
            .with_max_concurrent(1)
            .with_resampler(ImageResampler::new(ResizeFilter::Nearest));
        let mut state = ViewportState::new(256, 256, 0);
        state.zoom = 64;
        state.pixel_scale = u32::MAX;
        let frame = viewport.render(&state);

        assert_eq!(frame.buffer.dimensions(), (256, 256));
        assert!(frame.report.is_complete());
        assert!(frame.report.drawn.iter().all(|c| c.z == crate::core::constants::MAX_ZOOM));
    }

    #[test]
    fn test_native_tiles_are_upscaled_for_pixel_scale() {
        let mut viewport = TileViewport::new(ColorSource::default()).with_max_concurrent(1);
        let state = ViewportState::new(1024, 1024, 0).with_pixel_scale(2);
        let frame = viewport.render(&state);

        // mid = (1024 - 1024) / 2 + 256, and the upscaled tile is 512px wide
        let color = color_of(TileCoord::new(0, 0, 0));
        assert_eq!(frame.buffer.get_pixel(255, 255), Some(&Rgba([0, 0, 0, 0])));
        assert_eq!(frame.buffer.get_pixel(256, 256), Some(&color));
        assert_eq!(frame.buffer.get_pixel(767, 767), Some(&color));
        assert_eq!(frame.buffer.get_pixel(768, 768), Some(&Rgba([0, 0, 0, 0])));
    }
}

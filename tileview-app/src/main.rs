use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tileview::{constants, http_viewport, LatLng, MapAction, ViewportConfig, ViewportState};

/// Render an OpenStreetMap view to a PNG file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Initial zoom level
    #[arg(short, long, default_value_t = 2)]
    zoom: u8,

    /// Horizontal tile offset from the grid center
    #[arg(short = 'x', long, default_value_t = 0, allow_hyphen_values = true)]
    x: i64,

    /// Vertical tile offset from the grid center
    #[arg(short = 'y', long, default_value_t = 0, allow_hyphen_values = true)]
    y: i64,

    /// Center on this latitude (requires --lng)
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Center on this longitude (requires --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Output width in logical pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Output height in logical pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Display density multiplier
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Controls applied in order before rendering: in, out, up, down, left, right
    #[arg(short, long = "action")]
    actions: Vec<MapAction>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "map.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tileview::init_logger();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ViewportConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewportConfig::default(),
    };

    let width = cli.width.max(constants::MIN_VIEWPORT_SIZE);
    let height = cli.height.max(constants::MIN_VIEWPORT_SIZE);
    let scale = cli.scale.clamp(1, constants::MAX_PIXEL_SCALE);
    if scale != cli.scale {
        log::warn!("scale {} clamped to {}", cli.scale, scale);
    }
    let device_width = width
        .checked_mul(scale)
        .with_context(|| format!("width {width} at scale {scale} overflows"))?;
    let device_height = height
        .checked_mul(scale)
        .with_context(|| format!("height {height} at scale {scale} overflows"))?;
    let mut state = ViewportState::new(device_width, device_height, cli.zoom.min(config.max_zoom))
        .with_center(cli.x, cli.y)
        .with_pixel_scale(scale);

    if let (Some(lat), Some(lng)) = (cli.lat, cli.lng) {
        let location = LatLng::new(lat, lng);
        if !location.is_valid() {
            anyhow::bail!("invalid location {lat}, {lng}");
        }
        MapAction::CenterOn(location).apply(&mut state, config.max_zoom);
    }
    for action in &cli.actions {
        if !action.apply(&mut state, config.max_zoom) {
            log::warn!("{:?} had no effect at zoom {}", action, state.zoom);
        }
    }

    match state.center_tile() {
        Some(tile) => {
            let center = tile.to_lat_lng();
            log::info!("center tile {} at {:.4}, {:.4}", tile, center.lat, center.lng);
        }
        None => log::warn!("center is off the tile grid, output will be blank"),
    }

    let mut viewport = http_viewport(&config).context("failed to set up tile source")?;
    let frame = viewport.render(&state);
    for failure in &frame.report.failures {
        log::error!("tile {} missing: {}", failure.coord, failure.error);
    }

    frame
        .buffer
        .save_png(&cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    log::info!(
        "wrote {} ({}x{}, zoom {}, {} tiles, map data © {} {})",
        cli.output.display(),
        state.width,
        state.height,
        state.zoom,
        frame.report.drawn.len(),
        constants::ATTRIBUTION_TEXT,
        constants::ATTRIBUTION_URL
    );

    Ok(())
}

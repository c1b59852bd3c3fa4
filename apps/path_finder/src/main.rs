use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::{
    commands::BackendCommand,
    runtime::{launch, BackendSettings},
};
use controller::events::UiEvent;
use ui::{map_view::MapView, PathFinderApp};

#[derive(Parser, Debug)]
#[command(about = "Pick two points on a map and ask a routing service for paths between them")]
struct Args {
    /// Settings file to load instead of the default locations.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the routing service.
    #[arg(long)]
    routing_url: Option<String>,
    /// Tile URL template with {z}, {x} and {y} placeholders.
    #[arg(long)]
    tile_url: Option<String>,
    #[arg(long)]
    zoom: Option<u8>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(routing_url) = args.routing_url {
        settings.routing_url = routing_url;
    }
    if let Some(tile_url) = args.tile_url {
        settings.tile_url = tile_url;
    }
    if let Some(zoom) = args.zoom {
        settings.initial_zoom = zoom;
    }
    tracing::info!(
        routing_url = %settings.routing_url,
        tile_url = %settings.tile_url,
        zoom = settings.initial_zoom,
        "starting path finder"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    launch(cmd_rx, ui_tx, BackendSettings::from(&settings));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Path Finder")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    let map = MapView::new(
        settings.map_center,
        settings.initial_zoom,
        settings.tile_url.clone(),
        settings.tile_fetch_concurrency,
    );
    eframe::run_native(
        "Path Finder",
        options,
        Box::new(move |_cc| Ok(Box::new(PathFinderApp::new(cmd_tx, ui_rx, map)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run the path finder window: {err}"))
}

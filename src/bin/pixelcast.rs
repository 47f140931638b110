use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pixelcast::{
    AppState, Config, ErrorTracker, Options, PixelController, PixelMap, Transmitter,
    TransmitterConfig, frame_channel, router, shared_options,
};

#[derive(Parser, Debug)]
#[command(name = "pixelcast", version)]
struct Cli {
    /// Pixel layout JSON file; the built-in demo grid is used when omitted.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Override TARGET_FRAMES_PER_SECOND from the environment.
    #[arg(long)]
    fps: Option<u32>,

    /// Pattern active at startup.
    #[arg(long, default_value = "rainbowDiagonal")]
    pattern: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading configuration from environment")?;
    let fps = cli.fps.unwrap_or(config.target_fps);

    let pixel_map = match &cli.layout {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("reading layout '{}'", path.display()))?;
            PixelMap::from_json(&data).context("parsing layout")?
        }
        None => PixelMap::demo_grid(),
    };
    let universes = pixel_map.universes();
    tracing::info!(
        pixels = pixel_map.len(),
        universes = universes.len(),
        fps,
        "layout loaded"
    );

    // One tracker shared by the transmit path; ten send failures within a
    // second latch the log throttle.
    let tracker = Arc::new(ErrorTracker::new(Duration::from_secs(1), 10));

    let transmitter = Transmitter::new(TransmitterConfig::default(), tracker.clone())
        .await
        .context("starting sACN transmitter")?;

    let mut sinks = HashMap::new();
    for universe in &universes {
        let sink = transmitter
            .activate(*universe)
            .with_context(|| format!("activating universe {universe}"))?;
        transmitter
            .set_destination(*universe, &config.controller_address, 100)
            .await
            .with_context(|| format!("resolving destination for universe {universe}"))?;
        sinks.insert(*universe, sink);
    }

    let options = shared_options(Options::default());
    let mut controller = PixelController::new(
        sinks,
        tracker,
        fps,
        &cli.pattern,
        pixel_map,
        options.clone(),
    )
    .context("building pixel controller")?;

    let frames = frame_channel();
    let publisher = frames.clone();
    controller.set_update_callback(move |pixels| {
        // Serialize once per frame; subscribers share the string.
        let _ = publisher.send(Arc::new(pixels.visualizer_json()));
    });

    let handle = controller.start();

    let state = AppState {
        controller: handle.clone(),
        options,
        frames,
    };
    let listener =
        tokio::net::TcpListener::bind((config.host_address.as_str(), config.host_port))
            .await
            .with_context(|| {
                format!(
                    "binding http server to {}:{}",
                    config.host_address, config.host_port
                )
            })?;
    tracing::info!(
        address = %config.host_address,
        port = config.host_port,
        controller = %config.controller_address,
        "pixelcast serving"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    tracing::info!("shutting down");
    handle.stop().await.context("stopping render loop")?;
    transmitter.close().await.context("closing transmitter")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

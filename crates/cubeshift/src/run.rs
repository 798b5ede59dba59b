use anyhow::Result;
use renderer::Renderer;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Filter applied when `RUST_LOG` is unset. Keeps the graphics stack quiet
/// unless something goes wrong.
const DEFAULT_FILTER: &str =
    "warn,cubeshift=info,renderer=info,naga=error,wgpu=error,wgpu_core=error,wgpu_hal=error,winit=error";

pub fn run(cli: Cli) -> Result<()> {
    let renderer = Renderer::new(cli.renderer_config());
    tracing::debug!(config = ?renderer.config(), "resolved renderer configuration");

    let summary = renderer.run()?;
    tracing::info!(
        frames = summary.frames,
        horizontal = summary.offsets.horizontal,
        vertical = summary.offsets.vertical,
        "cubeshift exited"
    );
    Ok(())
}

pub fn initialise_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

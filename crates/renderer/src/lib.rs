//! Renderer crate for cubeshift.
//!
//! Draws one colored cube and slides it around with the arrow keys. The flow
//! is:
//!
//! ```text
//!   cubeshift CLI
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ compile ──▶ ProgramLinker ──▶ GpuState (pipeline, buffers)
//!                                                      │
//!          ┌───────────────────────────────────────────┘
//!          ▼
//!   loop: FrameDriver::tick ──▶ GpuState::render ──▶ pump window events
//! ```
//!
//! Everything that decides *what* a frame contains (input, offsets, uniform
//! writes, draw call) lives in [`frame`] and [`input`] and runs without a GPU.
//! The `gpu` and `window` modules only replay those decisions through `wgpu`
//! and `winit`.

pub mod compile;
pub mod frame;
pub mod geometry;
mod gpu;
pub mod input;
pub mod program;
mod types;
mod window;

use anyhow::Result;

pub use compile::{CompileError, CompiledShader, ShaderKind};
pub use frame::{FrameCommands, FrameDriver, Projection, ProjectionLocations};
pub use geometry::{CubeMesh, GeometryError};
pub use input::{Key, KeySource, KeyboardState, Offsets};
pub use program::{LinkError, LinkReport, Program, ProgramLinker, UniformLocation};
pub use types::{
    GraphicsBackend, RendererConfig, Viewport, DEFAULT_OFFSET_STEP, DEFAULT_SURFACE_SIZE,
    DEFAULT_TITLE,
};
pub use window::RunSummary;

/// Entry point that owns the configuration for one windowed run.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Blocks until the window closes. Window, GPU and link failures are
    /// returned as errors before the loop starts.
    pub fn run(self) -> Result<RunSummary> {
        tracing::info!(
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            backend = %self.config.backend,
            debug_link = self.config.debug_link,
            "starting renderer"
        );
        window::run_window(&self.config)
    }
}

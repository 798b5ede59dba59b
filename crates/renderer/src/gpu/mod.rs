//! `wgpu` side of the renderer.
//!
//! - `context` owns the instance/device/surface wiring and reconfigures the
//!   swapchain on resize.
//! - `pipeline` turns a linked [`crate::program::Program`] into a render
//!   pipeline with the cube's two vertex-buffer views.
//! - `uniforms` keeps the CPU copy of the uniform block that location writes
//!   land in before being flushed.
//! - `state` glues them together and replays [`crate::frame::FrameCommands`].

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use context::GpuContext;
pub(crate) use state::GpuState;

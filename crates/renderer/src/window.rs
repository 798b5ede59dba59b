use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowBuilder;

use crate::compile::{compile_fragment_shader, compile_vertex_shader, CompiledShader};
use crate::frame::{FrameDriver, Projection, ProjectionLocations};
use crate::geometry::CubeMesh;
use crate::gpu::{GpuContext, GpuState};
use crate::input::{KeyboardState, Offsets};
use crate::program::{LinkError, LinkReport, Program, ProgramLinker};
use crate::types::{RendererConfig, Viewport};

/// What the loop ended with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub offsets: Offsets,
}

/// Opens the window, sets up the GPU and runs the frame loop until the close
/// flag is set.
pub(crate) fn run_window(config: &RendererConfig) -> Result<RunSummary> {
    let mut event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.surface_size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;

    let context = GpuContext::new(&window, window.inner_size(), config.backend)
        .context("failed to initialise GPU context")?;

    let linker = ProgramLinker::new(config.debug_link);
    let program = build_program(&linker)?;
    let locations = ProjectionLocations::resolve(&program)?;

    let mesh = CubeMesh::cube();
    let mut gpu = match GpuState::new(context, &program, &mesh) {
        Ok(gpu) => gpu,
        Err(err) => {
            if let Some(link_err) = err.downcast_ref::<LinkError>() {
                linker.report(link_err);
                return Err(link_failed(&linker));
            }
            return Err(err.context("failed to build cube pipeline"));
        }
    };
    gpu.write_uniforms(&locations.projection_writes(Projection::default()));
    // The pipeline holds compiled modules now; the IR is no longer needed.
    drop(program);

    let size = window.inner_size();
    let mut driver = FrameDriver::new(
        locations,
        Viewport::from_size(size.width, size.height),
        config.offset_step,
        mesh.vertex_count(),
    )
    .with_frame_limit(config.max_frames);
    let mut keyboard = KeyboardState::default();
    info!(width = size.width, height = size.height, "window ready");

    let mut outcome = Ok(());
    while let Some(commands) = driver.tick(&keyboard) {
        match gpu.render(&commands) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!(size = ?gpu.size(), "surface lost or outdated; reconfiguring");
                gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                outcome = Err(anyhow!("surface out of memory"));
                break;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
            }
            Err(other) => {
                warn!("surface error: {other:?}; retrying next frame");
            }
        }

        let status = event_loop.pump_events(Some(Duration::ZERO), |event, _| {
            let Event::WindowEvent { window_id, event } = event else {
                return;
            };
            if window_id != window.id() {
                return;
            }
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => driver.request_close(),
                WindowEvent::KeyboardInput { event, .. } => {
                    keyboard.handle_event(&event);
                }
                WindowEvent::Focused(false) => keyboard.clear(),
                WindowEvent::Resized(new_size) => {
                    driver.resize(new_size.width, new_size.height);
                    gpu.resize(new_size);
                }
                _ => {}
            }
        });
        if let PumpStatus::Exit(code) = status {
            debug!(code, "event loop exited");
            break;
        }
    }

    let summary = RunSummary {
        frames: driver.frames(),
        offsets: driver.offsets(),
    };
    gpu.destroy();
    drop(window);
    debug!(frames = summary.frames, "renderer shut down");

    outcome.map(|()| summary)
}

fn build_program(linker: &ProgramLinker) -> Result<Program> {
    let vertex = compile_vertex_shader();
    log_compile_failure(&vertex);
    let fragment = compile_fragment_shader();
    log_compile_failure(&fragment);

    finish_link(linker, linker.link_and_debug(&vertex, &fragment))
}

fn finish_link(linker: &ProgramLinker, report: LinkReport) -> Result<Program> {
    report.result.map_err(|_| link_failed(linker))
}

/// The link log only reaches the console through the debug linker, so the
/// returned error never carries it.
fn link_failed(linker: &ProgramLinker) -> anyhow::Error {
    if linker.debug() {
        anyhow!("shader program failed to link; see the link log above")
    } else {
        anyhow!("shader program failed to link")
    }
}

fn log_compile_failure(shader: &CompiledShader) {
    if let Some(err) = shader.error() {
        error!(stage = %shader.kind(), "shader compilation failed\n{}", err.log());
    }
}

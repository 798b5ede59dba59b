//! The per-frame update, independent of the GPU.
//!
//! [`FrameDriver::tick`] runs the input step and describes the frame to draw
//! as [`FrameCommands`]; the GPU layer only replays them.

use tracing::debug;

use crate::input::{apply_input, KeySource, Offsets};
use crate::program::{Program, UniformLocation};
use crate::types::Viewport;

/// Transparent black.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::TRANSPARENT;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
}

impl UniformValue {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float(value) => bytemuck::bytes_of(value),
            UniformValue::Vec2(value) => bytemuck::bytes_of(value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformWrite {
    pub location: UniformLocation,
    pub value: UniformValue,
}

/// Non-indexed triangle-list draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub first_vertex: u32,
    pub vertex_count: u32,
}

impl DrawCall {
    pub fn triangle_count(&self) -> u32 {
        self.vertex_count / 3
    }
}

/// Everything one loop iteration submits.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameCommands {
    pub viewport: Viewport,
    pub clear_color: wgpu::Color,
    pub uniforms: Vec<UniformWrite>,
    pub draw: DrawCall,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("uniform `{name}` is not declared by the program")]
pub struct MissingUniform {
    pub name: &'static str,
}

/// Static projection parameters written once at setup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub frustum_scale: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            frustum_scale: 1.0,
            z_near: 1.0,
            z_far: 3.0,
        }
    }
}

/// The four uniform locations the cube program needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectionLocations {
    pub offset: UniformLocation,
    pub frustum_scale: UniformLocation,
    pub z_near: UniformLocation,
    pub z_far: UniformLocation,
}

impl ProjectionLocations {
    pub fn resolve(program: &Program) -> Result<Self, MissingUniform> {
        let lookup = |name: &'static str| {
            program
                .uniform_location(name)
                .ok_or(MissingUniform { name })
        };
        Ok(Self {
            offset: lookup("offset")?,
            frustum_scale: lookup("frustumScale")?,
            z_near: lookup("zNear")?,
            z_far: lookup("zFar")?,
        })
    }

    pub fn projection_writes(&self, projection: Projection) -> [UniformWrite; 3] {
        [
            UniformWrite {
                location: self.frustum_scale,
                value: UniformValue::Float(projection.frustum_scale),
            },
            UniformWrite {
                location: self.z_near,
                value: UniformValue::Float(projection.z_near),
            },
            UniformWrite {
                location: self.z_far,
                value: UniformValue::Float(projection.z_far),
            },
        ]
    }

    pub fn offset_write(&self, offsets: Offsets) -> UniformWrite {
        UniformWrite {
            location: self.offset,
            value: UniformValue::Vec2(offsets.as_uniform()),
        }
    }
}

/// Loop state: offsets, close flag and viewport.
#[derive(Debug)]
pub struct FrameDriver {
    locations: ProjectionLocations,
    offsets: Offsets,
    viewport: Viewport,
    step: f32,
    vertex_count: u32,
    close_requested: bool,
    frames: u64,
    max_frames: Option<u64>,
}

impl FrameDriver {
    pub fn new(
        locations: ProjectionLocations,
        viewport: Viewport,
        step: f32,
        vertex_count: u32,
    ) -> Self {
        Self {
            locations,
            offsets: Offsets::default(),
            viewport,
            step,
            vertex_count,
            close_requested: false,
            frames: 0,
            max_frames: None,
        }
    }

    /// Ends the loop after `max_frames` iterations.
    pub fn with_frame_limit(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Framebuffer-size callback: only the viewport follows the window.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::from_size(width, height);
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn limit_reached(&self) -> bool {
        self.max_frames.is_some_and(|max| self.frames >= max)
    }

    /// Runs one iteration. Returns `None` once the close flag was set by an
    /// earlier iteration; a close requested during this iteration still lets
    /// it finish its frame.
    pub fn tick(&mut self, keys: &impl KeySource) -> Option<FrameCommands> {
        if self.close_requested || self.limit_reached() {
            self.close_requested = true;
            return None;
        }

        let (offsets, outcome) = apply_input(keys, self.offsets, self.step);
        self.offsets = offsets;
        if outcome.close_requested {
            debug!(frame = self.frames, "escape pressed; closing after this frame");
            self.close_requested = true;
        }

        self.frames += 1;
        if self.limit_reached() {
            self.close_requested = true;
        }

        Some(FrameCommands {
            viewport: self.viewport,
            clear_color: CLEAR_COLOR,
            uniforms: vec![self.locations.offset_write(self.offsets)],
            draw: DrawCall {
                first_vertex: 0,
                vertex_count: self.vertex_count,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::{compile_fragment_shader, compile_vertex_shader};
    use crate::geometry::CUBE_VERTEX_COUNT;
    use crate::input::{Key, KeyboardState};
    use crate::program::ProgramLinker;

    fn driver() -> FrameDriver {
        let program = ProgramLinker::new(true)
            .link(&compile_vertex_shader(), &compile_fragment_shader())
            .unwrap();
        let locations = ProjectionLocations::resolve(&program).unwrap();
        FrameDriver::new(
            locations,
            Viewport::from_size(800, 600),
            0.01,
            CUBE_VERTEX_COUNT,
        )
    }

    #[test]
    fn frame_clears_uploads_offset_and_draws_cube() {
        let mut driver = driver();
        let mut keys = KeyboardState::default();
        keys.press(Key::Up);
        let commands = driver.tick(&keys).unwrap();

        assert_eq!(commands.clear_color, wgpu::Color::TRANSPARENT);
        assert_eq!(commands.draw.vertex_count, 36);
        assert_eq!(commands.draw.triangle_count(), 12);
        assert_eq!(commands.uniforms.len(), 1);
        assert_eq!(commands.uniforms[0].value, UniformValue::Vec2([0.0, 0.01]));
        assert_eq!(commands.uniforms[0].location.offset(), 0);
    }

    #[test]
    fn escape_finishes_the_current_frame() {
        let mut driver = driver();
        let mut keys = KeyboardState::default();
        keys.press(Key::Escape);
        keys.press(Key::Right);

        let commands = driver.tick(&keys);
        assert!(commands.is_some());
        assert!(driver.should_close());
        assert_eq!(driver.offsets().horizontal, 0.01);

        assert!(driver.tick(&keys).is_none());
        assert_eq!(driver.frames(), 1);
        assert_eq!(driver.offsets().horizontal, 0.01);
    }

    #[test]
    fn resize_only_moves_viewport() {
        let mut driver = driver();
        let mut keys = KeyboardState::default();
        keys.press(Key::Left);
        driver.tick(&keys);
        let offsets = driver.offsets();
        let frames = driver.frames();

        driver.resize(1024, 768);
        assert_eq!(
            driver.viewport(),
            Viewport {
                x: 0,
                y: 0,
                width: 1024,
                height: 768
            }
        );
        assert_eq!(driver.offsets(), offsets);
        assert_eq!(driver.frames(), frames);
        assert!(!driver.should_close());

        let commands = driver.tick(&KeyboardState::default()).unwrap();
        assert_eq!(commands.viewport, Viewport::from_size(1024, 768));
    }

    #[test]
    fn frame_limit_stops_loop() {
        let mut driver = driver().with_frame_limit(Some(3));
        let keys = KeyboardState::default();
        let mut produced = 0;
        while driver.tick(&keys).is_some() {
            produced += 1;
        }
        assert_eq!(produced, 3);
    }

    #[test]
    fn zero_frame_limit_draws_nothing() {
        let mut driver = driver().with_frame_limit(Some(0));
        let mut keys = KeyboardState::default();
        keys.press(Key::Up);
        assert!(driver.tick(&keys).is_none());
        assert!(driver.should_close());
        assert_eq!(driver.frames(), 0);
        assert_eq!(driver.offsets(), Offsets::default());
    }

    #[test]
    fn projection_writes_use_static_values() {
        let program = ProgramLinker::new(false)
            .link(&compile_vertex_shader(), &compile_fragment_shader())
            .unwrap();
        let locations = ProjectionLocations::resolve(&program).unwrap();
        let writes = locations.projection_writes(Projection::default());
        assert_eq!(writes[0].value, UniformValue::Float(1.0));
        assert_eq!(writes[1].value, UniformValue::Float(1.0));
        assert_eq!(writes[2].value, UniformValue::Float(3.0));
        assert_eq!(writes[2].value.as_bytes(), 3.0f32.to_ne_bytes());
    }
}

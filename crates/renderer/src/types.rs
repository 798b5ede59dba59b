use std::fmt;

/// Window size used when the caller does not override it.
pub const DEFAULT_SURFACE_SIZE: (u32, u32) = (800, 600);

/// Title shown in the window decoration.
pub const DEFAULT_TITLE: &str = "cubeshift";

/// Amount each held arrow key moves the cube per frame.
pub const DEFAULT_OFFSET_STEP: f32 = 0.01;

/// Graphics API the GPU context should be created against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GraphicsBackend {
    /// Let `wgpu` pick from every backend compiled in.
    #[default]
    Auto,
    Vulkan,
    Metal,
    Dx12,
    Gl,
}

impl GraphicsBackend {
    pub(crate) fn to_wgpu(self) -> wgpu::Backends {
        match self {
            GraphicsBackend::Auto => wgpu::Backends::all(),
            GraphicsBackend::Vulkan => wgpu::Backends::VULKAN,
            GraphicsBackend::Metal => wgpu::Backends::METAL,
            GraphicsBackend::Dx12 => wgpu::Backends::DX12,
            GraphicsBackend::Gl => wgpu::Backends::GL,
        }
    }
}

impl fmt::Display for GraphicsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsBackend::Auto => f.write_str("auto"),
            GraphicsBackend::Vulkan => f.write_str("vulkan"),
            GraphicsBackend::Metal => f.write_str("metal"),
            GraphicsBackend::Dx12 => f.write_str("dx12"),
            GraphicsBackend::Gl => f.write_str("gl"),
        }
    }
}

/// Rectangle of the surface the cube is drawn into, in physical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport anchored at the origin covering `width` x `height`.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Settings consumed by [`crate::Renderer`].
#[derive(Clone, Debug)]
pub struct RendererConfig {
    pub surface_size: (u32, u32),
    pub title: String,
    /// Log the full link diagnostic when the program fails to link.
    pub debug_link: bool,
    pub offset_step: f32,
    pub backend: GraphicsBackend,
    /// Stop after this many frames instead of waiting for escape.
    pub max_frames: Option<u64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: DEFAULT_SURFACE_SIZE,
            title: DEFAULT_TITLE.to_string(),
            debug_link: true,
            offset_step: DEFAULT_OFFSET_STEP,
            backend: GraphicsBackend::default(),
            max_frames: None,
        }
    }
}

use std::fmt;

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Pipeline stage a shader source is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderKind::Vertex => naga::ShaderStage::Vertex,
            ShaderKind::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderKind::Vertex => f.write_str("vertex"),
            ShaderKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Why a shader source did not produce usable IR.
///
/// The log is the complete front-end or validator output, never truncated.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    #[error("{kind} shader failed to compile:\n{log}")]
    Parse { kind: ShaderKind, log: String },
    #[error("{kind} shader failed validation:\n{log}")]
    Validation { kind: ShaderKind, log: String },
}

impl CompileError {
    pub fn kind(&self) -> ShaderKind {
        match self {
            CompileError::Parse { kind, .. } | CompileError::Validation { kind, .. } => *kind,
        }
    }

    pub fn log(&self) -> &str {
        match self {
            CompileError::Parse { log, .. } | CompileError::Validation { log, .. } => log,
        }
    }
}

/// Result of compiling one stage.
///
/// A failed compile still yields a value so it can be handed to the linker,
/// which refuses it with a typed error.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    kind: ShaderKind,
    status: Result<naga::Module, CompileError>,
}

impl CompiledShader {
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn is_compiled(&self) -> bool {
        self.status.is_ok()
    }

    pub fn error(&self) -> Option<&CompileError> {
        self.status.as_ref().err()
    }

    pub(crate) fn module(&self) -> Result<&naga::Module, &CompileError> {
        self.status.as_ref()
    }
}

/// Parses `source` as GLSL for `kind` and validates the resulting module.
pub fn compile_shader(kind: ShaderKind, source: &str) -> CompiledShader {
    CompiledShader {
        kind,
        status: compile_module(kind, source),
    }
}

fn compile_module(kind: ShaderKind, source: &str) -> Result<naga::Module, CompileError> {
    let mut frontend = glsl::Frontend::default();
    let options = glsl::Options::from(kind.naga_stage());
    let module = frontend
        .parse(&options, source)
        .map_err(|errors| CompileError::Parse {
            kind,
            log: errors.emit_to_string(source),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|err| CompileError::Validation {
            kind,
            log: err.emit_to_string(source),
        })?;

    Ok(module)
}

/// Compiles the built-in vertex shader.
pub fn compile_vertex_shader() -> CompiledShader {
    compile_shader(ShaderKind::Vertex, VERTEX_SHADER_GLSL)
}

/// Compiles the built-in fragment shader.
pub fn compile_fragment_shader() -> CompiledShader {
    compile_shader(ShaderKind::Fragment, FRAGMENT_SHADER_GLSL)
}

/// Offsets the cube, then applies a perspective projection built from the
/// frustum scale and near/far planes.
///
/// The block layout must match [`crate::frame::ProjectionLocations`] lookups.
/// The last step maps GL clip depth `[-w, w]` onto the `[0, w]` range `wgpu`
/// clips against.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec4 position;
layout(location = 1) in vec4 color;

layout(std140, set = 0, binding = 0) uniform Projection {
    vec2 offset;
    float frustumScale;
    float zNear;
    float zFar;
} projection;

layout(location = 0) out vec4 theColor;

void main() {
    vec4 cameraPos = position + vec4(projection.offset.x, projection.offset.y, 0.0, 0.0);
    float zNear = projection.zNear;
    float zFar = projection.zFar;

    vec2 clipXY = cameraPos.xy * projection.frustumScale;
    float clipZ = cameraPos.z * (zNear + zFar) / (zNear - zFar);
    clipZ += 2.0 * (zNear * zFar) / (zNear - zFar);
    float clipW = -cameraPos.z;

    gl_Position = vec4(clipXY, (clipZ + clipW) * 0.5, clipW);
    theColor = color;
}
";

/// Passes the interpolated vertex color straight through.
pub const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec4 theColor;
layout(location = 0) out vec4 fragColor;

void main() {
    fragColor = theColor;
}
";

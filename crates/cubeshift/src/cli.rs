use clap::Parser;
use renderer::{GraphicsBackend, RendererConfig, DEFAULT_OFFSET_STEP, DEFAULT_TITLE};

#[derive(Parser, Debug)]
#[command(
    name = "cubeshift",
    author,
    version,
    about = "Slide a colored cube around with the arrow keys"
)]
pub struct Cli {
    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size, default_value = "800x600")]
    pub size: (u32, u32),

    /// Window title.
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Distance the cube moves per frame while an arrow key is held.
    #[arg(long, value_name = "AMOUNT", value_parser = parse_step, default_value_t = DEFAULT_OFFSET_STEP)]
    pub step: f32,

    /// Do not log the shader link diagnostic when linking fails.
    #[arg(long)]
    pub no_debug_link: bool,

    /// Graphics backend: `auto`, `vulkan`, `metal`, `dx12`, or `gl`.
    #[arg(
        long,
        value_name = "BACKEND",
        value_parser = parse_backend,
        default_value = "auto",
        env = "CUBESHIFT_BACKEND"
    )]
    pub backend: GraphicsBackend,

    /// Exit after rendering this many frames.
    #[arg(long, value_name = "COUNT")]
    pub frames: Option<u64>,
}

impl Cli {
    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            surface_size: self.size,
            title: self.title.clone(),
            debug_link: !self.no_debug_link,
            offset_step: self.step,
            backend: self.backend,
            max_frames: self.frames,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_step(value: &str) -> Result<f32, String> {
    let step = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid step '{}'", value.trim()))?;
    if !step.is_finite() || step < 0.0 {
        return Err("step must be a finite, non-negative number".into());
    }
    Ok(step)
}

pub fn parse_backend(value: &str) -> Result<GraphicsBackend, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("backend must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "default" => Ok(GraphicsBackend::Auto),
        "vulkan" | "vk" => Ok(GraphicsBackend::Vulkan),
        "metal" => Ok(GraphicsBackend::Metal),
        "dx12" | "d3d12" => Ok(GraphicsBackend::Dx12),
        "gl" | "opengl" | "gles" => Ok(GraphicsBackend::Gl),
        other => Err(format!(
            "unknown backend '{other}'; expected auto, vulkan, metal, dx12, or gl"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_window() {
        let cli = Cli::try_parse_from(["cubeshift"]).unwrap();
        let config = cli.renderer_config();
        assert_eq!(config.surface_size, (800, 600));
        assert_eq!(config.title, "cubeshift");
        assert_eq!(config.offset_step, 0.01);
        assert!(config.debug_link);
        assert_eq!(config.backend, GraphicsBackend::Auto);
        assert_eq!(config.max_frames, None);
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "cubeshift",
            "--size",
            "1024x768",
            "--step",
            "0.05",
            "--no-debug-link",
            "--backend",
            "vulkan",
            "--frames",
            "10",
        ])
        .unwrap();
        let config = cli.renderer_config();
        assert_eq!(config.surface_size, (1024, 768));
        assert_eq!(config.offset_step, 0.05);
        assert!(!config.debug_link);
        assert_eq!(config.backend, GraphicsBackend::Vulkan);
        assert_eq!(config.max_frames, Some(10));
    }

    #[test]
    fn rejects_bad_sizes() {
        assert_eq!(parse_surface_size("1024X768"), Ok((1024, 768)));
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("abc").is_err());
        assert!(parse_surface_size("800x").is_err());
        assert!(Cli::try_parse_from(["cubeshift", "--size", "0x10"]).is_err());
    }

    #[test]
    fn parses_backend_aliases() {
        assert_eq!(parse_backend("OpenGL"), Ok(GraphicsBackend::Gl));
        assert_eq!(parse_backend("d3d12"), Ok(GraphicsBackend::Dx12));
        assert!(parse_backend("").is_err());
        assert!(parse_backend("glide").is_err());
    }

    #[test]
    fn rejects_negative_step() {
        assert!(parse_step("-0.01").is_err());
        assert!(parse_step("NaN").is_err());
        assert_eq!(parse_step("0"), Ok(0.0));
    }
}

use renderer::compile::{compile_fragment_shader, compile_vertex_shader};
use renderer::frame::UniformValue;
use renderer::{
    CubeMesh, FrameDriver, KeyboardState, Offsets, ProgramLinker, ProjectionLocations, Viewport,
    DEFAULT_OFFSET_STEP, DEFAULT_SURFACE_SIZE,
};

#[test]
fn idle_loop_keeps_cube_centered() {
    let vertex = compile_vertex_shader();
    let fragment = compile_fragment_shader();
    let report = ProgramLinker::new(true).link_and_debug(&vertex, &fragment);
    assert!(report.diagnostic.is_none());
    let program = report.result.expect("built-in program links");

    for name in ["frustumScale", "zNear", "zFar", "offset"] {
        assert!(
            program.uniform_location(name).is_some(),
            "uniform {name} should resolve"
        );
    }
    let locations = ProjectionLocations::resolve(&program).unwrap();

    let mesh = CubeMesh::cube();
    let (width, height) = DEFAULT_SURFACE_SIZE;
    let mut driver = FrameDriver::new(
        locations,
        Viewport::from_size(width, height),
        DEFAULT_OFFSET_STEP,
        mesh.vertex_count(),
    )
    .with_frame_limit(Some(120));

    let keys = KeyboardState::default();
    let mut frames = 0;
    while let Some(commands) = driver.tick(&keys) {
        frames += 1;
        assert_eq!(driver.offsets(), Offsets::default());
        assert_eq!(commands.uniforms[0].value, UniformValue::Vec2([0.0, 0.0]));
        assert_eq!(commands.draw.vertex_count, 36);
        assert_eq!(commands.viewport, Viewport::from_size(800, 600));
    }
    assert_eq!(frames, 120);
    assert_eq!(driver.frames(), 120);
}

#[test]
fn held_key_moves_one_step_per_frame() {
    let program = ProgramLinker::new(false)
        .link(&compile_vertex_shader(), &compile_fragment_shader())
        .unwrap();
    let locations = ProjectionLocations::resolve(&program).unwrap();
    let mut driver = FrameDriver::new(locations, Viewport::from_size(800, 600), 0.01, 36);

    let mut keys = KeyboardState::default();
    keys.press(renderer::Key::Right);
    let mut expected = 0.0f32;
    for _ in 0..25 {
        driver.tick(&keys).unwrap();
        expected += 0.01;
        assert_eq!(driver.offsets().horizontal, expected);
        assert_eq!(driver.offsets().vertical, 0.0);
    }

    keys.release(renderer::Key::Right);
    keys.press(renderer::Key::Escape);
    assert!(driver.tick(&keys).is_some());
    assert!(driver.tick(&keys).is_none());
    assert_eq!(driver.offsets().horizontal, expected);
}

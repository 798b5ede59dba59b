use std::process::Command;

#[test]
fn help_lists_window_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_cubeshift"))
        .arg("--help")
        .output()
        .expect("failed to invoke cubeshift --help");

    assert!(output.status.success(), "--help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--size", "--step", "--no-debug-link", "--backend", "--frames"] {
        assert!(stdout.contains(flag), "help output should mention {flag}");
    }
}

#[test]
fn zero_sized_window_is_rejected() {
    let status = Command::new(env!("CARGO_BIN_EXE_cubeshift"))
        .args(["--size", "0x10"])
        .env_remove("CUBESHIFT_BACKEND")
        .status()
        .expect("failed to invoke cubeshift");

    assert!(!status.success(), "a zero dimension must fail argument parsing");
}

#[test]
fn unknown_backend_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_cubeshift"))
        .args(["--backend", "glide"])
        .output()
        .expect("failed to invoke cubeshift");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown backend"));
}

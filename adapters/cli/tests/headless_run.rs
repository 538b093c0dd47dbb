use std::process::Command;

#[test]
fn plays_a_wave_and_prints_a_summary() {
    let output = Command::new(env!("CARGO_BIN_EXE_balloon-defence"))
        .args(["--waves", "1", "--seed", "7"])
        .output()
        .expect("failed to run balloon-defence");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Balloon Defence."), "{stdout}");
    assert!(stdout.contains("Red Balloons"), "{stdout}");
    assert!(stdout.contains("score"), "{stdout}");
}

#[test]
fn rejects_a_zero_frame_length() {
    let output = Command::new(env!("CARGO_BIN_EXE_balloon-defence"))
        .args(["--frame-ms", "0"])
        .output()
        .expect("failed to run balloon-defence");

    assert!(!output.status.success());
}

#[test]
fn reports_unreadable_settings_files() {
    let output = Command::new(env!("CARGO_BIN_EXE_balloon-defence"))
        .args(["--config", "/nonexistent/settings.toml"])
        .output()
        .expect("failed to run balloon-defence");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/settings.toml"), "{stderr}");
}

fn write_registry(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "balloon-defence-{}-{name}.toml",
        std::process::id()
    ));
    std::fs::write(&path, contents).expect("failed to write registry file");
    path
}

#[test]
fn plays_waves_from_a_custom_registry() {
    let path = write_registry(
        "custom",
        r#"
            fallback = "SMALL"

            [[types]]
            id = "SMALL"
            name = "Small"
            health = 1
            speed_multiplier = 1.0
            points = 5
            color = 0x44ff44
        "#,
    );
    let output = Command::new(env!("CARGO_BIN_EXE_balloon-defence"))
        .arg("--registry")
        .arg(&path)
        .args(["--waves", "1", "--seed", "11"])
        .output()
        .expect("failed to run balloon-defence");
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let wave_line = stdout
        .lines()
        .find(|line| line.starts_with("wave  1"))
        .unwrap_or_else(|| panic!("missing wave line: {stdout}"));
    assert!(wave_line.contains("cleared"), "{wave_line}");

    let score_line = stdout
        .lines()
        .find(|line| line.starts_with("score "))
        .unwrap_or_else(|| panic!("missing score line: {stdout}"));
    let score: u64 = score_line
        .split_whitespace()
        .nth(1)
        .and_then(|value| value.parse().ok())
        .unwrap_or_else(|| panic!("unparsable score line: {score_line}"));
    assert!(score > 0, "{score_line}");
    assert_eq!(score % 5, 0, "only small balloons were popped: {score_line}");
}

#[test]
fn rejects_cyclic_registries() {
    let path = write_registry(
        "cyclic",
        r#"
            fallback = "LOOP"

            [[types]]
            id = "LOOP"
            name = "Loop"
            health = 1
            speed_multiplier = 1.0
            color = 0
            children = ["LOOP"]
        "#,
    );
    let output = Command::new(env!("CARGO_BIN_EXE_balloon-defence"))
        .arg("--registry")
        .arg(&path)
        .output()
        .expect("failed to run balloon-defence");
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("eventually spawns itself"), "{stderr}");
}

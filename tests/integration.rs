use std::process::Command;

const WP_CONFIG: &str = "<?php
define( 'DB_NAME', 'wp_main' );
define( 'WP_DEBUG', false );
define( 'ABSPATH', __DIR__ . '/' );
$table_prefix = 'wp_';

require_once ABSPATH . 'wp-settings.php';
";

fn wpconf() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wpconf"))
}

fn fixture(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("wp-config.php");
    std::fs::write(&path, WP_CONFIG).unwrap();
    path
}

fn stdout_line(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn get_prints_scalar_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let output = wpconf().arg("get").arg(&config).arg("DB_NAME").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_line(&output), "wp_main");

    let output = wpconf().arg("get").arg(&config).arg("WP_DEBUG").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_line(&output), "false");
}

#[test]
fn get_falls_back_to_expression_text() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let output = wpconf().arg("get").arg(&config).arg("ABSPATH").output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_line(&output), "__DIR__ . '/'");
}

#[test]
fn get_absent_exits_one_without_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let output = wpconf().arg("get").arg(&config).arg("WP_CACHE").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_line(&output), "");

    let output = wpconf()
        .args(["get", "--default", "absent"])
        .arg(&config)
        .arg("WP_CACHE")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_line(&output), "absent");
}

#[test]
fn get_json_is_typed() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let output = wpconf()
        .args(["get", "--json"])
        .arg(&config)
        .arg("WP_DEBUG")
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_str(&stdout_line(&output)).unwrap();
    assert_eq!(parsed, serde_json::Value::Bool(false));
}

#[test]
fn set_then_get_round_trips_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let status = wpconf()
        .arg("set")
        .arg(&config)
        .args(["WP_DEBUG", "true"])
        .status()
        .unwrap();
    assert!(status.success());

    let output = wpconf().arg("get").arg(&config).arg("WP_DEBUG").output().unwrap();
    assert_eq!(stdout_line(&output), "true");

    // Untouched directives keep their formatting.
    let text = std::fs::read_to_string(&config).unwrap();
    assert!(text.contains("define( 'DB_NAME', 'wp_main' );"));
    assert!(text.contains("define( 'WP_DEBUG', true );"));
}

#[test]
fn set_inserts_missing_directive_before_the_require() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let status = wpconf()
        .arg("set")
        .arg(&config)
        .args(["WP_MEMORY_LIMIT", "256M"])
        .status()
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&config).unwrap();
    let define_at = text.find("define('WP_MEMORY_LIMIT', '256M');").unwrap();
    let require_at = text.find("require_once").unwrap();
    assert!(define_at < require_at);
}

#[test]
fn replace_absent_directive_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let status = wpconf()
        .arg("replace")
        .arg(&config)
        .args(["WP_CACHE", "true"])
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(std::fs::read_to_string(&config).unwrap(), WP_CONFIG);
}

#[test]
fn typed_set_overrides_inference() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);

    let status = wpconf()
        .arg("set")
        .arg(&config)
        .args(["WP_VERSION_TAG", "true", "--as", "string"])
        .status()
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&config).unwrap();
    assert!(text.contains("define('WP_VERSION_TAG', 'true');"));
}

#[test]
fn apply_batches_all_pairs_in_one_save() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(&dir);
    let changes = dir.path().join("changes.toml");
    std::fs::write(
        &changes,
        "WP_DEBUG = true\nFS_METHOD = \"direct\"\nAUTOSAVE_INTERVAL = 120\n",
    )
    .unwrap();

    let output = wpconf().arg("apply").arg(&config).arg(&changes).output().unwrap();
    assert!(
        output.status.success(),
        "apply failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let out = wpconf().arg("get").arg(&config).arg("FS_METHOD").output().unwrap();
    assert_eq!(stdout_line(&out), "direct");
    let out = wpconf().arg("get").arg(&config).arg("AUTOSAVE_INTERVAL").output().unwrap();
    assert_eq!(stdout_line(&out), "120");
    let out = wpconf().arg("get").arg(&config).arg("WP_DEBUG").output().unwrap();
    assert_eq!(stdout_line(&out), "true");
}

#[test]
fn missing_file_fails_with_diagnostic() {
    let output = wpconf()
        .args(["get", "/nonexistent/wp-config.php", "WP_DEBUG"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("file not found"));
}

#[test]
fn unparseable_file_fails_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.php");
    std::fs::write(&path, "<?php define('X', ;\n").unwrap();

    let output = wpconf().arg("get").arg(&path).arg("X").output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("parse failed"));
}

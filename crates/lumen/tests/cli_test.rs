//! Integration tests for the `lumen` CLI binary.
//!
//! Argument parsing, help output and completions run without a facade;
//! bridge-bound commands run against a `wiremock` facade.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `lumen` binary with env isolation.
///
/// Clears all `LUMEN_*` env vars and points config and data directories
/// at `home` so tests never touch the user's real configuration.
fn lumen_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lumen");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("LUMEN_PROFILE")
        .env_remove("LUMEN_BRIDGE")
        .env_remove("LUMEN_OUTPUT")
        .env_remove("LUMEN_INSECURE")
        .env_remove("LUMEN_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> Output {
    let home = tempfile::tempdir().unwrap();
    let mut cmd = lumen_cmd(home.path());
    cmd.arg("--bridge").arg(server.uri()).args(args);
    tokio::task::spawn_blocking(move || {
        let output = cmd.output().unwrap();
        drop(home);
        output
    })
    .await
    .unwrap()
}

fn positions_body() -> serde_json::Value {
    json!({
        "lights": [
            {"name": "Hue Play 1", "enabled": true, "position": "left"},
            {"name": "Hue Play 2", "enabled": false, "position": "right"}
        ],
        "positions": [
            {"id": "none", "label": "None", "description": "Not mirrored"},
            {"id": "left", "label": "Left", "description": "Left edge"},
            {"id": "right", "label": "Right", "description": "Right edge"}
        ]
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = lumen_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("configs")
            .and(predicate::str::contains("lights"))
            .and(predicate::str::contains("positions"))
            .and(predicate::str::contains("mirror")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lumen"));
}

#[test]
fn test_positions_subcommands_exist() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["positions", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("slots")
                .and(predicate::str::contains("enable"))
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("reset")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases without a facade ────────────────────────────────────

#[test]
fn test_no_bridge_configured() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["lights", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lumen config init"));
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["--profile", "attic", "bridge", "status"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("attic"));
}

#[test]
fn test_non_numeric_transition_rejected_before_network() {
    // Port 9 (discard) is never contacted: validation fails first.
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args([
            "--bridge",
            "http://127.0.0.1:9",
            "configs",
            "apply",
            "Movie Night",
            "--transition",
            "soon",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("transition time"));
}

#[test]
fn test_unknown_position_rejected() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["--bridge", "http://127.0.0.1:9", "positions", "show", "sideways"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("top-left"));
}

#[test]
fn test_fps_out_of_range() {
    let home = tempfile::tempdir().unwrap();
    let output = lumen_cmd(home.path())
        .args(["--bridge", "http://127.0.0.1:9", "mirror", "start", "--fps", "90"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unreachable_bridge_is_connection_error() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["--bridge", "http://127.0.0.1:9", "--timeout", "2", "bridge", "status"])
        .assert()
        .code(7);
}

// ── Local configuration ─────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_set_theme_writes_state_file() {
    let home = tempfile::tempdir().unwrap();
    lumen_cmd(home.path())
        .args(["config", "set-theme", "dark"])
        .assert()
        .success();
    let state = std::fs::read_to_string(home.path().join("data/lumen/state.toml")).unwrap();
    assert!(state.contains("theme = \"dark\""), "state.toml:\n{state}");
}

// ── Against a mocked facade ─────────────────────────────────────────

#[tokio::test]
async fn test_lights_status_sorted_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lights/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"lights": [
            {"name": "Lamp B", "color": {"r": 255, "g": 0, "b": 0}, "on": true, "reachable": true, "brightness": 254},
            {"name": "Lamp A", "color": {"r": 0, "g": 0, "b": 255}, "on": false, "reachable": false, "brightness": 0}
        ]})))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "lights", "status"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Lamp A\nLamp B\n");

    let output = run_against(&server, &["lights", "status"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unreachable"), "{stdout}");
    assert!(stdout.contains("#ff0000"), "{stdout}");
}

#[tokio::test]
async fn test_apply_sends_form_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply"))
        .and(body_json(json!({
            "config_name": "Movie Night",
            "transition_time_secs": 5,
            "duration_minutes": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Configuration 'Movie Night' applied",
            "details": {"config_name": "Movie Night", "transition_time_secs": 5.0, "duration_minutes": 30.0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["configs", "apply", "Movie Night", "-t", "5", "-d", "30"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("'Movie Night' applied"));
}

#[tokio::test]
async fn test_apply_unknown_configuration_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/apply"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Configuration 'X' not found"})),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["configs", "apply", "X"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_bridge_status_plain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bridge/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "connected": true, "bridge_ip": "192.168.1.2", "light_count": 4
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "bridge", "status"]).await;
    assert_eq!(String::from_utf8_lossy(&output.stdout), "connected\n");

    let output = run_against(&server, &["bridge", "status"]).await;
    assert!(
        String::from_utf8_lossy(&output.stdout)
            .contains("Bridge connected (192.168.1.2) - 4 lights")
    );
}

#[tokio::test]
async fn test_positions_enable_saves_whole_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/positions"))
        .and(body_json(json!({"lights": [
            {"name": "Hue Play 1", "enabled": true, "position": "left"},
            {"name": "Hue Play 2", "enabled": true, "position": "right"}
        ]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Positions saved"})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["positions", "enable", "Hue Play 2"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Positions saved"));

    let output = run_against(&server, &["positions", "enable", "Ghost"]).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test]
async fn test_positions_show_lists_enabled_lights() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body()))
        .mount(&server)
        .await;

    let output = run_against(&server, &["positions", "show", "left"]).await;
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Left (left):\n  Hue Play 1\n"
    );

    let output = run_against(&server, &["positions", "show", "right"]).await;
    assert!(String::from_utf8_lossy(&output.stdout).contains("no lights"));
}

#[tokio::test]
async fn test_reset_requires_confirmation_when_not_a_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/positions/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body()))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["positions", "reset"]).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_reset_with_yes_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/positions/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/positions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(positions_body()))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-y", "-o", "plain", "positions", "reset"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Hue Play 1\nHue Play 2\n"
    );
}

#[tokio::test]
async fn test_mirror_commands_use_http_without_socket() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mirror/start"))
        .and(body_json(json!({"fps": 30, "brightness": 200})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Mirroring started",
            "status": {"running": true, "fps": 30, "brightness": 200, "colors": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mirror/stop"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Mirroring is not active"})),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["mirror", "start", "--fps", "30"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Mirroring started"));

    let output = run_against(&server, &["mirror", "stop"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Mirroring is not active"));
}

#[tokio::test]
async fn test_mirror_status_hides_colors_when_stopped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mirror/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "running": false, "fps": 25, "brightness": 200,
            "colors": {"Strip": [255, 0, 0]}
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["mirror", "status"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Mirroring inactive"), "{stdout}");
    assert!(!stdout.contains("#ff0000"), "{stdout}");
}

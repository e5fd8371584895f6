//! Integration tests for the `dtdesk` CLI binary.
//!
//! Local commands run against a throwaway home directory. Server-bound
//! commands run against a wiremock server standing in for dtale-desktop.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `dtdesk` binary with env isolation.
///
/// Clears all `DTDESK_*` env vars and points config and data
/// directories below `home`.
fn dtdesk_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dtdesk");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("DTDESK_PROFILE")
        .env_remove("DTDESK_SERVER")
        .env_remove("DTDESK_OUTPUT")
        .env_remove("DTDESK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn source_json(id: &str, sort_value: i64, nodes: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Source {id}"),
        "packageName": id,
        "packagePath": format!("/sources/{id}"),
        "nodes": nodes,
        "nodesFullyLoaded": true,
        "visible": true,
        "editable": true,
        "sortValue": sort_value,
        "listPaths": "def main(): ...",
        "getData": "def main(path): ...",
        "saveData": ""
    })
}

/// A server with push disabled and two sources, `s2` sorting first.
async fn mock_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "disableAddDataSources": false,
            "disableEditDataSources": false,
            "disableEditLayout": true,
            "disableProfileReports": false,
            "enableWebsocketConnections": false,
            "appTitle": "Research"
        })))
        .mount(&server)
        .await;

    let nodes = json!({
        "a": {
            "sourceId": "s1",
            "path": "/data/a.csv",
            "dataId": "a",
            "dtaleUrl": "http://localhost:40000/dtale/main/a",
            "sortValue": 0
        }
    });
    Mock::given(method("GET"))
        .and(path("/source/list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            source_json("s1", 2, nodes),
            source_json("s2", 1, json!({}))
        ])))
        .mount(&server)
        .await;

    server
}

/// Run a prepared command off the async runtime so the mock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = dtdesk_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("dtale-desktop")
            .and(predicate::str::contains("sources"))
            .and(predicate::str::contains("nodes"))
            .and(predicate::str::contains("layout")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dtdesk"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_page_rejected() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .args(["nodes", "view", "a", "--page", "heatmap"])
        .assert()
        .code(2);
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_no_server_configured() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .arg("settings")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No server configured"));
}

#[test]
fn test_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .args(["--profile", "prod", "settings"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Profile 'prod' not found"));
}

#[test]
fn test_config_path_under_config_home() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_add_profile_then_show() {
    let home = tempfile::tempdir().unwrap();

    dtdesk_cmd(home.path())
        .args([
            "config",
            "add-profile",
            "lab",
            "--server",
            "http://lab:5000",
            "--page-size",
            "25",
        ])
        .assert()
        .success();

    dtdesk_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default_profile = \"lab\"")
                .and(predicate::str::contains("[profiles.lab]"))
                .and(predicate::str::contains("page_size = 25")),
        );
}

#[test]
fn test_add_profile_rejects_bad_url() {
    let home = tempfile::tempdir().unwrap();
    let output = dtdesk_cmd(home.path())
        .args(["config", "add-profile", "lab", "--server", "ftp://lab"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!home.path().join("config").join("dtdesk").join("config.toml").exists());
}

#[test]
fn test_use_unknown_profile() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .args(["config", "use", "nope"])
        .assert()
        .code(4);
}

// ── Theme ───────────────────────────────────────────────────────────

#[test]
fn test_theme_defaults_to_light() {
    let home = tempfile::tempdir().unwrap();
    dtdesk_cmd(home.path())
        .args(["theme", "get"])
        .assert()
        .success()
        .stdout("light\n");
}

#[test]
fn test_theme_set_persists() {
    let home = tempfile::tempdir().unwrap();

    dtdesk_cmd(home.path())
        .args(["theme", "set", "dark"])
        .assert()
        .success();

    dtdesk_cmd(home.path())
        .args(["theme", "get"])
        .assert()
        .success()
        .stdout("dark\n");
}

// ── Server-bound commands ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_table() {
    let server = mock_server().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "settings"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Research"), "{stdout}");
    assert!(stdout.contains("Edit layout:       disabled"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sources_list_plain_in_display_order() {
    let server = mock_server().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "-o", "plain", "sources", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "s2\ns1\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sources_list_json() {
    let server = mock_server().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "-o", "json", "sources", "list"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body[0]["id"], "s2");
    assert_eq!(body[1]["nodes"]["a"]["path"], "/data/a.csv");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_unknown_source() {
    let server = mock_server().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "sources", "show", "nope"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("Source 'nope' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_layout_edit_disabled() {
    let server = mock_server().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "layout", "toggle", "s1"]);
    let output = run(cmd).await;

    assert!(!output.status.success());
    assert!(combined_output(&output).contains("'edit layout' is disabled"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_kill_node_prints_dormant_node() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/node/kill/a/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sourceId": "s1",
            "path": "/data/a.csv",
            "dataId": "a",
            "dtaleUrl": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "nodes", "kill", "a"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Status:      dormant"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_request_reported_once() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/node/kill/a/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom-detail"))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "nodes", "kill", "a"]);
    let output = run(cmd).await;

    assert!(!output.status.success());
    let all = combined_output(&output);
    assert_eq!(all.matches("boom-detail").count(), 1, "{all}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_view_node_prints_url() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/node/view/a/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sourceId": "s1",
            "path": "/data/a.csv",
            "dataId": "a",
            "dtaleUrl": "http://localhost:40000/dtale/main/a",
            "dtaleChartsUrl": "http://localhost:40000/dtale/charts/a"
        })))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "nodes", "view", "a", "--page", "charts"]);
    let output = run(cmd).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "http://localhost:40000/dtale/charts/a\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_requires_push_channel() {
    let server = mock_server().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = dtdesk_cmd(home.path());
    cmd.args(["--server", &server.uri(), "watch", "--duration", "1"]);
    let output = run(cmd).await;

    assert!(!output.status.success());
    assert!(combined_output(&output).contains("'push channel' is disabled"));
}

//! Integration tests for the `rappi` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without any service; the remaining tests drive the binary against a
//! wiremock server configured purely through `RAPPI_*` variables.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `rappi` binary with env isolation.
///
/// Clears all `RAPPI_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn rappi_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rappi");
    cmd.env("HOME", "/tmp/rappi-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/rappi-cli-test-nonexistent")
        .env_remove("RAPPI_PROFILE")
        .env_remove("RAPPI_MARKETPLACE_URL")
        .env_remove("RAPPI_TOKEN")
        .env_remove("RAPPI_AVAILABILITY_URL")
        .env_remove("RAPPI_AVAILABILITY_LOGIN_URL")
        .env_remove("RAPPI_CLIENT_ID")
        .env_remove("RAPPI_CLIENT_SECRET")
        .env_remove("RAPPI_OUTPUT")
        .env_remove("RAPPI_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// `rappi_cmd` wired to the marketplace mock.
fn marketplace_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = rappi_cmd();
    cmd.env("RAPPI_MARKETPLACE_URL", format!("{}/api", server.uri()))
        .env("RAPPI_TOKEN", "seed-token");
    cmd
}

/// `rappi_cmd` wired to the availability mock.
fn availability_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = rappi_cmd();
    cmd.env("RAPPI_AVAILABILITY_URL", server.uri())
        .env(
            "RAPPI_AVAILABILITY_LOGIN_URL",
            format!("{}/oauth/token", server.uri()),
        )
        .env("RAPPI_CLIENT_ID", "cid")
        .env("RAPPI_CLIENT_SECRET", "csecret");
    cmd
}

async fn mount_marketplace_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Auth-Int", "bearer-1"))
        .mount(server)
        .await;
}

async fn mount_availability_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "access-1" })),
        )
        .mount(server)
        .await;
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = rappi_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    rappi_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("orders")
            .and(predicate::str::contains("stores"))
            .and(predicate::str::contains("items"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    rappi_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rappi"));
}

#[test]
fn test_orders_help_lists_watch() {
    rappi_cmd()
        .args(["orders", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("take")
                .and(predicate::str::contains("reject"))
                .and(predicate::str::contains("cancelled"))
                .and(predicate::str::contains("watch")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    rappi_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    rappi_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = rappi_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_orders_list_without_config() {
    rappi_cmd()
        .args(["orders", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("marketplace_url"));
}

#[test]
fn test_reject_requires_reason() {
    rappi_cmd()
        .args(["orders", "reject", "42"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--reason"));
}

#[test]
fn test_items_set_requires_store_or_file() {
    rappi_cmd()
        .args(["items", "set", "--on", "sku-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--store"));
}

#[test]
fn test_unknown_profile() {
    rappi_cmd()
        .args(["--profile", "lima", "orders", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lima"));
}

#[test]
fn test_stores_set_rejects_overlap() {
    // Validation happens before any request, so the URLs are never contacted.
    rappi_cmd()
        .env("RAPPI_AVAILABILITY_URL", "http://127.0.0.1:1")
        .env("RAPPI_AVAILABILITY_LOGIN_URL", "http://127.0.0.1:1/oauth/token")
        .env("RAPPI_CLIENT_ID", "cid")
        .env("RAPPI_CLIENT_SECRET", "csecret")
        .args(["stores", "set", "--on", "1,2", "--off", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ids both turned on and off: 2"));
}

#[test]
fn test_invalid_output_format() {
    let output = rappi_cmd()
        .args(["--output", "invalid", "orders", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about output format:\n{text}"
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` renders the default config when no file exists.
    rappi_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_path() {
    rappi_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_use_unknown_profile() {
    rappi_cmd()
        .args(["config", "use", "lima"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lima"));
}

// ── Against a mock marketplace ──────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_orders_list_json() {
    let server = MockServer::start().await;
    mount_marketplace_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(header("X-Auth-Int", "bearer-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "order": { "id": "42", "items": [] } },
            { "order": { "id": "43", "items": [] } }
        ])))
        .mount(&server)
        .await;

    let output = marketplace_cmd(&server)
        .args(["orders", "list", "--output", "plain"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "42\n43\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orders_list_empty_sentinel() {
    let server = MockServer::start().await;
    mount_marketplace_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    marketplace_cmd(&server)
        .args(["orders", "list", "-o", "json-compact"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orders_take_rejected() {
    let server = MockServer::start().await;
    mount_marketplace_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/orders/take/42"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errorCode": 3,
            "message": "order already taken"
        })))
        .mount(&server)
        .await;

    marketplace_cmd(&server)
        .args(["orders", "take", "42"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("order already taken"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orders_invalid_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    marketplace_cmd(&server)
        .args(["orders", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_orders_watch_once_reports_new_orders() {
    let server = MockServer::start().await;
    mount_marketplace_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "order": {
                "id": "42",
                "items": [{ "name": "Burger", "units": 2, "price": "12.50" }]
            }
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "orderId": "40",
            "storeId": "900",
            "cancelReason": "customer request"
        }])))
        .mount(&server)
        .await;

    marketplace_cmd(&server)
        .args([
            "--color",
            "never",
            "orders",
            "watch",
            "--once",
            "--cancelled-url",
            "orders/cancelled",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Order 42\n  Burger x 2 $12.50").and(
                predicate::str::contains("Cancelled order 40 (store 900): customer request"),
            ),
        );
}

// ── Against a mock availability service ─────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_stores_set() {
    let server = MockServer::start().await;
    mount_availability_login(&server).await;
    Mock::given(method("PUT"))
        .and(path("/availability/stores"))
        .and(header("x-authorization", "Bearer access-1"))
        .and(body_json(json!({ "turn_on": ["1"], "turn_off": ["2", "3"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    availability_cmd(&server)
        .args(["stores", "set", "--on", "1", "--off", "2", "--off", "3"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Stores updated: 1 on, 2 off"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_items_set_from_file() {
    let server = MockServer::start().await;
    mount_availability_login(&server).await;
    let requests = json!([
        { "store_integration_id": "900", "items": { "turn_on": ["sku-1"], "turn_off": [] } },
        { "store_integration_id": "901", "items": { "turn_on": [], "turn_off": ["sku-2"] } }
    ]);
    Mock::given(method("PUT"))
        .and(path("/availability/stores/items"))
        .and(body_json(requests.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("items.json");
    std::fs::write(&file, requests.to_string()).unwrap();

    availability_cmd(&server)
        .args(["items", "set", "--from-file"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Items updated in 2 store(s)"));
}

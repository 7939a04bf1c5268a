//! Configuration layering as seen through `calc-verify config`.

use crate::common::{
    TestConfig, assert_contains, assert_exit_failure, assert_exit_success, calc_verify,
    init_test_logging,
};
use serde_json::Value;

fn config_json(cmd: &mut std::process::Command) -> Value {
    let output = cmd.args(["config", "--json"]).output().unwrap();
    assert_exit_success(&output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_defaults_when_nothing_is_set() {
    init_test_logging();
    let config = TestConfig::empty();
    let view = config_json(&mut calc_verify(&config));

    assert_eq!(view["primary_url"], "http://localhost:5000");
    assert_eq!(view["primary_url_source"], "default");
    assert_eq!(view["mock_url"], "http://localhost:9090");
    assert_eq!(view["timeout_ms"], 2000);
    assert_eq!(view["findings"].as_array().unwrap().len(), 0);
}

#[test]
fn test_file_values_are_sourced_from_file() {
    init_test_logging();
    let config = TestConfig::with_content(
        "primary_url = \"http://calc.internal:8000\"\ntimeout_secs = 5\n",
    );
    let view = config_json(&mut calc_verify(&config));

    assert_eq!(view["primary_url"], "http://calc.internal:8000");
    assert_eq!(
        view["primary_url_source"],
        format!("file {}", config.path.display())
    );
    assert_eq!(view["timeout_ms"], 5000);
    assert_eq!(view["mock_url_source"], "default");
}

#[test]
fn test_env_overrides_file_and_cli_overrides_env() {
    init_test_logging();
    let config = TestConfig::with_content("mock_url = \"http://from-file:9090\"\n");
    let view = config_json(
        calc_verify(&config)
            .env("CALC_MOCK_URL", "http://from-env:9090")
            .env("CALC_BASE_URL", "http://from-env:5000")
            .args(["--primary-url", "http://from-cli:5000"]),
    );

    assert_eq!(view["mock_url"], "http://from-env:9090");
    assert_eq!(view["mock_url_source"], "env CALC_MOCK_URL");
    assert_eq!(view["primary_url"], "http://from-cli:5000");
    assert_eq!(view["primary_url_source"], "cli");
}

#[test]
fn test_invalid_env_timeout_is_rejected() {
    init_test_logging();
    let config = TestConfig::empty();
    let output = calc_verify(&config)
        .env("CALC_TIMEOUT_SECS", "forever")
        .arg("config")
        .output()
        .unwrap();

    assert_exit_failure(&output);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "CALC_TIMEOUT_SECS");
}

#[test]
fn test_unknown_file_key_is_rejected() {
    init_test_logging();
    let config = TestConfig::with_content("base = \"http://localhost:5000\"\n");
    let output = calc_verify(&config).arg("config").output().unwrap();

    assert_exit_failure(&output);
    assert_contains(
        &String::from_utf8_lossy(&output.stderr),
        "Failed to load configuration",
    );
}

#[test]
fn test_invalid_url_is_reported_as_error() {
    init_test_logging();
    let config = TestConfig::empty();
    let output = calc_verify(&config)
        .args(["config", "--mock-url", "ftp://calc:21"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_exit_failure(&output);
    assert_contains(&stdout, "error: ");
    assert_contains(&stdout, "mock_url");
}

#[test]
fn test_same_url_for_both_endpoints_is_a_warning() {
    init_test_logging();
    let config = TestConfig::empty();
    let output = calc_verify(&config)
        .args([
            "config",
            "--primary-url",
            "http://localhost:5000",
            "--mock-url",
            "http://localhost:5000",
        ])
        .output()
        .unwrap();

    assert_exit_success(&output);
    assert_contains(&String::from_utf8_lossy(&output.stdout), "warning: ");
}

#[test]
fn test_unknown_file_log_level_is_rejected() {
    init_test_logging();
    let config = TestConfig::with_content("log_level = \"chatty\"\n");
    let output = calc_verify(&config).arg("config").output().unwrap();

    assert_exit_failure(&output);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "invalid log_level 'chatty'");
}

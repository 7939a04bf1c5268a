//! End-to-end runs of the calc-verify binary against in-process services.

use crate::common::{
    TestConfig, assert_contains, assert_exit_failure, assert_exit_success, calc_verify,
    init_test_logging,
};
use crate::test_log;
use calc_common::MockCalculatorServer;
use std::net::TcpListener;

struct Services {
    primary: MockCalculatorServer,
    mock: MockCalculatorServer,
}

impl Services {
    fn start() -> Self {
        Self {
            primary: MockCalculatorServer::builder().start().expect("start primary"),
            mock: MockCalculatorServer::builder().start().expect("start mock"),
        }
    }

    fn args(&self) -> [String; 4] {
        [
            "--primary-url".to_string(),
            self.primary.base_url(),
            "--mock-url".to_string(),
            self.mock.base_url(),
        ]
    }
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

#[test]
fn test_help_lists_subcommands() {
    init_test_logging();
    let config = TestConfig::empty();
    let output = calc_verify(&config).arg("--help").output().unwrap();

    assert_exit_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_contains(&stdout, "Calculator API Verifier");
    assert_contains(&stdout, "run");
    assert_contains(&stdout, "check");
    assert_contains(&stdout, "config");
}

#[test]
fn test_run_passes_against_reference_services() {
    init_test_logging();
    let services = Services::start();
    let config = TestConfig::empty();

    let output = calc_verify(&config)
        .arg("run")
        .args(services.args())
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    test_log!("run output:\n{stdout}");

    assert_exit_success(&output);
    assert_eq!(stdout.matches("PASS").count(), 5);
    assert_contains(&stdout, "5 passed, 0 failed");
    assert_contains(&stdout, "-> 406 Not Acceptable: Division by zero");
    assert_eq!(services.mock.requests_served(), 1);
}

#[test]
fn test_run_json_report() {
    init_test_logging();
    let services = Services::start();
    let config = TestConfig::empty();

    let output = calc_verify(&config)
        .args(["run", "--json"])
        .args(services.args())
        .output()
        .unwrap();
    assert_exit_success(&output);

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["passed"], 5);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["timeout_ms"], 2000);
    assert_eq!(report["results"].as_array().unwrap().len(), 5);
}

#[test]
fn test_run_repeat_sends_each_request_again() {
    init_test_logging();
    let services = Services::start();
    let config = TestConfig::empty();

    let output = calc_verify(&config)
        .args(["run", "--repeat", "2"])
        .args(services.args())
        .output()
        .unwrap();
    assert_exit_success(&output);
    assert_eq!(services.primary.requests_served(), 8);
    assert_eq!(services.mock.requests_served(), 2);
}

#[test]
fn test_run_fails_when_services_are_down() {
    init_test_logging();
    let config = TestConfig::empty();
    let url = format!("http://127.0.0.1:{}", closed_port());

    let output = calc_verify(&config)
        .args(["run", "--primary-url", &url, "--mock-url", &url])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_exit_failure(&output);
    assert_eq!(stdout.matches("FAIL").count(), 5);
    assert_contains(&stdout, "0 passed, 5 failed");
}

#[test]
fn test_check_divide_by_zero_expects_406() {
    init_test_logging();
    let services = Services::start();
    let config = TestConfig::empty();

    let output = calc_verify(&config)
        .args(["check", "divide", "5", "0"])
        .args(services.args())
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_exit_success(&output);
    assert_contains(&stdout, "PASS divide(5,0)");
    assert_contains(&stdout, "Division by zero");
}

#[test]
fn test_check_json_on_explicit_endpoint() {
    init_test_logging();
    let services = Services::start();
    let config = TestConfig::empty();

    let output = calc_verify(&config)
        .args(["check", "add", "1.5", "-2", "--endpoint", "mock", "--json"])
        .args(services.args())
        .output()
        .unwrap();
    assert_exit_success(&output);

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["status"], "passed");
    assert_eq!(result["endpoint"], "mock");
    assert_eq!(result["observed"]["body"], "-0.5");
    assert_eq!(services.primary.requests_served(), 0);
}

#[test]
fn test_check_rejects_wrong_operand_count() {
    init_test_logging();
    let config = TestConfig::empty();

    let output = calc_verify(&config)
        .args(["check", "add", "1"])
        .output()
        .unwrap();
    assert_exit_failure(&output);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "add takes 2 operand(s)");
}

#[test]
fn test_check_rejects_unknown_operation() {
    init_test_logging();
    let config = TestConfig::empty();

    let output = calc_verify(&config)
        .args(["check", "modulo", "1", "2"])
        .output()
        .unwrap();
    assert_exit_failure(&output);
    assert_contains(&String::from_utf8_lossy(&output.stderr), "unknown operation");
}

#[test]
fn test_rejects_out_of_range_timeout() {
    init_test_logging();
    let config = TestConfig::empty();

    for bad in ["0", "1e30", "301"] {
        let output = calc_verify(&config)
            .args(["config", "--timeout-secs", bad])
            .output()
            .unwrap();
        assert_exit_failure(&output);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_contains(&stderr, "Invalid --timeout-secs");
        assert!(!stderr.contains("panicked"), "timeout {bad} panicked: {stderr}");
    }
}

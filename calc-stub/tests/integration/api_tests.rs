use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};

use calc_common::{CalcClient, CalcError, Operation, RequestDescriptor};

use crate::common::init_test_logging;

/// A calc-stub process on an ephemeral port, killed on drop.
struct StubProcess {
    child: Child,
    base_url: String,
}

impl StubProcess {
    fn spawn(extra_args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_calc-stub"))
            .args(["--port", "0"])
            .args(extra_args)
            .env_remove("CALC_LOG_FILE")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn calc-stub");

        let stdout = child.stdout.take().expect("stdout is piped");
        let mut line = String::new();
        BufReader::new(stdout)
            .read_line(&mut line)
            .expect("Failed to read listening line");
        let base_url = line
            .trim()
            .strip_prefix("listening on ")
            .unwrap_or_else(|| panic!("unexpected first line: {line}"))
            .to_string();
        crate::test_log!("calc-stub listening at {base_url}");

        Self { child, base_url }
    }
}

impl Drop for StubProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn test_calc_stub_help_includes_usage() {
    init_test_logging();
    let output = Command::new(env!("CARGO_BIN_EXE_calc-stub"))
        .arg("--help")
        .output()
        .expect("Failed to run calc-stub --help");

    assert!(output.status.success(), "calc-stub --help failed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--port"), "got: {stdout}");
    assert!(stdout.contains("--latency-ms"), "got: {stdout}");
}

#[test]
fn test_calc_stub_serves_contract() {
    init_test_logging();
    let stub = StubProcess::spawn(&[]);
    let client = CalcClient::default();

    let add = RequestDescriptor::new(&stub.base_url, Operation::Add, [1.0, 2.0]).unwrap();
    assert_eq!(client.get(&add).unwrap().body, "3");

    let sqrt = RequestDescriptor::new(&stub.base_url, Operation::Sqrt, [64.0]).unwrap();
    assert_eq!(client.get(&sqrt).unwrap().body, "8");

    let by_zero = RequestDescriptor::new(&stub.base_url, Operation::Divide, [5.0, 0.0]).unwrap();
    match client.get(&by_zero) {
        Err(CalcError::Http { status, reason }) => {
            assert_eq!(status, 406);
            assert!(reason.contains("Division by zero"), "reason: {reason}");
        }
        other => panic!("expected HTTP 406, got {other:?}"),
    }
}

#[test]
fn test_calc_stub_rejects_bad_host() {
    init_test_logging();
    let output = Command::new(env!("CARGO_BIN_EXE_calc-stub"))
        .args(["--host", "not an address", "--port", "0"])
        .output()
        .expect("Failed to run calc-stub");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid bind address"));
}

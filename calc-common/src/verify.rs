//! Contract checks for the calculator API.
//!
//! A [`ContractCase`] pairs an operation and operands with the expected
//! outcome. [`Verifier`] turns each case into one request against the
//! configured endpoint and compares what came back. A non-2xx response is a
//! pass when the case expects exactly that failure.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::{CalcClient, Outcome};
use crate::config::VerifierConfig;
use crate::errors::CalcError;
use crate::format::format_decimal;
use crate::operation::{Endpoint, Operation, RequestDescriptor};

/// Reason text the service must include when refusing to divide by zero.
pub const DIVISION_BY_ZERO: &str = "Division by zero";

/// What a case requires from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// Successful response with a verbatim body.
    Body { status: u16, body: String },
    /// Non-2xx response whose reason contains the given text.
    Failure { status: u16, reason_contains: String },
}

impl Expectation {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Body {
            status: 200,
            body: body.into(),
        }
    }

    pub fn failure(status: u16, reason_contains: impl Into<String>) -> Self {
        Self::Failure {
            status,
            reason_contains: reason_contains.into(),
        }
    }
}

/// One row of the contract table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCase {
    pub name: String,
    pub operation: Operation,
    pub operands: Vec<f64>,
    pub endpoint: Endpoint,
    pub expectation: Expectation,
}

impl ContractCase {
    pub fn new(
        name: impl Into<String>,
        operation: Operation,
        operands: impl Into<Vec<f64>>,
        expectation: Expectation,
    ) -> Self {
        Self {
            name: name.into(),
            operation,
            operands: operands.into(),
            endpoint: operation.default_endpoint(),
            expectation,
        }
    }

    /// Build a case whose expectation follows from the arithmetic.
    ///
    /// Division by zero expects the 406 failure. Square roots of negative
    /// numbers have no defined outcome and are rejected.
    pub fn arithmetic(operation: Operation, operands: impl Into<Vec<f64>>) -> Result<Self, CalcError> {
        let operands = operands.into();
        if operands.len() != operation.arity() {
            return Err(CalcError::InvalidRequest(format!(
                "{} takes {} operand(s), got {}",
                operation,
                operation.arity(),
                operands.len()
            )));
        }

        let rendered: Vec<String> = operands.iter().map(|v| format_decimal(*v)).collect();
        let name = format!("{}({})", operation, rendered.join(","));

        let expectation = match expected_body(operation, &operands) {
            Some(body) => Expectation::ok(body),
            None if operation == Operation::Divide => Expectation::failure(406, DIVISION_BY_ZERO),
            None => {
                return Err(CalcError::InvalidRequest(format!(
                    "no defined outcome for {name}"
                )));
            }
        };
        Ok(Self::new(name, operation, operands, expectation))
    }

    /// Send this case to a different endpoint than the operation's default.
    pub fn on(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// Body the service must return for a successful request, or `None` when
/// the request is expected to fail.
pub fn expected_body(operation: Operation, operands: &[f64]) -> Option<String> {
    operation.evaluate(operands).map(format_decimal)
}

/// The reference scenarios the service must satisfy.
pub fn default_cases() -> Vec<ContractCase> {
    vec![
        ContractCase::new("add", Operation::Add, [1.0, 2.0], Expectation::ok("3")),
        ContractCase::new(
            "multiply",
            Operation::Multiply,
            [5.0, 10.0],
            Expectation::ok("50"),
        ),
        ContractCase::new("divide", Operation::Divide, [5.0, 10.0], Expectation::ok("0.5")),
        ContractCase::new(
            "divide_by_zero",
            Operation::Divide,
            [5.0, 0.0],
            Expectation::failure(406, DIVISION_BY_ZERO),
        ),
        ContractCase::new("sqrt", Operation::Sqrt, [64.0], Expectation::ok("8")),
    ]
}

/// What the service actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observed {
    Success { status: u16, body: String },
    HttpError { status: u16, reason: String },
    TransportError { code: String, message: String },
}

impl Observed {
    fn from_result(result: &Result<Outcome, CalcError>) -> Self {
        match result {
            Ok(outcome) => Self::Success {
                status: outcome.status,
                body: outcome.body.clone(),
            },
            Err(CalcError::Http { status, reason }) => Self::HttpError {
                status: *status,
                reason: reason.clone(),
            },
            Err(other) => Self::TransportError {
                code: other.code().to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub url: String,
    pub endpoint: Endpoint,
    pub status: CaseStatus,
    pub observed: Observed,
    /// Why the case failed; `None` on pass.
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub primary_url: String,
    pub mock_url: String,
    pub timeout_ms: u64,
    pub passed: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
    pub results: Vec<CaseResult>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.passed())
    }
}

/// Runs contract cases against the configured endpoints.
pub struct Verifier {
    client: CalcClient,
    config: VerifierConfig,
}

impl Verifier {
    pub fn new(client: CalcClient, config: VerifierConfig) -> Self {
        Self { client, config }
    }

    pub fn from_config(config: VerifierConfig) -> Self {
        Self::new(CalcClient::from_config(&config), config)
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Perform one request for `case` and compare the outcome.
    pub fn check(&self, case: &ContractCase) -> CaseResult {
        let started = Instant::now();
        let base_url = self.config.base_url(case.endpoint);

        let descriptor =
            match RequestDescriptor::new(base_url, case.operation, case.operands.clone()) {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    return CaseResult {
                        name: case.name.clone(),
                        url: base_url.to_string(),
                        endpoint: case.endpoint,
                        status: CaseStatus::Failed,
                        observed: Observed::TransportError {
                            code: err.code().to_string(),
                            message: err.to_string(),
                        },
                        message: Some(err.to_string()),
                        elapsed_ms: 0,
                    };
                }
            };

        let result = self.client.get(&descriptor);
        let mismatch = compare(&case.expectation, &result);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &mismatch {
            None => info!(case = %case.name, url = %descriptor.url(), elapsed_ms, "case passed"),
            Some(reason) => {
                warn!(case = %case.name, url = %descriptor.url(), reason = %reason, "case failed")
            }
        }

        CaseResult {
            name: case.name.clone(),
            url: descriptor.url(),
            endpoint: case.endpoint,
            status: if mismatch.is_none() {
                CaseStatus::Passed
            } else {
                CaseStatus::Failed
            },
            observed: Observed::from_result(&result),
            message: mismatch,
            elapsed_ms,
        }
    }

    /// Repeat `case` and require every attempt to pass with the same outcome.
    pub fn check_idempotent(&self, case: &ContractCase, repeats: usize) -> CaseResult {
        let repeats = repeats.max(1);
        let mut first = self.check(case);
        let mut total_ms = first.elapsed_ms;

        for attempt in 2..=repeats {
            let next = self.check(case);
            total_ms += next.elapsed_ms;

            if !next.passed() {
                return CaseResult {
                    elapsed_ms: total_ms,
                    message: next
                        .message
                        .clone()
                        .map(|m| format!("attempt {attempt}: {m}")),
                    ..next
                };
            }
            if next.observed != first.observed {
                first.status = CaseStatus::Failed;
                first.message = Some(format!(
                    "attempt {attempt} returned {:?}, first attempt returned {:?}",
                    next.observed, first.observed
                ));
                first.elapsed_ms = total_ms;
                return first;
            }
        }

        first.elapsed_ms = total_ms;
        first
    }

    /// Run every case in order and collect a report.
    pub fn run(&self, cases: &[ContractCase]) -> SuiteReport {
        self.run_repeated(cases, 1)
    }

    /// Like [`Verifier::run`], checking each case `repeats` times.
    pub fn run_repeated(&self, cases: &[ContractCase], repeats: usize) -> SuiteReport {
        let started_at = Utc::now();
        let started = Instant::now();

        let results: Vec<CaseResult> = cases
            .iter()
            .map(|case| self.check_idempotent(case, repeats))
            .collect();
        let passed = results.iter().filter(|r| r.passed()).count();
        let failed = results.len() - passed;

        info!(passed, failed, "contract suite finished");

        SuiteReport {
            started_at,
            primary_url: self.config.primary_url.value.clone(),
            mock_url: self.config.mock_url.value.clone(),
            timeout_ms: self.config.timeout.value.as_millis() as u64,
            passed,
            failed,
            elapsed_ms: started.elapsed().as_millis() as u64,
            results,
        }
    }
}

/// `None` when the result satisfies the expectation, otherwise why not.
fn compare(expectation: &Expectation, result: &Result<Outcome, CalcError>) -> Option<String> {
    match (expectation, result) {
        (Expectation::Body { status, body }, Ok(outcome)) => {
            if outcome.status != *status {
                Some(format!("expected status {status}, got {}", outcome.status))
            } else if outcome.body != *body {
                Some(format!("expected body {body:?}, got {:?}", outcome.body))
            } else {
                None
            }
        }
        (Expectation::Body { status, .. }, Err(err)) => {
            Some(format!("expected status {status}, got error: {err}"))
        }
        (Expectation::Failure { status, .. }, Ok(outcome)) => Some(format!(
            "expected HTTP {status}, but request succeeded with status {} and body {:?}",
            outcome.status, outcome.body
        )),
        (
            Expectation::Failure {
                status,
                reason_contains,
            },
            Err(CalcError::Http {
                status: got,
                reason,
            }),
        ) => {
            if got != status {
                Some(format!("expected HTTP {status}, got HTTP {got} ({reason})"))
            } else if !reason.contains(reason_contains.as_str()) {
                Some(format!(
                    "reason {reason:?} does not contain {reason_contains:?}"
                ))
            } else {
                None
            }
        }
        (Expectation::Failure { status, .. }, Err(err)) => Some(format!(
            "expected HTTP {status}, got error: {err} ({})",
            err.remediation()
        )),
    }
}

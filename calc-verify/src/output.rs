//! Human-readable rendering of case results and configuration.

use calc_common::config::{ConfigWarning, Severity, Sourced};
use calc_common::{CaseResult, Observed, SuiteReport, VerifierConfig};
use colored::Colorize;
use std::fmt::Display;

use crate::commands::helpers::{humanize_millis, indent_lines};

pub fn case_line(result: &CaseResult) -> String {
    let badge = if result.passed() {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };
    let mut line = format!(
        "{badge} {:<16} {} {}",
        result.name,
        result.url.dimmed(),
        format!("({})", humanize_millis(result.elapsed_ms)).dimmed()
    );
    line.push('\n');
    line.push_str(&indent_lines(&observed_summary(&result.observed), "     "));
    if let Some(message) = &result.message {
        line.push('\n');
        line.push_str(&indent_lines(message, "     ").yellow().to_string());
    }
    line
}

fn observed_summary(observed: &Observed) -> String {
    match observed {
        Observed::Success { status, body } => format!("-> {status} {body:?}"),
        Observed::HttpError { status, reason } => format!("-> {status} {reason}"),
        Observed::TransportError { code, message } => format!("-> [{code}] {message}"),
    }
}

pub fn summary_line(report: &SuiteReport) -> String {
    let counts = format!("{} passed, {} failed", report.passed, report.failed);
    let counts = if report.is_success() {
        counts.green().bold()
    } else {
        counts.red().bold()
    };
    format!(
        "{counts} in {} (primary {}, mock {}, timeout {})",
        humanize_millis(report.elapsed_ms),
        report.primary_url,
        report.mock_url,
        humanize_millis(report.timeout_ms)
    )
}

pub fn config_lines(config: &VerifierConfig, findings: &[ConfigWarning]) -> Vec<String> {
    let mut lines = vec![
        config_row("primary_url", &config.primary_url.value, &config.primary_url),
        config_row("mock_url", &config.mock_url.value, &config.mock_url),
        config_row(
            "timeout",
            &humanize_millis(config.timeout.value.as_millis() as u64),
            &config.timeout,
        ),
        config_row("log_level", &config.log_level.value, &config.log_level),
    ];
    for finding in findings {
        let label = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        lines.push(format!("{label}: {finding}"));
    }
    lines
}

fn config_row<T>(name: &str, value: &impl Display, sourced: &Sourced<T>) -> String {
    format!(
        "{:<12} {} {}",
        name,
        value,
        format!("[{}]", sourced.describe_source()).dimmed()
    )
}

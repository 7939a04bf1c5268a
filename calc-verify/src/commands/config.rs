//! `calc-verify config`: resolved settings with their sources.

use anyhow::Result;
use calc_common::VerifierConfig;
use calc_common::config::{ConfigWarning, Severity, validate_config};
use serde::Serialize;

use crate::output;

#[derive(Serialize)]
struct ConfigView<'a> {
    primary_url: &'a str,
    primary_url_source: String,
    mock_url: &'a str,
    mock_url_source: String,
    timeout_ms: u64,
    timeout_source: String,
    log_level: &'a str,
    log_level_source: String,
    findings: &'a [ConfigWarning],
}

/// Prints the configuration; fails only when validation reports errors.
pub fn execute(config: &VerifierConfig, json: bool) -> Result<bool> {
    let findings = validate_config(config);

    if json {
        let view = ConfigView {
            primary_url: &config.primary_url.value,
            primary_url_source: config.primary_url.describe_source(),
            mock_url: &config.mock_url.value,
            mock_url_source: config.mock_url.describe_source(),
            timeout_ms: config.timeout.value.as_millis() as u64,
            timeout_source: config.timeout.describe_source(),
            log_level: &config.log_level.value,
            log_level_source: config.log_level.describe_source(),
            findings: &findings,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in output::config_lines(config, &findings) {
            println!("{line}");
        }
    }

    Ok(!findings.iter().any(|f| f.severity == Severity::Error))
}

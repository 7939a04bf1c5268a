//! Startup validation for verifier settings.

use super::settings::VerifierConfig;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Shortest base URL accepted; anything shorter is treated as unconfigured.
const MIN_URL_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl ConfigWarning {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check endpoints and timeout. Returns every finding, errors first.
pub fn validate_config(config: &VerifierConfig) -> Vec<ConfigWarning> {
    let mut findings = Vec::new();
    validate_url("primary_url", &config.primary_url.value, &mut findings);
    validate_url("mock_url", &config.mock_url.value, &mut findings);

    if config.primary_url.value.trim_end_matches('/') == config.mock_url.value.trim_end_matches('/')
    {
        findings.push(ConfigWarning::warning(
            "mock_url",
            "mock URL is the same as the primary URL",
        ));
    }

    let timeout = config.timeout.value;
    if timeout.is_zero() {
        findings.push(ConfigWarning::error("timeout", "timeout must be non-zero"));
    } else if timeout > Duration::from_secs(VerifierConfig::MAX_TIMEOUT_SECS) {
        findings.push(ConfigWarning::error(
            "timeout",
            format!(
                "timeout must be at most {}s, got {:.3}s",
                VerifierConfig::MAX_TIMEOUT_SECS,
                timeout.as_secs_f64()
            ),
        ));
    } else if timeout > Duration::from_secs(30) {
        findings.push(ConfigWarning::warning(
            "timeout",
            format!("timeout of {}s is unusually long", timeout.as_secs()),
        ));
    }

    findings.sort_by_key(|w| std::cmp::Reverse(w.severity == Severity::Error));
    findings
}

fn validate_url(field: &'static str, raw: &str, findings: &mut Vec<ConfigWarning>) {
    if raw.trim().len() < MIN_URL_LEN {
        findings.push(ConfigWarning::error(field, "URL not configured"));
        return;
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            findings.push(ConfigWarning::error(field, format!("invalid URL '{raw}': {e}")));
            return;
        }
    };

    match url.scheme() {
        "http" => {}
        "https" => findings.push(ConfigWarning::error(
            field,
            "https is not supported; the calculator API is checked over plain http",
        )),
        other => findings.push(ConfigWarning::error(
            field,
            format!("unsupported scheme '{other}' (expected http)"),
        )),
    }
    if url.host_str().is_none_or(str::is_empty) {
        findings.push(ConfigWarning::error(field, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        findings.push(ConfigWarning::error(
            field,
            "URL must not carry a query or fragment",
        ));
    }
    if url.path() != "/" {
        findings.push(ConfigWarning::warning(
            field,
            format!("requests will be sent below path '{}'", url.path()),
        ));
    }
}

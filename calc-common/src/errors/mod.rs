//! Error types for calculator API checks.
//!
//! Every error carries a stable code so CLI output and JSON reports can be
//! matched by tooling without parsing messages.
//!
//! # Error Code Ranges
//!
//! | Range      | Category    | Description                          |
//! |------------|-------------|--------------------------------------|
//! | E001-E099  | Config      | Configuration and setup errors       |
//! | E100-E199  | Network     | Transport-level failures             |
//! | E200-E299  | Http        | Non-2xx responses from the service   |
//! | E300-E399  | Request     | Malformed request descriptors        |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Broad grouping of [`CalcError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Config,
    Network,
    Http,
    Request,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Network => write!(f, "network"),
            Self::Http => write!(f, "http"),
            Self::Request => write!(f, "request"),
        }
    }
}

/// Errors produced while building or performing a calculator request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// No response arrived within the configured timeout.
    #[error("Request to {url} timed out after {}s", timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },

    /// Connection refused or host could not be resolved.
    #[error("Service unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// Any other transport failure (malformed response, I/O error, ...).
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The request descriptor could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CalcError {
    /// Stable error code in the `CALC-Exxx` format.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CALC-E001",
            Self::Timeout { .. } => "CALC-E100",
            Self::Unreachable { .. } => "CALC-E101",
            Self::Transport { .. } => "CALC-E102",
            Self::Http { .. } => "CALC-E200",
            Self::InvalidRequest(_) => "CALC-E300",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Config,
            Self::Timeout { .. } | Self::Unreachable { .. } | Self::Transport { .. } => {
                ErrorCategory::Network
            }
            Self::Http { .. } => ErrorCategory::Http,
            Self::InvalidRequest(_) => ErrorCategory::Request,
        }
    }

    /// HTTP status of a non-2xx response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Reason text of a non-2xx response, if this is one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Http { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Short hint printed next to the error by the CLI.
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::Config(_) => "Check CALC_* environment variables and the config file",
            Self::Timeout { .. } => "Increase --timeout-secs or check service load",
            Self::Unreachable { .. } => "Make sure the calculator service is running at the base URL",
            Self::Transport { .. } => "Inspect the service response with curl",
            Self::Http { .. } => "Compare the service implementation with the API contract",
            Self::InvalidRequest(_) => "Check the operation name and operand count",
        }
    }
}

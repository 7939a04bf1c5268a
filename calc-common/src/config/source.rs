//! Source tracking for configuration values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a configuration value came from, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
    Cli,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::File => write!(f, "file"),
            Self::Environment => write!(f, "environment"),
            Self::Cli => write!(f, "cli"),
        }
    }
}

/// A value together with the source that set it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigSource,
    /// Environment variable name when `source` is `Environment`.
    pub env_var: Option<String>,
    /// File path when `source` is `File`.
    pub file: Option<PathBuf>,
}

impl<T> Sourced<T> {
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::Default,
            env_var: None,
            file: None,
        }
    }

    pub fn from_env(value: T, var: impl Into<String>) -> Self {
        Self {
            value,
            source: ConfigSource::Environment,
            env_var: Some(var.into()),
            file: None,
        }
    }

    pub fn from_file(value: T, path: impl Into<PathBuf>) -> Self {
        Self {
            value,
            source: ConfigSource::File,
            env_var: None,
            file: Some(path.into()),
        }
    }

    pub fn from_cli(value: T) -> Self {
        Self {
            value,
            source: ConfigSource::Cli,
            env_var: None,
            file: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.source == ConfigSource::Default
    }

    /// Replace this value if `other` comes from a source of equal or higher precedence.
    pub fn merge(self, other: Sourced<T>) -> Sourced<T> {
        if other.source >= self.source { other } else { self }
    }

    /// Human-readable description of where the value came from.
    pub fn describe_source(&self) -> String {
        match (&self.source, &self.env_var, &self.file) {
            (ConfigSource::Environment, Some(var), _) => format!("env {var}"),
            (ConfigSource::File, _, Some(path)) => format!("file {}", path.display()),
            (source, _, _) => source.to_string(),
        }
    }
}

impl<T> Sourced<Option<T>> {
    /// `Some` only when a value is actually present, keeping its source.
    pub fn transpose(self) -> Option<Sourced<T>> {
        let Sourced {
            value,
            source,
            env_var,
            file,
        } = self;
        value.map(|value| Sourced {
            value,
            source,
            env_var,
            file,
        })
    }
}

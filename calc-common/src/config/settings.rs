//! Resolved verifier settings.
//!
//! Precedence, lowest first: built-in defaults, TOML file, `CALC_*`
//! environment variables, CLI flags.

use super::env::{EnvParser, LOG_LEVELS, expand_home, normalize_log_level};
use super::source::Sourced;
use super::validate::{ConfigWarning, Severity, validate_config};
use crate::errors::CalcError;
use crate::operation::Endpoint;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Contents of the optional TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub primary_url: Option<String>,
    pub mock_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, CalcError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CalcError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let file: Self = toml::from_str(&content)
            .map_err(|e| CalcError::Config(format!("failed to parse {}: {e}", path.display())))?;
        file.check()
            .map_err(|e| CalcError::Config(format!("{}: {e}", path.display())))?;
        Ok(file)
    }

    /// Apply the same bounds the environment parser enforces.
    fn check(&self) -> Result<(), String> {
        if let Some(secs) = self.timeout_secs {
            let max = VerifierConfig::MAX_TIMEOUT_SECS;
            if !(1..=max).contains(&secs) {
                return Err(format!("timeout_secs out of range: {secs} (valid: 1..={max})"));
            }
        }
        if let Some(level) = &self.log_level {
            if normalize_log_level(level).is_none() {
                return Err(format!(
                    "invalid log_level '{level}' (expected one of {})",
                    LOG_LEVELS.join(", ")
                ));
            }
        }
        Ok(())
    }
}

/// Endpoints and timeout used for every contract check.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifierConfig {
    pub primary_url: Sourced<String>,
    pub mock_url: Sourced<String>,
    pub timeout: Sourced<Duration>,
    pub log_level: Sourced<String>,
}

impl VerifierConfig {
    pub const DEFAULT_PRIMARY_URL: &'static str = "http://localhost:5000";
    pub const DEFAULT_MOCK_URL: &'static str = "http://localhost:9090";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
    pub const MAX_TIMEOUT_SECS: u64 = 300;

    /// Convert a timeout given in (possibly fractional) seconds, rejecting
    /// values that are not positive or exceed [`Self::MAX_TIMEOUT_SECS`].
    pub fn timeout_from_secs_f64(secs: f64) -> Result<Duration, CalcError> {
        let max = Self::MAX_TIMEOUT_SECS;
        let timeout = Duration::try_from_secs_f64(secs)
            .ok()
            .filter(|t| !t.is_zero() && *t <= Duration::from_secs(max))
            .ok_or_else(|| {
                CalcError::Config(format!("timeout must be within (0, {max}] seconds, got {secs}"))
            })?;
        Ok(timeout)
    }

    pub fn defaults() -> Self {
        Self {
            primary_url: Sourced::default_value(Self::DEFAULT_PRIMARY_URL.to_string()),
            mock_url: Sourced::default_value(Self::DEFAULT_MOCK_URL.to_string()),
            timeout: Sourced::default_value(Self::DEFAULT_TIMEOUT),
            log_level: Sourced::default_value("info".to_string()),
        }
    }

    /// Build a config pointing both endpoints at explicit URLs (used by tests
    /// and embedders that bypass the environment).
    pub fn for_urls(primary: impl Into<String>, mock: impl Into<String>) -> Self {
        Self::defaults()
            .with_primary_url(primary)
            .with_mock_url(mock)
    }

    /// Resolve defaults, the config file and the environment.
    ///
    /// The file is `explicit_file` if given, otherwise `CALC_CONFIG`, otherwise
    /// `<config dir>/calc-verify/config.toml` when it exists.
    pub fn load(explicit_file: Option<&Path>) -> Result<Self, CalcError> {
        let mut parser = EnvParser::new();
        let env_file = parser.get_optional_path("CONFIG").value;

        let file = match (explicit_file, env_file) {
            (Some(path), _) => Some(expand_home(&path.to_string_lossy())),
            (None, Some(path)) => Some(path),
            (None, None) => default_config_path().filter(|p| p.exists()),
        };

        let mut config = Self::defaults();
        if let Some(path) = file {
            debug!(path = %path.display(), "loading verifier config file");
            let file_config = FileConfig::from_path(&path)?;
            config = config.apply_file(&file_config, &path);
        }

        config.apply_env(&mut parser);
        let errors = parser.take_errors();
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CalcError::Config(joined));
        }
        Ok(config)
    }

    /// Overlay values present in a config file.
    pub fn apply_file(mut self, file: &FileConfig, path: &Path) -> Self {
        if let Some(url) = &file.primary_url {
            self.primary_url = self
                .primary_url
                .merge(Sourced::from_file(url.clone(), path));
        }
        if let Some(url) = &file.mock_url {
            self.mock_url = self.mock_url.merge(Sourced::from_file(url.clone(), path));
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = self
                .timeout
                .merge(Sourced::from_file(Duration::from_secs(secs), path));
        }
        if let Some(level) = file.log_level.as_deref().and_then(normalize_log_level) {
            self.log_level = self.log_level.merge(Sourced::from_file(level, path));
        }
        self
    }

    /// Overlay `CALC_*` environment variables. Parse errors accumulate in `parser`.
    pub fn apply_env(&mut self, parser: &mut EnvParser) {
        if let Some(url) = parser.get_url("BASE_URL").transpose() {
            self.primary_url = url;
        }
        if let Some(url) = parser.get_url("MOCK_URL").transpose() {
            self.mock_url = url;
        }

        let timeout = parser.get_timeout("TIMEOUT_SECS", self.timeout.value, Self::MAX_TIMEOUT_SECS);
        if !timeout.is_default() {
            self.timeout = timeout;
        }

        let level = parser.get_log_level("LOG_LEVEL", &self.log_level.value);
        if let Some(var) = level.env_var {
            self.log_level = Sourced::from_env(level.value, var);
        }
    }

    pub fn with_primary_url(mut self, url: impl Into<String>) -> Self {
        self.primary_url = Sourced::from_cli(url.into());
        self
    }

    pub fn with_mock_url(mut self, url: impl Into<String>) -> Self {
        self.mock_url = Sourced::from_cli(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Sourced::from_cli(timeout);
        self
    }

    /// Base URL serving the given endpoint.
    pub fn base_url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Primary => &self.primary_url.value,
            Endpoint::Mock => &self.mock_url.value,
        }
    }

    /// Run validation; `Err` if any finding has error severity.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, CalcError> {
        let findings = validate_config(self);
        let errors: Vec<String> = findings
            .iter()
            .filter(|w| w.severity == Severity::Error)
            .map(ToString::to_string)
            .collect();
        if errors.is_empty() {
            Ok(findings)
        } else {
            Err(CalcError::Config(errors.join("; ")))
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("calc-verify").join("config.toml"))
}

//! Calculator API Verifier - CLI
//!
//! Runs the calculator HTTP contract against a primary service and a mock
//! service (used for `sqrt`) and reports one line per case.

#![forbid(unsafe_code)]

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use calc_common::{LogConfig, VerifierConfig, init_logging};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

#[derive(Parser)]
#[command(name = "calc-verify")]
#[command(author, version, about = "Calculator API Verifier - HTTP contract checks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the primary calculator service
    #[arg(long, global = true)]
    primary_url: Option<String>,

    /// Base URL of the mock service answering sqrt
    #[arg(long, global = true)]
    mock_url: Option<String>,

    /// Per-request timeout in seconds (fractions allowed)
    #[arg(long, global = true)]
    timeout_secs: Option<f64>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference contract suite
    Run {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Send each request this many times and require identical outcomes
        #[arg(long, default_value = "1")]
        repeat: usize,
    },

    /// Check a single operation
    ///
    /// The expected result is computed locally; dividing by zero expects
    /// HTTP 406 with "Division by zero".
    Check {
        /// add, multiply, divide or sqrt
        operation: String,

        /// One operand for sqrt, two otherwise
        #[arg(required = true, num_args = 1..=2, allow_negative_numbers = true)]
        operands: Vec<f64>,

        /// Send to this endpoint instead of the operation's default
        #[arg(long, value_enum)]
        endpoint: Option<EndpointArg>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration and where each value came from
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EndpointArg {
    Primary,
    Mock,
}

impl From<EndpointArg> for calc_common::Endpoint {
    fn from(arg: EndpointArg) -> Self {
        match arg {
            EndpointArg::Primary => Self::Primary,
            EndpointArg::Mock => Self::Mock,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;

    let mut log_config = LogConfig::from_env(&config.log_level.value).with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logging_guards = init_logging(&log_config)?;
    debug!(
        primary = %config.primary_url.value,
        mock = %config.mock_url.value,
        timeout_ms = config.timeout.value.as_millis() as u64,
        "configuration resolved"
    );

    let success = match cli.command {
        Commands::Run { json, repeat } => commands::run::execute(config, repeat, json)?,
        Commands::Check {
            operation,
            operands,
            endpoint,
            json,
        } => commands::check::execute(
            config,
            &operation,
            operands,
            endpoint.map(Into::into),
            json,
        )?,
        Commands::Config { json } => commands::config::execute(&config, json)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Defaults, then file and environment, then CLI flags.
fn resolve_config(cli: &Cli) -> Result<VerifierConfig> {
    let mut config =
        VerifierConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = &cli.primary_url {
        config = config.with_primary_url(url.clone());
    }
    if let Some(url) = &cli.mock_url {
        config = config.with_mock_url(url.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        let timeout =
            VerifierConfig::timeout_from_secs_f64(secs).context("Invalid --timeout-secs")?;
        config = config.with_timeout(timeout);
    }
    Ok(config)
}

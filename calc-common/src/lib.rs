//! Shared building blocks for verifying the calculator HTTP API.
//!
//! The crate is organised bottom-up:
//! - [`operation`] describes a single request (operation, operands, base URL)
//! - [`client`] performs the blocking GET and classifies the response
//! - [`verify`] checks outcomes against the contract table
//! - [`mock_service`] is an in-process reference implementation of the service
//! - [`config`] and [`logging`] carry the ambient setup shared by the binaries

pub mod client;
pub mod config;
pub mod errors;
pub mod format;
pub mod logging;
pub mod mock_service;
pub mod operation;
pub mod verify;

pub use client::{CalcClient, Outcome};
pub use config::{ConfigSource, EnvParser, Sourced, VerifierConfig};
pub use errors::CalcError;
pub use format::{format_decimal, parse_operand};
pub use logging::{LogConfig, LogFormat, LoggingGuards, init_logging};
pub use mock_service::{MockCalculatorServer, MockCalculatorServerBuilder};
pub use operation::{Endpoint, Operation, RequestDescriptor};
pub use verify::{
    CaseResult, CaseStatus, ContractCase, DIVISION_BY_ZERO, Expectation, Observed, SuiteReport,
    Verifier, default_cases, expected_body,
};

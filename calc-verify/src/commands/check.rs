//! `calc-verify check`: one ad-hoc case.

use anyhow::{Context, Result};
use calc_common::{ContractCase, Endpoint, Operation, Verifier, VerifierConfig};

use crate::output;

pub fn execute(
    config: VerifierConfig,
    operation: &str,
    operands: Vec<f64>,
    endpoint: Option<Endpoint>,
    json: bool,
) -> Result<bool> {
    config.validate().context("Invalid configuration")?;

    let operation: Operation = operation.parse()?;
    let mut case = ContractCase::arithmetic(operation, operands)?;
    if let Some(endpoint) = endpoint {
        case = case.on(endpoint);
    }

    let result = Verifier::from_config(config).check(&case);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", output::case_line(&result));
    }
    Ok(result.passed())
}

//! `calc-verify run`: the reference contract suite.

use anyhow::{Context, Result};
use calc_common::{Verifier, VerifierConfig, default_cases};
use tracing::warn;

use crate::output;

pub fn execute(config: VerifierConfig, repeat: usize, json: bool) -> Result<bool> {
    for finding in config.validate().context("Invalid configuration")? {
        warn!("{finding}");
    }

    let verifier = Verifier::from_config(config);
    let report = verifier.run_repeated(&default_cases(), repeat);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for result in &report.results {
            println!("{}", output::case_line(result));
        }
        println!();
        println!("{}", output::summary_line(&report));
    }

    Ok(report.is_success())
}

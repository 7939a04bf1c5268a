//! Request descriptors for the calculator API.

use crate::errors::CalcError;
use crate::format::format_decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Arithmetic operations exposed under `/calc/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Multiply,
    Divide,
    Sqrt,
}

impl Operation {
    pub const ALL: [Operation; 4] = [Self::Add, Self::Multiply, Self::Divide, Self::Sqrt];

    /// Path segment used in the URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Sqrt => "sqrt",
        }
    }

    /// Number of operands the operation takes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Sqrt => 1,
            Self::Add | Self::Multiply | Self::Divide => 2,
        }
    }

    /// Which configured service answers this operation.
    pub fn default_endpoint(&self) -> Endpoint {
        match self {
            Self::Sqrt => Endpoint::Mock,
            Self::Add | Self::Multiply | Self::Divide => Endpoint::Primary,
        }
    }

    /// Evaluate locally. `None` when the service is expected to reject the input.
    pub fn evaluate(&self, operands: &[f64]) -> Option<f64> {
        match (self, operands) {
            (Self::Add, [a, b]) => Some(a + b),
            (Self::Multiply, [a, b]) => Some(a * b),
            (Self::Divide, [_, b]) if *b == 0.0 => None,
            (Self::Divide, [a, b]) => Some(a / b),
            (Self::Sqrt, [a]) if *a < 0.0 => None,
            (Self::Sqrt, [a]) => Some(a.sqrt()),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "multiply" => Ok(Self::Multiply),
            "divide" => Ok(Self::Divide),
            "sqrt" => Ok(Self::Sqrt),
            other => Err(CalcError::InvalidRequest(format!(
                "unknown operation '{other}' (expected add, multiply, divide or sqrt)"
            ))),
        }
    }
}

/// Which of the two configured base URLs a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Primary,
    Mock,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

/// One GET request against the calculator API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    base_url: String,
    operation: Operation,
    operands: Vec<f64>,
}

impl RequestDescriptor {
    /// Build a descriptor, checking operand count and values up front.
    pub fn new(
        base_url: impl Into<String>,
        operation: Operation,
        operands: impl Into<Vec<f64>>,
    ) -> Result<Self, CalcError> {
        let base_url = base_url.into();
        let operands = operands.into();

        if base_url.trim().is_empty() {
            return Err(CalcError::InvalidRequest("base URL is empty".to_string()));
        }
        if operands.len() != operation.arity() {
            return Err(CalcError::InvalidRequest(format!(
                "{} takes {} operand(s), got {}",
                operation,
                operation.arity(),
                operands.len()
            )));
        }
        if let Some(bad) = operands.iter().find(|v| !v.is_finite()) {
            return Err(CalcError::InvalidRequest(format!(
                "operand {bad} is not a finite number"
            )));
        }

        Ok(Self {
            base_url,
            operation,
            operands,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn operands(&self) -> &[f64] {
        &self.operands
    }

    /// Path portion, e.g. `/calc/divide/5/10`.
    pub fn path(&self) -> String {
        let mut path = format!("/calc/{}", self.operation);
        for operand in &self.operands {
            path.push('/');
            path.push_str(&format_decimal(*operand));
        }
        path
    }

    /// Full URL, without doubling the slash after the base.
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.url())
    }
}

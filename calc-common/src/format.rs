//! Decimal rendering shared by the client, the verifier and the reference service.
//!
//! The service answers with bare decimal strings: integral results carry no
//! fractional part (`3`, `50`, `8`) and everything else uses the shortest
//! representation that round-trips (`0.5`).

/// Largest magnitude rendered through the integer path. Beyond this, `f64`
/// cannot represent every integer and `Display` is used directly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Render a number the way the calculator service does.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        // -0.0 renders as "0"
        let int = value as i64;
        return int.to_string();
    }
    value.to_string()
}

/// Parse an operand taken from a request path.
///
/// Returns `None` for anything that is not a finite decimal number.
pub fn parse_operand(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

use crate::{ScraperError, ScraperResult};

/// Parses a displayed price, accepting `,` as the decimal separator.
///
/// Empty, zero, negative and non-finite amounts are rejected so a missing
/// price never turns into `0`.
pub fn parse_amount(text: &str) -> ScraperResult<f64> {
    let normalized = text.trim().replace(',', ".");
    let amount: f64 = normalized
        .parse()
        .map_err(|_| ScraperError::MalformedData(format!("unparsable amount {text:?}")))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ScraperError::MalformedData(format!(
            "amount {text:?} is not a positive number"
        )));
    }
    Ok(amount)
}

use crate::items::{Currency, PriceRecord};
use crate::{ScraperError, ScraperResult};
use log::{debug, warn};
use serde_json::Value;

/// Maximum number of records returned from the embedded store.
pub const MAX_STATE_RECORDS: usize = 32;

/// Lists the records of the page's `__wired__` relay store, or reports why it can't.
pub const WIRED_RECORDS_EXPRESSION: &str = r#"(() => {
  try {
    return Object.values(__wired__.records);
  } catch (err) {
    return { error: String(err) };
  }
})()"#;

const QUANTITY_TYPENAME: &str = "AssetQuantityType";

/// Reads listed prices from the embedded client-side store instead of the DOM.
#[derive(Debug, Clone, Copy)]
pub struct StateScan {
    currency: Currency,
}

impl StateScan {
    pub fn new(currency: Currency) -> Self {
        Self { currency }
    }

    /// Up to [`MAX_STATE_RECORDS`] prices in store order.
    ///
    /// `None` when the store is missing or malformed, or holds no usable quantity.
    pub fn price_distribution(&self, store: &Value) -> Option<Vec<PriceRecord>> {
        let records = match store {
            Value::Array(records) => records,
            Value::Object(map) if map.contains_key("error") => {
                warn!("Embedded state unavailable: {}", map["error"]);
                return None;
            }
            other => {
                warn!("Embedded state has unexpected shape: {}", type_name(other));
                return None;
            }
        };

        let prices: Vec<PriceRecord> = records
            .iter()
            .filter(|record| self.is_quantity(record))
            .filter_map(|record| match self.to_price(record) {
                Ok(price) => Some(price),
                Err(e) => {
                    debug!("Skipping quantity record: {}", e);
                    None
                }
            })
            .take(MAX_STATE_RECORDS)
            .collect();

        debug!(
            "Found {} {} quantities in {} store records",
            prices.len(),
            self.currency,
            records.len()
        );

        if prices.is_empty() {
            None
        } else {
            Some(prices)
        }
    }

    fn is_quantity(&self, record: &Value) -> bool {
        record.get("__typename").and_then(Value::as_str) == Some(QUANTITY_TYPENAME)
            && record.get(self.quantity_field()).is_some_and(is_truthy)
    }

    fn quantity_field(&self) -> &'static str {
        match self.currency {
            Currency::Eth => "quantityInEth",
        }
    }

    fn to_price(&self, record: &Value) -> ScraperResult<PriceRecord> {
        let raw = record
            .get("quantity")
            .and_then(raw_quantity)
            .ok_or_else(|| {
                ScraperError::MalformedData(format!("unreadable quantity in {record}"))
            })?;
        PriceRecord::from_smallest_unit(raw, self.currency).ok_or_else(|| {
            ScraperError::MalformedData(format!("non-positive quantity in {record}"))
        })
    }
}

/// Quantities arrive either as JSON numbers or as decimal strings too large for JS numbers.
fn raw_quantity(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<u128>().ok().map(|n| n as f64),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Currency {
    #[serde(rename = "ETH")]
    Eth,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Eth => "ETH",
        }
    }

    /// CSS selector of the unit icon rendered next to an amount in this currency.
    pub fn marker_selector(&self) -> &'static str {
        match self {
            Currency::Eth => ".Price--eth-icon",
        }
    }

    /// Smallest on-chain units per display unit (10^18 wei per ether).
    pub fn unit_scale(&self) -> f64 {
        match self {
            Currency::Eth => 1e18,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A positive amount in the currency's display unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub amount: f64,
    pub currency: Currency,
}

impl PriceRecord {
    /// Returns `None` for zero, negative or non-finite amounts.
    pub fn new(amount: f64, currency: Currency) -> Option<Self> {
        if amount.is_finite() && amount > 0.0 {
            Some(Self { amount, currency })
        } else {
            None
        }
    }

    /// Converts an integer quantity of the smallest on-chain unit (wei for ETH).
    pub fn from_smallest_unit(raw: f64, currency: Currency) -> Option<Self> {
        Self::new(raw / currency.unit_scale(), currency)
    }
}

impl fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

use serde::{Deserialize, Serialize};

use super::errors::PlotError;

/// A closing price as it arrives on the wire: a JSON number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    /// Coerce to a finite, non-negative `f64`
    pub fn to_f64(&self) -> Result<f64, PlotError> {
        match self {
            RawPrice::Number(n) => validate_price(*n, &n.to_string()),
            RawPrice::Text(s) => parse_price(s),
        }
    }
}

/// Parse a textual closing price
pub fn parse_price(raw: &str) -> Result<f64, PlotError> {
    let value: f64 = raw.trim().parse().map_err(|_| PlotError::Price {
        value: raw.to_string(),
        reason: "not a number".to_string(),
    })?;
    validate_price(value, raw)
}

fn validate_price(value: f64, raw: &str) -> Result<f64, PlotError> {
    if !value.is_finite() {
        return Err(PlotError::Price {
            value: raw.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    if value < 0.0 {
        return Err(PlotError::Price {
            value: raw.to_string(),
            reason: "must not be negative".to_string(),
        });
    }
    Ok(value)
}

use serde::{Deserialize, Serialize};

use crate::utils::RawPrice;

/// Envelope returned by GET /api/candles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<CandleSeries>>,
}

/// Candles for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleSeries {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Candles", default)]
    pub candles: Option<Vec<Candle>>,
}

/// One OHLC candle. Prices may be JSON numbers or strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    #[serde(default)]
    pub symbol: Option<String>,
    pub time: String,
    #[serde(default)]
    pub open: Option<RawPrice>,
    #[serde(default)]
    pub high: Option<RawPrice>,
    #[serde(default)]
    pub low: Option<RawPrice>,
    pub close: RawPrice,
}

/// Query parameters for GET /api/candles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandlesQuery {
    pub symbols: Vec<String>,
    pub days: u32,
    pub interval: String,
}

impl CandlesQuery {
    pub fn to_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("symbol", self.symbols.join(",")),
            ("days", self.days.to_string()),
            ("interval", self.interval.clone()),
        ]
    }
}

/// Comprehensive error type for API operations
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 404 Not Found
    NotFound(String),
    /// 5xx Server Error
    ServerError(u16, String),
    /// Other non-2xx statuses
    HttpError(u16, String),
    /// Network/request error
    RequestError(String),
    /// Deserialization error
    DeserializationError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ServerError(code, msg) => write!(f, "Server Error ({}): {}", code, msg),
            ApiError::HttpError(code, msg) => write!(f, "HTTP Error ({}): {}", code, msg),
            ApiError::RequestError(msg) => write!(f, "Request Error: {}", msg),
            ApiError::DeserializationError(msg) => write!(f, "Deserialization Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

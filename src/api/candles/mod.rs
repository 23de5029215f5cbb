pub mod client;
pub mod models;

pub use client::CandlesClient;
pub use models::{ApiError, Candle, CandleSeries, CandlesQuery, CandlesResponse};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::data_source::{DataSource, FetchRequest};
use crate::api::candles::{CandlesClient, CandlesQuery, CandlesResponse};
use crate::models::{Dataset, PricePoint, Series};
use crate::utils::{parse_interval, parse_timestamp, PlotError};

/// Loads closing prices from the candles HTTP API
pub struct ApiSource {
    client: CandlesClient,
}

impl ApiSource {
    pub fn new(client: CandlesClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ApiSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Dataset, PlotError> {
        // Reject a bad interval before going to the network
        parse_interval(&request.interval)?;
        if request.symbols.is_empty() {
            return Err(PlotError::Config("at least one symbol is required".to_string()));
        }

        let query = CandlesQuery {
            symbols: request.symbols.clone(),
            days: request.days,
            interval: request.interval.clone(),
        };
        info!(
            "Fetching {} symbols from {} (days={}, interval={})",
            query.symbols.len(),
            self.client.base_url(),
            query.days,
            query.interval
        );

        let response = self
            .client
            .get_candles(&query)
            .await
            .map_err(|e| PlotError::Transport(e.to_string()))?;

        into_dataset(response)
    }

    fn name(&self) -> &str {
        "api"
    }
}

/// Convert an API payload into a `Dataset`
///
/// A payload with `success: false` becomes `PlotError::Api` carrying the
/// server's message. Every candle's time and close must parse.
pub fn into_dataset(response: CandlesResponse) -> Result<Dataset, PlotError> {
    if !response.success {
        let message = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "request failed".to_string());
        warn!("API reported failure: {}", message);
        return Err(PlotError::Api(message));
    }

    let mut dataset = Dataset::new();
    for candle_series in response.data.unwrap_or_default() {
        let candles = candle_series.candles.unwrap_or_default();
        debug!("{}: {} candles", candle_series.symbol, candles.len());

        let mut series = Series::new(candle_series.symbol.as_str());
        for candle in candles {
            let timestamp = parse_timestamp(&candle.time, None)?;
            let price = candle.close.to_f64()?;
            series.push(PricePoint::new(timestamp, price));
        }
        dataset.insert_series(series);
    }

    Ok(dataset)
}

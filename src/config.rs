//! Run configuration read from the environment (and `.env`)

use std::path::PathBuf;

use crate::api::candles::CandlesClient;
use crate::models::{ChartOptions, InputSchema};
use crate::services::FetchRequest;
use crate::utils::{parse_interval, PlotError};

/// Symbols requested from the API when `PLOT_SYMBOLS` is unset
pub const DEFAULT_API_SYMBOLS: &[&str] = &["BTC-USD", "ETH-USD", "STABLE-COIN", "GOLD", "PLATINUM", "SILVER"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Csv { path: PathBuf, schema: InputSchema },
    Api { base_url: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceKind,
    pub request: FetchRequest,
    pub chart: ChartOptions,
    pub output: PathBuf,
}

impl Config {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, PlotError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let source = match get("PLOT_SOURCE").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("csv") => {
                let preset = get("PLOT_CSV_SCHEMA").unwrap_or_else(|| "simulation".to_string());
                let mut schema = InputSchema::preset(&preset).ok_or_else(|| {
                    PlotError::Config(format!(
                        "unknown PLOT_CSV_SCHEMA '{}'. Use: simulation, lowercase",
                        preset
                    ))
                })?;
                if let Some(col) = get("PLOT_TIME_COLUMN") {
                    schema.time_column = col;
                }
                if let Some(col) = get("PLOT_SYMBOL_COLUMN") {
                    schema.symbol_column = col;
                }
                if let Some(col) = get("PLOT_CLOSE_COLUMN") {
                    schema.close_column = col;
                }
                schema.time_format = get("PLOT_TIME_FORMAT");

                SourceKind::Csv {
                    path: PathBuf::from(get("PLOT_CSV_PATH").unwrap_or_else(|| "market_data.csv".to_string())),
                    schema,
                }
            }
            Some("api") => SourceKind::Api {
                base_url: get("PLOT_API_URL").unwrap_or_else(|| CandlesClient::DEFAULT_BASE_URL.to_string()),
            },
            Some(other) => {
                return Err(PlotError::Config(format!(
                    "unknown PLOT_SOURCE '{}'. Use: csv, api",
                    other
                )))
            }
        };

        let symbols = match get("PLOT_SYMBOLS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None if matches!(source, SourceKind::Api { .. }) => {
                DEFAULT_API_SYMBOLS.iter().map(|s| s.to_string()).collect()
            }
            None => Vec::new(),
        };

        let days = parse_number("PLOT_DAYS", get("PLOT_DAYS"), 3650)?;
        let interval = get("PLOT_INTERVAL").unwrap_or_else(|| "240h".to_string());
        parse_interval(&interval)?;

        let defaults = ChartOptions::default();
        let width = parse_number("PLOT_WIDTH", get("PLOT_WIDTH"), defaults.width)?;
        let height = parse_number("PLOT_HEIGHT", get("PLOT_HEIGHT"), defaults.height)?;
        if width == 0 || height == 0 {
            return Err(PlotError::Config("chart size must be non-zero".to_string()));
        }

        Ok(Self {
            source,
            request: FetchRequest {
                symbols,
                days,
                interval,
            },
            chart: ChartOptions {
                title: get("PLOT_TITLE").unwrap_or(defaults.title),
                x_label: get("PLOT_X_LABEL").unwrap_or(defaults.x_label),
                y_label: get("PLOT_Y_LABEL").unwrap_or(defaults.y_label),
                width,
                height,
            },
            output: PathBuf::from(get("PLOT_OUTPUT").unwrap_or_else(|| "market_simulation.png".to_string())),
        })
    }
}

fn parse_number(key: &str, value: Option<String>, default: u32) -> Result<u32, PlotError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| PlotError::Config(format!("{} must be a non-negative integer, got '{}'", key, v))),
    }
}

use std::io::Read;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use super::data_source::{DataSource, FetchRequest};
use crate::models::{Dataset, InputSchema, PricePoint};
use crate::utils::{parse_price, parse_timestamp, PlotError};

/// Loads closing prices from a CSV file laid out per an `InputSchema`
pub struct CsvSource {
    path: PathBuf,
    schema: InputSchema,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, schema: InputSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Dataset, PlotError> {
        info!("Reading {}", self.path.display());
        let reader = csv::Reader::from_path(&self.path)?;
        let mut dataset = read_dataset(reader, &self.schema)?;

        dataset.retain_symbols(&request.symbols);
        info!(
            "Loaded {} samples across {} symbols",
            dataset.sample_count(),
            dataset.len()
        );
        Ok(dataset)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Group CSV rows into a `Dataset` keyed by the schema's symbol column
pub fn read_dataset<R: Read>(
    mut reader: csv::Reader<R>,
    schema: &InputSchema,
) -> Result<Dataset, PlotError> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PlotError::MissingColumn(name.to_string()))
    };
    let time_idx = column(&schema.time_column)?;
    let symbol_idx = column(&schema.symbol_column)?;
    let close_idx = column(&schema.close_column)?;
    debug!(
        "Columns: time={} symbol={} close={}",
        time_idx, symbol_idx, close_idx
    );

    let mut dataset = Dataset::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;

        // Header was validated, so a short record is a malformed row
        let field = |idx: usize, name: &str| {
            record.get(idx).ok_or_else(|| {
                PlotError::MissingColumn(format!("{} (row {})", name, row))
            })
        };

        let symbol = field(symbol_idx, &schema.symbol_column)?.trim();
        let timestamp = parse_timestamp(
            field(time_idx, &schema.time_column)?,
            schema.time_format.as_deref(),
        )
        .map_err(|e| e.at_row(row))?;
        let price = parse_price(field(close_idx, &schema.close_column)?).map_err(|e| e.at_row(row))?;

        dataset.push(symbol, PricePoint::new(timestamp, price));
    }

    Ok(dataset)
}

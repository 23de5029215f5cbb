use async_trait::async_trait;

use crate::models::Dataset;
use crate::utils::PlotError;

/// What to load: which symbols, how far back, at which candle interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Empty means every symbol the source has
    pub symbols: Vec<String>,
    pub days: u32,
    pub interval: String,
}

/// Anything that can produce a `Dataset` for the plotter
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Dataset, PlotError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

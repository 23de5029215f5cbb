//! Symbol-keyed collection of series

use indexmap::IndexMap;

use super::chart::{PricePoint, Series};

/// Series keyed by symbol, kept in first-appearance order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    series: IndexMap<String, Series>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample to `symbol`, creating the series on first sight
    pub fn push(&mut self, symbol: &str, point: PricePoint) {
        self.series
            .entry(symbol.to_string())
            .or_insert_with(|| Series::new(symbol))
            .push(point);
    }

    /// Insert a whole series. Samples for an already known symbol are appended
    /// and the symbol keeps its original position.
    pub fn insert_series(&mut self, series: Series) {
        match self.series.get_mut(&series.symbol) {
            Some(existing) => existing.points.extend(series.points),
            None => {
                self.series.insert(series.symbol.clone(), series);
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&Series> {
        self.series.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of samples across all series
    pub fn sample_count(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }

    /// Keep only the listed symbols. An empty list keeps everything.
    pub fn retain_symbols(&mut self, symbols: &[String]) {
        if symbols.is_empty() {
            return;
        }
        self.series.retain(|symbol, _| symbols.iter().any(|s| s == symbol));
    }
}

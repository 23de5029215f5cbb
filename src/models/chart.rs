//! Chart generation models

use chrono::{DateTime, Utc};

/// A single data point on a price chart
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Closing prices of one symbol, in the order they were loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl Series {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, point: PricePoint) {
        self.points.push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Presentation settings for the rendered image
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Deterministic Market Simulation (10 Year History)".to_string(),
            x_label: "Year".to_string(),
            y_label: "Price ($)".to_string(),
            width: 1200,
            height: 600,
        }
    }
}

//! Data models shared by the data sources and the chart renderer

pub mod chart;
pub mod dataset;
pub mod schema;

pub use chart::{ChartOptions, PricePoint, Series};
pub use dataset::Dataset;
pub use schema::InputSchema;

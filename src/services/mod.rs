pub mod api_source;
pub mod chart_service;
pub mod csv_source;
pub mod data_source;
pub mod plot_service;

pub use api_source::ApiSource;
pub use csv_source::CsvSource;
pub use data_source::{DataSource, FetchRequest};

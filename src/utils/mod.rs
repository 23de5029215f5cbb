pub mod errors;
pub mod interval;
pub mod price;
pub mod timestamp;

pub use errors::PlotError;
pub use interval::parse_interval;
pub use price::{parse_price, RawPrice};
pub use timestamp::parse_timestamp;

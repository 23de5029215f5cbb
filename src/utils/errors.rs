use thiserror::Error;

/// Errors that end a plotting run
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("{0}")]
    Api(String),
    #[error("Missing column '{0}' in CSV header")]
    MissingColumn(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },
    #[error("Invalid closing price '{value}': {reason}")]
    Price { value: String, reason: String },
    #[error("Invalid interval '{value}': {reason}")]
    Interval { value: String, reason: String },
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlotError {
    /// Attach the 1-based data row number to a row-level parse error
    pub fn at_row(self, row: usize) -> Self {
        match self {
            PlotError::Timestamp { value, reason } => PlotError::Timestamp {
                value,
                reason: format!("{} (row {})", reason, row),
            },
            PlotError::Price { value, reason } => PlotError::Price {
                value,
                reason: format!("{} (row {})", reason, row),
            },
            other => other,
        }
    }
}

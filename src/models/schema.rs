//! Declared CSV input layouts

/// Column names (and optional timestamp layout) of a CSV input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSchema {
    pub time_column: String,
    pub symbol_column: String,
    pub close_column: String,
    /// chrono format for the time column; `None` auto-detects
    pub time_format: Option<String>,
}

impl InputSchema {
    /// `Symbol,Time,Open,High,Low,Close` as written by the market simulator
    pub fn simulation() -> Self {
        Self {
            time_column: "Time".to_string(),
            symbol_column: "Symbol".to_string(),
            close_column: "Close".to_string(),
            time_format: None,
        }
    }

    /// `date,symbol,close` files
    pub fn lowercase() -> Self {
        Self {
            time_column: "date".to_string(),
            symbol_column: "symbol".to_string(),
            close_column: "close".to_string(),
            time_format: None,
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "simulation" | "default" => Some(Self::simulation()),
            "lowercase" => Some(Self::lowercase()),
            _ => None,
        }
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::simulation()
    }
}

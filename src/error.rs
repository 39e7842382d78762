use thiserror::Error;

#[derive(Error, Debug)]
pub enum RatingError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("No data for country {0}")]
    UnknownCountry(String),

    #[error("Indicator '{0}' is not valid")]
    InvalidIndicator(String),

    #[error("No data available: {0}")]
    NoData(String),

    #[error("Fetch failed for {indicator}: {reason}")]
    Fetch { indicator: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RatingError>;

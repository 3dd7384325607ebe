use thiserror::Error;

/// Errors that abort an export run
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure talking to the API
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-2xx response for a tag search
    #[error("Jamendo API returned HTTP {status} for tag {tag:?}: {body}")]
    UnexpectedStatus {
        /// Tag being searched
        tag: String,
        /// HTTP status code
        status: u16,
        /// Response body, if readable
        body: String,
    },

    /// Body is not a valid search response
    #[error("Jamendo Deserialization error: {0}")]
    DeserializationError(#[from] serde_json::Error),

    /// Writing a CSV record failed
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Creating, writing or flushing the output file failed
    #[error("Output error: {0}")]
    OutputError(#[from] std::io::Error),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

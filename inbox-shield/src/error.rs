use thiserror::Error;

/// Result type alias for domain checks
pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Invalid domain format: {0}")]
    InvalidDomain(String),

    #[error("Invalid DKIM selector: {0}")]
    InvalidSelector(String),

    #[error("DNS lookup failed: {0}")]
    DnsLookup(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

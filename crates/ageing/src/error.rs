use thiserror::Error;

/// Configuration failures. The ageing computation itself never fails.
#[derive(Debug, Error)]
pub enum AgeingError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad header row, empty path, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A date given on the command line or in config that cannot be read.
    #[error("cannot parse reference date '{0}' (expected YYYY-MM-DD)")]
    ReferenceDate(String),
}

/// Error types for the Machine Translation module
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Missing or unusable provider configuration (API key, rejected request)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Language code that cannot be sent to a provider
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Transport failure talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The provider refused the request because the character quota is used up
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Error during translation phase
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// The PO catalog could not be read or written
    #[error("Catalog error: {0}")]
    CatalogError(String),
    /// Placeholders in the translated text do not match the source text
    #[error("Placeholder mismatch in {msgid:?}: expected {expected:?}, found {found:?}")]
    PlaceholderMismatch {
        msgid: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

//! Error types for port operations.

use parties_domain::PartyError;

/// Failures while reading configuration from its source.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// The source could not be read or parsed.
    #[error("Failed to load configuration from {source_name}: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// The source parsed but the values are out of range.
    #[error(transparent)]
    Invalid(#[from] PartyError),
}

impl ConfigLoadError {
    pub fn from_source(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}

impl From<ConfigLoadError> for PartyError {
    fn from(err: ConfigLoadError) -> Self {
        match err {
            ConfigLoadError::Invalid(inner) => inner,
            other => PartyError::invalid_config(other.to_string()),
        }
    }
}

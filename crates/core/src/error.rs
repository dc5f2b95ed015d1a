use thiserror::Error;

/// Failures of a conversion.
///
/// Only malformed input is an error. Unsupported question types and dropped
/// titles are reported as [`crate::gift::Warning`]s on the conversion result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("question identifiers exhausted after Q{last}")]
    IdentifierOverflow { last: usize },
}

impl ConvertError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        ConvertError::Parse {
            position,
            message: message.into(),
        }
    }
}

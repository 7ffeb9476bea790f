use thiserror::Error;

/// Why a lookup returned no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The id was empty or only whitespace.
    #[error("{entity} id must not be blank")]
    Validation { entity: &'static str },

    /// No record with this id.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// An internal fault; the message is for logs, not for branching.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl LookupError {
    /// Stable label, used as the `error` field of HTTP error bodies.
    pub const fn kind(&self) -> &'static str {
        match self {
            LookupError::Validation { .. } => "validation_error",
            LookupError::NotFound { .. } => "not_found",
            LookupError::Unexpected(_) => "unexpected_error",
        }
    }
}

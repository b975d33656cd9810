use thiserror::Error;

/// Errors raised while validating, submitting or cancelling a record.
///
/// The first failing check aborts the whole operation; nothing is written
/// back to the host before every check has passed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecordError {
    /// A user-correctable problem with the record's own fields or rows.
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// A referenced document is in the wrong state (not submitted, on hold,
    /// closed, over-billed) or the requested transition is not allowed.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Mandatory account or currency setup is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A host service failed; propagated unmodified.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl RecordError {
    /// Shorthand for a header-level validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::new(field, message))
    }

    /// Shorthand for a row-level validation error.
    pub fn invalid_row(
        row: usize,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation(ValidationError::at_row(row, field, message))
    }

    /// The validation detail, if this is a validation error.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure reported by a host service (database, cache, remote lookup).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{service} lookup failed: {message}")]
pub struct LookupError {
    /// Which collaborator failed (e.g. "invoice store").
    pub service: String,
    /// Message as reported by the host.
    pub message: String,
}

impl LookupError {
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "items[2].rate").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// 1-based row number when the error concerns a child row.
    pub row: Option<usize>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(row) = self.row {
            write!(f, "Row #{}: {}: {}", row, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a header-level validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            row: None,
        }
    }

    /// Create a validation error for child row `row` (1-based).
    pub fn at_row(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            row: Some(row),
        }
    }
}

use std::fmt;

use crate::store::StoreError;

/// Error returned when an upload fails validation or enrichment.
///
/// The message never contains upload content; it describes the structural
/// problem (line number, field counts) so the caller can report it safely.
///
/// # Examples
///
/// ```
/// use intake_core::{ValidationError, ValidationErrorKind};
///
/// let error = ValidationError::new(ValidationErrorKind::MalformedInput, "record 3 has 4 fields");
/// assert_eq!(error.kind(), ValidationErrorKind::MalformedInput);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn header_mismatch() -> Self {
        Self::new(
            ValidationErrorKind::HeaderMismatch,
            "first line does not match the expected header",
        )
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MalformedInput, message)
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::InvalidArgument, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload rejected ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Kind of validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The first line of the upload is not the canonical header.
    HeaderMismatch,
    /// The body does not parse as a table consistent with its header.
    MalformedInput,
    /// The caller passed an unusable argument (e.g. an empty tenant label).
    InvalidArgument,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderMismatch => write!(f, "header mismatch"),
            Self::MalformedInput => write!(f, "malformed input"),
            Self::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

/// Errors surfaced by the intake boundary.
///
/// User-facing rejections (bad header, malformed body, missing session) are
/// reported as an [`UploadOutcome`](crate::intake::UploadOutcome), not as an
/// `Error`. This type is reserved for caller bugs and infrastructure failures.
#[derive(Debug)]
pub enum Error {
    /// The caller supplied an invalid argument, such as an empty tenant label.
    InvalidArgument(ValidationError),
    /// The storage collaborator failed to persist the document.
    Storage(StoreError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(e) => write!(f, "invalid argument: {}", e.message()),
            Error::Storage(e) => write!(f, "storage failure: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidArgument(e) => Some(e),
            Error::Storage(e) => Some(e),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Storage(e)
    }
}

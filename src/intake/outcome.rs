//! Structured result of an upload attempt.

use crate::store::ObjectKey;

/// What happened to an upload.
///
/// Distinguishes success from the user-fixable rejections so the web layer
/// can pick a status code and message without looking inside the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The upload was enriched and written to storage.
    Stored {
        /// Key of the stored object
        location: ObjectKey,
        /// Number of data records written
        rows: usize,
    },
    /// The first line is not the expected header.
    HeaderMismatch,
    /// The body is not a table consistent with the header, or is too large.
    MalformedBody {
        /// Structural description of the problem (no upload content)
        reason: String,
    },
    /// The session has no authenticated tenant.
    Forbidden,
}

impl UploadOutcome {
    /// HTTP status the web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            UploadOutcome::Stored { .. } => 200,
            UploadOutcome::HeaderMismatch | UploadOutcome::MalformedBody { .. } => 422,
            UploadOutcome::Forbidden => 403,
        }
    }

    /// User-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            UploadOutcome::Stored { .. } => "Data stored",
            UploadOutcome::HeaderMismatch => "Aggregate file header validation failed.",
            UploadOutcome::MalformedBody { .. } => "Aggregate file could not be parsed.",
            UploadOutcome::Forbidden => "Forbidden",
        }
    }

    /// Returns the stored object key, for successful uploads.
    pub fn location(&self) -> Option<&ObjectKey> {
        match self {
            UploadOutcome::Stored { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Returns `true` if the upload was stored.
    pub fn is_stored(&self) -> bool {
        matches!(self, UploadOutcome::Stored { .. })
    }
}

//! Header verification and tenant enrichment of uploads.
//!
//! The validator is a pure, synchronous transform: it reads the stream it is
//! given, never logs, never retries, and holds no mutable state. Rejections
//! are returned to the caller, which decides what to tell the user.

use std::io::{Read, Seek};
use std::sync::Arc;

use crate::document::TabularDocument;
use crate::error::ValidationError;
use crate::schema::Schema;
use crate::tenant::TenantLabel;
use crate::upload::RawUpload;
use crate::verified::VerifiedUpload;

/// Returns `true` if the first line of `upload` is exactly the canonical
/// header of `schema`.
///
/// Only the first line is read. The stream is rewound afterwards whatever
/// the outcome, so the full content stays available for parsing. A read
/// failure counts as a mismatch.
///
/// # Examples
///
/// ```
/// use intake_core::{verify_header, RawUpload, Schema};
///
/// let schema = Schema::measurement();
///
/// let mut upload = RawUpload::from_text("time,group,measure,numerator,denominator\n2020-01-01,A,x,1,2\n");
/// assert!(verify_header(&mut upload, &schema));
///
/// let mut upload = RawUpload::from_text("time,group,measure,numerator\n");
/// assert!(!verify_header(&mut upload, &schema));
/// ```
pub fn verify_header<R: Read + Seek>(upload: &mut RawUpload<R>, schema: &Schema) -> bool {
    match upload.peek_first_line() {
        Ok(line) => schema.matches_header(&line),
        Err(_) => false,
    }
}

/// Parses `upload`, appends an `ascribee` column holding `tenant_label` to
/// every record and returns the re-serialized table, header included.
///
/// The caller must have checked the header with [`verify_header`] first.
/// [`UploadValidator::admit`] enforces that ordering through the type system.
///
/// # Errors
///
/// - `InvalidArgument` if `tenant_label` is empty, blank or contains control characters
/// - `MalformedInput` if the body is not a table consistent with its header
///
/// # Examples
///
/// ```
/// use intake_core::{enrich, verify_header, RawUpload, Schema};
///
/// let mut upload = RawUpload::from_text("time,group,measure,numerator,denominator\n2020-01-01,A,x,1,2\n");
/// assert!(verify_header(&mut upload, &Schema::measurement()));
///
/// let csv = enrich(&mut upload, "Display Lab").expect("well-formed");
/// assert_eq!(
///     csv,
///     "time,group,measure,numerator,denominator,ascribee\n2020-01-01,A,x,1,2,Display Lab\n"
/// );
/// ```
pub fn enrich<R: Read + Seek>(
    upload: &mut RawUpload<R>,
    tenant_label: &str,
) -> Result<String, ValidationError> {
    let tenant = TenantLabel::new(tenant_label)?;
    let content = upload
        .read_all()
        .map_err(|e| ValidationError::malformed(format!("could not read upload: {}", e)))?;

    TabularDocument::parse(&content)?
        .ascribe(&tenant)?
        .to_csv()
}

/// Gate that checks uploads against one schema.
///
/// The schema is shared read-only configuration; cloning a validator is cheap
/// and clones may be used from many requests at once.
///
/// # Examples
///
/// ```
/// use intake_core::{RawUpload, TenantLabel, UploadValidator, ValidationErrorKind};
///
/// let validator = UploadValidator::measurement();
///
/// let upload = RawUpload::from_text("time,group\n");
/// let err = validator.admit(upload).unwrap_err();
/// assert_eq!(err.kind(), ValidationErrorKind::HeaderMismatch);
/// ```
#[derive(Debug, Clone)]
pub struct UploadValidator {
    schema: Arc<Schema>,
}

impl UploadValidator {
    /// Creates a validator for `schema`.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// Creates a validator for the measurement upload schema.
    pub fn measurement() -> Self {
        Self::new(Schema::measurement())
    }

    /// Returns the expected schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Checks the first line of `upload` against this validator's schema.
    ///
    /// See [`verify_header`].
    pub fn verify_header<R: Read + Seek>(&self, upload: &mut RawUpload<R>) -> bool {
        verify_header(upload, &self.schema)
    }

    /// Enriches an upload whose header the caller already checked.
    ///
    /// See [`enrich`].
    pub fn enrich<R: Read + Seek>(
        &self,
        upload: &mut RawUpload<R>,
        tenant_label: &str,
    ) -> Result<String, ValidationError> {
        enrich(upload, tenant_label)
    }

    /// Checks the header and, on success, returns proof of the check.
    ///
    /// # Errors
    ///
    /// Returns a `HeaderMismatch` error if the first line differs from the
    /// canonical header.
    pub fn admit<R: Read + Seek>(
        &self,
        mut upload: RawUpload<R>,
    ) -> Result<VerifiedUpload<R>, ValidationError> {
        if !self.verify_header(&mut upload) {
            return Err(ValidationError::header_mismatch());
        }
        Ok(VerifiedUpload::new_unchecked(upload, Arc::clone(&self.schema)))
    }
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::measurement()
    }
}

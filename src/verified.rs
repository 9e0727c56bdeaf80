use std::io::{Read, Seek};
use std::sync::Arc;

use crate::document::{EnrichedDocument, TabularDocument};
use crate::error::ValidationError;
use crate::schema::Schema;
use crate::tenant::TenantLabel;
use crate::upload::RawUpload;

/// An upload whose first line has been checked against a [`Schema`].
///
/// `VerifiedUpload<R>` is proof that the header check passed. It can only be
/// obtained from [`UploadValidator::admit`](crate::UploadValidator::admit);
/// there is no public constructor and no conversion from `RawUpload`.
///
/// # Construction Invariants
///
/// `new_unchecked` is `pub(crate)`. Only the validator calls it, and only
/// after `verify_header` returned `true` for the same stream and schema.
///
/// ```compile_fail
/// use intake_core::{RawUpload, VerifiedUpload};
///
/// // No public constructor:
/// let verified = VerifiedUpload::new_unchecked(RawUpload::from_text("a\n"));
/// ```
///
/// # Examples
///
/// ```
/// use intake_core::{RawUpload, TenantLabel, UploadValidator};
///
/// let validator = UploadValidator::measurement();
/// let upload = RawUpload::from_text(
///     "time,group,measure,numerator,denominator\n2020-01-01,A,x,1,2\n",
/// );
///
/// let verified = validator.admit(upload).expect("header matches");
/// let enriched = verified
///     .enrich(&TenantLabel::new("Display Lab").unwrap())
///     .expect("well-formed body");
///
/// assert_eq!(enriched.len(), 1);
/// ```
#[derive(Debug)]
pub struct VerifiedUpload<R> {
    upload: RawUpload<R>,
    schema: Arc<Schema>,
}

impl<R: Read + Seek> VerifiedUpload<R> {
    pub(crate) fn new_unchecked(upload: RawUpload<R>, schema: Arc<Schema>) -> Self {
        Self { upload, schema }
    }

    /// Returns the schema the header was checked against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Parses the full upload and appends the `ascribee` column.
    ///
    /// # Errors
    ///
    /// Returns a `MalformedInput` error if the body is not a table consistent
    /// with the header.
    pub fn enrich(mut self, tenant: &TenantLabel) -> Result<EnrichedDocument, ValidationError> {
        let content = self
            .upload
            .read_all()
            .map_err(|e| ValidationError::malformed(format!("could not read upload: {}", e)))?;

        TabularDocument::parse(&content)?.ascribe(tenant)
    }

    /// Gives the upload back, still rewound, without enriching it.
    pub fn into_raw(self) -> RawUpload<R> {
        self.upload
    }
}

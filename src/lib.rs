//! Validation and tenant enrichment for uploaded CSV measurement files.
//!
//! Before an uploaded file is persisted it goes through a small pipeline:
//! - **Header check**: the first line must be exactly the canonical header of
//!   a [`Schema`]
//! - **Parse**: the body must be a table consistent with that header
//! - **Enrichment**: every record gets an `ascribee` column holding the
//!   uploading tenant's label
//!
//! The result is a deterministic CSV document ready to be written verbatim
//! to object storage.
//!
//! # Core Types
//!
//! - [`RawUpload<R>`]: Untrusted, rewindable upload content
//! - [`UploadValidator`]: Checks headers and enriches uploads
//! - [`VerifiedUpload<R>`]: Proof that an upload passed the header check
//! - [`EnrichedDocument`]: The only thing an [`UploadStore`] accepts
//! - [`TenantLabel`]: Validated tenant identifier
//!
//! # Examples
//!
//! ```
//! use intake_core::{enrich, verify_header, RawUpload, Schema};
//!
//! let mut upload = RawUpload::from_text(
//!     "time,group,measure,numerator,denominator\n2020-01-01,A,x,1,2\n",
//! );
//!
//! assert!(verify_header(&mut upload, &Schema::measurement()));
//!
//! let csv = enrich(&mut upload, "Display Lab").expect("well-formed upload");
//! assert_eq!(
//!     csv,
//!     "time,group,measure,numerator,denominator,ascribee\n2020-01-01,A,x,1,2,Display Lab\n"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod config;
mod document;
mod error;
pub mod intake;
mod schema;
mod store;
mod tenant;
mod upload;
mod validator;
mod verified;

#[cfg(test)]
mod test_utils;

pub use config::{IntakeConfig, DEFAULT_KEY_SUFFIX, DEFAULT_MAX_UPLOAD_BYTES};
pub use document::{EnrichedDocument, Record, TabularDocument, ASCRIBEE_COLUMN};
pub use error::{Error, ValidationError, ValidationErrorKind};
pub use schema::{Schema, SchemaError, MEASUREMENT_COLUMNS, SEPARATOR, TERMINATOR};
pub use store::{
    KeyParts, MemoryStore, ObjectKey, StoreError, StoreErrorKind, UploadStore, DATA_PREFIX,
};
pub use tenant::{TenantLabel, DEFAULT_MAX_TENANT_LEN};
pub use upload::RawUpload;
pub use validator::{enrich, verify_header, UploadValidator};
pub use verified::VerifiedUpload;

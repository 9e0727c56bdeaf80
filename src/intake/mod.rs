//! Boundary between the web handler and the validation pipeline.
//!
//! The web layer (excluded from this crate) reads the multipart upload and
//! asks the identity provider for the session's tenant. It hands both to
//! [`UploadHandler`], which drives the pipeline and returns an
//! [`UploadOutcome`] the web layer can turn into an HTTP response without
//! inspecting validator internals.
//!
//! # Flow
//!
//! ```text
//! UploadRequest
//!   ↓  no tenant                → Forbidden
//!   ↓  body over size limit     → MalformedBody
//! UploadValidator::admit
//!   ↓  first line differs       → HeaderMismatch
//! VerifiedUpload::enrich(tenant)
//!   ↓  body does not parse      → MalformedBody
//! UploadStore::put(ObjectKey)
//!   ↓                           → Stored { location }
//! ```
//!
//! This is the only layer that logs or audits; the validator stays pure.

mod handler;
mod outcome;
mod request;

pub use handler::UploadHandler;
pub use outcome::UploadOutcome;
pub use request::UploadRequest;

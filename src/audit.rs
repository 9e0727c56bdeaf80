//! Audit records of upload decisions.
//!
//! Each call to the intake boundary produces one [`AuditEvent`] describing
//! who uploaded, what was decided and where the result went. Events hold
//! only metadata: never the upload content, never cell values.

mod event;
mod trail;

pub use event::{AuditEvent, AuditOutcome};
pub use trail::AuditTrail;

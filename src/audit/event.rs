//! Audit event schema.

use std::fmt;

/// Outcome of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The upload was enriched and stored
    Stored,
    /// The upload failed validation (header or body)
    Rejected,
    /// No authenticated tenant was present
    Forbidden,
    /// A caller bug or storage failure stopped processing
    Error,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Stored => write!(f, "stored"),
            AuditOutcome::Rejected => write!(f, "rejected"),
            AuditOutcome::Forbidden => write!(f, "forbidden"),
            AuditOutcome::Error => write!(f, "error"),
        }
    }
}

/// A record of one upload decision, holding only safe metadata.
///
/// # Safety Invariants
///
/// - No upload content or cell values
/// - `reason` is a validator message (structure only: line numbers, counts)
///
/// # Example
///
/// ```
/// use intake_core::audit::{AuditEvent, AuditOutcome};
///
/// let event = AuditEvent::new("req-123", Some("Display Lab"), AuditOutcome::Stored)
///     .with_body_len(512)
///     .with_location("data/Display-Lab/2020-01-01T00:00:00Z_maptg.csv");
///
/// assert_eq!(event.request_id(), "req-123");
/// assert_eq!(event.tenant(), Some("Display Lab"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    request_id: String,
    /// None when the session was not authenticated
    tenant: Option<String>,
    outcome: AuditOutcome,
    body_len: Option<usize>,
    /// Object key, only for stored uploads
    location: Option<String>,
    reason: Option<String>,
}

impl AuditEvent {
    /// Creates a new audit event with required fields.
    pub fn new(
        request_id: impl Into<String>,
        tenant: Option<impl Into<String>>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            tenant: tenant.map(Into::into),
            outcome,
            body_len: None,
            location: None,
            reason: None,
        }
    }

    /// Sets the upload size in bytes.
    pub fn with_body_len(mut self, len: usize) -> Self {
        self.body_len = Some(len);
        self
    }

    /// Sets the key the document was stored under.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the rejection or failure reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the tenant label, if authenticated.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the upload size, if set.
    pub fn body_len(&self) -> Option<usize> {
        self.body_len
    }

    /// Returns the storage location, if set.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the reason, if set.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[outcome={}, request_id={}, tenant={}",
            self.outcome,
            self.request_id,
            self.tenant.as_deref().unwrap_or("<none>")
        )?;

        if let Some(len) = self.body_len {
            write!(f, ", body_len={}", len)?;
        }
        if let Some(location) = &self.location {
            write!(f, ", location={}", location)?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ", reason={}", reason)?;
        }

        write!(f, "]")
    }
}

//! Upload request as seen by the intake boundary.

use std::fmt;

/// One upload, as extracted from the HTTP request by the web layer.
///
/// The tenant label is the value the identity provider returned for the
/// session (the user's site attribute); it is never taken from the form.
/// `None` means the session is not authenticated.
///
/// # Examples
///
/// ```
/// use intake_core::intake::UploadRequest;
///
/// let request = UploadRequest::new("req-001", b"time,group\n".to_vec())
///     .with_tenant("Display Lab");
///
/// assert_eq!(request.request_id(), "req-001");
/// assert_eq!(request.tenant(), Some("Display Lab"));
/// assert_eq!(request.body_len(), 11);
/// ```
#[derive(Clone)]
pub struct UploadRequest {
    pub(super) request_id: String,
    pub(super) tenant: Option<String>,
    pub(super) content: Vec<u8>,
}

impl UploadRequest {
    /// Creates a request without an authenticated tenant.
    pub fn new(request_id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            request_id: request_id.into(),
            tenant: None,
            content: content.into(),
        }
    }

    /// Sets the tenant label resolved from the session.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the tenant label, if the session is authenticated.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Returns the upload size in bytes.
    pub fn body_len(&self) -> usize {
        self.content.len()
    }
}

// Content is untrusted and may be large; only its size is shown.
impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("request_id", &self.request_id)
            .field("tenant", &self.tenant)
            .field("body_len", &self.content.len())
            .finish()
    }
}

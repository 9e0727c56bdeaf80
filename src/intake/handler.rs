//! Upload handler driving validation, enrichment and storage.

use chrono::{DateTime, Utc};

use crate::audit::{AuditEvent, AuditOutcome, AuditTrail};
use crate::config::IntakeConfig;
use crate::error::Error;
use crate::store::{ObjectKey, UploadStore};
use crate::tenant::TenantLabel;
use crate::upload::RawUpload;
use crate::validator::UploadValidator;

use super::{UploadOutcome, UploadRequest};

/// Runs uploads through the validation pipeline and into a store.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use intake_core::intake::{UploadHandler, UploadOutcome, UploadRequest};
/// use intake_core::{MemoryStore, UploadValidator};
///
/// let handler = UploadHandler::new(UploadValidator::measurement(), MemoryStore::new());
///
/// let request = UploadRequest::new(
///     "req-001",
///     b"time,group,measure,numerator,denominator\n2020-01-01,A,x,1,2\n".to_vec(),
/// )
/// .with_tenant("Display Lab");
///
/// let at = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
/// let outcome = handler.handle(request, at).expect("no caller bug");
///
/// assert_eq!(
///     outcome.location().map(|k| k.as_str()),
///     Some("data/Display-Lab/2020-01-01T10:00:00Z_maptg.csv")
/// );
/// assert_eq!(handler.store().len(), 1);
/// ```
#[derive(Debug)]
pub struct UploadHandler<S> {
    validator: UploadValidator,
    store: S,
    config: IntakeConfig,
    audit: Option<AuditTrail>,
}

impl<S: UploadStore> UploadHandler<S> {
    /// Creates a handler with default configuration and no audit trail.
    pub fn new(validator: UploadValidator, store: S) -> Self {
        Self {
            validator,
            store,
            config: IntakeConfig::default(),
            audit: None,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: IntakeConfig) -> Self {
        self.config = config;
        self
    }

    /// Records one audit event per handled upload in `trail`.
    pub fn with_audit(mut self, trail: AuditTrail) -> Self {
        self.audit = Some(trail);
        self
    }

    /// Returns the store uploads are written to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the audit trail, if auditing is enabled.
    pub fn audit_trail(&self) -> Option<&AuditTrail> {
        self.audit.as_ref()
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Handles an upload received now.
    pub fn handle_now(&self, request: UploadRequest) -> Result<UploadOutcome, Error> {
        self.handle(request, Utc::now())
    }

    /// Handles an upload received at `received_at`.
    ///
    /// User-fixable problems come back as an `Ok` outcome. `Err` is reserved
    /// for a tenant label the identity layer should never have produced and
    /// for storage failures.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the tenant label is empty or otherwise invalid
    /// - [`Error::Storage`] if the store rejects the write
    pub fn handle(
        &self,
        request: UploadRequest,
        received_at: DateTime<Utc>,
    ) -> Result<UploadOutcome, Error> {
        let UploadRequest {
            request_id,
            tenant,
            content,
        } = request;
        let body_len = content.len();

        let Some(label) = tenant else {
            tracing::warn!(request_id = %request_id, "upload without authenticated tenant");
            self.audit(AuditEvent::new(&request_id, None::<String>, AuditOutcome::Forbidden));
            return Ok(UploadOutcome::Forbidden);
        };

        let tenant = match TenantLabel::with_max_len(label.as_str(), self.config.max_tenant_len) {
            Ok(tenant) => tenant,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "identity layer supplied an invalid tenant label"
                );
                self.audit(
                    AuditEvent::new(&request_id, Some(label), AuditOutcome::Error)
                        .with_body_len(body_len)
                        .with_reason(e.message()),
                );
                return Err(Error::InvalidArgument(e));
            }
        };

        if body_len > self.config.max_upload_bytes {
            let reason = format!(
                "upload is {} bytes, limit is {}",
                body_len, self.config.max_upload_bytes
            );
            return Ok(self.reject(&request_id, &tenant, body_len, UploadOutcome::MalformedBody { reason }));
        }

        let verified = match self.validator.admit(RawUpload::from_bytes(content)) {
            Ok(verified) => verified,
            Err(_) => {
                return Ok(self.reject(&request_id, &tenant, body_len, UploadOutcome::HeaderMismatch));
            }
        };

        let document = match verified.enrich(&tenant) {
            Ok(document) => document,
            Err(e) => {
                let outcome = UploadOutcome::MalformedBody {
                    reason: e.message().to_string(),
                };
                return Ok(self.reject(&request_id, &tenant, body_len, outcome));
            }
        };

        let key = ObjectKey::for_upload(&tenant, &received_at, &self.config.key_suffix);
        if let Err(e) = self.store.put(&key, &document) {
            tracing::error!(
                request_id = %request_id,
                tenant = %tenant,
                key = %key,
                error = %e,
                "failed to store upload"
            );
            self.audit(
                AuditEvent::new(&request_id, Some(tenant.as_str()), AuditOutcome::Error)
                    .with_body_len(body_len)
                    .with_reason(e.message()),
            );
            return Err(e.into());
        }

        tracing::info!(
            request_id = %request_id,
            tenant = %tenant,
            key = %key,
            rows = document.len(),
            "upload stored"
        );
        self.audit(
            AuditEvent::new(&request_id, Some(tenant.as_str()), AuditOutcome::Stored)
                .with_body_len(body_len)
                .with_location(key.as_str()),
        );

        Ok(UploadOutcome::Stored {
            location: key,
            rows: document.len(),
        })
    }

    fn reject(
        &self,
        request_id: &str,
        tenant: &TenantLabel,
        body_len: usize,
        outcome: UploadOutcome,
    ) -> UploadOutcome {
        let reason = match &outcome {
            UploadOutcome::MalformedBody { reason } => reason.as_str(),
            other => other.message(),
        };

        tracing::warn!(
            request_id = %request_id,
            tenant = %tenant,
            body_len,
            reason,
            "upload rejected"
        );
        self.audit(
            AuditEvent::new(request_id, Some(tenant.as_str()), AuditOutcome::Rejected)
                .with_body_len(body_len)
                .with_reason(reason),
        );

        outcome
    }

    fn audit(&self, event: AuditEvent) {
        if let Some(trail) = &self.audit {
            trail.record(event);
        }
    }
}

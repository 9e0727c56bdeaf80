//! Intake configuration.

use std::env;

use crate::tenant::DEFAULT_MAX_TENANT_LEN;

/// Default upper bound on an upload body (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default filename suffix for stored uploads.
pub const DEFAULT_KEY_SUFFIX: &str = "maptg";

/// Settings for the intake boundary.
///
/// The validator itself takes no configuration beyond its schema; these
/// limits are applied by [`UploadHandler`](crate::intake::UploadHandler)
/// before the validator sees the upload.
///
/// # Examples
///
/// ```
/// use intake_core::IntakeConfig;
///
/// let config = IntakeConfig::default().with_max_upload_bytes(1024);
/// assert_eq!(config.max_upload_bytes, 1024);
/// assert_eq!(config.key_suffix, "maptg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Uploads larger than this are rejected before parsing.
    pub max_upload_bytes: usize,
    /// Suffix of the stored object's filename (`<timestamp>_<suffix>.csv`).
    pub key_suffix: String,
    /// Upper bound on tenant labels, in bytes.
    pub max_tenant_len: usize,
}

impl IntakeConfig {
    /// Builds the configuration from defaults, overridden by environment:
    ///
    /// - `INTAKE_MAX_UPLOAD_BYTES`
    /// - `INTAKE_KEY_SUFFIX`
    /// - `INTAKE_MAX_TENANT_LEN`
    ///
    /// Values that fail to parse keep the default.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("INTAKE_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = v.trim().parse().unwrap_or(self.max_upload_bytes);
        }
        if let Some(v) = lookup("INTAKE_KEY_SUFFIX") {
            let v = v.trim();
            if !v.is_empty() && !v.contains('/') {
                self.key_suffix = v.to_string();
            }
        }
        if let Some(v) = lookup("INTAKE_MAX_TENANT_LEN") {
            match v.trim().parse() {
                Ok(0) | Err(_) => {}
                Ok(len) => self.max_tenant_len = len,
            }
        }
        self
    }

    /// Sets the upload size limit.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Sets the stored filename suffix.
    pub fn with_key_suffix(mut self, key_suffix: impl Into<String>) -> Self {
        self.key_suffix = key_suffix.into();
        self
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            key_suffix: DEFAULT_KEY_SUFFIX.to_string(),
            max_tenant_len: DEFAULT_MAX_TENANT_LEN,
        }
    }
}

use std::fmt;

use crate::error::ValidationError;

/// Default upper bound on a tenant label, in bytes.
pub const DEFAULT_MAX_TENANT_LEN: usize = 256;

/// The organization or site an upload is ascribed to.
///
/// A `TenantLabel` comes from the identity collaborator (a user attribute),
/// never from the upload itself. It is stored verbatim in the `ascribee`
/// column, so construction enforces:
/// - non-empty, and not whitespace only
/// - no control characters (a newline would split a CSV record)
/// - a maximum length (default: 256 bytes)
///
/// The label is NOT trimmed; `"Display Lab"` is kept exactly as given.
///
/// # Examples
///
/// ```
/// use intake_core::TenantLabel;
///
/// let tenant = TenantLabel::new("Display Lab").expect("valid label");
/// assert_eq!(tenant.as_str(), "Display Lab");
/// assert_eq!(tenant.dashed(), "Display-Lab");
///
/// // Empty labels are a caller bug
/// assert!(TenantLabel::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantLabel {
    label: String,
}

impl TenantLabel {
    /// Validates a tenant label using the default length limit.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidArgument` error if the label is empty, blank,
    /// contains control characters or is too long.
    pub fn new(label: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_max_len(label, DEFAULT_MAX_TENANT_LEN)
    }

    /// Validates a tenant label against a custom length limit.
    ///
    /// # Errors
    ///
    /// As [`TenantLabel::new`]. A `max_len` of 0 admits no label and is
    /// reported as `InvalidArgument`.
    pub fn with_max_len(label: impl Into<String>, max_len: usize) -> Result<Self, ValidationError> {
        if max_len == 0 {
            return Err(ValidationError::invalid_argument(
                "maximum tenant label length must be greater than 0",
            ));
        }
        let label = label.into();

        if label.trim().is_empty() {
            return Err(ValidationError::invalid_argument(
                "tenant label is empty or contains only whitespace",
            ));
        }

        if label.chars().any(char::is_control) {
            return Err(ValidationError::invalid_argument(
                "tenant label contains control characters",
            ));
        }

        if label.len() > max_len {
            return Err(ValidationError::invalid_argument(format!(
                "tenant label exceeds maximum length of {}",
                max_len
            )));
        }

        Ok(Self { label })
    }

    /// Returns the label exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// Returns the label with every space replaced by a hyphen, as used in
    /// storage paths (`Display Lab` → `Display-Lab`).
    pub fn dashed(&self) -> String {
        self.label.replace(' ', "-")
    }
}

impl fmt::Display for TenantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl AsRef<str> for TenantLabel {
    fn as_ref(&self) -> &str {
        &self.label
    }
}

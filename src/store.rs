//! Storage boundary for accepted uploads.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::document::EnrichedDocument;
use crate::tenant::TenantLabel;

/// Prefix under which uploaded datasets are stored.
pub const DATA_PREFIX: &str = "data";

/// Error returned when a document cannot be stored.
///
/// # Examples
///
/// ```
/// use intake_core::{StoreError, StoreErrorKind};
///
/// let error = StoreError::new(StoreErrorKind::Unavailable, "bucket unreachable");
/// assert_eq!(error.kind(), StoreErrorKind::Unavailable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    /// Creates a new store error.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store error ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Kind of store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The write itself failed.
    Io,
    /// The backing store cannot be reached or is in a bad state.
    Unavailable,
    /// The document could not be rendered as CSV.
    Serialization,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Unavailable => write!(f, "store unavailable"),
            Self::Serialization => write!(f, "serialization failed"),
        }
    }
}

/// Location of a stored object, e.g.
/// `data/Display-Lab/2020-01-01T10:00:00Z_maptg.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Builds the key for an accepted upload:
    /// `data/<tenant-dashed>/<rfc3339 timestamp>_<suffix>.csv`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use intake_core::{ObjectKey, TenantLabel};
    ///
    /// let tenant = TenantLabel::new("Display Lab").unwrap();
    /// let at = Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap();
    ///
    /// let key = ObjectKey::for_upload(&tenant, &at, "maptg");
    /// assert_eq!(key.as_str(), "data/Display-Lab/2020-01-01T10:00:00Z_maptg.csv");
    /// ```
    pub fn for_upload(tenant: &TenantLabel, uploaded_at: &DateTime<Utc>, suffix: &str) -> Self {
        Self(format!(
            "{}/{}/{}_{}.csv",
            DATA_PREFIX,
            tenant.dashed(),
            uploaded_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            suffix
        ))
    }

    /// Returns the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the key into its `<kind>/<tenant>/<filename>` parts.
    ///
    /// Returns `None` unless the key has exactly three non-empty segments.
    pub fn parse(&self) -> Option<KeyParts<'_>> {
        let mut parts = self.0.split('/');
        let kind = parts.next().filter(|s| !s.is_empty())?;
        let tenant = parts.next().filter(|s| !s.is_empty())?;
        let filename = parts.next().filter(|s| !s.is_empty())?;
        if parts.next().is_some() {
            return None;
        }
        Some(KeyParts {
            kind,
            tenant,
            filename,
        })
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// The segments of an [`ObjectKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// Top-level prefix (`data` or `reports`).
    pub kind: &'a str,
    /// Dashed tenant label.
    pub tenant: &'a str,
    /// Object filename.
    pub filename: &'a str,
}

/// Destination for accepted uploads.
///
/// `put` accepts only an [`EnrichedDocument`], which can only be built from an
/// upload that passed the header check. Raw uploads cannot reach storage.
///
/// ```compile_fail
/// use intake_core::{MemoryStore, ObjectKey, RawUpload, UploadStore};
///
/// let store = MemoryStore::new();
/// let raw = RawUpload::from_text("time\n");
/// store.put(&ObjectKey::from("data/x/y.csv"), &raw); // Type mismatch!
/// ```
pub trait UploadStore {
    /// Writes `document` under `key`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails.
    fn put(&self, key: &ObjectKey, document: &EnrichedDocument) -> Result<(), StoreError>;
}

/// Thread-safe in-memory store, for tests and local runs.
///
/// # Examples
///
/// ```
/// use intake_core::{MemoryStore, ObjectKey, RawUpload, TenantLabel, UploadStore, UploadValidator};
///
/// let store = MemoryStore::new();
/// let document = UploadValidator::measurement()
///     .admit(RawUpload::from_text("time,group,measure,numerator,denominator\n"))
///     .unwrap()
///     .enrich(&TenantLabel::new("Display Lab").unwrap())
///     .unwrap();
///
/// let key = ObjectKey::from("data/Display-Lab/2020-01-01T00:00:00Z_maptg.csv");
/// store.put(&key, &document).unwrap();
///
/// assert_eq!(store.len(), 1);
/// assert_eq!(
///     store.get(&key).as_deref(),
///     Some("time,group,measure,numerator,denominator,ascribee\n")
/// );
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<ObjectKey, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still holds every object written before the panic.
    fn lock_objects(&self) -> MutexGuard<'_, BTreeMap<ObjectKey, String>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the stored body under `key`.
    pub fn get(&self, key: &ObjectKey) -> Option<String> {
        self.lock_objects().get(key).cloned()
    }

    /// Returns every key starting with `prefix`, in key order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<ObjectKey> {
        self.lock_objects()
            .keys()
            .filter(|k| k.as_str().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Returns the number of stored objects.
    pub fn len(&self) -> usize {
        self.lock_objects().len()
    }

    /// Returns `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UploadStore for MemoryStore {
    fn put(&self, key: &ObjectKey, document: &EnrichedDocument) -> Result<(), StoreError> {
        let body = document
            .to_csv()
            .map_err(|e| StoreError::new(StoreErrorKind::Serialization, e.message()))?;

        tracing::debug!(key = %key, bytes = body.len(), "object written");
        self.lock_objects().insert(key.clone(), body);
        Ok(())
    }
}

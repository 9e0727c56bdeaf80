//! Expected column layout of an upload.

use std::fmt;

/// Field separator used by the canonical header and by serialized output.
pub const SEPARATOR: char = ',';

/// Line terminator used by the canonical header and by serialized output.
pub const TERMINATOR: char = '\n';

/// Columns of the aggregate measurement files accepted by the dashboard.
pub const MEASUREMENT_COLUMNS: [&str; 5] = ["time", "group", "measure", "numerator", "denominator"];

/// Error returned when a [`Schema`] cannot be built from the given columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    message: String,
}

impl SchemaError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl std::error::Error for SchemaError {}

/// An ordered list of required column names.
///
/// A document conforms to a schema only when its first line is exactly the
/// [canonical header](Schema::canonical_header): the column names joined by
/// [`SEPARATOR`] and followed by [`TERMINATOR`]. The check is structural;
/// nothing is inferred about cell contents.
///
/// Column names can never contain the separator, the terminator, a carriage
/// return or a double quote, since a header holding them could not be
/// compared verbatim.
///
/// # Examples
///
/// ```
/// use intake_core::Schema;
///
/// let schema = Schema::new(["time", "value"]).expect("valid columns");
/// assert_eq!(schema.canonical_header(), "time,value\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    header: String,
}

impl Schema {
    /// Builds a schema from an ordered sequence of column names.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the sequence is empty, or if any name is
    /// empty, duplicated, or contains a reserved character.
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        if columns.is_empty() {
            return Err(SchemaError::new("at least one column is required"));
        }

        for (idx, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(SchemaError::new(format!("column {} has an empty name", idx)));
            }
            if name.contains([SEPARATOR, TERMINATOR, '\r', '"']) {
                return Err(SchemaError::new(format!(
                    "column {} contains a reserved character",
                    idx
                )));
            }
            if columns[..idx].contains(name) {
                return Err(SchemaError::new(format!("column '{}' is duplicated", name)));
            }
        }

        let mut header = columns.join(&SEPARATOR.to_string());
        header.push(TERMINATOR);

        Ok(Self { columns, header })
    }

    /// The `time,group,measure,numerator,denominator` schema used for
    /// aggregate measurement uploads.
    pub fn measurement() -> Self {
        let columns: Vec<String> = MEASUREMENT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut header = columns.join(&SEPARATOR.to_string());
        header.push(TERMINATOR);
        Self { columns, header }
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always `false`; a schema has at least one column.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the exact first line a conforming upload must start with,
    /// terminator included.
    pub fn canonical_header(&self) -> &str {
        &self.header
    }

    /// Returns `true` if `line` is byte-identical to the canonical header.
    pub fn matches_header(&self, line: &[u8]) -> bool {
        line == self.header.as_bytes()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::measurement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_schema_header() {
        let schema = Schema::measurement();

        assert_eq!(
            schema.canonical_header(),
            "time,group,measure,numerator,denominator\n"
        );
        assert_eq!(schema.len(), 5);
        assert!(!schema.is_empty());
    }

    #[test]
    fn measurement_schema_equals_built_schema() {
        let built = Schema::new(MEASUREMENT_COLUMNS).expect("valid columns");
        assert_eq!(built, Schema::measurement());
        assert_eq!(Schema::default(), Schema::measurement());
    }

    #[test]
    fn single_column_schema() {
        let schema = Schema::new(["only"]).expect("valid");
        assert_eq!(schema.canonical_header(), "only\n");
    }

    #[test]
    fn rejects_empty_column_list() {
        let err = Schema::new(Vec::<String>::new()).unwrap_err();
        assert!(err.message().contains("at least one column"));
    }

    #[test]
    fn rejects_empty_column_name() {
        let err = Schema::new(["time", ""]).unwrap_err();
        assert!(err.message().contains("column 1"));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = Schema::new(["time", "group", "time"]).unwrap_err();
        assert!(err.message().contains("duplicated"));
    }

    #[test]
    fn rejects_reserved_characters() {
        assert!(Schema::new(["a,b"]).is_err());
        assert!(Schema::new(["a\nb"]).is_err());
        assert!(Schema::new(["a\rb"]).is_err());
        assert!(Schema::new(["a\"b"]).is_err());
    }

    #[test]
    fn matches_header_is_exact() {
        let schema = Schema::measurement();

        assert!(schema.matches_header(b"time,group,measure,numerator,denominator\n"));
        assert!(!schema.matches_header(b"time,group,measure,numerator,denominator\r\n"));
        assert!(!schema.matches_header(b"time,group,measure,numerator,denominator"));
        assert!(!schema.matches_header(b"Time,group,measure,numerator,denominator\n"));
        assert!(!schema.matches_header(b"time;group;measure;numerator;denominator\n"));
    }

    #[test]
    fn schema_error_display() {
        let err = Schema::new(["x", "x"]).unwrap_err();
        assert!(format!("{}", err).starts_with("invalid schema:"));
    }
}

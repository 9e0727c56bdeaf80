//! In-memory tables built from uploads.

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use crate::error::ValidationError;
use crate::schema::{SEPARATOR, TERMINATOR};
use crate::tenant::TenantLabel;

/// Name of the column enrichment appends to every record.
pub const ASCRIBEE_COLUMN: &str = "ascribee";

const SEPARATOR_BYTE: u8 = SEPARATOR as u8;

/// A parsed table: header row plus records in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularDocument {
    header: Vec<String>,
    records: Vec<Vec<String>>,
}

/// A borrowed view of one record, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    header: &'a [String],
    values: &'a [String],
}

impl<'a> Record<'a> {
    /// Returns the cell under `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.header
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    /// Returns the cells in header order.
    pub fn values(&self) -> &'a [String] {
        self.values
    }
}

impl TabularDocument {
    /// Parses CSV bytes using the first row as column names.
    ///
    /// Every record must have exactly as many fields as the header. A blank
    /// line is a record with no fields and is rejected like any other short
    /// record.
    ///
    /// # Errors
    ///
    /// Returns a `MalformedInput` error for a missing header, a field-count
    /// mismatch, a blank line, invalid UTF-8, a quote inside an unquoted
    /// field or an unterminated quoted field.
    pub fn parse(content: &[u8]) -> Result<Self, ValidationError> {
        // The csv reader is lenient about all of these, so they are checked
        // on the raw bytes first.
        check_record_structure(content)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .delimiter(SEPARATOR_BYTE)
            .from_reader(content);

        let header: Vec<String> = reader
            .headers()
            .map_err(describe_csv_error)?
            .iter()
            .map(String::from)
            .collect();

        if header.is_empty() || header.iter().all(String::is_empty) {
            return Err(ValidationError::malformed("missing header row"));
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record: StringRecord = result.map_err(describe_csv_error)?;
            records.push(record.iter().map(String::from).collect());
        }

        Ok(Self { header, records })
    }

    /// Returns the column names in order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Returns the number of data records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the document has a header but no data records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records in input order.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.records.iter().map(|values| Record {
            header: &self.header,
            values,
        })
    }

    /// Appends the `ascribee` column, set to `tenant` on every record.
    ///
    /// # Errors
    ///
    /// Returns a `MalformedInput` error if the document already has an
    /// `ascribee` column.
    pub fn ascribe(mut self, tenant: &TenantLabel) -> Result<EnrichedDocument, ValidationError> {
        if self.header.iter().any(|name| name == ASCRIBEE_COLUMN) {
            return Err(ValidationError::malformed(format!(
                "header already contains an '{}' column",
                ASCRIBEE_COLUMN
            )));
        }

        self.header.push(ASCRIBEE_COLUMN.to_string());
        for record in &mut self.records {
            record.push(tenant.as_str().to_string());
        }

        Ok(EnrichedDocument {
            document: self,
            tenant: tenant.clone(),
        })
    }

    /// Serializes the table as canonical CSV: `,` separated, `\n`
    /// terminated, fields quoted only when needed.
    pub fn to_csv(&self) -> Result<String, ValidationError> {
        let mut writer = WriterBuilder::new()
            .delimiter(SEPARATOR_BYTE)
            .terminator(Terminator::Any(TERMINATOR as u8))
            .from_writer(Vec::new());

        writer.write_record(&self.header).map_err(describe_csv_error)?;
        for record in &self.records {
            writer.write_record(record).map_err(describe_csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ValidationError::malformed(format!("could not flush table: {}", e.error())))?;
        String::from_utf8(bytes)
            .map_err(|_| ValidationError::malformed("serialized table is not valid UTF-8"))
    }
}

/// A verified document with the tenant `ascribee` column appended.
///
/// Only produced by [`TabularDocument::ascribe`], which the validator calls
/// after the header check. This is the only form of upload a
/// [`UploadStore`](crate::UploadStore) accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedDocument {
    document: TabularDocument,
    tenant: TenantLabel,
}

impl EnrichedDocument {
    /// Returns the enriched table; its last column is `ascribee`.
    pub fn document(&self) -> &TabularDocument {
        &self.document
    }

    /// Returns the tenant written into every record.
    pub fn tenant(&self) -> &TenantLabel {
        &self.tenant
    }

    /// Returns the number of data records.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Returns `true` if the upload had a header but no records.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Serializes the enriched table, header included.
    pub fn to_csv(&self) -> Result<String, ValidationError> {
        self.document.to_csv()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Scans raw CSV bytes for the structural errors the csv reader tolerates.
///
/// A `"` opens a quoted field only at the start of a field, `""` inside a
/// quoted field is an escaped quote, and a closing quote must be followed by
/// a separator or line end. Lines outside quoted fields must not be empty.
fn check_record_structure(content: &[u8]) -> Result<(), ValidationError> {
    let mut state = QuoteState::FieldStart;
    let mut line: u64 = 1;
    let mut line_start = true;
    let mut opened_on = line;

    for &byte in content {
        state = match (state, byte) {
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (QuoteState::FieldStart, b'"') => {
                opened_on = line;
                QuoteState::Quoted
            }
            (QuoteState::Unquoted, b'"') => {
                return Err(ValidationError::malformed(format!(
                    "line {}: quote inside unquoted field",
                    line
                )));
            }
            (_, b'\n') if line_start => {
                return Err(ValidationError::malformed(format!(
                    "line {}: blank line where a record was expected",
                    line
                )));
            }
            (_, b'\n') | (_, b'\r') | (_, SEPARATOR_BYTE) => QuoteState::FieldStart,
            (QuoteState::QuoteInQuoted, _) => {
                return Err(ValidationError::malformed(format!(
                    "line {}: unexpected character after closing quote",
                    line
                )));
            }
            (_, _) => QuoteState::Unquoted,
        };

        match byte {
            b'\n' => {
                line += 1;
                line_start = state == QuoteState::FieldStart;
            }
            b'\r' => {}
            _ => line_start = false,
        }
    }

    if state == QuoteState::Quoted {
        return Err(ValidationError::malformed(format!(
            "line {}: unterminated quoted field",
            opened_on
        )));
    }

    Ok(())
}

fn describe_csv_error(err: csv::Error) -> ValidationError {
    let line = err.position().map(|pos| pos.line());
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!(
            "record has {} fields, header declares {}",
            len, expected_len
        ),
        csv::ErrorKind::Utf8 { .. } => "content is not valid UTF-8".to_string(),
        csv::ErrorKind::Io(e) => format!("could not read content: {}", e),
        _ => "content is not a well-formed table".to_string(),
    };

    match line {
        Some(line) => ValidationError::malformed(format!("line {}: {}", line, message)),
        None => ValidationError::malformed(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationErrorKind;

    const VALID: &str = "time,group,measure,numerator,denominator\n\
                         2020-01-01,A,x,1,2\n\
                         2020-01-02,B,y,3,4\n";

    fn lab() -> TenantLabel {
        TenantLabel::new("Display Lab").expect("valid")
    }

    #[test]
    fn parses_header_and_records() {
        let doc = TabularDocument::parse(VALID.as_bytes()).expect("valid table");

        assert_eq!(doc.header(), ["time", "group", "measure", "numerator", "denominator"]);
        assert_eq!(doc.len(), 2);

        let first = doc.records().next().expect("one record");
        assert_eq!(first.get("time"), Some("2020-01-01"));
        assert_eq!(first.get("denominator"), Some("2"));
        assert_eq!(first.get("missing"), None);
    }

    #[test]
    fn header_only_document_is_empty() {
        let doc = TabularDocument::parse(b"time,group\n").expect("valid table");
        assert!(doc.is_empty());
        assert_eq!(doc.header().len(), 2);
    }

    #[test]
    fn rejects_short_record() {
        let err = TabularDocument::parse(b"a,b,c\n1,2\n").unwrap_err();

        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);
        assert!(err.message().contains("2 fields"));
        assert!(err.message().contains("declares 3"));
    }

    #[test]
    fn rejects_long_record() {
        let err = TabularDocument::parse(b"a,b\n1,2,3\n").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);
    }

    #[test]
    fn rejects_unterminated_quote() {
        let err = TabularDocument::parse(b"a,b\n\"open,2\n").unwrap_err();

        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);
        assert!(err.message().contains("line 2: unterminated"));
    }

    #[test]
    fn rejects_open_quote_when_quote_count_is_even() {
        // Two quotes in total; the second opens a field that never closes.
        let err = TabularDocument::parse(b"a,b\nx\"y,1\n2,\"open\n").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);

        let err = TabularDocument::parse(b"a,b\n\"x\"\"y\",1\n2,\"open \"\" end\n").unwrap_err();
        assert!(err.message().contains("line 3: unterminated"));
    }

    #[test]
    fn rejects_quote_inside_unquoted_field() {
        let content = b"time,group,measure,numerator,denominator\n\
                        2020-01-01,a\"b,x,1,2\n\
                        2020-01-02,B,y,3,\"4\n";
        let err = TabularDocument::parse(content).unwrap_err();

        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);
        assert!(err.message().contains("line 2: quote inside unquoted field"));
    }

    #[test]
    fn rejects_trailing_quote_in_unquoted_field() {
        let err = TabularDocument::parse(b"a,b\n1,5\"\n").unwrap_err();
        assert!(err.message().contains("quote inside unquoted field"));
    }

    #[test]
    fn rejects_text_after_closing_quote() {
        let err = TabularDocument::parse(b"a,b\n\"x\"y,2\n").unwrap_err();
        assert!(err.message().contains("after closing quote"));
    }

    #[test]
    fn rejects_blank_line_between_records() {
        let content = b"time,group,measure,numerator,denominator\n\
                        2020-01-01,A,x,1,2\n\
                        \n\
                        2020-01-02,B,y,3,4\n";
        let err = TabularDocument::parse(content).unwrap_err();

        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);
        assert!(err.message().contains("line 3: blank line"));
    }

    #[test]
    fn rejects_trailing_blank_line() {
        let err = TabularDocument::parse(b"a,b\n1,2\n\r\n").unwrap_err();
        assert!(err.message().contains("line 3: blank line"));
    }

    #[test]
    fn newline_inside_quotes_is_not_a_blank_line() {
        let doc = TabularDocument::parse(b"a,b\n\"first\n\nthird\",2\n").expect("valid");

        let record = doc.records().next().expect("one record");
        assert_eq!(record.get("a"), Some("first\n\nthird"));
    }

    #[test]
    fn crlf_records_parse() {
        let doc = TabularDocument::parse(b"a,b\r\n1,\"2\"\r\n").expect("valid");
        assert_eq!(doc.records().next().expect("one record").values(), ["1", "2"]);
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = TabularDocument::parse(b"a,b\n\xff,2\n").unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);
    }

    #[test]
    fn rejects_empty_content() {
        let err = TabularDocument::parse(b"").unwrap_err();
        assert!(err.message().contains("missing header"));
    }

    #[test]
    fn quoted_fields_survive_round_trip() {
        let doc = TabularDocument::parse(b"a,b\n\"x, y\",\"say \"\"hi\"\"\"\n").expect("valid");

        let record = doc.records().next().expect("one record");
        assert_eq!(record.get("a"), Some("x, y"));
        assert_eq!(record.get("b"), Some("say \"hi\""));

        let csv = doc.to_csv().expect("serializable");
        assert_eq!(csv, "a,b\n\"x, y\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn ascribe_appends_column_to_every_record() {
        let doc = TabularDocument::parse(VALID.as_bytes()).expect("valid");
        let enriched = doc.ascribe(&lab()).expect("no ascribee column yet");

        assert_eq!(enriched.document().header().last().map(String::as_str), Some("ascribee"));
        assert_eq!(enriched.len(), 2);
        for record in enriched.document().records() {
            assert_eq!(record.get("ascribee"), Some("Display Lab"));
        }
        assert_eq!(enriched.tenant(), &lab());
    }

    #[test]
    fn ascribe_rejects_existing_ascribee_column() {
        let doc = TabularDocument::parse(b"time,ascribee\n1,Other\n").expect("valid");
        let err = doc.ascribe(&lab()).unwrap_err();

        assert_eq!(err.kind(), ValidationErrorKind::MalformedInput);
    }

    #[test]
    fn enriched_serialization_matches_expected_text() {
        let doc = TabularDocument::parse(b"time,group,measure,numerator,denominator\n2020-01-01,A,x,1,2\n")
            .expect("valid");
        let csv = doc.ascribe(&lab()).expect("enriched").to_csv().expect("serializable");

        assert_eq!(
            csv,
            "time,group,measure,numerator,denominator,ascribee\n2020-01-01,A,x,1,2,Display Lab\n"
        );
    }

    #[test]
    fn tenant_with_separator_is_quoted() {
        let tenant = TenantLabel::new("Lab, North").expect("valid");
        let doc = TabularDocument::parse(b"a\n1\n").expect("valid");

        let csv = doc.ascribe(&tenant).expect("enriched").to_csv().expect("serializable");
        assert_eq!(csv, "a,ascribee\n1,\"Lab, North\"\n");
    }

    #[test]
    fn header_only_enriches_to_header_only() {
        let doc = TabularDocument::parse(b"a,b\n").expect("valid");
        let enriched = doc.ascribe(&lab()).expect("enriched");

        assert!(enriched.is_empty());
        assert_eq!(enriched.to_csv().expect("serializable"), "a,b,ascribee\n");
    }
}

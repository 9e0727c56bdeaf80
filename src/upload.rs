use std::fmt;
use std::io::{self, BufRead, BufReader, Cursor, Read, Seek};

/// Uploaded file content that has not been validated yet.
///
/// `RawUpload<R>` wraps a rewindable reader (anything `Read + Seek`) holding
/// the bytes a user submitted. The content is only reachable through the
/// validator: the header check peeks at the first line, enrichment parses the
/// whole stream. Both leave the reader positioned at the start.
///
/// # Security Properties
///
/// - Does NOT implement `Read`, `Deref` or `AsRef` over the content
/// - `Debug` never prints the content
/// - Content reaches storage only as an [`EnrichedDocument`](crate::EnrichedDocument)
///
/// # Examples
///
/// ```
/// use intake_core::RawUpload;
///
/// let upload = RawUpload::from_text("time,group,measure,numerator,denominator\n");
/// println!("{:?}", upload); // RawUpload { .. }
/// ```
// Clone lets a caller retry a rejected upload against another schema.
#[derive(Clone)]
pub struct RawUpload<R> {
    // Must stay private; reading it directly skips the header check.
    inner: R,
}

impl RawUpload<Cursor<Vec<u8>>> {
    /// Wraps an in-memory byte buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(bytes.into()))
    }

    /// Wraps in-memory text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_bytes(text.into().into_bytes())
    }
}

impl<R: Read + Seek> RawUpload<R> {
    /// Wraps an untrusted, rewindable reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Resets the read position to the beginning of the stream.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.inner.rewind()
    }

    /// Returns the current read position.
    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    /// Releases the underlying reader.
    ///
    /// After any validator call the reader is positioned at the start.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads the first line, terminator included, and rewinds.
    ///
    /// If the stream has no `\n`, the whole stream is the first line. The
    /// stream is rewound even when the read fails.
    pub(crate) fn peek_first_line(&mut self) -> io::Result<Vec<u8>> {
        self.inner.rewind()?;

        let mut line = Vec::new();
        let read = BufReader::new(&mut self.inner).read_until(b'\n', &mut line);
        let rewound = self.inner.rewind();

        read?;
        rewound?;
        Ok(line)
    }

    /// Reads the full content from the start and rewinds.
    pub(crate) fn read_all(&mut self) -> io::Result<Vec<u8>> {
        self.inner.rewind()?;

        let mut content = Vec::new();
        let read = self.inner.read_to_end(&mut content);
        let rewound = self.inner.rewind();

        read?;
        rewound?;
        Ok(content)
    }
}

impl<R> fmt::Debug for RawUpload<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawUpload").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_does_not_leak_content() {
        let upload = RawUpload::from_text("secret,columns\n1,2\n");
        let debug_output = format!("{:?}", upload);

        assert!(debug_output.contains("RawUpload"));
        assert!(!debug_output.contains("secret"));
    }

    #[test]
    fn peek_first_line_includes_terminator() {
        let mut upload = RawUpload::from_text("a,b\n1,2\n");

        let line = upload.peek_first_line().expect("in-memory read");
        assert_eq!(line, b"a,b\n");
        assert_eq!(upload.position().expect("position"), 0);
    }

    #[test]
    fn peek_first_line_without_terminator_reads_everything() {
        let mut upload = RawUpload::from_text("a,b");

        let line = upload.peek_first_line().expect("in-memory read");
        assert_eq!(line, b"a,b");
    }

    #[test]
    fn peek_first_line_on_empty_stream() {
        let mut upload = RawUpload::from_bytes(Vec::new());

        let line = upload.peek_first_line().expect("in-memory read");
        assert!(line.is_empty());
    }

    #[test]
    fn peek_starts_from_beginning_even_after_seek() {
        use std::io::SeekFrom;

        let mut cursor = Cursor::new(b"a,b\n1,2\n".to_vec());
        cursor.seek(SeekFrom::Start(5)).expect("seek");
        let mut upload = RawUpload::new(cursor);

        let line = upload.peek_first_line().expect("in-memory read");
        assert_eq!(line, b"a,b\n");
    }

    #[test]
    fn read_all_returns_full_content_and_rewinds() {
        let mut upload = RawUpload::from_text("a,b\n1,2\n");

        let first = upload.read_all().expect("in-memory read");
        let second = upload.read_all().expect("in-memory read");

        assert_eq!(first, b"a,b\n1,2\n");
        assert_eq!(first, second);
        assert_eq!(upload.position().expect("position"), 0);
    }

    #[test]
    fn into_inner_returns_reader_at_start() {
        let mut upload = RawUpload::from_text("a,b\n1,2\n");
        upload.peek_first_line().expect("in-memory read");

        let mut cursor = upload.into_inner();
        let mut content = String::new();
        cursor.read_to_string(&mut content).expect("read");

        assert_eq!(content, "a,b\n1,2\n");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: peeking never changes what a full read returns
            #[test]
            fn proptest_peek_preserves_content(content in prop::collection::vec(any::<u8>(), 0..512)) {
                let mut upload = RawUpload::from_bytes(content.clone());

                let line = upload.peek_first_line().expect("in-memory read");
                let all = upload.read_all().expect("in-memory read");

                prop_assert!(content.starts_with(&line));
                prop_assert_eq!(all, content);
            }
        }
    }
}

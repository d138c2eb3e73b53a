//! Resumable session state and byte-range bookkeeping.
//!
//! A session is created once per job from the Location header returned at
//! initiation and mutated only by confirmations from the server, so the
//! confirmed offset never moves backwards and never passes the total size.

/// Inclusive byte range of a single chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the range. Never zero: ranges are
    /// inclusive on both ends.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Header value for a partial-content update: `bytes {start}-{end}/{total}`.
    pub fn content_range(&self, total_bytes: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total_bytes)
    }
}

/// State of one resumable upload session.
#[derive(Debug, Clone)]
pub struct ResumableSession {
    location: String,
    total_bytes: u64,
    bytes_confirmed: u64,
}

impl ResumableSession {
    pub fn new(location: String, total_bytes: u64) -> Self {
        Self {
            location,
            total_bytes,
            bytes_confirmed: 0,
        }
    }

    /// Session URL all chunk updates are addressed to.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes the server has acknowledged so far.
    pub fn bytes_confirmed(&self) -> u64 {
        self.bytes_confirmed
    }

    /// Next chunk to transmit, or `None` once every byte is confirmed.
    ///
    /// The final chunk is truncated at `total_bytes - 1` and may be shorter
    /// than the nominal chunk size.
    pub fn next_range(&self, chunk_bytes: u64) -> Option<ByteRange> {
        if self.bytes_confirmed >= self.total_bytes {
            return None;
        }
        let start = self.bytes_confirmed;
        let end = start
            .saturating_add(chunk_bytes.max(1) - 1)
            .min(self.total_bytes - 1);
        Some(ByteRange { start, end })
    }

    /// Record a server confirmation through the given byte (inclusive).
    ///
    /// Confirmations are monotonic: a stale or duplicate acknowledgment
    /// never moves the offset backwards, and the offset is clamped to the
    /// total size.
    pub fn confirm_through(&mut self, high_inclusive: u64) {
        let confirmed = high_inclusive.saturating_add(1).min(self.total_bytes);
        if confirmed > self.bytes_confirmed {
            self.bytes_confirmed = confirmed;
        }
    }

    /// Mark the whole session confirmed, on a final creation response.
    pub fn confirm_all(&mut self) {
        self.bytes_confirmed = self.total_bytes;
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_confirmed >= self.total_bytes
    }
}

/// Parse the upper bound of a `Range: bytes=0-{high}` continuation header.
pub(crate) fn parse_range_end(value: &str) -> Option<u64> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let (_, end) = spec.rsplit_once('-')?;
    end.trim().parse().ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_ranges(total: u64, chunk: u64) -> Vec<ByteRange> {
        let mut session = ResumableSession::new("http://session".to_string(), total);
        let mut ranges = Vec::new();
        while let Some(range) = session.next_range(chunk) {
            ranges.push(range);
            session.confirm_through(range.end);
        }
        ranges
    }

    #[test]
    fn test_ranges_partition_with_short_tail() {
        let ranges = collect_ranges(10, 4);
        assert_eq!(
            ranges,
            vec![
                ByteRange { start: 0, end: 3 },
                ByteRange { start: 4, end: 7 },
                ByteRange { start: 8, end: 9 },
            ]
        );
        assert_eq!(ranges.iter().map(ByteRange::len).sum::<u64>(), 10);
    }

    #[test]
    fn test_ranges_partition_exact_multiple() {
        let ranges = collect_ranges(8, 4);
        assert_eq!(
            ranges,
            vec![
                ByteRange { start: 0, end: 3 },
                ByteRange { start: 4, end: 7 },
            ]
        );
    }

    #[test]
    fn test_single_chunk_when_total_below_chunk_size() {
        let ranges = collect_ranges(3, 1024);
        assert_eq!(ranges, vec![ByteRange { start: 0, end: 2 }]);
    }

    #[test]
    fn test_ranges_are_contiguous_and_non_overlapping() {
        for (total, chunk) in [(1, 1), (7, 3), (256, 16), (1000, 333)] {
            let ranges = collect_ranges(total, chunk);
            let mut expected_start = 0;
            for range in &ranges {
                assert_eq!(range.start, expected_start);
                assert!(range.end >= range.start);
                expected_start = range.end + 1;
            }
            assert_eq!(expected_start, total);
        }
    }

    #[test]
    fn test_empty_total_yields_no_ranges() {
        let session = ResumableSession::new("http://session".to_string(), 0);
        assert!(session.next_range(4).is_none());
        assert!(session.is_complete());
    }

    #[test]
    fn test_confirmations_are_monotonic() {
        let mut session = ResumableSession::new("http://session".to_string(), 100);
        session.confirm_through(49);
        assert_eq!(session.bytes_confirmed(), 50);

        // Stale acknowledgment does not move the offset backwards.
        session.confirm_through(9);
        assert_eq!(session.bytes_confirmed(), 50);

        // Re-acknowledging the same range changes nothing.
        session.confirm_through(49);
        assert_eq!(session.bytes_confirmed(), 50);
    }

    #[test]
    fn test_confirmation_clamped_to_total() {
        let mut session = ResumableSession::new("http://session".to_string(), 100);
        session.confirm_through(5000);
        assert_eq!(session.bytes_confirmed(), 100);
        assert!(session.is_complete());
    }

    #[test]
    fn test_next_range_resumes_from_confirmed_offset() {
        let mut session = ResumableSession::new("http://session".to_string(), 100);
        session.confirm_through(63);
        let range = session.next_range(32).unwrap();
        assert_eq!(range, ByteRange { start: 64, end: 95 });
    }

    #[test]
    fn test_parse_range_end() {
        assert_eq!(parse_range_end("bytes=0-12345"), Some(12345));
        assert_eq!(parse_range_end(" bytes=0-7 "), Some(7));
        assert_eq!(parse_range_end("bytes=0-"), None);
        assert_eq!(parse_range_end("0-7"), None);
        assert_eq!(parse_range_end("garbage"), None);
    }

    #[test]
    fn test_content_range_header_value() {
        let range = ByteRange { start: 0, end: 3 };
        assert_eq!(range.content_range(10), "bytes 0-3/10");
    }
}

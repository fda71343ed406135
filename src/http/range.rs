//! HTTP Range request parsing module
//!
//! Single byte-range parsing for partial content delivery.
//!
//! Either bound of `bytes=<start>-<end>` may be omitted: an empty start means
//! offset 0 and an empty end means the last byte of the file. Headers that do
//! not use the `bytes` unit, list several ranges or carry non-numeric bounds
//! are ignored so the caller can fall back to a whole-file response.

const BYTES_UNIT: &str = "bytes=";

/// Inclusive byte window into a file
///
/// Always satisfies `start <= end < file_size` for the file it was parsed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: u64,
}

impl RangeSpec {
    /// Number of bytes covered by the window
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` header of a 206 response
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(RangeSpec),
    /// Range not satisfiable (start >= `file_size`) - should return 416
    NotSatisfiable,
    /// No Range header or malformed (ignore, return full content)
    None,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// # Examples
/// ```ignore
/// let result = parse_range_header(Some("bytes=500-"), 1000);
/// assert_eq!(result, RangeParseResult::Valid(RangeSpec { start: 500, end: 999 }));
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header.map(str::trim) else {
        return RangeParseResult::None;
    };

    let Some(spec) = strip_bytes_unit(header) else {
        return RangeParseResult::None;
    };

    // multipart/byteranges is not served
    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() && end_str.is_empty() {
        return RangeParseResult::None;
    }

    let start = if start_str.is_empty() {
        0
    } else {
        let Ok(s) = start_str.parse::<u64>() else {
            return RangeParseResult::None;
        };
        s
    };

    let end = if end_str.is_empty() {
        None
    } else {
        let Ok(e) = end_str.parse::<u64>() else {
            return RangeParseResult::None;
        };
        Some(e)
    };

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    // An end past the last byte is clamped, not rejected
    let last = file_size - 1;
    let end = end.map_or(last, |e| e.min(last));

    if start > end {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(RangeSpec { start, end })
}

/// Strip a case-insensitive `bytes=` prefix
fn strip_bytes_unit(header: &str) -> Option<&str> {
    let prefix = header.get(..BYTES_UNIT.len())?;
    if prefix.eq_ignore_ascii_case(BYTES_UNIT) {
        header.get(BYTES_UNIT.len()..)
    } else {
        None
    }
}

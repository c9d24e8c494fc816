//! Source location utilities.

use saphyr_parser::Span as ParserSpan;
use serde::{Deserialize, Serialize};

/// Position of an event within the source YAML document.
///
/// `line` and `column` are 1-indexed and count characters; `offset` is the 0-based
/// character index of the event start. Events replayed from an anchor keep the
/// location where the anchored node was defined.
///
/// ```
/// let mut events = saphyr_json::EventTranslator::from_yaml("---\nkey: value\n");
/// while let Some(event) = events.next().unwrap() {
///     if event.is_key() {
///         break;
///     }
/// }
/// let location = events.location();
/// assert_eq!((location.line(), location.column(), location.offset()), (2, 1, 4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) offset: u64,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Reported before the first event has been read and for errors that are not tied
    /// to the source text.
    pub const UNKNOWN: Self = Self {
        line: 0,
        column: 0,
        offset: u64::MAX,
    };

    /// Create a new location record.
    ///
    /// Arguments:
    /// - `line`: 1-indexed line.
    /// - `column`: 1-indexed column.
    /// - `offset`: 0-indexed character offset.
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        // 4G lines is more than any YAML document we can read.
        Self {
            line: line as u32,
            column: column as u32,
            offset: offset as u64,
        }
    }

    /// 1-indexed line, or -1 if unknown.
    #[inline]
    pub fn line(&self) -> i64 {
        if self.is_unknown() { -1 } else { self.line as i64 }
    }

    /// 1-indexed column, or -1 if unknown.
    #[inline]
    pub fn column(&self) -> i64 {
        if self.is_unknown() { -1 } else { self.column as i64 }
    }

    /// 0-indexed character offset, or -1 if unknown.
    #[inline]
    pub fn offset(&self) -> i64 {
        if self.is_unknown() { -1 } else { self.offset as i64 }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        self == &Self::UNKNOWN
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Convert a `saphyr_parser::Span` to a [`Location`].
///
/// The parser reports 1-based lines and 0-based columns; both become 1-based here.
pub(crate) fn location_from_span(span: &ParserSpan) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1, start.index())
}

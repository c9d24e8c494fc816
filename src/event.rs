//! Normalized, JSON-shaped events produced by the translator.

use std::cell::OnceCell;
use std::str::FromStr;

use serde_json::Number;

use crate::parse_scalars::{ScalarKind, normalize_number};

/// Kind of a normalized [`Event`], without payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    MappingStart,
    MappingEnd,
    SequenceStart,
    SequenceEnd,
    Key,
    Value,
}

/// A JSON-shaped event.
///
/// Keys are never type-resolved. Values carry the resolved [`ScalarKind`] and their text.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    StreamStart,
    StreamEnd,
    DocumentStart,
    DocumentEnd,
    MappingStart,
    MappingEnd,
    SequenceStart,
    SequenceEnd,
    Key(String),
    Value(Scalar),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::StreamStart => EventKind::StreamStart,
            Event::StreamEnd => EventKind::StreamEnd,
            Event::DocumentStart => EventKind::DocumentStart,
            Event::DocumentEnd => EventKind::DocumentEnd,
            Event::MappingStart => EventKind::MappingStart,
            Event::MappingEnd => EventKind::MappingEnd,
            Event::SequenceStart => EventKind::SequenceStart,
            Event::SequenceEnd => EventKind::SequenceEnd,
            Event::Key(_) => EventKind::Key,
            Event::Value(_) => EventKind::Value,
        }
    }

    #[inline]
    pub fn is_key(&self) -> bool {
        matches!(self, Event::Key(_))
    }

    /// Starts an object, array or scalar value (the first event of a value subtree).
    #[inline]
    pub fn starts_value(&self) -> bool {
        matches!(
            self,
            Event::MappingStart | Event::SequenceStart | Event::Value(_)
        )
    }
}

/// Scalar value with its resolved kind.
///
/// The JSON number is parsed from the text on first use and then kept.
#[derive(Clone, Debug)]
pub struct Scalar {
    kind: ScalarKind,
    text: String,
    number: OnceCell<Option<Number>>,
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Scalar {
    pub fn new<S: Into<String>>(kind: ScalarKind, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
            number: OnceCell::new(),
        }
    }

    /// Quoted, block or otherwise untyped string.
    pub fn string<S: Into<String>>(text: S) -> Self {
        Self::new(ScalarKind::String, text)
    }

    #[inline]
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// The scalar text exactly as it appeared in the document.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// JSON number for integer and float scalars, `None` for everything else.
    pub fn number(&self) -> Option<&Number> {
        self.number
            .get_or_init(|| {
                if self.kind.is_number() {
                    Number::from_str(&normalize_number(&self.text, self.kind)).ok()
                } else {
                    None
                }
            })
            .as_ref()
    }

    /// Written with the integer grammar (decimal, octal, hexadecimal or binary).
    #[inline]
    pub fn is_integral(&self) -> bool {
        matches!(self.kind, ScalarKind::Integer { .. })
    }

    pub(crate) fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_is_parsed_once_and_exact() {
        let scalar = Scalar::new(ScalarKind::Integer { radix: 16 }, "0xFFFFFFFFFFFFFFFFFF");
        let first = scalar.number().unwrap() as *const Number;
        let second = scalar.number().unwrap() as *const Number;
        assert_eq!(first, second);
        assert_eq!(
            scalar.number().unwrap().to_string(),
            "4722366482869645213695"
        );
    }

    #[test]
    fn strings_have_no_number() {
        assert!(Scalar::string("10").number().is_none());
        assert!(Scalar::new(ScalarKind::NaN, ".nan").number().is_none());
    }

    #[test]
    fn equality_ignores_cached_number() {
        let a = Scalar::new(ScalarKind::Float, "1.5");
        let b = Scalar::new(ScalarKind::Float, "1.5");
        let _ = a.number();
        assert_eq!(a, b);
        assert_ne!(a, Scalar::string("1.5"));
    }
}

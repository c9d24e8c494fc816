//! Raw YAML events exchanged with the tokenizer and the text emitter.
//!
//! The translator never looks at YAML text itself. It pulls [`RawEvent`]s from a
//! [`RawEvents`] source and the generator pushes them into a [`RawEmitter`]. The bundled
//! implementations are [`crate::live_events::LiveEvents`] (on top of `saphyr-parser`) and
//! [`crate::text_emitter::TextEmitter`].

use crate::error::Error;
use crate::location::Location;

/// Numeric identity of an anchor as assigned by the tokenizer.
///
/// Redefining an anchor name yields a fresh id, so an alias always refers to the
/// nearest preceding declaration.
pub type AnchorId = usize;

/// Presentation style of a scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

impl ScalarStyle {
    /// Only plain scalars take part in implicit type resolution.
    #[inline]
    pub fn is_plain(self) -> bool {
        matches!(self, ScalarStyle::Plain)
    }
}

impl From<saphyr_parser::ScalarStyle> for ScalarStyle {
    fn from(style: saphyr_parser::ScalarStyle) -> Self {
        match style {
            saphyr_parser::ScalarStyle::Plain => ScalarStyle::Plain,
            saphyr_parser::ScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
            saphyr_parser::ScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
            saphyr_parser::ScalarStyle::Literal => ScalarStyle::Literal,
            saphyr_parser::ScalarStyle::Folded => ScalarStyle::Folded,
        }
    }
}

/// Low-level YAML event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawEvent {
    StreamStart,
    StreamEnd,
    /// `explicit` is true when the document starts with `---`.
    DocumentStart { explicit: bool },
    /// `explicit` is true when the document ends with `...`.
    DocumentEnd { explicit: bool },
    MappingStart { anchor: Option<AnchorId> },
    MappingEnd,
    SequenceStart { anchor: Option<AnchorId> },
    SequenceEnd,
    Scalar {
        value: String,
        style: ScalarStyle,
        anchor: Option<AnchorId>,
    },
    Alias { anchor: AnchorId },
}

impl RawEvent {
    /// Plain scalar without anchor.
    pub fn plain<S: Into<String>>(value: S) -> Self {
        RawEvent::Scalar {
            value: value.into(),
            style: ScalarStyle::Plain,
            anchor: None,
        }
    }

    /// Scalar with the given style and no anchor.
    pub fn scalar<S: Into<String>>(value: S, style: ScalarStyle) -> Self {
        RawEvent::Scalar {
            value: value.into(),
            style,
            anchor: None,
        }
    }
}

/// Pull source of raw events (the tokenizer side).
pub trait RawEvents {
    /// Next event together with the location where it starts, or `None` at the end of input.
    fn next_raw(&mut self) -> Result<Option<(RawEvent, Location)>, Error>;

    /// Name of anchor `id` as written in the source, if known. Used in error messages.
    fn anchor_name(&self, _id: AnchorId) -> Option<&str> {
        None
    }

    /// Release the underlying input. Reports I/O failures that were not surfaced yet.
    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

/// Adapts any iterator of located raw events into a [`RawEvents`] source.
///
/// ```
/// use saphyr_json::{Event, EventTranslator, Location, RawEvent, RawEventIter};
///
/// let raw = vec![
///     RawEvent::StreamStart,
///     RawEvent::DocumentStart { explicit: false },
///     RawEvent::plain("42"),
///     RawEvent::DocumentEnd { explicit: false },
///     RawEvent::StreamEnd,
/// ];
/// let source = RawEventIter::new(raw.into_iter().map(|ev| (ev, Location::UNKNOWN)));
/// let mut events = EventTranslator::new(source, Default::default());
/// let mut last = None;
/// while let Some(event) = events.next().unwrap() {
///     if matches!(event, Event::Value(_)) {
///         last = Some(events.number().unwrap().to_string());
///     }
/// }
/// assert_eq!(last.as_deref(), Some("42"));
/// ```
pub struct RawEventIter<I> {
    inner: I,
}

impl<I> RawEventIter<I>
where
    I: Iterator<Item = (RawEvent, Location)>,
{
    pub fn new(inner: I) -> Self {
        Self { inner }
    }
}

impl<I> RawEvents for RawEventIter<I>
where
    I: Iterator<Item = (RawEvent, Location)>,
{
    fn next_raw(&mut self) -> Result<Option<(RawEvent, Location)>, Error> {
        Ok(self.inner.next())
    }
}

/// Push sink of raw events (the text emitter side).
pub trait RawEmitter {
    /// Write one event. The scalar style is already decided by the caller.
    fn emit(&mut self, event: RawEvent) -> Result<(), Error>;

    /// Push buffered output to the underlying sink.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Flush and release the underlying sink.
    fn close(&mut self) -> Result<(), Error> {
        self.flush()
    }
}

impl RawEmitter for Vec<RawEvent> {
    fn emit(&mut self, event: RawEvent) -> Result<(), Error> {
        self.push(event);
        Ok(())
    }
}

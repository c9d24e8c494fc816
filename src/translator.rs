//! Translation of raw YAML events into JSON-shaped [`Event`]s.
//!
//! Raw events are pulled one at a time and turned into zero or more normalized events in
//! a queue. Alias expansion does not copy: the anchor's recording is pushed on a replay
//! stack and read from there until exhausted, before the next raw event is pulled.
//!
//! State kept on the raw side
//! - one frame per open mapping or sequence, telling whether a mapping waits for a key
//!   or for a value; this decides whether a scalar is a `Key` or a `Value`,
//! - the anchor registry of the current document.
//!
//! On the consumer side only the stack of structures the caller is inside is kept, for
//! skipping and materializing.

use std::collections::VecDeque;
use std::io::Read;
use std::rc::Rc;

use serde_json::Number;
use smallvec::SmallVec;

use crate::anchors::{AnchorRecord, AnchorRegistry, Captured};
use crate::budget::BudgetBreach;
use crate::error::{Error, alias_label};
use crate::event::{Event, EventKind, Scalar};
use crate::live_events::LiveEvents;
use crate::location::Location;
use crate::options::ParserOptions;
use crate::parse_scalars::{ScalarKind, classify};
use crate::raw::{AnchorId, RawEvent, RawEvents};

#[derive(Clone, Copy, Debug)]
struct Frame {
    mapping: bool,
    /// In a mapping: a key has been read and its value has not.
    awaiting_value: bool,
}

/// Pull parser exposing a YAML stream as JSON-shaped events.
///
/// ```
/// use saphyr_json::{Event, EventTranslator};
///
/// let mut events = EventTranslator::from_yaml("key: 0x10\n");
/// let mut seen = Vec::new();
/// while let Some(event) = events.next()? {
///     if let Event::Value(_) = event {
///         seen.push(events.number()?.to_string());
///     }
/// }
/// assert_eq!(seen, ["16"]);
/// # Ok::<(), saphyr_json::Error>(())
/// ```
pub struct EventTranslator<S: RawEvents> {
    source: S,
    options: ParserOptions,
    queue: VecDeque<(Event, Location)>,
    replay: Vec<(Rc<AnchorRecord>, usize)>,
    anchors: AnchorRegistry,
    frames: SmallVec<[Frame; 16]>,
    /// Structures the caller is inside, innermost last.
    pub(crate) open: Vec<EventKind>,
    current: Option<Event>,
    location: Location,
    exhausted: bool,
    failed: bool,
    closed: bool,
}

impl<'a> EventTranslator<LiveEvents<'a>> {
    /// Events of a YAML string with default options.
    pub fn from_yaml(input: &'a str) -> Self {
        Self::from_yaml_with_options(input, ParserOptions::default())
    }

    pub fn from_yaml_with_options(input: &'a str, options: ParserOptions) -> Self {
        let source = LiveEvents::new_from_str(input, options.budget.clone());
        Self::new(source, options)
    }

    /// Events of YAML read incrementally from `reader`.
    pub fn from_reader<R: Read + 'a>(reader: R, options: ParserOptions) -> Self {
        let source =
            LiveEvents::new_from_reader(reader, options.budget.clone(), options.max_input_bytes);
        Self::new(source, options)
    }
}

impl<S: RawEvents> EventTranslator<S> {
    /// Translate events pulled from `source`.
    pub fn new(source: S, options: ParserOptions) -> Self {
        Self {
            source,
            options,
            queue: VecDeque::new(),
            replay: Vec::new(),
            anchors: AnchorRegistry::default(),
            frames: SmallVec::new(),
            open: Vec::new(),
            current: None,
            location: Location::UNKNOWN,
            exhausted: false,
            failed: false,
            closed: false,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// True if another event is available. Reads ahead without consuming.
    pub fn has_next(&mut self) -> Result<bool, Error> {
        self.check_usable()?;
        self.guard(Self::fill)
    }

    /// Advance to the next event and return it, or `None` at the end of the stream.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<&Event>, Error> {
        self.check_usable()?;
        if !self.guard(Self::fill)? {
            self.current = None;
            return Ok(None);
        }
        let Some((event, location)) = self.queue.pop_front() else {
            return Ok(None);
        };
        match event {
            Event::MappingStart | Event::SequenceStart => self.open.push(event.kind()),
            Event::MappingEnd | Event::SequenceEnd => {
                self.open.pop();
            }
            _ => {}
        }
        self.location = location;
        self.current = Some(event);
        Ok(self.current.as_ref())
    }

    /// The event returned by the last [`next`](Self::next).
    pub fn current(&self) -> Option<&Event> {
        self.current.as_ref()
    }

    /// Where the current event starts; [`Location::UNKNOWN`] before the first event.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Text of the current key, string or number value.
    pub fn as_str(&self) -> Result<&str, Error> {
        match &self.current {
            Some(Event::Key(text)) => Ok(text),
            Some(Event::Value(scalar))
                if !matches!(
                    scalar.kind(),
                    ScalarKind::Null | ScalarKind::True | ScalarKind::False
                ) =>
            {
                Ok(scalar.text())
            }
            _ => Err(Error::usage("current event is not a key, string or number")),
        }
    }

    /// Value of the current number.
    pub fn number(&self) -> Result<&Number, Error> {
        let scalar = self.current_number()?;
        scalar.number().ok_or_else(|| {
            Error::msg(format!("invalid number `{}`", scalar.text())).with_location(self.location)
        })
    }

    /// True if the current number was written as an integer.
    pub fn is_integral(&self) -> Result<bool, Error> {
        Ok(self.current_number()?.is_integral())
    }

    pub fn is_positive_infinity(&self) -> Result<bool, Error> {
        Ok(self.current_value()?.kind() == ScalarKind::PositiveInfinity)
    }

    pub fn is_negative_infinity(&self) -> Result<bool, Error> {
        Ok(self.current_value()?.kind() == ScalarKind::NegativeInfinity)
    }

    pub fn is_nan(&self) -> Result<bool, Error> {
        Ok(self.current_value()?.kind() == ScalarKind::NaN)
    }

    /// Release the source. Further reads are usage errors.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.queue.clear();
        self.replay.clear();
        self.source.close()
    }

    fn current_value(&self) -> Result<&Scalar, Error> {
        match &self.current {
            Some(Event::Value(scalar)) => Ok(scalar),
            _ => Err(Error::usage("current event is not a value")),
        }
    }

    fn current_number(&self) -> Result<&Scalar, Error> {
        match &self.current {
            Some(Event::Value(scalar)) if scalar.kind().is_number() => Ok(scalar),
            _ => Err(Error::usage("current event is not a number")),
        }
    }

    fn check_usable(&self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::usage("event translator is closed"));
        }
        if self.failed {
            return Err(Error::usage(
                "event translator cannot continue after a parse error",
            ));
        }
        Ok(())
    }

    /// Run `step`; a failure makes the translator unusable.
    fn guard<T>(&mut self, step: fn(&mut Self) -> Result<T, Error>) -> Result<T, Error> {
        step(self).inspect_err(|_| self.failed = true)
    }

    /// Make sure the queue holds an event. False at the end of the stream.
    fn fill(&mut self) -> Result<bool, Error> {
        while self.queue.is_empty() {
            if self.replay_one() {
                continue;
            }
            if self.exhausted {
                return Ok(false);
            }
            match self.source.next_raw()? {
                Some((raw, location)) => self
                    .translate(raw, location)
                    .map_err(|err| err.with_location(location))?,
                None => self.exhausted = true,
            }
        }
        Ok(true)
    }

    /// Move one item from the top replay frame into the queue. False if nothing is replaying.
    fn replay_one(&mut self) -> bool {
        let Some((record, idx)) = self.replay.last_mut() else {
            return false;
        };
        let item = record.items.get(*idx).cloned();
        *idx += 1;
        match item {
            Some(Captured::Event(event, location)) => {
                log::trace!("replay {event:?}");
                self.queue.push_back((event, location));
            }
            Some(Captured::Nested(nested)) => self.replay.push((nested, 0)),
            None => {
                self.replay.pop();
            }
        }
        true
    }

    fn enqueue(&mut self, event: Event, location: Location) {
        log::trace!("enqueue {event:?} at {location:?}");
        self.anchors.record(&event, location);
        self.queue.push_back((event, location));
    }

    fn in_key_position(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.mapping && !frame.awaiting_value)
    }

    fn key_done(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.awaiting_value = true;
        }
    }

    fn value_done(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.awaiting_value = false;
        }
    }

    fn translate(&mut self, raw: RawEvent, location: Location) -> Result<(), Error> {
        match raw {
            RawEvent::StreamStart => self.enqueue(Event::StreamStart, location),
            RawEvent::StreamEnd => self.enqueue(Event::StreamEnd, location),
            RawEvent::DocumentStart { .. } => {
                self.anchors.reset();
                self.frames.clear();
                self.enqueue(Event::DocumentStart, location);
            }
            RawEvent::DocumentEnd { .. } => self.enqueue(Event::DocumentEnd, location),
            RawEvent::MappingStart { anchor } => {
                self.start_structure(true, anchor, location)?;
            }
            RawEvent::SequenceStart { anchor } => {
                self.start_structure(false, anchor, location)?;
            }
            RawEvent::MappingEnd => self.end_structure(Event::MappingEnd, location)?,
            RawEvent::SequenceEnd => self.end_structure(Event::SequenceEnd, location)?,
            RawEvent::Scalar {
                value,
                style,
                anchor,
            } => {
                let is_key = self.in_key_position();
                let scalar = if style.is_plain() {
                    Scalar::new(classify(&value, &self.options.dialect), value)
                } else {
                    Scalar::string(value)
                };
                if let Some(id) = anchor {
                    self.anchors
                        .define_scalar(id, Event::Value(scalar.clone()), location);
                }
                if is_key {
                    self.enqueue(Event::Key(scalar.into_text()), location);
                    self.key_done();
                } else {
                    self.enqueue(Event::Value(scalar), location);
                    self.value_done();
                }
            }
            RawEvent::Alias { anchor } => self.alias(anchor, location)?,
        }
        Ok(())
    }

    fn start_structure(
        &mut self,
        mapping: bool,
        anchor: Option<AnchorId>,
        location: Location,
    ) -> Result<(), Error> {
        if self.in_key_position() {
            return Err(Error::msg("mapping keys must be scalars"));
        }
        let depth = self.frames.len() + 1;
        if depth > self.options.max_depth {
            return Err(Error::budget(BudgetBreach::Depth { depth }));
        }
        if let Some(id) = anchor {
            self.anchors.open(id, depth);
        }
        self.frames.push(Frame {
            mapping,
            awaiting_value: false,
        });
        let event = if mapping {
            Event::MappingStart
        } else {
            Event::SequenceStart
        };
        self.enqueue(event, location);
        Ok(())
    }

    fn end_structure(&mut self, event: Event, location: Location) -> Result<(), Error> {
        let depth = self.frames.len();
        if self.frames.pop().is_none() {
            return Err(Error::msg("unbalanced end of mapping or sequence"));
        }
        self.enqueue(event, location);
        self.anchors.end_structure(depth);
        self.value_done();
        Ok(())
    }

    fn alias(&mut self, anchor: AnchorId, location: Location) -> Result<(), Error> {
        if !self.options.dialect.aliases {
            return Err(Error::msg("aliases are not allowed"));
        }
        let name = self.source.anchor_name(anchor);
        let record = self
            .anchors
            .resolve(anchor)
            .map_err(|err| err.with_anchor_name(name))?;

        if self.in_key_position() {
            let Some(text) = record.single_scalar() else {
                return Err(Error::msg(format!(
                    "{} used as a key must refer to a scalar",
                    alias_label(anchor, name)
                )));
            };
            self.enqueue(Event::Key(text.to_owned()), location);
            self.key_done();
            return Ok(());
        }

        if let Some(max) = self.options.max_alias_expansion_size {
            if record.leaves >= max {
                return Err(Error::ExpansionLimit {
                    anchor,
                    name: name.map(str::to_owned),
                    size: record.leaves,
                    location,
                });
            }
        }
        log::debug!(
            "expanding alias of anchor {anchor} ({} leaves)",
            record.leaves
        );
        self.anchors.record_nested(&record);
        self.replay.push((record, 0));
        self.value_done();
        Ok(())
    }
}

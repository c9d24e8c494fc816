//! Live events: raw events pulled from `saphyr_parser::Parser`.
//!
//! Responsibilities
//! - Convert parser events into owned [`RawEvent`]s with their [`Location`].
//! - Enforce the optional [`Budget`] on every converted event.
//! - Surface read failures of reader-backed input, which the parser itself cannot report.
//!
//! Tags are dropped; typing is decided by the translator from the scalar text and style.

use nohash_hasher::IntMap;
use saphyr_parser::{Event, Parser, Span, StrInput};

use crate::budget::{Budget, BudgetEnforcer};
use crate::buffered_input::{ReaderInput, SharedIoError, reader_input};
use crate::error::Error;
use crate::location::{Location, location_from_span};
use crate::raw::{AnchorId, RawEvent, RawEvents};

enum Source<'a> {
    Str {
        parser: Parser<'a, StrInput<'a>>,
        input: &'a str,
    },
    Reader {
        parser: Parser<'static, ReaderInput<'a>>,
        error: SharedIoError,
    },
}

/// [`RawEvents`] source backed by `saphyr-parser`.
pub struct LiveEvents<'a> {
    source: Source<'a>,
    budget: Option<BudgetEnforcer>,
    /// Anchor names seen in aliases, for error messages. String input only.
    names: IntMap<AnchorId, String>,
    /// Set after end of input or `close()`; no further parser pulls happen.
    done: bool,
}

impl<'a> LiveEvents<'a> {
    /// Events of a YAML string.
    pub fn new_from_str(input: &'a str, budget: Option<Budget>) -> Self {
        Self {
            source: Source::Str {
                parser: Parser::new_from_str(input),
                input,
            },
            budget: budget.map(BudgetEnforcer::new),
            names: IntMap::default(),
            done: false,
        }
    }

    /// Events of YAML read incrementally from `reader`.
    ///
    /// UTF-8 and BOM-marked UTF-16 are accepted. With `max_input_bytes` set, reading more
    /// decoded bytes than that fails with an I/O error.
    pub fn new_from_reader<R: std::io::Read + 'a>(
        reader: R,
        budget: Option<Budget>,
        max_input_bytes: Option<usize>,
    ) -> Self {
        let (input, error) = reader_input(reader, max_input_bytes);
        Self {
            source: Source::Reader {
                parser: Parser::new(input),
                error,
            },
            budget: budget.map(BudgetEnforcer::new),
            names: IntMap::default(),
            done: false,
        }
    }

    fn take_io_error(&mut self) -> Option<std::io::Error> {
        match &self.source {
            Source::Str { .. } => None,
            Source::Reader { error, .. } => error.borrow_mut().take(),
        }
    }
}

#[inline]
fn anchor(id: usize) -> Option<AnchorId> {
    (id != 0).then_some(id)
}

impl LiveEvents<'_> {
    /// The alias token spans `*name`.
    fn remember_alias_name(&mut self, id: AnchorId, span: &Span) {
        let Source::Str { input, .. } = &self.source else {
            return;
        };
        if self.names.contains_key(&id) {
            return;
        }
        let name = span
            .byte_range()
            .and_then(|range| input.get(range))
            .map(|token| token.trim_start_matches('*'))
            .filter(|name| !name.is_empty());
        if let Some(name) = name {
            self.names.insert(id, name.to_owned());
        }
    }
}

impl RawEvents for LiveEvents<'_> {
    fn next_raw(&mut self) -> Result<Option<(RawEvent, Location)>, Error> {
        while !self.done {
            let item = match &mut self.source {
                Source::Str { parser, .. } => parser.next(),
                Source::Reader { parser, .. } => parser.next(),
            };
            // A failed read looks like end of input (or garbage) to the parser.
            if let Some(cause) = self.take_io_error() {
                self.done = true;
                return Err(Error::IOError { cause });
            }
            let Some(item) = item else {
                self.done = true;
                break;
            };
            let (event, span) = item.map_err(Error::from_scan_error)?;
            let location = location_from_span(&span);

            let raw = match event {
                Event::Nothing => continue,
                Event::StreamStart => RawEvent::StreamStart,
                Event::StreamEnd => RawEvent::StreamEnd,
                Event::DocumentStart(explicit) => RawEvent::DocumentStart { explicit },
                // The parser does not tell whether `...` was present.
                Event::DocumentEnd => RawEvent::DocumentEnd { explicit: false },
                Event::Alias(id) => {
                    self.remember_alias_name(id, &span);
                    RawEvent::Alias { anchor: id }
                }
                Event::Scalar(value, style, id, _tag) => RawEvent::Scalar {
                    value: value.into_owned(),
                    style: style.into(),
                    anchor: anchor(id),
                },
                Event::SequenceStart(id, _tag) => RawEvent::SequenceStart { anchor: anchor(id) },
                Event::SequenceEnd => RawEvent::SequenceEnd,
                Event::MappingStart(id, _tag) => RawEvent::MappingStart { anchor: anchor(id) },
                Event::MappingEnd => RawEvent::MappingEnd,
            };
            if let Some(budget) = self.budget.as_mut() {
                budget
                    .observe(&raw)
                    .map_err(|breach| Error::budget(breach).with_location(location))?;
            }
            log::trace!("raw {raw:?} at {location:?}");
            return Ok(Some((raw, location)));
        }
        Ok(None)
    }

    fn anchor_name(&self, id: AnchorId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    fn close(&mut self) -> Result<(), Error> {
        self.done = true;
        match self.take_io_error() {
            Some(cause) => {
                log::warn!("closing YAML input with unreported read error: {cause}");
                Err(Error::IOError { cause })
            }
            None => Ok(()),
        }
    }
}

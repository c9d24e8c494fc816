//! Reading one complete value from a YAML source.

use std::io::Read;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::event::EventKind;
use crate::live_events::LiveEvents;
use crate::options::ParserOptions;
use crate::raw::RawEvents;
use crate::translator::EventTranslator;

/// Reads the single value of a YAML stream.
///
/// The reader is single use: after the value has been read, further reads are usage
/// errors. A stream with more than one document is rejected.
///
/// ```
/// use saphyr_json::{ParserOptions, YamlReader};
/// use serde_json::json;
///
/// let mut reader = YamlReader::from_yaml("- a\n- {b: 2}\n", ParserOptions::default());
/// assert_eq!(reader.read_array()?, vec![json!("a"), json!({"b": 2})]);
/// assert!(reader.read().is_err());
/// reader.close()?;
/// # Ok::<(), saphyr_json::Error>(())
/// ```
pub struct YamlReader<S: RawEvents> {
    events: EventTranslator<S>,
    consumed: bool,
}

impl<'a> YamlReader<LiveEvents<'a>> {
    pub fn from_yaml(input: &'a str, options: ParserOptions) -> Self {
        Self::new(EventTranslator::from_yaml_with_options(input, options))
    }

    pub fn from_reader<R: Read + 'a>(reader: R, options: ParserOptions) -> Self {
        Self::new(EventTranslator::from_reader(reader, options))
    }
}

impl<S: RawEvents> YamlReader<S> {
    pub fn new(events: EventTranslator<S>) -> Self {
        Self {
            events,
            consumed: false,
        }
    }

    /// Read the value. An empty stream reads as null.
    pub fn read(&mut self) -> Result<Value, Error> {
        let value = match self.begin()? {
            Some(_) => self.events.materialize_value()?,
            None => Value::Null,
        };
        self.finish()?;
        Ok(value)
    }

    /// Read the value, which must be a mapping.
    pub fn read_object(&mut self) -> Result<Map<String, Value>, Error> {
        if self.begin()? != Some(EventKind::MappingStart) {
            return Err(Error::msg("expected a YAML mapping").with_location(self.events.location()));
        }
        let map = self.events.materialize_object()?;
        self.finish()?;
        Ok(map)
    }

    /// Read the value, which must be a sequence.
    pub fn read_array(&mut self) -> Result<Vec<Value>, Error> {
        if self.begin()? != Some(EventKind::SequenceStart) {
            return Err(
                Error::msg("expected a YAML sequence").with_location(self.events.location())
            );
        }
        let items = self.events.materialize_array()?;
        self.finish()?;
        Ok(items)
    }

    /// Release the source, reporting a pending I/O error.
    pub fn close(&mut self) -> Result<(), Error> {
        self.events.close()
    }

    /// Move to the first event of the root value; `None` if the stream has no document.
    fn begin(&mut self) -> Result<Option<EventKind>, Error> {
        if self.consumed {
            return Err(Error::usage("value already read"));
        }
        self.consumed = true;
        while let Some(event) = self.events.next()? {
            if event.starts_value() {
                return Ok(Some(event.kind()));
            }
        }
        Ok(None)
    }

    /// Drain the rest of the stream, which must not start another document.
    fn finish(&mut self) -> Result<(), Error> {
        while let Some(event) = self.events.next()? {
            if event.kind() == EventKind::DocumentStart {
                return Err(Error::msg(
                    "multiple YAML documents found; use from_str_multiple to read all of them",
                )
                .with_location(self.events.location()));
            }
        }
        Ok(())
    }
}

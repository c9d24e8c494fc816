//! Writing one complete value as a YAML document.

use std::fmt;

use serde_json::{Map, Value};

use crate::emitter::EventEmitter;
use crate::error::Error;
use crate::generator_options::GeneratorOptions;
use crate::raw::RawEmitter;
use crate::text_emitter::TextEmitter;

/// Writes a single value as one YAML document.
///
/// ```
/// use saphyr_json::{GeneratorOptions, YamlWriter};
/// use serde_json::json;
///
/// let mut out = String::new();
/// let mut writer = YamlWriter::with_text(&mut out, GeneratorOptions::default())?;
/// writer.write(&json!({"greeting": "it's me"}))?;
/// assert!(writer.write(&json!(1)).is_err());
/// writer.close()?;
/// drop(writer);
/// assert_eq!(out, "greeting: \"it's me\"\n");
/// # Ok::<(), saphyr_json::Error>(())
/// ```
pub struct YamlWriter<E: RawEmitter> {
    emitter: EventEmitter<E>,
    written: bool,
}

impl<W: fmt::Write> YamlWriter<TextEmitter<W>> {
    /// Writer producing YAML text into `out`.
    pub fn with_text(out: W, options: GeneratorOptions) -> Result<Self, Error> {
        Self::new(TextEmitter::new(out, options.indent_step), options)
    }
}

impl<E: RawEmitter> YamlWriter<E> {
    pub fn new(sink: E, options: GeneratorOptions) -> Result<Self, Error> {
        Ok(Self {
            emitter: EventEmitter::new(sink, options)?,
            written: false,
        })
    }

    pub fn write(&mut self, value: &Value) -> Result<(), Error> {
        self.claim()?;
        self.emitter.write_value(value)
    }

    pub fn write_object(&mut self, map: &Map<String, Value>) -> Result<(), Error> {
        self.claim()?;
        self.emitter.write_object(map)
    }

    pub fn write_array(&mut self, items: &[Value]) -> Result<(), Error> {
        self.claim()?;
        self.emitter.write_array(items)
    }

    /// Close the sink; fails if the value was not written completely.
    pub fn close(&mut self) -> Result<(), Error> {
        self.emitter.close()
    }

    pub fn into_inner(self) -> E {
        self.emitter.into_inner()
    }

    fn claim(&mut self) -> Result<(), Error> {
        if self.written {
            return Err(Error::usage("value already written"));
        }
        self.written = true;
        Ok(())
    }
}

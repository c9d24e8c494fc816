//! YAML through a JSON-shaped streaming event model.
//!
//! [`EventTranslator`] turns a YAML stream into keys, values and structure events the way a
//! JSON pull parser would report them. Plain scalars are typed by the YAML Core Schema (or
//! YAML 1.1, see [`Dialect`]), aliases are expanded in place, and the expansion can be
//! bounded so that "billion laughs" documents fail early. On the other side
//! [`EventEmitter`] writes JSON-shaped events as YAML, choosing for every string the
//! scalar style that reads back as the same string.
//!
//! ```
//! use serde_json::json;
//!
//! let yaml = "
//! defaults: &defaults {retries: 3, timeout: 0x1E}
//! service:
//!   <<: *defaults
//!   name: api
//!   timeout: 60
//! ";
//! let value = saphyr_json::from_str(yaml)?;
//! assert_eq!(value["service"], json!({"retries": 3, "timeout": 60, "name": "api"}));
//!
//! let back = saphyr_json::to_string(&value["service"])?;
//! assert_eq!(back, "retries: 3\ntimeout: 60\nname: api\n");
//! # Ok::<(), saphyr_json::Error>(())
//! ```

use std::{fmt, io};

use serde_json::Value;

mod anchors;
pub mod budget;
mod buffered_input;
mod dialect;
mod emitter;
mod error;
mod event;
mod generator_options;
mod live_events;
mod location;
mod macros;
mod materialize;
mod options;
mod parse_scalars;
mod raw;
mod reader;
mod ser_quoting;
mod text_emitter;
mod translator;
mod writer;
mod zmij_format;

pub use budget::{Budget, BudgetBreach, BudgetReport, check_yaml_budget};
pub use dialect::{Dialect, YamlVersion};
pub use emitter::{EventEmitter, WriteValue};
pub use error::{Error, ErrorKind};
pub use event::{Event, EventKind, Scalar};
pub use generator_options::GeneratorOptions;
pub use live_events::LiveEvents;
pub use location::Location;
pub use options::{DEFAULT_MAX_DEPTH, ParserOptions};
pub use parse_scalars::{ScalarKind, classify};
pub use raw::{AnchorId, RawEmitter, RawEvent, RawEventIter, RawEvents, ScalarStyle};
pub use reader::YamlReader;
pub use ser_quoting::select_style;
pub use text_emitter::{IoSink, TextEmitter};
pub use translator::EventTranslator;
pub use writer::YamlWriter;

/// Read the single YAML document in `input` as a JSON value.
///
/// Empty input reads as `null`. More than one document is an error.
pub fn from_str(input: &str) -> Result<Value, Error> {
    from_str_with_options(input, ParserOptions::default())
}

pub fn from_str_with_options(input: &str, options: ParserOptions) -> Result<Value, Error> {
    let mut reader = YamlReader::from_yaml(input, options);
    let value = reader.read()?;
    reader.close()?;
    Ok(value)
}

/// Read every document in `input`, one value per document.
///
/// ```
/// let docs = saphyr_json::from_str_multiple("--- 1\n---\n--- [x]\n")?;
/// assert_eq!(docs, vec![serde_json::json!(1), serde_json::Value::Null, serde_json::json!(["x"])]);
/// # Ok::<(), saphyr_json::Error>(())
/// ```
pub fn from_str_multiple(input: &str) -> Result<Vec<Value>, Error> {
    from_str_multiple_with_options(input, ParserOptions::default())
}

pub fn from_str_multiple_with_options(
    input: &str,
    options: ParserOptions,
) -> Result<Vec<Value>, Error> {
    let mut events = EventTranslator::from_yaml_with_options(input, options);
    let mut documents = Vec::new();
    while let Some(event) = events.next()? {
        // Materializing consumes nested values, so only document roots are seen here.
        if event.starts_value() {
            documents.push(events.materialize_value()?);
        }
    }
    events.close()?;
    Ok(documents)
}

/// Read the single YAML document from `reader` (UTF-8, or UTF-16 with a BOM).
pub fn from_reader<R: io::Read>(reader: R) -> Result<Value, Error> {
    from_reader_with_options(reader, ParserOptions::default())
}

pub fn from_reader_with_options<R: io::Read>(
    reader: R,
    options: ParserOptions,
) -> Result<Value, Error> {
    let mut reader = YamlReader::from_reader(reader, options);
    let value = reader.read()?;
    reader.close()?;
    Ok(value)
}

/// Write `value` as a YAML document with default options.
pub fn to_string(value: &Value) -> Result<String, Error> {
    to_string_with_options(value, GeneratorOptions::default())
}

pub fn to_string_with_options(value: &Value, options: GeneratorOptions) -> Result<String, Error> {
    let mut out = String::new();
    to_fmt_writer_with_options(&mut out, value, options)?;
    Ok(out)
}

pub fn to_fmt_writer_with_options<W: fmt::Write>(
    out: &mut W,
    value: &Value,
    options: GeneratorOptions,
) -> Result<(), Error> {
    let mut writer = YamlWriter::with_text(out, options)?;
    writer.write(value)?;
    writer.close()
}

pub fn to_io_writer<W: io::Write>(writer: W, value: &Value) -> Result<(), Error> {
    to_io_writer_with_options(writer, value, GeneratorOptions::default())
}

/// Write `value` into an [`io::Write`]. Write failures surface as [`Error::IOError`].
pub fn to_io_writer_with_options<W: io::Write>(
    writer: W,
    value: &Value,
    options: GeneratorOptions,
) -> Result<(), Error> {
    let mut sink = IoSink::new(writer);
    let result = to_fmt_writer_with_options(&mut sink, value, options);
    if let Some(cause) = sink.take_error() {
        return Err(Error::IOError { cause });
    }
    result?;
    sink.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_input_is_null() {
        assert_eq!(from_str("").unwrap(), Value::Null);
    }

    #[test]
    fn io_writer_gets_text() {
        let mut buf = Vec::new();
        to_io_writer(&mut buf, &json!([1, "two"])).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "- 1\n- two\n");
    }

    #[test]
    fn reader_input() {
        let value = from_reader("a: ~\n".as_bytes()).unwrap();
        assert_eq!(value, json!({"a": null}));
    }
}

//! JSON-shaped writing on top of a raw YAML event sink.
//!
//! [`EventEmitter`] tracks whether it is inside an object or an array and turns each
//! call into raw events. Scalar styles come from [`select_style`]. Document and stream
//! markers wrap the single root value.

use serde_json::{Map, Number, Value};

use crate::error::Error;
use crate::generator_options::GeneratorOptions;
use crate::parse_scalars::plain_decimal;
use crate::raw::{RawEmitter, RawEvent, ScalarStyle};
use crate::ser_quoting::select_style;
use crate::zmij_format::push_float_string;

/// A scalar the emitter can write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WriteValue<'a> {
    Null,
    Bool(bool),
    Str(&'a str),
    Int(i128),
    F32(f32),
    F64(f64),
    /// Number text is written as is (`arbitrary_precision` keeps it exact).
    Number(&'a Number),
}

impl<'a> From<&'a str> for WriteValue<'a> {
    fn from(value: &'a str) -> Self {
        WriteValue::Str(value)
    }
}

impl<'a> From<&'a String> for WriteValue<'a> {
    fn from(value: &'a String) -> Self {
        WriteValue::Str(value)
    }
}

impl From<bool> for WriteValue<'_> {
    fn from(value: bool) -> Self {
        WriteValue::Bool(value)
    }
}

impl From<()> for WriteValue<'_> {
    fn from(_: ()) -> Self {
        WriteValue::Null
    }
}

impl<'a> From<&'a Number> for WriteValue<'a> {
    fn from(value: &'a Number) -> Self {
        WriteValue::Number(value)
    }
}

impl From<f32> for WriteValue<'_> {
    fn from(value: f32) -> Self {
        WriteValue::F32(value)
    }
}

impl From<f64> for WriteValue<'_> {
    fn from(value: f64) -> Self {
        WriteValue::F64(value)
    }
}

macro_rules! int_write_value {
    ($($ty:ty),*) => {$(
        impl From<$ty> for WriteValue<'_> {
            fn from(value: $ty) -> Self {
                WriteValue::Int(value as i128)
            }
        }
    )*};
}

int_write_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<'a, T: Into<WriteValue<'a>>> From<Option<T>> for WriteValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(WriteValue::Null, Into::into)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Context {
    Object { has_key: bool },
    Array,
}

/// Writes one JSON-shaped value as raw YAML events.
///
/// ```
/// use saphyr_json::{EventEmitter, GeneratorOptions, TextEmitter};
///
/// let mut out = String::new();
/// let mut emitter = EventEmitter::new(TextEmitter::new(&mut out, 2), GeneratorOptions::default())?;
/// emitter.start_object()?;
/// emitter.write_entry("name", "demo")?;
/// emitter.write_key("ports")?;
/// emitter.start_array()?;
/// emitter.write(8080)?;
/// emitter.end_array()?;
/// emitter.end_object()?;
/// emitter.close()?;
/// drop(emitter);
/// assert_eq!(out, "name: demo\nports:\n- 8080\n");
/// # Ok::<(), saphyr_json::Error>(())
/// ```
pub struct EventEmitter<E: RawEmitter> {
    sink: E,
    options: GeneratorOptions,
    stack: Vec<Context>,
    started: bool,
    complete: bool,
    closed: bool,
}

impl<E: RawEmitter> EventEmitter<E> {
    /// Fails with a usage error if `options` are inconsistent.
    pub fn new(sink: E, options: GeneratorOptions) -> Result<Self, Error> {
        options.consistent()?;
        Ok(Self {
            sink,
            options,
            stack: Vec::new(),
            started: false,
            complete: false,
            closed: false,
        })
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Give back the sink.
    pub fn into_inner(self) -> E {
        self.sink
    }

    /// Write a key in the current object.
    pub fn write_key(&mut self, key: &str) -> Result<(), Error> {
        self.check_open()?;
        match self.stack.last_mut() {
            Some(Context::Object { has_key }) if !*has_key => *has_key = true,
            Some(Context::Object { .. }) => {
                return Err(Error::usage("key already written, expected a value"));
            }
            _ => return Err(Error::usage("not in object context")),
        }
        let style = select_style(key, true, &self.options);
        self.sink.emit(RawEvent::scalar(key, style))
    }

    pub fn start_object(&mut self) -> Result<(), Error> {
        self.begin_value()?;
        self.stack.push(Context::Object { has_key: false });
        self.sink.emit(RawEvent::MappingStart { anchor: None })
    }

    pub fn start_array(&mut self) -> Result<(), Error> {
        self.begin_value()?;
        self.stack.push(Context::Array);
        self.sink.emit(RawEvent::SequenceStart { anchor: None })
    }

    /// Write a key and open an object as its value.
    pub fn start_object_entry(&mut self, key: &str) -> Result<(), Error> {
        self.write_key(key)?;
        self.start_object()
    }

    pub fn start_array_entry(&mut self, key: &str) -> Result<(), Error> {
        self.write_key(key)?;
        self.start_array()
    }

    pub fn end_object(&mut self) -> Result<(), Error> {
        self.check_open()?;
        match self.stack.last() {
            Some(Context::Object { has_key: false }) => {}
            Some(Context::Object { has_key: true }) => {
                return Err(Error::usage("key written without a value"));
            }
            _ => return Err(Error::usage("not in object context")),
        }
        self.stack.pop();
        self.sink.emit(RawEvent::MappingEnd)?;
        self.end_value()
    }

    pub fn end_array(&mut self) -> Result<(), Error> {
        self.check_open()?;
        if self.stack.last() != Some(&Context::Array) {
            return Err(Error::usage("not in array context"));
        }
        self.stack.pop();
        self.sink.emit(RawEvent::SequenceEnd)?;
        self.end_value()
    }

    /// End the innermost object or array.
    pub fn end(&mut self) -> Result<(), Error> {
        match self.stack.last() {
            Some(Context::Object { .. }) => self.end_object(),
            Some(Context::Array) => self.end_array(),
            None => Err(Error::usage("not in array or object context")),
        }
    }

    /// Write a scalar: the root value, an array item or the value of the last key.
    pub fn write<'v, V: Into<WriteValue<'v>>>(&mut self, value: V) -> Result<(), Error> {
        self.begin_value()?;
        let event = self.scalar_event(value.into());
        self.sink.emit(event)?;
        self.end_value()
    }

    /// Write a key and its scalar value.
    pub fn write_entry<'v, V: Into<WriteValue<'v>>>(&mut self, key: &str, value: V) -> Result<(), Error> {
        self.write_key(key)?;
        self.write(value)
    }

    pub fn write_null(&mut self) -> Result<(), Error> {
        self.write(WriteValue::Null)
    }

    /// Write a whole value tree. Nesting is walked with an explicit stack.
    pub fn write_value(&mut self, value: &Value) -> Result<(), Error> {
        enum Step<'v> {
            Value(&'v Value),
            Key(&'v str),
            EndObject,
            EndArray,
        }

        let mut steps = vec![Step::Value(value)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Key(key) => self.write_key(key)?,
                Step::EndObject => self.end_object()?,
                Step::EndArray => self.end_array()?,
                Step::Value(Value::Object(map)) => {
                    self.start_object()?;
                    steps.push(Step::EndObject);
                    for (key, value) in map.iter().rev() {
                        steps.push(Step::Value(value));
                        steps.push(Step::Key(key));
                    }
                }
                Step::Value(Value::Array(items)) => {
                    self.start_array()?;
                    steps.push(Step::EndArray);
                    steps.extend(items.iter().rev().map(Step::Value));
                }
                Step::Value(Value::Null) => self.write_null()?,
                Step::Value(Value::Bool(b)) => self.write(*b)?,
                Step::Value(Value::Number(n)) => self.write(n)?,
                Step::Value(Value::String(s)) => self.write(s)?,
            }
        }
        Ok(())
    }

    /// Write an object from its entries.
    pub fn write_object(&mut self, map: &Map<String, Value>) -> Result<(), Error> {
        self.start_object()?;
        for (key, value) in map {
            self.write_key(key)?;
            self.write_value(value)?;
        }
        self.end_object()
    }

    /// Write an array from its items.
    pub fn write_array(&mut self, items: &[Value]) -> Result<(), Error> {
        self.start_array()?;
        for item in items {
            self.write_value(item)?;
        }
        self.end_array()
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.check_open()?;
        self.sink.flush()
    }

    /// Close the sink. Fails afterwards if a started value was left unfinished.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sink.close()?;
        if self.started && !self.complete {
            return Err(Error::usage("output YAML is incomplete"));
        }
        Ok(())
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.closed {
            return Err(Error::usage("event emitter is closed"));
        }
        Ok(())
    }

    /// Validate the position of a new value and open the document for the root value.
    fn begin_value(&mut self) -> Result<(), Error> {
        self.check_open()?;
        if self.complete {
            return Err(Error::usage("document is already complete"));
        }
        match self.stack.last_mut() {
            None => {
                self.started = true;
                self.sink.emit(RawEvent::StreamStart)?;
                self.sink.emit(RawEvent::DocumentStart {
                    explicit: self.options.explicit_start,
                })?;
            }
            Some(Context::Object { has_key }) => {
                if !*has_key {
                    return Err(Error::usage("value written without a key"));
                }
                *has_key = false;
            }
            Some(Context::Array) => {}
        }
        Ok(())
    }

    /// Close the document once the root value is done.
    fn end_value(&mut self) -> Result<(), Error> {
        if self.stack.is_empty() {
            self.complete = true;
            self.sink.emit(RawEvent::DocumentEnd {
                explicit: self.options.explicit_end,
            })?;
            self.sink.emit(RawEvent::StreamEnd)?;
        }
        Ok(())
    }

    fn scalar_event(&self, value: WriteValue<'_>) -> RawEvent {
        match value {
            WriteValue::Null => RawEvent::plain("null"),
            WriteValue::Bool(b) => RawEvent::plain(if b { "true" } else { "false" }),
            WriteValue::Str(text) => {
                RawEvent::scalar(text, select_style(text, false, &self.options))
            }
            WriteValue::Int(i) => RawEvent::plain(i.to_string()),
            WriteValue::F32(f) => self.float_event(f),
            WriteValue::F64(f) => self.float_event(f),
            WriteValue::Number(n) => RawEvent::plain(self.number_text(n.to_string())),
        }
    }

    fn float_event<F: zmij::Float + num_traits::float::FloatCore>(&self, f: F) -> RawEvent {
        let mut text = String::new();
        push_float_string(&mut text, f);
        RawEvent::scalar(self.number_text(text), ScalarStyle::Plain)
    }

    /// `.inf` and `.nan` carry no exponent and pass through unchanged.
    fn number_text(&self, text: String) -> String {
        if self.options.plain_big_decimal {
            plain_decimal(&text).unwrap_or(text)
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    fn events_of(value: &Value, options: GeneratorOptions) -> Vec<RawEvent> {
        let mut emitter = EventEmitter::new(Vec::new(), options).unwrap();
        emitter.write_value(value).unwrap();
        emitter.close().unwrap();
        emitter.into_inner()
    }

    #[test]
    fn root_object_is_wrapped_in_document() {
        let events = events_of(&json!({"key": 10}), GeneratorOptions::default());
        assert_eq!(
            events,
            vec![
                RawEvent::StreamStart,
                RawEvent::DocumentStart { explicit: false },
                RawEvent::MappingStart { anchor: None },
                RawEvent::plain("key"),
                RawEvent::plain("10"),
                RawEvent::MappingEnd,
                RawEvent::DocumentEnd { explicit: false },
                RawEvent::StreamEnd,
            ]
        );
    }

    #[test]
    fn styles_come_from_selector() {
        let events = events_of(
            &json!({"10": "value with: colon", "n": null, "s": "true"}),
            GeneratorOptions::default(),
        );
        assert_eq!(events[3], RawEvent::scalar("10", ScalarStyle::SingleQuoted));
        assert_eq!(
            events[4],
            RawEvent::scalar("value with: colon", ScalarStyle::SingleQuoted)
        );
        assert_eq!(events[6], RawEvent::plain("null"));
        assert_eq!(events[8], RawEvent::scalar("true", ScalarStyle::SingleQuoted));
    }

    #[test]
    fn key_outside_object_is_a_usage_error() {
        let mut emitter = EventEmitter::new(Vec::new(), GeneratorOptions::default()).unwrap();
        emitter.start_array().unwrap();
        let err = emitter.write_key("k").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.to_string(), "not in object context");
    }

    #[test]
    fn end_without_context() {
        let mut emitter = EventEmitter::new(Vec::new(), GeneratorOptions::default()).unwrap();
        assert_eq!(
            emitter.end().unwrap_err().to_string(),
            "not in array or object context"
        );
        emitter.start_object().unwrap();
        assert!(emitter.end_array().is_err());
        emitter.end().unwrap();
        assert!(emitter.write(1).is_err());
    }

    #[test]
    fn value_without_key_is_rejected() {
        let mut emitter = EventEmitter::new(Vec::new(), GeneratorOptions::default()).unwrap();
        emitter.start_object().unwrap();
        assert_eq!(emitter.write(1).unwrap_err().kind(), ErrorKind::Usage);
    }

    #[test]
    fn close_reports_incomplete_output() {
        let mut emitter = EventEmitter::new(Vec::new(), GeneratorOptions::default()).unwrap();
        emitter.start_object().unwrap();
        emitter.write_key("a").unwrap();
        let err = emitter.close().unwrap_err();
        assert_eq!(err.to_string(), "output YAML is incomplete");
        assert_eq!(emitter.write(1).unwrap_err().to_string(), "event emitter is closed");
        emitter.close().unwrap();
    }

    #[test]
    fn numbers_are_plain() {
        let options = crate::generator_options! { plain_big_decimal: true };
        let mut emitter = EventEmitter::new(Vec::new(), options).unwrap();
        emitter.start_array().unwrap();
        emitter.write(1.5e3f64).unwrap();
        emitter.write(f64::NEG_INFINITY).unwrap();
        emitter.write(-7i64).unwrap();
        let big: Number = serde_json::from_str("3.1415926535897932380E19").unwrap();
        emitter.write(&big).unwrap();
        emitter.end_array().unwrap();
        let events = emitter.into_inner();
        assert_eq!(events[3], RawEvent::plain("1500.0"));
        assert_eq!(events[4], RawEvent::plain("-.inf"));
        assert_eq!(events[5], RawEvent::plain("-7"));
        assert_eq!(events[6], RawEvent::plain("31415926535897932380"));
    }

    #[test]
    fn keyed_starts() {
        let mut emitter = EventEmitter::new(Vec::new(), GeneratorOptions::default()).unwrap();
        emitter.start_object().unwrap();
        emitter.start_array_entry("list").unwrap();
        emitter.write("x").unwrap();
        emitter.end().unwrap();
        emitter.start_object_entry("map").unwrap();
        emitter.write_entry("on", true).unwrap();
        emitter.end().unwrap();
        emitter.start_array_entry("empty").unwrap();
        emitter.end_array().unwrap();
        emitter.end_object().unwrap();
        emitter.close().unwrap();
        let events = emitter.into_inner();
        assert_eq!(events[3], RawEvent::plain("list"));
        assert_eq!(events[4], RawEvent::SequenceStart { anchor: None });
        assert_eq!(events[8], RawEvent::MappingStart { anchor: None });
        assert_eq!(events[9], RawEvent::plain("on"));
        assert_eq!(events[10], RawEvent::plain("true"));
        assert_eq!(events.last(), Some(&RawEvent::StreamEnd));
    }

    #[test]
    fn explicit_markers() {
        let options = crate::generator_options! { explicit_start: true, explicit_end: true };
        let events = events_of(&json!("x"), options);
        assert_eq!(events[1], RawEvent::DocumentStart { explicit: true });
        assert_eq!(events[3], RawEvent::DocumentEnd { explicit: true });
    }

    #[test]
    fn zero_indent_is_rejected() {
        let options = crate::generator_options! { indent_step: 0 };
        let err = EventEmitter::new(Vec::new(), options).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}

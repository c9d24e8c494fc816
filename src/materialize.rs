//! Building and skipping whole values of the event stream.
//!
//! Values are assembled on an explicit stack of builders, so deeply nested documents do
//! not recurse. Merge keys (`<<`) are resolved while a mapping is built: merged entries
//! are collected aside and combined with the local entries when the mapping ends.

use serde_json::{Map, Value};

use crate::error::Error;
use crate::event::{Event, EventKind, Scalar};
use crate::parse_scalars::ScalarKind;
use crate::raw::RawEvents;
use crate::translator::EventTranslator;

const MERGE_KEY: &str = "<<";

enum Builder {
    Object {
        map: Map<String, Value>,
        key: Option<String>,
        /// Mappings named by merge keys, in document order.
        merged: Vec<Map<String, Value>>,
    },
    Array(Vec<Value>),
}

impl Builder {
    fn object() -> Self {
        Builder::Object {
            map: Map::new(),
            key: None,
            merged: Vec::new(),
        }
    }

    fn push(&mut self, value: Value, merge_keys: bool) -> Result<(), Error> {
        match self {
            Builder::Array(items) => items.push(value),
            Builder::Object { map, key, merged } => {
                let Some(key) = key.take() else {
                    return Err(Error::msg("mapping value without a key"));
                };
                if merge_keys && key == MERGE_KEY {
                    match value {
                        Value::Object(source) => merged.push(source),
                        Value::Array(sources) => {
                            for source in sources {
                                match source {
                                    Value::Object(source) => merged.push(source),
                                    _ => return Err(merge_error()),
                                }
                            }
                        }
                        _ => return Err(merge_error()),
                    }
                } else {
                    map.insert(key, value);
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Value {
        match self {
            Builder::Array(items) => Value::Array(items),
            Builder::Object { map, merged, .. } if merged.is_empty() => Value::Object(map),
            Builder::Object { map, merged, .. } => {
                log::debug!("merging {} mapping(s) under <<", merged.len());
                let mut out = Map::new();
                // Later sources override earlier ones, local entries override all.
                for source in merged {
                    out.extend(source);
                }
                out.extend(map);
                Value::Object(out)
            }
        }
    }
}

fn merge_error() -> Error {
    Error::msg("unable to expand merge key (<<): value must be a mapping or a sequence of mappings")
}

fn scalar_value(scalar: Scalar) -> Result<Value, Error> {
    Ok(match scalar.kind() {
        ScalarKind::Null => Value::Null,
        ScalarKind::True => Value::Bool(true),
        ScalarKind::False => Value::Bool(false),
        ScalarKind::Integer { .. } | ScalarKind::Float => match scalar.number() {
            Some(number) => Value::Number(number.clone()),
            None => return Err(Error::msg(format!("invalid number `{}`", scalar.text()))),
        },
        // JSON has no representation for the special floats.
        ScalarKind::PositiveInfinity
        | ScalarKind::NegativeInfinity
        | ScalarKind::NaN
        | ScalarKind::String => Value::String(scalar.into_text()),
    })
}

impl<S: RawEvents> EventTranslator<S> {
    /// Build the value that starts at the current event and advance past it.
    ///
    /// At a scalar this is the scalar itself. At a key it is the key text as a string.
    ///
    /// ```
    /// use saphyr_json::EventTranslator;
    /// use serde_json::json;
    ///
    /// let mut events = EventTranslator::from_yaml("a: [1, {b: null}]\n");
    /// while !matches!(events.next()?, Some(saphyr_json::Event::SequenceStart)) {}
    /// assert_eq!(events.materialize_value()?, json!([1, {"b": null}]));
    /// # Ok::<(), saphyr_json::Error>(())
    /// ```
    pub fn materialize_value(&mut self) -> Result<Value, Error> {
        match self.current() {
            Some(Event::MappingStart) => self.build(Builder::object()),
            Some(Event::SequenceStart) => self.build(Builder::Array(Vec::new())),
            Some(Event::Key(text)) => Ok(Value::String(text.clone())),
            Some(Event::Value(scalar)) => {
                scalar_value(scalar.clone()).map_err(|err| err.with_location(self.location()))
            }
            _ => Err(Error::usage("current event does not start a value")),
        }
    }

    /// Build the mapping that starts at the current event.
    pub fn materialize_object(&mut self) -> Result<Map<String, Value>, Error> {
        if !matches!(self.current(), Some(Event::MappingStart)) {
            return Err(Error::usage("current event does not start an object"));
        }
        match self.build(Builder::object())? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::msg("object expected")),
        }
    }

    /// Build the sequence that starts at the current event.
    pub fn materialize_array(&mut self) -> Result<Vec<Value>, Error> {
        if !matches!(self.current(), Some(Event::SequenceStart)) {
            return Err(Error::usage("current event does not start an array"));
        }
        match self.build(Builder::Array(Vec::new()))? {
            Value::Array(items) => Ok(items),
            _ => Err(Error::msg("array expected")),
        }
    }

    /// Skip to the end of the innermost object that starts at or contains the current
    /// event. Does nothing outside of any object.
    pub fn skip_object(&mut self) -> Result<(), Error> {
        self.skip_enclosing(EventKind::MappingStart)
    }

    /// Skip to the end of the innermost array that starts at or contains the current
    /// event. Does nothing outside of any array.
    pub fn skip_array(&mut self) -> Result<(), Error> {
        self.skip_enclosing(EventKind::SequenceStart)
    }

    fn skip_enclosing(&mut self, kind: EventKind) -> Result<(), Error> {
        let Some(depth) = self.open.iter().rposition(|open| *open == kind) else {
            return Ok(());
        };
        while self.open.len() > depth {
            if self.next()?.is_none() {
                return Err(Error::msg("unexpected end of stream").with_location(self.location()));
            }
        }
        Ok(())
    }

    fn build(&mut self, root: Builder) -> Result<Value, Error> {
        let merge_keys = self.options().dialect.merge_keys;
        let mut stack = vec![root];
        loop {
            let Some(event) = self.next()?.cloned() else {
                return Err(
                    Error::msg("unexpected end of stream inside a value")
                        .with_location(self.location()),
                );
            };
            let value = match event {
                Event::MappingStart => {
                    stack.push(Builder::object());
                    continue;
                }
                Event::SequenceStart => {
                    stack.push(Builder::Array(Vec::new()));
                    continue;
                }
                Event::Key(text) => {
                    match stack.last_mut() {
                        Some(Builder::Object { key, .. }) => *key = Some(text),
                        _ => {
                            return Err(Error::msg("key outside of a mapping")
                                .with_location(self.location()));
                        }
                    }
                    continue;
                }
                Event::Value(scalar) => {
                    scalar_value(scalar).map_err(|err| err.with_location(self.location()))?
                }
                Event::MappingEnd | Event::SequenceEnd => match stack.pop() {
                    Some(done) => done.finish(),
                    None => return Err(Error::msg("unbalanced end of structure")),
                },
                other => {
                    return Err(Error::msg(format!(
                        "unexpected {:?} inside a value",
                        other.kind()
                    ))
                    .with_location(self.location()));
                }
            };
            match stack.last_mut() {
                Some(parent) => parent
                    .push(value, merge_keys)
                    .map_err(|err| err.with_location(self.location()))?,
                None => return Ok(value),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, Event, EventTranslator};
    use serde_json::json;

    fn advance_to_first_start(events: &mut EventTranslator<crate::LiveEvents<'_>>) {
        while !matches!(
            events.next().unwrap(),
            Some(Event::MappingStart | Event::SequenceStart)
        ) {}
    }

    #[test]
    fn materializes_nested_values() {
        let mut events = EventTranslator::from_yaml("a: [1, 2.5, ~, true, 'x', .inf]\nb: {}\n");
        advance_to_first_start(&mut events);
        let map = events.materialize_object().unwrap();
        assert_eq!(
            serde_json::Value::Object(map),
            json!({"a": [1, 2.5, null, true, "x", ".inf"], "b": {}})
        );
        assert_eq!(events.next().unwrap(), Some(&Event::DocumentEnd));
    }

    #[test]
    fn shape_must_match() {
        let mut events = EventTranslator::from_yaml("[1]");
        advance_to_first_start(&mut events);
        assert_eq!(
            events.materialize_object().unwrap_err().kind(),
            ErrorKind::Usage
        );
        assert_eq!(events.materialize_array().unwrap(), vec![json!(1)]);
    }

    #[test]
    fn key_materializes_as_its_text() {
        let mut events = EventTranslator::from_yaml("10: x\n");
        while !matches!(events.next().unwrap(), Some(Event::Key(_))) {}
        assert_eq!(events.materialize_value().unwrap(), json!("10"));
        events.next().unwrap();
        assert_eq!(events.materialize_value().unwrap(), json!("x"));
    }

    #[test]
    fn merge_precedence() {
        let yaml = "base: &b {A: merged, C: merged}\nobj:\n  A: local\n  <<: *b\n  B: local\n";
        let mut events = EventTranslator::from_yaml(yaml);
        advance_to_first_start(&mut events);
        let value = events.materialize_value().unwrap();
        assert_eq!(value["obj"], json!({"A": "local", "B": "local", "C": "merged"}));
    }

    #[test]
    fn later_merge_sources_override_earlier() {
        let yaml = "a: &a {x: 1, y: 1}\nb: &b {y: 2}\nc: {<<: [*a, *b], z: 3}\n";
        let mut events = EventTranslator::from_yaml(yaml);
        advance_to_first_start(&mut events);
        let value = events.materialize_value().unwrap();
        assert_eq!(value["c"], json!({"x": 1, "y": 2, "z": 3}));
    }

    #[test]
    fn merge_of_scalar_fails() {
        let mut events = EventTranslator::from_yaml("a: {<<: 1}\n");
        advance_to_first_start(&mut events);
        let err = events.materialize_value().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("unable to expand merge key (<<)"));
    }

    #[test]
    fn merge_keys_can_be_disabled() {
        let mut dialect = crate::Dialect::default();
        dialect.merge_keys = false;
        let options = crate::parser_options! { dialect: dialect };
        let mut events = EventTranslator::from_yaml_with_options("{<<: 1}", options);
        advance_to_first_start(&mut events);
        assert_eq!(events.materialize_value().unwrap(), json!({"<<": 1}));
    }

    #[test]
    fn skip_from_inside_and_from_start() {
        let mut events = EventTranslator::from_yaml("a: {b: [1, 2], c: 3}\nd: 4\n");
        advance_to_first_start(&mut events);
        // Outer mapping start, then `a`, inner mapping start, `b`, sequence start, `1`.
        for _ in 0..5 {
            events.next().unwrap();
        }
        assert!(matches!(events.current(), Some(Event::Value(_))));
        events.skip_array().unwrap();
        assert_eq!(events.current(), Some(&Event::SequenceEnd));
        events.skip_object().unwrap();
        assert_eq!(events.current(), Some(&Event::MappingEnd));
        assert_eq!(events.next().unwrap(), Some(&Event::Key("d".to_owned())));
    }

    #[test]
    fn skip_without_enclosing_structure_is_a_no_op() {
        let mut events = EventTranslator::from_yaml("{a: 1}");
        events.next().unwrap();
        events.skip_array().unwrap();
        assert_eq!(events.current(), Some(&Event::StreamStart));
    }
}

//! Normalized event streams produced from YAML text.

use anyhow::Result;
use indoc::indoc;
use saphyr_json::{Event, EventKind, EventTranslator, ScalarKind, parser_options};

fn kinds(yaml: &str) -> Result<Vec<EventKind>> {
    let mut events = EventTranslator::from_yaml(yaml);
    let mut out = Vec::new();
    while let Some(event) = events.next()? {
        out.push(event.kind());
    }
    Ok(out)
}

/// Advance to the value of the first key and return its scalar kind.
fn first_value(yaml: &str) -> Result<(ScalarKind, EventTranslator<saphyr_json::LiveEvents<'_>>)> {
    let mut events = EventTranslator::from_yaml(yaml);
    while let Some(event) = events.next()? {
        if let Event::Value(scalar) = event {
            let kind = scalar.kind();
            return Ok((kind, events));
        }
    }
    anyhow::bail!("no value in {yaml:?}")
}

#[test]
fn integer_value() -> Result<()> {
    assert_eq!(
        kinds("key: 10")?,
        vec![
            EventKind::StreamStart,
            EventKind::DocumentStart,
            EventKind::MappingStart,
            EventKind::Key,
            EventKind::Value,
            EventKind::MappingEnd,
            EventKind::DocumentEnd,
            EventKind::StreamEnd,
        ]
    );
    let (kind, events) = first_value("key: 10")?;
    assert_eq!(kind, ScalarKind::Integer { radix: 10 });
    assert!(events.is_integral()?);
    assert_eq!(events.number()?.as_i64(), Some(10));
    Ok(())
}

#[test]
fn hex_value() -> Result<()> {
    let (kind, events) = first_value("key: 0x10")?;
    assert_eq!(kind, ScalarKind::Integer { radix: 16 });
    assert_eq!(events.number()?.as_u64(), Some(16));
    Ok(())
}

#[test]
fn special_floats() -> Result<()> {
    let (_, events) = first_value("key: .inf")?;
    assert!(events.is_positive_infinity()?);
    assert!(!events.is_nan()?);
    let (_, events) = first_value("key: -.INF")?;
    assert!(events.is_negative_infinity()?);
    let (_, events) = first_value("key: .NaN")?;
    assert!(events.is_nan()?);
    assert_eq!(events.as_str()?, ".NaN");
    Ok(())
}

#[test]
fn quoted_scalars_are_strings() -> Result<()> {
    let (kind, events) = first_value("key: '10'")?;
    assert_eq!(kind, ScalarKind::String);
    assert!(events.number().is_err());
    assert_eq!(events.as_str()?, "10");
    Ok(())
}

#[test]
fn keys_and_values_alternate() -> Result<()> {
    let yaml = indoc! {"
        a: 1
        b:
          c: [x, {d: e}]
          f: ~
        g: &anchor {h: i}
        j: *anchor
    "};
    let mut events = EventTranslator::from_yaml(yaml);
    // One flag per open mapping: true when a key was read and its value is pending.
    let mut expecting_value: Vec<Option<bool>> = Vec::new();
    while let Some(event) = events.next()? {
        let event = event.clone();
        let top = expecting_value.last_mut();
        match (&event, top) {
            (Event::Key(_), Some(Some(pending))) => {
                assert!(!*pending, "two keys in a row");
                *pending = true;
            }
            (Event::Key(_), _) => panic!("key outside a mapping"),
            (_, Some(Some(pending))) if !matches!(event, Event::MappingEnd) => {
                assert!(*pending, "value without a key: {event:?}");
                *pending = false;
            }
            _ => {}
        }
        match event {
            Event::MappingStart => expecting_value.push(Some(false)),
            Event::SequenceStart => expecting_value.push(None),
            Event::MappingEnd | Event::SequenceEnd => {
                expecting_value.pop();
            }
            _ => {}
        }
    }
    Ok(())
}

#[test]
fn redefined_anchor_nearest_wins() -> Result<()> {
    let yaml = indoc! {"
        first: &v value1
        second: &v value2
        third: *v
    "};
    let value = saphyr_json::from_str(yaml)?;
    assert_eq!(value["third"], "value2");
    Ok(())
}

#[test]
fn expansion_ceiling_stops_billion_laughs() {
    let _ = env_logger::builder().is_test(true).try_init();
    let yaml = indoc! {"
        a: &a [x, x, x, x, x, x, x, x, x, x]
        b: &b [*a, *a, *a, *a, *a, *a, *a, *a, *a, *a]
        c: &c [*b, *b, *b, *b, *b, *b, *b, *b, *b, *b]
        d: &d [*c, *c, *c, *c, *c, *c, *c, *c, *c, *c]
        e: [*d, *d, *d, *d, *d, *d, *d, *d, *d, *d]
    "};
    let options = parser_options! { max_alias_expansion_size: Some(5_000) };
    let mut events = EventTranslator::from_yaml_with_options(yaml, options);
    let mut values = 0usize;
    let err = loop {
        match events.next() {
            Ok(Some(Event::Value(_))) => values += 1,
            Ok(Some(_)) => {}
            Ok(None) => panic!("expansion was not bounded"),
            Err(err) => break err,
        }
    };
    assert!(err.to_string().contains("too many scalars"), "{err}");
    assert!(err.to_string().starts_with("alias *d "), "{err}");
    // `c` expands to 1000 values; the alias of `d` is refused before replay.
    assert!(values < 20_000, "{values}");
    assert_eq!(err.location().map(|l| l.line()), Some(5));
}

#[test]
fn small_aliases_within_ceiling_expand() -> Result<()> {
    let options = parser_options! { max_alias_expansion_size: Some(10) };
    let yaml = "a: &a [1, 2]\nb: *a\n";
    let value = saphyr_json::from_str_with_options(yaml, options)?;
    assert_eq!(value["b"], serde_json::json!([1, 2]));
    Ok(())
}

#[test]
fn alias_as_key_must_be_scalar() -> Result<()> {
    let value = saphyr_json::from_str("k: &k name\n*k : v\n")?;
    assert_eq!(value["name"], "v");

    let err = saphyr_json::from_str("k: &k [1]\n*k : v\n").unwrap_err();
    assert_eq!(err.kind(), saphyr_json::ErrorKind::Parse);
    Ok(())
}

#[test]
fn yaml_1_1_booleans() -> Result<()> {
    let yaml = "a: yes\nb: 0b101\nc: 017\n";
    assert_eq!(
        saphyr_json::from_str(yaml)?,
        serde_json::json!({"a": "yes", "b": "0b101", "c": 17})
    );
    let options = parser_options! { dialect: saphyr_json::Dialect::yaml_1_1() };
    assert_eq!(
        saphyr_json::from_str_with_options(yaml, options)?,
        serde_json::json!({"a": true, "b": 5, "c": 15})
    );
    Ok(())
}

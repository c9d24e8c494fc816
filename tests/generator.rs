//! YAML text produced from JSON values.

use anyhow::Result;
use indoc::indoc;
use saphyr_json::{generator_options, to_string, to_string_with_options};
use serde_json::json;

#[test]
fn nested_layout() -> Result<()> {
    let value = json!({
        "name": "service",
        "ports": [80, 443],
        "limits": {"cpu": 1.5, "memory": null},
        "routes": [{"path": "/", "tls": true}, {"path": "/api", "tls": false}],
        "empty": {},
        "none": []
    });
    assert_eq!(
        to_string(&value)?,
        indoc! {"
            name: service
            ports:
            - 80
            - 443
            limits:
              cpu: 1.5
              memory: null
            routes:
            - path: /
              tls: true
            - path: /api
              tls: false
            empty: {}
            none: []
        "}
    );
    Ok(())
}

#[test]
fn colon_space_is_quoted_preserving_quotes() -> Result<()> {
    let yaml = to_string(&json!({"k": "value with: colon"}))?;
    assert_eq!(yaml, "k: 'value with: colon'\n");
    Ok(())
}

#[test]
fn quote_characters_pick_the_other_delimiter() -> Result<()> {
    let yaml = to_string(&json!({"a": "say \"hi\"", "b": "it's"}))?;
    assert_eq!(yaml, "a: 'say \"hi\"'\nb: \"it's\"\n");
    Ok(())
}

#[test]
fn reserved_and_numeric_strings_are_quoted() -> Result<()> {
    let value = json!({"10": "null", "b": "1e3", "c": "~", "d": "", "e": ".inf"});
    assert_eq!(
        to_string(&value)?,
        "'10': 'null'\nb: '1e3'\nc: '~'\nd: ''\ne: '.inf'\n"
    );
    Ok(())
}

#[test]
fn minimized_quoting() -> Result<()> {
    let options = generator_options! { minimize_quotes: true };
    let value = json!({
        "#keywithhash": "value with:\tcolon",
        "#anotherwithhash": "value with:colon but the :is not followed by a space",
        "key with spaces": "ends with colon:",
        "key\twith\ttabs": "ends with hash (preceded by space) #",
        "hash# in the middle": "#hash at the start of the value",
        ".inf": "Key is infinite",
        "false": "Key is a boolean",
        "array[]": "Key has indicators, but not inside of a flow collection",
        "? question": "Key has leading indicator followed by space",
    });
    assert_eq!(
        to_string_with_options(&value, options)?,
        indoc! {r##"
            "#keywithhash": "value with:\tcolon"
            "#anotherwithhash": value with:colon but the :is not followed by a space
            key with spaces: "ends with colon:"
            "key\twith\ttabs": "ends with hash (preceded by space) #"
            hash# in the middle: "#hash at the start of the value"
            ".inf": Key is infinite
            "false": Key is a boolean
            array[]: Key has indicators, but not inside of a flow collection
            "? question": Key has leading indicator followed by space
        "##}
    );
    Ok(())
}

#[test]
fn numeric_strings_can_stay_plain() -> Result<()> {
    let options = generator_options! { minimize_quotes: true, quote_numeric_strings: false };
    let value = json!({"a": "-.INF", "b": ".NaN", "c": "3.14", ".inf": "x"});
    assert_eq!(
        to_string_with_options(&value, options)?,
        "a: -.INF\nb: .NaN\nc: 3.14\n\".inf\": x\n"
    );
    Ok(())
}

#[test]
fn multi_line_strings_are_literal() -> Result<()> {
    let value = json!({"text": "first\nsecond\n", "list": ["a\nb"]});
    assert_eq!(
        to_string(&value)?,
        "text: |\n  first\n  second\nlist:\n- |-\n  a\n  b\n"
    );

    let options = generator_options! { literal_block_style: false };
    assert_eq!(
        to_string_with_options(&value, options)?,
        "text: \"first\\nsecond\\n\"\nlist:\n- \"a\\nb\"\n"
    );
    Ok(())
}

#[test]
fn big_decimal_plain_rendering() -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(r#"{"pi-e19": 3.1415926535897932380E19}"#)?;
    assert_eq!(to_string(&value)?, "pi-e19: 3.1415926535897932380e+19\n");
    let options = generator_options! { plain_big_decimal: true };
    assert_eq!(
        to_string_with_options(&value, options)?,
        "pi-e19: 31415926535897932380\n"
    );
    Ok(())
}

#[test]
fn explicit_document_markers() -> Result<()> {
    let options = generator_options! { explicit_start: true, explicit_end: true };
    assert_eq!(
        to_string_with_options(&json!({"a": 1}), options)?,
        "---\na: 1\n...\n"
    );
    Ok(())
}

#[test]
fn indent_step_applies_to_nested_mappings() -> Result<()> {
    let options = generator_options! { indent_step: 4 };
    assert_eq!(
        to_string_with_options(&json!({"a": {"b": {"c": [1]}}}), options)?,
        "a:\n    b:\n        c:\n        - 1\n"
    );
    Ok(())
}

#[test]
fn scalar_root() -> Result<()> {
    assert_eq!(to_string(&json!("plain"))?, "plain\n");
    assert_eq!(to_string(&json!(null))?, "null\n");
    assert_eq!(to_string(&json!("multi\nline"))?, "|-\n  multi\n  line\n");
    Ok(())
}

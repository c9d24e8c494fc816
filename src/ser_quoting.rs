//! Scalar style selection for the generator.
//!
//! Two concerns decide the style of a string:
//! - whether its text would be read back as another type (null, boolean, number),
//! - whether YAML lets it be written as a plain scalar at all.
//!
//! With `minimize_quotes` everything that can be plain is plain and the rest is double
//! quoted. Otherwise the quote character is chosen to avoid escaping, and strings holding
//! flow indicators are quoted too so the output also reads well inside flow collections.

use crate::generator_options::GeneratorOptions;
use crate::parse_scalars::looks_numeric;
use crate::raw::ScalarStyle;

/// Choose how to write string `text` as a key (`is_key`) or as a value.
///
/// ```
/// use saphyr_json::{select_style, GeneratorOptions, ScalarStyle};
///
/// let options = GeneratorOptions::default();
/// assert_eq!(select_style("value with: colon", false, &options), ScalarStyle::SingleQuoted);
/// assert_eq!(select_style("plain words", false, &options), ScalarStyle::Plain);
/// assert_eq!(select_style("two\nlines", false, &options), ScalarStyle::Literal);
/// assert_eq!(select_style("10", true, &options), ScalarStyle::SingleQuoted);
/// ```
pub fn select_style(text: &str, is_key: bool, options: &GeneratorOptions) -> ScalarStyle {
    let literal_allowed = !is_key && options.literal_block_style && literal_safe(text);

    if text.contains('\n') {
        return if literal_allowed {
            ScalarStyle::Literal
        } else {
            ScalarStyle::DoubleQuoted
        };
    }

    if options.minimize_quotes {
        return if changes_type(text, is_key, options) || !plain_allowed(text) {
            ScalarStyle::DoubleQuoted
        } else {
            ScalarStyle::Plain
        };
    }

    let has_double = text.contains('"');
    let has_single = text.contains('\'');
    if has_double && has_single {
        return if literal_allowed {
            ScalarStyle::Literal
        } else {
            ScalarStyle::DoubleQuoted
        };
    }
    if needs_escapes(text) || has_single {
        return ScalarStyle::DoubleQuoted;
    }
    if has_double
        || changes_type(text, is_key, options)
        || !plain_allowed(text)
        || text.contains(FLOW_INDICATORS)
    {
        return ScalarStyle::SingleQuoted;
    }
    ScalarStyle::Plain
}

const FLOW_INDICATORS: [char; 5] = ['[', ']', '{', '}', ','];

/// Plain text would be read back as null, a boolean or a number.
fn changes_type(text: &str, is_key: bool, options: &GeneratorOptions) -> bool {
    options.dialect.is_reserved(text)
        || ((is_key || options.quote_numeric_strings) && looks_numeric(text, &options.dialect))
}

#[inline]
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Characters only a double-quoted scalar can carry.
#[inline]
fn is_unprintable(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{FEFF}')
}

fn needs_escapes(text: &str) -> bool {
    text.chars().any(is_unprintable)
}

/// True if `text` survives as a plain scalar in block context.
fn plain_allowed(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let second = chars.next();

    match first {
        '-' | '?' | ':' => {
            if second.is_none_or(is_blank) {
                return false;
            }
        }
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
        | '@' | '`' => return false,
        _ => {}
    }
    if text.starts_with("---") || text.starts_with("...") {
        return false;
    }
    if text.starts_with(is_blank) || text.ends_with(is_blank) || text.ends_with(':') {
        return false;
    }
    if needs_escapes(text) {
        return false;
    }
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b':' if bytes.get(i + 1).is_some_and(|n| *n == b' ') => return false,
            b'#' if i > 0 && bytes[i - 1] == b' ' => return false,
            _ => {}
        }
    }
    true
}

/// True if `text` can be written as a literal block scalar and read back unchanged.
pub(crate) fn literal_safe(text: &str) -> bool {
    if text.chars().any(|c| c != '\n' && c != '\t' && is_unprintable(c)) {
        return false;
    }
    let mut lines = text.split('\n').filter(|line| !line.is_empty()).peekable();
    let Some(first) = lines.peek() else {
        // Nothing but line breaks.
        return false;
    };
    if first.starts_with(is_blank) {
        return false;
    }
    lines.all(|line| !line.chars().all(is_blank))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimized() -> GeneratorOptions {
        crate::generator_options! { minimize_quotes: true }
    }

    #[test]
    fn minimize_quotes_only_when_required() {
        let options = minimized();
        let cases = [
            ("#keywithhash", true, ScalarStyle::DoubleQuoted),
            ("value with:\tcolon", false, ScalarStyle::DoubleQuoted),
            (
                "value with:colon but the :is not followed by a space",
                false,
                ScalarStyle::Plain,
            ),
            ("ends with colon:", false, ScalarStyle::DoubleQuoted),
            ("ends with hash (preceded by space) #", false, ScalarStyle::DoubleQuoted),
            ("hash# in the middle", true, ScalarStyle::Plain),
            ("#hash at the start of the value", false, ScalarStyle::DoubleQuoted),
            (".inf", true, ScalarStyle::DoubleQuoted),
            (".NAN", true, ScalarStyle::DoubleQuoted),
            ("false", true, ScalarStyle::DoubleQuoted),
            ("array[]", true, ScalarStyle::Plain),
            ("Key has indicators, but not inside of a flow collection", false, ScalarStyle::Plain),
            ("? question", true, ScalarStyle::DoubleQuoted),
            ("\ttab first", true, ScalarStyle::DoubleQuoted),
            ("value with: colon", false, ScalarStyle::DoubleQuoted),
            ("-", false, ScalarStyle::DoubleQuoted),
            ("-1x", false, ScalarStyle::Plain),
            ("--- x", false, ScalarStyle::DoubleQuoted),
        ];
        for (text, is_key, style) in cases {
            assert_eq!(select_style(text, is_key, &options), style, "{text:?}");
        }
    }

    #[test]
    fn numeric_strings_follow_configuration() {
        let options = crate::generator_options! {
            minimize_quotes: true,
            quote_numeric_strings: false,
        };
        assert_eq!(select_style("-.INF", false, &options), ScalarStyle::Plain);
        assert_eq!(select_style(".NaN", false, &options), ScalarStyle::Plain);
        assert_eq!(select_style("3.14", false, &options), ScalarStyle::Plain);
        assert_eq!(select_style("3.14", true, &options), ScalarStyle::DoubleQuoted);
        assert_eq!(select_style("true", false, &options), ScalarStyle::DoubleQuoted);
    }

    #[test]
    fn quote_preserving_choices() {
        let options = GeneratorOptions::default();
        let cases = [
            ("plain", ScalarStyle::Plain),
            ("say \"hi\"", ScalarStyle::SingleQuoted),
            ("it's", ScalarStyle::DoubleQuoted),
            ("both ' and \"", ScalarStyle::Literal),
            ("a, b", ScalarStyle::SingleQuoted),
            ("x: y", ScalarStyle::SingleQuoted),
            ("0x1F", ScalarStyle::SingleQuoted),
            ("", ScalarStyle::SingleQuoted),
            ("Null", ScalarStyle::SingleQuoted),
            ("tab\there", ScalarStyle::DoubleQuoted),
            ("line\nbreak", ScalarStyle::Literal),
            (" leading\nspace", ScalarStyle::DoubleQuoted),
            ("\n\n", ScalarStyle::DoubleQuoted),
        ];
        for (text, style) in cases {
            assert_eq!(select_style(text, false, &options), style, "{text:?}");
        }
    }

    #[test]
    fn keys_are_never_literal() {
        let options = GeneratorOptions::default();
        assert_eq!(select_style("a\nb", true, &options), ScalarStyle::DoubleQuoted);
        assert_eq!(select_style("' and \"", true, &options), ScalarStyle::DoubleQuoted);
    }

    #[test]
    fn literal_style_can_be_disabled() {
        let options = crate::generator_options! { literal_block_style: false };
        assert_eq!(select_style("a\nb", false, &options), ScalarStyle::DoubleQuoted);
    }

    #[test]
    fn yaml_1_1_words_are_quoted_for_1_1() {
        let options = crate::generator_options! { dialect: crate::Dialect::yaml_1_1() };
        assert_eq!(select_style("yes", false, &options), ScalarStyle::SingleQuoted);
        assert_eq!(
            select_style("yes", false, &GeneratorOptions::default()),
            ScalarStyle::Plain
        );
    }

    #[test]
    fn literal_safety() {
        assert!(literal_safe("a\n  indented\n"));
        assert!(literal_safe("tail\n\n\n"));
        assert!(!literal_safe("  first line indented\nx"));
        assert!(!literal_safe("a\n   \nb"));
        assert!(!literal_safe("cr\r\nlf"));
    }
}

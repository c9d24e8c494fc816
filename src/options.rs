use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::dialect::Dialect;

/// Default nesting limit, well above anything a hand-written document needs.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Parser configuration options.
///
/// Use this to bound alias expansion and nesting, choose the [`Dialect`], and set an
/// optional YAML [`Budget`] checked on raw parser events.
///
/// Build it with the [`parser_options!`](crate::parser_options!) macro so that call sites
/// keep compiling when fields are added.
///
/// ```rust
/// use saphyr_json::{from_str_with_options, parser_options, Dialect};
///
/// let yaml = "
/// base: &base {a: 1, b: 2}
/// copy: *base
/// ";
///
/// let options = parser_options! {
///     max_alias_expansion_size: Some(2),
///     dialect: Dialect::yaml_1_1(),
/// };
///
/// let err = from_str_with_options(yaml, options).unwrap_err();
/// assert!(err.to_string().contains("too many scalars"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParserOptions {
    /// An alias may not expand to this many keys and values or more. `None` (the default)
    /// means unbounded.
    pub max_alias_expansion_size: Option<usize>,
    /// Maximum nesting of mappings and sequences. Default: [`DEFAULT_MAX_DEPTH`].
    pub max_depth: usize,
    /// Typing rules and accepted features.
    pub dialect: Dialect,
    /// Optional YAML budget to enforce while parsing (counts raw parser events).
    pub budget: Option<Budget>,
    /// Maximal number of decoded bytes accepted from a reader. `None` means unlimited.
    /// Ignored for string input.
    pub max_input_bytes: Option<usize>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_alias_expansion_size: None,
            max_depth: DEFAULT_MAX_DEPTH,
            dialect: Dialect::default(),
            budget: Some(Budget::default()),
            max_input_bytes: None,
        }
    }
}

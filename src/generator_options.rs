//! Generator options for YAML emission.
//!
//! Controls scalar quoting and block styles, number rendering, document markers and
//! indentation.
//!
//! Example: minimal quoting with 4-space indentation.
//!
//! ```rust
//! use serde_json::json;
//!
//! let opts = saphyr_json::generator_options! {
//!     indent_step: 4,
//!     minimize_quotes: true,
//! };
//! let yaml = saphyr_json::to_string_with_options(&json!({"a": {"b": "x y"}}), opts).unwrap();
//! assert_eq!(yaml, "a:\n    b: x y\n");
//! ```

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::Error;

/// Generator options for YAML emission.
///
/// Construct `GeneratorOptions` using the [`generator_options!`](crate::generator_options!)
/// macro to ensure compatibility with future updates.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GeneratorOptions {
    /// Use plain scalars wherever YAML allows, double quotes otherwise. When off (the
    /// default), strings that need quoting keep the quote character that requires the
    /// fewest escapes.
    pub minimize_quotes: bool,
    /// Quote string values that would otherwise read back as numbers. On by default.
    /// Keys that look numeric are always quoted.
    pub quote_numeric_strings: bool,
    /// Write multi-line string values as literal block scalars (`|`). On by default.
    pub literal_block_style: bool,
    /// Write numbers in exponent notation as plain decimals (`1.5e3` becomes `1500`).
    /// Off by default.
    pub plain_big_decimal: bool,
    /// Start the document with `---`. Off by default.
    pub explicit_start: bool,
    /// End the document with `...`. Off by default.
    pub explicit_end: bool,
    /// Number of spaces to indent per nesting level of block mappings (2 by default).
    /// 0 is rejected when the generator is created.
    pub indent_step: usize,
    /// Typing rules output must survive: strings that the dialect would read as another
    /// type get quoted.
    pub dialect: Dialect,
}

impl GeneratorOptions {
    pub(crate) fn consistent(&self) -> Result<(), Error> {
        if self.indent_step == 0 {
            return Err(Error::usage("invalid indent step: must be positive"));
        }
        Ok(())
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            minimize_quotes: false,
            quote_numeric_strings: true,
            literal_block_style: true,
            plain_big_decimal: false,
            explicit_start: false,
            explicit_end: false,
            indent_step: 2,
            dialect: Dialect::default(),
        }
    }
}

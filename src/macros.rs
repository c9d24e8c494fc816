//! Public macros for constructing option structs without relying on struct literal syntax.
//!
//! Option structs gain fields over time; building them from `Default` keeps call sites
//! source-compatible.

/// Construct [`crate::ParserOptions`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// let options = saphyr_json::parser_options! {
///     max_alias_expansion_size: Some(10_000),
///     max_depth: 64,
/// };
/// assert_eq!(options.max_depth, 64);
/// ```
#[macro_export]
macro_rules! parser_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::ParserOptions::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::GeneratorOptions`] from `Default` and a list of field assignments.
///
/// Example:
///
/// ```rust
/// let opts = saphyr_json::generator_options! {
///     explicit_start: true,
///     minimize_quotes: true,
/// };
/// assert!(opts.quote_numeric_strings);
/// ```
#[macro_export]
macro_rules! generator_options {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut opt = $crate::GeneratorOptions::default();
        $(
            opt.$field = $value;
        )*
        opt
    }};
}

/// Construct [`crate::Budget`] from `Default` and a list of field assignments.
///
/// ```rust
/// let budget = saphyr_json::budget! { max_documents: 1 };
/// assert_eq!(budget.max_documents, 1);
/// ```
#[macro_export]
macro_rules! budget {
    ( $( $field:ident : $value:expr ),* $(,)? ) => {{
        let mut b = $crate::Budget::default();
        $(
            b.$field = $value;
        )*
        b
    }};
}

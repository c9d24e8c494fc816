//! YAML dialect: which spelling resolves to which type, and which document features
//! are accepted.

use serde::{Deserialize, Serialize};

/// YAML version whose implicit typing rules are applied to plain scalars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YamlVersion {
    /// YAML 1.1 "type repository" rules: `yes`/`no`/`on`/`off` booleans, `0b` binary and
    /// legacy `0`-prefixed octal integers.
    V1_1,
    /// YAML 1.2 Core Schema.
    #[default]
    V1_2,
}

/// Parameterizes the translator and the style selector so that both directions agree
/// on how text is typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dialect {
    pub version: YamlVersion,
    /// Whether `<<` keys merge mappings when materializing objects.
    pub merge_keys: bool,
    /// Whether aliases are accepted at all. When false any alias is a parse error.
    pub aliases: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::yaml_1_2()
    }
}

pub(crate) const NULLS: &[&str] = &["null", "Null", "NULL", "~"];
pub(crate) const TRUES: &[&str] = &["true", "True", "TRUE"];
pub(crate) const FALSES: &[&str] = &["false", "False", "FALSE"];
pub(crate) const POSITIVE_INFINITIES: &[&str] =
    &[".inf", ".Inf", ".INF", "+.inf", "+.Inf", "+.INF"];
pub(crate) const NEGATIVE_INFINITIES: &[&str] = &["-.inf", "-.Inf", "-.INF"];
pub(crate) const NANS: &[&str] = &[".nan", ".NaN", ".NAN"];

const TRUES_1_1: &[&str] = &["y", "Y", "yes", "Yes", "YES", "on", "On", "ON"];
const FALSES_1_1: &[&str] = &["n", "N", "no", "No", "NO", "off", "Off", "OFF"];

impl Dialect {
    /// YAML 1.2 Core Schema with merge keys and aliases.
    pub const fn yaml_1_2() -> Self {
        Self {
            version: YamlVersion::V1_2,
            merge_keys: true,
            aliases: true,
        }
    }

    /// YAML 1.1 typing with merge keys and aliases.
    pub const fn yaml_1_1() -> Self {
        Self {
            version: YamlVersion::V1_1,
            merge_keys: true,
            aliases: true,
        }
    }

    #[inline]
    pub(crate) fn is_null(&self, text: &str) -> bool {
        NULLS.contains(&text)
    }

    #[inline]
    pub(crate) fn is_true(&self, text: &str) -> bool {
        TRUES.contains(&text) || (self.version == YamlVersion::V1_1 && TRUES_1_1.contains(&text))
    }

    #[inline]
    pub(crate) fn is_false(&self, text: &str) -> bool {
        FALSES.contains(&text)
            || (self.version == YamlVersion::V1_1 && FALSES_1_1.contains(&text))
    }

    /// Text that a plain scalar would turn into null or a boolean. Such strings must be
    /// quoted on output. The empty string is reserved too.
    pub(crate) fn is_reserved(&self, text: &str) -> bool {
        text.is_empty() || self.is_null(text) || self.is_true(text) || self.is_false(text)
    }
}

//! Implicit typing of plain scalars.
//!
//! Classification dispatches on the first character and then validates the whole text
//! against the grammar of the candidate type. Text that does not match anything is a
//! string; classification never fails.

use crate::dialect::{Dialect, NANS, NEGATIVE_INFINITIES, POSITIVE_INFINITIES, YamlVersion};

/// Resolved type of a scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Null,
    True,
    False,
    /// Integer written in the given radix (2, 8, 10 or 16).
    Integer { radix: u32 },
    Float,
    PositiveInfinity,
    NegativeInfinity,
    NaN,
    String,
}

impl ScalarKind {
    /// Integer or finite float, i.e. has a JSON number representation.
    #[inline]
    pub fn is_number(self) -> bool {
        matches!(self, ScalarKind::Integer { .. } | ScalarKind::Float)
    }

    /// Number including the special floats.
    #[inline]
    pub fn is_numeric(self) -> bool {
        self.is_number()
            || matches!(
                self,
                ScalarKind::PositiveInfinity | ScalarKind::NegativeInfinity | ScalarKind::NaN
            )
    }
}

/// Resolve the type of plain scalar `text`.
///
/// The empty plain scalar is null.
///
/// ```
/// use saphyr_json::{classify, Dialect, ScalarKind};
///
/// let dialect = Dialect::default();
/// assert_eq!(classify("0x1F", &dialect), ScalarKind::Integer { radix: 16 });
/// assert_eq!(classify("-.INF", &dialect), ScalarKind::NegativeInfinity);
/// assert_eq!(classify("+Not a Number", &dialect), ScalarKind::String);
/// ```
pub fn classify(text: &str, dialect: &Dialect) -> ScalarKind {
    let Some(first) = text.as_bytes().first() else {
        return ScalarKind::Null;
    };
    match first {
        b'n' | b'N' | b'~' => {
            if dialect.is_null(text) {
                ScalarKind::Null
            } else if dialect.is_false(text) {
                ScalarKind::False
            } else {
                ScalarKind::String
            }
        }
        b't' | b'T' | b'y' | b'Y' => constant_or_string(dialect.is_true(text), ScalarKind::True),
        b'f' | b'F' => constant_or_string(dialect.is_false(text), ScalarKind::False),
        b'o' | b'O' => {
            if dialect.is_true(text) {
                ScalarKind::True
            } else if dialect.is_false(text) {
                ScalarKind::False
            } else {
                ScalarKind::String
            }
        }
        b'0' => zero_prefixed(text, dialect),
        b'1'..=b'9' => number_or_string(text),
        b'.' => {
            if POSITIVE_INFINITIES.contains(&text) {
                ScalarKind::PositiveInfinity
            } else if NANS.contains(&text) {
                ScalarKind::NaN
            } else {
                number_or_string(text)
            }
        }
        b'+' => {
            if POSITIVE_INFINITIES.contains(&text) {
                ScalarKind::PositiveInfinity
            } else {
                number_or_string(text)
            }
        }
        b'-' => {
            if NEGATIVE_INFINITIES.contains(&text) {
                ScalarKind::NegativeInfinity
            } else {
                number_or_string(text)
            }
        }
        _ => ScalarKind::String,
    }
}

#[inline]
fn constant_or_string(matches: bool, kind: ScalarKind) -> ScalarKind {
    if matches { kind } else { ScalarKind::String }
}

fn zero_prefixed(text: &str, dialect: &Dialect) -> ScalarKind {
    if let Some(digits) = text.strip_prefix("0o") {
        if all_digits(digits, 8) {
            return ScalarKind::Integer { radix: 8 };
        }
    } else if let Some(digits) = text.strip_prefix("0x") {
        if all_digits(digits, 16) {
            return ScalarKind::Integer { radix: 16 };
        }
    } else if dialect.version == YamlVersion::V1_1 {
        if let Some(digits) = text.strip_prefix("0b") {
            if all_digits(digits, 2) {
                return ScalarKind::Integer { radix: 2 };
            }
        } else if text.len() > 1 && all_digits(&text[1..], 8) {
            return ScalarKind::Integer { radix: 8 };
        }
    }
    number_or_string(text)
}

fn number_or_string(text: &str) -> ScalarKind {
    if is_integer(text) {
        ScalarKind::Integer { radix: 10 }
    } else if is_float(text) {
        ScalarKind::Float
    } else {
        ScalarKind::String
    }
}

/// At least one digit, every character a digit of `radix`.
fn all_digits(digits: &str, radix: u32) -> bool {
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}

fn strip_sign(text: &str) -> (&str, &str) {
    match text.as_bytes().first() {
        Some(b'+' | b'-') => text.split_at(1),
        _ => ("", text),
    }
}

/// Optional sign followed by decimal digits.
fn is_integer(text: &str) -> bool {
    let (_, digits) = strip_sign(text);
    all_digits(digits, 10)
}

/// Decimal float: optional sign, digits with at most one `.` (at least one digit in total),
/// then optionally `e`/`E`, an optional sign and at least one digit.
fn is_float(text: &str) -> bool {
    let (_, unsigned) = strip_sign(text);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(pos) => (&unsigned[..pos], Some(&unsigned[pos + 1..])),
        None => (unsigned, None),
    };

    let mut dots = 0;
    let mut digits = 0;
    for b in mantissa.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }

    match exponent {
        Some(exponent) => {
            let (_, exp_digits) = strip_sign(exponent);
            all_digits(exp_digits, 10)
        }
        None => true,
    }
}

/// True if a plain scalar with this text would be read as a number (special floats included).
pub(crate) fn looks_numeric(text: &str, dialect: &Dialect) -> bool {
    classify(text, dialect).is_numeric()
}

/// Rewrite YAML number text of the given kind into JSON number text.
///
/// Leading `+` and redundant leading zeros are dropped, bare `.5`/`1.` get their missing
/// zero, and non-decimal integers are converted to decimal of any size.
pub(crate) fn normalize_number(text: &str, kind: ScalarKind) -> String {
    match kind {
        ScalarKind::Integer { radix: 10 } => {
            let (sign, digits) = strip_sign(text);
            let mut out = json_sign(sign).to_owned();
            out.push_str(strip_leading_zeros(digits));
            out
        }
        ScalarKind::Integer { radix } => {
            let digits = match radix {
                16 => text.strip_prefix("0x"),
                2 => text.strip_prefix("0b"),
                _ => text.strip_prefix("0o").or_else(|| text.strip_prefix('0')),
            }
            .unwrap_or(text);
            radix_to_decimal(digits, radix)
        }
        ScalarKind::Float => {
            let (sign, unsigned) = strip_sign(text);
            let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
                Some(pos) => unsigned.split_at(pos),
                None => (unsigned, ""),
            };
            let mut out = json_sign(sign).to_owned();
            match mantissa.split_once('.') {
                Some((int, frac)) => {
                    out.push_str(strip_leading_zeros(int));
                    out.push('.');
                    out.push_str(if frac.is_empty() { "0" } else { frac });
                }
                None => out.push_str(strip_leading_zeros(mantissa)),
            }
            out.push_str(exponent);
            out
        }
        _ => text.to_owned(),
    }
}

#[inline]
fn json_sign(sign: &str) -> &str {
    if sign == "-" { "-" } else { "" }
}

fn strip_leading_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}

fn parse_digits_u128(digits: &str, radix: u32) -> Option<u128> {
    let mut val: u128 = 0;
    for c in digits.chars() {
        let d = c.to_digit(radix)?;
        val = val.checked_mul(radix as u128)?;
        val = val.checked_add(d as u128)?;
    }
    Some(val)
}

/// Convert digits of `radix` into decimal text, exact for any length.
fn radix_to_decimal(digits: &str, radix: u32) -> String {
    if let Some(val) = parse_digits_u128(digits, radix) {
        return val.to_string();
    }

    const LIMB: u64 = 1_000_000_000;
    // Little-endian base 10^9 limbs.
    let mut limbs: Vec<u32> = vec![0];
    for d in digits.chars().filter_map(|c| c.to_digit(radix)) {
        let mut carry = d as u64;
        for limb in limbs.iter_mut() {
            let v = *limb as u64 * radix as u64 + carry;
            *limb = (v % LIMB) as u32;
            carry = v / LIMB;
        }
        while carry > 0 {
            limbs.push((carry % LIMB) as u32);
            carry /= LIMB;
        }
    }

    let mut out = String::with_capacity(limbs.len() * 9);
    let mut iter = limbs.iter().rev();
    if let Some(top) = iter.next() {
        out.push_str(&top.to_string());
    }
    for limb in iter {
        out.push_str(&format!("{limb:09}"));
    }
    out
}

/// Exponents beyond this are left in scientific form rather than expanded.
const MAX_PLAIN_EXPONENT: i64 = 4096;

/// Render JSON number text without an exponent (`1.5e3` becomes `1500`).
///
/// Returns `None` when the text has no exponent or the exponent is too large to expand.
pub(crate) fn plain_decimal(text: &str) -> Option<String> {
    let pos = text.find(['e', 'E'])?;
    let (mantissa, exponent) = (&text[..pos], &text[pos + 1..]);
    let exponent: i64 = exponent.strip_prefix('+').unwrap_or(exponent).parse().ok()?;
    if exponent.abs() > MAX_PLAIN_EXPONENT {
        return None;
    }

    let (sign, unsigned) = strip_sign(mantissa);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits: String = int.chars().chain(frac.chars()).collect();
    let point = int.len() as i64 + exponent;

    let mut body = if point <= 0 {
        let mut s = String::from("0.");
        s.extend(std::iter::repeat_n('0', (-point) as usize));
        s.push_str(&digits);
        s
    } else if point as usize >= digits.len() {
        let mut s = digits.clone();
        s.extend(std::iter::repeat_n('0', point as usize - digits.len()));
        s
    } else {
        let (head, tail) = digits.split_at(point as usize);
        format!("{head}.{tail}")
    };

    let int_len = body.find('.').unwrap_or(body.len());
    let zeros = body[..int_len].len() - strip_leading_zeros(&body[..int_len]).len();
    body.drain(..zeros);

    let mut out = json_sign(sign).to_owned();
    out.push_str(&body);
    Some(out)
}

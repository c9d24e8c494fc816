//! Float rendering for emitted numbers. zmij may render `4e-6`, which YAML 1.1 readers
//! do not take for a float, so a `.0` is added where the text has no decimal point.

use num_traits::float::FloatCore;
use zmij::Float;

/// Append the YAML text of `f`: `.nan`, `.inf`, `-.inf` or the shortest round-trip form.
pub(crate) fn push_float_string<F: Float + FloatCore>(target: &mut String, f: F) {
    if f.is_nan() {
        target.push_str(".nan");
    } else if f.is_infinite() {
        if f.is_sign_positive() {
            target.push_str(".inf");
        } else {
            target.push_str("-.inf");
        }
    } else {
        let mut buf = zmij::Buffer::new();
        let s = buf.format_finite(f);
        if s.contains('.') {
            target.push_str(s);
        } else if let Some(exp_pos) = s.find(['e', 'E']) {
            target.push_str(&s[..exp_pos]);
            target.push_str(".0");
            target.push_str(&s[exp_pos..]);
        } else {
            target.push_str(s);
            target.push_str(".0");
        }
    }
}

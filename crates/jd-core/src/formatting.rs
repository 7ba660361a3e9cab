//! Number formatting helpers.
//!
//! Rust's formatter has no `%g` equivalent, so fitted parameters are
//! rendered with [`format_significant`], which follows the same rules:
//! fixed notation for moderate exponents, scientific otherwise, trailing
//! zeros removed.

use crate::Real;

/// Format `value` with `digits` significant digits, `%g` style.
///
/// ```
/// use jd_core::format_significant;
/// assert_eq!(format_significant(0.05, 6), "0.05");
/// assert_eq!(format_significant(123456789.0, 6), "1.23457e+08");
/// ```
pub fn format_significant(value: Real, digits: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let digits = digits.max(1);

    // The exponent is taken after rounding so that e.g. 999999.7 → 1e+06.
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_trailing_zeros(mantissa), exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_trailing_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_trailing_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

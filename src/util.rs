// Number coercion and formatting helpers.
//
// Everything that touches "dirty" API numbers lives here so the rest of the
// crate can assume finite `f64` values.
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Parse a string-like value into `f64`, forgiving the formatting the
/// reporting API and spreadsheet exports tend to produce.
///
/// - Trims whitespace.
/// - Strips thousands separators like `","`.
/// - Rejects anything that does not parse to a finite number.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce an arbitrary JSON value to a number. Returns `None` when the value
/// is not numeric; callers decide whether that counts as a coercion.
pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        Value::String(s) => parse_f64_safe(Some(s)),
        _ => None,
    }
}

/// Replace NaN and infinities with zero.
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// A number read leniently from JSON. Remembers whether the raw value had to
/// be coerced to 0 so loaders can report it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lenient {
    pub value: f64,
    pub coerced: bool,
}

impl Lenient {
    pub fn from_value(raw: &Value) -> Self {
        match value_to_f64(raw) {
            Some(value) => Lenient {
                value,
                coerced: false,
            },
            // `null` is how the API spells "no rows matched"; not worth flagging.
            None => Lenient {
                value: 0.0,
                coerced: !raw.is_null(),
            },
        }
    }
}

/// Insert the `en` locale separator every three digits of `digits`.
fn group_thousands(digits: &str) -> String {
    let sep = Locale::en.separator();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}

/// Add one unit in the last place to an ASCII digit string.
fn increment_digits(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// Format a floating-point value with a fixed number of decimals and `,`
/// thousands separators (e.g. `1,234,567.89`).
///
/// Rounding works on the shortest decimal that round-trips to `n` (what a
/// person reads for `1.005` is `1.005`), halves going away from zero. Output
/// never depends on the host locale, non-finite values print as zero and a
/// value that rounds to zero never carries a minus sign.
pub fn format_number(n: f64, decimals: usize) -> String {
    let n = finite_or_zero(n);
    // `Display` for f64 never switches to exponent notation.
    let plain = format!("{}", n.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().collect();
    let frac = frac_part.as_bytes();
    digits.extend((0..decimals).map(|i| frac.get(i).copied().unwrap_or(b'0')));
    if frac.get(decimals).is_some_and(|d| *d >= b'5') {
        increment_digits(&mut digits);
    }

    let split = digits.len() - decimals;
    let int_digits = String::from_utf8_lossy(&digits[..split]);
    let mut res = group_thousands(&int_digits);
    if decimals > 0 {
        res.push('.');
        res.push_str(&String::from_utf8_lossy(&digits[split..]));
    }
    let is_zero = digits.iter().all(|d| *d == b'0');
    if n.is_sign_negative() && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

/// `format_number` with a trailing percent sign.
pub fn format_percent(pct: f64, decimals: usize) -> String {
    format!("{}%", format_number(pct, decimals))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g. `32 regions loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_with_grouping_and_fixed_decimals() {
        assert_eq!(format_number(1234.5, 2), "1,234.50");
        assert_eq!(format_number(7.0, 0), "7");
        assert_eq!(format_number(1_234_567.891, 1), "1,234,567.9");
        assert_eq!(format_number(999.5, 0), "1,000");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn negative_values_keep_sign_unless_zero() {
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(-0.0, 2), "0.00");
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn non_finite_formats_as_zero() {
        assert_eq!(format_number(f64::NAN, 0), "0");
        assert_eq!(format_number(f64::INFINITY, 1), "0.0");
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(0.25, 1), "0.3");
        assert_eq!(format_number(-2.5, 0), "-3");
        assert_eq!(format_number(9.995, 2), "10.00");
        assert_eq!(format_percent(49.5, 0), "50%");
    }

    #[test]
    fn rounds_the_decimal_that_was_written() {
        // Both literals sit just below the half in binary.
        assert_eq!(format_number(1.005, 2), "1.01");
        assert_eq!(format_number(2.675, 2), "2.68");
        assert_eq!(format_number(1.004, 2), "1.00");
        assert_eq!(format_number(0.1 + 0.2, 2), "0.30");
    }

    #[test]
    fn groups_integers_of_any_size() {
        assert_eq!(format_number(1e40, 0), "10,000,000,000,000,000,000,000,000,000,000,000,000,000");
        assert_eq!(format_number(123_456.0, 0), "123,456");
        assert_eq!(format_number(12_345.0, 0), "12,345");
        assert_eq!(format_number(999.0, 0), "999");
    }

    #[test]
    fn parses_dirty_strings() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn lenient_coerces_non_numbers_to_zero() {
        let l = Lenient::from_value(&json!("12,000"));
        assert_eq!(l, Lenient { value: 12000.0, coerced: false });
        let l = Lenient::from_value(&json!("abc"));
        assert_eq!(l, Lenient { value: 0.0, coerced: true });
        let l = Lenient::from_value(&json!(null));
        assert_eq!(l, Lenient { value: 0.0, coerced: false });
        assert!(Lenient::from_value(&json!({"x": 1})).coerced);
        assert!(Lenient::from_value(&json!(true)).coerced);
    }
}

//! Numeric lexing and formatting helpers shared by the lexer and serializer.
//!
//! Parsing goes through `lexical-parse-{integer,float}` when the
//! `fast-numbers` feature is on (faster and more correctly-rounded than the
//! standard library's `FromStr` for floats), falling back to `core`'s
//! parsing otherwise. Formatting uses `itoa`/`ryu` the same way, gated
//! behind the same feature flag.

use alloc::string::String;

use crate::token::NumberRadix;
use crate::value::TypedValue;

/// Remove the visual-separator underscores from a numeric literal's digit
/// run, validating that none are leading/trailing/doubled around the
/// significant digits.
pub fn strip_underscores(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    if bytes.first() == Some(&b'_') || bytes.last() == Some(&b'_') {
        return None;
    }
    let mut out = String::with_capacity(text.len());
    let mut prev_underscore = false;
    for &b in bytes {
        if b == b'_' {
            if prev_underscore {
                return None;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
            out.push(b as char);
        }
    }
    Some(out)
}

/// Result of classifying a number's literal text, before full parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// No `.` or exponent: an integer literal.
    Integer,
    /// Has a `.` and/or exponent: a float literal.
    Float,
}

/// Determine whether a decimal-radix literal (sign + digits, optionally
/// with `.` and exponent) is shaped like an integer or a float.
pub fn decimal_shape(text: &str) -> Shape {
    if text.contains('.') || text.contains('e') || text.contains('E') {
        Shape::Float
    } else {
        Shape::Integer
    }
}

/// Parse a non-decimal-radix integer literal (hex/octal/binary digits,
/// underscores already stripped, without the `0x`/`0o`/`0b` prefix) into an
/// `i64` if it fits, signalling overflow by returning `None` so the caller
/// can fall back to `TypedValue::FloatRaw`.
pub fn parse_radix_integer(digits: &str, sign: i64, radix: NumberRadix) -> Option<i64> {
    let base = match radix {
        NumberRadix::Hex => 16,
        NumberRadix::Octal => 8,
        NumberRadix::Binary => 2,
        NumberRadix::Decimal => 10,
    };
    i64::from_str_radix(digits, base).ok().map(|v| v * sign)
}

/// Parse a decimal integer literal into an `i64`, or `None` if it doesn't
/// fit (the caller then preserves the literal verbatim as `FloatRaw`).
#[cfg(feature = "fast-numbers")]
pub fn parse_decimal_integer(text: &str) -> Option<i64> {
    use lexical_parse_integer::FromLexical;
    i64::from_lexical(text.as_bytes()).ok()
}

/// std fallback for [`parse_decimal_integer`].
#[cfg(not(feature = "fast-numbers"))]
pub fn parse_decimal_integer(text: &str) -> Option<i64> {
    text.parse::<i64>().ok()
}

/// Parse a decimal float literal into an `f64`.
#[cfg(feature = "fast-numbers")]
pub fn parse_decimal_float(text: &str) -> Option<f64> {
    use lexical_parse_float::FromLexical;
    f64::from_lexical(text.as_bytes()).ok()
}

/// std fallback for [`parse_decimal_float`].
#[cfg(not(feature = "fast-numbers"))]
pub fn parse_decimal_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

/// Build the `TypedValue` for a decimal-radix number literal, choosing
/// `Integer`/`Float`/`FloatRaw`, preserving the original literal's textual
/// precision.
///
/// `clean_text` has had its underscores stripped but still carries a
/// leading `-` if the literal was negative.
pub fn decimal_value(clean_text: &str, raw_ref: crate::pool::StringRef) -> TypedValue {
    match decimal_shape(clean_text) {
        Shape::Integer => match parse_decimal_integer(clean_text) {
            Some(n) => TypedValue::Integer(n),
            None => TypedValue::FloatRaw(raw_ref),
        },
        Shape::Float => match parse_decimal_float(clean_text) {
            Some(f) if f.is_finite() && format_float(f) == *clean_text => TypedValue::Float(f),
            Some(f) if f.is_finite() => {
                // Parses fine but doesn't round-trip to the same text
                // (e.g. trailing zeros, alternate exponent form): keep the
                // original literal so no precision/formatting is lost.
                let _ = f;
                TypedValue::FloatRaw(raw_ref)
            }
            _ => TypedValue::FloatRaw(raw_ref),
        },
    }
}

/// Format an `i64` using `itoa` when available.
#[cfg(feature = "fast-numbers")]
pub fn format_integer(n: i64) -> String {
    itoa::Buffer::new().format(n).into()
}

/// std fallback for [`format_integer`].
#[cfg(not(feature = "fast-numbers"))]
pub fn format_integer(n: i64) -> String {
    alloc::string::ToString::to_string(&n)
}

/// Format an `f64` with the shortest text that round-trips exactly, using
/// `ryu` when available. Callers handle NaN/infinity separately (`#nan`/`#inf`/`#-inf`).
#[cfg(feature = "fast-numbers")]
pub fn format_float(f: f64) -> String {
    ryu::Buffer::new().format(f).into()
}

/// std fallback for [`format_float`].
#[cfg(not(feature = "fast-numbers"))]
pub fn format_float(f: f64) -> String {
    alloc::string::ToString::to_string(&f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_underscores_basic() {
        assert_eq!(strip_underscores("1_000_000").unwrap(), "1000000");
        assert_eq!(strip_underscores("1.0_5").unwrap(), "1.05");
    }

    #[test]
    fn strip_underscores_rejects_leading_trailing_double() {
        assert!(strip_underscores("_100").is_none());
        assert!(strip_underscores("100_").is_none());
        assert!(strip_underscores("1__00").is_none());
    }

    #[test]
    fn shape_detection() {
        assert_eq!(decimal_shape("123"), Shape::Integer);
        assert_eq!(decimal_shape("-123"), Shape::Integer);
        assert_eq!(decimal_shape("1.5"), Shape::Float);
        assert_eq!(decimal_shape("1e10"), Shape::Float);
    }

    #[test]
    fn radix_integer_parsing() {
        assert_eq!(parse_radix_integer("ff", 1, NumberRadix::Hex), Some(255));
        assert_eq!(parse_radix_integer("10", 1, NumberRadix::Octal), Some(8));
        assert_eq!(parse_radix_integer("101", 1, NumberRadix::Binary), Some(5));
        assert_eq!(parse_radix_integer("ff", -1, NumberRadix::Hex), Some(-255));
    }

    #[test]
    fn integer_round_trips() {
        assert_eq!(format_integer(parse_decimal_integer("255").unwrap()), "255");
        assert_eq!(format_integer(-42), "-42");
    }

    #[test]
    fn float_round_trips() {
        let f = parse_decimal_float("3.5").unwrap();
        assert_eq!(format_float(f), "3.5");
    }
}

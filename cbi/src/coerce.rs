//! Number/string coercions shared by the validators and the dependency
//! engine. Form values are strings; numeric comparisons follow the loose
//! rules browsers apply to form input.

use std::sync::LazyLock;

use regex::Regex;

static DECIMAL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap()
});

static HEX_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^0[xX][0-9a-fA-F]+$").unwrap());

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)").unwrap()
});

/// Loose numeric conversion of a form value.
///
/// Surrounding whitespace is ignored and the empty string is zero. Anything
/// that is not a decimal or `0x` hex literal (or `Infinity`) is NaN.
pub fn to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    if DECIMAL_NUMBER.is_match(text) {
        return text.parse().unwrap_or(f64::NAN);
    }
    if HEX_NUMBER.is_match(text) {
        return u64::from_str_radix(&text[2..], 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    match text {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => f64::NAN,
    }
}

/// Shortest textual form of a number: integral values print without a
/// fraction (`100`, not `100.0`).
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{n}")
    }
}

/// Parse the leading decimal number of `text`, ignoring whatever follows
/// it (`"0x10"` is 0, `"1.5em"` is 1.5). NaN when there is none.
pub fn parse_float_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let Some(m) = FLOAT_PREFIX.find(text) else {
        return f64::NAN;
    };
    match m.as_str().trim_start_matches('+') {
        "Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        number => number.parse().unwrap_or(f64::NAN),
    }
}

/// Parse the leading integer of `text`, ignoring whatever follows it
/// (`"12px"` is 12). `None` when there is no leading digit.
pub fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits]
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse the leading hexadecimal digits of `text` into a 32-bit word,
/// wrapping on overflow. Non-hex input yields 0.
pub fn parse_hex_prefix(text: &str) -> u32 {
    text.chars()
        .map_while(|c| c.to_digit(16))
        .fold(0u32, |acc, d| acc.wrapping_mul(16).wrapping_add(d))
}

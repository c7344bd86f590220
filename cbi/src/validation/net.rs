//! Numeric and address parsers behind the validators.

use std::sync::LazyLock;

use regex::Regex;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").unwrap());

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})$").unwrap()
});

static IPV6_EMBEDDED_V4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-fA-F0-9:]+):([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})$").unwrap()
});

static IPV6_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-fA-F0-9:]+$").unwrap());

/// Parse a decimal integer; NaN when `text` is not one.
pub fn parse_integer(text: &str) -> f64 {
    if INTEGER.is_match(text) {
        text.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Parse a decimal number without exponent; NaN when `text` is not one.
pub fn parse_decimal(text: &str) -> f64 {
    if DECIMAL.is_match(text) {
        text.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Parse a dotted-quad IPv4 address.
pub fn parse_ipv4(text: &str) -> Option<[u8; 4]> {
    let caps = IPV4.captures(text)?;
    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        *octet = caps[i + 1].parse().ok()?;
    }
    Some(octets)
}

/// Parse an IPv6 address into its eight 16-bit words.
///
/// Accepts `::` compression and a trailing embedded IPv4 address.
pub fn parse_ipv6(text: &str) -> Option<[u16; 8]> {
    let expanded;
    let text = match IPV6_EMBEDDED_V4.captures(text) {
        Some(caps) => {
            let v4 = parse_ipv4(&caps[2])?;
            expanded = format!(
                "{}:{:x}:{:x}",
                &caps[1],
                (u16::from(v4[0]) << 8) | u16::from(v4[1]),
                (u16::from(v4[2]) << 8) | u16::from(v4[3]),
            );
            expanded.as_str()
        }
        None => text,
    };

    if !IPV6_CHARS.is_match(text) {
        return None;
    }

    let halves: Vec<&str> = text.split("::").collect();
    if halves.len() > 2 {
        return None;
    }

    let groups = |half: &str| -> Vec<String> {
        let half = if half.is_empty() { "0" } else { half };
        half.split(':').map(str::to_string).collect()
    };
    let prefix = groups(halves[0]);
    let suffix = match halves.get(1) {
        Some(half) => groups(half),
        None => Vec::new(),
    };

    if !suffix.is_empty() {
        if prefix.len() + suffix.len() > 7 {
            return None;
        }
    } else if prefix.len() != 8 {
        return None;
    }

    let mut words = Vec::with_capacity(8);
    for group in &prefix {
        words.push(parse_group(group)?);
    }
    words.resize(8 - suffix.len(), 0);
    for group in &suffix {
        words.push(parse_group(group)?);
    }

    words.try_into().ok()
}

fn parse_group(group: &str) -> Option<u16> {
    if group.len() > 4 {
        return None;
    }
    u16::from_str_radix(group, 16).ok()
}

/// Lexicographic `a <= b`.
pub fn array_le<T: Ord>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a <= b
}

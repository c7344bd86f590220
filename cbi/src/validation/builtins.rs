//! The built-in validator functions.

use std::sync::LazyLock;

use regex::Regex;

use super::net::{array_le, parse_decimal, parse_integer, parse_ipv4, parse_ipv6};
use super::types::{Arg, Builtin, Callee};
use super::validator::Context;
use crate::coerce::{number_to_string, parse_hex_prefix, to_number};

static IP4_NOMASK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)$").unwrap());

static IP4_MASKED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)(?:/([0-9]+\.[0-9]+\.[0-9]+\.[0-9]+)|/([0-9]{1,2}))?$")
        .unwrap()
});

static IP6_NOMASK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9a-fA-F:.]+)$").unwrap());

static IP6_MASKED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9a-fA-F:.]+)(?:/([0-9]{1,3}))?$").unwrap());

static CIDR4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})/(-)?([0-9]{1,2})$").unwrap()
});

static CIDR6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9a-fA-F:.]+)/(-)?([0-9]{1,3})$").unwrap());

static IPNET4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})/([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})$",
    )
    .unwrap()
});

static IPNET6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9a-fA-F:.]+)/([0-9a-fA-F:.]+)$").unwrap());

static PORT_RANGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([0-9]+)-([0-9]+)$").unwrap());

static MAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-fA-F0-9]{2}):([a-fA-F0-9]{2}:){4}[a-fA-F0-9]{2}$").unwrap()
});

static HOST_SIMPLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

static HOST_LABELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_\-.]*[a-zA-Z0-9]\.?$").unwrap());

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.]").unwrap());

static ADDR_PORT4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\[\]:]+):([0-9]+)$").unwrap());

static ADDR_PORT6: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^\[\]]+):([0-9]+)$").unwrap());

static ADDR_PORT6_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.+)\]:([0-9]+)$").unwrap());

static HEX_WPA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{64}$").unwrap());

static HEX_WEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{10,26}$").unwrap());

static UCI_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());

static FW4_ZONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]+$").unwrap());

static NETDEV: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^:/%\s]{1,15}$").unwrap());

static PHONE_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9*#!.]+$").unwrap());

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[01][0-9]|2[0-3]):[0-5][0-9]:(?:[0-5][0-9]|60)$").unwrap()
});

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})").unwrap());

static HEX_STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:[a-fA-F0-9]{2})+$").unwrap());

static NEGATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[ \t]*![ \t]*").unwrap());

static LIST_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^ \t]+").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Dispatch a built-in validator.
pub(crate) fn run(builtin: Builtin, cx: &mut Context<'_>, args: &[Arg]) -> bool {
    match builtin {
        Builtin::Integer => {
            let ok = !parse_integer(cx.value()).is_nan();
            cx.assert(ok, "valid integer value")
        }
        Builtin::UInteger => {
            let ok = parse_integer(cx.value()) >= 0.0;
            cx.assert(ok, "positive integer value")
        }
        Builtin::Float => {
            let ok = !parse_decimal(cx.value()).is_nan();
            cx.assert(ok, "valid decimal value")
        }
        Builtin::UFloat => {
            let ok = parse_decimal(cx.value()) >= 0.0;
            cx.assert(ok, "positive decimal value")
        }
        Builtin::IpAddr => ipaddr(cx, args),
        Builtin::Ip4Addr => ip4addr(cx, args),
        Builtin::Ip6Addr => ip6addr(cx, args),
        Builtin::Ip6Ll => {
            let word = parse_hex_prefix(cx.value());
            let ok = (word & 0xffc0) == 0xfe80 && cx.apply(Builtin::Ip6Addr.into(), None, args);
            cx.assert(ok, "valid IPv6 Link Local address")
        }
        Builtin::Ip6Ula => {
            let word = parse_hex_prefix(cx.value());
            let ok = (word & 0xfe00) == 0xfc00 && cx.apply(Builtin::Ip6Addr.into(), None, args);
            cx.assert(ok, "valid IPv6 ULA address")
        }
        Builtin::Ip4Prefix => {
            let n = to_number(cx.value());
            cx.assert((0.0..=32.0).contains(&n), "valid IPv4 prefix value (0-32)")
        }
        Builtin::Ip6Prefix => {
            let n = to_number(cx.value());
            cx.assert((0.0..=128.0).contains(&n), "valid IPv6 prefix value (0-128)")
        }
        Builtin::Cidr => {
            let ok = cx.apply(Builtin::Cidr4.into(), None, args)
                || cx.apply(Builtin::Cidr6.into(), None, args);
            cx.assert(ok, "valid IPv4 or IPv6 CIDR")
        }
        Builtin::Cidr4 => cidr(cx, args, &CIDR4, false),
        Builtin::Cidr6 => cidr(cx, args, &CIDR6, true),
        Builtin::IpNet4 => {
            let ok = IPNET4.captures(cx.value()).is_some_and(|c| {
                parse_ipv4(&c[1]).is_some() && parse_ipv4(&c[2]).is_some()
            });
            cx.assert(ok, "IPv4 network in address/netmask notation")
        }
        Builtin::IpNet6 => {
            let ok = IPNET6.captures(cx.value()).is_some_and(|c| {
                parse_ipv6(&c[1]).is_some() && parse_ipv6(&c[2]).is_some()
            });
            cx.assert(ok, "IPv6 network in address/netmask notation")
        }
        Builtin::Ip6HostId => {
            if matches!(cx.value(), "eui64" | "random") {
                return cx.pass();
            }
            let ok = parse_ipv6(cx.value()).is_some_and(|w| w[..4].iter().all(|&x| x == 0));
            cx.assert(ok, "valid IPv6 host id")
        }
        Builtin::IpMask => {
            let ok = cx.apply(Builtin::IpMask4.into(), None, args)
                || cx.apply(Builtin::IpMask6.into(), None, args);
            cx.assert(ok, "valid network in address/netmask notation")
        }
        Builtin::IpMask4 => {
            let ok = cx.apply(Builtin::Cidr4.into(), None, args)
                || cx.apply(Builtin::IpNet4.into(), None, &[])
                || cx.apply(Builtin::Ip4Addr.into(), None, &[]);
            cx.assert(ok, "valid IPv4 network")
        }
        Builtin::IpMask6 => {
            let ok = cx.apply(Builtin::Cidr6.into(), None, args)
                || cx.apply(Builtin::IpNet6.into(), None, &[])
                || cx.apply(Builtin::Ip6Addr.into(), None, &[]);
            cx.assert(ok, "valid IPv6 network")
        }
        Builtin::IpRange => {
            let ok = cx.apply(Builtin::IpRange4.into(), None, &[])
                || cx.apply(Builtin::IpRange6.into(), None, &[]);
            cx.assert(ok, "valid IP address range")
        }
        Builtin::IpRange4 => {
            let ok = split_pair(cx.value(), '-').is_some_and(|(a, b)| {
                matches!((parse_ipv4(a), parse_ipv4(b)), (Some(a), Some(b)) if array_le(&a, &b))
            });
            cx.assert(ok, "valid IPv4 address range")
        }
        Builtin::IpRange6 => {
            let ok = split_pair(cx.value(), '-').is_some_and(|(a, b)| {
                matches!((parse_ipv6(a), parse_ipv6(b)), (Some(a), Some(b)) if array_le(&a, &b))
            });
            cx.assert(ok, "valid IPv6 address range")
        }
        Builtin::Port => {
            let p = parse_integer(cx.value());
            cx.assert((0.0..=65535.0).contains(&p), "valid port value")
        }
        Builtin::PortRange => portrange(cx),
        Builtin::MacAddr => macaddr(cx, args),
        Builtin::Host => {
            let ipv4only = args.first().is_some_and(|a| a.as_number() == 1.0);
            let addr = if ipv4only { Builtin::Ip4Addr } else { Builtin::IpAddr };
            let ok = cx.apply(Builtin::Hostname.into(), None, &[])
                || cx.apply(addr.into(), None, &[Arg::Str("nomask".into())]);
            cx.assert(ok, "valid hostname or IP address")
        }
        Builtin::Hostname => hostname(cx, args),
        Builtin::Network => {
            let ok = [Builtin::UciName, Builtin::Hostname, Builtin::Ip4Addr, Builtin::Ip6Addr]
                .into_iter()
                .any(|b| cx.apply(b.into(), None, &[]));
            cx.assert(ok, "valid UCI identifier, hostname or IP address range")
        }
        Builtin::HostPort => {
            let value = cx.value().to_string();
            let ok = split_pair(&value, ':').is_some_and(|(host, port)| {
                cx.apply(Builtin::Host.into(), Some(host), args)
                    && cx.apply(Builtin::Port.into(), Some(port), &[])
            });
            cx.assert(ok, "valid host:port")
        }
        Builtin::Ip4AddrPort => {
            let value = cx.value().to_string();
            let ok = split_pair(&value, ':').is_some_and(|(addr, port)| {
                cx.apply(Builtin::Ip4Addr.into(), Some(addr), &[Arg::Number(1.0)])
                    && cx.apply(Builtin::Port.into(), Some(port), &[])
            });
            cx.assert(ok, "valid IPv4 address:port")
        }
        Builtin::IpAddrPort => ipaddrport(cx, args),
        // Only meaningful as a tuple() argument.
        Builtin::Sep => true,
        Builtin::Tuple => tuple(cx, args),
        Builtin::WpaKey => {
            let value = cx.value();
            let len = value.chars().count();
            if len == 64 {
                let ok = HEX_WPA.is_match(value);
                return cx.assert(ok, "valid hexadecimal WPA key");
            }
            cx.assert((8..=63).contains(&len), "key between 8 and 63 characters")
        }
        Builtin::WepKey => {
            let value = cx.value();
            let key = value.strip_prefix("s:").unwrap_or(value);
            let len = key.chars().count();
            if len == 10 || len == 26 {
                let ok = HEX_WEP.is_match(key);
                return cx.assert(ok, "valid hexadecimal WEP key");
            }
            cx.assert(len == 5 || len == 13, "key with either 5 or 13 characters")
        }
        Builtin::UciName => {
            let ok = UCI_NAME.is_match(cx.value());
            cx.assert(ok, "valid UCI identifier")
        }
        Builtin::UciFw4ZoneName => {
            let ok = FW4_ZONE.is_match(cx.value());
            cx.assert(ok, "valid fw4 zone name UCI identifier")
        }
        Builtin::NetDevName => {
            if matches!(cx.value(), "." | "..") {
                return cx.assert(false, r#"valid network device name, not "." or "..""#);
            }
            let ok = NETDEV.is_match(cx.value());
            cx.assert(
                ok,
                r#"valid network device name between 1 and 15 characters not containing ":", "/", "%" or spaces"#,
            )
        }
        Builtin::Range => {
            let (min, max) = (args.first(), args.get(1));
            let val = parse_decimal(cx.value());
            let ok = val >= number(min) && val <= number(max);
            cx.assert(
                ok,
                format!("value between {} and {}", format_float(min), format_float(max)),
            )
        }
        Builtin::Min => {
            let min = args.first();
            let ok = parse_decimal(cx.value()) >= number(min);
            cx.assert(ok, format!("value greater or equal to {}", format_float(min)))
        }
        Builtin::Max => {
            let max = args.first();
            let ok = parse_decimal(cx.value()) <= number(max);
            cx.assert(ok, format!("value smaller or equal to {}", format_float(max)))
        }
        Builtin::Length => {
            let len = args.first();
            let ok = cx.value().len() as f64 == number(len);
            cx.assert(ok, format!("value with {} characters", format_int(len)))
        }
        Builtin::RangeLength => {
            let (min, max) = (args.first(), args.get(1));
            let len = cx.value().len() as f64;
            let ok = len >= number(min) && len <= number(max);
            cx.assert(
                ok,
                format!(
                    "value between {} and {} characters",
                    format_int(min),
                    format_int(max)
                ),
            )
        }
        Builtin::MinLength => {
            let min = args.first();
            let ok = cx.value().len() as f64 >= number(min);
            cx.assert(ok, format!("value with at least {} characters", format_int(min)))
        }
        Builtin::MaxLength => {
            let max = args.first();
            let ok = cx.value().len() as f64 <= number(max);
            cx.assert(ok, format!("value with at most {} characters", format_int(max)))
        }
        Builtin::Or => or(cx, args),
        Builtin::And => {
            for arg in args {
                if !apply_arg(cx, arg, None) {
                    return cx.fail_with_current();
                }
            }
            cx.pass()
        }
        Builtin::Neg => neg(cx, args),
        Builtin::List => list(cx, args),
        Builtin::PhoneDigit => {
            let ok = PHONE_DIGIT.is_match(cx.value());
            cx.assert(ok, r##"valid phone digit (0-9, "*", "#", "!" or ".")"##)
        }
        Builtin::TimeHhMmSs => {
            let ok = TIME.is_match(cx.value());
            cx.assert(ok, "valid time (HH:MM:SS)")
        }
        Builtin::DateYyyyMmDd => {
            let ok = DATE.captures(cx.value()).is_some_and(|c| {
                let (year, month, day) = (to_number(&c[1]), to_number(&c[2]), to_number(&c[3]));
                year >= 2015.0
                    && (1.0..=12.0).contains(&month)
                    && day >= 1.0
                    && day <= days_in_month(month as u32, year as u32) as f64
            });
            cx.assert(ok, "valid date (YYYY-MM-DD)")
        }
        Builtin::Unique => unique(cx, args),
        Builtin::HexString => {
            let ok = HEX_STRING.is_match(cx.value());
            cx.assert(ok, "hexadecimal encoded value")
        }
        Builtin::String => match args.first() {
            None => true,
            Some(expected) => {
                let expected = expected.as_text();
                let ok = cx.value() == expected;
                cx.assert(ok, format!("string: \"{expected}\""))
            }
        },
        Builtin::Directory | Builtin::File | Builtin::Device => true,
    }
}

/// `%f` rendering of a message argument: the plain number, 0 when missing.
fn format_float(arg: Option<&Arg>) -> String {
    number_to_string(number_or_zero(arg))
}

/// `%d` rendering of a message argument: truncated towards zero.
fn format_int(arg: Option<&Arg>) -> String {
    number_to_string(number_or_zero(arg).trunc())
}

fn number_or_zero(arg: Option<&Arg>) -> f64 {
    let n = number(arg);
    if n.is_nan() { 0.0 } else { n }
}

/// Numeric bound of a rule; missing bounds never compare.
fn number(arg: Option<&Arg>) -> f64 {
    arg.map_or(f64::NAN, Arg::as_number)
}

fn flag(args: &[Arg]) -> bool {
    args.first().is_some_and(Arg::is_truthy)
}

fn literal_message(arg: &Arg) -> String {
    format!("\"{}\"", arg.as_text())
}

/// Run one combinator argument against the working value (or `value`).
/// Literals compare loosely and fail with their quoted text.
fn apply_arg(cx: &mut Context<'_>, arg: &Arg, value: Option<&str>) -> bool {
    match arg {
        Arg::Call(spec) => cx.apply_spec(spec, value),
        literal => {
            let ok = literal.loosely_equals(value.unwrap_or(cx.value()));
            cx.assert(ok, literal_message(literal))
        }
    }
}

/// Split into exactly two parts at `sep`.
fn split_pair(value: &str, sep: char) -> Option<(&str, &str)> {
    let mut parts = value.split(sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}

fn days_in_month(month: u32, year: u32) -> u32 {
    const DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if month == 2 && leap {
        29
    } else {
        DAYS[(month as usize).saturating_sub(1).min(11)]
    }
}

fn ipaddr(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let ok = cx.apply(Builtin::Ip4Addr.into(), None, args)
        || cx.apply(Builtin::Ip6Addr.into(), None, args);
    let message = if flag(args) {
        "valid IP address"
    } else {
        "valid IP address or prefix"
    };
    cx.assert(ok, message)
}

fn ip4addr(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let nomask = flag(args);
    let re = if nomask { &IP4_NOMASK } else { &IP4_MASKED };
    let value = cx.value().to_string();
    let ok = re.captures(&value).is_some_and(|c| {
        parse_ipv4(&c[1]).is_some()
            && match (c.get(2), c.get(3)) {
                (Some(mask), _) => parse_ipv4(mask.as_str()).is_some(),
                (None, Some(prefix)) => {
                    cx.apply(Builtin::Ip4Prefix.into(), Some(prefix.as_str()), &[])
                }
                (None, None) => true,
            }
    });
    let message = if nomask {
        "valid IPv4 address"
    } else {
        "valid IPv4 address or network"
    };
    cx.assert(ok, message)
}

fn ip6addr(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let nomask = flag(args);
    let re = if nomask { &IP6_NOMASK } else { &IP6_MASKED };
    let value = cx.value().to_string();
    let ok = re.captures(&value).is_some_and(|c| {
        parse_ipv6(&c[1]).is_some()
            && match c.get(2) {
                Some(prefix) => cx.apply(Builtin::Ip6Prefix.into(), Some(prefix.as_str()), &[]),
                None => true,
            }
    });
    let message = if nomask {
        "valid IPv6 address"
    } else {
        "valid IPv6 address or prefix"
    };
    cx.assert(ok, message)
}

fn cidr(cx: &mut Context<'_>, args: &[Arg], re: &Regex, v6: bool) -> bool {
    let negative = flag(args);
    let value = cx.value().to_string();
    let ok = re.captures(&value).is_some_and(|c| {
        let addr_ok = if v6 {
            parse_ipv6(&c[1]).is_some()
        } else {
            parse_ipv4(&c[1]).is_some()
        };
        let prefix = if v6 { Builtin::Ip6Prefix } else { Builtin::Ip4Prefix };
        addr_ok
            && (negative || c.get(2).is_none())
            && cx.apply(prefix.into(), Some(&c[3]), &[])
    });
    cx.assert(ok, if v6 { "valid IPv6 CIDR" } else { "valid IPv4 CIDR" })
}

fn portrange(cx: &mut Context<'_>) -> bool {
    const MESSAGE: &str = "valid port or port range (port1-port2)";
    let range = PORT_RANGE
        .captures(cx.value())
        .map(|c| (to_number(&c[1]), to_number(&c[2])));
    match range {
        Some((p1, p2)) => cx.assert(p1 <= p2 && p2 <= 65535.0, MESSAGE),
        None => {
            let ok = cx.apply(Builtin::Port.into(), None, &[]);
            cx.assert(ok, MESSAGE)
        }
    }
}

fn macaddr(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let multicast = flag(args);
    let ok = MAC.is_match(cx.value())
        && u8::from_str_radix(&cx.value()[..2], 16).is_ok_and(|octet| (octet & 1 == 1) == multicast);
    let message = if multicast {
        "valid multicast MAC address"
    } else {
        "valid MAC address"
    };
    cx.assert(ok, message)
}

fn hostname(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let strict = flag(args);
    let value = cx.value();
    let ok = value.chars().count() <= 253
        && (HOST_SIMPLE.is_match(value)
            || (HOST_LABELS.is_match(value) && NON_NUMERIC.is_match(value)))
        && !(strict && value.starts_with('_'));
    cx.assert(ok, "valid hostname")
}

fn ipaddrport(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    const MESSAGE: &str = "valid address:port";
    let value = cx.value().to_string();
    let nomask = [Arg::Number(1.0)];

    if let Some(c) = ADDR_PORT4.captures(&value) {
        let ok = cx.apply(Builtin::Ip4Addr.into(), Some(&c[1]), &nomask)
            && cx.apply(Builtin::Port.into(), Some(&c[2]), &[]);
        return cx.assert(ok, MESSAGE);
    }

    let bracket = args.first().is_some_and(|a| a.as_number() == 1.0);
    let re = if bracket { &ADDR_PORT6_BRACKET } else { &ADDR_PORT6 };
    let ok = re.captures(&value).is_some_and(|c| {
        cx.apply(Builtin::Ip6Addr.into(), Some(&c[1]), &nomask)
            && cx.apply(Builtin::Port.into(), Some(&c[2]), &[])
    });
    cx.assert(ok, MESSAGE)
}

fn tuple(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let mut sep: Option<String> = None;
    let mut types: Vec<&Arg> = Vec::new();
    for arg in args {
        match arg {
            Arg::Call(spec) if spec.root == Callee::Builtin(Builtin::Sep) => {
                if let Some(first) = spec.args.first() {
                    sep = Some(first.as_text());
                }
            }
            other => types.push(other),
        }
    }

    let raw = cx.value().to_string();
    let tokens: Vec<String> = match sep.as_deref() {
        None => WHITESPACE.split(&raw).map(str::to_string).collect(),
        Some("") => raw.chars().map(String::from).collect(),
        Some(sep) => raw.split(sep).map(|t| t.trim().to_string()).collect(),
    };

    if tokens.len() != types.len() {
        let names: Vec<&str> = types
            .iter()
            .map(|t| match t {
                Arg::Call(spec) => spec.root.name(),
                _ => "value",
            })
            .collect();
        let expected = names.join(sep.as_deref().unwrap_or(" "));
        let message = if types.len() > 1 {
            let sep_desc = sep
                .as_deref()
                .map_or_else(|| "whitespace".to_string(), |s| format!("\"{s}\""));
            format!("{expected}; {} tokens separated by {sep_desc}", types.len())
        } else {
            expected
        };
        return cx.assert(false, message);
    }

    for (arg, token) in types.into_iter().zip(&tokens) {
        if !apply_arg(cx, arg, Some(token.as_str())) {
            return cx.fail_with_current();
        }
    }
    cx.pass()
}

fn or(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let mut errors = Vec::new();
    for arg in args {
        if apply_arg(cx, arg, None) {
            return cx.pass();
        }
        errors.push(cx.error().unwrap_or_default().to_string());
    }
    cx.assert(
        false,
        format!("One of the following: \n - {}", errors.join("\n - ")),
    )
}

fn neg(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let stripped = NEGATION.replace(cx.value(), "").into_owned();
    cx.set_value(stripped);

    let ok = match args {
        [Arg::Call(spec)] => cx.apply_spec(spec, None),
        _ => or(cx, args),
    };
    if ok {
        return cx.pass();
    }
    let message = format!("Potential negation of: {}", cx.error().unwrap_or_default());
    cx.assert(false, message)
}

fn list(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let field = cx.field();
    cx.document_mut()[field].set_data("is-list", "true");

    let Some(sub) = args.first() else {
        return cx.pass();
    };
    let value = cx.value().to_string();
    for token in LIST_TOKEN.find_iter(&value) {
        if !apply_arg(cx, sub, Some(token.as_str())) {
            return cx.fail_with_current();
        }
    }
    cx.pass()
}

fn unique(cx: &mut Context<'_>, args: &[Arg]) -> bool {
    let doc = cx.document();
    let value = cx.value();
    let field = cx.field();

    let option = doc.find_parent(field, |n| {
        n.data.contains_key("widget") && n.data.contains_key("name")
    });
    let section = option.and_then(|o| doc.find_parent(o, |n| n.has_class("cbi-section")));

    let mut is_unique = true;
    if let (Some(option), Some(section)) = (option, section) {
        let key = (doc[option].get_data("widget"), doc[option].get_data("name"));
        for sibling in doc.descendants(section) {
            let node = &doc[sibling];
            if sibling == option || (node.get_data("widget"), node.get_data("name")) != key {
                continue;
            }
            let input = doc
                .descendants(sibling)
                .into_iter()
                .find(|&d| doc[d].data.contains_key("type"));
            let Some(input) = input else {
                continue;
            };
            let other = doc.field_value(input);
            let taken = if doc[input].data.contains_key("is-list") {
                LIST_TOKEN.find_iter(other).any(|m| m.as_str() == value)
            } else {
                other == value
            };
            if taken {
                is_unique = false;
            }
        }
    }

    if !is_unique {
        return cx.assert(false, "unique value");
    }
    match args.first() {
        Some(Arg::Call(spec)) => cx.apply_spec(spec, None),
        _ => cx.pass(),
    }
}

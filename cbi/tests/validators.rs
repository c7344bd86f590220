use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cbi::validation::{Arg, Context, INVALID_CLASS, TypeTable, Validator, parse_integer};
use cbidom::{Document, Element, Notification};

fn form_with(value: &str) -> Document {
    Document::new(
        Element::form()
            .id("form")
            .child(Element::input(value).id("field")),
    )
}

/// Validate `value` against `expr`; returns the verdict and the stored
/// expectation message.
fn run(expr: &str, value: &str) -> (bool, Option<String>) {
    run_with(TypeTable::new(), expr, value, false)
}

fn run_with(types: TypeTable, expr: &str, value: &str, optional: bool) -> (bool, Option<String>) {
    let mut doc = form_with(value);
    let field = doc.element_by_id("field").unwrap();
    let mut validator = Validator::new(&doc, field, expr, optional, Arc::new(types)).unwrap();
    let valid = validator.validate(&mut doc);
    (valid, validator.state().error.clone())
}

fn accepts(expr: &str, value: &str) -> bool {
    run(expr, value).0
}

fn message(expr: &str, value: &str) -> String {
    let (valid, error) = run(expr, value);
    assert!(!valid, "'{value}' unexpectedly passed {expr}");
    error.unwrap_or_default()
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_integer_types() {
    assert!(accepts("integer", "42"));
    assert!(accepts("integer", "-7"));
    assert_eq!(message("integer", "4.2"), "valid integer value");
    assert!(accepts("uinteger", "0"));
    assert_eq!(message("uinteger", "-1"), "positive integer value");
}

#[test]
fn test_float_types() {
    assert!(accepts("float", "3.14"));
    assert_eq!(message("float", "1e3"), "valid decimal value");
    assert_eq!(message("ufloat", "-0.5"), "positive decimal value");
}

#[test]
fn test_range_min_max() {
    assert!(accepts("range(1, 100)", "50"));
    assert_eq!(message("range(1, 100)", "0"), "value between 1 and 100");
    assert_eq!(message("min(5)", "4"), "value greater or equal to 5");
    assert_eq!(message("max(10)", "11"), "value smaller or equal to 10");
    assert_eq!(message("min(1.5)", "1"), "value greater or equal to 1.5");
}

#[test]
fn test_lengths_count_bytes() {
    assert!(accepts("length(3)", "abc"));
    // 'ä' is two bytes
    assert!(accepts("length(3)", "äb"));
    assert_eq!(message("length(3)", "ab"), "value with 3 characters");
    assert_eq!(
        message("rangelength(2, 4)", "abcde"),
        "value between 2 and 4 characters"
    );
    assert_eq!(message("minlength(3)", "ab"), "value with at least 3 characters");
    assert_eq!(message("maxlength(2)", "abc"), "value with at most 2 characters");
}

// ============================================================================
// Addresses
// ============================================================================

#[test]
fn test_ipv4_addresses() {
    assert!(accepts("ip4addr", "192.168.1.1"));
    assert!(accepts("ip4addr", "10.0.0.0/8"));
    assert!(accepts("ip4addr", "10.0.0.0/255.0.0.0"));
    assert!(!accepts("ip4addr", "1.2.3.256"));
    assert!(!accepts("ip4addr", "10.0.0.0/33"));
    assert_eq!(message("ip4addr(1)", "10.0.0.0/8"), "valid IPv4 address");
}

#[test]
fn test_ipv6_addresses() {
    assert!(accepts("ip6addr", "2001:db8::1/64"));
    assert!(accepts("ip6addr", "::ffff:10.0.0.1"));
    assert!(!accepts("ip6addr", "2001:db8::1/129"));
    assert!(accepts("ip6ll", "fe80::1"));
    assert_eq!(message("ip6ll", "2001:db8::1"), "valid IPv6 Link Local address");
    assert!(accepts("ip6ula", "fd00::1"));
    assert!(!accepts("ip6ula", "fe80::1"));
}

#[test]
fn test_ipaddr() {
    assert!(accepts("ipaddr", "192.168.1.1"));
    assert!(accepts("ipaddr", "fe80::1"));
    assert_eq!(message("ipaddr", "10.0.0.0/33"), "valid IP address or prefix");
    assert_eq!(message("ipaddr(1)", "10.0.0.0/8"), "valid IP address");
}

#[test]
fn test_cidr_and_networks() {
    assert!(accepts("cidr4", "10.0.0.0/8"));
    assert!(!accepts("cidr4", "10.0.0.0/-8"));
    assert!(accepts("cidr4(1)", "10.0.0.0/-8"));
    assert!(accepts("cidr", "fd00::/64"));
    assert_eq!(message("cidr", "fd00::"), "valid IPv4 or IPv6 CIDR");
    assert!(accepts("ipnet4", "10.0.0.0/255.0.0.0"));
    assert!(accepts("ipmask4", "10.0.0.1"));
    assert!(accepts("ipmask", "fd00::/8"));
}

#[test]
fn test_ranges_and_host_ids() {
    assert!(accepts("iprange4", "10.0.0.1-10.0.0.9"));
    assert!(!accepts("iprange4", "10.0.0.9-10.0.0.1"));
    assert!(accepts("iprange", "::1-::2"));
    assert!(accepts("ip6hostid", "eui64"));
    assert!(accepts("ip6hostid", "::1"));
    assert_eq!(message("ip6hostid", "2001::1"), "valid IPv6 host id");
}

#[test]
fn test_ports() {
    assert!(accepts("port", "65535"));
    assert_eq!(message("port", "65536"), "valid port value");
    assert!(accepts("portrange", "1000-2000"));
    assert!(accepts("portrange", "80"));
    assert_eq!(
        message("portrange", "2000-1000"),
        "valid port or port range (port1-port2)"
    );
}

#[test]
fn test_mac_addresses() {
    assert!(accepts("macaddr", "00:11:22:33:44:55"));
    assert_eq!(message("macaddr", "01:00:5e:00:00:01"), "valid MAC address");
    assert!(accepts("macaddr(1)", "01:00:5e:00:00:01"));
    assert_eq!(
        message("macaddr(1)", "00:11:22:33:44:55"),
        "valid multicast MAC address"
    );
}

#[test]
fn test_hostnames() {
    assert!(accepts("hostname", "openwrt.org"));
    assert!(accepts("hostname", "a"));
    assert!(accepts("hostname", "_srv"));
    assert!(!accepts("hostname(\"strict\")", "_srv"));
    assert!(!accepts("hostname", "1.2.3.4"));
    assert!(!accepts("hostname", "-abc"));
    assert!(!accepts("hostname", &"a".repeat(254)));
}

#[test]
fn test_host_and_ports() {
    assert!(accepts("host", "192.168.1.1"));
    assert_eq!(message("host", "10.0.0.0/8"), "valid hostname or IP address");
    assert!(!accepts("host(1)", "fe80::1"));
    assert!(accepts("network", "lan"));
    assert!(accepts("hostport", "example.com:80"));
    assert_eq!(message("hostport", "example.com"), "valid host:port");
    assert!(accepts("ip4addrport", "10.0.0.1:53"));
    assert!(accepts("ipaddrport", "10.0.0.1:53"));
    assert!(accepts("ipaddrport", "fe80::1:53"));
    assert!(accepts("ipaddrport(1)", "[fe80::1]:53"));
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_wireless_keys() {
    assert!(accepts("wpakey", "12345678"));
    assert_eq!(message("wpakey", "short"), "key between 8 and 63 characters");
    assert!(accepts("wpakey", &"a".repeat(64)));
    assert_eq!(message("wpakey", &"g".repeat(64)), "valid hexadecimal WPA key");
    assert!(accepts("wepkey", "s:abcde"));
    assert!(accepts("wepkey", "0123456789"));
    assert_eq!(message("wepkey", "abc"), "key with either 5 or 13 characters");
}

#[test]
fn test_identifiers() {
    assert!(accepts("uciname", "lan_1"));
    assert_eq!(message("uciname", "lan-1"), "valid UCI identifier");
    assert!(!accepts("ucifw4zonename", "1lan"));
    assert!(accepts("netdevname", "eth0.1"));
    assert_eq!(
        message("netdevname", ".."),
        r#"valid network device name, not "." or "..""#
    );
    assert!(!accepts("netdevname", "eth0:1"));
}

#[test]
fn test_misc_formats() {
    assert!(accepts("phonedigit", "*123#"));
    assert_eq!(
        message("phonedigit", "12a"),
        r##"valid phone digit (0-9, "*", "#", "!" or ".")"##
    );
    assert!(accepts("timehhmmss", "23:59:60"));
    assert_eq!(message("timehhmmss", "24:00:00"), "valid time (HH:MM:SS)");
    assert!(accepts("dateyyyymmdd", "2024-02-29"));
    assert!(!accepts("dateyyyymmdd", "2023-02-29"));
    assert!(!accepts("dateyyyymmdd", "2014-01-01"));
    assert!(accepts("hexstring", "deadBEEF"));
    assert_eq!(message("hexstring", "abc"), "hexadecimal encoded value");
    assert!(accepts("string('x')", "x"));
    assert_eq!(message("string('x')", "y"), r#"string: "x""#);
    assert!(accepts("file", "anything"));
}

#[test]
fn test_tuple() {
    assert!(accepts("tuple(uinteger, hostname)", "5 host"));
    assert_eq!(
        message("tuple(uinteger, hostname)", "5"),
        "uinteger hostname; 2 tokens separated by whitespace"
    );
    assert!(accepts("tuple(uinteger, uinteger, sep(','))", "1, 2"));
    assert_eq!(
        message("tuple(uinteger, uinteger, sep(','))", "1,x"),
        "positive integer value"
    );
    assert_eq!(
        message("tuple(uinteger, uinteger, sep(','))", "1"),
        r#"uinteger,uinteger; 2 tokens separated by ",""#
    );
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn test_and_accepts_closed_range() {
    let expr = "and(min(5), max(10))";
    assert!(!accepts(expr, "4"));
    assert!(accepts(expr, "5"));
    assert!(accepts(expr, "10"));
    assert_eq!(message(expr, "11"), "value smaller or equal to 10");
}

#[test]
fn test_or_literals() {
    let expr = "or('a', 'b')";
    assert!(accepts(expr, "a"));
    assert!(accepts(expr, "b"));
    assert_eq!(
        message(expr, "c"),
        "One of the following: \n - \"a\"\n - \"b\""
    );
}

#[test]
fn test_or_mixes_calls_and_literals() {
    let expr = "or(port, 'auto')";
    assert!(accepts(expr, "auto"));
    assert!(accepts(expr, "8080"));
    assert_eq!(
        message(expr, "x"),
        "One of the following: \n - valid port value\n - \"auto\""
    );
}

#[test]
fn test_number_literal_compares_loosely() {
    assert!(accepts("or(0, 'off')", "0"));
    assert!(accepts("or(0, 'off')", " 0 "));
    assert!(!accepts("or(0, 'off')", "zero"));
}

#[test]
fn test_neg() {
    assert!(accepts("neg(ipaddr)", "!10.0.0.1"));
    assert!(accepts("neg(ipaddr)", "10.0.0.1"));
    assert_eq!(
        message("neg(ipaddr)", "! foo"),
        "Potential negation of: valid IP address or prefix"
    );
}

#[test]
fn test_list() {
    assert!(accepts("list(uinteger)", "1 2 3"));
    assert_eq!(message("list(uinteger)", "1 -2 3"), "positive integer value");
    assert!(accepts("list(neg(ipaddr))", "!10.0.0.1 fe80::1"));
}

static LIST_SPY_CALLS: AtomicUsize = AtomicUsize::new(0);

fn counting_uinteger(cx: &mut Context<'_>, _args: &[Arg]) -> bool {
    LIST_SPY_CALLS.fetch_add(1, Ordering::SeqCst);
    let ok = parse_integer(cx.value()) >= 0.0;
    cx.assert(ok, "positive integer value")
}

#[test]
fn test_list_stops_at_first_invalid_token() {
    let types = TypeTable::new().with("counting", counting_uinteger);

    let (valid, _) = run_with(types.clone(), "list(counting)", "1 2 3", false);
    assert!(valid);
    assert_eq!(LIST_SPY_CALLS.swap(0, Ordering::SeqCst), 3);

    let (valid, error) = run_with(types, "list(counting)", "1 -2 3", false);
    assert!(!valid);
    assert_eq!(error.as_deref(), Some("positive integer value"));
    assert_eq!(LIST_SPY_CALLS.load(Ordering::SeqCst), 2);
}

#[test]
fn test_list_marks_field() {
    let mut doc = form_with("1 2");
    let field = doc.element_by_id("field").unwrap();
    let mut validator =
        Validator::new(&doc, field, "list(uinteger)", false, Arc::new(TypeTable::new())).unwrap();
    validator.validate(&mut doc);
    assert_eq!(doc[field].get_data("is-list"), Some("true"));
}

#[test]
fn test_unique_within_section() {
    let option = |name: &str, value: &str, id: &str| {
        Element::div()
            .data("widget", "CBI.DynamicList")
            .data("name", name)
            .child(Element::input(value).id(id).data("type", "unique"))
    };
    let mut doc = Document::new(
        Element::form().id("form").child(
            Element::section()
                .child(option("dns", "8.8.8.8", "a"))
                .child(option("dns", "1.1.1.1", "b"))
                .child(option("other", "9.9.9.9", "c")),
        ),
    );
    let a = doc.element_by_id("a").unwrap();
    let types = Arc::new(TypeTable::new());
    let mut validator = Validator::new(&doc, a, "unique(ipaddr)", false, types).unwrap();

    assert!(validator.validate(&mut doc));

    doc.set_value(a, "1.1.1.1");
    assert!(!validator.validate(&mut doc));
    assert_eq!(validator.state().error.as_deref(), Some("unique value"));

    // Only the same widget/name pair counts
    doc.set_value(a, "9.9.9.9");
    assert!(validator.validate(&mut doc));

    doc.set_value(a, "not-an-ip");
    assert!(!validator.validate(&mut doc));
}

// ============================================================================
// Validate flow
// ============================================================================

static OPTIONAL_SPY_CALLS: AtomicUsize = AtomicUsize::new(0);

fn optional_spy(cx: &mut Context<'_>, _args: &[Arg]) -> bool {
    OPTIONAL_SPY_CALLS.fetch_add(1, Ordering::SeqCst);
    cx.pass()
}

#[test]
fn test_optional_empty_skips_expression() {
    let types = TypeTable::new().with("spy", optional_spy);

    let (valid, error) = run_with(types.clone(), "spy", "", true);
    assert!(valid);
    assert_eq!(error, None);

    let (valid, error) = run_with(types, "spy", "", false);
    assert!(!valid);
    assert_eq!(error.as_deref(), Some("non-empty value"));

    assert_eq!(OPTIONAL_SPY_CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn test_hostname_with_min_length() {
    let expr = r#"and(minlength(3), hostname("strict"))"#;
    assert_eq!(message(expr, "ab"), "value with at least 3 characters");
    assert_eq!(message(expr, "_abc"), "valid hostname");
    assert!(accepts(expr, "abc.lan"));
}

#[test]
fn test_failure_marks_field_and_dispatches() {
    let mut doc = form_with("abc");
    let field = doc.element_by_id("field").unwrap();
    let mut validator =
        Validator::new(&doc, field, "uinteger", false, Arc::new(TypeTable::new())).unwrap();

    assert!(!validator.validate(&mut doc));
    assert!(doc[field].has_class(INVALID_CLASS));
    assert_eq!(
        doc[field].get_data("tooltip"),
        Some("Expecting: positive integer value")
    );
    assert_eq!(doc[field].get_data("tooltip-style"), Some("error"));
    assert_eq!(
        doc.take_notifications(),
        vec![Notification::ValidationFailure {
            target: "field".into(),
            message: "Expecting: positive integer value".into(),
        }]
    );

    doc.set_value(field, "12");
    assert!(validator.validate(&mut doc));
    assert!(!doc[field].has_class(INVALID_CLASS));
    assert_eq!(doc[field].get_data("tooltip"), None);
    assert_eq!(
        doc.take_notifications(),
        vec![Notification::ValidationSuccess {
            target: "field".into()
        }]
    );
}

#[test]
fn test_detached_field_is_skipped() {
    let mut doc = form_with("abc");
    let field = doc.element_by_id("field").unwrap();
    let mut validator =
        Validator::new(&doc, field, "uinteger", false, Arc::new(TypeTable::new())).unwrap();

    doc.remove_child(field);
    assert!(validator.validate(&mut doc));
    assert!(doc.notifications().is_empty());
}

#[test]
fn test_host_checks_run_after_type() {
    let mut doc = form_with("22");
    let field = doc.element_by_id("field").unwrap();
    let mut validator =
        Validator::new(&doc, field, "port", false, Arc::new(TypeTable::new()))
            .unwrap()
            .check(|v| {
                if v == "22" {
                    Err("port 22 is reserved".to_string())
                } else {
                    Ok(())
                }
            });

    assert!(!validator.validate(&mut doc));
    assert_eq!(doc[field].get_data("tooltip"), Some("port 22 is reserved"));
    assert!(doc[field].has_class(INVALID_CLASS));

    doc.set_value(field, "2222");
    assert!(validator.validate(&mut doc));
}

use cbidom::{Document, Element, Event, InputType, Notification, Tag};

fn sample() -> Document {
    Document::new(
        Element::form().id("form").child(
            Element::section()
                .id("section")
                .child(Element::input("eth0").id("ifname").name("cbid.network.lan.ifname"))
                .child(
                    Element::select()
                        .id("proto")
                        .child(Element::option("static"))
                        .child(Element::option("dhcp").selected(true)),
                )
                .child(Element::radio("a").id("r1").name("mode").checked(true))
                .child(Element::radio("b").id("r2").name("mode")),
        ),
    )
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_element_by_id_and_name_query() {
    let doc = sample();
    let ifname = doc.element_by_id("ifname").unwrap();
    assert_eq!(doc[ifname].tag, Tag::Input(InputType::Text));
    assert_eq!(doc.query_fields("cbid.network.lan.ifname"), vec![ifname]);
    assert_eq!(doc.query_fields("ifname"), vec![ifname]);
    assert_eq!(doc.query_fields("mode").len(), 2);
}

#[test]
fn test_select_value_from_selected_option() {
    let doc = sample();
    let proto = doc.element_by_id("proto").unwrap();
    assert_eq!(doc.field_value(proto), "dhcp");
    assert_eq!(doc.options(proto).len(), 2);
}

#[test]
fn test_set_value_on_select_updates_options() {
    let mut doc = sample();
    let proto = doc.element_by_id("proto").unwrap();
    doc.set_value(proto, "static");

    let options = doc.options(proto);
    assert!(doc[options[0]].selected);
    assert!(!doc[options[1]].selected);
    assert_eq!(doc.field_value(proto), "static");
}

#[test]
fn test_checking_radio_unchecks_group() {
    let mut doc = sample();
    let r1 = doc.element_by_id("r1").unwrap();
    let r2 = doc.element_by_id("r2").unwrap();

    doc.set_checked(r2, true);
    assert!(!doc[r1].checked);
    assert!(doc[r2].checked);
}

// ============================================================================
// Attach / Detach
// ============================================================================

#[test]
fn test_detached_node_not_found_by_id() {
    let mut doc = sample();
    let ifname = doc.element_by_id("ifname").unwrap();

    assert!(doc.remove_child(ifname));
    assert!(!doc.is_attached(ifname));
    assert_eq!(doc.element_by_id("ifname"), None);
    assert_eq!(doc.node_by_id("ifname"), Some(ifname));
    assert!(doc.query_fields("ifname").is_empty());

    // Already detached
    assert!(!doc.remove_child(ifname));
}

#[test]
fn test_insert_before_and_append() {
    let mut doc = sample();
    let section = doc.element_by_id("section").unwrap();
    let proto = doc.element_by_id("proto").unwrap();
    let ifname = doc.element_by_id("ifname").unwrap();

    doc.remove_child(ifname);
    doc.insert_before(section, ifname, Some(proto));
    assert_eq!(doc.children(section)[0], ifname);

    doc.append_child(section, ifname);
    assert_eq!(doc.children(section).last(), Some(&ifname));
    assert!(doc.is_attached(ifname));
}

#[test]
fn test_insert_into_own_subtree_is_refused() {
    let mut doc = sample();
    let form = doc.element_by_id("form").unwrap();
    let section = doc.element_by_id("section").unwrap();

    doc.append_child(section, form);
    assert_eq!(doc.parent(section), Some(form));
}

#[test]
fn test_find_parent_includes_self() {
    let doc = sample();
    let ifname = doc.element_by_id("ifname").unwrap();
    let section = doc.element_by_id("section").unwrap();

    assert_eq!(doc.find_parent(ifname, |n| n.has_class("cbi-section")), Some(section));
    assert_eq!(doc.find_parent(section, |n| n.has_class("cbi-section")), Some(section));
    assert_eq!(doc.find_parent(ifname, |n| n.has_class("missing")), None);
}

#[test]
fn test_query_data_only_sees_attached() {
    let mut doc = Document::new(
        Element::div()
            .id("root")
            .child(Element::input("").id("a").data("type", "uinteger"))
            .child(Element::input("").id("b").data("type", "port")),
    );
    let b = doc.element_by_id("b").unwrap();
    assert_eq!(doc.query_data("type").len(), 2);

    doc.remove_child(b);
    assert_eq!(doc.query_data("type").len(), 1);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn test_event_names() {
    assert_eq!(Event::from_name("blur", "x"), Event::Blur { target: "x".into() });
    let custom = Event::from_name("cbi-dropdown-change", "x");
    assert_eq!(custom.name(), "cbi-dropdown-change");
    assert_eq!(custom.target(), "x");
}

#[test]
fn test_notifications_drain() {
    let mut doc = sample();
    doc.dispatch(Notification::DependencyUpdate {
        target: "section".into(),
    });
    assert_eq!(doc.notifications().len(), 1);

    let drained = doc.take_notifications();
    assert_eq!(drained[0].name(), "dependency-update");
    assert!(doc.notifications().is_empty());
}

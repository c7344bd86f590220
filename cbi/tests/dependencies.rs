use cbi::depends::{
    DependencyClause, DependencyRegistry, Expected, LAST_VALUE_CLASS, TabRegistry, check,
    check_value, field_value, update,
};
use cbidom::{Document, Element, Notification};

fn clauses(json: &str) -> Vec<DependencyClause> {
    serde_json::from_str(json).unwrap()
}

fn fields(a: &str, b: &str) -> Document {
    Document::new(
        Element::form()
            .id("form")
            .child(Element::input(a).id("a"))
            .child(Element::input(b).id("b")),
    )
}

fn children_ids(doc: &Document, parent: &str) -> Vec<String> {
    let parent = doc.element_by_id(parent).unwrap();
    doc.children(parent)
        .iter()
        .map(|&c| doc[c].id.clone())
        .collect()
}

// ============================================================================
// Field values
// ============================================================================

#[test]
fn test_value_by_id_or_name() {
    let doc = Document::new(
        Element::form()
            .id("form")
            .child(Element::input("eth0").id("cbid.lan.ifname").name("ifname")),
    );
    assert_eq!(field_value(&doc, "cbid.lan.ifname"), "eth0");
    assert_eq!(field_value(&doc, "ifname"), "eth0");
    assert_eq!(field_value(&doc, "missing"), "");
}

#[test]
fn test_unchecked_inputs_do_not_contribute() {
    let mut doc = Document::new(
        Element::form()
            .id("form")
            .child(Element::checkbox("1").id("enabled").name("enabled"))
            .child(Element::radio("ap").id("m1").name("mode"))
            .child(Element::radio("sta").id("m2").name("mode").checked(true)),
    );
    assert_eq!(field_value(&doc, "enabled"), "");
    assert_eq!(field_value(&doc, "mode"), "sta");

    let enabled = doc.element_by_id("enabled").unwrap();
    doc.set_checked(enabled, true);
    assert!(check_value(&doc, "enabled", &Expected::Value("1".into())));
    assert!(!check_value(&doc, "enabled", &Expected::Unsatisfiable));
}

#[test]
fn test_detached_fields_read_as_empty() {
    let mut doc = fields("x", "y");
    let a = doc.element_by_id("a").unwrap();
    doc.remove_child(a);
    assert_eq!(field_value(&doc, "a"), "");
    assert!(check(&doc, &clauses(r#"[{"a": ""}]"#)));
}

// ============================================================================
// Clause evaluation
// ============================================================================

#[test]
fn test_clauses_or_of_and() {
    let c = clauses(r#"[{"a": "x", "b": "y"}]"#);
    assert!(check(&fields("x", "y"), &c));
    assert!(!check(&fields("x", "n"), &c));
    assert!(!check(&fields("n", "y"), &c));

    let c = clauses(r#"[{"a": "x"}, {"b": "y"}]"#);
    assert!(check(&fields("x", "n"), &c));
    assert!(check(&fields("n", "y"), &c));
    assert!(!check(&fields("n", "n"), &c));
}

#[test]
fn test_reverse_quadrants() {
    let c = clauses(r#"[{"a": "x"}, {"b": "y", "!reverse": true}]"#);
    assert!(check(&fields("x", "y"), &c));
    assert!(check(&fields("x", "n"), &c));
    assert!(!check(&fields("n", "y"), &c));
    assert!(check(&fields("n", "n"), &c));
}

#[test]
fn test_default_only_without_match() {
    let with_default = clauses(r#"[{"a": "x", "!reverse": true}, {"!default": true}]"#);
    let without_default = clauses(r#"[{"a": "x", "!reverse": true}]"#);

    // 'a' is x: the reversed clause does not match, the fallback applies
    assert!(check(&fields("x", ""), &with_default));
    assert!(!check(&fields("x", ""), &without_default));

    // 'a' is not x: the reversed clause matches on its own
    assert!(check(&fields("n", ""), &without_default));

    assert!(check(&fields("", ""), &clauses(r#"[{"!default": true}]"#)));
}

#[test]
fn test_numbers_and_malformed_values() {
    assert!(check(&fields("1500", ""), &clauses(r#"[{"a": 1500}]"#)));
    assert!(!check(&fields("1500", ""), &clauses(r#"[{"a": [1500]}]"#)));
    assert!(!check(&fields("", ""), &clauses(r#"["a"]"#)));
}

#[test]
fn test_builder_clause() {
    let c = vec![DependencyClause::new().require("a", "x").reverse()];
    assert!(!check(&fields("x", ""), &c));
    assert!(check(&fields("z", ""), &c));
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_prepends_and_merges() {
    let doc = Document::new(
        Element::form()
            .id("form")
            .child(Element::div().id("row1"))
            .child(Element::div().id("row2")),
    );
    let mut registry = DependencyRegistry::new();

    assert!(registry.add(&doc, "row1", DependencyClause::new().require("a", "1"), 1));
    assert!(registry.add(&doc, "row2", DependencyClause::new().require("a", "2"), 2));
    assert!(registry.add(&doc, "row1", DependencyClause::new().require("a", "3"), 1));
    assert!(!registry.add(&doc, "missing", DependencyClause::new(), 3));

    let ids: Vec<&str> = registry.entries().iter().map(|e| e.field_id.as_str()).collect();
    assert_eq!(ids, vec!["row2", "row1"]);
    assert_eq!(registry.get("row1").unwrap().clauses.len(), 2);
    assert_eq!(registry.get("row1").unwrap().parent_id.as_deref(), Some("form"));
}

// ============================================================================
// Visibility updates
// ============================================================================

/// A chain: row-b shows when `a` is "on", row-c when `b` is "go".
fn chain() -> (Document, DependencyRegistry) {
    let doc = Document::new(
        Element::form().id("form").child(
            Element::section()
                .id("section")
                .child(
                    Element::div().id("row-a").data("index", "1").child(
                        Element::select()
                            .id("a")
                            .child(Element::option("off"))
                            .child(Element::option("on")),
                    ),
                )
                .child(
                    Element::div()
                        .id("row-b")
                        .data("index", "2")
                        .child(Element::input("go").id("b")),
                )
                .child(
                    Element::div()
                        .id("row-c")
                        .data("index", "3")
                        .child(Element::input("").id("c")),
                ),
        ),
    );
    let mut registry = DependencyRegistry::new();
    registry.add(&doc, "row-b", DependencyClause::new().require("a", "on"), 2);
    registry.add(&doc, "row-c", DependencyClause::new().require("b", "go"), 3);
    (doc, registry)
}

#[test]
fn test_update_reaches_fixed_point() {
    let (mut doc, registry) = chain();
    let tabs = TabRegistry::new();

    let report = update(&mut doc, &registry, &tabs, 100);
    assert!(report.converged);
    assert_eq!(children_ids(&doc, "section"), vec!["row-a"]);
    assert!(report.detached.contains(&"row-b".to_string()));
    assert!(report.detached.contains(&"row-c".to_string()));

    let a = doc.node_by_id("a").unwrap();
    doc.set_value(a, "on");
    let report = update(&mut doc, &registry, &tabs, 100);

    assert!(report.converged);
    assert_eq!(report.passes, 3);
    assert_eq!(report.attached, vec!["row-b".to_string(), "row-c".to_string()]);
    assert_eq!(children_ids(&doc, "section"), vec!["row-a", "row-b", "row-c"]);

    // A further update changes nothing
    let report = update(&mut doc, &registry, &tabs, 100);
    assert_eq!(report.passes, 1);
    assert!(!report.changed());
}

#[test]
fn test_update_retags_and_notifies_parent() {
    let (mut doc, registry) = chain();
    let tabs = TabRegistry::new();

    update(&mut doc, &registry, &tabs, 100);
    let row_a = doc.element_by_id("row-a").unwrap();
    assert!(doc[row_a].has_class(LAST_VALUE_CLASS));
    assert_eq!(
        doc.take_notifications(),
        vec![Notification::DependencyUpdate {
            target: "section".into()
        }]
    );

    let a = doc.node_by_id("a").unwrap();
    doc.set_value(a, "on");
    update(&mut doc, &registry, &tabs, 100);

    let row_c = doc.element_by_id("row-c").unwrap();
    assert!(!doc[row_a].has_class(LAST_VALUE_CLASS));
    assert!(doc[row_c].has_class(LAST_VALUE_CLASS));
}

#[test]
fn test_reveal_keeps_declared_order() {
    let row = |id: &str, index: &str| Element::div().id(id).data("index", index);
    let mut doc = Document::new(
        Element::form().id("form").child(
            Element::section()
                .id("section")
                .child(
                    row("row1", "1")
                        .child(Element::checkbox("1").id("cb2"))
                        .child(Element::checkbox("1").id("cb3")),
                )
                .child(row("row2", "2"))
                .child(row("row3", "3"))
                .child(row("row4", "4")),
        ),
    );
    let mut registry = DependencyRegistry::new();
    registry.add(&doc, "row2", DependencyClause::new().require("cb2", "1"), 2);
    registry.add(&doc, "row3", DependencyClause::new().require("cb3", "1"), 3);
    let tabs = TabRegistry::new();

    update(&mut doc, &registry, &tabs, 100);
    assert_eq!(children_ids(&doc, "section"), vec!["row1", "row4"]);

    let cb3 = doc.element_by_id("cb3").unwrap();
    doc.set_checked(cb3, true);
    update(&mut doc, &registry, &tabs, 100);
    assert_eq!(children_ids(&doc, "section"), vec!["row1", "row3", "row4"]);

    let cb2 = doc.element_by_id("cb2").unwrap();
    doc.set_checked(cb2, true);
    update(&mut doc, &registry, &tabs, 100);
    assert_eq!(
        children_ids(&doc, "section"),
        vec!["row1", "row2", "row3", "row4"]
    );
}

#[test]
fn test_reveal_uses_registered_index() {
    let mut doc = Document::new(
        Element::form()
            .id("form")
            .child(
                Element::div()
                    .id("controls")
                    .child(Element::checkbox("1").id("t1"))
                    .child(Element::checkbox("1").id("t2"))
                    .child(Element::checkbox("1").id("t3")),
            )
            .child(
                Element::section()
                    .id("section")
                    .child(Element::div().id("r1"))
                    .child(Element::div().id("r2"))
                    .child(Element::div().id("r3")),
            ),
    );
    let mut registry = DependencyRegistry::new();
    for n in 1..=3 {
        let clause = DependencyClause::new().require(format!("t{n}"), "1");
        assert!(registry.add(&doc, &format!("r{n}"), clause, n));
    }
    let tabs = TabRegistry::new();

    update(&mut doc, &registry, &tabs, 100);
    assert!(children_ids(&doc, "section").is_empty());

    for (toggle, expected) in [
        ("t3", vec!["r3"]),
        ("t2", vec!["r2", "r3"]),
        ("t1", vec!["r1", "r2", "r3"]),
    ] {
        let node = doc.element_by_id(toggle).unwrap();
        doc.set_checked(node, true);
        update(&mut doc, &registry, &tabs, 100);
        assert_eq!(children_ids(&doc, "section"), expected);
    }
}

#[test]
fn test_optionals_wrapper_hidden_when_empty() {
    let mut doc = Document::new(
        Element::form()
            .id("form")
            .child(
                Element::select()
                    .id("proto")
                    .child(Element::option("static"))
                    .child(Element::option("dhcp")),
            )
            .child(
                Element::div().id("wrap").child(
                    Element::select()
                        .id("opts")
                        .data("optionals", "true")
                        .child(Element::option("").id("placeholder"))
                        .child(Element::option("mtu").id("opt-mtu").data("index", "1")),
                ),
            ),
    );
    let mut registry = DependencyRegistry::new();
    registry.add(&doc, "opt-mtu", DependencyClause::new().require("proto", "static"), 1);
    let tabs = TabRegistry::new();

    update(&mut doc, &registry, &tabs, 100);
    let wrap = doc.element_by_id("wrap").unwrap();
    assert!(!doc[wrap].hidden);

    let proto = doc.element_by_id("proto").unwrap();
    doc.set_value(proto, "dhcp");
    update(&mut doc, &registry, &tabs, 100);
    assert!(doc[wrap].hidden);
    assert_eq!(doc.element_by_id("opt-mtu"), None);

    doc.set_value(proto, "static");
    update(&mut doc, &registry, &tabs, 100);
    assert!(!doc[wrap].hidden);
    assert_eq!(children_ids(&doc, "opts"), vec!["placeholder", "opt-mtu"]);
}

#[test]
fn test_oscillation_hits_pass_limit() {
    // The row is visible only while its own field is absent
    let mut doc = Document::new(
        Element::form().id("form").child(
            Element::div()
                .id("row")
                .data("index", "1")
                .child(Element::input("v").id("x")),
        ),
    );
    let mut registry = DependencyRegistry::new();
    registry.add(&doc, "row", DependencyClause::new().require("x", ""), 1);

    let report = update(&mut doc, &registry, &TabRegistry::new(), 4);
    assert!(!report.converged);
    assert_eq!(report.passes, 4);
}

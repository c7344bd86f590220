//! Dependency evaluation and the visibility reconciler.

use cbidom::{Document, NodeId, Notification, Tag};
use log::{debug, trace, warn};

use super::clause::{Constraint, DependencyClause, Expected};
use super::registry::{DependencyEntry, DependencyRegistry};
use super::tabs::TabRegistry;
use crate::coerce::parse_int_prefix;

/// Class marking the last visible row of a container.
pub const LAST_VALUE_CLASS: &str = "cbi-value-last";

/// Current value of the field `target` as seen by dependencies.
///
/// The first attached input or select whose id or name is `target` wins;
/// unchecked checkboxes and radios are skipped. Empty when nothing matches.
pub fn field_value<'d>(doc: &'d Document, target: &str) -> &'d str {
    doc.query_fields(target)
        .into_iter()
        .find(|&n| {
            let node = &doc[n];
            !node.input_type().is_some_and(|t| t.is_checkable()) || node.checked
        })
        .map_or("", |n| doc.field_value(n))
}

/// Whether `target` currently holds `expected`.
pub fn check_value(doc: &Document, target: &str, expected: &Expected) -> bool {
    match expected {
        Expected::Value(value) => field_value(doc, target) == value,
        Expected::Unsatisfiable => false,
    }
}

fn check_constraint(doc: &Document, constraint: &Constraint) -> bool {
    check_value(doc, &constraint.field, &constraint.expected)
}

/// Evaluate a field's clauses: true when any clause matches, otherwise
/// whether a `!default` clause was present.
pub fn check(doc: &Document, clauses: &[DependencyClause]) -> bool {
    let mut fallback = false;
    for clause in clauses {
        if clause.malformed {
            continue;
        }
        if clause.default {
            fallback = true;
        }
        let matched =
            !clause.default && clause.constraints.iter().all(|c| check_constraint(doc, c));
        if matched != clause.reverse {
            return true;
        }
    }
    fallback
}

/// Move the last-row class to the last `div` child of `container`.
pub fn tag_last(doc: &mut Document, container: NodeId) {
    let rows: Vec<NodeId> = doc
        .children(container)
        .iter()
        .copied()
        .filter(|&c| doc[c].tag == Tag::Div)
        .collect();
    for &row in &rows {
        doc[row].remove_class(LAST_VALUE_CLASS);
    }
    if let Some(&last) = rows.last() {
        doc[last].add_class(LAST_VALUE_CLASS);
    }
}

/// Outcome of [`update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Passes run, including the final pass that changed nothing.
    pub passes: usize,
    /// Field ids attached during this update, in order.
    pub attached: Vec<String>,
    /// Field ids detached during this update, in order.
    pub detached: Vec<String>,
    /// False when the pass limit stopped the update.
    pub converged: bool,
}

impl UpdateReport {
    pub fn changed(&self) -> bool {
        !self.attached.is_empty() || !self.detached.is_empty()
    }
}

/// Attach and detach dependency-managed fields until their visibility is
/// stable.
///
/// Each pass walks the registry once. Revealing one field can satisfy
/// another's condition, so passes repeat until one makes no change, or
/// until `pass_limit` passes have run. Every container that gained or lost
/// a field is retagged and notified afterwards.
pub fn update(
    doc: &mut Document,
    registry: &DependencyRegistry,
    tabs: &TabRegistry,
    pass_limit: usize,
) -> UpdateReport {
    let mut report = UpdateReport {
        converged: true,
        ..Default::default()
    };
    let mut touched: Vec<NodeId> = Vec::new();

    loop {
        report.passes += 1;
        let changed = reconcile(doc, registry, &mut report, &mut touched);
        if !changed {
            break;
        }
        if report.passes >= pass_limit {
            warn!(
                "dependency update did not settle after {} passes",
                report.passes
            );
            report.converged = false;
            break;
        }
    }

    if !tabs.is_empty() {
        tabs.update(doc);
    }
    for &parent in &touched {
        tag_last(doc, parent);
        let target = doc[parent].id.clone();
        doc.dispatch(Notification::DependencyUpdate { target });
    }

    debug!(
        "dependency update: {} pass(es), {} attached, {} detached",
        report.passes,
        report.attached.len(),
        report.detached.len()
    );
    report
}

/// One pass over the registry. Returns whether anything moved.
fn reconcile(
    doc: &mut Document,
    registry: &DependencyRegistry,
    report: &mut UpdateReport,
    touched: &mut Vec<NodeId>,
) -> bool {
    let mut changed = false;

    for entry in registry.entries() {
        let node = doc.element_by_id(&entry.field_id);
        let parent = entry
            .parent_id
            .as_deref()
            .and_then(|id| doc.element_by_id(id));
        let visible = check(doc, &entry.clauses);

        match node {
            Some(node) if !visible => {
                if let Some(old_parent) = doc.parent(node) {
                    doc.remove_child(node);
                    trace!("hide '{}'", entry.field_id);
                    mark(touched, old_parent);
                    report.detached.push(entry.field_id.clone());
                    changed = true;
                }
            }
            None if visible => {
                if let Some(parent) = parent {
                    reveal(doc, registry, entry, parent);
                    trace!("show '{}'", entry.field_id);
                    mark(touched, parent);
                    report.attached.push(entry.field_id.clone());
                    changed = true;
                }
            }
            _ => {}
        }

        if let Some(parent) = parent {
            update_optionals(doc, parent);
        }
    }

    changed
}

/// Insert the entry's node before the first sibling declared after it.
///
/// A sibling's position is the index it was registered with, or its
/// `data-index` when the registry does not manage it.
fn reveal(
    doc: &mut Document,
    registry: &DependencyRegistry,
    entry: &DependencyEntry,
    parent: NodeId,
) {
    let next = doc.children(parent).iter().copied().find(|&c| {
        registry
            .index_of(c)
            .or_else(|| doc[c].get_data("index").and_then(parse_int_prefix))
            .is_some_and(|index| index > entry.index)
    });
    doc.insert_before(parent, entry.node, next);
}

/// A `data-optionals` select with only its placeholder option left hides
/// its wrapper.
fn update_optionals(doc: &mut Document, parent: NodeId) {
    let flagged = doc[parent]
        .get_data("optionals")
        .is_some_and(|v| !v.is_empty());
    if !flagged {
        return;
    }
    if let Some(wrapper) = doc.parent(parent) {
        let sparse = doc.options(parent).len() <= 1;
        doc.set_hidden(wrapper, sparse);
    }
}

fn mark(touched: &mut Vec<NodeId>, parent: NodeId) {
    if !touched.contains(&parent) {
        touched.push(parent);
    }
}

use cbidom::{Document, NodeId};
use log::{debug, trace};

use super::engine::tag_last;

pub const TAB_ACTIVE_CLASS: &str = "cbi-tab";
pub const TAB_DISABLED_CLASS: &str = "cbi-tab-disabled";
pub const TAB_HIGHLIGHT_CLASS: &str = "cbi-tab-highlighted";

#[derive(Debug, Clone)]
struct Tab {
    name: String,
    tab: NodeId,
    container: NodeId,
}

#[derive(Debug, Clone)]
struct TabSection {
    name: String,
    tabs: Vec<Tab>,
}

/// Tabbed sections and their content containers.
///
/// A tab `<tab>` of section `<section>` is the element `tab.<section>.<tab>`
/// with its fields inside `container.<section>.<tab>`.
#[derive(Debug, Clone, Default)]
pub struct TabRegistry {
    sections: Vec<TabSection>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tab. Both the tab and its container must be attached.
    pub fn add(&mut self, doc: &Document, section: &str, tab: &str) -> bool {
        let tab_node = doc.element_by_id(&format!("tab.{section}.{tab}"));
        let container = doc.element_by_id(&format!("container.{section}.{tab}"));
        let (Some(tab_node), Some(container)) = (tab_node, container) else {
            debug!("tab '{section}.{tab}' has no tab or container element");
            return false;
        };

        let entry = Tab {
            name: tab.to_string(),
            tab: tab_node,
            container,
        };
        match self.sections.iter_mut().find(|s| s.name == section) {
            Some(existing) => existing.tabs.push(entry),
            None => self.sections.push(TabSection {
                name: section.to_string(),
                tabs: vec![entry],
            }),
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Activate `tab` in `section` and deactivate its siblings. The active
    /// tab name is stored in the hidden input `tab.<section>`, if any.
    pub fn switch(&self, doc: &mut Document, section: &str, tab: &str) -> bool {
        let Some(entry) = self.sections.iter().find(|s| s.name == section) else {
            return false;
        };
        if !entry.tabs.iter().any(|t| t.name == tab) {
            return false;
        }

        for t in &entry.tabs {
            let active = t.name == tab;
            let node = &mut doc[t.tab];
            node.remove_class(TAB_ACTIVE_CLASS);
            node.remove_class(TAB_DISABLED_CLASS);
            node.add_class(if active {
                TAB_ACTIVE_CLASS
            } else {
                TAB_DISABLED_CLASS
            });
            doc.set_hidden(t.container, !active);
        }

        if let Some(input) = doc.element_by_id(&format!("tab.{section}")) {
            doc.set_value(input, tab);
        }
        trace!("switched section '{section}' to tab '{tab}'");
        true
    }

    /// Hide tabs whose container became empty, reveal and highlight tabs
    /// whose container has content again, and retag every container.
    ///
    /// Returns whether any tab is registered.
    pub fn update(&self, doc: &mut Document) -> bool {
        let mut updated = false;
        for t in self.sections.iter().flat_map(|s| &s.tabs) {
            if doc.children(t.container).is_empty() {
                doc.set_hidden(t.tab, true);
            } else if doc[t.tab].hidden {
                doc.set_hidden(t.tab, false);
                doc[t.tab].add_class(TAB_HIGHLIGHT_CLASS);
                debug!("tab '{}' has content again", t.name);
            }
            tag_last(doc, t.container);
            updated = true;
        }
        updated
    }

    /// Remove the highlight added by [`TabRegistry::update`].
    pub fn clear_highlights(&self, doc: &mut Document) {
        for t in self.sections.iter().flat_map(|s| &s.tabs) {
            doc[t.tab].remove_class(TAB_HIGHLIGHT_CLASS);
        }
    }

    /// Names of the tabs of `section` that are currently shown.
    pub fn visible_tabs(&self, doc: &Document, section: &str) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|s| s.name == section)
            .flat_map(|s| &s.tabs)
            .filter(|t| !doc[t.tab].hidden)
            .map(|t| t.name.as_str())
            .collect()
    }
}

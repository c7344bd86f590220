use cbidom::{Document, NodeId};
use log::debug;

use super::clause::DependencyClause;

/// A dependency-managed field.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyEntry {
    pub field_id: String,
    /// Kept so the field can be re-inserted while detached.
    pub node: NodeId,
    /// Id of the container the field lived in when registered.
    pub parent_id: Option<String>,
    pub clauses: Vec<DependencyClause>,
    /// Declared position among the parent's children.
    pub index: i64,
}

/// Ordered collection of dependency entries.
///
/// New entries go to the front; further clauses for a known field are
/// appended to its entry.
#[derive(Debug, Clone, Default)]
pub struct DependencyRegistry {
    entries: Vec<DependencyEntry>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `clause` for the attached element with id `field_id`.
    /// Unknown ids are ignored.
    pub fn add(
        &mut self,
        doc: &Document,
        field_id: &str,
        clause: DependencyClause,
        index: i64,
    ) -> bool {
        match doc.element_by_id(field_id) {
            Some(node) => self.add_node(doc, node, clause, index),
            None => {
                debug!("dependency on unknown element '{field_id}' ignored");
                false
            }
        }
    }

    /// Register `clause` for a node handle.
    pub fn add_node(
        &mut self,
        doc: &Document,
        node: NodeId,
        clause: DependencyClause,
        index: i64,
    ) -> bool {
        let field_id = &doc[node].id;

        if let Some(entry) = self.entries.iter_mut().find(|e| &e.field_id == field_id) {
            entry.clauses.push(clause);
            return true;
        }

        let parent_id = doc.parent(node).map(|p| doc[p].id.clone());
        debug!(
            "dependency entry '{}' (parent {:?}, index {})",
            field_id, parent_id, index
        );
        self.entries.insert(
            0,
            DependencyEntry {
                field_id: field_id.clone(),
                node,
                parent_id,
                clauses: vec![clause],
                index,
            },
        );
        true
    }

    pub fn get(&self, field_id: &str) -> Option<&DependencyEntry> {
        self.entries.iter().find(|e| e.field_id == field_id)
    }

    /// Declared index of the entry managing `node`.
    pub fn index_of(&self, node: NodeId) -> Option<i64> {
        self.entries.iter().find(|e| e.node == node).map(|e| e.index)
    }

    pub fn entries(&self) -> &[DependencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

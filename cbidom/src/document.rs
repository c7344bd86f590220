use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use log::{trace, warn};

use crate::element::{Element, InputType, Tag};
use crate::event::Notification;

/// Handle to a node in a [`Document`]. Handles stay valid for the lifetime of
/// the document, including while the node is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the document arena. Mirrors [`Element`] minus the owned
/// children, plus the tree links.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub tag: Tag,
    pub name: Option<String>,
    pub value: String,
    pub checked: bool,
    pub selected: bool,
    pub classes: Vec<String>,
    pub hidden: bool,
    pub text: Option<String>,
    pub data: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_field(&self) -> bool {
        self.tag.is_field()
    }

    pub fn input_type(&self) -> Option<InputType> {
        match self.tag {
            Tag::Input(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn get_data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn remove_data(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }
}

/// Arena-backed document tree.
///
/// Nodes are never freed: detaching a node only unlinks it from its parent,
/// so it can be re-inserted later with its state intact. Lookups by id
/// ([`Document::element_by_id`]) and field queries only see attached nodes,
/// the same way a browser document does.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    notifications: Vec<Notification>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            notifications: Vec::new(),
        };
        doc.root = doc.insert_tree(root, None);
        doc
    }

    /// Add a detached subtree to the arena.
    pub fn create(&mut self, element: Element) -> NodeId {
        self.insert_tree(element, None)
    }

    fn insert_tree(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let Element {
            id,
            tag,
            name,
            value,
            checked,
            selected,
            classes,
            hidden,
            text,
            data,
            children,
        } = element;

        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            tag,
            name,
            value,
            checked,
            selected,
            classes,
            hidden,
            text,
            data,
            parent,
            children: Vec::new(),
        });

        for child in children {
            let child_id = self.insert_tree(child, Some(node_id));
            self.nodes[node_id.0].children.push(child_id);
        }

        if tag == Tag::Select {
            self.sync_select(node_id);
        }

        node_id
    }

    /// Reconcile a select's value with its options: an explicit value selects
    /// the matching option, otherwise the selected (or first) option provides
    /// the value.
    fn sync_select(&mut self, select: NodeId) {
        let options: Vec<NodeId> = self.options(select);
        if self.nodes[select.0].value.is_empty() {
            let chosen = options
                .iter()
                .copied()
                .find(|&o| self.nodes[o.0].selected)
                .or_else(|| options.first().copied());
            if let Some(option) = chosen {
                self.nodes[select.0].value = self.nodes[option.0].value.clone();
            }
        } else {
            let value = self.nodes[select.0].value.clone();
            for option in options {
                let node = &mut self.nodes[option.0];
                node.selected = node.value == value;
            }
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Find an attached element by its id attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if self.nodes[self.root.0].id == id {
            return Some(self.root);
        }
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.nodes[n.0].id == id)
    }

    /// Find any element by id, attached or not.
    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.id == id).map(NodeId)
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev().copied());
        }
        out
    }

    /// Attached nodes carrying the given data attribute, in document order.
    pub fn query_data(&self, key: &str) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&n| self.nodes[n.0].data.contains_key(key))
            .collect()
    }

    /// Walk from `id` (inclusive) towards the root and return the first node
    /// matching the predicate.
    pub fn find_parent(&self, id: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if pred(node) {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    /// Attached inputs and selects whose id or name equals `target`, in
    /// document order.
    pub fn query_fields(&self, target: &str) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&n| {
                let node = &self.nodes[n.0];
                node.is_field() && (node.id == target || node.name.as_deref() == Some(target))
            })
            .collect()
    }

    /// Option children of a select.
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.nodes[select.0]
            .children
            .iter()
            .copied()
            .filter(|&c| self.nodes[c.0].tag == Tag::Option)
            .collect()
    }

    /// Unlink a node from its parent. Returns false if it had none.
    pub fn remove_child(&mut self, child: NodeId) -> bool {
        let Some(parent) = self.nodes[child.0].parent.take() else {
            return false;
        };
        self.nodes[parent.0].children.retain(|&c| c != child);
        trace!(
            "detached '{}' from '{}'",
            self.nodes[child.0].id,
            self.nodes[parent.0].id
        );
        true
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Insert `child` under `parent` before `reference`, or at the end when
    /// `reference` is `None` or not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if self.is_ancestor_or_self(child, parent) {
            warn!(
                "refusing to insert '{}' into its own subtree",
                self.nodes[child.0].id
            );
            return;
        }

        self.remove_child(child);

        let children = &mut self.nodes[parent.0].children;
        let position = reference.and_then(|r| children.iter().position(|&c| c == r));
        match position {
            Some(pos) => children.insert(pos, child),
            None => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
        trace!(
            "attached '{}' to '{}'",
            self.nodes[child.0].id,
            self.nodes[parent.0].id
        );
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        std::iter::successors(Some(node), |&n| self.nodes[n.0].parent).any(|n| n == ancestor)
    }

    /// Current value of a field: the text for inputs, the selected option's
    /// value for selects.
    pub fn field_value(&self, id: NodeId) -> &str {
        &self.nodes[id.0].value
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        self.nodes[id.0].value = value.into();
        if self.nodes[id.0].tag == Tag::Select {
            self.sync_select(id);
        }
    }

    /// Check or uncheck a checkbox/radio. Checking a radio unchecks the other
    /// attached radios of the same name.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        let node = &self.nodes[id.0];
        if checked && node.input_type() == Some(InputType::Radio) {
            if let Some(name) = node.name.clone() {
                for other in self.query_fields(&name) {
                    if other != id && self.nodes[other.0].input_type() == Some(InputType::Radio) {
                        self.nodes[other.0].checked = false;
                    }
                }
            }
        }
        self.nodes[id.0].checked = checked;
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.nodes[id.0].hidden = hidden;
    }

    /// Queue a notification for the host.
    pub fn dispatch(&mut self, notification: Notification) {
        trace!(
            "dispatch {} on '{}'",
            notification.name(),
            notification.target()
        );
        self.notifications.push(notification);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drain queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Document {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

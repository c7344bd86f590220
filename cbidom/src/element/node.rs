use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{InputType, Tag};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

/// Owned element tree used to describe a document before it is loaded into a
/// [`Document`](crate::Document).
#[derive(Debug, Clone)]
pub struct Element {
    // Identity
    pub id: String,
    pub tag: Tag,
    pub name: Option<String>,

    // Form state
    pub value: String,
    pub checked: bool,
    pub selected: bool,

    // Visual
    pub classes: Vec<String>,
    pub hidden: bool,
    pub text: Option<String>,

    /// `data-*` attributes, keyed without the `data-` prefix.
    pub data: HashMap<String, String>,

    pub children: Vec<Element>,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            id: generate_id("el"),
            tag: Tag::Div,
            name: None,
            value: String::new(),
            checked: false,
            selected: false,
            classes: Vec::new(),
            hidden: false,
            text: None,
            data: HashMap::new(),
            children: Vec::new(),
        }
    }
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            id: generate_id(tag.name()),
            tag,
            ..Default::default()
        }
    }

    pub fn form() -> Self {
        Self::new(Tag::Form)
    }

    pub fn div() -> Self {
        Self::new(Tag::Div)
    }

    /// A `div.cbi-section`, the scope `unique()` looks for siblings in.
    pub fn section() -> Self {
        Self::new(Tag::Div).class("cbi-section")
    }

    pub fn span() -> Self {
        Self::new(Tag::Span)
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(Tag::Label)
        }
    }

    /// Create a text input element.
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(Tag::Input(InputType::Text))
        }
    }

    pub fn password(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(Tag::Input(InputType::Password))
        }
    }

    pub fn hidden_input(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(Tag::Input(InputType::Hidden))
        }
    }

    pub fn checkbox(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(Tag::Input(InputType::Checkbox))
        }
    }

    pub fn radio(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(Tag::Input(InputType::Radio))
        }
    }

    pub fn select() -> Self {
        Self::new(Tag::Select)
    }

    pub fn option(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(Tag::Option)
        }
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // Form state
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    // Visual
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    // Custom data
    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get_data(&self, key: &str) -> Option<&String> {
        self.data.get(key)
    }

    // Children
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(new_children);
        self
    }
}

//! JSON form descriptions.
//!
//! ```json
//! { "tag": "form", "id": "cbi-network", "children": [
//!     { "tag": "input", "id": "mtu", "value": "1500",
//!       "data": { "type": "range(68, 9000)", "optional": "true" } }
//! ] }
//! ```
//!
//! `data` values that are not strings (e.g. a `depends` array) are stored as
//! their JSON text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use cbidom::{Document, Element, InputType, Tag};
use serde::Deserialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementSpec {
    pub tag: String,
    /// Input type for `input` elements, `text` when absent.
    #[serde(default, rename = "type")]
    pub input_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub class: Vec<String>,
    #[serde(default)]
    pub data: HashMap<String, Value>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    pub fn into_element(self) -> Result<Element, CliError> {
        let mut element = match self.tag.as_str() {
            "section" => Element::section(),
            "input" => {
                let kind = match self.input_type.as_deref() {
                    None => InputType::Text,
                    Some(name) => InputType::parse(name)
                        .ok_or_else(|| CliError::UnknownInputType(name.to_string()))?,
                };
                Element::new(Tag::Input(kind))
            }
            other => Element::new(
                Tag::parse(other).ok_or_else(|| CliError::UnknownTag(other.to_string()))?,
            ),
        };

        if let Some(id) = self.id {
            element = element.id(id);
        }
        if let Some(name) = self.name {
            element = element.name(name);
        }
        if let Some(value) = self.value {
            element = element.value(value);
        }
        if let Some(text) = self.text {
            element = element.text(text);
        }
        element = element
            .checked(self.checked)
            .selected(self.selected)
            .hidden(self.hidden);

        for class in self.class {
            element = element.class(class);
        }
        for (key, value) in self.data {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            element = element.data(key, value);
        }

        let children = self
            .children
            .into_iter()
            .map(ElementSpec::into_element)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(element.children(children))
    }
}

pub fn parse_document(json: &str) -> Result<Document, serde_json::Error> {
    let spec: ElementSpec = serde_json::from_str(json)?;
    // Tag errors are reported as JSON errors so callers see one failure kind.
    spec.into_element()
        .map(Document::new)
        .map_err(serde::de::Error::custom)
}

pub fn load_document(path: &Path) -> Result<Document, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&json).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

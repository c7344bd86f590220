pub mod document;
pub mod element;
pub mod event;

pub use document::{Document, Node, NodeId};
pub use element::{Element, InputType, Tag};
pub use event::{Event, Notification};

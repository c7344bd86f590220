mod node;
mod tag;

pub use node::Element;
pub use tag::{InputType, Tag};

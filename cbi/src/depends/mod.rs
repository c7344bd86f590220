//! Field visibility driven by the values of other fields.
//!
//! Each dependency-managed field carries a list of [`DependencyClause`]s.
//! The field is shown when any clause matches, detached from the document
//! otherwise, and re-inserted at its declared position once a clause
//! matches again.

mod clause;
mod engine;
mod registry;
mod tabs;

pub use clause::{Constraint, DependencyClause, Expected};
pub use engine::{LAST_VALUE_CLASS, UpdateReport, check, check_value, field_value, tag_last, update};
pub use registry::{DependencyEntry, DependencyRegistry};
pub use tabs::{TAB_ACTIVE_CLASS, TAB_DISABLED_CLASS, TAB_HIGHLIGHT_CLASS, TabRegistry};

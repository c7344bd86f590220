//! Form field dependencies and validation expressions.
//!
//! [`FormRuntime`] owns a [`cbidom::Document`] and keeps it consistent with
//! the fields' declarations: dependency-managed fields are attached or
//! detached as the values they depend on change, and validated fields are
//! checked against their validator expression on every trigger event.

pub mod coerce;
pub mod config;
pub mod depends;
pub mod error;
pub mod runtime;
pub mod validation;

pub use config::RuntimeConfig;
pub use depends::{DependencyClause, DependencyRegistry, TabRegistry, UpdateReport};
pub use error::{CompileError, RuntimeError};
pub use runtime::{DispatchOutcome, FormRuntime};
pub use validation::{TypeTable, ValidationResult, Validator, ValidatorSpec};

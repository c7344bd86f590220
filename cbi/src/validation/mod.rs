//! Validation expressions for form fields.
//!
//! A field declares its expected value as a small expression, for example
//! `and(minlength(3), hostname("strict"))` or `list(neg(ipaddr))`. The
//! expression is compiled once against a [`TypeTable`] and then evaluated on
//! every trigger.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cbi::validation::{TypeTable, Validator};
//!
//! let types = Arc::new(TypeTable::new());
//! let mut validator = Validator::new(&doc, field, "range(1, 100)", false, types)?;
//! if !validator.validate(&mut doc) {
//!     println!("{:?}", validator.state().error);
//! }
//! ```

mod builtins;
mod compile;
mod net;
mod result;
mod types;
mod validator;

pub use compile::{compile, compile_spec};
pub use net::{parse_decimal, parse_integer, parse_ipv4, parse_ipv6};
pub use result::{FieldError, ValidationResult};
pub use types::{Arg, Builtin, Callee, CustomType, TypeFn, TypeTable, ValidatorSpec};
pub use validator::{Check, Context, INVALID_CLASS, ValidationState, Validator};

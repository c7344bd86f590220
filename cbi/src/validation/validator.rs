//! Per-field validator and the evaluation context validator functions run in.

use std::sync::Arc;

use cbidom::{Document, NodeId, Notification, Tag};
use log::{debug, trace};

use super::builtins;
use super::compile::compile_spec;
use super::types::{Arg, Callee, TypeTable, ValidatorSpec};
use crate::error::CompileError;

/// Class toggled on a field while it holds an invalid value.
pub const INVALID_CLASS: &str = "cbi-input-invalid";

/// Host check run after the type expression passed. `Err` carries the
/// message to show.
pub type Check = Box<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Evaluation context of one validation pass.
///
/// Holds the working value, which combinators may rewrite while they run,
/// and the expectation message of the last assertion.
pub struct Context<'a> {
    value: String,
    error: Option<String>,
    doc: &'a mut Document,
    field: NodeId,
    types: &'a TypeTable,
}

impl<'a> Context<'a> {
    pub fn new(
        doc: &'a mut Document,
        field: NodeId,
        types: &'a TypeTable,
        value: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            error: None,
            doc,
            field,
            types,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Expectation message of the last failed assertion.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    pub fn field(&self) -> NodeId {
        self.field
    }

    pub fn document(&self) -> &Document {
        &*self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut *self.doc
    }

    pub fn types(&self) -> &TypeTable {
        self.types
    }

    /// Record the outcome of a rule. A failure marks the field invalid and
    /// keeps `message`; a success clears both.
    pub fn assert(&mut self, condition: bool, message: impl Into<String>) -> bool {
        if condition {
            self.doc[self.field].remove_class(INVALID_CLASS);
            self.error = None;
        } else {
            self.doc[self.field].add_class(INVALID_CLASS);
            self.error = Some(message.into());
        }
        condition
    }

    pub fn pass(&mut self) -> bool {
        self.assert(true, String::new())
    }

    /// Fail again with the message a nested validator left behind.
    pub fn fail_with_current(&mut self) -> bool {
        let message = self.error.take().unwrap_or_default();
        self.assert(false, message)
    }

    /// Run `callee` with `args`, optionally against `value` instead of the
    /// working value. The working value is restored afterwards.
    pub fn apply(&mut self, callee: Callee, value: Option<&str>, args: &[Arg]) -> bool {
        let saved = value.map(|v| std::mem::replace(&mut self.value, v.to_string()));
        let valid = match callee {
            Callee::Builtin(builtin) => builtins::run(builtin, self, args),
            Callee::Custom(custom) => (custom.func)(self, args),
        };
        if let Some(saved) = saved {
            self.value = saved;
        }
        valid
    }

    /// Run a compiled expression.
    pub fn apply_spec(&mut self, spec: &ValidatorSpec, value: Option<&str>) -> bool {
        self.apply(spec.root, value, &spec.args)
    }

    /// Run a validator by name. Unknown names fail without a message.
    pub fn apply_named(&mut self, name: &str, value: Option<&str>, args: &[Arg]) -> bool {
        match self.types.get(name) {
            Some(callee) => self.apply(callee, value, args),
            None => false,
        }
    }
}

/// Mutable validation state of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    /// Value read on the last pass.
    pub value: String,
    /// Whether an empty value is accepted.
    pub optional: bool,
    /// Expectation message of the last failed pass.
    pub error: Option<String>,
}

/// A compiled validator bound to one field.
pub struct Validator {
    field: NodeId,
    field_id: String,
    spec: ValidatorSpec,
    types: Arc<TypeTable>,
    checks: Vec<Check>,
    state: ValidationState,
}

impl Validator {
    /// Compile `expr` for `field`.
    pub fn new(
        doc: &Document,
        field: NodeId,
        expr: &str,
        optional: bool,
        types: Arc<TypeTable>,
    ) -> Result<Self, CompileError> {
        let spec = compile_spec(expr, &types)?;
        debug!("validator '{}' on '{}'", expr, doc[field].id);
        Ok(Self {
            field,
            field_id: doc[field].id.clone(),
            spec,
            types,
            checks: Vec::new(),
            state: ValidationState {
                optional,
                ..Default::default()
            },
        })
    }

    /// Add a host check that runs after the type expression passed.
    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.push(Box::new(f));
        self
    }

    pub fn push_check(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn field(&self) -> NodeId {
        self.field
    }

    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub fn spec(&self) -> &ValidatorSpec {
        &self.spec
    }

    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    /// Validate the field's current value.
    ///
    /// Fields that are detached or not inside a form are skipped and count
    /// as valid. Otherwise the field's invalid class, tooltip attributes and
    /// the dispatched `validation-*` notification reflect the outcome.
    pub fn validate(&mut self, doc: &mut Document) -> bool {
        let in_form = doc.is_attached(self.field)
            && doc.find_parent(self.field, |n| n.tag == Tag::Form).is_some();
        if !in_form {
            trace!("skipping detached field '{}'", self.field_id);
            return true;
        }

        doc[self.field].remove_class(INVALID_CLASS);
        self.state.value = doc.field_value(self.field).to_string();
        self.state.error = None;

        let types = Arc::clone(&self.types);
        let mut cx = Context::new(doc, self.field, &types, self.state.value.clone());
        let valid = if cx.value().is_empty() {
            cx.assert(self.state.optional, "non-empty value")
        } else {
            cx.apply_spec(&self.spec, None)
        };
        let error = cx.take_error();

        if !valid {
            let error = error.unwrap_or_default();
            let message = format!("Expecting: {error}");
            return self.fail(doc, error, message);
        }

        for check in &self.checks {
            if let Err(message) = check(&self.state.value) {
                return self.fail(doc, message.clone(), message);
            }
        }

        let node = &mut doc[self.field];
        node.remove_data("tooltip");
        node.remove_data("tooltip-style");
        doc.dispatch(Notification::ValidationSuccess {
            target: self.field_id.clone(),
        });
        true
    }

    fn fail(&mut self, doc: &mut Document, error: String, message: String) -> bool {
        trace!("'{}' invalid: {}", self.field_id, message);
        self.state.error = Some(error);
        let node = &mut doc[self.field];
        node.add_class(INVALID_CLASS);
        node.set_data("tooltip", message.clone());
        node.set_data("tooltip-style", "error");
        doc.dispatch(Notification::ValidationFailure {
            target: self.field_id.clone(),
            message,
        });
        false
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("field_id", &self.field_id)
            .field("spec", &self.spec)
            .field("checks", &self.checks.len())
            .field("state", &self.state)
            .finish()
    }
}

//! The form runtime: owns a document and wires validators and dependency
//! updates to host events.

use std::collections::HashSet;
use std::sync::Arc;

use cbidom::{Document, Event, NodeId, Notification, Tag};
use log::{debug, info, warn};

use crate::coerce::parse_int_prefix;
use crate::config::RuntimeConfig;
use crate::depends::{self, DependencyClause, DependencyRegistry, TabRegistry, UpdateReport};
use crate::error::RuntimeError;
use crate::validation::{FieldError, TypeFn, TypeTable, ValidationResult, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Validate(usize),
    UpdateDependencies,
}

#[derive(Debug, Clone)]
struct Binding {
    node: NodeId,
    event: String,
    action: Action,
}

/// What a dispatched event triggered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// `(field id, valid)` for every validator that ran.
    pub validated: Vec<(String, bool)>,
    /// Set when the event triggered a dependency update.
    pub update: Option<UpdateReport>,
}

/// A form document together with its validators, dependency registry and
/// tabs.
///
/// # Example
///
/// ```ignore
/// let mut form = FormRuntime::new(Document::new(root));
/// form.init();
///
/// form.set_value("cbid.network.lan.proto", "static");
/// form.dispatch(&Event::from_name("change", "cbid.network.lan.proto"));
///
/// for notification in form.take_events() {
///     println!("{} on {}", notification.name(), notification.target());
/// }
/// ```
pub struct FormRuntime {
    doc: Document,
    config: RuntimeConfig,
    types: Arc<TypeTable>,
    dependencies: DependencyRegistry,
    tabs: TabRegistry,
    validators: Vec<Validator>,
    bindings: Vec<Binding>,
}

impl FormRuntime {
    pub fn new(doc: Document) -> Self {
        Self::with_config(doc, RuntimeConfig::default())
    }

    pub fn with_config(doc: Document, config: RuntimeConfig) -> Self {
        Self {
            doc,
            config,
            types: Arc::new(TypeTable::default()),
            dependencies: DependencyRegistry::new(),
            tabs: TabRegistry::new(),
            validators: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Use `types` for every validator compiled from now on.
    pub fn with_types(mut self, types: TypeTable) -> Self {
        self.types = Arc::new(types);
        self
    }

    /// Register a custom validator for validators compiled from now on.
    pub fn register_type(&mut self, name: &'static str, func: TypeFn) {
        Arc::make_mut(&mut self.types).register(name, func);
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn dependencies(&self) -> &DependencyRegistry {
        &self.dependencies
    }

    pub fn tabs(&self) -> &TabRegistry {
        &self.tabs
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// The last validator installed for `field_id`.
    pub fn validator(&self, field_id: &str) -> Option<&Validator> {
        self.validators.iter().rev().find(|v| v.field_id() == field_id)
    }

    /// Wire up the document from its data attributes.
    ///
    /// - `data-depends` (JSON array of clauses) with `data-index` registers
    ///   dependencies.
    /// - `data-update` (space separated event names) binds those events to a
    ///   dependency update.
    /// - `data-type` with optional `data-optional="true"` installs a
    ///   validator. Expressions that fail to compile are logged and the
    ///   field stays unvalidated.
    ///
    /// Finishes with a full dependency update.
    pub fn init(&mut self) -> UpdateReport {
        for node in self.doc.query_data("depends") {
            if let Err(e) = self.register_declared_dependencies(node) {
                warn!("{e}");
            }
        }

        for node in self.doc.query_data("update") {
            let events: Vec<String> = self.doc[node]
                .get_data("update")
                .unwrap_or_default()
                .split(' ')
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
            for event in events {
                self.bindings.push(Binding {
                    node,
                    event,
                    action: Action::UpdateDependencies,
                });
            }
        }

        for node in self.doc.query_data("type") {
            let expr = self.doc[node].get_data("type").unwrap_or_default().to_string();
            let optional = self.doc[node].get_data("optional") == Some("true");
            if let Err(e) = self.install_validator(node, &expr, optional) {
                warn!("{e}; field left unvalidated");
            }
        }

        let report = self.update_dependencies();

        let parents: Vec<NodeId> = self
            .dependencies
            .entries()
            .iter()
            .filter_map(|e| e.parent_id.as_deref())
            .filter_map(|id| self.doc.element_by_id(id))
            .collect();
        let mut seen = HashSet::new();
        for parent in parents {
            if seen.insert(parent) {
                depends::tag_last(&mut self.doc, parent);
            }
        }

        info!(
            "form initialized: {} dependency entries, {} validators",
            self.dependencies.len(),
            self.validators.len()
        );
        report
    }

    fn register_declared_dependencies(&mut self, node: NodeId) -> Result<(), RuntimeError> {
        let field = self.doc[node].id.clone();
        let Some(index) = self.doc[node].get_data("index").and_then(parse_int_prefix) else {
            debug!("'{field}' declares dependencies without an index");
            return Ok(());
        };
        let json = self.doc[node].get_data("depends").unwrap_or_default();
        let clauses: Vec<DependencyClause> =
            serde_json::from_str(json).map_err(|source| RuntimeError::Depends {
                field: field.clone(),
                source,
            })?;
        for clause in clauses {
            self.dependencies.add_node(&self.doc, node, clause, index);
        }
        Ok(())
    }

    /// Register a dependency clause for an attached field.
    pub fn add_dependency(&mut self, field_id: &str, clause: DependencyClause, index: i64) -> bool {
        self.dependencies.add(&self.doc, field_id, clause, index)
    }

    /// Run a dependency update when `event` fires on `field_id`.
    pub fn bind_update(&mut self, field_id: &str, event: &str) -> bool {
        let Some(node) = self.doc.node_by_id(field_id) else {
            return false;
        };
        self.bindings.push(Binding {
            node,
            event: event.to_string(),
            action: Action::UpdateDependencies,
        });
        true
    }

    pub fn add_tab(&mut self, section: &str, tab: &str) -> bool {
        self.tabs.add(&self.doc, section, tab)
    }

    pub fn switch_tab(&mut self, section: &str, tab: &str) -> bool {
        self.tabs.switch(&mut self.doc, section, tab)
    }

    pub fn clear_tab_highlights(&mut self) {
        self.tabs.clear_highlights(&mut self.doc);
    }

    /// Compile `expr` for `field_id`, bind it to the configured triggers and
    /// run it once. Returns the validator's index.
    pub fn add_validator(
        &mut self,
        field_id: &str,
        expr: &str,
        optional: bool,
    ) -> Result<usize, RuntimeError> {
        let node = self
            .doc
            .node_by_id(field_id)
            .ok_or_else(|| RuntimeError::UnknownElement(field_id.to_string()))?;
        self.install_validator(node, expr, optional)
    }

    fn install_validator(
        &mut self,
        node: NodeId,
        expr: &str,
        optional: bool,
    ) -> Result<usize, RuntimeError> {
        let validator = Validator::new(&self.doc, node, expr, optional, Arc::clone(&self.types))
            .map_err(|source| RuntimeError::Compile {
                field: self.doc[node].id.clone(),
                source,
            })?;

        let index = self.validators.len();
        self.validators.push(validator);

        let mut events = self.config.validate_on.clone();
        if self.doc[node].tag == Tag::Select {
            events.extend(self.config.select_validate_on.iter().cloned());
        }
        for event in events {
            self.bindings.push(Binding {
                node,
                event,
                action: Action::Validate(index),
            });
        }

        self.validators[index].validate(&mut self.doc);
        Ok(index)
    }

    /// Add a host check to the validator of `field_id`. The check runs after
    /// the type expression passed.
    pub fn add_check<F>(&mut self, field_id: &str, check: F) -> bool
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        match self
            .validators
            .iter_mut()
            .rev()
            .find(|v| v.field_id() == field_id)
        {
            Some(validator) => {
                validator.push_check(Box::new(check));
                true
            }
            None => false,
        }
    }

    /// Deliver a host event. Runs whatever is bound to the target element
    /// and event name, in binding order.
    pub fn dispatch(&mut self, event: &Event) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let Some(target) = self.doc.element_by_id(event.target()) else {
            debug!("event '{}' for unknown target '{}'", event.name(), event.target());
            return outcome;
        };

        let actions: Vec<Action> = self
            .bindings
            .iter()
            .filter(|b| b.node == target && b.event == event.name())
            .map(|b| b.action)
            .collect();

        for action in actions {
            match action {
                Action::Validate(index) => {
                    let validator = &mut self.validators[index];
                    let valid = validator.validate(&mut self.doc);
                    outcome
                        .validated
                        .push((validator.field_id().to_string(), valid));
                }
                Action::UpdateDependencies => {
                    outcome.update = Some(self.update_dependencies());
                }
            }
        }
        outcome
    }

    /// Set a field's value. No event is implied.
    pub fn set_value(&mut self, field_id: &str, value: &str) -> bool {
        match self.doc.node_by_id(field_id) {
            Some(node) => {
                self.doc.set_value(node, value);
                true
            }
            None => false,
        }
    }

    /// Check or uncheck a checkbox or radio. No event is implied.
    pub fn set_checked(&mut self, field_id: &str, checked: bool) -> bool {
        match self.doc.node_by_id(field_id) {
            Some(node) => {
                self.doc.set_checked(node, checked);
                true
            }
            None => false,
        }
    }

    /// Bring field visibility in line with the current values.
    pub fn update_dependencies(&mut self) -> UpdateReport {
        let limit = self.config.pass_limit(self.dependencies.len());
        depends::update(&mut self.doc, &self.dependencies, &self.tabs, limit)
    }

    /// Whether `field_id` is currently attached to the document.
    pub fn is_visible(&self, field_id: &str) -> bool {
        self.doc.element_by_id(field_id).is_some()
    }

    /// Run the validators of `field_id`. `None` when it has none.
    pub fn validate_field(&mut self, field_id: &str) -> Option<bool> {
        let mut result = None;
        for validator in self
            .validators
            .iter_mut()
            .filter(|v| v.field_id() == field_id)
        {
            let valid = validator.validate(&mut self.doc);
            result = Some(result.unwrap_or(true) && valid);
        }
        result
    }

    /// Submit-time validation of every field inside the form `form_id`.
    ///
    /// Skipped when the form's `data-state` is one of the configured skip
    /// states (adding or deleting a section).
    pub fn validate_form(&mut self, form_id: &str) -> ValidationResult {
        let Some(form) = self.doc.element_by_id(form_id) else {
            warn!("form '{form_id}' not found");
            return ValidationResult::Valid;
        };

        if let Some(state) = self.doc[form].get_data("state") {
            if self.config.skip_submit_states.iter().any(|s| s == state) {
                debug!("form '{form_id}' in state '{state}', skipping validation");
                return ValidationResult::Valid;
            }
        }

        let fields: HashSet<NodeId> = self.doc.descendants(form).into_iter().collect();
        let mut errors = Vec::new();
        for validator in &mut self.validators {
            if !fields.contains(&validator.field()) {
                continue;
            }
            if !validator.validate(&mut self.doc) {
                let message = self.doc[validator.field()]
                    .get_data("tooltip")
                    .unwrap_or_default()
                    .to_string();
                errors.push(FieldError {
                    field_id: validator.field_id().to_string(),
                    message,
                });
            }
        }
        ValidationResult::from_errors(errors)
    }

    /// Drain the notifications dispatched since the last call.
    pub fn take_events(&mut self) -> Vec<Notification> {
        self.doc.take_notifications()
    }
}

impl std::fmt::Debug for FormRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRuntime")
            .field("nodes", &self.doc.len())
            .field("dependencies", &self.dependencies.len())
            .field("validators", &self.validators.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

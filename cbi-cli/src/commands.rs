use std::fmt;
use std::fs;
use std::path::Path;

use cbi::{FormRuntime, RuntimeConfig, ValidationResult};
use cbidom::{Document, Element};
use log::{debug, info};

use crate::error::CliError;

const CHECK_FIELD: &str = "value";

// ============================================================================
// check
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub value: String,
    /// Tooltip text when the value was rejected.
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "{:?}: ok", self.value),
            Some(message) => write!(f, "{:?}: invalid: {message}", self.value),
        }
    }
}

/// Validate each of `values` against the expression `expr`.
pub fn check_values(
    expr: &str,
    values: &[String],
    optional: bool,
) -> Result<Vec<CheckOutcome>, CliError> {
    let doc = Document::new(Element::form().id("check").child(Element::input("").id(CHECK_FIELD)));
    let mut form = FormRuntime::new(doc);
    form.add_validator(CHECK_FIELD, expr, optional)?;

    let mut outcomes = Vec::with_capacity(values.len());
    for value in values {
        form.set_value(CHECK_FIELD, value);
        let valid = form.validate_field(CHECK_FIELD).unwrap_or(true);
        let error = if valid {
            None
        } else {
            Some(tooltip(form.document(), CHECK_FIELD))
        };
        debug!("checked {value:?} against '{expr}': {valid}");
        outcomes.push(CheckOutcome {
            value: value.clone(),
            error,
        });
    }
    Ok(outcomes)
}

fn tooltip(doc: &Document, field_id: &str) -> String {
    doc.node_by_id(field_id)
        .and_then(|node| doc[node].get_data("tooltip"))
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// form
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    /// `id=value` assignments, applied in order.
    pub sets: Vec<String>,
    /// Checkbox or radio ids to check.
    pub checks: Vec<String>,
    /// Form id to run submit validation on.
    pub submit: Option<String>,
    pub config: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    Valid,
    Invalid(String),
    /// Detached by its dependencies, not validated.
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormReport {
    /// Every dependency-managed element and whether it is shown.
    pub visibility: Vec<(String, bool)>,
    /// Every validated field in installation order.
    pub fields: Vec<(String, FieldState)>,
    pub submit: Option<ValidationResult>,
    pub converged: bool,
}

impl FormReport {
    /// Whether anything failed validation.
    pub fn has_errors(&self) -> bool {
        self.fields
            .iter()
            .any(|(_, state)| matches!(state, FieldState::Invalid(_)))
            || self.submit.as_ref().is_some_and(ValidationResult::is_invalid)
    }
}

impl fmt::Display for FormReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, visible) in &self.visibility {
            writeln!(f, "{id}: {}", if *visible { "visible" } else { "hidden" })?;
        }
        if !self.converged {
            writeln!(f, "warning: dependencies did not settle")?;
        }
        for (id, state) in &self.fields {
            match state {
                FieldState::Valid => writeln!(f, "{id}: valid")?,
                FieldState::Invalid(message) => writeln!(f, "{id}: invalid: {message}")?,
                FieldState::Hidden => writeln!(f, "{id}: skipped (hidden)")?,
            }
        }
        match &self.submit {
            Some(ValidationResult::Valid) => writeln!(f, "submit: ok")?,
            Some(ValidationResult::Invalid(errors)) => {
                writeln!(f, "submit: {} invalid field(s)", errors.len())?;
                for error in errors {
                    writeln!(f, "  {}: {}", error.field_id, error.message)?;
                }
            }
            None => {}
        }
        Ok(())
    }
}

pub fn parse_assignment(input: &str) -> Result<(&str, &str), CliError> {
    match input.split_once('=') {
        Some((id, value)) if !id.is_empty() => Ok((id, value)),
        _ => Err(CliError::BadAssignment(input.to_string())),
    }
}

/// Initialize the form, apply the requested field changes and report
/// visibility and validation state.
pub fn run_form(doc: Document, options: &FormOptions) -> Result<FormReport, CliError> {
    let mut form = FormRuntime::with_config(doc, options.config.clone());
    form.init();

    for assignment in &options.sets {
        let (id, value) = parse_assignment(assignment)?;
        if !form.set_value(id, value) {
            return Err(CliError::UnknownElement(id.to_string()));
        }
    }
    for id in &options.checks {
        if !form.set_checked(id, true) {
            return Err(CliError::UnknownElement(id.clone()));
        }
    }

    let update = form.update_dependencies();
    info!(
        "dependencies settled after {} pass(es): {} shown, {} hidden",
        update.passes,
        update.attached.len(),
        update.detached.len()
    );

    let visibility = form
        .dependencies()
        .entries()
        .iter()
        .map(|entry| (entry.field_id.clone(), form.is_visible(&entry.field_id)))
        .collect();

    let mut ids: Vec<String> = Vec::new();
    for validator in form.validators() {
        if !ids.iter().any(|id| id == validator.field_id()) {
            ids.push(validator.field_id().to_string());
        }
    }
    let mut fields = Vec::with_capacity(ids.len());
    for id in ids {
        let state = if !form.is_visible(&id) {
            FieldState::Hidden
        } else if form.validate_field(&id).unwrap_or(true) {
            FieldState::Valid
        } else {
            FieldState::Invalid(tooltip(form.document(), &id))
        };
        fields.push((id, state));
    }

    let submit = options.submit.as_deref().map(|id| form.validate_form(id));

    Ok(FormReport {
        visibility,
        fields,
        submit,
        converged: update.converged,
    })
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, CliError> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

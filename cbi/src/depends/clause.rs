use serde::Deserialize;
use serde_json::Value;

use crate::coerce::number_to_string;

/// The value a constraint requires of another field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// The field's value must equal this text.
    Value(String),
    /// A declaration that can never be satisfied (arrays, objects, null).
    Unsatisfiable,
}

impl Expected {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Value(s.clone()),
            Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Value(number_to_string(f)),
                None => Self::Value(n.to_string()),
            },
            Value::Bool(b) => Self::Value(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Self::Unsatisfiable,
        }
    }
}

/// `field` must currently hold `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub field: String,
    pub expected: Expected,
}

/// One alternative of a field's visibility condition: every constraint must
/// hold.
///
/// Deserializes from the JSON objects found in `data-depends`, where the
/// `!reverse` and `!default` keys are modifiers rather than field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct DependencyClause {
    pub constraints: Vec<Constraint>,
    /// Invert the clause result.
    pub reverse: bool,
    /// Make the field visible when no other clause matches.
    pub default: bool,
    /// The declaration was not an object; the clause never matches.
    pub malformed: bool,
}

impl DependencyClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to hold `value`.
    pub fn require(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.push(Constraint {
            field: field.into(),
            expected: Expected::Value(value.into()),
        });
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Mark this clause as the fallback.
    pub fn fallback(mut self) -> Self {
        self.default = true;
        self
    }
}

impl From<Value> for DependencyClause {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self {
                malformed: true,
                ..Self::default()
            };
        };

        let mut clause = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "!reverse" => clause.reverse = truthy(&value),
                "!default" => clause.default = truthy(&value),
                _ => clause.constraints.push(Constraint {
                    expected: Expected::from_json(&value),
                    field: key,
                }),
            }
        }
        clause
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

//! Runtime configuration types.

use serde::Deserialize;

/// Per-form runtime configuration.
///
/// Controls which host events trigger validation, when submit-time
/// validation is skipped, and how many passes the visibility engine may run
/// before giving up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Events that re-validate any validated field.
    pub validate_on: Vec<String>,

    /// Additional events that re-validate `select` fields.
    pub select_validate_on: Vec<String>,

    /// Form `data-state` values for which submit validation is skipped.
    pub skip_submit_states: Vec<String>,

    /// A dependency update gives up after `factor * entries + 2` passes.
    pub pass_limit_factor: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            validate_on: vec!["blur".into(), "keyup".into()],
            select_validate_on: vec!["change".into(), "click".into()],
            skip_submit_states: vec!["add-section".into(), "del-section".into()],
            pass_limit_factor: 2,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the events that trigger validation.
    pub fn validate_on<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validate_on = events.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the extra events that trigger validation on selects.
    pub fn select_validate_on<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_validate_on = events.into_iter().map(Into::into).collect();
        self
    }

    /// Add a form state for which submit validation is skipped.
    pub fn skip_submit_state(mut self, state: impl Into<String>) -> Self {
        self.skip_submit_states.push(state.into());
        self
    }

    /// Set the pass limit factor (minimum 1).
    pub fn pass_limit_factor(mut self, factor: usize) -> Self {
        self.pass_limit_factor = factor.max(1);
        self
    }

    /// Maximum passes for a registry of `entries` dependency entries.
    pub fn pass_limit(&self, entries: usize) -> usize {
        self.pass_limit_factor.max(1) * entries + 2
    }
}

/// Host input events with element targeting.
///
/// Targets are element ids. These are what a host forwards into the form
/// runtime; the runtime decides which validators or dependency updates are
/// bound to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Element lost focus
    Blur { target: String },
    /// Key released while the element had focus
    Keyup { target: String },
    /// Committed value change
    Change { target: String },
    /// Mouse click
    Click { target: String },
    /// Widget-specific event, e.g. `cbi-dropdown-change`
    Custom { target: String, name: String },
}

impl Event {
    /// Build an event from its DOM name.
    pub fn from_name(name: &str, target: impl Into<String>) -> Self {
        let target = target.into();
        match name {
            "blur" => Self::Blur { target },
            "keyup" => Self::Keyup { target },
            "change" => Self::Change { target },
            "click" => Self::Click { target },
            _ => Self::Custom {
                target,
                name: name.to_string(),
            },
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Blur { target }
            | Self::Keyup { target }
            | Self::Change { target }
            | Self::Click { target }
            | Self::Custom { target, .. } => target,
        }
    }

    /// DOM event name (`"blur"`, `"change"`, ...).
    pub fn name(&self) -> &str {
        match self {
            Self::Blur { .. } => "blur",
            Self::Keyup { .. } => "keyup",
            Self::Change { .. } => "change",
            Self::Click { .. } => "click",
            Self::Custom { name, .. } => name,
        }
    }
}

/// Notifications dispatched on document elements for the host to observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A field passed validation.
    ValidationSuccess { target: String },
    /// A field failed validation. `message` is the full tooltip text.
    ValidationFailure { target: String, message: String },
    /// Dependency-managed children of this container were attached or
    /// detached.
    DependencyUpdate { target: String },
}

impl Notification {
    pub fn target(&self) -> &str {
        match self {
            Self::ValidationSuccess { target }
            | Self::ValidationFailure { target, .. }
            | Self::DependencyUpdate { target } => target,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ValidationSuccess { .. } => "validation-success",
            Self::ValidationFailure { .. } => "validation-failure",
            Self::DependencyUpdate { .. } => "dependency-update",
        }
    }
}

/// Element kind. Only the handful of tags the form engine cares about are
/// modelled; everything else is a `Div`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tag {
    Form,
    #[default]
    Div,
    Span,
    Label,
    Input(InputType),
    Select,
    Option,
}

impl Tag {
    /// Lowercase tag name, as it would appear in markup.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Div => "div",
            Self::Span => "span",
            Self::Label => "label",
            Self::Input(_) => "input",
            Self::Select => "select",
            Self::Option => "option",
        }
    }

    /// Parse a markup tag name. Input types are given separately, see
    /// [`InputType::parse`].
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "form" => Some(Self::Form),
            "div" => Some(Self::Div),
            "span" => Some(Self::Span),
            "label" => Some(Self::Label),
            "input" => Some(Self::Input(InputType::Text)),
            "select" => Some(Self::Select),
            "option" => Some(Self::Option),
            _ => None,
        }
    }

    /// Input or select: something that carries a submittable value.
    pub fn is_field(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Select)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    #[default]
    Text,
    Password,
    Hidden,
    Checkbox,
    Radio,
}

impl InputType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "password" => Some(Self::Password),
            "hidden" => Some(Self::Hidden),
            "checkbox" => Some(Self::Checkbox),
            "radio" => Some(Self::Radio),
            _ => None,
        }
    }

    /// Checkboxes and radios only contribute a value while checked.
    pub fn is_checkable(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

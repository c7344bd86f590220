use thiserror::Error;

/// Errors raised while compiling a validator expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A token that is neither a number, a quoted string, nor a known
    /// validator name.
    #[error("Syntax error, unhandled token '{token}'")]
    UnhandledToken { token: String },

    #[error("Syntax error, argument list follows non-function")]
    ArgumentListFollowsNonFunction,

    #[error("Syntax error, unbalanced parenthesis")]
    UnbalancedParenthesis,

    /// The expression compiled, but does not start with a validator call.
    #[error("Syntax error, expression does not start with a validator")]
    ExpectedCall,
}

/// Errors raised while wiring fields into a [`FormRuntime`](crate::FormRuntime).
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid validator expression for '{field}': {source}")]
    Compile {
        field: String,
        #[source]
        source: CompileError,
    },

    #[error("element not found: {0}")]
    UnknownElement(String),

    #[error("invalid dependency declaration on '{field}': {source}")]
    Depends {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

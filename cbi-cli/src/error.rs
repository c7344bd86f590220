use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid form description '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("unknown input type '{0}'")]
    UnknownInputType(String),

    #[error("expected id=value, got '{0}'")]
    BadAssignment(String),

    #[error("no element with id '{0}'")]
    UnknownElement(String),

    #[error(transparent)]
    Runtime(#[from] cbi::RuntimeError),
}

//! Command line front end for the `cbi` form engine.

pub mod commands;
pub mod error;
pub mod form;

pub use error::CliError;

//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};

#[derive(Parser)]
#[command(
    name = "cbi",
    version,
    about = "Evaluate form validation expressions and field dependencies"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate values against a type expression, e.g. `range(1, 65535)`.
    Check(CheckArgs),

    /// Load a JSON form description and report visibility and validation.
    Form(FormArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Validator expression.
    #[arg(value_name = "TYPE")]
    pub expr: String,

    /// Values to check.
    #[arg(value_name = "VALUE")]
    pub values: Vec<String>,

    /// Accept the empty value.
    #[arg(long)]
    pub optional: bool,
}

#[derive(Args)]
pub struct FormArgs {
    /// JSON form description.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Set a field value before evaluating (repeatable).
    #[arg(long = "set", value_name = "ID=VALUE")]
    pub sets: Vec<String>,

    /// Check a checkbox or radio before evaluating (repeatable).
    #[arg(long = "check", value_name = "ID")]
    pub checks: Vec<String>,

    /// Run submit validation on this form id.
    #[arg(long, value_name = "FORM_ID")]
    pub submit: Option<String>,

    /// JSON runtime configuration (trigger events, pass limit).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

//! `cbi` command line tool.

use clap::Parser;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use cbi_cli::CliError;
use cbi_cli::commands::{FormOptions, check_values, load_config, run_form};
use cbi_cli::form::load_document;

mod cli;

use crate::cli::{CheckArgs, Cli, Command, FormArgs};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = TermLogger::init(
        cli.verbosity.log_level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match cli.command {
        Command::Check(args) => run_check(&args),
        Command::Form(args) => match form(&args) {
            Ok(code) => code,
            Err(error) => {
                eprintln!("error: {error}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn run_check(args: &CheckArgs) -> i32 {
    match check_values(&args.expr, &args.values, args.optional) {
        Ok(outcomes) => {
            for outcome in &outcomes {
                println!("{outcome}");
            }
            if outcomes.iter().all(|o| o.is_valid()) { 0 } else { 1 }
        }
        Err(error) => {
            eprintln!("error: {error}");
            2
        }
    }
}

fn form(args: &FormArgs) -> Result<i32, CliError> {
    let doc = load_document(&args.file)?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => Default::default(),
    };
    let options = FormOptions {
        sets: args.sets.clone(),
        checks: args.checks.clone(),
        submit: args.submit.clone(),
        config,
    };

    let report = run_form(doc, &options)?;
    print!("{report}");
    Ok(if report.has_errors() { 1 } else { 0 })
}

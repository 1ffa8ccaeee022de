//! k8scrd CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Template error
//! - 5: Apply error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use k8scrd_provider::{DiagnosticCode, Diagnostics};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const APPLY_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "k8scrd=debug" } else { "k8scrd=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},warn", default_level)));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let context = cli.context();
    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args).await,
        Commands::Create(args) => commands::create::execute(args, &context).await,
        Commands::Read(args) => commands::read::execute(args, &context).await,
        Commands::Update(args) => commands::update::execute(args, &context).await,
        Commands::Delete(args) => commands::delete::execute(args, &context).await,
        Commands::Schema(args) => commands::schema::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Map an error to its exit code using the first error diagnostic, if any.
fn categorize_error(e: &anyhow::Error) -> u8 {
    let Some(diags) = e.downcast_ref::<Diagnostics>() else {
        return ExitCodes::GENERAL_ERROR;
    };

    match diags.iter().find(|d| d.is_error()).map(|d| d.code) {
        Some(
            DiagnosticCode::UnknownConfiguration
            | DiagnosticCode::MissingHost
            | DiagnosticCode::MissingCredentials,
        ) => ExitCodes::CONFIG_ERROR,
        Some(DiagnosticCode::TemplateParse | DiagnosticCode::TemplateExec) => {
            ExitCodes::TEMPLATE_ERROR
        }
        Some(DiagnosticCode::Exec | DiagnosticCode::ExecutableNotFound) => ExitCodes::APPLY_ERROR,
        Some(DiagnosticCode::InvalidArgument) => ExitCodes::INVALID_ARGS,
        None => ExitCodes::GENERAL_ERROR,
    }
}

//! Render command - Render a template without applying it.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use tracing::info;

use k8scrd_provider::{Diagnostic, DiagnosticCode, Diagnostics};
use k8scrd_templates::TemplateRenderer;

use super::TemplateArgs;

#[derive(Args)]
pub struct RenderArgs {
    #[command(flatten)]
    input: TemplateArgs,

    /// Write the document to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn execute(args: RenderArgs) -> Result<()> {
    let Some(template) = args.input.load_template()? else {
        return Err(Diagnostics::from(
            Diagnostic::error(
                DiagnosticCode::InvalidArgument,
                "Missing template",
                "Pass the template file with --template.",
            )
            .with_attribute("template"),
        )
        .into());
    };
    let attributes = args.input.load_attributes()?;

    let document = TemplateRenderer::new()
        .render(&template, attributes.as_ref())
        .map_err(|e| Diagnostics::from(Diagnostic::from(&e)))?;

    match &args.output {
        Some(path) => {
            fs::write(path, &document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Rendered document written to {}", path.display());
        }
        None => print!("{}", document),
    }

    Ok(())
}

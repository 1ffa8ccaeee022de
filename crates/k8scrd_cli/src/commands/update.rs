//! Update command - Re-render and re-apply an existing resource.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use k8scrd_provider::ResourceKind;

use super::{parse_kind, read_state, write_state, ConnectionArgs, Context, TemplateArgs};

#[derive(Args)]
pub struct UpdateArgs {
    /// State file to update
    #[arg(short, long)]
    state: PathBuf,

    /// Resource type (definition or instance)
    #[arg(short, long, default_value = "instance", value_parser = parse_kind)]
    kind: ResourceKind,

    #[command(flatten)]
    input: TemplateArgs,

    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Template and attributes given on the command line replace the stored
/// ones; anything not given is taken from the state file.
pub async fn execute(args: UpdateArgs, context: &Context) -> Result<()> {
    let mut plan = read_state(&args.state)?;
    if let Some(template) = args.input.load_template()? {
        plan.template = Some(template);
    }
    if let Some(attributes) = args.input.load_attributes()? {
        plan.attributes = Some(attributes);
    }

    let (configuration, controller) = context.controller(&args.connection, args.kind)?;
    let updated = controller.update(&configuration, &plan).await?;

    write_state(&args.state, &updated)?;
    info!("State written to {}", args.state.display());

    println!(
        "Updated {} resource (id: {})",
        args.kind,
        updated.id.as_deref().unwrap_or_default()
    );
    Ok(())
}

//! Create command - Render, apply, and record a new resource.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use k8scrd_provider::{ResourceKind, ResourceRecord, ResourceState};

use super::{parse_kind, read_state, write_state, ConnectionArgs, Context, TemplateArgs};

#[derive(Args)]
pub struct CreateArgs {
    /// State file to write
    #[arg(short, long)]
    state: PathBuf,

    /// Resource type (definition or instance)
    #[arg(short, long, default_value = "instance", value_parser = parse_kind)]
    kind: ResourceKind,

    /// Replace an existing state file
    #[arg(long)]
    force: bool,

    #[command(flatten)]
    input: TemplateArgs,

    #[command(flatten)]
    connection: ConnectionArgs,
}

pub async fn execute(args: CreateArgs, context: &Context) -> Result<()> {
    if args.state.exists() && !args.force {
        let existing = read_state(&args.state)?;
        if existing.state() == ResourceState::Managed {
            anyhow::bail!(
                "Resource already managed in {}; use update, or pass --force",
                args.state.display()
            );
        }
    }

    let plan = ResourceRecord {
        attributes: args.input.load_attributes()?,
        template: args.input.load_template()?,
        ..ResourceRecord::default()
    };

    let (configuration, controller) = context.controller(&args.connection, args.kind)?;
    let created = controller.create(&configuration, &plan).await?;

    write_state(&args.state, &created)?;
    info!("State written to {}", args.state.display());

    println!(
        "Created {} resource (id: {})",
        args.kind,
        created.id.as_deref().unwrap_or_default()
    );
    Ok(())
}

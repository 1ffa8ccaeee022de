//! Delete command - Remove a resource from tracked state.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use k8scrd_provider::ResourceKind;

use super::{parse_kind, read_state, ConnectionArgs, Context};

#[derive(Args)]
pub struct DeleteArgs {
    /// State file to remove
    #[arg(short, long)]
    state: PathBuf,

    /// Resource type (definition or instance)
    #[arg(short, long, default_value = "instance", value_parser = parse_kind)]
    kind: ResourceKind,

    #[command(flatten)]
    connection: ConnectionArgs,
}

pub async fn execute(args: DeleteArgs, context: &Context) -> Result<()> {
    let state = read_state(&args.state)?;

    let (configuration, controller) = context.controller(&args.connection, args.kind)?;
    controller.delete(&configuration, &state).await?;

    fs::remove_file(&args.state)
        .with_context(|| format!("Failed to remove state file {}", args.state.display()))?;

    println!(
        "Removed {} resource from {} (nothing was deleted from the cluster)",
        args.kind,
        args.state.display()
    );
    Ok(())
}

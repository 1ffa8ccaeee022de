//! Read command - Show the stored resource record.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use k8scrd_provider::ResourceKind;

use super::{parse_kind, read_state, ConnectionArgs, Context};

#[derive(Args)]
pub struct ReadArgs {
    /// State file to read
    #[arg(short, long)]
    state: PathBuf,

    /// Resource type (definition or instance)
    #[arg(short, long, default_value = "instance", value_parser = parse_kind)]
    kind: ResourceKind,

    #[command(flatten)]
    connection: ConnectionArgs,
}

pub async fn execute(args: ReadArgs, context: &Context) -> Result<()> {
    let state = read_state(&args.state)?;

    let (configuration, controller) = context.controller(&args.connection, args.kind)?;
    let record = controller.read(&configuration, &state).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

//! Schema command - Print provider and resource schemas.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use k8scrd_provider::{Provider, ResourceKind};

use super::parse_kind;

#[derive(Args)]
pub struct SchemaArgs {
    /// Only print the schema of this resource type
    #[arg(short, long, value_parser = parse_kind)]
    kind: Option<ResourceKind>,
}

pub async fn execute(args: SchemaArgs) -> Result<()> {
    let provider = Provider::new(env!("CARGO_PKG_VERSION"));
    let metadata = provider.metadata();

    let output = match args.kind {
        Some(kind) => serde_json::to_value(kind.schema())?,
        None => {
            let resources: BTreeMap<String, _> = provider
                .resources()
                .into_iter()
                .map(|kind| (kind.type_name(&metadata.type_name), kind.schema()))
                .collect();
            json!({
                "provider": metadata,
                "provider_schema": provider.schema(),
                "resources": resources,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

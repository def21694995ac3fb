//! `mga analyze`: walk the management model into Neo4j.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use mga_core::AddressPath;
use mga_graph::{schema, Analyzer, GraphClient, GraphConfig};
use mga_wildfly::{WildFlyClient, WildFlyConfig};

use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Resource to start at
    #[arg(default_value = "/")]
    pub resource: String,

    /// Skip resources already stored in Neo4j
    #[arg(short, long, conflicts_with = "clean")]
    pub append: bool,

    /// Delete all nodes, relationships, indexes and constraints first
    #[arg(short, long)]
    pub clean: bool,
}

pub async fn execute(args: AnalyzeArgs, wildfly: &WildFlyConfig, neo4j: &GraphConfig) -> Result<()> {
    let root = AddressPath::parse(&args.resource)
        .with_context(|| format!("Invalid resource '{}'", args.resource))?;

    let reader = WildFlyClient::new(wildfly)?;
    let graph = GraphClient::connect(neo4j).await?;

    if args.clean {
        schema::clean(&graph).await?;
    }
    schema::initialize(&graph).await?;

    println!(
        "{} {} {} {}",
        "Analyzing".bold(),
        root.to_string().cyan(),
        "of".bold(),
        wildfly.host.to_string().yellow()
    );
    info!(resource = %root, append = args.append, "Start analysis");

    let stats = Analyzer::new(&reader, &graph).run(&root, args.append).await?;
    output::print_stats(&stats);
    Ok(())
}

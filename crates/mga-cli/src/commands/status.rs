//! `mga status`: summarize the stored graph.

use anyhow::Result;
use colored::Colorize;

use mga_graph::{GraphClient, GraphConfig};

use crate::output;

pub async fn execute(neo4j: &GraphConfig) -> Result<()> {
    let graph = GraphClient::connect(neo4j).await?;
    let counts = graph.counts().await?;
    let identity = graph.identity().await?;

    println!("{} {}", "Neo4j".bold(), neo4j.uri.cyan());
    match identity {
        Some(identifier) => println!("{}: {}", "Identity".bold(), identifier.yellow()),
        None => println!("{}", "No model stored yet.".dimmed()),
    }
    println!();
    output::print_counts(&counts);
    Ok(())
}

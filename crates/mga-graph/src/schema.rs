//! Neo4j schema provisioning (constraints and indexes).

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::statements::{
    ATTRIBUTE, CAPABILITY, CONSTRAINT, IDENTITY, OPERATION, PARAMETER, RESOURCE, VERSION,
};
use crate::GraphClient;

/// Every node label written by the analyzer.
pub const LABELS: &[&str] = &[
    IDENTITY, RESOURCE, ATTRIBUTE, CAPABILITY, OPERATION, PARAMETER, CONSTRAINT, VERSION,
];

/// Named constraints and indexes as `(drop, create)` statements.
const SCHEMA: &[(&str, &str)] = &[
    (
        "DROP INDEX resource_name IF EXISTS",
        "CREATE INDEX resource_name IF NOT EXISTS FOR (r:Resource) ON (r.name)",
    ),
    (
        "DROP CONSTRAINT resource_address IF EXISTS",
        "CREATE CONSTRAINT resource_address IF NOT EXISTS FOR (r:Resource) REQUIRE r.address IS UNIQUE",
    ),
    (
        "DROP INDEX attribute_name IF EXISTS",
        "CREATE INDEX attribute_name IF NOT EXISTS FOR (a:Attribute) ON (a.name)",
    ),
    (
        "DROP INDEX capability_name IF EXISTS",
        "CREATE INDEX capability_name IF NOT EXISTS FOR (c:Capability) ON (c.name)",
    ),
    (
        "DROP INDEX operation_name IF EXISTS",
        "CREATE INDEX operation_name IF NOT EXISTS FOR (o:Operation) ON (o.name)",
    ),
    (
        "DROP INDEX parameter_name IF EXISTS",
        "CREATE INDEX parameter_name IF NOT EXISTS FOR (p:Parameter) ON (p.name)",
    ),
    (
        "DROP INDEX version_ordinal IF EXISTS",
        "CREATE INDEX version_ordinal IF NOT EXISTS FOR (v:Version) ON (v.ordinal)",
    ),
];

/// Create constraints and indexes.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize(client: &GraphClient) -> Result<()> {
    info!("Initializing Neo4j schema");
    for (_, create) in SCHEMA {
        client.run(create).await.context("Failed to initialize Neo4j schema")?;
    }
    info!(statements = SCHEMA.len(), "Neo4j schema initialized");
    Ok(())
}

/// Delete all nodes and relationships, then drop constraints and indexes.
///
/// A failing drop is only logged.
pub async fn clean(client: &GraphClient) -> Result<()> {
    let before = client.counts().await?;
    client
        .run("MATCH (n) DETACH DELETE n")
        .await
        .context("Failed to clean Neo4j database")?;
    info!(
        nodes = before.nodes,
        relationships = before.relationships,
        "Removed nodes and relationships"
    );

    for (drop, _) in SCHEMA {
        if let Err(e) = client.run(drop).await {
            warn!(statement = %drop, error = %e, "Failed to drop schema element");
        }
    }
    Ok(())
}

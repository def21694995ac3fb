//! Neo4j connection client.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use serde::Deserialize;
use tracing::{debug, info};

use crate::cypher::{Cypher, Param};
use crate::writer::{GraphWriter, MergeLedger, WriteCounters};

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            database: "neo4j".to_string(),
        }
    }
}

/// Client for the graph the model is written to.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    ledger: Arc<MergeLedger>,
}

impl GraphClient {
    /// Connect and ping the database.
    ///
    /// `Graph::connect` only creates a lazy pool, so `RETURN 1` forces the
    /// bolt handshake and makes an unreachable database fail right here.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(4)
            .fetch_size(20)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .with_context(|| format!("Neo4j at {} is not responding to queries", config.uri))?;

        info!(uri = %config.uri, database = %config.database, "Connected to Neo4j");
        Ok(Self { graph, ledger: Arc::new(MergeLedger::new()) })
    }

    /// Run a statement without parameters, ignoring any result.
    pub async fn run(&self, statement: &str) -> Result<()> {
        self.graph
            .run(Query::new(statement.to_string()))
            .await
            .with_context(|| format!("Neo4j statement failed: {statement}"))?;
        Ok(())
    }

    /// Execute a query and return all rows.
    pub async fn query(&self, query: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(query).await.context("Neo4j query failed")?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await.context("Failed to fetch Neo4j row")? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Return the `count` column of a single-row query, 0 if there is no row.
    async fn count(&self, query: Query) -> Result<i64> {
        let rows = self.query(query).await?;
        match rows.into_iter().next() {
            Some(row) => row
                .get::<i64>("count")
                .map_err(|e| anyhow::anyhow!("Failed to get field 'count': {e:?}")),
            None => Ok(0),
        }
    }

    /// Node and relationship counts, overall and per label.
    pub async fn counts(&self) -> Result<GraphCounts> {
        let nodes = self
            .count(Query::new("MATCH (n) RETURN count(n) AS count".to_string()))
            .await?;
        let relationships = self
            .count(Query::new("MATCH ()-[r]->() RETURN count(r) AS count".to_string()))
            .await?;

        let mut labels = Vec::new();
        for label in crate::schema::LABELS {
            let count = self
                .count(Query::new(format!("MATCH (n:{label}) RETURN count(n) AS count")))
                .await?;
            labels.push((*label, count.max(0) as u64));
        }

        Ok(GraphCounts {
            nodes: nodes.max(0) as u64,
            relationships: relationships.max(0) as u64,
            labels,
        })
    }

    /// The identifier of the stored server identity, if any.
    pub async fn identity(&self) -> Result<Option<String>> {
        let rows = self
            .query(Query::new("MATCH (i:Identity) RETURN i.identifier AS identifier LIMIT 1".to_string()))
            .await?;
        match rows.into_iter().next() {
            Some(row) => {
                let identifier = row
                    .get::<String>("identifier")
                    .map_err(|e| anyhow::anyhow!("Failed to get field 'identifier': {e:?}"))?;
                Ok(Some(identifier))
            }
            None => Ok(None),
        }
    }
}

/// Bind a statement and its parameters into a neo4rs query.
fn to_query(statement: &str, cypher: &Cypher) -> Query {
    cypher
        .parameters()
        .iter()
        .fold(Query::new(statement.to_string()), |query, (key, value)| match value {
            Param::String(s) => query.param(key, s.clone()),
            Param::Bool(b) => query.param(key, *b),
            Param::Int(i) => query.param(key, *i),
            Param::List(items) => query.param(key, items.clone()),
        })
}

#[async_trait]
impl GraphWriter for GraphClient {
    async fn begin_run(&self) -> Result<()> {
        self.ledger.clear().await;
        Ok(())
    }

    async fn execute(&self, cypher: &Cypher) -> Result<WriteCounters> {
        self.graph
            .run(to_query(cypher.statement(), cypher))
            .await
            .with_context(|| format!("Neo4j statement failed: {cypher}"))?;
        let counters = self.ledger.record(cypher).await;
        debug!(
            nodes = counters.nodes_created,
            relationships = counters.relationships_created,
            "Executed"
        );
        Ok(counters)
    }

    async fn exists(&self, cypher: &Cypher) -> Result<bool> {
        let statement = format!("{} RETURN count(*) AS count", cypher.statement());
        let count = self.count(to_query(&statement, cypher)).await?;
        Ok(count > 0)
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone)]
pub struct GraphCounts {
    pub nodes: u64,
    pub relationships: u64,
    /// Nodes per model label, in schema order.
    pub labels: Vec<(&'static str, u64)>,
}

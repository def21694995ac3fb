//! # MGA Graph
//!
//! Maps the WildFly management model onto a Neo4j graph.
//!
//! Provides the parameterized Cypher builder, the statements for every
//! entity of the model graph, the [`Analyzer`] walking the model and the
//! neo4rs backed [`GraphClient`].

pub mod analyzer;
pub mod client;
pub mod cypher;
pub mod schema;
pub mod statements;
pub mod writer;

#[cfg(test)]
mod testing;

pub use analyzer::{Analyzer, Identity};
pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use cypher::{Cypher, Direction, Param, Properties};
pub use writer::{GraphWriter, MergeLedger, WriteCounters};

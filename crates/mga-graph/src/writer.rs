//! Write access to the target graph.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::cypher::{Cypher, Write};

/// Nodes and relationships created by one statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounters {
    pub nodes_created: u64,
    pub relationships_created: u64,
}

/// Derives counters from the write plans of executed statements.
///
/// Creates always count. A merge counts the first time its key is seen in
/// the current run: the label and merge properties for nodes, the complete
/// statement for relationships. Callers only send statements whose `MATCH`
/// finds something.
#[derive(Debug, Default)]
pub struct MergeLedger {
    seen: Mutex<HashSet<String>>,
}

impl MergeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all keys. Called when a new run starts.
    pub async fn clear(&self) {
        self.seen.lock().await.clear();
    }

    pub async fn record(&self, cypher: &Cypher) -> WriteCounters {
        let mut seen = self.seen.lock().await;
        let mut counters = WriteCounters::default();
        for write in cypher.writes() {
            match write {
                Write::CreateNode { .. } => counters.nodes_created += 1,
                Write::CreateRelationship(_) => counters.relationships_created += 1,
                Write::MergeNode { key, .. } => {
                    if seen.insert(key.clone()) {
                        counters.nodes_created += 1;
                    }
                }
                Write::MergeRelationship(rel) => {
                    if seen.insert(format!("{rel}|{cypher}|{:?}", cypher.parameters())) {
                        counters.relationships_created += 1;
                    }
                }
            }
        }
        counters
    }
}

/// Sink for graph mutations.
///
/// Statements are executed one at a time, each in its own transaction.
#[async_trait]
pub trait GraphWriter: Send + Sync {
    /// Called once before a run writes anything.
    async fn begin_run(&self) -> Result<()> {
        Ok(())
    }

    /// Execute a mutation.
    async fn execute(&self, cypher: &Cypher) -> Result<WriteCounters>;

    /// Whether a `MATCH` statement finds anything.
    async fn exists(&self, cypher: &Cypher) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher::{Direction, Properties};
    use crate::statements::{self, Owner, SiblingRelation};
    use mga_core::AddressPath;

    fn deprecated_attribute(name: &str) -> Cypher {
        let mut cypher = Cypher::new();
        cypher
            .match_node("r", "Resource", Properties::new().with("address", "/"))
            .create_related("r", "HAS_ATTRIBUTE", "a", "Attribute", Properties::new().with("name", name))
            .merge_node("v", "Version", Properties::new().with("major", 1i64))
            .merge_relationship("a", "DEPRECATED_SINCE", "v", Direction::Outgoing, Properties::new());
        cypher
    }

    #[tokio::test]
    async fn test_ledger_counts_merges_once() {
        let ledger = MergeLedger::new();
        assert_eq!(
            ledger.record(&deprecated_attribute("x")).await,
            WriteCounters { nodes_created: 2, relationships_created: 2 }
        );
        assert_eq!(
            ledger.record(&deprecated_attribute("y")).await,
            WriteCounters { nodes_created: 1, relationships_created: 2 }
        );
        assert_eq!(
            ledger.record(&deprecated_attribute("y")).await,
            WriteCounters { nodes_created: 1, relationships_created: 1 }
        );
    }

    #[tokio::test]
    async fn test_ledger_is_scoped_to_a_run() {
        let ledger = MergeLedger::new();
        let capability = statements::declares_capability(&AddressPath::root(), "org.wildfly.io", None);
        let created = WriteCounters { nodes_created: 1, relationships_created: 1 };

        assert_eq!(ledger.record(&capability).await, created);
        assert_eq!(ledger.record(&capability).await, WriteCounters::default());
        ledger.clear().await;
        assert_eq!(ledger.record(&capability).await, created);
    }

    #[tokio::test]
    async fn test_alternative_pair_counts_once() {
        let ledger = MergeLedger::new();
        let address = AddressPath::root();
        let owner = Owner::Resource(&address);
        let forth = statements::sibling_relation(&owner, &[], "a", "b", SiblingRelation::Alternative);
        let back = statements::sibling_relation(&owner, &[], "b", "a", SiblingRelation::Alternative);

        assert_eq!(ledger.record(&forth).await.relationships_created, 1);
        assert_eq!(ledger.record(&back).await.relationships_created, 0);
    }
}

//! In-memory model and graph used by the analyzer tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use mga_core::{AddressPath, ModelReader};

use mga_core::dmr::{ADDRESS, GLOBAL, NAME};

use crate::cypher::{node_key, Cypher, Param, Placeholders, Properties, Write};
use crate::statements::{CAPABILITY, OPERATION, RESOURCE};
use crate::writer::{GraphWriter, WriteCounters};

/// A management model served from memory, keyed by canonical address.
#[derive(Debug, Default)]
pub struct FakeModel {
    identity: Option<Value>,
    descriptions: HashMap<String, Value>,
    children: HashMap<String, Vec<String>>,
    unreadable_children: HashSet<String>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: Value) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Add a readable resource with the given child types.
    pub fn with_resource(mut self, address: &str, description: Value, children: &[&str]) -> Self {
        self.descriptions.insert(address.to_string(), description);
        self.with_children(address, children)
    }

    /// Child types of a resource, readable or not.
    pub fn with_children(mut self, address: &str, children: &[&str]) -> Self {
        self.children
            .insert(address.to_string(), children.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Make listing the child types of `address` fail.
    pub fn with_unreadable_children(mut self, address: &str) -> Self {
        self.unreadable_children.insert(address.to_string());
        self
    }
}

#[async_trait]
impl ModelReader for FakeModel {
    async fn identity(&self) -> Option<Value> {
        self.identity.clone()
    }

    async fn describe(&self, address: &AddressPath) -> Option<Value> {
        self.descriptions.get(&address.to_string()).cloned()
    }

    async fn child_types(&self, address: &AddressPath) -> Option<Vec<String>> {
        let address = address.to_string();
        if self.unreadable_children.contains(&address) {
            return None;
        }
        Some(self.children.get(&address).cloned().unwrap_or_default())
    }
}

/// An entity written to the [`RecordingGraph`] together with the
/// parameters of the statement that wrote it.
#[derive(Debug, Clone)]
pub struct Written {
    pub kind: &'static str,
    pub params: BTreeMap<String, Param>,
    /// Own properties of a node and their placeholders. Empty for relationships.
    pub properties: Placeholders,
}

impl Written {
    /// A string parameter of the statement, by placeholder.
    pub fn param(&self, placeholder: &str) -> Option<&str> {
        match self.params.get(placeholder) {
            Some(Param::String(s)) => Some(s),
            _ => None,
        }
    }

    /// A string property of the written node itself.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .and_then(|(_, placeholder)| self.param(placeholder))
    }
}

#[derive(Debug, Default)]
struct Recorded {
    statements: Vec<Cypher>,
    nodes: Vec<Written>,
    relationships: Vec<Written>,
    /// Keys of stored nodes that can be matched by properties.
    stored: HashSet<String>,
    merged_relationships: HashSet<String>,
}

/// Records every statement and simulates a graph.
///
/// Merged nodes are keyed by label and merge properties, merged
/// relationships by their complete statement. A statement whose `MATCH`
/// names a resource, capability or global operation that is not stored
/// writes nothing.
#[derive(Debug, Default)]
pub struct RecordingGraph {
    recorded: Mutex<Recorded>,
    fail_on: Option<&'static str>,
}

impl RecordingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a resource from an earlier run is already stored.
    pub fn with_existing_resource(self, address: &str) -> Self {
        self.with_stored(RESOURCE, Properties::new().with(ADDRESS, address))
    }

    pub fn with_existing_global_operation(self, name: &str) -> Self {
        self.with_stored(OPERATION, Properties::new().with(NAME, name).with(GLOBAL, true))
    }

    pub fn with_existing_capability(self, name: &str) -> Self {
        self.with_stored(CAPABILITY, Properties::new().with(NAME, name))
    }

    fn with_stored(self, label: &str, key: Properties) -> Self {
        self.lock().stored.insert(node_key(label, &key));
        self
    }

    /// Fail every statement creating a node with this label.
    pub fn failing_on(mut self, label: &'static str) -> Self {
        self.fail_on = Some(label);
        self
    }

    pub fn statements(&self) -> Vec<Cypher> {
        self.lock().statements.clone()
    }

    pub fn nodes(&self, label: &str) -> Vec<Written> {
        self.lock().nodes.iter().filter(|n| n.kind == label).cloned().collect()
    }

    pub fn relationships(&self, rel_type: &str) -> Vec<Written> {
        self.lock()
            .relationships
            .iter()
            .filter(|r| r.kind == rel_type)
            .cloned()
            .collect()
    }

    /// Names of the nodes with `label`, in creation order.
    pub fn names(&self, label: &str) -> Vec<String> {
        self.nodes(label)
            .iter()
            .filter_map(|n| n.property(NAME).map(str::to_string))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

#[async_trait]
impl GraphWriter for RecordingGraph {
    async fn execute(&self, cypher: &Cypher) -> Result<WriteCounters> {
        if let Some(label) = self.fail_on {
            if cypher.writes().iter().any(|w| w.creates(label)) {
                bail!("Connection reset while writing {label}");
            }
        }

        let mut recorded = self.lock();
        recorded.statements.push(cypher.clone());
        let mut counters = WriteCounters::default();
        if !cypher.matched().iter().all(|key| recorded.stored.contains(key)) {
            return Ok(counters);
        }

        for write in cypher.writes() {
            let written = |kind: &'static str, properties: &Placeholders| Written {
                kind,
                params: cypher.parameters().clone(),
                properties: properties.clone(),
            };
            match write {
                Write::CreateNode { label, properties } => {
                    let node = written(*label, properties);
                    if let Some(address) = node.property(ADDRESS) {
                        let key = node_key(label, &Properties::new().with(ADDRESS, address));
                        recorded.stored.insert(key);
                    }
                    recorded.nodes.push(node);
                    counters.nodes_created += 1;
                }
                Write::MergeNode { label, key, properties } => {
                    if recorded.stored.insert(key.clone()) {
                        recorded.nodes.push(written(*label, properties));
                        counters.nodes_created += 1;
                    }
                }
                Write::CreateRelationship(rel) => {
                    recorded.relationships.push(written(*rel, &Vec::new()));
                    counters.relationships_created += 1;
                }
                Write::MergeRelationship(rel) => {
                    let key = format!("{rel}|{cypher}|{:?}", cypher.parameters());
                    if recorded.merged_relationships.insert(key) {
                        recorded.relationships.push(written(*rel, &Vec::new()));
                        counters.relationships_created += 1;
                    }
                }
            }
        }
        Ok(counters)
    }

    async fn exists(&self, cypher: &Cypher) -> Result<bool> {
        let mut recorded = self.lock();
        recorded.statements.push(cypher.clone());
        Ok(!cypher.matched().is_empty()
            && cypher.matched().iter().all(|key| recorded.stored.contains(key)))
    }
}

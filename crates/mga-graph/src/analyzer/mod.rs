//! Walks the management model and maps it onto the graph.
//!
//! The walk is a depth-first pre-order traversal over resource types. Each
//! resource is read, written and fully linked before its children are
//! visited, so partial progress survives an interrupted run and `--append`
//! can resume it.

mod deprecation;
mod identity;
mod members;


use std::collections::HashSet;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use mga_core::dmr::{
    self, ATTRIBUTES, CAPABILITIES, CHILDREN, CHILD_DESCRIPTIONS, DEPRECATED, DESCRIPTION, GLOBAL,
    GLOBAL_OPERATIONS, NAME, OBJECT_TYPE, OPERATIONS, READ_ONLY, REPLY_PROPERTIES,
    REQUEST_PROPERTIES, RESULT, RETURN_VALUE, RUNTIME_ONLY, STABILITY, TYPE, VALUE_TYPE,
};
use mga_core::{AddressPath, ModelReader, Stats, MAX_DEPTH};

use crate::cypher::{Cypher, Properties};
use crate::statements::{self, Owner};
use crate::writer::{GraphWriter, WriteCounters};

pub use identity::Identity;

/// State owned by a single run.
struct Run {
    stats: Stats,
    incremental: bool,
    /// Global operations not yet written or linked in this run.
    pending_global_operations: HashSet<&'static str>,
    /// Capabilities known to be stored.
    capabilities: HashSet<String>,
}

impl Run {
    fn new(incremental: bool) -> Self {
        Self {
            stats: Stats::new(),
            incremental,
            pending_global_operations: GLOBAL_OPERATIONS.iter().copied().collect(),
            capabilities: HashSet::new(),
        }
    }
}

/// Maps the model read from `reader` into the graph behind `writer`.
pub struct Analyzer<'a, R: ?Sized, W: ?Sized> {
    reader: &'a R,
    writer: &'a W,
}

impl<'a, R, W> Analyzer<'a, R, W>
where
    R: ModelReader + ?Sized,
    W: GraphWriter + ?Sized,
{
    pub fn new(reader: &'a R, writer: &'a W) -> Self {
        Self { reader, writer }
    }

    /// Walk the model starting at `root`.
    ///
    /// With `incremental`, resources already present in the graph are
    /// skipped together with everything below them. Read failures and
    /// malformed deprecation versions end up in the returned statistics;
    /// write failures abort the run.
    pub async fn run(&self, root: &AddressPath, incremental: bool) -> Result<Stats> {
        let mut run = Run::new(incremental);
        run.stats.start();
        self.writer.begin_run().await?;

        self.identity(&mut run).await?;
        self.walk(&mut run, root).await?;

        run.stats.stop();
        info!(
            resources = run.stats.resources,
            failed = run.stats.failed_resources,
            errors = run.stats.errors.len(),
            elapsed = %run.stats.human_readable_duration(),
            "Analysis finished"
        );
        Ok(run.stats)
    }

    async fn identity(&self, run: &mut Run) -> Result<()> {
        let root = self.reader.identity().await.unwrap_or_else(|| {
            warn!("Unable to read server identity, using defaults");
            Value::Null
        });
        let identity = Identity::from_root(&root);
        let created = self
            .execute(&statements::identity(&identity))
            .await
            .context("Failed to write identity")?;
        run.stats.resources += created.nodes_created;
        info!(identifier = %identity.identifier(), "Identity");
        Ok(())
    }

    async fn walk(&self, run: &mut Run, root: &AddressPath) -> Result<()> {
        let mut pending: Vec<(AddressPath, Option<AddressPath>)> = vec![(root.clone(), None)];

        while let Some((address, parent)) = pending.pop() {
            if !address.within_max_depth() {
                warn!(%address, max_depth = MAX_DEPTH, "Skip resource, maximum nesting reached");
                continue;
            }
            let visited = self
                .resource(run, &address, parent.as_ref())
                .await
                .with_context(|| format!("Failed to write resource {address}"))?;
            if !visited {
                continue;
            }

            let Some(child_types) = self.reader.child_types(&address).await else {
                warn!(%address, "Unable to read child types");
                run.stats.error(format!("Unable to read child types of '{address}'"));
                continue;
            };
            // reversed, so the first child type is visited first
            for child_type in child_types.iter().rev() {
                match address.add(child_type) {
                    Ok(child) => pending.push((child, Some(address.clone()))),
                    Err(e) => run.stats.error(e.to_string()),
                }
            }
        }
        Ok(())
    }

    /// Read and write one resource. Returns whether its children should be visited.
    async fn resource(
        &self,
        run: &mut Run,
        address: &AddressPath,
        parent: Option<&AddressPath>,
    ) -> Result<bool> {
        if run.incremental && self.writer.exists(&statements::match_resource(address)).await? {
            info!(%address, "Skip existing resource");
            return Ok(false);
        }

        let Some(description) = self.reader.describe(address).await.filter(dmr::is_defined) else {
            warn!(%address, "Unable to read resource description");
            run.stats.failed_resources += 1;
            return Ok(false);
        };
        info!(%address, "Read resource");
        let description = schema(description);

        let created = self
            .execute(&statements::create_resource(address, resource_properties(&description)))
            .await?;
        run.stats.resources += created.nodes_created;
        if let Some(deprecated) = dmr::defined(&description, DEPRECATED) {
            self.deprecated(run, deprecated, statements::match_resource(address), "r", || {
                address.to_string()
            })
            .await?;
        }

        if let Some(parent) = parent {
            let created = self.execute(&statements::child_of(address, parent)).await?;
            run.stats.relationships += created.relationships_created;
        }

        if let Some(capabilities) = dmr::defined(&description, CAPABILITIES) {
            for capability in dmr::as_list(capabilities) {
                let Some(name) = dmr::defined(capability, NAME).map(dmr::as_string) else {
                    continue;
                };
                let stability = dmr::defined(capability, STABILITY).map(dmr::as_string);
                let created = self
                    .execute(&statements::declares_capability(address, &name, stability))
                    .await?;
                run.stats.capabilities += created.nodes_created;
                run.stats.relationships += created.relationships_created;
                run.capabilities.insert(name);
            }
        }

        if let Some(attributes) = dmr::defined(&description, ATTRIBUTES) {
            self.members(run, Owner::Resource(address), attributes).await?;
        }

        if let Some(operations) = dmr::defined(&description, OPERATIONS) {
            self.operations(run, address, operations).await?;
        }

        Ok(true)
    }

    async fn operations(&self, run: &mut Run, address: &AddressPath, operations: &Value) -> Result<()> {
        for (name, operation) in dmr::properties(operations) {
            let global = dmr::is_global_operation(name);
            if global && !run.pending_global_operations.contains(name) {
                self.link_global_operation(run, address, name).await?;
                continue;
            }
            if global && self.writer.exists(&statements::match_global_operation(name)).await? {
                // stored by an earlier run, parameters included
                run.pending_global_operations.remove(name);
                self.link_global_operation(run, address, name).await?;
                continue;
            }

            let details = operation_properties(operation);
            let statement = if global {
                statements::merge_global_operation(address, name, details)
            } else {
                let mut props = Properties::new().with(NAME, name).with(GLOBAL, false);
                props.extend(details);
                statements::create_operation(address, props)
            };
            let created = self.execute(&statement).await?;
            run.stats.operations += created.nodes_created;
            run.stats.relationships += created.relationships_created;

            if let Some(deprecated) = dmr::defined(operation, DEPRECATED) {
                self.deprecated(run, deprecated, statements::match_operation(address, name), "o", || {
                    format!("{address}:{name}")
                })
                .await?;
            }
            if let Some(request) = dmr::defined(operation, REQUEST_PROPERTIES) {
                self.members(run, Owner::Operation { address, name }, request).await?;
            }
            if global {
                run.pending_global_operations.remove(name);
            }
        }
        Ok(())
    }

    async fn link_global_operation(&self, run: &mut Run, address: &AddressPath, name: &str) -> Result<()> {
        let created = self.execute(&statements::link_global_operation(address, name)).await?;
        run.stats.relationships += created.relationships_created;
        Ok(())
    }

    /// Whether a capability reference can be linked. Capabilities declared
    /// later in the walk are not linked.
    async fn capability_exists(&self, run: &mut Run, name: &str) -> Result<bool> {
        if run.capabilities.contains(name) {
            return Ok(true);
        }
        let exists = self.writer.exists(&statements::match_capability(name)).await?;
        if exists {
            run.capabilities.insert(name.to_string());
        }
        Ok(exists)
    }

    async fn execute(&self, cypher: &Cypher) -> Result<WriteCounters> {
        debug!(statement = %cypher, parameters = ?cypher.parameters(), "Execute");
        self.writer.execute(cypher).await
    }
}

/// Descriptions of wildcard addresses come back as a list with one entry per
/// matched instance. The first entry stands in for all of them.
fn schema(description: Value) -> Value {
    match description {
        Value::Array(entries) => entries
            .into_iter()
            .next()
            .and_then(|first| dmr::defined(&first, RESULT).cloned())
            .unwrap_or_else(|| Value::Object(Map::new())),
        other => other,
    }
}

fn resource_properties(description: &Value) -> Properties {
    let mut props = Properties::new();
    props
        .set_opt(DESCRIPTION, dmr::defined(description, DESCRIPTION).map(dmr::as_string))
        .set_opt(STABILITY, dmr::defined(description, STABILITY).map(dmr::as_string));
    if let Some(children) = dmr::defined(description, CHILDREN) {
        let child_descriptions = dmr::properties(children)
            .into_iter()
            .map(|(child, node)| {
                let description = dmr::defined(node, DESCRIPTION)
                    .map(dmr::as_string)
                    .unwrap_or_else(|| format!("No description available for {child}"));
                format!("{child}|{description}")
            })
            .collect::<Vec<_>>()
            .join("^");
        props.set(CHILD_DESCRIPTIONS, child_descriptions);
    }
    props
}

/// Operation details besides its name and global flag.
fn operation_properties(operation: &Value) -> Properties {
    let mut props = Properties::new();
    props
        .set_opt(DESCRIPTION, dmr::defined(operation, DESCRIPTION).map(dmr::as_string))
        .set_opt(READ_ONLY, dmr::defined(operation, READ_ONLY).and_then(dmr::as_bool))
        .set_opt(RUNTIME_ONLY, dmr::defined(operation, RUNTIME_ONLY).and_then(dmr::as_bool))
        .set_opt(STABILITY, dmr::defined(operation, STABILITY).map(dmr::as_string));
    if let Some(reply) = dmr::defined(operation, REPLY_PROPERTIES) {
        props
            .set_opt(RETURN_VALUE, dmr::defined(reply, TYPE).map(dmr::as_string))
            .set_opt(VALUE_TYPE, dmr::defined(reply, VALUE_TYPE).map(value_type));
    }
    props
}

/// `value-type` as stored: the type name, or `OBJECT` for nested structures.
fn value_type(value: &Value) -> String {
    dmr::type_name(value).unwrap_or_else(|| OBJECT_TYPE.to_string())
}

//! Statements for every entity and relationship of the model graph.
//!
//! ```cypher
//! (:Resource)-[:CHILD_OF]->(:Resource)
//! (:Resource)-[:HAS_ATTRIBUTE]->(:Attribute)-[:CONSISTS_OF]->(:Attribute)
//! (:Resource)-[:PROVIDES]->(:Operation)-[:ACCEPTS]->(:Parameter)-[:CONSISTS_OF]->(:Parameter)
//! (:Resource)-[:DECLARES_CAPABILITY]->(:Capability)<-[:REFERENCES_CAPABILITY]-(:Attribute|Parameter)
//! (:Attribute)-[:IS_SENSITIVE]->(:Constraint)
//! (:Attribute|Parameter)-[:ALTERNATIVE]-(:Attribute|Parameter)
//! (:Attribute|Parameter)-[:REQUIRES]->(:Attribute|Parameter)
//! (:Resource|Attribute|Operation|Parameter)-[:DEPRECATED_SINCE {reason}]->(:Version)
//! ```
//!
//! Capabilities, versions and global operations are merged. Everything else
//! is created and relies on the analyzer never creating it twice in a run.

use mga_core::dmr::{
    ADDRESS, GLOBAL, IDENTIFIER, MAJOR, MANAGEMENT_VERSION, MINOR, NAME, OPERATION_NAME, ORDINAL,
    PATCH, PRODUCT_NAME, PRODUCT_VERSION, REASON, SINGLETON, STABILITY, TYPE,
};
use mga_core::{AddressPath, Version};

use crate::analyzer::Identity;
use crate::cypher::{Cypher, Direction, Properties};

pub const IDENTITY: &str = "Identity";
pub const RESOURCE: &str = "Resource";
pub const ATTRIBUTE: &str = "Attribute";
pub const CAPABILITY: &str = "Capability";
pub const OPERATION: &str = "Operation";
pub const PARAMETER: &str = "Parameter";
pub const CONSTRAINT: &str = "Constraint";
pub const VERSION: &str = "Version";

pub const CHILD_OF: &str = "CHILD_OF";
pub const HAS_ATTRIBUTE: &str = "HAS_ATTRIBUTE";
pub const CONSISTS_OF: &str = "CONSISTS_OF";
pub const ACCEPTS: &str = "ACCEPTS";
pub const PROVIDES: &str = "PROVIDES";
pub const DECLARES_CAPABILITY: &str = "DECLARES_CAPABILITY";
pub const REFERENCES_CAPABILITY: &str = "REFERENCES_CAPABILITY";
pub const IS_SENSITIVE: &str = "IS_SENSITIVE";
pub const ALTERNATIVE: &str = "ALTERNATIVE";
pub const REQUIRES: &str = "REQUIRES";
pub const DEPRECATED_SINCE: &str = "DEPRECATED_SINCE";

/// The node owning a tree of attributes or parameters.
#[derive(Debug, Clone, Copy)]
pub enum Owner<'a> {
    /// Attributes of a resource.
    Resource(&'a AddressPath),
    /// Request parameters of an operation provided by a resource.
    Operation { address: &'a AddressPath, name: &'a str },
}

impl Owner<'_> {
    /// Label of the owned member nodes.
    pub fn label(&self) -> &'static str {
        match self {
            Owner::Resource(_) => ATTRIBUTE,
            Owner::Operation { .. } => PARAMETER,
        }
    }

    /// Relationship from the owner to its top-level members.
    pub fn root_edge(&self) -> &'static str {
        match self {
            Owner::Resource(_) => HAS_ATTRIBUTE,
            Owner::Operation { .. } => ACCEPTS,
        }
    }

    pub fn address(&self) -> &AddressPath {
        match self {
            Owner::Resource(address) | Owner::Operation { address, .. } => address,
        }
    }

    /// Where a member lives, for error messages: `/a=b@x.y` or `/a=b:op(x.y)`.
    pub fn context(&self, path: &[String], name: &str) -> String {
        let dotted = path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(".");
        match self {
            Owner::Resource(address) => format!("{address}@{dotted}"),
            Owner::Operation { address, name } => format!("{address}:{name}({dotted})"),
        }
    }

    fn var(&self) -> &'static str {
        match self {
            Owner::Resource(_) => "r",
            Owner::Operation { .. } => "o",
        }
    }

    fn open(&self) -> Cypher {
        match self {
            Owner::Resource(address) => match_resource(address),
            Owner::Operation { address, name } => match_operation(address, name),
        }
    }
}

/// Same-level relation between two members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingRelation {
    Alternative,
    Requires,
}

impl SiblingRelation {
    fn rel_type(self) -> &'static str {
        match self {
            SiblingRelation::Alternative => ALTERNATIVE,
            SiblingRelation::Requires => REQUIRES,
        }
    }

    fn direction(self) -> Direction {
        match self {
            SiblingRelation::Alternative => Direction::Undirected,
            SiblingRelation::Requires => Direction::Outgoing,
        }
    }
}

pub fn identity(identity: &Identity) -> Cypher {
    let mut cypher = Cypher::new();
    cypher.merge_node(
        "i",
        IDENTITY,
        Properties::new()
            .with(IDENTIFIER, identity.identifier())
            .with(PRODUCT_NAME, identity.product_name.as_str())
            .with(PRODUCT_VERSION, identity.product_version.as_str())
            .with(MANAGEMENT_VERSION, identity.management_version.to_string()),
    );
    cypher
}

/// `MATCH (r:Resource {address: $address})`
pub fn match_resource(address: &AddressPath) -> Cypher {
    let mut cypher = Cypher::new();
    cypher.match_node("r", RESOURCE, Properties::new().with(ADDRESS, address.to_string()));
    cypher
}

/// Create a resource node. `details` follow name, address and singleton.
pub fn create_resource(address: &AddressPath, details: Properties) -> Cypher {
    let mut props = Properties::new()
        .with(NAME, address.name())
        .with(ADDRESS, address.to_string())
        .with(SINGLETON, address.is_singleton());
    props.extend(details);

    let mut cypher = Cypher::new();
    cypher.create_node("r", RESOURCE, props);
    cypher
}

pub fn child_of(child: &AddressPath, parent: &AddressPath) -> Cypher {
    let mut child_props = Properties::new();
    child_props.set_as(ADDRESS, "child", child.to_string());
    let mut parent_props = Properties::new();
    parent_props.set_as(ADDRESS, "parent", parent.to_string());

    let mut cypher = Cypher::new();
    cypher
        .match_node("child", RESOURCE, child_props)
        .and_node("parent", RESOURCE, parent_props)
        .merge_relationship("child", CHILD_OF, "parent", Direction::Outgoing, Properties::new());
    cypher
}

pub fn declares_capability(address: &AddressPath, name: &str, stability: Option<String>) -> Cypher {
    let mut details = Properties::new();
    details.set_opt(STABILITY, stability);

    let mut cypher = match_resource(address);
    cypher
        .merge_node("c", CAPABILITY, Properties::new().with(NAME, name))
        .on_create_set("c", details)
        .merge_relationship("r", DECLARES_CAPABILITY, "c", Direction::Outgoing, Properties::new());
    cypher
}

/// Match the node whose members live at `path` below `owner`.
///
/// Returns the statement, the variable bound to that node and the
/// relationship leading from it to its members.
fn match_level(owner: &Owner<'_>, path: &[String]) -> (Cypher, String, &'static str) {
    let mut cypher = owner.open();
    let mut parent = owner.var().to_string();
    let mut edge = owner.root_edge();
    for (i, name) in path.iter().enumerate() {
        let var = format!("n{i}");
        cypher.then_node(edge, &var, owner.label(), Properties::new().with(NAME, name.as_str()));
        parent = var;
        edge = CONSISTS_OF;
    }
    (cypher, parent, edge)
}

/// Create an attribute or parameter below `path`. `props` must include the name.
pub fn create_member(owner: &Owner<'_>, path: &[String], props: Properties) -> Cypher {
    let (mut cypher, parent, edge) = match_level(owner, path);
    cypher.create_related(&parent, edge, "m", owner.label(), props);
    cypher
}

/// Match an existing attribute or parameter as `m`.
pub fn match_member(owner: &Owner<'_>, path: &[String], name: &str) -> Cypher {
    let (mut cypher, _, edge) = match_level(owner, path);
    cypher.then_node(edge, "m", owner.label(), Properties::new().with(NAME, name));
    cypher
}

/// `MATCH (c:Capability {name: $name})`
pub fn match_capability(name: &str) -> Cypher {
    let mut cypher = Cypher::new();
    cypher.match_node("c", CAPABILITY, Properties::new().with(NAME, name));
    cypher
}

/// Link a member to an already declared capability.
pub fn references_capability(owner: &Owner<'_>, path: &[String], name: &str, capability: &str) -> Cypher {
    let mut props = Properties::new();
    props.set_as(NAME, "capability-reference", capability);

    let mut cypher = match_member(owner, path, name);
    cypher
        .match_node("c", CAPABILITY, props)
        .merge_relationship("m", REFERENCES_CAPABILITY, "c", Direction::Outgoing, Properties::new());
    cypher
}

pub fn sensitive(owner: &Owner<'_>, path: &[String], name: &str, sensitive_name: &str, kind: &str) -> Cypher {
    let mut props = Properties::new();
    props.set_as(NAME, "sensitive-name", sensitive_name).set(TYPE, kind);

    let mut cypher = match_member(owner, path, name);
    cypher.create_related("m", IS_SENSITIVE, "c", CONSTRAINT, props);
    cypher
}

/// Relate two members sharing the same parent.
///
/// Both members must exist. An alternative names its pair in a fixed order,
/// so `a`/`b` and `b`/`a` yield the same statement.
pub fn sibling_relation(
    owner: &Owner<'_>,
    path: &[String],
    source: &str,
    target: &str,
    relation: SiblingRelation,
) -> Cypher {
    let (source, target) = match relation {
        SiblingRelation::Alternative if target < source => (target, source),
        _ => (source, target),
    };
    let label = owner.label();
    let mut source_props = Properties::new();
    source_props.set_as(NAME, "source", source);
    let mut target_props = Properties::new();
    target_props.set_as(NAME, "target", target);

    let (mut cypher, parent, edge) = match_level(owner, path);
    cypher
        .then_node(edge, "s", label, source_props)
        .raw(&format!(" MATCH ({parent})"))
        .then_node(edge, "t", label, target_props)
        .merge_relationship("s", relation.rel_type(), "t", relation.direction(), Properties::new());
    cypher
}

/// `MATCH (r:Resource {address: $address})-[:PROVIDES]->(o:Operation {name: $operation_name})`
pub fn match_operation(address: &AddressPath, name: &str) -> Cypher {
    let mut props = Properties::new();
    props.set_as(NAME, OPERATION_NAME, name);

    let mut cypher = match_resource(address);
    cypher.then_node(PROVIDES, "o", OPERATION, props);
    cypher
}

/// Create a resource specific operation. `props` must include the name.
pub fn create_operation(address: &AddressPath, props: Properties) -> Cypher {
    let mut cypher = match_resource(address);
    cypher.create_related("r", PROVIDES, "o", OPERATION, props);
    cypher
}

/// Merge a global operation and link it to the resource providing it.
pub fn merge_global_operation(address: &AddressPath, name: &str, details: Properties) -> Cypher {
    let mut cypher = match_resource(address);
    cypher
        .merge_node("o", OPERATION, global_operation_key(name))
        .on_create_set("o", details)
        .merge_relationship("r", PROVIDES, "o", Direction::Outgoing, Properties::new());
    cypher
}

pub fn match_global_operation(name: &str) -> Cypher {
    let mut cypher = Cypher::new();
    cypher.match_node("o", OPERATION, global_operation_key(name));
    cypher
}

pub fn link_global_operation(address: &AddressPath, name: &str) -> Cypher {
    let mut cypher = match_resource(address);
    cypher
        .and_node("o", OPERATION, global_operation_key(name))
        .merge_relationship("r", PROVIDES, "o", Direction::Outgoing, Properties::new());
    cypher
}

fn global_operation_key(name: &str) -> Properties {
    Properties::new().with(NAME, name).with(GLOBAL, true)
}

/// Extend `target`, which binds the deprecated entity to `var`, with a
/// `DEPRECATED_SINCE` edge to the merged version node.
pub fn deprecated_since(mut target: Cypher, var: &str, version: &Version, reason: &str) -> Cypher {
    target
        .merge_node(
            "v",
            VERSION,
            Properties::new()
                .with(MAJOR, version.major)
                .with(MINOR, version.minor)
                .with(PATCH, version.patch),
        )
        .on_create_set("v", Properties::new().with(ORDINAL, version.ordinal()))
        .merge_relationship(
            var,
            DEPRECATED_SINCE,
            "v",
            Direction::Outgoing,
            Properties::new().with(REASON, reason),
        );
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher::{Param, Write};
    use pretty_assertions::assert_eq;

    fn address(s: &str) -> AddressPath {
        AddressPath::parse(s).unwrap()
    }

    #[test]
    fn test_create_resource() {
        let mut details = Properties::new();
        details.set(STABILITY, "default");
        let cypher = create_resource(&address("/subsystem=foo"), details);
        assert_eq!(
            cypher.statement(),
            "CREATE (r:Resource {name: $name, address: $address, singleton: $singleton, stability: $stability})"
        );
        assert_eq!(cypher.parameter("name"), Some(&Param::String("subsystem=foo".into())));
        assert_eq!(cypher.parameter("singleton"), Some(&Param::Bool(true)));
    }

    #[test]
    fn test_child_of() {
        let cypher = child_of(&address("/subsystem=foo"), &AddressPath::root());
        assert_eq!(
            cypher.statement(),
            "MATCH (child:Resource {address: $child}), (parent:Resource {address: $parent}) \
             MERGE (child)-[:CHILD_OF]->(parent)"
        );
        assert_eq!(cypher.parameter("parent"), Some(&Param::String("/".into())));
    }

    #[test]
    fn test_nested_attribute() {
        let a = address("/subsystem=foo");
        let owner = Owner::Resource(&a);
        let path = vec!["outer".to_string(), "inner".to_string()];
        let cypher = create_member(&owner, &path, Properties::new().with(NAME, "leaf"));
        assert_eq!(
            cypher.statement(),
            "MATCH (r:Resource {address: $address})-[:HAS_ATTRIBUTE]->(n0:Attribute {name: $name})\
             -[:CONSISTS_OF]->(n1:Attribute {name: $name_1}) \
             CREATE (n1)-[:CONSISTS_OF]->(m:Attribute {name: $name_2})"
        );
        assert_eq!(cypher.parameter("name_2"), Some(&Param::String("leaf".into())));
        assert_eq!(
            cypher.writes()[0],
            Write::CreateNode {
                label: ATTRIBUTE,
                properties: vec![("name".to_string(), "name_2".to_string())],
            }
        );
    }

    #[test]
    fn test_top_level_parameter() {
        let a = address("/subsystem=foo");
        let owner = Owner::Operation { address: &a, name: "baz" };
        let cypher = create_member(&owner, &[], Properties::new().with(NAME, "qux"));
        assert_eq!(
            cypher.statement(),
            "MATCH (r:Resource {address: $address})-[:PROVIDES]->(o:Operation {name: $operation_name}) \
             CREATE (o)-[:ACCEPTS]->(m:Parameter {name: $name})"
        );
        assert_eq!(
            cypher.writes(),
            &[
                Write::CreateNode {
                    label: PARAMETER,
                    properties: vec![("name".to_string(), "name".to_string())],
                },
                Write::CreateRelationship(ACCEPTS),
            ]
        );
    }

    #[test]
    fn test_sibling_relation_in_nested_level() {
        let a = address("/subsystem=foo");
        let owner = Owner::Operation { address: &a, name: "baz" };
        let path = vec!["credential".to_string()];
        let cypher = sibling_relation(&owner, &path, "user", "token", SiblingRelation::Alternative);
        assert_eq!(
            cypher.statement(),
            "MATCH (r:Resource {address: $address})-[:PROVIDES]->(o:Operation {name: $operation_name})\
             -[:ACCEPTS]->(n0:Parameter {name: $name})-[:CONSISTS_OF]->(s:Parameter {name: $source}) \
             MATCH (n0)-[:CONSISTS_OF]->(t:Parameter {name: $target}) MERGE (s)-[:ALTERNATIVE]-(t)"
        );
        assert_eq!(cypher.parameter("source"), Some(&Param::String("token".into())));
        assert_eq!(cypher.parameter("target"), Some(&Param::String("user".into())));
    }

    #[test]
    fn test_alternative_pair_is_one_statement() {
        let a = address("/subsystem=foo");
        let owner = Owner::Resource(&a);
        let forth = sibling_relation(&owner, &[], "a", "b", SiblingRelation::Alternative);
        let back = sibling_relation(&owner, &[], "b", "a", SiblingRelation::Alternative);
        assert_eq!(forth.statement(), back.statement());
        assert_eq!(forth.parameters(), back.parameters());

        let requires = sibling_relation(&owner, &[], "b", "a", SiblingRelation::Requires);
        assert_eq!(requires.parameter("source"), Some(&Param::String("b".into())));
        assert!(requires.statement().ends_with("MERGE (s)-[:REQUIRES]->(t)"));
    }

    #[test]
    fn test_capability_reference_depends_on_the_capability() {
        let a = address("/subsystem=foo");
        let cypher = references_capability(&Owner::Resource(&a), &[], "pool", "org.wildfly.data-source");
        assert_eq!(
            cypher.matched(),
            &[
                "Resource{address=\"/subsystem=foo\"}".to_string(),
                "Capability{name=\"org.wildfly.data-source\"}".to_string(),
            ]
        );
        assert_eq!(match_capability("org.wildfly.data-source").matched()[0], cypher.matched()[1]);
    }

    #[test]
    fn test_context() {
        let a = address("/subsystem=foo");
        let path = vec!["outer".to_string()];
        assert_eq!(Owner::Resource(&a).context(&[], "bar"), "/subsystem=foo@bar");
        assert_eq!(Owner::Resource(&a).context(&path, "bar"), "/subsystem=foo@outer.bar");
        assert_eq!(
            Owner::Operation { address: &a, name: "baz" }.context(&path, "qux"),
            "/subsystem=foo:baz(outer.qux)"
        );
    }

    #[test]
    fn test_global_operation() {
        let a = address("/subsystem=foo");
        let merged = merge_global_operation(&a, "read-attribute", Properties::new().with("read-only", true));
        assert_eq!(
            merged.statement(),
            "MATCH (r:Resource {address: $address}) MERGE (o:Operation {name: $name, global: $global}) \
             ON CREATE SET o.`read-only` = $read_only MERGE (r)-[:PROVIDES]->(o)"
        );

        let linked = link_global_operation(&a, "read-attribute");
        assert_eq!(
            linked.statement(),
            "MATCH (r:Resource {address: $address}), (o:Operation {name: $name, global: $global}) \
             MERGE (r)-[:PROVIDES]->(o)"
        );
    }

    #[test]
    fn test_deprecated_since() {
        let cypher = deprecated_since(
            match_resource(&address("/subsystem=foo")),
            "r",
            &Version::new(7, 2, 0),
            "Use bar instead",
        );
        assert_eq!(
            cypher.statement(),
            "MATCH (r:Resource {address: $address}) \
             MERGE (v:Version {major: $major, minor: $minor, patch: $patch}) \
             ON CREATE SET v.ordinal = $ordinal \
             MERGE (r)-[:DEPRECATED_SINCE {reason: $reason}]->(v)"
        );
        assert_eq!(cypher.parameter("ordinal"), Some(&Param::Int((2 << 10) | (7 << 20))));
    }
}

//! Parameterized Cypher statement builder.
//!
//! Values never end up in the statement text. Every property is rendered as
//! `name: $placeholder` and its value is bound under that placeholder.
//! Property names that are not plain identifiers (`expressions-allowed`) are
//! quoted with backticks, and placeholders are sanitized and made unique per
//! statement, so `foo-bar` and `foo_bar` never share a parameter.
//!
//! Besides text and parameters a statement carries its write plan: which
//! nodes and relationships it creates or merges. Writers use it to report
//! counters. Node writes keep the placeholder of each of their own
//! properties, and `MATCH`ed nodes are kept as keys, so a writer can tell
//! which node a value belongs to and whether the statement can match at all.

use std::collections::BTreeMap;
use std::fmt;

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    String(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::String(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::String(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Int(i64::from(value))
    }
}

impl From<Vec<String>> for Param {
    fn from(value: Vec<String>) -> Self {
        Param::List(value)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::String(s) => write!(f, "{s:?}"),
            Param::Bool(b) => write!(f, "{b}"),
            Param::Int(i) => write!(f, "{i}"),
            Param::List(items) => write!(f, "{items:?}"),
        }
    }
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    placeholder: String,
    value: Param,
}

/// Ordered property map of a node or relationship pattern.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: Vec<Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Properties::set`].
    pub fn with(mut self, name: &str, value: impl Into<Param>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<Param>) -> &mut Self {
        self.set_as(name, name, value)
    }

    /// Set a property whose parameter is named after `placeholder` instead of `name`.
    pub fn set_as(&mut self, name: &str, placeholder: &str, value: impl Into<Param>) -> &mut Self {
        self.entries.push(Property {
            name: name.to_string(),
            placeholder: placeholder.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn set_opt<T: Into<Param>>(&mut self, name: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    /// Append all properties of `other`, keeping their order.
    pub fn extend(&mut self, other: Properties) -> &mut Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.entries.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Relationship direction in a `MERGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Undirected,
}

/// Property names of a node pattern paired with their placeholders.
pub type Placeholders = Vec<(String, String)>;

/// One entry of a statement's write plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    CreateNode { label: &'static str, properties: Placeholders },
    /// `key` identifies the merged node: label plus merge properties.
    MergeNode { label: &'static str, key: String, properties: Placeholders },
    CreateRelationship(&'static str),
    MergeRelationship(&'static str),
}

impl Write {
    /// Whether this write creates a node labeled `label`.
    pub fn creates(&self, label: &str) -> bool {
        matches!(self, Write::CreateNode { label: l, .. } if *l == label)
    }
}

/// Identity of a node: `Label{name="value",...}` over the given properties.
pub fn node_key(label: &str, props: &Properties) -> String {
    let entries = props
        .entries
        .iter()
        .map(|p| format!("{}={}", p.name, p.value))
        .collect::<Vec<_>>()
        .join(",");
    format!("{label}{{{entries}}}")
}

/// A Cypher statement under construction.
#[derive(Debug, Clone, Default)]
pub struct Cypher {
    text: String,
    params: BTreeMap<String, Param>,
    writes: Vec<Write>,
    matched: Vec<String>,
}

impl Cypher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment verbatim. Must not contain literal values.
    pub fn raw(&mut self, fragment: &str) -> &mut Self {
        self.text.push_str(fragment);
        self
    }

    /// `MATCH (var:Label {...})`
    pub fn match_node(&mut self, var: &str, label: &str, props: Properties) -> &mut Self {
        self.matched.push(node_key(label, &props));
        let (node, _) = self.node(var, label, props);
        self.clause(&format!("MATCH {node}"))
    }

    /// `, (var:Label {...})` continuing the current `MATCH`.
    pub fn and_node(&mut self, var: &str, label: &str, props: Properties) -> &mut Self {
        self.matched.push(node_key(label, &props));
        let (node, _) = self.node(var, label, props);
        self.raw(&format!(", {node}"))
    }

    /// `-[:REL]->(var:Label {...})` extending the current pattern.
    pub fn then_node(&mut self, rel: &str, var: &str, label: &str, props: Properties) -> &mut Self {
        let (node, _) = self.node(var, label, props);
        self.raw(&format!("-[:{rel}]->{node}"))
    }

    /// `CREATE (var:Label {...})`
    pub fn create_node(&mut self, var: &str, label: &'static str, props: Properties) -> &mut Self {
        let (node, properties) = self.node(var, label, props);
        self.writes.push(Write::CreateNode { label, properties });
        self.clause(&format!("CREATE {node}"))
    }

    /// `CREATE (from)-[:REL]->(var:Label {...})`
    pub fn create_related(
        &mut self,
        from: &str,
        rel: &'static str,
        var: &str,
        label: &'static str,
        props: Properties,
    ) -> &mut Self {
        let (node, properties) = self.node(var, label, props);
        self.writes.push(Write::CreateNode { label, properties });
        self.writes.push(Write::CreateRelationship(rel));
        self.clause(&format!("CREATE ({from})-[:{rel}]->{node}"))
    }

    /// `MERGE (var:Label {...})`; the properties form the merge key.
    pub fn merge_node(&mut self, var: &str, label: &'static str, props: Properties) -> &mut Self {
        let key = node_key(label, &props);
        let (node, properties) = self.node(var, label, props);
        self.writes.push(Write::MergeNode { label, key, properties });
        self.clause(&format!("MERGE {node}"))
    }

    /// `ON CREATE SET var.name = $name, ...`; nothing if `props` is empty.
    pub fn on_create_set(&mut self, var: &str, props: Properties) -> &mut Self {
        if props.is_empty() {
            return self;
        }
        let assignments = props
            .entries
            .into_iter()
            .map(|p| {
                let key = property_key(&p.name);
                let placeholder = self.bind(&p.placeholder, p.value);
                format!("{var}.{key} = ${placeholder}")
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.clause(&format!("ON CREATE SET {assignments}"))
    }

    /// `MERGE (from)-[:REL {...}]->(to)`, or `-[:REL]-` when undirected.
    pub fn merge_relationship(
        &mut self,
        from: &str,
        rel: &'static str,
        to: &str,
        direction: Direction,
        props: Properties,
    ) -> &mut Self {
        let (map, _) = self.map(props);
        let arrow = match direction {
            Direction::Outgoing => "->",
            Direction::Undirected => "-",
        };
        self.writes.push(Write::MergeRelationship(rel));
        self.clause(&format!("MERGE ({from})-[:{rel}{map}]{arrow}({to})"))
    }

    pub fn statement(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &BTreeMap<String, Param> {
        &self.params
    }

    pub fn parameter(&self, placeholder: &str) -> Option<&Param> {
        self.params.get(placeholder)
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    /// Keys of the nodes the statement `MATCH`es by properties.
    pub fn matched(&self) -> &[String] {
        &self.matched
    }

    fn clause(&mut self, clause: &str) -> &mut Self {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.raw(clause)
    }

    fn node(&mut self, var: &str, label: &str, props: Properties) -> (String, Placeholders) {
        let (map, placeholders) = self.map(props);
        (format!("({var}:{label}{map})"), placeholders)
    }

    fn map(&mut self, props: Properties) -> (String, Placeholders) {
        if props.is_empty() {
            return (String::new(), Vec::new());
        }
        let mut placeholders = Vec::with_capacity(props.len());
        let mut entries = Vec::with_capacity(props.len());
        for p in props.entries {
            let key = property_key(&p.name);
            let placeholder = self.bind(&p.placeholder, p.value);
            entries.push(format!("{key}: ${placeholder}"));
            placeholders.push((p.name, placeholder));
        }
        (format!(" {{{}}}", entries.join(", ")), placeholders)
    }

    /// Bind `value` under a fresh placeholder derived from `hint`.
    fn bind(&mut self, hint: &str, value: Param) -> String {
        let mut safe: String = hint
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if safe.is_empty() || safe.starts_with(|c: char| c.is_ascii_digit()) {
            safe.insert(0, 'p');
        }
        let mut placeholder = safe.clone();
        let mut n = 1;
        while self.params.contains_key(&placeholder) {
            placeholder = format!("{safe}_{n}");
            n += 1;
        }
        self.params.insert(placeholder.clone(), value);
        placeholder
    }
}

impl fmt::Display for Cypher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A property key as it may appear in statement text.
fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

//! Addresses into the management model namespace.
//!
//! An address is an ordered list of `type=value` segments rendered as
//! `/type=value/type=value`. The value `*` denotes all instances of a type
//! and is what the analyzer walks, since child listings only return types.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{MgaError, MgaResult};

/// Segment value denoting a type-level (wildcard) address.
pub const WILDCARD: &str = "*";

/// Addresses with this many segments or more are not analyzed.
pub const MAX_DEPTH: usize = 10;

/// One `type=value` step of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub key: String,
    pub value: String,
}

impl Segment {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn wildcard(key: impl Into<String>) -> Self {
        Self::new(key, WILDCARD)
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == WILDCARD
    }

    /// Parse `type=value`, or a bare `type` which becomes a wildcard.
    fn parse(raw: &str, address: &str) -> MgaResult<Self> {
        let (key, value) = match raw.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (raw.trim(), WILDCARD),
        };
        if key.is_empty() {
            return Err(MgaError::invalid_address(address, format!("segment '{raw}' has no type")));
        }
        if value.is_empty() {
            return Err(MgaError::invalid_address(address, format!("segment '{raw}' has no value")));
        }
        Ok(Self::new(key, value))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Immutable position in the management model tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AddressPath {
    segments: Vec<Segment>,
}

impl AddressPath {
    /// The root address `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse an address such as `/subsystem=datasources/data-source=*`.
    ///
    /// The empty string and `/` both denote the root.
    pub fn parse(address: &str) -> MgaResult<Self> {
        Self::root().add(address)
    }

    /// Return a new address with the segments of `segments` appended.
    ///
    /// `segments` uses the same syntax as [`AddressPath::parse`], so both
    /// `data-source` (a wildcard) and `foo=bar/baz=qux` are accepted.
    /// The receiver is left untouched.
    pub fn add(&self, segments: &str) -> MgaResult<Self> {
        let trimmed = segments.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let mut address = self.clone();
        if trimmed.is_empty() {
            return Ok(address);
        }
        for raw in trimmed.split('/') {
            if raw.is_empty() {
                return Err(MgaError::invalid_address(segments, "empty segment"));
            }
            address.segments.push(Segment::parse(raw, segments)?);
        }
        Ok(address)
    }

    /// Return a new address with one more segment.
    pub fn child(&self, segment: Segment) -> Self {
        let mut address = self.clone();
        address.segments.push(segment);
        address
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments; the root has size 0.
    pub fn size(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this address may still be analyzed (see [`MAX_DEPTH`]).
    pub fn within_max_depth(&self) -> bool {
        self.size() < MAX_DEPTH
    }

    /// Last segment as `type=value`, or `type` for a wildcard. `/` for the root.
    pub fn name(&self) -> String {
        match self.segments.last() {
            None => "/".to_string(),
            Some(last) if last.is_wildcard() => last.key.clone(),
            Some(last) => last.to_string(),
        }
    }

    /// True unless the address is the root or ends in a wildcard.
    pub fn is_singleton(&self) -> bool {
        self.segments.last().is_some_and(|last| !last.is_wildcard())
    }

    /// DMR representation: `[{"type": "value"}, ...]`.
    pub fn to_dmr(&self) -> Value {
        Value::Array(
            self.segments
                .iter()
                .map(|segment| {
                    let mut pair = Map::new();
                    pair.insert(segment.key.clone(), Value::String(segment.value.clone()));
                    Value::Object(pair)
                })
                .collect(),
        )
    }
}

// The rendered form is stored as `Resource.address` and must stay stable.
impl fmt::Display for AddressPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for AddressPath {
    type Err = MgaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

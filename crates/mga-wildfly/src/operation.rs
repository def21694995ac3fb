//! DMR operations sent to the management endpoint.

use std::fmt;

use serde_json::{Map, Value};

use mga_core::dmr::{self, ADDRESS, OP};
use mga_core::AddressPath;

/// A management operation with its address and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: String,
    address: AddressPath,
    params: Vec<(String, Value)>,
}

impl Operation {
    pub fn new(name: &str, address: &AddressPath) -> Self {
        Self {
            name: name.to_string(),
            address: address.clone(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &AddressPath {
        &self.address
    }

    /// Request body: `{"operation": ..., "address": [...], <params>}`.
    pub fn to_dmr(&self) -> Value {
        let mut body = Map::new();
        for (name, value) in &self.params {
            body.insert(name.clone(), value.clone());
        }
        body.insert(OP.to_string(), Value::String(self.name.clone()));
        body.insert(ADDRESS.to_string(), self.address.to_dmr());
        Value::Object(body)
    }

    /// CLI syntax such as `/subsystem=foo:read-resource(recursive=true)`.
    pub fn as_cli(&self) -> String {
        let mut cli = String::new();
        if !self.address.is_root() {
            cli.push_str(&self.address.to_string());
        }
        cli.push(':');
        cli.push_str(&self.name);
        if !self.params.is_empty() {
            let params = self
                .params
                .iter()
                .map(|(name, value)| format!("{name}={}", dmr::as_string(value)))
                .collect::<Vec<_>>()
                .join(",");
            cli.push('(');
            cli.push_str(&params);
            cli.push(')');
        }
        cli
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_cli())
    }
}

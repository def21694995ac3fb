//! DMR vocabulary and helpers for JSON-encoded model descriptions.
//!
//! The HTTP management interface returns descriptions as JSON. Type values are
//! wrapped as `{"TYPE_MODEL_VALUE": "STRING"}` and expressions as
//! `{"EXPRESSION_VALUE": "${x}"}`; the helpers here unwrap both.

use serde_json::Value;

pub const ACCESS_CONSTRAINTS: &str = "access-constraints";
pub const ACCESS_TYPE: &str = "access-type";
pub const ADDRESS: &str = "address";
pub const ALIAS: &str = "alias";
pub const ALLOWED: &str = "allowed";
pub const ALTERNATIVES: &str = "alternatives";
pub const ATTRIBUTE_GROUP: &str = "attribute-group";
pub const ATTRIBUTES: &str = "attributes";
pub const ATTRIBUTES_ONLY: &str = "attributes-only";
pub const CAPABILITIES: &str = "capabilities";
pub const CAPABILITY_REFERENCE: &str = "capability-reference";
pub const CHILDREN: &str = "children";
pub const CHILD_DESCRIPTIONS: &str = "child-descriptions";
pub const DEFAULT: &str = "default";
pub const DEPRECATED: &str = "deprecated";
pub const DESCRIPTION: &str = "description";
pub const EXPRESSIONS_ALLOWED: &str = "expressions-allowed";
pub const FAILED: &str = "failed";
pub const FAILURE_DESCRIPTION: &str = "failure-description";
pub const GLOBAL: &str = "global";
pub const IDENTIFIER: &str = "identifier";
pub const INCLUDE_ALIASES: &str = "include-aliases";
pub const INCLUDE_RUNTIME: &str = "include-runtime";
pub const INCLUDE_SINGLETONS: &str = "include-singletons";
pub const MAJOR: &str = "major";
pub const MANAGEMENT_MAJOR_VERSION: &str = "management-major-version";
pub const MANAGEMENT_MICRO_VERSION: &str = "management-micro-version";
pub const MANAGEMENT_MINOR_VERSION: &str = "management-minor-version";
pub const MANAGEMENT_VERSION: &str = "management-version";
pub const MAX: &str = "max";
pub const MAX_LENGTH: &str = "max-length";
pub const MIN: &str = "min";
pub const MIN_LENGTH: &str = "min-length";
pub const MINOR: &str = "minor";
pub const NAME: &str = "name";
pub const NILLABLE: &str = "nillable";
pub const OP: &str = "operation";
pub const OPERATION_NAME: &str = "operation-name";
pub const OPERATIONS: &str = "operations";
pub const ORDINAL: &str = "ordinal";
pub const OUTCOME: &str = "outcome";
pub const PATCH: &str = "patch";
pub const PRODUCT_NAME: &str = "product-name";
pub const PRODUCT_VERSION: &str = "product-version";
pub const READ_CHILDREN_TYPES: &str = "read-children-types";
pub const READ_ONLY: &str = "read-only";
pub const READ_RESOURCE: &str = "read-resource";
pub const READ_RESOURCE_DESCRIPTION: &str = "read-resource-description";
pub const REASON: &str = "reason";
pub const REPLY_PROPERTIES: &str = "reply-properties";
pub const REQUEST_PROPERTIES: &str = "request-properties";
pub const REQUIRED: &str = "required";
pub const REQUIRES: &str = "requires";
pub const RESTART_REQUIRED: &str = "restart-required";
pub const RESULT: &str = "result";
pub const RETURN_VALUE: &str = "return-value";
pub const RUNTIME_ONLY: &str = "runtime-only";
pub const SENSITIVE: &str = "sensitive";
pub const SINCE: &str = "since";
pub const SINGLETON: &str = "singleton";
pub const STABILITY: &str = "stability";
pub const STORAGE: &str = "storage";
pub const SUCCESS: &str = "success";
pub const TYPE: &str = "type";
pub const UNIT: &str = "unit";
pub const VALUE_TYPE: &str = "value-type";

/// Operations offered by (nearly) every resource. `add` and `remove` are
/// deliberately absent: their parameters differ per resource.
pub const GLOBAL_OPERATIONS: &[&str] = &[
    "list-add",
    "list-clear",
    "list-get",
    "list-remove",
    "map-clear",
    "map-get",
    "map-put",
    "map-remove",
    "query",
    "read-attribute",
    "read-attribute-group",
    "read-attribute-group-names",
    "read-children-names",
    "read-children-resources",
    "read-children-types",
    "read-operation-description",
    "read-operation-names",
    "read-resource-description",
    "read-resource",
    "undefine-attribute",
    "whoami",
    "write-attribute",
];

/// Name used for any nested (object) value type.
pub const OBJECT_TYPE: &str = "OBJECT";

const TYPE_MODEL_VALUE: &str = "TYPE_MODEL_VALUE";
const EXPRESSION_VALUE: &str = "EXPRESSION_VALUE";

pub fn is_global_operation(name: &str) -> bool {
    GLOBAL_OPERATIONS.contains(&name)
}

/// The child `key` of `node`, unless missing or null.
pub fn defined<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    node.get(key).filter(|value| !value.is_null())
}

/// Whether `node` is defined at all.
pub fn is_defined(node: &Value) -> bool {
    !node.is_null()
}

/// Render a value as a string the way DMR's `asString` would.
pub fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        Value::Object(_) => type_name(value)
            .or_else(|| expression(value))
            .unwrap_or_else(|| value.to_string()),
        Value::Array(_) => value.to_string(),
    }
}

pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Elements of a list value; anything else has none.
pub fn as_list(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        _ => &[],
    }
}

/// List elements rendered as strings.
pub fn strings(value: &Value) -> Vec<String> {
    as_list(value).iter().map(as_string).collect()
}

/// Named entries of an object value, in server order.
pub fn properties(value: &Value) -> Vec<(&str, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        _ => Vec::new(),
    }
}

/// The type name of a value such as `STRING` or `{"TYPE_MODEL_VALUE": "STRING"}`.
pub fn type_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) if map.len() == 1 => {
            map.get(TYPE_MODEL_VALUE).and_then(Value::as_str).map(str::to_string)
        }
        _ => None,
    }
}

fn expression(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) if map.len() == 1 => {
            map.get(EXPRESSION_VALUE).and_then(Value::as_str).map(str::to_string)
        }
        _ => None,
    }
}

/// Whether a `value-type` describes a nested structure rather than naming a type.
pub fn is_nested(value_type: &Value) -> bool {
    value_type.is_object() && type_name(value_type).is_none()
}

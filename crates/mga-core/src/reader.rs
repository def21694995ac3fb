//! Read access to a management model.

use async_trait::async_trait;
use serde_json::Value;

use crate::address::AddressPath;

/// Source of resource descriptions.
///
/// Failures are reported as `None`; implementations log the cause and never
/// abort the caller.
#[async_trait]
pub trait ModelReader: Send + Sync {
    /// Root attributes including runtime values (product name, versions).
    async fn identity(&self) -> Option<Value>;

    /// Resource description including aliases and operations.
    ///
    /// For wildcard addresses the result is a list with one
    /// `{address, outcome, result}` entry per matching instance.
    async fn describe(&self, address: &AddressPath) -> Option<Value>;

    /// Child type names, singletons included.
    async fn child_types(&self, address: &AddressPath) -> Option<Vec<String>>;
}

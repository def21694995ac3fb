use serde_json::Value;

use mga_core::dmr::{
    self, MANAGEMENT_MAJOR_VERSION, MANAGEMENT_MICRO_VERSION, MANAGEMENT_MINOR_VERSION,
    PRODUCT_NAME, PRODUCT_VERSION,
};
use mga_core::Version;

const DEFAULT_PRODUCT_NAME: &str = "WildFly";
const DEFAULT_PRODUCT_VERSION: &str = "0.0.0";

/// The server a graph was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub product_name: String,
    pub product_version: String,
    pub management_version: Version,
}

impl Identity {
    /// Extract the identity from the root resource. Missing values fall back
    /// to `WildFly` and `0.0.0`.
    pub fn from_root(root: &Value) -> Self {
        let text = |key: &str, default: &str| {
            dmr::defined(root, key)
                .map(dmr::as_string)
                .unwrap_or_else(|| default.to_string())
        };
        let number = |key: &str| {
            dmr::defined(root, key)
                .and_then(dmr::as_i64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0)
        };

        Self {
            product_name: text(PRODUCT_NAME, DEFAULT_PRODUCT_NAME),
            product_version: text(PRODUCT_VERSION, DEFAULT_PRODUCT_VERSION),
            management_version: Version::new(
                number(MANAGEMENT_MAJOR_VERSION),
                number(MANAGEMENT_MINOR_VERSION),
                number(MANAGEMENT_MICRO_VERSION),
            ),
        }
    }

    /// `wildfly-28.0.0.final-mgt-22.0.0` style identifier.
    pub fn identifier(&self) -> String {
        format!(
            "{}-{}-mgt-{}",
            identify(&self.product_name),
            self.product_version,
            self.management_version
        )
    }
}

/// Lower-case a name and replace whitespace by dashes.
fn identify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

//! HTTP client for the WildFly management interface.
//!
//! Operations are posted as JSON to `http://<host>:<port>/management`.
//! Failed operations are logged in CLI syntax and reported as `None`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use mga_core::dmr::{
    self, ATTRIBUTES_ONLY, FAILED, FAILURE_DESCRIPTION, INCLUDE_ALIASES, INCLUDE_RUNTIME,
    INCLUDE_SINGLETONS, OPERATIONS, OUTCOME, READ_CHILDREN_TYPES, READ_RESOURCE,
    READ_RESOURCE_DESCRIPTION, RESULT, SUCCESS,
};
use mga_core::{AddressPath, HostAndPort, ModelReader};

use crate::operation::Operation;

/// Default port of the HTTP management interface.
pub const DEFAULT_PORT: u16 = 9990;

/// Configuration for connecting to WildFly.
#[derive(Debug, Clone)]
pub struct WildFlyConfig {
    pub host: HostAndPort,
    pub user: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for WildFlyConfig {
    fn default() -> Self {
        Self {
            host: HostAndPort::new("localhost", DEFAULT_PORT),
            user: "admin".to_string(),
            password: "admin".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl WildFlyConfig {
    /// Management endpoint URL.
    pub fn endpoint(&self) -> String {
        let host = self.host.clone().with_default_port(DEFAULT_PORT);
        format!("http://{host}/management")
    }
}

/// Reads the management model over HTTP.
#[derive(Clone)]
pub struct WildFlyClient {
    endpoint: String,
    user: String,
    password: String,
    client: reqwest::Client,
}

impl WildFlyClient {
    pub fn new(config: &WildFlyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let endpoint = config.endpoint();
        info!(%endpoint, user = %config.user, "Using WildFly management interface");

        Ok(Self {
            endpoint,
            user: config.user.clone(),
            password: config.password.clone(),
            client,
        })
    }

    /// Execute an operation and return its result.
    pub async fn execute(&self, operation: &Operation) -> Option<Value> {
        debug!(%operation, "Execute operation");
        match self.send(operation).await {
            Ok(response) => interpret(operation, &response),
            Err(e) => {
                error!(%operation, error = %format!("{e:#}"), "Unable to execute operation");
                None
            }
        }
    }

    async fn send(&self, operation: &Operation) -> Result<Value> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .json(&operation.to_dmr())
            .send()
            .await
            .with_context(|| format!("Failed to connect to WildFly at {}", self.endpoint))?;

        // failed operations come back as 500 with a regular DMR body
        let status = response.status();
        let body = response.text().await.context("Failed to read WildFly response")?;
        serde_json::from_str(&body).with_context(|| format!("WildFly API error ({status}): {body}"))
    }
}

/// Unwrap the result of a DMR response envelope.
fn interpret(operation: &Operation, response: &Value) -> Option<Value> {
    let outcome = dmr::defined(response, OUTCOME).map(dmr::as_string);
    match outcome.as_deref() {
        Some(SUCCESS) => dmr::defined(response, RESULT).cloned(),
        Some(FAILED) => {
            let failure = dmr::defined(response, FAILURE_DESCRIPTION)
                .map(dmr::as_string)
                .unwrap_or_default();
            error!(%operation, %failure, "Unable to execute operation");
            None
        }
        Some(outcome) => {
            error!(%operation, %outcome, "Unable to execute operation, unknown outcome");
            None
        }
        None => {
            error!(%operation, "Unable to execute operation, no outcome");
            None
        }
    }
}

#[async_trait]
impl ModelReader for WildFlyClient {
    async fn identity(&self) -> Option<Value> {
        let operation = Operation::new(READ_RESOURCE, &AddressPath::root())
            .param(ATTRIBUTES_ONLY, true)
            .param(INCLUDE_RUNTIME, true);
        self.execute(&operation).await
    }

    async fn describe(&self, address: &AddressPath) -> Option<Value> {
        let operation = Operation::new(READ_RESOURCE_DESCRIPTION, address)
            .param(INCLUDE_ALIASES, true)
            .param(OPERATIONS, true);
        self.execute(&operation).await
    }

    async fn child_types(&self, address: &AddressPath) -> Option<Vec<String>> {
        let operation =
            Operation::new(READ_CHILDREN_TYPES, address).param(INCLUDE_SINGLETONS, true);
        self.execute(&operation).await.map(|types| dmr::strings(&types))
    }
}

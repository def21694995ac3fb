//! Host and port pairs for the WildFly and Neo4j endpoints.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{MgaError, MgaResult};

/// A host with an optional port.
///
/// Accepts `example.com`, `example.com:80`, `192.0.2.1:80`, `[2001:db8::1]`,
/// `[2001:db8::1]:80` and bare IPv6 literals such as `2001:db8::1`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HostAndPort {
    host: String,
    port: Option<u16>,
}

impl HostAndPort {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn has_port(&self) -> bool {
        self.port.is_some()
    }

    /// Fill in `port` when none was given.
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.port.get_or_insert(port);
        self
    }

    pub fn parse(input: &str) -> MgaResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(MgaError::InvalidHostAndPort(input.to_string()));
        }

        let (host, port) = if let Some(rest) = input.strip_prefix('[') {
            let (host, after) = rest
                .split_once(']')
                .ok_or_else(|| MgaError::InvalidHostAndPort(input.to_string()))?;
            let port = match after {
                "" => None,
                _ => Some(
                    after
                        .strip_prefix(':')
                        .ok_or_else(|| MgaError::InvalidHostAndPort(input.to_string()))?,
                ),
            };
            (host, port)
        } else {
            match input.split_once(':') {
                // more than one colon: a bare IPv6 literal without port
                Some((_, rest)) if rest.contains(':') => (input, None),
                Some((host, port)) => (host, Some(port)),
                None => (input, None),
            }
        };

        if host.is_empty() {
            return Err(MgaError::InvalidHostAndPort(input.to_string()));
        }
        let port = match port {
            Some(raw) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => Some(
                raw.parse::<u16>()
                    .map_err(|_| MgaError::PortOutOfRange(raw.to_string()))?,
            ),
            Some(_) => return Err(MgaError::InvalidHostAndPort(input.to_string())),
            None => None,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl FromStr for HostAndPort {
    type Err = MgaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HostAndPort {
    type Error = MgaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for HostAndPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]", self.host)?;
        } else {
            f.write_str(&self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

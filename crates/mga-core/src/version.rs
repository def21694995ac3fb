//! Model versions referenced by deprecation markers.

use std::fmt;
use std::str::FromStr;

use crate::error::{MgaError, MgaResult};

/// A `major.minor.patch` management model version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Parse exactly three dot-separated non-negative integers.
    pub fn parse(value: &str) -> MgaResult<Self> {
        let invalid = || MgaError::InvalidVersion(value.to_string());
        let mut numbers = [0u32; 3];
        let mut parts = value.split('.');
        for slot in numbers.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }

    /// Sortable single number: `patch | minor << 10 | major << 20`.
    pub fn ordinal(&self) -> i64 {
        i64::from(self.patch) | i64::from(self.minor) << 10 | i64::from(self.major) << 20
    }
}

impl FromStr for Version {
    type Err = MgaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

//! # MGA WildFly
//!
//! Reads the WildFly management model over the HTTP management interface.

pub mod client;
pub mod operation;

pub use client::{WildFlyClient, WildFlyConfig, DEFAULT_PORT};
pub use operation::Operation;

//! # MGA Core
//!
//! Building blocks shared by the model graph analyzer crates: management
//! model addresses, DMR vocabulary, the [`ModelReader`] seam and run
//! statistics.

pub mod address;
pub mod dmr;
pub mod error;
pub mod host;
pub mod reader;
pub mod stats;
pub mod version;

pub use address::{AddressPath, Segment, MAX_DEPTH, WILDCARD};
pub use error::{MgaError, MgaResult};
pub use host::HostAndPort;
pub use reader::ModelReader;
pub use stats::Stats;
pub use version::Version;

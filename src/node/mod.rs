//! Mesh node data model.
//!
//! This module provides:
//! - [`NodeId`]: 32-bit node numbers
//! - [`Node`] / [`User`]: Node records as reported by the node store
//! - [`NodeDirectory`]: Lookup interface onto the external node store
//! - [`NodeTable`] / [`SharedNodeTable`]: In-memory directory implementations

mod directory;
mod id;
mod record;

pub use directory::{NodeDirectory, NodeTable, SharedNodeTable};
pub use id::{NodeId, NodeIdParseError};
pub use record::{Node, SessionPasskey, User, UNKNOWN_NAME};

//! Remote administration routing.
//!
//! This module provides:
//! - [`LocalContext`]: Session state passed into each resolution
//! - [`ConnectionState`]: Connection provider for the attached device
//! - [`resolve_path`]: Classifies a node into one [`AdministrationPath`]

mod context;
mod path;

pub use context::{ConnectionState, LocalContext};
pub use path::{resolve_path, AdministrationPath, HandshakeScheme};

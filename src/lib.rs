//! Capability-gated configuration routing for mesh radio nodes.
//!
//! Decides which configuration screens apply to a node, based on the modules
//! its firmware was built with, and how a node that is not the attached
//! device can be administered remotely.

pub mod admin;
pub mod config;
pub mod console;
pub mod modules;
pub mod node;
pub mod region;
pub mod selection;
pub mod settings;
pub mod status;
pub mod transport;

// Re-export commonly used items
pub use admin::{resolve_path, AdministrationPath, ConnectionState, HandshakeScheme, LocalContext};
pub use config::Preferences;
pub use modules::{any_module_available, is_module_available, ExcludedModules, ModuleId};
pub use node::{Node, NodeDirectory, NodeId, NodeTable, SharedNodeTable};
pub use region::RegionCode;
pub use selection::{
    ConnectionEvent, Selection, SelectionController, SelectionError, SelectionState,
};
pub use settings::{SettingsDestination, SettingsMenu};
pub use status::{RouterStatus, StatusServer, DEFAULT_STATUS_PORT};
pub use transport::{MetadataDispatcher, MetadataRequest, MetadataRequester, MetadataWorker};

//! Local context threaded into every resolution.

use crate::config::Preferences;
use crate::node::NodeId;

/// Connection state provider for the locally attached device.
pub trait ConnectionState {
    /// Whether the transport to the local device is up.
    fn is_connected(&self) -> bool;

    /// Node number of the attached device, once it has reported it.
    fn active_device_id(&self) -> Option<NodeId>;
}

/// Per-call snapshot of the session state the resolver depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalContext {
    /// Use PKI administration when a node qualifies for either scheme.
    pub prefer_administration_via_pki: bool,
    /// Show every module regardless of firmware exclusions.
    pub module_filter_override: bool,
    /// The attached device, or `None` while disconnected.
    pub connected_node_id: Option<NodeId>,
}

impl LocalContext {
    /// Build a context from the stored preferences and the live connection.
    pub fn new(preferences: &Preferences, connection: &impl ConnectionState) -> Self {
        let connected_node_id = if connection.is_connected() {
            connection.active_device_id()
        } else {
            None
        };

        Self {
            prefer_administration_via_pki: preferences.prefer_administration_via_pki,
            module_filter_override: preferences.module_filter_override,
            connected_node_id,
        }
    }

    /// Whether a local device is attached.
    pub fn is_connected(&self) -> bool {
        self.connected_node_id.is_some()
    }
}

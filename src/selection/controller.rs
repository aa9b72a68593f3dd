//! Selection of the node being configured.

use crate::admin::{resolve_path, AdministrationPath, HandshakeScheme, LocalContext};
use crate::node::{NodeDirectory, NodeId};
use crate::transport::{MetadataRequest, MetadataRequester};
use log::{debug, info, warn};
use std::fmt;

/// Why a selection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// No local device is attached.
    NotConnected,
    /// The requested target is not in the node directory.
    UnknownTarget(NodeId),
    /// The attached device has not shown up in the node directory yet.
    UnknownConnectedNode(NodeId),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no device connected"),
            Self::UnknownTarget(id) => write!(f, "unknown target node {}", id),
            Self::UnknownConnectedNode(id) => write!(f, "connected node {} not in directory", id),
        }
    }
}

impl std::error::Error for SelectionError {}

/// Outcome of an accepted selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The newly selected node.
    pub target: NodeId,
    /// How that node resolved at selection time.
    pub path: AdministrationPath,
    /// Whether a metadata request was dispatched for it.
    pub metadata_requested: bool,
}

/// Selection state, derived from the current node record on each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected, typically while disconnected.
    Unselected,
    /// The attached device is selected.
    SelectedLocal(NodeId),
    /// A remote node with an established admin session.
    SelectedRemoteAuthenticated(NodeId, HandshakeScheme),
    /// A remote node waiting on a handshake.
    SelectedRemotePendingHandshake(NodeId, HandshakeScheme),
    /// A node that cannot be configured right now.
    SelectedUnavailable(NodeId),
}

impl SelectionState {
    /// The selected node, if any.
    pub fn target(self) -> Option<NodeId> {
        match self {
            Self::Unselected => None,
            Self::SelectedLocal(id)
            | Self::SelectedRemoteAuthenticated(id, _)
            | Self::SelectedRemotePendingHandshake(id, _)
            | Self::SelectedUnavailable(id) => Some(id),
        }
    }

    fn from_path(id: NodeId, path: AdministrationPath) -> Self {
        if let Some(scheme) = path.session() {
            return Self::SelectedRemoteAuthenticated(id, scheme);
        }
        if let Some(scheme) = path.handshake() {
            return Self::SelectedRemotePendingHandshake(id, scheme);
        }
        match path {
            AdministrationPath::LocalAccess => Self::SelectedLocal(id),
            _ => Self::SelectedUnavailable(id),
        }
    }
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unselected => write!(f, "unselected"),
            Self::SelectedLocal(id) => write!(f, "{} (local)", id),
            Self::SelectedRemoteAuthenticated(id, scheme) => {
                write!(f, "{} ({} session)", id, scheme)
            }
            Self::SelectedRemotePendingHandshake(id, scheme) => {
                write!(f, "{} (awaiting {} handshake)", id, scheme)
            }
            Self::SelectedUnavailable(id) => write!(f, "{} (unavailable)", id),
        }
    }
}

/// Connectivity changes of the local device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A device reported its node number.
    Connected(NodeId),
    /// The link to the device went down.
    Disconnected,
}

/// Owns the selected target and issues the handshake request for it.
///
/// A metadata request is sent only when the selected node or the attached
/// device changes, so repeated selection of the same node from the same
/// device costs nothing.
pub struct SelectionController<R> {
    requester: R,
    selected: Option<NodeId>,
    // Device the current selection was made from.
    selected_from: Option<NodeId>,
    explicit: bool,
}

impl<R: MetadataRequester> SelectionController<R> {
    /// Create a controller with nothing selected.
    pub fn new(requester: R) -> Self {
        Self {
            requester,
            selected: None,
            selected_from: None,
            explicit: false,
        }
    }

    /// The currently selected node.
    pub fn selected_target(&self) -> Option<NodeId> {
        self.selected
    }

    /// Whether the current selection came from [`Self::select_target`].
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// Select `target` for configuration.
    ///
    /// Both the target and the connected node must be known to `directory`;
    /// otherwise the previous selection is kept untouched.
    pub fn select_target(
        &mut self,
        target: NodeId,
        ctx: &LocalContext,
        directory: &impl NodeDirectory,
    ) -> Result<Selection, SelectionError> {
        let connected = ctx.connected_node_id.ok_or(SelectionError::NotConnected)?;

        let node = directory
            .find_node(target)
            .ok_or(SelectionError::UnknownTarget(target))
            .inspect_err(|e| warn!("Rejected selection: {}", e))?;
        directory
            .find_node(connected)
            .ok_or(SelectionError::UnknownConnectedNode(connected))
            .inspect_err(|e| warn!("Rejected selection: {}", e))?;

        let path = resolve_path(ctx, Some(&node));
        let changed =
            self.selected != Some(target) || self.selected_from != Some(connected);

        let mut metadata_requested = false;
        if let Some(scheme) = path.handshake().filter(|_| changed) {
            self.requester.request_metadata(MetadataRequest {
                from: connected,
                to: target,
                scheme,
            });
            metadata_requested = true;
        }

        self.selected = Some(target);
        self.selected_from = Some(connected);
        self.explicit = true;

        if changed {
            info!("Selected {} ({})", node.display_name(), path);
        } else {
            debug!("Reselected {} ({})", target, path);
        }

        Ok(Selection {
            target,
            path,
            metadata_requested,
        })
    }

    /// Apply a connectivity change.
    pub fn handle_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Disconnected => {
                if let Some(id) = self.selected {
                    debug!("Disconnected, clearing selection of {}", id);
                }
                self.clear();
            }
            ConnectionEvent::Connected(id) if !self.explicit => {
                debug!("Connected to {}, selecting it", id);
                self.selected = Some(id);
                self.selected_from = Some(id);
            }
            ConnectionEvent::Connected(id) => {
                debug!("Connected to {}, keeping explicit selection", id);
            }
        }
    }

    /// Drop the selection.
    pub fn clear(&mut self) {
        self.selected = None;
        self.selected_from = None;
        self.explicit = false;
    }

    /// Current selection state, resolved against the latest node record.
    pub fn state(&self, ctx: &LocalContext, directory: &impl NodeDirectory) -> SelectionState {
        match self.selected {
            None => SelectionState::Unselected,
            Some(id) => {
                let node = directory.find_node(id);
                SelectionState::from_path(id, resolve_path(ctx, node.as_ref()))
            }
        }
    }

    /// Resolved path of the selected node.
    pub fn selected_path(
        &self,
        ctx: &LocalContext,
        directory: &impl NodeDirectory,
    ) -> Option<AdministrationPath> {
        self.selected
            .map(|id| resolve_path(ctx, directory.find_node(id).as_ref()))
    }
}

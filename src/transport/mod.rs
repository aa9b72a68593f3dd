//! Metadata request plumbing.
//!
//! Before a remote node can be configured it has to answer a device metadata
//! request sent from the attached device. The router never waits for that
//! answer: selection hands a [`MetadataRequest`] to a [`MetadataRequester`]
//! and moves on. The node store reflects the outcome once the transport
//! records the handshake.
//!
//! This module provides:
//! - [`MetadataRequester`]: Synchronous fire-and-forget submission
//! - [`MetadataTransport`]: The async link to the local device
//! - [`MetadataDispatcher`] / [`MetadataWorker`]: Channel-backed requester and
//!   the task that drains it
//! - [`DispatchStats`]: Counters for the status endpoint

mod dispatcher;

pub use dispatcher::{DispatchStats, MetadataDispatcher, MetadataWorker};

use crate::admin::HandshakeScheme;
use crate::node::NodeId;
use std::future::Future;

/// A metadata request from the attached device to a remote node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataRequest {
    /// The locally connected device.
    pub from: NodeId,
    /// The node being administered.
    pub to: NodeId,
    /// Handshake the request is meant to complete.
    pub scheme: HandshakeScheme,
}

impl std::fmt::Display for MetadataRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} metadata {} -> {}", self.scheme, self.from, self.to)
    }
}

/// Transport errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The local device is not connected.
    NotConnected,
    /// No response before the deadline.
    Timeout,
    /// The remote node refused the request.
    Rejected(String),
    /// The transport has shut down.
    ChannelClosed,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "local device not connected"),
            Self::Timeout => write!(f, "metadata request timed out"),
            Self::Rejected(reason) => write!(f, "request rejected: {}", reason),
            Self::ChannelClosed => write!(f, "transport channel closed"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Async link to the local device that can carry metadata requests.
pub trait MetadataTransport: Send + Sync + 'static {
    /// Send a metadata request and wait for it to complete.
    fn request_metadata(
        &self,
        request: &MetadataRequest,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Fire-and-forget submission of metadata requests.
///
/// Implementations must return immediately. Failures are theirs to log.
pub trait MetadataRequester {
    /// Submit a request without waiting for the outcome.
    fn request_metadata(&self, request: MetadataRequest);
}

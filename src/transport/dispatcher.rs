//! Channel-backed metadata dispatch.

use super::{MetadataRequest, MetadataRequester, MetadataTransport};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Metadata request counters.
#[derive(Debug, Default)]
pub struct DispatchStats {
    /// Requests handed to the worker.
    pub dispatched: AtomicUsize,
    /// Requests the transport completed.
    pub completed: AtomicUsize,
    /// Requests the transport failed.
    pub failed: AtomicUsize,
}

impl DispatchStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot as `(dispatched, completed, failed)`.
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (
            self.dispatched.load(Ordering::Relaxed),
            self.completed.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

/// Sending half of the metadata queue.
///
/// Cheap to clone. Submitting never blocks, so it can be called from the
/// synchronous selection path.
#[derive(Debug, Clone)]
pub struct MetadataDispatcher {
    tx: mpsc::UnboundedSender<MetadataRequest>,
    stats: Arc<DispatchStats>,
}

impl MetadataDispatcher {
    /// Create a dispatcher and the receiver a [`MetadataWorker`] drains.
    pub fn channel(stats: Arc<DispatchStats>) -> (Self, mpsc::UnboundedReceiver<MetadataRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, stats }, rx)
    }
}

impl MetadataRequester for MetadataDispatcher {
    fn request_metadata(&self, request: MetadataRequest) {
        match self.tx.send(request) {
            Ok(()) => {
                self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
                info!("Queued {}", request);
            }
            Err(_) => warn!("Metadata worker gone, dropping {}", request),
        }
    }
}

/// Task that forwards queued requests to the transport.
pub struct MetadataWorker;

impl MetadataWorker {
    /// Spawn the worker on the current runtime.
    ///
    /// Requests are sent one at a time and never retried. The worker exits
    /// when `cancel` fires or every [`MetadataDispatcher`] is dropped; a
    /// request already in flight runs to completion first.
    pub fn spawn<T: MetadataTransport>(
        transport: Arc<T>,
        mut rx: mpsc::UnboundedReceiver<MetadataRequest>,
        cancel: CancellationToken,
        stats: Arc<DispatchStats>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let request = tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Metadata worker shutting down");
                        break;
                    }
                    next = rx.recv() => match next {
                        Some(request) => request,
                        None => {
                            debug!("Metadata queue closed");
                            break;
                        }
                    },
                };

                match transport.request_metadata(&request).await {
                    Ok(()) => {
                        stats.completed.fetch_add(1, Ordering::Relaxed);
                        info!("Completed {}", request);
                    }
                    Err(e) => {
                        stats.failed.fetch_add(1, Ordering::Relaxed);
                        warn!("{} failed: {}", request, e);
                    }
                }
            }
        })
    }
}

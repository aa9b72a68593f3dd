//! HTTP status endpoint.
//!
//! Serves the router's current state at `GET /status` as JSON. Uses
//! `tiny_http` on a background thread so it works without the async runtime.
//!
//! # Example Response
//!
//! ```json
//! {
//!   "uptime_secs": 42,
//!   "connected_node": "!0000abcd",
//!   "selected_target": "!00001234",
//!   "selection_state": "!00001234 (awaiting legacy handshake)",
//!   "path": "Request Legacy Admin",
//!   "prefer_administration_via_pki": false,
//!   "module_filter_override": false,
//!   "known_nodes": 12,
//!   "metadata": { "dispatched": 3, "completed": 2, "failed": 1 }
//! }
//! ```

use crate::admin::LocalContext;
use crate::node::NodeDirectory;
use crate::selection::SelectionController;
use crate::transport::{DispatchStats, MetadataRequester};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tiny_http::{Header, Method, Response, Server};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default port for the status server.
pub const DEFAULT_STATUS_PORT: u16 = 8080;

/// Selection fields of the status document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub connected_node: Option<String>,
    pub selected_target: Option<String>,
    pub selection_state: String,
    pub path: Option<String>,
    pub prefer_administration_via_pki: bool,
    pub module_filter_override: bool,
    pub known_nodes: usize,
}

impl SelectionSnapshot {
    /// Capture the controller's view of the session.
    pub fn capture<R: MetadataRequester>(
        controller: &SelectionController<R>,
        ctx: &LocalContext,
        directory: &impl NodeDirectory,
    ) -> Self {
        Self {
            connected_node: ctx.connected_node_id.map(|id| id.to_string()),
            selected_target: controller.selected_target().map(|id| id.to_string()),
            selection_state: controller.state(ctx, directory).to_string(),
            path: controller
                .selected_path(ctx, directory)
                .map(|p| p.to_string()),
            prefer_administration_via_pki: ctx.prefer_administration_via_pki,
            module_filter_override: ctx.module_filter_override,
            known_nodes: directory.len(),
        }
    }
}

#[derive(Serialize)]
struct MetadataCounters {
    dispatched: usize,
    completed: usize,
    failed: usize,
}

#[derive(Serialize)]
struct StatusDocument<'a> {
    uptime_secs: u64,
    #[serde(flatten)]
    selection: &'a SelectionSnapshot,
    metadata: MetadataCounters,
}

/// Router status shared between the command loop and the server thread.
#[derive(Debug)]
pub struct RouterStatus {
    start_time: Instant,
    selection: Mutex<SelectionSnapshot>,
    dispatch: Arc<DispatchStats>,
}

impl RouterStatus {
    /// Create status backed by the dispatcher's counters.
    pub fn new(dispatch: Arc<DispatchStats>) -> Self {
        Self {
            start_time: Instant::now(),
            selection: Mutex::new(SelectionSnapshot {
                selection_state: "unselected".to_string(),
                ..SelectionSnapshot::default()
            }),
            dispatch,
        }
    }

    /// Replace the selection snapshot.
    pub fn update(&self, snapshot: SelectionSnapshot) {
        *self.selection.lock().unwrap_or_else(|e| e.into_inner()) = snapshot;
    }

    /// Current selection snapshot.
    pub fn selection(&self) -> SelectionSnapshot {
        self.selection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Serialize the full status to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let selection = self.selection();
        let (dispatched, completed, failed) = self.dispatch.snapshot();
        serde_json::to_string(&StatusDocument {
            uptime_secs: self.uptime_secs(),
            selection: &selection,
            metadata: MetadataCounters {
                dispatched,
                completed,
                failed,
            },
        })
    }
}

/// Refresh the selection snapshot from `capture` every `every` until
/// `cancel` fires.
pub fn spawn_status_refresh<F>(
    status: Arc<RouterStatus>,
    capture: F,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    F: Fn() -> SelectionSnapshot + Send + 'static,
{
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(every);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        timer.tick().await; // Skip first

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Status refresh stopped");
                    break;
                }
                _ = timer.tick() => status.update(capture()),
            }
        }
    })
}

/// HTTP status server.
///
/// Runs in a background thread. Drop it to stop the server.
pub struct StatusServer {
    handle: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    port: u16,
}

impl StatusServer {
    /// Start the status server.
    ///
    /// `bind_addr` of `None` listens on all interfaces. Port 0 picks a free
    /// port, see [`StatusServer::port`].
    pub fn start(
        bind_addr: Option<IpAddr>,
        port: u16,
        status: Arc<RouterStatus>,
    ) -> Result<Self, std::io::Error> {
        let addr = match bind_addr {
            Some(ip) => format!("{}:{}", ip, port),
            None => format!("0.0.0.0:{}", port),
        };

        let server = Server::http(&addr)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::AddrInUse, format!("{}", e)))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .unwrap_or(port);

        info!("Status server listening on http://{}/status", addr);

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let handle = thread::spawn(move || Self::run_server(server, status, shutdown_clone));

        Ok(Self {
            handle: Some(handle),
            shutdown,
            port,
        })
    }

    /// Port the server is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    fn run_server(server: Server, status: Arc<RouterStatus>, shutdown: Arc<AtomicBool>) {
        let content_type = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
            .expect("static header");
        let location = Header::from_bytes(&b"Location"[..], &b"/status"[..]).expect("static header");
        let allow_get = Header::from_bytes(&b"Allow"[..], &b"GET"[..]).expect("static header");

        loop {
            if shutdown.load(Ordering::Acquire) {
                info!("Status server shutting down");
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(100)) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => {
                    error!("Server error: {}", e);
                    break;
                }
            };

            if request.method() != &Method::Get {
                let response = Response::from_string("Method Not Allowed")
                    .with_status_code(405)
                    .with_header(allow_get.clone());
                let _ = request.respond(response);
                continue;
            }

            let response = match request.url() {
                "/status" | "/status/" => match status.to_json() {
                    Ok(json) => Response::from_string(json)
                        .with_header(content_type.clone())
                        .with_status_code(200),
                    Err(e) => {
                        error!("Failed to encode status: {}", e);
                        Response::from_string("Internal Server Error").with_status_code(500)
                    }
                },
                "/" => Response::from_string("See /status for router state")
                    .with_status_code(302)
                    .with_header(location.clone()),
                _ => Response::from_string("Not Found").with_status_code(404),
            };

            if let Err(e) = request.respond(response) {
                warn!("Failed to send response: {}", e);
            }
        }
    }

    /// Stop the server.
    ///
    /// May take up to 100ms due to the polling interval.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StatusServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeId, NodeTable};
    use crate::transport::MetadataRequest;
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpStream};

    struct NullRequester;

    impl MetadataRequester for NullRequester {
        fn request_metadata(&self, _request: MetadataRequest) {}
    }

    fn get(port: u16, method: &str, path: &str) -> String {
        let mut stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
        write!(
            stream,
            "{} {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            method, path
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_status_json() {
        let dispatch = Arc::new(DispatchStats::new());
        dispatch.dispatched.store(3, Ordering::Relaxed);
        dispatch.failed.store(1, Ordering::Relaxed);
        let status = RouterStatus::new(dispatch);

        let json: serde_json::Value = serde_json::from_str(&status.to_json().unwrap()).unwrap();
        assert_eq!(json["selection_state"], "unselected");
        assert_eq!(json["connected_node"], serde_json::Value::Null);
        assert_eq!(json["metadata"]["dispatched"], 3);
        assert_eq!(json["metadata"]["failed"], 1);
        assert!(json["uptime_secs"].is_u64());
    }

    #[test]
    fn test_snapshot_capture() {
        let table: NodeTable = [Node::new(NodeId::new(1))].into_iter().collect();
        let ctx = LocalContext {
            connected_node_id: Some(NodeId::new(1)),
            ..LocalContext::default()
        };
        let mut controller = SelectionController::new(NullRequester);
        controller.handle_connection_event(crate::selection::ConnectionEvent::Connected(
            NodeId::new(1),
        ));

        let snapshot = SelectionSnapshot::capture(&controller, &ctx, &table);
        assert_eq!(snapshot.connected_node.as_deref(), Some("!00000001"));
        assert_eq!(snapshot.path.as_deref(), Some("Connected"));
        assert_eq!(snapshot.known_nodes, 1);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_background_changes() {
        let status = Arc::new(RouterStatus::new(Arc::new(DispatchStats::new())));
        let source = Arc::new(Mutex::new(SelectionSnapshot {
            selection_state: "!00000003 (awaiting legacy handshake)".to_string(),
            ..SelectionSnapshot::default()
        }));
        let cancel = CancellationToken::new();

        let capture = {
            let source = source.clone();
            move || source.lock().unwrap().clone()
        };
        let handle = spawn_status_refresh(
            status.clone(),
            capture,
            Duration::from_millis(10),
            cancel.clone(),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(
            status.selection().selection_state,
            "!00000003 (awaiting legacy handshake)"
        );

        source.lock().unwrap().selection_state = "!00000003 (legacy session)".to_string();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(status.selection().selection_state, "!00000003 (legacy session)");

        cancel.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn test_server_routes() {
        let status = Arc::new(RouterStatus::new(Arc::new(DispatchStats::new())));
        let server =
            StatusServer::start(Some(Ipv4Addr::LOCALHOST.into()), 0, status).unwrap();
        let port = server.port();

        let ok = get(port, "GET", "/status");
        assert!(ok.starts_with("HTTP/1.1 200"));
        assert!(ok.contains("\"selection_state\":\"unselected\""));

        assert!(get(port, "GET", "/").starts_with("HTTP/1.1 302"));
        assert!(get(port, "GET", "/nope").starts_with("HTTP/1.1 404"));
        assert!(get(port, "POST", "/status").starts_with("HTTP/1.1 405"));
    }
}

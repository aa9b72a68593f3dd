//! Interactive admin router for a simulated mesh.
//!
//! Run with `cargo run --bin router -- nodes.json`. The node file is a JSON
//! array of node records; handshakes against it are simulated and complete
//! after a short delay.
//!
//! ## Endpoints
//!
//! - Status: http://localhost:8080/status

use log::{error, info, warn};
use mesh_admin_router::admin::HandshakeScheme;
use mesh_admin_router::config;
use mesh_admin_router::console::{ConsoleSession, RouterCommand};
use mesh_admin_router::node::{Node, NodeDirectory, NodeTable, SessionPasskey, SharedNodeTable};
use mesh_admin_router::status::{
    spawn_status_refresh, RouterStatus, StatusServer, DEFAULT_STATUS_PORT,
};
use mesh_admin_router::transport::{
    DispatchStats, MetadataDispatcher, MetadataRequest, MetadataTransport, MetadataWorker,
    TransportError,
};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long a simulated handshake takes.
const HANDSHAKE_DELAY: Duration = Duration::from_millis(1500);

/// How often the status snapshot is refreshed between commands.
const STATUS_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Transport that answers metadata requests from the local node table.
struct SimulatedTransport {
    nodes: SharedNodeTable,
    delay: Duration,
}

impl MetadataTransport for SimulatedTransport {
    async fn request_metadata(&self, request: &MetadataRequest) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;

        if self.nodes.find_node(request.from).is_none() {
            return Err(TransportError::NotConnected);
        }
        let node = self
            .nodes
            .find_node(request.to)
            .ok_or(TransportError::Timeout)?;
        if !node.can_remote_admin {
            return Err(TransportError::Rejected(
                "remote administration disabled".to_string(),
            ));
        }

        let passkey = match request.scheme {
            HandshakeScheme::Pki => {
                let mut key = request.from.num().to_be_bytes().to_vec();
                key.extend_from_slice(&request.to.num().to_be_bytes());
                Some(SessionPasskey::new(key))
            }
            HandshakeScheme::Legacy => None,
        };

        if self.nodes.record_handshake(request.to, request.scheme, passkey) {
            Ok(())
        } else {
            Err(TransportError::ChannelClosed)
        }
    }
}

fn load_nodes(path: &Path) -> NodeTable {
    let json = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to read node file {:?}: {}", path, e);
            return NodeTable::new();
        }
    };
    match serde_json::from_str::<Vec<Node>>(&json) {
        Ok(nodes) => nodes.into_iter().collect(),
        Err(e) => {
            error!("Failed to parse node file {:?}: {}", path, e);
            NodeTable::new()
        }
    }
}

fn print_prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Mesh admin router starting ===");

    let preferences_path = match config::default_preferences_path() {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Preferences will not be saved: {}", e);
            None
        }
    };
    let preferences = preferences_path
        .as_deref()
        .map(config::load_preferences_from)
        .unwrap_or_default();

    let nodes = match std::env::args().nth(1) {
        Some(path) => load_nodes(Path::new(&path)),
        None => {
            warn!("No node file given, starting with an empty node table");
            NodeTable::new()
        }
    };
    info!("Loaded {} nodes", nodes.len());
    let nodes = SharedNodeTable::new(nodes);

    let cancel = CancellationToken::new();
    let dispatch_stats = Arc::new(DispatchStats::new());
    let (dispatcher, requests) = MetadataDispatcher::channel(dispatch_stats.clone());
    let worker = MetadataWorker::spawn(
        Arc::new(SimulatedTransport {
            nodes: nodes.clone(),
            delay: HANDSHAKE_DELAY,
        }),
        requests,
        cancel.clone(),
        dispatch_stats.clone(),
    );

    let status = Arc::new(RouterStatus::new(dispatch_stats));
    let _status_server = match StatusServer::start(None, DEFAULT_STATUS_PORT, status.clone()) {
        Ok(server) => {
            info!(
                "Status server at http://localhost:{}/status",
                DEFAULT_STATUS_PORT
            );
            Some(server)
        }
        Err(e) => {
            warn!("Failed to start status server: {}", e);
            None
        }
    };

    let last_connected = preferences.last_connected_node;
    let mut session = ConsoleSession::new(preferences, preferences_path, dispatcher, nodes.clone());
    if let Some(id) = last_connected.filter(|id| nodes.find_node(*id).is_some()) {
        info!("Reconnecting to last device {}", id);
        println!("{}", session.connect(id));
    }
    status.update(session.snapshot());
    let session = Arc::new(Mutex::new(session));

    let refresh_task = {
        let session = session.clone();
        spawn_status_refresh(
            status.clone(),
            move || session.lock().unwrap_or_else(|e| e.into_inner()).snapshot(),
            STATUS_REFRESH_INTERVAL,
            cancel.clone(),
        )
    };

    let stdin_cancel = cancel.clone();
    let stdin_task = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        print_prompt();
        while !stdin_cancel.is_cancelled() {
            match lines.next() {
                Some(Ok(line)) => {
                    let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
                    let output = session.execute(RouterCommand::parse(&line));
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                    status.update(session.snapshot());
                    drop(session);
                    print_prompt();
                }
                Some(Err(e)) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
                None => break,
            }
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
        result = stdin_task => {
            if let Err(e) = result {
                error!("Console task error: {}", e);
            }
        }
    }

    cancel.cancel();
    if let Err(e) = worker.await {
        error!("Metadata worker error: {}", e);
    }
    if let Err(e) = refresh_task.await {
        error!("Status refresh task error: {}", e);
    }
    info!("Router stopped");

    // The console thread may still be blocked reading stdin.
    std::process::exit(0);
}

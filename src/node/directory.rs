//! Node directory.
//!
//! The node store is owned outside the router. The router only needs to look
//! nodes up by id and list them in picker order, which is what
//! [`NodeDirectory`] captures. Lookups hand back owned snapshots so a caller
//! never holds a lock across a resolution.

use super::{Node, NodeId, SessionPasskey};
use crate::admin::HandshakeScheme;
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Read-only view of the known nodes.
pub trait NodeDirectory {
    /// Look up a node by id.
    fn find_node(&self, id: NodeId) -> Option<Node>;

    /// All known nodes in picker order.
    fn nodes(&self) -> Vec<Node>;

    /// Number of known nodes.
    fn len(&self) -> usize {
        self.nodes().len()
    }

    /// Whether no nodes are known.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Picker order: favorites, then PKI users, then RF before MQTT, then by name.
fn picker_order(a: &Node, b: &Node) -> Ordering {
    b.favorite
        .cmp(&a.favorite)
        .then_with(|| b.user.is_pki_encrypted.cmp(&a.user.is_pki_encrypted))
        .then_with(|| a.via_mqtt.cmp(&b.via_mqtt))
        .then_with(|| a.user.long_name.cmp(&b.user.long_name))
        .then_with(|| a.id.cmp(&b.id))
}

/// In-memory node table indexed by node id.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: HashMap<NodeId, Node>,
}

impl NodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node.
    ///
    /// Returns the previous record for that id, if any.
    pub fn upsert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.id, node)
    }

    /// Remove a node.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    /// Borrow a node without cloning.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Apply a completed admin handshake to a node.
    ///
    /// PKI handshakes install the session passkey; legacy handshakes mark
    /// the metadata exchange as done. Returns `false` if the node is unknown
    /// or a PKI handshake arrives without a passkey.
    pub fn record_handshake(
        &mut self,
        id: NodeId,
        scheme: HandshakeScheme,
        passkey: Option<SessionPasskey>,
    ) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            warn!("Handshake completed for unknown node {}", id);
            return false;
        };

        match scheme {
            HandshakeScheme::Pki => {
                let Some(passkey) = passkey else {
                    warn!("PKI handshake for {} carried no session passkey", id);
                    return false;
                };
                node.session_passkey = Some(passkey);
            }
            HandshakeScheme::Legacy => {
                node.has_exchanged_metadata = true;
            }
        }
        debug!("Recorded {} handshake for {}", scheme, id);
        true
    }
}

impl FromIterator<Node> for NodeTable {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut table = Self::new();
        for node in iter {
            table.upsert(node);
        }
        table
    }
}

impl NodeDirectory for NodeTable {
    fn find_node(&self, id: NodeId) -> Option<Node> {
        self.nodes.get(&id).cloned()
    }

    fn nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        nodes.sort_by(picker_order);
        nodes
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Node table shared between the router and the transport.
///
/// All updates to a node happen under one write lock, so readers see either
/// the pre-handshake or the post-handshake record, never a mix.
#[derive(Debug, Clone, Default)]
pub struct SharedNodeTable {
    inner: Arc<RwLock<NodeTable>>,
}

impl SharedNodeTable {
    /// Wrap an existing table.
    pub fn new(table: NodeTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    // Poisoning is ignored: every mutation below completes in one statement.
    fn read(&self) -> RwLockReadGuard<'_, NodeTable> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, NodeTable> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace a node.
    pub fn upsert(&self, node: Node) -> Option<Node> {
        self.write().upsert(node)
    }

    /// Remove a node.
    pub fn remove(&self, id: NodeId) -> Option<Node> {
        self.write().remove(id)
    }

    /// Apply a completed admin handshake. See [`NodeTable::record_handshake`].
    pub fn record_handshake(
        &self,
        id: NodeId,
        scheme: HandshakeScheme,
        passkey: Option<SessionPasskey>,
    ) -> bool {
        self.write().record_handshake(id, scheme, passkey)
    }
}

impl NodeDirectory for SharedNodeTable {
    fn find_node(&self, id: NodeId) -> Option<Node> {
        self.read().find_node(id)
    }

    fn nodes(&self) -> Vec<Node> {
        self.read().nodes()
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: u32, name: &str) -> Node {
        let mut node = Node::new(NodeId::new(id));
        node.user.long_name = name.to_string();
        node
    }

    #[test]
    fn test_find_node() {
        let table: NodeTable = [named(1, "Alpha"), named(2, "Bravo")].into_iter().collect();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.find_node(NodeId::new(2)).map(|n| n.user.long_name),
            Some("Bravo".to_string())
        );
        assert!(table.find_node(NodeId::new(3)).is_none());
    }

    #[test]
    fn test_upsert_replaces() {
        let mut table = NodeTable::new();
        assert!(table.upsert(named(1, "Old")).is_none());
        let previous = table.upsert(named(1, "New"));
        assert_eq!(previous.map(|n| n.user.long_name), Some("Old".to_string()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_picker_order() {
        let mut fav = named(10, "Zulu");
        fav.favorite = true;
        let mut pki = named(11, "Yankee");
        pki.user.is_pki_encrypted = true;
        let mut mqtt = named(12, "Alpha");
        mqtt.via_mqtt = true;
        let rf = named(13, "Bravo");
        let rf2 = named(14, "Charlie");

        let table: NodeTable = [mqtt, rf2, pki, rf, fav].into_iter().collect();
        let order: Vec<u32> = table.nodes().iter().map(|n| n.id.num()).collect();
        assert_eq!(order, vec![10, 11, 13, 14, 12]);
    }

    #[test]
    fn test_record_pki_handshake() {
        let mut table: NodeTable = [named(1, "Alpha")].into_iter().collect();
        let key = SessionPasskey::new(vec![1, 2, 3]);
        assert!(table.record_handshake(NodeId::new(1), HandshakeScheme::Pki, Some(key.clone())));
        let node = table.get(NodeId::new(1)).unwrap();
        assert_eq!(node.session_passkey.as_ref(), Some(&key));
        assert!(!node.has_exchanged_metadata);
    }

    #[test]
    fn test_record_legacy_handshake() {
        let mut table: NodeTable = [named(1, "Alpha")].into_iter().collect();
        assert!(table.record_handshake(NodeId::new(1), HandshakeScheme::Legacy, None));
        let node = table.get(NodeId::new(1)).unwrap();
        assert!(node.has_exchanged_metadata);
        assert!(!node.has_session_passkey());
    }

    #[test]
    fn test_pki_handshake_without_passkey_rejected() {
        let mut table: NodeTable = [named(1, "Alpha")].into_iter().collect();
        assert!(!table.record_handshake(NodeId::new(1), HandshakeScheme::Pki, None));
        let node = table.get(NodeId::new(1)).unwrap();
        assert!(!node.has_session_passkey());
        assert!(!node.has_exchanged_metadata);
    }

    #[test]
    fn test_record_handshake_unknown_node() {
        let mut table = NodeTable::new();
        assert!(!table.record_handshake(NodeId::new(9), HandshakeScheme::Legacy, None));
    }

    #[test]
    fn test_shared_table_sees_updates_across_clones() {
        let shared = SharedNodeTable::new([named(1, "Alpha")].into_iter().collect());
        let other = shared.clone();
        other.record_handshake(NodeId::new(1), HandshakeScheme::Legacy, None);
        assert!(shared.find_node(NodeId::new(1)).unwrap().has_exchanged_metadata);
    }

    #[test]
    fn test_shared_table_concurrent_handshakes() {
        let nodes: NodeTable = (0..16).map(|i| named(i, "n")).collect();
        let shared = SharedNodeTable::new(nodes);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let table = shared.clone();
                std::thread::spawn(move || {
                    table.record_handshake(
                        NodeId::new(i),
                        HandshakeScheme::Pki,
                        Some(SessionPasskey::new(vec![i as u8])),
                    )
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert!(shared.nodes().iter().all(|n| n.has_session_passkey()));
    }
}

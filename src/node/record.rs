//! Node records as seen by the router.
//!
//! A [`Node`] is a snapshot of what the node store knows about one device:
//! its capability flags, the admin credential state established with it and
//! the user identity it announced. The router never mutates these records;
//! handshake completions are applied by the directory (see
//! [`SharedNodeTable::record_handshake`](super::SharedNodeTable::record_handshake)).

use super::NodeId;
use crate::modules::ExcludedModules;
use crate::region::RegionCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Label used when a node has not announced a name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Session passkey issued by a node after a PKI admin handshake.
///
/// The bytes are wiped when the key is dropped and never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SessionPasskey(Vec<u8>);

impl SessionPasskey {
    /// Wrap raw passkey bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SessionPasskey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionPasskey(<{} bytes redacted>)", self.0.len())
    }
}

/// User identity announced by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Human-readable name; only used for display.
    pub long_name: String,
    /// Up to four characters shown on small screens.
    pub short_name: String,
    /// The node uses public-key admin rather than the legacy scheme.
    pub is_pki_encrypted: bool,
    /// Licensed amateur operator (no duty-cycle notice).
    pub is_licensed: bool,
}

/// A peer on the mesh, or the locally attached device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub id: NodeId,
    /// Configuration is centrally controlled; never offer editing.
    pub is_managed: bool,
    /// Modules missing from this node's firmware build.
    #[serde(with = "excluded_bits")]
    pub excluded_modules: ExcludedModules,
    pub can_remote_admin: bool,
    /// Present once a PKI-authenticated admin session exists.
    pub session_passkey: Option<SessionPasskey>,
    /// A legacy metadata exchange has succeeded at least once.
    pub has_exchanged_metadata: bool,
    pub user: User,
    pub favorite: bool,
    /// Last heard through an MQTT gateway rather than over RF.
    pub via_mqtt: bool,
    pub region: RegionCode,
    pub firmware_version: Option<String>,
}

impl Node {
    /// Create a node with no capabilities and an empty user.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Whether a PKI admin session has been established.
    pub fn has_session_passkey(&self) -> bool {
        self.session_passkey.is_some()
    }

    /// Name to show for this node.
    pub fn display_name(&self) -> &str {
        if self.user.long_name.is_empty() {
            UNKNOWN_NAME
        } else {
            &self.user.long_name
        }
    }
}

/// Serialize the exclusion bitmap as its raw integer.
mod excluded_bits {
    use crate::modules::ExcludedModules;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &ExcludedModules, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u32(value.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ExcludedModules, D::Error> {
        u32::deserialize(d).map(ExcludedModules::from_bits_retain)
    }
}

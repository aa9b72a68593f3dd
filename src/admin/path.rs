//! Administration path resolution.
//!
//! Remote nodes can be configured over two admin schemes. The legacy scheme
//! relies on an unauthenticated metadata exchange; the PKI scheme needs a
//! session passkey that the node only hands out after a public-key
//! handshake. Which one applies to a node depends on the node's flags and on
//! the operator's preference, and exactly one outcome is produced per node.
//!
//! Rules are checked top to bottom and the first match wins:
//!
//! | # | Outcome | Condition |
//! |---|---------|-----------|
//! | 1 | `NotAdministrable` | node is managed |
//! | 2 | `LocalAccess` | node is the connected device |
//! | 3 | `NotAdministrable` | node cannot be remote-administered |
//! | 4 | `PkiSession` | prefer PKI, session passkey present |
//! | 5 | `LegacySession` | prefer legacy, metadata already exchanged |
//! | 6 | `PkiHandshakeRequired` | prefer PKI, PKI user, no passkey |
//! | 7 | `LegacyHandshakeRequired` | prefer legacy, no metadata yet |
//! | 8 | `Unavailable` | anything else, including an unknown node |

use super::LocalContext;
use crate::node::Node;
use log::debug;
use std::fmt;

/// Remote admin scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeScheme {
    /// Public-key authenticated session.
    Pki,
    /// Unauthenticated metadata exchange.
    Legacy,
}

impl fmt::Display for HandshakeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pki => write!(f, "PKI"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// How the configuration of a node can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "an administration path decides whether a handshake is needed"]
pub enum AdministrationPath {
    /// The attached device; configuration goes straight over the local transport.
    LocalAccess,
    /// Managed or not remotely administrable; only informational views.
    NotAdministrable,
    /// A PKI session already exists.
    PkiSession,
    /// A legacy metadata exchange already succeeded.
    LegacySession,
    /// A PKI handshake must be requested before any configuration access.
    PkiHandshakeRequired,
    /// A legacy metadata exchange must be requested first.
    LegacyHandshakeRequired,
    /// Administration is not currently possible.
    Unavailable,
}

impl AdministrationPath {
    /// Scheme of the handshake this path is waiting for, if any.
    pub fn handshake(self) -> Option<HandshakeScheme> {
        match self {
            Self::PkiHandshakeRequired => Some(HandshakeScheme::Pki),
            Self::LegacyHandshakeRequired => Some(HandshakeScheme::Legacy),
            _ => None,
        }
    }

    /// Scheme of the established remote session, if any.
    pub fn session(self) -> Option<HandshakeScheme> {
        match self {
            Self::PkiSession => Some(HandshakeScheme::Pki),
            Self::LegacySession => Some(HandshakeScheme::Legacy),
            _ => None,
        }
    }

    /// Whether the path requires a metadata request first.
    pub fn requires_handshake(self) -> bool {
        self.handshake().is_some()
    }

    /// Whether an authenticated remote session exists.
    pub fn is_authenticated(self) -> bool {
        self.session().is_some()
    }

    /// Whether configuration can be read and written right now.
    pub fn allows_configuration(self) -> bool {
        matches!(self, Self::LocalAccess) || self.is_authenticated()
    }

    /// Label used in the node picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::LocalAccess => "Connected",
            Self::NotAdministrable => "Not Administrable",
            Self::PkiSession => "Remote PKI Admin",
            Self::LegacySession => "Remote Legacy Admin",
            Self::PkiHandshakeRequired => "Request PKI Admin",
            Self::LegacyHandshakeRequired => "Request Legacy Admin",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for AdministrationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify how `node` can be administered from the local device.
///
/// An absent node resolves to [`AdministrationPath::Unavailable`]; that is
/// the normal state while the node store is still filling up.
pub fn resolve_path(ctx: &LocalContext, node: Option<&Node>) -> AdministrationPath {
    let Some(node) = node else {
        return AdministrationPath::Unavailable;
    };

    let prefer_pki = ctx.prefer_administration_via_pki;
    let is_local = ctx.connected_node_id == Some(node.id);

    let path = match node {
        n if n.is_managed => AdministrationPath::NotAdministrable,
        _ if is_local => AdministrationPath::LocalAccess,
        n if !n.can_remote_admin => AdministrationPath::NotAdministrable,
        n if prefer_pki && n.has_session_passkey() => AdministrationPath::PkiSession,
        n if !prefer_pki && n.has_exchanged_metadata => AdministrationPath::LegacySession,
        n if prefer_pki && n.user.is_pki_encrypted => AdministrationPath::PkiHandshakeRequired,
        _ if !prefer_pki => AdministrationPath::LegacyHandshakeRequired,
        _ => AdministrationPath::Unavailable,
    };

    debug!("Resolved {} for {}", path, node.id);
    path
}

//! Operator console for driving the router from a terminal.
//!
//! # Commands
//!
//! - `connect <id>` - Attach to a local device
//! - `disconnect` - Drop the local device
//! - `select <id>` - Choose the node to configure
//! - `list` - Show the node picker
//! - `menu` - Show the settings menu for the current selection
//! - `pki on|off` - Prefer PKI or legacy administration
//! - `override` - Toggle the module filter override
//! - `status` - Show the selection state
//! - `help` - Show available commands
//!
//! # Example Session
//!
//! ```text
//! > connect !0000abcd
//! Connected to !0000abcd
//! > select 4660
//! Selected !00001234: Request Legacy Admin (metadata requested)
//! > status
//! !00001234 (awaiting legacy handshake)
//! ```

use crate::admin::{ConnectionState, LocalContext};
use crate::config::{self, Preferences};
use crate::node::{NodeDirectory, NodeId, SharedNodeTable};
use crate::selection::{ConnectionEvent, SelectionController};
use crate::settings::{ConfigureSection, SettingsMenu};
use crate::status::SelectionSnapshot;
use crate::transport::MetadataRequester;
use log::{info, warn};
use std::fmt::Write;
use std::path::PathBuf;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterCommand {
    /// Attach to a local device.
    Connect(NodeId),
    /// Drop the local device.
    Disconnect,
    /// Select a node for configuration.
    Select(NodeId),
    /// Show the node picker.
    List,
    /// Show the settings menu.
    Menu,
    /// Set the admin scheme preference.
    PreferPki(bool),
    /// Toggle the module filter override.
    ToggleOverride,
    /// Show the selection state.
    Status,
    /// Show help.
    Help,
    /// Unknown or invalid command.
    Unknown(String),
}

impl RouterCommand {
    /// Parse a command from an input line.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return RouterCommand::Unknown(String::new());
        }

        let mut parts = input.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("");
        let args = parts.next().unwrap_or("").trim();

        match cmd.to_lowercase().as_str() {
            "connect" | "c" => match args.parse() {
                Ok(id) => RouterCommand::Connect(id),
                Err(_) => RouterCommand::Unknown("Usage: connect <node id>".to_string()),
            },
            "disconnect" | "d" => RouterCommand::Disconnect,
            "select" | "sel" => match args.parse() {
                Ok(id) => RouterCommand::Select(id),
                Err(_) => RouterCommand::Unknown("Usage: select <node id>".to_string()),
            },
            "list" | "ls" | "l" => RouterCommand::List,
            "menu" | "m" => RouterCommand::Menu,
            "pki" => match args.to_lowercase().as_str() {
                "on" | "true" | "1" => RouterCommand::PreferPki(true),
                "off" | "false" | "0" => RouterCommand::PreferPki(false),
                _ => RouterCommand::Unknown("Usage: pki on|off".to_string()),
            },
            "override" | "o" => RouterCommand::ToggleOverride,
            "status" | "stat" | "s" => RouterCommand::Status,
            "help" | "h" | "?" => RouterCommand::Help,
            _ => RouterCommand::Unknown(format!(
                "Unknown command: {}. Type 'help' for commands.",
                cmd
            )),
        }
    }
}

/// Help text for available commands.
pub const HELP_TEXT: &str = r#"
Available commands:
  connect <id>       Attach to a local device
  disconnect         Drop the local device
  select <id>        Choose the node to configure
  list               Show the node picker
  menu               Show the settings menu
  pki on|off         Prefer PKI or legacy administration
  override           Toggle the module filter override
  status             Show the selection state
  help               Show this help

Node ids: !0000abcd, 0xabcd or 43981
Shortcuts: c=connect, d=disconnect, l=list, m=menu, o=override, s=status, h=help
"#;

/// Router state driven by console commands.
pub struct ConsoleSession<R> {
    preferences: Preferences,
    preferences_path: Option<PathBuf>,
    controller: SelectionController<R>,
    nodes: SharedNodeTable,
    connected: Option<NodeId>,
}

impl<R> ConnectionState for ConsoleSession<R> {
    fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    fn active_device_id(&self) -> Option<NodeId> {
        self.connected
    }
}

impl<R: MetadataRequester> ConsoleSession<R> {
    /// Create a session. Preferences are written to `preferences_path`
    /// whenever a persisted field changes.
    pub fn new(
        preferences: Preferences,
        preferences_path: Option<PathBuf>,
        requester: R,
        nodes: SharedNodeTable,
    ) -> Self {
        Self {
            preferences,
            preferences_path,
            controller: SelectionController::new(requester),
            nodes,
            connected: None,
        }
    }

    /// Context for the next resolution.
    pub fn context(&self) -> LocalContext {
        LocalContext::new(&self.preferences, self)
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn controller(&self) -> &SelectionController<R> {
        &self.controller
    }

    /// Status snapshot for the status endpoint.
    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot::capture(&self.controller, &self.context(), &self.nodes)
    }

    /// Attach to a device.
    pub fn connect(&mut self, id: NodeId) -> String {
        self.connected = Some(id);
        self.controller
            .handle_connection_event(ConnectionEvent::Connected(id));
        if self.preferences.remember_connected(id) {
            self.persist();
        }
        info!("Connected to {}", id);
        format!("Connected to {}", id)
    }

    /// Detach from the device.
    pub fn disconnect(&mut self) -> String {
        self.connected = None;
        self.controller
            .handle_connection_event(ConnectionEvent::Disconnected);
        "Disconnected".to_string()
    }

    /// Run one command and return the text to print.
    pub fn execute(&mut self, command: RouterCommand) -> String {
        match command {
            RouterCommand::Connect(id) => self.connect(id),
            RouterCommand::Disconnect => self.disconnect(),
            RouterCommand::Select(id) => {
                let ctx = self.context();
                match self.controller.select_target(id, &ctx, &self.nodes) {
                    Ok(selection) => format!(
                        "Selected {}: {}{}",
                        selection.target,
                        selection.path,
                        if selection.metadata_requested {
                            " (metadata requested)"
                        } else {
                            ""
                        }
                    ),
                    Err(e) => format!("Cannot select {}: {}", id, e),
                }
            }
            RouterCommand::List => self.format_picker(),
            RouterCommand::Menu => format_menu(&SettingsMenu::build(
                &self.context(),
                &self.nodes,
                self.controller.selected_target(),
            )),
            RouterCommand::PreferPki(prefer) => {
                if self.preferences.prefer_administration_via_pki != prefer {
                    self.preferences.prefer_administration_via_pki = prefer;
                    self.persist();
                }
                format!(
                    "Preferring {} administration",
                    if prefer { "PKI" } else { "legacy" }
                )
            }
            RouterCommand::ToggleOverride => {
                if self.preferences.toggle_module_override() {
                    "Module filter override on".to_string()
                } else {
                    "Module filter override off".to_string()
                }
            }
            RouterCommand::Status => self
                .controller
                .state(&self.context(), &self.nodes)
                .to_string(),
            RouterCommand::Help => HELP_TEXT.to_string(),
            RouterCommand::Unknown(msg) => msg,
        }
    }

    fn format_picker(&self) -> String {
        let menu = SettingsMenu::build(
            &self.context(),
            &self.nodes,
            self.controller.selected_target(),
        );
        match &menu.configure {
            Some(ConfigureSection::Picker(rows)) if !rows.is_empty() => {
                let mut out = String::from("Nodes:\n");
                for row in rows {
                    let marker = if row.selected { '*' } else { ' ' };
                    let _ = write!(out, " {} {} {}", marker, row.node, row);
                    if let Some(node) = self.nodes.find_node(row.node) {
                        if !node.user.short_name.is_empty() {
                            let _ = write!(out, " [{}]", node.user.short_name);
                        }
                        if let Some(version) = &node.firmware_version {
                            let _ = write!(out, " fw {}", version);
                        }
                    }
                    out.push('\n');
                }
                out
            }
            Some(ConfigureSection::ConnectedOnly(name)) => format!("Connected Node {}", name),
            _ if self.nodes.is_empty() => "No nodes known".to_string(),
            _ => "Connect to a node to configure it".to_string(),
        }
    }

    fn persist(&self) {
        let Some(path) = &self.preferences_path else {
            return;
        };
        if let Err(e) = config::save_preferences_to(&self.preferences, path) {
            warn!("Failed to save preferences: {}", e);
        }
    }
}

/// Render a settings menu as indented text.
pub fn format_menu(menu: &SettingsMenu) -> String {
    let mut out = String::new();
    for entry in &menu.app.entries {
        let _ = writeln!(out, "  {}", entry.destination);
    }
    if let Some(notice) = menu.duty_cycle {
        let _ = writeln!(out, "! {}", notice);
    }
    for section in &menu.sections {
        let _ = writeln!(out, "{}", section.title);
        for entry in &section.entries {
            let state = if entry.enabled { "" } else { " (disabled)" };
            let _ = writeln!(out, "  {}{}", entry.destination, state);
        }
        if let Some(notice) = section.notice {
            let _ = writeln!(out, "  {}", notice);
        }
        if let Some(footer) = section.footer {
            let _ = writeln!(out, "  ({})", footer);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeTable};
    use crate::transport::MetadataRequest;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingRequester {
        sent: Rc<RefCell<Vec<MetadataRequest>>>,
    }

    impl MetadataRequester for RecordingRequester {
        fn request_metadata(&self, request: MetadataRequest) {
            self.sent.borrow_mut().push(request);
        }
    }

    fn session() -> (ConsoleSession<RecordingRequester>, Rc<RefCell<Vec<MetadataRequest>>>) {
        let mut local = Node::new(NodeId::new(1));
        local.user.long_name = "Base".to_string();
        local.can_remote_admin = true;
        let mut relay = Node::new(NodeId::new(2));
        relay.user.long_name = "Relay".to_string();
        relay.can_remote_admin = true;
        let mut peer = Node::new(NodeId::new(3));
        peer.user.long_name = "Peer".to_string();
        peer.user.short_name = "PEER".to_string();
        peer.firmware_version = Some("2.5.6".to_string());
        peer.can_remote_admin = true;
        let table: NodeTable = [local, relay, peer].into_iter().collect();

        let requester = RecordingRequester::default();
        let sent = requester.sent.clone();
        let session = ConsoleSession::new(
            Preferences::default(),
            None,
            requester,
            SharedNodeTable::new(table),
        );
        (session, sent)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            RouterCommand::parse("connect !00000001"),
            RouterCommand::Connect(NodeId::new(1))
        );
        assert_eq!(
            RouterCommand::parse("sel 0x10"),
            RouterCommand::Select(NodeId::new(16))
        );
        assert_eq!(RouterCommand::parse("PKI on"), RouterCommand::PreferPki(true));
        assert_eq!(RouterCommand::parse("pki off"), RouterCommand::PreferPki(false));
        assert_eq!(RouterCommand::parse("o"), RouterCommand::ToggleOverride);
        assert_eq!(RouterCommand::parse("?"), RouterCommand::Help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RouterCommand::parse("select"),
            RouterCommand::Unknown(msg) if msg.starts_with("Usage")
        ));
        assert!(matches!(
            RouterCommand::parse("pki maybe"),
            RouterCommand::Unknown(msg) if msg.starts_with("Usage")
        ));
        assert!(matches!(
            RouterCommand::parse("frobnicate"),
            RouterCommand::Unknown(msg) if msg.contains("frobnicate")
        ));
        assert_eq!(RouterCommand::parse("   "), RouterCommand::Unknown(String::new()));
    }

    #[test]
    fn test_connect_selects_local_and_remembers() {
        let (mut session, _) = session();
        session.execute(RouterCommand::Connect(NodeId::new(1)));
        assert_eq!(session.preferences().last_connected_node, Some(NodeId::new(1)));
        assert_eq!(session.execute(RouterCommand::Status), "!00000001 (local)");
        assert_eq!(session.snapshot().path.as_deref(), Some("Connected"));
    }

    #[test]
    fn test_select_remote_requests_metadata() {
        let (mut session, sent) = session();
        session.execute(RouterCommand::Connect(NodeId::new(1)));

        let out = session.execute(RouterCommand::Select(NodeId::new(3)));
        assert_eq!(out, "Selected !00000003: Request Legacy Admin (metadata requested)");
        session.execute(RouterCommand::Select(NodeId::new(3)));
        assert_eq!(sent.borrow().len(), 1);

        let list = session.execute(RouterCommand::List);
        assert!(list.contains("* !00000003 Request Legacy Admin: Peer [PEER] fw 2.5.6\n"));
        assert!(list.contains("  !00000002 Request Legacy Admin: Relay\n"));
    }

    #[test]
    fn test_switching_device_requests_again() {
        let (mut session, sent) = session();
        session.execute(RouterCommand::Connect(NodeId::new(1)));
        session.execute(RouterCommand::Select(NodeId::new(3)));

        session.execute(RouterCommand::Connect(NodeId::new(2)));
        let out = session.execute(RouterCommand::Select(NodeId::new(3)));
        assert_eq!(out, "Selected !00000003: Request Legacy Admin (metadata requested)");

        let sent = sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].from, NodeId::new(2));
        assert_eq!(sent[1].to, NodeId::new(3));
    }

    #[test]
    fn test_select_while_disconnected() {
        let (mut session, sent) = session();
        let out = session.execute(RouterCommand::Select(NodeId::new(3)));
        assert_eq!(out, "Cannot select !00000003: no device connected");
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn test_menu_shows_override_footer() {
        let (mut session, _) = session();
        session.execute(RouterCommand::Connect(NodeId::new(1)));
        assert_eq!(
            session.execute(RouterCommand::ToggleOverride),
            "Module filter override on"
        );
        let menu = session.execute(RouterCommand::Menu);
        assert!(menu.contains("Module Configuration"));
        assert!(menu.contains("may not be supported"));
    }

    #[test]
    fn test_disconnect_clears_selection() {
        let (mut session, _) = session();
        session.execute(RouterCommand::Connect(NodeId::new(1)));
        session.execute(RouterCommand::Disconnect);
        assert_eq!(session.execute(RouterCommand::Status), "unselected");
        assert!(!session.context().is_connected());
    }
}

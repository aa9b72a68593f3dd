//! Settings menu model.
//!
//! [`SettingsMenu::build`] turns the node store and session state into the
//! list of sections a front end renders. Module screens are filtered by the
//! connected device's exclusion bitmap, and the node picker lists every node
//! the operator could configure together with how it would be reached.

use super::SettingsDestination;
use crate::admin::{resolve_path, AdministrationPath, LocalContext};
use crate::modules::{any_module_available, is_module_available, ModuleId};
use crate::node::{Node, NodeDirectory, NodeId};
use std::fmt;

/// Module section note when the connected node supports none of them.
pub const NO_MODULES_NOTICE: &str = "This node does not support any configurable modules.";

/// Module section footer while the filter override is on.
pub const OVERRIDE_FOOTER: &str = "Currently showing modules that may not be supported by this node.";

/// A navigable row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub destination: SettingsDestination,
    pub enabled: bool,
}

/// A titled group of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub title: &'static str,
    pub entries: Vec<MenuEntry>,
    /// Informational line shown inside the section.
    pub notice: Option<&'static str>,
    pub footer: Option<&'static str>,
}

impl MenuSection {
    fn new(title: &'static str, entries: Vec<MenuEntry>) -> Self {
        Self {
            title,
            entries,
            notice: None,
            footer: None,
        }
    }

    /// Whether `destination` is listed and enabled.
    pub fn is_enabled(&self, destination: SettingsDestination) -> bool {
        self.entries
            .iter()
            .any(|e| e.destination == destination && e.enabled)
    }

    /// Whether `destination` is listed at all.
    pub fn contains(&self, destination: SettingsDestination) -> bool {
        self.entries.iter().any(|e| e.destination == destination)
    }
}

/// One row of the node picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub node: NodeId,
    pub path: AdministrationPath,
    pub name: String,
    pub selected: bool,
}

impl fmt::Display for PickerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.name)
    }
}

/// Content of the "Configure" section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigureSection {
    /// The connected node can administer others.
    Picker(Vec<PickerEntry>),
    /// Only the connected node itself, by name.
    ConnectedOnly(String),
}

/// Hourly duty cycle warning for restricted regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycleNotice {
    pub percent: u8,
}

impl fmt::Display for DutyCycleNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Your region has a {}% hourly duty cycle, your radio will stop sending packets when it reaches the hourly limit.",
            self.percent
        )
    }
}

/// The assembled settings menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsMenu {
    pub app: MenuSection,
    pub configure: Option<ConfigureSection>,
    pub duty_cycle: Option<DutyCycleNotice>,
    /// Node sections; empty when the connected node is managed.
    pub sections: Vec<MenuSection>,
}

impl SettingsMenu {
    /// Build the menu for the current session.
    pub fn build(
        ctx: &LocalContext,
        directory: &impl NodeDirectory,
        selected: Option<NodeId>,
    ) -> Self {
        let connected = ctx.connected_node_id.and_then(|id| directory.find_node(id));
        let app = MenuSection::new("Settings", entries(&SettingsDestination::APP, |_| true));

        if connected.as_ref().is_some_and(|n| n.is_managed) {
            return Self {
                app,
                configure: None,
                duty_cycle: None,
                sections: Vec::new(),
            };
        }

        let configure = match &connected {
            Some(node) if node.can_remote_admin => {
                Some(ConfigureSection::Picker(picker(ctx, directory, selected)))
            }
            Some(node) => Some(ConfigureSection::ConnectedOnly(
                node.display_name().to_string(),
            )),
            None => None,
        };

        let remote_selected = selected.is_some() && selected != ctx.connected_node_id;
        let unlocked = |d: SettingsDestination| !(remote_selected && d.locked_to_connected());

        let mut sections = vec![
            MenuSection::new("Radio Configuration", entries(&SettingsDestination::RADIO, unlocked)),
            MenuSection::new("Device Configuration", entries(&SettingsDestination::DEVICE, |_| true)),
            module_section(ctx, connected.as_ref()),
            MenuSection::new("Logging", entries(&[SettingsDestination::DebugLogs], |_| true)),
        ];
        if cfg!(debug_assertions) {
            sections.push(MenuSection::new(
                "Developers",
                entries(&[SettingsDestination::AppFiles], |_| true),
            ));
        }
        sections.push(MenuSection::new(
            "Firmware",
            entries(&[SettingsDestination::FirmwareUpdates], unlocked),
        ));

        Self {
            app,
            configure,
            duty_cycle: connected.as_ref().and_then(duty_cycle_notice),
            sections,
        }
    }

    /// Section by title.
    pub fn section(&self, title: &str) -> Option<&MenuSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Picker rows, if the picker is shown.
    pub fn picker(&self) -> Option<&[PickerEntry]> {
        match &self.configure {
            Some(ConfigureSection::Picker(rows)) => Some(rows),
            _ => None,
        }
    }
}

fn entries(
    destinations: &[SettingsDestination],
    enabled: impl Fn(SettingsDestination) -> bool,
) -> Vec<MenuEntry> {
    destinations
        .iter()
        .map(|&destination| MenuEntry {
            destination,
            enabled: enabled(destination),
        })
        .collect()
}

fn module_section(ctx: &LocalContext, connected: Option<&Node>) -> MenuSection {
    let shown = SettingsDestination::MODULES
        .into_iter()
        .filter(|d| {
            d.gating_module()
                .map_or(true, |m| is_module_available(connected, m, ctx.module_filter_override))
        })
        .collect::<Vec<_>>();

    let mut section = MenuSection::new("Module Configuration", entries(&shown, |_| true));
    if !any_module_available(connected, &ModuleId::CONFIGURABLE, ctx.module_filter_override) {
        section.notice = Some(NO_MODULES_NOTICE);
    }
    if ctx.module_filter_override {
        section.footer = Some(OVERRIDE_FOOTER);
    }
    section
}

fn picker(
    ctx: &LocalContext,
    directory: &impl NodeDirectory,
    selected: Option<NodeId>,
) -> Vec<PickerEntry> {
    directory
        .nodes()
        .into_iter()
        .filter_map(|node| {
            let path = resolve_path(ctx, Some(&node));
            let listed = path.allows_configuration() || path.requires_handshake();
            listed.then(|| PickerEntry {
                node: node.id,
                path,
                name: node.display_name().to_string(),
                selected: selected == Some(node.id),
            })
        })
        .collect()
}

fn duty_cycle_notice(node: &Node) -> Option<DutyCycleNotice> {
    (node.region.is_duty_cycle_restricted() && !node.user.is_licensed).then(|| DutyCycleNotice {
        percent: node.region.duty_cycle_percent(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ExcludedModules;
    use crate::node::{NodeTable, SessionPasskey};
    use crate::region::RegionCode;

    const CONNECTED: NodeId = NodeId::new(1);

    fn ctx() -> LocalContext {
        LocalContext {
            prefer_administration_via_pki: false,
            module_filter_override: false,
            connected_node_id: Some(CONNECTED),
        }
    }

    fn node(id: u32, name: &str) -> Node {
        let mut node = Node::new(NodeId::new(id));
        node.user.long_name = name.to_string();
        node.can_remote_admin = true;
        node
    }

    fn table(local: Node) -> NodeTable {
        let mut legacy = node(3, "Legacy Peer");
        legacy.has_exchanged_metadata = true;
        let pending = node(5, "Pending Peer");
        let mut managed = node(4, "Managed Peer");
        managed.is_managed = true;
        let mut plain = node(6, "Plain Peer");
        plain.can_remote_admin = false;

        [local, legacy, pending, managed, plain].into_iter().collect()
    }

    fn titles(menu: &SettingsMenu) -> Vec<&'static str> {
        menu.sections.iter().map(|s| s.title).collect()
    }

    #[test]
    fn test_picker_lists_reachable_nodes() {
        let menu = SettingsMenu::build(&ctx(), &table(node(1, "Base")), Some(CONNECTED));
        let labels: Vec<String> = menu
            .picker()
            .unwrap()
            .iter()
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            labels,
            vec![
                "Connected: Base",
                "Remote Legacy Admin: Legacy Peer",
                "Request Legacy Admin: Pending Peer",
            ]
        );
        assert!(menu.picker().unwrap()[0].selected);
    }

    #[test]
    fn test_picker_hidden_without_remote_admin() {
        let mut local = node(1, "Base");
        local.can_remote_admin = false;
        let menu = SettingsMenu::build(&ctx(), &table(local), None);
        assert_eq!(
            menu.configure,
            Some(ConfigureSection::ConnectedOnly("Base".to_string()))
        );
    }

    #[test]
    fn test_managed_connected_node_shows_app_only() {
        let mut local = node(1, "Base");
        local.is_managed = true;
        let menu = SettingsMenu::build(&ctx(), &table(local), Some(CONNECTED));
        assert!(menu.sections.is_empty());
        assert!(menu.configure.is_none());
        assert_eq!(menu.app.entries.len(), SettingsDestination::APP.len());
    }

    #[test]
    fn test_remote_selection_locks_connected_screens() {
        let menu = SettingsMenu::build(&ctx(), &table(node(1, "Base")), Some(NodeId::new(3)));
        let radio = menu.section("Radio Configuration").unwrap();
        assert!(radio.is_enabled(SettingsDestination::Lora));
        assert!(!radio.is_enabled(SettingsDestination::Channels));
        assert!(!radio.is_enabled(SettingsDestination::ShareQrCode));
        let firmware = menu.section("Firmware").unwrap();
        assert!(!firmware.is_enabled(SettingsDestination::FirmwareUpdates));

        let local = SettingsMenu::build(&ctx(), &table(node(1, "Base")), Some(CONNECTED));
        assert!(local
            .section("Radio Configuration")
            .unwrap()
            .is_enabled(SettingsDestination::Channels));
    }

    #[test]
    fn test_module_filter_uses_connected_node() {
        let mut local = node(1, "Base");
        local.excluded_modules = ExcludedModules::MQTT | ExcludedModules::EXTERNAL_NOTIFICATION;
        let menu = SettingsMenu::build(&ctx(), &table(local), Some(NodeId::new(3)));
        let modules = menu.section("Module Configuration").unwrap();

        assert!(!modules.contains(SettingsDestination::Mqtt));
        assert!(!modules.contains(SettingsDestination::ExternalNotification));
        assert!(!modules.contains(SettingsDestination::Ringtone));
        assert!(modules.contains(SettingsDestination::Telemetry));
        assert!(modules.notice.is_none());
        assert!(modules.footer.is_none());
    }

    #[test]
    fn test_no_modules_notice_and_override() {
        let mut local = node(1, "Base");
        local.excluded_modules = ExcludedModules::all();
        let menu = SettingsMenu::build(&ctx(), &table(local.clone()), None);
        let modules = menu.section("Module Configuration").unwrap();
        assert!(modules.entries.is_empty());
        assert_eq!(modules.notice, Some(NO_MODULES_NOTICE));

        let overridden = LocalContext {
            module_filter_override: true,
            ..ctx()
        };
        let menu = SettingsMenu::build(&overridden, &table(local), None);
        let modules = menu.section("Module Configuration").unwrap();
        assert_eq!(modules.entries.len(), SettingsDestination::MODULES.len());
        assert_eq!(modules.footer, Some(OVERRIDE_FOOTER));
        assert!(modules.notice.is_none());
    }

    #[test]
    fn test_duty_cycle_notice() {
        let mut local = node(1, "Base");
        local.region = RegionCode::Eu868;
        let menu = SettingsMenu::build(&ctx(), &table(local.clone()), None);
        assert_eq!(menu.duty_cycle, Some(DutyCycleNotice { percent: 10 }));
        assert!(menu.duty_cycle.unwrap().to_string().contains("10% hourly"));

        local.user.is_licensed = true;
        let menu = SettingsMenu::build(&ctx(), &table(local.clone()), None);
        assert_eq!(menu.duty_cycle, None);

        local.user.is_licensed = false;
        local.region = RegionCode::Us;
        let menu = SettingsMenu::build(&ctx(), &table(local), None);
        assert_eq!(menu.duty_cycle, None);
    }

    #[test]
    fn test_disconnected_menu() {
        let menu = SettingsMenu::build(&LocalContext::default(), &table(node(1, "Base")), None);
        assert!(menu.configure.is_none());
        assert!(titles(&menu).contains(&"Radio Configuration"));
        assert_eq!(
            menu.section("Module Configuration").unwrap().notice,
            Some(NO_MODULES_NOTICE)
        );
    }

    #[test]
    fn test_pki_picker_labels() {
        let mut local = node(1, "Base");
        local.user.is_pki_encrypted = true;
        let mut session = node(7, "Keyed Peer");
        session.session_passkey = Some(SessionPasskey::new(vec![1]));
        let mut wants_key = node(8, "Pki Peer");
        wants_key.user.is_pki_encrypted = true;
        let table: NodeTable = [local, session, wants_key].into_iter().collect();

        let pki = LocalContext {
            prefer_administration_via_pki: true,
            ..ctx()
        };
        let menu = SettingsMenu::build(&pki, &table, None);
        let labels: Vec<String> = menu.picker().unwrap().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            labels,
            vec![
                "Connected: Base",
                "Request PKI Admin: Pki Peer",
                "Remote PKI Admin: Keyed Peer",
            ]
        );
    }
}

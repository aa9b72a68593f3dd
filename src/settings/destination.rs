//! Settings screens and the node each one edits.

use crate::admin::LocalContext;
use crate::modules::ModuleId;
use crate::node::NodeId;
use std::fmt;

/// Which node an editor screen operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTarget {
    /// App-level screen, no node.
    App,
    /// The node chosen in the picker.
    Selected,
    /// Always the attached device.
    Connected,
}

/// Every screen reachable from the settings menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsDestination {
    About,
    AppSettings,
    Routes,
    RouteRecorder,
    Lora,
    Channels,
    Security,
    ShareQrCode,
    User,
    Bluetooth,
    Device,
    Display,
    Network,
    Position,
    Power,
    AmbientLighting,
    CannedMessages,
    DetectionSensor,
    ExternalNotification,
    Mqtt,
    RangeTest,
    PaxCounter,
    Ringtone,
    Serial,
    StoreAndForward,
    Telemetry,
    DebugLogs,
    AppFiles,
    FirmwareUpdates,
}

impl SettingsDestination {
    /// App-level screens shown above the node sections.
    pub const APP: [Self; 4] = [Self::About, Self::AppSettings, Self::Routes, Self::RouteRecorder];

    /// Radio configuration section.
    pub const RADIO: [Self; 4] = [Self::Lora, Self::Channels, Self::Security, Self::ShareQrCode];

    /// Device configuration section.
    pub const DEVICE: [Self; 7] = [
        Self::User,
        Self::Bluetooth,
        Self::Device,
        Self::Display,
        Self::Network,
        Self::Position,
        Self::Power,
    ];

    /// Module configuration section, in display order.
    pub const MODULES: [Self; 11] = [
        Self::AmbientLighting,
        Self::CannedMessages,
        Self::DetectionSensor,
        Self::ExternalNotification,
        Self::Mqtt,
        Self::RangeTest,
        Self::PaxCounter,
        Self::Ringtone,
        Self::Serial,
        Self::StoreAndForward,
        Self::Telemetry,
    ];

    /// Menu title.
    pub fn title(self) -> &'static str {
        match self {
            Self::About => "About",
            Self::AppSettings => "App Settings",
            Self::Routes => "Routes",
            Self::RouteRecorder => "Route Recorder",
            Self::Lora => "LoRa",
            Self::Channels => "Channels",
            Self::Security => "Security",
            Self::ShareQrCode => "Share QR Code",
            Self::User => "User",
            Self::Bluetooth => "Bluetooth",
            Self::Device => "Device",
            Self::Display => "Display",
            Self::Network => "Network",
            Self::Position => "Position",
            Self::Power => "Power",
            Self::AmbientLighting => "Ambient Lighting",
            Self::CannedMessages => "Canned Messages",
            Self::DetectionSensor => "Detection Sensor",
            Self::ExternalNotification => "External Notification",
            Self::Mqtt => "MQTT",
            Self::RangeTest => "Range Test",
            Self::PaxCounter => "PAX Counter",
            Self::Ringtone => "Ringtone",
            Self::Serial => "Serial",
            Self::StoreAndForward => "Store & Forward",
            Self::Telemetry => "Telemetry",
            Self::DebugLogs => "Logs",
            Self::AppFiles => "App Files",
            Self::FirmwareUpdates => "Firmware Updates",
        }
    }

    /// Firmware module whose exclusion hides this screen.
    ///
    /// The ringtone editor belongs to external notification.
    pub fn gating_module(self) -> Option<ModuleId> {
        match self {
            Self::AmbientLighting => Some(ModuleId::AmbientLighting),
            Self::CannedMessages => Some(ModuleId::CannedMessage),
            Self::DetectionSensor => Some(ModuleId::DetectionSensor),
            Self::ExternalNotification | Self::Ringtone => Some(ModuleId::ExternalNotification),
            Self::Mqtt => Some(ModuleId::Mqtt),
            Self::RangeTest => Some(ModuleId::RangeTest),
            Self::PaxCounter => Some(ModuleId::PaxCounter),
            Self::Serial => Some(ModuleId::Serial),
            Self::StoreAndForward => Some(ModuleId::StoreForward),
            Self::Telemetry => Some(ModuleId::Telemetry),
            _ => None,
        }
    }

    /// Node the editor for this screen operates on.
    pub fn editor_target(self) -> EditorTarget {
        match self {
            Self::About
            | Self::AppSettings
            | Self::Routes
            | Self::RouteRecorder
            | Self::DebugLogs
            | Self::AppFiles => EditorTarget::App,
            Self::Channels | Self::ShareQrCode | Self::AmbientLighting | Self::FirmwareUpdates => {
                EditorTarget::Connected
            }
            _ => EditorTarget::Selected,
        }
    }

    /// Screens that only make sense for the attached device and are disabled
    /// while a remote node is selected.
    pub fn locked_to_connected(self) -> bool {
        matches!(self, Self::Channels | Self::ShareQrCode | Self::FirmwareUpdates)
    }
}

impl fmt::Display for SettingsDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Node id an editor screen for `destination` should receive.
pub fn resolve_editor_node(
    destination: SettingsDestination,
    ctx: &LocalContext,
    selected: Option<NodeId>,
) -> Option<NodeId> {
    match destination.editor_target() {
        EditorTarget::App => None,
        EditorTarget::Connected => ctx.connected_node_id,
        EditorTarget::Selected => selected,
    }
}

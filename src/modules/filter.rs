//! Firmware module exclusions.
//!
//! Firmware builds for small boards leave out optional modules. A node
//! reports which ones are missing as a 32-bit bitmap in its device metadata;
//! a set bit means the module is not compiled in and its configuration screen
//! must not be offered.

use crate::node::Node;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Modules excluded from a node's firmware build.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExcludedModules: u32 {
        const MQTT = 0x0001;
        const SERIAL = 0x0002;
        const EXTERNAL_NOTIFICATION = 0x0004;
        const STORE_FORWARD = 0x0008;
        const RANGE_TEST = 0x0010;
        const TELEMETRY = 0x0020;
        const CANNED_MESSAGE = 0x0040;
        const AUDIO = 0x0080;
        const REMOTE_HARDWARE = 0x0100;
        const NEIGHBOR_INFO = 0x0200;
        const AMBIENT_LIGHTING = 0x0400;
        const DETECTION_SENSOR = 0x0800;
        const PAX_COUNTER = 0x1000;
    }
}

/// Optional module categories a node may or may not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleId {
    Mqtt,
    Serial,
    ExternalNotification,
    StoreForward,
    RangeTest,
    Telemetry,
    CannedMessage,
    Audio,
    RemoteHardware,
    NeighborInfo,
    AmbientLighting,
    DetectionSensor,
    PaxCounter,
}

impl ModuleId {
    /// Every module category.
    pub const ALL: [ModuleId; 13] = [
        Self::Mqtt,
        Self::Serial,
        Self::ExternalNotification,
        Self::StoreForward,
        Self::RangeTest,
        Self::Telemetry,
        Self::CannedMessage,
        Self::Audio,
        Self::RemoteHardware,
        Self::NeighborInfo,
        Self::AmbientLighting,
        Self::DetectionSensor,
        Self::PaxCounter,
    ];

    /// Modules that have a configuration editor.
    ///
    /// This is the set checked before showing the "no configurable modules"
    /// notice.
    pub const CONFIGURABLE: [ModuleId; 11] = [
        Self::AmbientLighting,
        Self::CannedMessage,
        Self::DetectionSensor,
        Self::ExternalNotification,
        Self::Mqtt,
        Self::RangeTest,
        Self::PaxCounter,
        Self::Audio,
        Self::Serial,
        Self::StoreForward,
        Self::Telemetry,
    ];

    /// The exclusion bit the firmware uses for this module.
    pub const fn bit(self) -> ExcludedModules {
        match self {
            Self::Mqtt => ExcludedModules::MQTT,
            Self::Serial => ExcludedModules::SERIAL,
            Self::ExternalNotification => ExcludedModules::EXTERNAL_NOTIFICATION,
            Self::StoreForward => ExcludedModules::STORE_FORWARD,
            Self::RangeTest => ExcludedModules::RANGE_TEST,
            Self::Telemetry => ExcludedModules::TELEMETRY,
            Self::CannedMessage => ExcludedModules::CANNED_MESSAGE,
            Self::Audio => ExcludedModules::AUDIO,
            Self::RemoteHardware => ExcludedModules::REMOTE_HARDWARE,
            Self::NeighborInfo => ExcludedModules::NEIGHBOR_INFO,
            Self::AmbientLighting => ExcludedModules::AMBIENT_LIGHTING,
            Self::DetectionSensor => ExcludedModules::DETECTION_SENSOR,
            Self::PaxCounter => ExcludedModules::PAX_COUNTER,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mqtt => "MQTT",
            Self::Serial => "Serial",
            Self::ExternalNotification => "External Notification",
            Self::StoreForward => "Store & Forward",
            Self::RangeTest => "Range Test",
            Self::Telemetry => "Telemetry",
            Self::CannedMessage => "Canned Messages",
            Self::Audio => "Audio",
            Self::RemoteHardware => "Remote Hardware",
            Self::NeighborInfo => "Neighbor Info",
            Self::AmbientLighting => "Ambient Lighting",
            Self::DetectionSensor => "Detection Sensor",
            Self::PaxCounter => "PAX Counter",
        };
        f.write_str(name)
    }
}

/// Whether a module's configuration screen should be exposed for a node.
///
/// `module_filter_override` bypasses the bitmap entirely, including for an
/// absent node. Without it, an absent node (not yet connected) exposes
/// nothing.
pub fn is_module_available(
    node: Option<&Node>,
    module: ModuleId,
    module_filter_override: bool,
) -> bool {
    if module_filter_override {
        return true;
    }
    match node {
        Some(node) => !node.excluded_modules.intersects(module.bit()),
        None => false,
    }
}

/// Whether at least one of `modules` is available for the node.
pub fn any_module_available(
    node: Option<&Node>,
    modules: &[ModuleId],
    module_filter_override: bool,
) -> bool {
    modules
        .iter()
        .any(|&module| is_module_available(node, module, module_filter_override))
}

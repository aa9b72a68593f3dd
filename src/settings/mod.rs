//! Settings menu catalog.
//!
//! This module provides:
//! - [`SettingsDestination`]: Every settings screen and its gating module
//! - [`SettingsMenu`]: The filtered menu for the current session
//! - [`resolve_editor_node`]: The node an editor screen should receive

mod destination;
mod menu;

pub use destination::{resolve_editor_node, EditorTarget, SettingsDestination};
pub use menu::{
    ConfigureSection, DutyCycleNotice, MenuEntry, MenuSection, PickerEntry, SettingsMenu,
    NO_MODULES_NOTICE, OVERRIDE_FOOTER,
};

//! Operator preferences.
//!
//! Stored as JSON in `~/.mesh-admin-router/preferences.json`. Only the admin
//! scheme preference and the last connected device survive a restart; the
//! module filter override is a diagnostic switch that always starts off.
//!
//! # Usage
//!
//! ```ignore
//! use mesh_admin_router::config;
//!
//! let path = config::default_preferences_path()?;
//! let mut prefs = config::load_preferences_from(&path);
//! prefs.prefer_administration_via_pki = true;
//! config::save_preferences_to(&prefs, &path)?;
//! ```

use crate::node::NodeId;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Operator preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Use PKI administration when a node qualifies for either scheme.
    pub prefer_administration_via_pki: bool,
    /// Device seen on the last successful connection.
    pub last_connected_node: Option<NodeId>,
    /// Show all modules regardless of firmware exclusions. Never persisted.
    #[serde(skip)]
    pub module_filter_override: bool,
}

impl Preferences {
    /// Flip the module filter override and return the new value.
    pub fn toggle_module_override(&mut self) -> bool {
        self.module_filter_override = !self.module_filter_override;
        self.module_filter_override
    }

    /// Remember `id` as the last connected device.
    ///
    /// Returns `true` if the stored value changed.
    pub fn remember_connected(&mut self, id: NodeId) -> bool {
        if self.last_connected_node == Some(id) {
            return false;
        }
        self.last_connected_node = Some(id);
        true
    }
}

/// Preference storage errors.
#[derive(Debug)]
pub enum PreferencesError {
    /// Reading or writing the file failed.
    Io(io::Error),
    /// The preferences could not be encoded.
    Json(serde_json::Error),
    /// The file read back differs from what was written.
    VerifyFailed,
}

impl std::fmt::Display for PreferencesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::VerifyFailed => write!(f, "preferences verification failed"),
        }
    }
}

impl std::error::Error for PreferencesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::VerifyFailed => None,
        }
    }
}

impl From<io::Error> for PreferencesError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PreferencesError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Get the default preferences file path.
///
/// Returns `~/.mesh-admin-router/preferences.json`
pub fn default_preferences_path() -> io::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME not set"))?;
    Ok(PathBuf::from(home)
        .join(".mesh-admin-router")
        .join("preferences.json"))
}

/// Load preferences from a specific path.
///
/// A missing or unreadable file yields the defaults.
pub fn load_preferences_from(path: &Path) -> Preferences {
    let json = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No preferences file at {:?}", path);
            return Preferences::default();
        }
        Err(e) => {
            warn!("Failed to read preferences: {}", e);
            return Preferences::default();
        }
    };

    match serde_json::from_str(&json) {
        Ok(prefs) => prefs,
        Err(e) => {
            error!("Failed to parse stored preferences: {}", e);
            Preferences::default()
        }
    }
}

/// Save preferences to a specific path.
pub fn save_preferences_to(prefs: &Preferences, path: &Path) -> Result<(), PreferencesError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(prefs)?;
    fs::write(path, &json)?;

    if fs::read_to_string(path)? != json {
        return Err(PreferencesError::VerifyFailed);
    }

    info!("Preferences saved to {:?}", path);
    Ok(())
}

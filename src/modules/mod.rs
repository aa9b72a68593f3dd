//! Module availability filtering.
//!
//! This module provides:
//! - [`ExcludedModules`]: The firmware-reported exclusion bitmap
//! - [`ModuleId`]: Optional module categories
//! - [`is_module_available`] / [`any_module_available`]: Availability predicates

mod filter;

pub use filter::{any_module_available, is_module_available, ExcludedModules, ModuleId};

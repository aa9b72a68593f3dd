//! Target selection.
//!
//! This module provides:
//! - [`SelectionController`]: Owns the selected node and triggers handshakes
//! - [`SelectionState`]: Lazily evaluated selection state
//! - [`ConnectionEvent`]: Connectivity changes fed into the controller

mod controller;

pub use controller::{
    ConnectionEvent, Selection, SelectionController, SelectionError, SelectionState,
};

//! Serial port configuration panel
//!
//! Lets a user pick a serial port and its line settings, opens it, persists
//! the choice and optionally reopens it on the next start. The panel is
//! headless: a renderer reads `PortForm` and listens for `PanelEvent`s.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Settings record, line parameters, persisted key layout
//! - `ports/` - Trait definitions for serial devices and settings storage
//! - `adapters/` - Implementations of ports (serialport, mock devices, JSON file)
//! - `panel/` - Form model, open/close state machine and refresh tick

// Core domain (pure, no I/O)
pub mod domain;
pub mod ports;

// Adapters (external I/O)
pub mod adapters;

pub mod panel;

pub use panel::{PanelEvent, PortPanel, RefreshReport, RefreshTimer, REFRESH_INTERVAL};

//! Port traits (interfaces)
//!
//! These traits define the boundaries between the panel and external I/O.
//! Adapters implement these traits to connect to real hardware and storage.

pub mod serial;
pub mod settings;

pub use serial::*;
pub use settings::*;

//! Adapters implementing the port traits
//!
//! - `serial_port` — real hardware through the `serialport` crate
//! - `mock_serial` — in-memory devices for tests and hardware-free runs
//! - `settings_file` — JSON file and in-memory settings stores

pub mod mock_serial;
pub mod serial_port;
pub mod settings_file;

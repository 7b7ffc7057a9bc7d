//! Serial port traits
//!
//! Split into two traits:
//! - `SerialFactory` — listing and opening ports
//! - `SerialConnection` — an open port handle

use crate::domain::{PanelResult, PortSettings, SerialPortInfo};

/// Factory for creating serial connections.
///
/// Takes `&self` so test doubles can carry their own device list.
pub trait SerialFactory {
    /// List serial ports currently present on the system
    fn list_ports(&self) -> PanelResult<Vec<SerialPortInfo>>;

    /// Apply `settings` to a new handle and open it for read/write
    fn open(&self, settings: &PortSettings) -> PanelResult<Box<dyn SerialConnection>>;
}

/// Trait for an open serial port connection.
pub trait SerialConnection: Send {
    /// Name of the port this handle was opened on
    fn port_name(&self) -> &str;

    /// Write bytes to the port
    fn write(&mut self, data: &[u8]) -> PanelResult<usize>;

    /// Read bytes from the port (with timeout)
    fn read(&mut self, buffer: &mut [u8]) -> PanelResult<usize>;

    /// Close the connection
    fn close(&mut self) -> PanelResult<()>;

    /// False once the device has gone away or the handle was closed
    fn is_connected(&self) -> bool;
}

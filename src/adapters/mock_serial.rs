//! Mock serial adapter for development and testing without hardware.
//!
//! Activate in the CLI by setting MOCK_SERIAL=1 in the environment (or
//! passing `--mock`):
//!
//!   MOCK_SERIAL=1 RUST_LOG=comport_panel_lib=info comport-panel watch
//!
//! The device list is shared between clones, so a test can keep one clone
//! and plug or unplug ports while the panel owns another.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{PanelError, PanelResult, PortSettings, SerialPortInfo};
use crate::ports::{SerialConnection, SerialFactory};

/// Ports present when the mock is built with `Default`
const DEFAULT_PORTS: &[&str] = &["/dev/ttyMOCK0", "/dev/ttyMOCK1"];

#[derive(Default)]
struct MockBus {
    present: Vec<String>,
    busy: HashSet<String>,
    opened: Vec<PortSettings>,
    listing_fails: bool,
}

fn lock(bus: &Mutex<MockBus>) -> MutexGuard<'_, MockBus> {
    bus.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone)]
pub struct MockSerialFactory {
    bus: Arc<Mutex<MockBus>>,
}

impl MockSerialFactory {
    pub fn with_ports<I, S>(ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bus = MockBus {
            present: ports.into_iter().map(Into::into).collect(),
            ..MockBus::default()
        };
        log::info!("[MOCK SERIAL] Initialized with {:?}", bus.present);
        Self {
            bus: Arc::new(Mutex::new(bus)),
        }
    }

    /// Simulate a device appearing
    pub fn plug(&self, name: &str) {
        let mut bus = lock(&self.bus);
        if !bus.present.iter().any(|p| p == name) {
            bus.present.push(name.to_string());
            log::info!("[MOCK SERIAL] Plugged {name}");
        }
    }

    /// Simulate a device disappearing. Open handles on it report disconnected.
    pub fn unplug(&self, name: &str) {
        let mut bus = lock(&self.bus);
        bus.present.retain(|p| p != name);
        log::info!("[MOCK SERIAL] Unplugged {name}");
    }

    /// Make opens of `name` fail as if another process held it
    pub fn set_busy(&self, name: &str, busy: bool) {
        let mut bus = lock(&self.bus);
        if busy {
            bus.busy.insert(name.to_string());
        } else {
            bus.busy.remove(name);
        }
    }

    /// Make `list_ports` fail, as when the OS enumeration API errors
    pub fn set_listing_fails(&self, fails: bool) {
        lock(&self.bus).listing_fails = fails;
    }

    /// Every settings record successfully opened so far
    pub fn opened(&self) -> Vec<PortSettings> {
        lock(&self.bus).opened.clone()
    }
}

impl Default for MockSerialFactory {
    fn default() -> Self {
        Self::with_ports(DEFAULT_PORTS.iter().copied())
    }
}

impl SerialFactory for MockSerialFactory {
    fn list_ports(&self) -> PanelResult<Vec<SerialPortInfo>> {
        let bus = lock(&self.bus);
        if bus.listing_fails {
            log::info!("[MOCK SERIAL] LIST → enumeration failed");
            return Err(PanelError::Enumeration("mock enumeration failure".to_string()));
        }
        Ok(bus
            .present
            .iter()
            .map(|name| SerialPortInfo {
                name: name.clone(),
                port_type: "Mock".to_string(),
            })
            .collect())
    }

    fn open(&self, settings: &PortSettings) -> PanelResult<Box<dyn SerialConnection>> {
        let mut bus = lock(&self.bus);
        let name = &settings.port_name;

        if !bus.present.iter().any(|p| p == name) {
            log::info!("[MOCK SERIAL] OPEN {name} → no such device");
            return Err(PanelError::PortUnavailable {
                port: name.clone(),
                reason: "no such device".to_string(),
            });
        }
        if bus.busy.contains(name) {
            log::info!("[MOCK SERIAL] OPEN {name} → busy");
            return Err(PanelError::PortUnavailable {
                port: name.clone(),
                reason: "device or resource busy".to_string(),
            });
        }

        log::info!("[MOCK SERIAL] OPEN {settings}");
        bus.busy.insert(name.clone());
        bus.opened.push(settings.clone());

        Ok(Box::new(MockConnection {
            name: name.clone(),
            bus: Arc::clone(&self.bus),
            open: true,
            loopback: Vec::new(),
        }))
    }
}

/// Open mock handle. Written bytes are echoed back on read.
pub struct MockConnection {
    name: String,
    bus: Arc<Mutex<MockBus>>,
    open: bool,
    loopback: Vec<u8>,
}

impl MockConnection {
    fn release(&mut self) {
        if self.open {
            self.open = false;
            lock(&self.bus).busy.remove(&self.name);
        }
    }
}

impl SerialConnection for MockConnection {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, data: &[u8]) -> PanelResult<usize> {
        if !self.is_connected() {
            return Err(PanelError::Io(format!("{} is not connected", self.name)));
        }
        self.loopback.extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> PanelResult<usize> {
        if !self.is_connected() {
            return Err(PanelError::Io(format!("{} is not connected", self.name)));
        }
        let n = self.loopback.len().min(buffer.len());
        buffer[..n].copy_from_slice(&self.loopback[..n]);
        self.loopback.drain(..n);
        Ok(n)
    }

    fn close(&mut self) -> PanelResult<()> {
        log::info!("[MOCK SERIAL] CLOSE {}", self.name);
        self.release();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.open && lock(&self.bus).present.iter().any(|p| p == &self.name)
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.release();
    }
}

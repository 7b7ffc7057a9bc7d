//! Serial port adapter using the `serialport` crate
//!
//! Implements `SerialFactory` and `SerialConnection` traits.
//! `SerialPortFactory` has no instance data; it only lists and opens ports.

use std::io::{self, Read, Write};
use std::time::Duration;

use crate::domain::{
    DataBits, FlowControl, PanelError, PanelResult, Parity, PortSettings, SerialPortInfo,
    StopBits,
};
use crate::ports::{SerialConnection, SerialFactory};

/// Read/write timeout applied to every opened port
const IO_TIMEOUT_MS: u64 = 100;

/// Zero-sized factory for creating serial port connections.
pub struct SerialPortFactory;

impl SerialFactory for SerialPortFactory {
    fn list_ports(&self) -> PanelResult<Vec<SerialPortInfo>> {
        let ports = serialport::available_ports()
            .map_err(|e| PanelError::Enumeration(e.to_string()))?;

        Ok(ports
            .into_iter()
            .map(|p| {
                let port_type = match &p.port_type {
                    serialport::SerialPortType::UsbPort(info) => {
                        format!("USB ({:04X}:{:04X})", info.vid, info.pid)
                    }
                    serialport::SerialPortType::PciPort => "PCI".to_string(),
                    serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                    serialport::SerialPortType::Unknown => "Native".to_string(),
                };
                SerialPortInfo {
                    name: p.port_name,
                    port_type,
                }
            })
            .collect())
    }

    fn open(&self, settings: &PortSettings) -> PanelResult<Box<dyn SerialConnection>> {
        let port = settings.port_name.as_str();
        if port.is_empty() {
            return Err(PanelError::PortUnavailable {
                port: String::new(),
                reason: "no port selected".to_string(),
            });
        }

        let serial = serialport::new(port, settings.baud_rate)
            .data_bits(data_bits(settings.data_bits))
            .stop_bits(stop_bits(settings.stop_bits)?)
            .parity(parity(settings.parity)?)
            .flow_control(flow_control(settings.flow_control))
            .timeout(Duration::from_millis(IO_TIMEOUT_MS))
            .open()
            .map_err(|e| PanelError::PortUnavailable {
                port: port.to_string(),
                reason: e.to_string(),
            })?;

        log::info!("Opened {settings}");

        Ok(Box::new(SerialPortConnection {
            name: port.to_string(),
            port: Some(serial),
            connected: true,
        }))
    }
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn stop_bits(bits: StopBits) -> PanelResult<serialport::StopBits> {
    match bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OneAndHalf => Err(PanelError::UnsupportedSetting(
            "1.5 stop bits are not supported by this backend".to_string(),
        )),
    }
}

fn parity(parity: Parity) -> PanelResult<serialport::Parity> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Space | Parity::Mark => Err(PanelError::UnsupportedSetting(format!(
            "{} parity is not supported by this backend",
            parity.label()
        ))),
    }
}

fn flow_control(flow: FlowControl) -> serialport::FlowControl {
    match flow {
        FlowControl::None => serialport::FlowControl::None,
        FlowControl::Hardware => serialport::FlowControl::Hardware,
        FlowControl::Software => serialport::FlowControl::Software,
    }
}

/// Timeouts are routine on a polled port; anything else means the device is gone.
fn is_fatal(err: &io::Error) -> bool {
    !matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}

/// An open serial port connection wrapping the `serialport` crate.
pub struct SerialPortConnection {
    name: String,
    port: Option<Box<dyn serialport::SerialPort>>,
    connected: bool,
}

impl SerialPortConnection {
    fn port_mut(&mut self) -> PanelResult<&mut Box<dyn serialport::SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| PanelError::Io(format!("{} is closed", self.name)))
    }
}

impl SerialConnection for SerialPortConnection {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, data: &[u8]) -> PanelResult<usize> {
        let result = self.port_mut()?.write(data);
        result.map_err(|e| {
            if is_fatal(&e) {
                self.connected = false;
            }
            PanelError::Io(format!("Write failed: {e}"))
        })
    }

    fn read(&mut self, buffer: &mut [u8]) -> PanelResult<usize> {
        let result = self.port_mut()?.read(buffer);
        result.map_err(|e| {
            if is_fatal(&e) {
                self.connected = false;
            }
            PanelError::Io(format!("Read failed: {e}"))
        })
    }

    fn close(&mut self) -> PanelResult<()> {
        // Dropping the serialport handle releases the OS descriptor
        if self.port.take().is_some() {
            log::info!("Closed {}", self.name);
        }
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected && self.port.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_port_name_is_unavailable() {
        let result = SerialPortFactory.open(&PortSettings::default());
        assert!(matches!(result, Err(PanelError::PortUnavailable { .. })));
    }

    #[test]
    fn unsupported_parameters_are_rejected_before_opening() {
        assert!(matches!(
            stop_bits(StopBits::OneAndHalf),
            Err(PanelError::UnsupportedSetting(_))
        ));
        assert!(matches!(parity(Parity::Mark), Err(PanelError::UnsupportedSetting(_))));
        assert_eq!(parity(Parity::Odd).unwrap(), serialport::Parity::Odd);
        assert_eq!(data_bits(DataBits::Seven), serialport::DataBits::Seven);
    }

    #[test]
    fn timeouts_do_not_count_as_disconnects() {
        assert!(!is_fatal(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(is_fatal(&io::Error::from(io::ErrorKind::BrokenPipe)));
    }
}

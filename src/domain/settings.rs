//! The settings record and its key-value encoding
//!
//! Settings are persisted as a flat map under the `com` namespace so files
//! written by earlier versions of the panel keep loading.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{PanelError, PanelResult};
use super::types::{DataBits, Field, FlowControl, Parity, StopBits};

pub const KEY_AUTO_OPEN: &str = "com/autoOpen";
pub const KEY_BAUD_RATE: &str = "com/baudRate";
pub const KEY_PORT: &str = "com/port";
pub const KEY_DATA_BITS: &str = "com/dataBits";
pub const KEY_STOP_BITS: &str = "com/stopBits";
pub const KEY_HANDSHAKE: &str = "com/handshake";
pub const KEY_PARITY: &str = "com/parity";

pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// A single stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Flat key-value view of persisted settings
pub type SettingsMap = BTreeMap<String, SettingValue>;

/// Everything needed to open a serial port, plus the auto-open preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    /// OS port name, e.g. "/dev/ttyUSB0" or "COM3". Empty when none is selected.
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
    /// Open this port automatically on the next startup
    pub auto_open: bool,
}

impl Default for PortSettings {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            auto_open: false,
        }
    }
}

impl PortSettings {
    /// Encode into the flat key-value layout
    pub fn to_map(&self) -> SettingsMap {
        let mut map = SettingsMap::new();
        map.insert(KEY_AUTO_OPEN.into(), SettingValue::Bool(self.auto_open));
        map.insert(KEY_BAUD_RATE.into(), SettingValue::Int(self.baud_rate.into()));
        map.insert(KEY_PORT.into(), SettingValue::Text(self.port_name.clone()));
        map.insert(KEY_DATA_BITS.into(), SettingValue::Int(self.data_bits.code()));
        map.insert(KEY_STOP_BITS.into(), SettingValue::Int(self.stop_bits.code()));
        map.insert(KEY_HANDSHAKE.into(), SettingValue::Int(self.flow_control.code()));
        map.insert(KEY_PARITY.into(), SettingValue::Int(self.parity.code()));
        map
    }

    /// Decode from the flat key-value layout.
    ///
    /// A missing key is a load failure; a present key with a value that does
    /// not map onto a field is an `InvalidFieldValue`.
    pub fn from_map(map: &SettingsMap) -> PanelResult<Self> {
        let port_name = match get(map, KEY_PORT)? {
            SettingValue::Text(s) => s.clone(),
            other => return Err(PanelError::invalid(Field::Port, describe(other))),
        };

        let baud = int(map, KEY_BAUD_RATE, Field::BaudRate)?;
        let baud_rate = u32::try_from(baud)
            .ok()
            .filter(|&b| b > 0)
            .ok_or_else(|| PanelError::invalid(Field::BaudRate, baud))?;

        let code = int(map, KEY_DATA_BITS, Field::DataBits)?;
        let data_bits =
            DataBits::from_code(code).ok_or_else(|| PanelError::invalid(Field::DataBits, code))?;

        let code = int(map, KEY_STOP_BITS, Field::StopBits)?;
        let stop_bits =
            StopBits::from_code(code).ok_or_else(|| PanelError::invalid(Field::StopBits, code))?;

        let code = int(map, KEY_PARITY, Field::Parity)?;
        let parity =
            Parity::from_code(code).ok_or_else(|| PanelError::invalid(Field::Parity, code))?;

        let code = int(map, KEY_HANDSHAKE, Field::FlowControl)?;
        let flow_control = FlowControl::from_code(code)
            .ok_or_else(|| PanelError::invalid(Field::FlowControl, code))?;

        let auto_open = match get(map, KEY_AUTO_OPEN)? {
            SettingValue::Bool(b) => *b,
            // Older files stored booleans as 0/1
            SettingValue::Int(i) => *i != 0,
            other => return Err(PanelError::invalid(Field::AutoOpen, describe(other))),
        };

        Ok(Self {
            port_name,
            baud_rate,
            data_bits,
            stop_bits,
            parity,
            flow_control,
            auto_open,
        })
    }
}

fn get<'a>(map: &'a SettingsMap, key: &str) -> PanelResult<&'a SettingValue> {
    map.get(key)
        .ok_or_else(|| PanelError::SettingsLoadFailed(format!("missing key '{key}'")))
}

fn int(map: &SettingsMap, key: &str, field: Field) -> PanelResult<i64> {
    match get(map, key)? {
        SettingValue::Int(i) => Ok(*i),
        other => Err(PanelError::invalid(field, describe(other))),
    }
}

fn describe(value: &SettingValue) -> String {
    match value {
        SettingValue::Bool(b) => b.to_string(),
        SettingValue::Int(i) => i.to_string(),
        SettingValue::Text(s) => format!("\"{s}\""),
    }
}

impl fmt::Display for PortSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let port = if self.port_name.is_empty() {
            "<none>"
        } else {
            self.port_name.as_str()
        };
        let flow = match self.flow_control {
            FlowControl::None => "none",
            FlowControl::Hardware => "rts/cts",
            FlowControl::Software => "xon/xoff",
        };
        write!(
            f,
            "{port} {} {}{}{} flow={flow} auto-open={}",
            self.baud_rate,
            self.data_bits.label(),
            self.parity.letter(),
            self.stop_bits.label(),
            if self.auto_open { "on" } else { "off" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PortSettings {
        PortSettings {
            port_name: "/dev/ttyUSB1".into(),
            baud_rate: 57600,
            data_bits: DataBits::Seven,
            stop_bits: StopBits::Two,
            parity: Parity::Even,
            flow_control: FlowControl::Hardware,
            auto_open: true,
        }
    }

    #[test]
    fn default_settings_match_panel_defaults() {
        let s = PortSettings::default();
        assert_eq!(s.baud_rate, 19200);
        assert_eq!(s.data_bits, DataBits::Eight);
        assert_eq!(s.stop_bits, StopBits::One);
        assert_eq!(s.parity, Parity::None);
        assert_eq!(s.flow_control, FlowControl::None);
        assert!(!s.auto_open);
        assert!(s.port_name.is_empty());
    }

    #[test]
    fn map_uses_com_namespace_and_codes() {
        let map = sample().to_map();
        assert_eq!(map.len(), 7);
        assert_eq!(map[KEY_PORT], SettingValue::Text("/dev/ttyUSB1".into()));
        assert_eq!(map[KEY_BAUD_RATE], SettingValue::Int(57600));
        assert_eq!(map[KEY_STOP_BITS], SettingValue::Int(2));
        assert_eq!(map[KEY_PARITY], SettingValue::Int(2));
        assert_eq!(map[KEY_HANDSHAKE], SettingValue::Int(1));
        assert_eq!(map[KEY_AUTO_OPEN], SettingValue::Bool(true));
    }

    #[test]
    fn known_values_decode_field_for_field() {
        let mut map = SettingsMap::new();
        map.insert(KEY_PORT.into(), SettingValue::Text("COM4".into()));
        map.insert(KEY_BAUD_RATE.into(), SettingValue::Int(9600));
        map.insert(KEY_DATA_BITS.into(), SettingValue::Int(7));
        map.insert(KEY_STOP_BITS.into(), SettingValue::Int(3));
        map.insert(KEY_PARITY.into(), SettingValue::Int(5));
        map.insert(KEY_HANDSHAKE.into(), SettingValue::Int(2));
        map.insert(KEY_AUTO_OPEN.into(), SettingValue::Int(1));

        let s = PortSettings::from_map(&map).unwrap();
        assert_eq!(s.port_name, "COM4");
        assert_eq!(s.baud_rate, 9600);
        assert_eq!(s.data_bits, DataBits::Seven);
        assert_eq!(s.stop_bits, StopBits::OneAndHalf);
        assert_eq!(s.parity, Parity::Mark);
        assert_eq!(s.flow_control, FlowControl::Software);
        assert!(s.auto_open);
    }

    #[test]
    fn decode_reports_missing_keys_as_load_failure() {
        let mut map = sample().to_map();
        map.remove(KEY_PARITY);
        assert!(matches!(
            PortSettings::from_map(&map),
            Err(PanelError::SettingsLoadFailed(_))
        ));
    }

    #[test]
    fn decode_rejects_out_of_range_codes() {
        let mut map = sample().to_map();
        map.insert(KEY_DATA_BITS.into(), SettingValue::Int(9));
        assert_eq!(
            PortSettings::from_map(&map),
            Err(PanelError::invalid(Field::DataBits, 9))
        );

        let mut map = sample().to_map();
        map.insert(KEY_BAUD_RATE.into(), SettingValue::Int(0));
        assert!(matches!(
            PortSettings::from_map(&map),
            Err(PanelError::InvalidFieldValue { field: Field::BaudRate, .. })
        ));

        let mut map = sample().to_map();
        map.insert(KEY_PORT.into(), SettingValue::Int(3));
        assert!(PortSettings::from_map(&map).is_err());
    }

    #[test]
    fn any_field_difference_breaks_equality() {
        let base = sample();
        let mut other = base.clone();
        assert_eq!(base, other);
        other.auto_open = false;
        assert_ne!(base, other);

        let mut other = base.clone();
        other.stop_bits = StopBits::One;
        assert_ne!(base, other);
    }

    #[test]
    fn display_is_a_compact_summary() {
        assert_eq!(
            sample().to_string(),
            "/dev/ttyUSB1 57600 7E2 flow=rts/cts auto-open=on"
        );
        assert_eq!(
            PortSettings::default().to_string(),
            "<none> 19200 8N1 flow=none auto-open=off"
        );
    }
}

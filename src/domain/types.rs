//! Serial line parameters
//!
//! Each enum carries three representations: the value itself, the integer
//! code stored in the settings file, and a label for the form.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use super::error::PanelError;

/// Baud rates offered by the form. Any non-zero rate is still accepted.
pub const BAUD_RATES: &[u32] = &[1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200];

/// Information about a serial port
#[derive(Debug, Clone, PartialEq)]
pub struct SerialPortInfo {
    pub name: String,
    pub port_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    pub const ALL: [DataBits; 4] = [Self::Five, Self::Six, Self::Seven, Self::Eight];

    /// Number of data bits; also the persisted code.
    pub fn code(self) -> i64 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopBits {
    One,
    OneAndHalf,
    Two,
}

impl StopBits {
    /// Display order used by the form.
    pub const ALL: [StopBits; 3] = [Self::One, Self::Two, Self::OneAndHalf];

    pub fn code(self) -> i64 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::OneAndHalf => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::OneAndHalf => "1.5",
            Self::Two => "2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    None,
    Even,
    Odd,
    Space,
    Mark,
}

impl Parity {
    pub const ALL: [Parity; 5] = [Self::None, Self::Even, Self::Odd, Self::Space, Self::Mark];

    /// Persisted code. 1 is unused, kept for compatibility with existing files.
    pub fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Even => 2,
            Self::Odd => 3,
            Self::Space => 4,
            Self::Mark => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No parity",
            Self::Even => "Even",
            Self::Odd => "Odd",
            Self::Space => "Space",
            Self::Mark => "Mark",
        }
    }

    /// Letter used in the "8N1" style summary
    pub fn letter(self) -> char {
        match self {
            Self::None => 'N',
            Self::Even => 'E',
            Self::Odd => 'O',
            Self::Space => 'S',
            Self::Mark => 'M',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowControl {
    None,
    Hardware,
    Software,
}

impl FlowControl {
    pub const ALL: [FlowControl; 3] = [Self::None, Self::Hardware, Self::Software];

    pub fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Hardware => 1,
            Self::Software => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Hardware => "Hardware (RTS/CTS)",
            Self::Software => "Software (XON/XOFF)",
        }
    }
}

impl FromStr for DataBits {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| PanelError::invalid(Field::DataBits, s))
    }
}

impl FromStr for StopBits {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::One),
            "1.5" => Ok(Self::OneAndHalf),
            "2" => Ok(Self::Two),
            _ => Err(PanelError::invalid(Field::StopBits, s)),
        }
    }
}

impl FromStr for Parity {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Self::None),
            "even" | "e" => Ok(Self::Even),
            "odd" | "o" => Ok(Self::Odd),
            "space" | "s" => Ok(Self::Space),
            "mark" | "m" => Ok(Self::Mark),
            _ => Err(PanelError::invalid(Field::Parity, s)),
        }
    }
}

impl FromStr for FlowControl {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "hardware" | "rts/cts" => Ok(Self::Hardware),
            "software" | "xon/xoff" => Ok(Self::Software),
            _ => Err(PanelError::invalid(Field::FlowControl, s)),
        }
    }
}

/// Editable fields of the panel form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Port,
    BaudRate,
    DataBits,
    StopBits,
    Parity,
    FlowControl,
    AutoOpen,
}

impl Field {
    /// Visibility flag controlling this field. Flow control has none and is
    /// always shown.
    pub fn visibility_flag(self) -> Option<Visibility> {
        match self {
            Self::Port => Some(Visibility::PORT),
            Self::BaudRate => Some(Visibility::BAUD_RATE),
            Self::DataBits => Some(Visibility::DATA_BITS),
            Self::StopBits => Some(Visibility::STOP_BITS),
            Self::Parity => Some(Visibility::PARITY),
            Self::AutoOpen => Some(Visibility::AUTO_OPEN),
            Self::FlowControl => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Port => "port",
            Self::BaudRate => "baud rate",
            Self::DataBits => "data bits",
            Self::StopBits => "stop bits",
            Self::Parity => "parity",
            Self::FlowControl => "flow control",
            Self::AutoOpen => "auto-open",
        };
        f.write_str(name)
    }
}

/// Bitmask selecting which form rows are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Visibility(pub u8);

impl Visibility {
    pub const NOTHING: Self = Self(0);
    pub const PORT: Self = Self(0x01);
    pub const BAUD_RATE: Self = Self(0x02);
    pub const DATA_BITS: Self = Self(0x04);
    pub const STOP_BITS: Self = Self(0x08);
    pub const PARITY: Self = Self(0x10);
    pub const AUTO_OPEN: Self = Self(0x20);
    pub const ALL: Self = Self(0x3F);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for Visibility {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Visibility {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_codes_round_trip() {
        for d in DataBits::ALL {
            assert_eq!(DataBits::from_code(d.code()), Some(d));
        }
        for s in StopBits::ALL {
            assert_eq!(StopBits::from_code(s.code()), Some(s));
        }
        for p in Parity::ALL {
            assert_eq!(Parity::from_code(p.code()), Some(p));
        }
        for f in FlowControl::ALL {
            assert_eq!(FlowControl::from_code(f.code()), Some(f));
        }
    }

    #[test]
    fn codes_match_existing_settings_files() {
        assert_eq!(StopBits::OneAndHalf.code(), 3);
        assert_eq!(Parity::Even.code(), 2);
        assert_eq!(Parity::Mark.code(), 5);
        assert_eq!(FlowControl::Software.code(), 2);
        assert_eq!(Parity::from_code(1), None);
        assert_eq!(DataBits::from_code(4), None);
    }

    #[test]
    fn parse_accepts_cli_spellings() {
        assert_eq!("7".parse::<DataBits>().unwrap(), DataBits::Seven);
        assert_eq!("1.5".parse::<StopBits>().unwrap(), StopBits::OneAndHalf);
        assert_eq!("Even".parse::<Parity>().unwrap(), Parity::Even);
        assert_eq!("rts/cts".parse::<FlowControl>().unwrap(), FlowControl::Hardware);
        assert!("9".parse::<DataBits>().is_err());
        assert!("1.25".parse::<StopBits>().is_err());
    }

    #[test]
    fn visibility_flags_combine() {
        let vis = Visibility::PORT | Visibility::BAUD_RATE;
        assert!(vis.contains(Visibility::PORT));
        assert!(!vis.contains(Visibility::PARITY));
        assert_eq!(Visibility::default(), Visibility::ALL);
        assert_eq!(Field::FlowControl.visibility_flag(), None);
        assert_eq!(Field::AutoOpen.visibility_flag(), Some(Visibility::AUTO_OPEN));
    }
}

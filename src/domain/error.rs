//! Domain error types

use thiserror::Error;

use super::types::Field;

/// Errors that can occur while configuring or opening a serial port
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    #[error("Port {port} unavailable: {reason}")]
    PortUnavailable { port: String, reason: String },

    #[error("Serial I/O error: {0}")]
    Io(String),

    #[error("Unsupported setting: {0}")]
    UnsupportedSetting(String),

    #[error("Port is already open")]
    AlreadyOpen,

    #[error("Field {0} cannot be edited while the port is open")]
    FieldLocked(Field),

    #[error("Failed to load settings: {0}")]
    SettingsLoadFailed(String),

    #[error("Failed to save settings: {0}")]
    SettingsSaveFailed(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidFieldValue { field: Field, value: String },

    #[error("Failed to list ports: {0}")]
    Enumeration(String),
}

impl PanelError {
    pub fn invalid(field: Field, value: impl ToString) -> Self {
        Self::InvalidFieldValue {
            field,
            value: value.to_string(),
        }
    }
}

/// Result type alias for panel operations
pub type PanelResult<T> = Result<T, PanelError>;

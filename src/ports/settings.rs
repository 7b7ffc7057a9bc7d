//! Settings persistence port

use crate::domain::{PanelResult, SettingsMap};

/// Flat key-value persistence for the panel's settings record
pub trait SettingsStore {
    /// Read every stored entry. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> PanelResult<Option<SettingsMap>>;

    /// Replace the stored entries with `entries`
    fn save(&mut self, entries: &SettingsMap) -> PanelResult<()>;
}

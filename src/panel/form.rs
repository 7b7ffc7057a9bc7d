//! Form model behind the panel
//!
//! Holds what a renderer needs: the current value of every field, the
//! choices offered for each, which rows are visible and whether editing is
//! enabled. The form never touches hardware or storage.

use crate::domain::{
    DataBits, Field, FlowControl, PanelError, PanelResult, Parity, PortSettings, StopBits,
    Visibility, BAUD_RATES,
};

/// Result of merging a fresh enumeration into the displayed port list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortListChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl PortListChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PortForm {
    ports: Vec<String>,
    selected_port: Option<String>,
    baud_rate: u32,
    data_bits: DataBits,
    stop_bits: StopBits,
    parity: Parity,
    flow_control: FlowControl,
    auto_open: bool,
    visibility: Visibility,
    enabled: bool,
}

impl PortForm {
    /// Form populated with `ports` and default values
    pub fn new(ports: Vec<String>) -> Self {
        let mut form = Self {
            ports,
            selected_port: None,
            baud_rate: 0,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            auto_open: false,
            visibility: Visibility::ALL,
            enabled: true,
        };
        form.load_defaults();
        form
    }

    /// Reset every field to its default; the port becomes the first listed one
    pub fn load_defaults(&mut self) {
        let defaults = PortSettings::default();
        self.baud_rate = defaults.baud_rate;
        self.data_bits = defaults.data_bits;
        self.stop_bits = defaults.stop_bits;
        self.parity = defaults.parity;
        self.flow_control = defaults.flow_control;
        self.auto_open = defaults.auto_open;
        self.selected_port = self.ports.first().cloned();
    }

    /// Current field values as a settings record. Hidden fields contribute
    /// their last-set value.
    pub fn record(&self) -> PortSettings {
        PortSettings {
            port_name: self.selected_port.clone().unwrap_or_default(),
            baud_rate: self.baud_rate,
            data_bits: self.data_bits,
            stop_bits: self.stop_bits,
            parity: self.parity,
            flow_control: self.flow_control,
            auto_open: self.auto_open,
        }
    }

    /// Copy `settings` into the fields. Returns whether the saved port is
    /// currently listed.
    ///
    /// A saved port that is not present stays selected, unlisted, so the
    /// record keeps naming the last-used device until the user picks another.
    /// Only an empty saved port falls back to the first listed one.
    pub fn apply(&mut self, settings: &PortSettings) -> bool {
        self.baud_rate = settings.baud_rate;
        self.data_bits = settings.data_bits;
        self.stop_bits = settings.stop_bits;
        self.parity = settings.parity;
        self.flow_control = settings.flow_control;
        self.auto_open = settings.auto_open;

        if settings.port_name.is_empty() {
            self.selected_port = self.ports.first().cloned();
        } else {
            self.selected_port = Some(settings.port_name.clone());
        }
        self.is_selection_listed()
    }

    /// Whether the selected port appears in the displayed list
    pub fn is_selection_listed(&self) -> bool {
        self.selected_port
            .as_ref()
            .is_some_and(|sel| self.ports.contains(sel))
    }

    /// Merge a fresh enumeration: append new names, drop vanished ones.
    ///
    /// The selection never moves to another device: a selected port that
    /// vanishes stays selected (unlisted) and is matched again if it comes
    /// back. Only an empty selection picks up the first listed port.
    pub fn sync_ports(&mut self, current: &[String]) -> PortListChange {
        let removed: Vec<String> = self
            .ports
            .iter()
            .filter(|p| !current.contains(p))
            .cloned()
            .collect();
        let added: Vec<String> = current
            .iter()
            .filter(|p| !self.ports.contains(p))
            .cloned()
            .collect();

        self.ports.retain(|p| current.contains(p));
        self.ports.extend(added.iter().cloned());

        if self.selected_port.is_none() {
            self.selected_port = self.ports.first().cloned();
        }

        PortListChange { added, removed }
    }

    fn ensure_enabled(&self, field: Field) -> PanelResult<()> {
        if self.enabled {
            Ok(())
        } else {
            Err(PanelError::FieldLocked(field))
        }
    }

    pub fn select_port(&mut self, name: &str) -> PanelResult<()> {
        self.ensure_enabled(Field::Port)?;
        if !self.ports.iter().any(|p| p == name) {
            return Err(PanelError::invalid(Field::Port, name));
        }
        self.selected_port = Some(name.to_string());
        Ok(())
    }

    pub fn set_baud_rate(&mut self, baud_rate: u32) -> PanelResult<()> {
        self.ensure_enabled(Field::BaudRate)?;
        if baud_rate == 0 {
            return Err(PanelError::invalid(Field::BaudRate, baud_rate));
        }
        self.baud_rate = baud_rate;
        Ok(())
    }

    pub fn set_data_bits(&mut self, data_bits: DataBits) -> PanelResult<()> {
        self.ensure_enabled(Field::DataBits)?;
        self.data_bits = data_bits;
        Ok(())
    }

    pub fn set_stop_bits(&mut self, stop_bits: StopBits) -> PanelResult<()> {
        self.ensure_enabled(Field::StopBits)?;
        self.stop_bits = stop_bits;
        Ok(())
    }

    pub fn set_parity(&mut self, parity: Parity) -> PanelResult<()> {
        self.ensure_enabled(Field::Parity)?;
        self.parity = parity;
        Ok(())
    }

    pub fn set_flow_control(&mut self, flow_control: FlowControl) -> PanelResult<()> {
        self.ensure_enabled(Field::FlowControl)?;
        self.flow_control = flow_control;
        Ok(())
    }

    pub fn set_auto_open(&mut self, auto_open: bool) -> PanelResult<()> {
        self.ensure_enabled(Field::AutoOpen)?;
        self.auto_open = auto_open;
        Ok(())
    }

    /// Enables or disables every editable field and the open control together
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The open control follows the fields
    pub fn can_open(&self) -> bool {
        self.enabled
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self, field: Field) -> bool {
        field
            .visibility_flag()
            .map_or(true, |flag| self.visibility.contains(flag))
    }

    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    pub fn selected_port(&self) -> Option<&str> {
        self.selected_port.as_deref()
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn baud_choices(&self) -> &'static [u32] {
        BAUD_RATES
    }

    pub fn data_bits(&self) -> DataBits {
        self.data_bits
    }

    pub fn stop_bits(&self) -> StopBits {
        self.stop_bits
    }

    pub fn parity(&self) -> Parity {
        self.parity
    }

    pub fn flow_control(&self) -> FlowControl {
        self.flow_control
    }

    pub fn auto_open(&self) -> bool {
        self.auto_open
    }
}

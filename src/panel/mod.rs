//! Port configuration panel
//!
//! `PortPanel` owns the form, the settings store and (while open) the port
//! handle. It is single-threaded: the caller's event loop invokes the
//! operations and drives `refresh` from a `RefreshTimer`.
//!
//! Handle lifecycle is Closed ⇄ Open. `open` is the only way in; `close`
//! (user request) and `handle_close_signal` (the handle announced it is
//! going away) are the only ways out.

pub mod events;
pub mod form;
pub mod timer;

pub use events::PanelEvent;
pub use form::{PortForm, PortListChange};
pub use timer::{RefreshTimer, REFRESH_INTERVAL};

use crossbeam_channel::Receiver;

use crate::domain::{
    DataBits, Field, FlowControl, PanelError, PanelResult, Parity, PortSettings, StopBits,
    Visibility,
};
use crate::ports::{SerialConnection, SerialFactory, SettingsStore};

use events::EventBus;

/// What a single refresh tick changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub ports: PortListChange,
    /// The form differed from the last saved record and was written out
    pub saved: bool,
    /// The open handle reported its device gone and was released
    pub disconnected: bool,
}

pub struct PortPanel<F: SerialFactory, S: SettingsStore> {
    factory: F,
    store: S,
    form: PortForm,
    connection: Option<Box<dyn SerialConnection>>,
    last_saved: Option<PortSettings>,
    events: EventBus,
}

impl<F: SerialFactory, S: SettingsStore> PortPanel<F, S> {
    /// Build the panel: enumerate ports, load persisted settings (or
    /// defaults), and auto-open if the loaded settings ask for it.
    pub fn new(factory: F, store: S) -> Self {
        let ports = enumerate(&factory).unwrap_or_else(|e| {
            log::warn!("{e}; starting with an empty port list");
            Vec::new()
        });

        let mut panel = Self {
            factory,
            store,
            form: PortForm::new(ports),
            connection: None,
            last_saved: None,
            events: EventBus::new(),
        };

        match panel.load_settings() {
            Ok(Some(settings)) => panel.restore(settings),
            Ok(None) => log::info!("No saved settings, using defaults"),
            Err(e) => log::warn!("{e}; using defaults"),
        }

        panel
    }

    fn restore(&mut self, settings: PortSettings) {
        log::debug!("Loaded settings: {settings}");
        let port_listed = self.form.apply(&settings);
        if !port_listed {
            log::warn!(
                "Saved port {:?} not present; keeping it selected",
                settings.port_name
            );
        }
        let auto_open = settings.auto_open;
        self.last_saved = Some(settings);

        if auto_open {
            if port_listed {
                // Failure is reported through PortOpenFailed
                let _ = self.open();
            } else {
                log::warn!("Auto-open skipped: saved port is not available");
            }
        }
    }

    /// Read the persisted record, if any
    pub fn load_settings(&self) -> PanelResult<Option<PortSettings>> {
        self.store
            .load()?
            .map(|entries| PortSettings::from_map(&entries))
            .transpose()
    }

    /// Reset the form to defaults (first listed port, 19200 8N1, no flow control).
    /// Refused while the port is open, like any other edit.
    pub fn load_defaults(&mut self) -> PanelResult<()> {
        if self.connection.is_some() {
            return Err(PanelError::FieldLocked(Field::Port));
        }
        self.form.load_defaults();
        log::debug!("Applied defaults: {}", self.form.record());
        Ok(())
    }

    /// Names of the serial ports currently present, in enumeration order
    pub fn list_available_ports(&self) -> Vec<String> {
        enumerate(&self.factory).unwrap_or_else(|e| {
            log::warn!("{e}");
            Vec::new()
        })
    }

    /// Open the port described by the form.
    ///
    /// On success the fields lock, the record is saved and `PortOpenStateChanged(true)`
    /// then `PortOpened` are emitted. On failure `PortOpenFailed` is emitted and
    /// the panel stays closed. There is no retry.
    pub fn open(&mut self) -> PanelResult<()> {
        if self.connection.is_some() {
            return Err(PanelError::AlreadyOpen);
        }

        let settings = self.form.record();
        let connection = match self.factory.open(&settings) {
            Ok(connection) => connection,
            Err(e) => {
                log::warn!("Cannot open {}: {e}", settings.port_name);
                self.events.emit(PanelEvent::PortOpenFailed {
                    port: settings.port_name.clone(),
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        log::info!("Port open: {settings}");
        self.connection = Some(connection);
        self.form.set_enabled(false);

        if let Err(e) = self.persist(&settings) {
            log::warn!("{e}");
        }

        self.events.emit(PanelEvent::PortOpenStateChanged(true));
        self.events.emit(PanelEvent::PortOpened {
            port: settings.port_name,
        });
        Ok(())
    }

    /// Close the port on user request. Does nothing when already closed.
    pub fn close(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        if let Err(e) = connection.close() {
            log::warn!("Error closing {}: {e}", connection.port_name());
        }
        self.finish_close(connection.port_name());
    }

    /// The handle announced it is closing (device unplugged, closed by a
    /// collaborator). Releases it without closing it a second time.
    pub fn handle_close_signal(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        self.finish_close(connection.port_name());
    }

    fn finish_close(&mut self, port: &str) {
        log::info!("Port closed: {port}");
        self.form.set_enabled(true);
        self.events.emit(PanelEvent::PortOpenStateChanged(false));
    }

    /// One refresh tick: merge the current port list into the form, release a
    /// handle whose device vanished, and save the form if it changed since the
    /// last save.
    pub fn refresh(&mut self) -> RefreshReport {
        let mut report = RefreshReport::default();

        match enumerate(&self.factory) {
            Ok(ports) => {
                let vanished = self
                    .connection
                    .as_ref()
                    .is_some_and(|c| !ports.iter().any(|p| p == c.port_name()));
                if vanished {
                    log::warn!("Open port is no longer listed");
                    self.handle_close_signal();
                    report.disconnected = true;
                }

                report.ports = self.form.sync_ports(&ports);
                if !report.ports.is_empty() {
                    log::debug!(
                        "Ports changed: +{:?} -{:?}",
                        report.ports.added,
                        report.ports.removed
                    );
                }
            }
            Err(e) => log::warn!("{e}; keeping the displayed port list"),
        }

        if self.connection.as_ref().is_some_and(|c| !c.is_connected()) {
            log::warn!("Open port lost its device");
            self.handle_close_signal();
            report.disconnected = true;
        }

        let candidate = self.form.record();
        if self.last_saved.as_ref() != Some(&candidate) {
            match self.persist(&candidate) {
                Ok(()) => report.saved = true,
                // last_saved is untouched, so the next tick retries
                Err(e) => log::warn!("{e}"),
            }
        }

        report
    }

    fn persist(&mut self, settings: &PortSettings) -> PanelResult<()> {
        self.store.save(&settings.to_map())?;
        log::debug!("Saved settings: {settings}");
        self.last_saved = Some(settings.clone());
        Ok(())
    }

    pub fn select_port(&mut self, name: &str) -> PanelResult<()> {
        self.form.select_port(name)
    }

    pub fn set_baud_rate(&mut self, baud_rate: u32) -> PanelResult<()> {
        self.form.set_baud_rate(baud_rate)
    }

    pub fn set_data_bits(&mut self, data_bits: DataBits) -> PanelResult<()> {
        self.form.set_data_bits(data_bits)
    }

    pub fn set_stop_bits(&mut self, stop_bits: StopBits) -> PanelResult<()> {
        self.form.set_stop_bits(stop_bits)
    }

    pub fn set_parity(&mut self, parity: Parity) -> PanelResult<()> {
        self.form.set_parity(parity)
    }

    pub fn set_flow_control(&mut self, flow_control: FlowControl) -> PanelResult<()> {
        self.form.set_flow_control(flow_control)
    }

    pub fn set_auto_open(&mut self, auto_open: bool) -> PanelResult<()> {
        self.form.set_auto_open(auto_open)
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.form.set_visibility(visibility);
    }

    pub fn visibility(&self) -> Visibility {
        self.form.visibility()
    }

    /// Read-only view for rendering
    pub fn form(&self) -> &PortForm {
        &self.form
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// The live handle, for collaborators doing the actual data transfer
    pub fn connection_mut(&mut self) -> Option<&mut (dyn SerialConnection + 'static)> {
        self.connection.as_deref_mut()
    }

    pub fn last_saved(&self) -> Option<&PortSettings> {
        self.last_saved.as_ref()
    }

    /// Subscribe to panel events. Every receiver gets every event emitted
    /// after it subscribed; the first one also gets those raised during startup.
    pub fn events(&mut self) -> Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<F: SerialFactory, S: SettingsStore> Drop for PortPanel<F, S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn enumerate<F: SerialFactory>(factory: &F) -> PanelResult<Vec<String>> {
    Ok(factory
        .list_ports()?
        .into_iter()
        .map(|info| info.name)
        .collect())
}

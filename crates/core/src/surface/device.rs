use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{ButtonLayout, ControlSurfaceDecoder, ControlSurfaceState, StateDelta};
use crate::{FlowTextError, Result};

#[cfg(feature = "midi")]
const CLIENT_NAME: &str = "flow-text";

/// Connection manager for the hardware surface.
///
/// The decoder lives behind a mutex shared with the MIDI driver callback;
/// the frame loop only ever sees whole snapshots through [`SurfaceHandle`].
pub struct ControlSurface {
    shared: Arc<Mutex<ControlSurfaceDecoder>>,
    port_name: Option<String>,
    #[cfg(feature = "midi")]
    connection: Option<midir::MidiInputConnection<()>>,
}

impl ControlSurface {
    pub fn new(layout: ButtonLayout) -> Self {
        Self {
            shared: Arc::new(Mutex::new(ControlSurfaceDecoder::new(layout))),
            port_name: None,
            #[cfg(feature = "midi")]
            connection: None,
        }
    }

    /// Returns a cheap handle the frame loop uses to read snapshots.
    pub fn handle(&self) -> SurfaceHandle {
        SurfaceHandle {
            shared: self.shared.clone(),
        }
    }

    /// Name of the port currently connected, if any.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.handle()
            .snapshot()
            .map(|state| state.connected)
            .unwrap_or(false)
    }

    /// Discovers an input port and starts decoding its traffic.
    ///
    /// `port_hint` selects the first port whose name contains it
    /// (case-insensitive); without a hint the first input port is used.
    /// Failure is never fatal: the surface simply stays disconnected and
    /// callers fall back to default parameters.
    pub fn initialize(&mut self, port_hint: Option<&str>) -> bool {
        self.disconnect();

        match self.connect(port_hint) {
            Ok(name) => {
                tracing::info!(port = %name, "control surface connected");
                self.port_name = Some(name);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "control surface unavailable, using default parameters");
                false
            }
        }
    }

    /// Drops the driver connection and marks the surface disconnected.
    pub fn disconnect(&mut self) {
        #[cfg(feature = "midi")]
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }

        if let Some(name) = self.port_name.take() {
            tracing::info!(port = %name, "control surface disconnected");
        }

        match self.lock() {
            Ok(mut decoder) => decoder.set_connected(false),
            Err(err) => tracing::warn!(%err, "could not mark surface disconnected"),
        }
    }

    /// Checks whether the connected port is still present and disconnects if
    /// it vanished. Returns the resulting connection state.
    pub fn poll_connection(&mut self) -> bool {
        let Some(name) = self.port_name.clone() else {
            return false;
        };

        match Self::list_ports() {
            Ok(ports) if ports.iter().any(|port| *port == name) => true,
            Ok(_) => {
                tracing::warn!(port = %name, "control surface port disappeared");
                self.disconnect();
                false
            }
            Err(err) => {
                tracing::warn!(%err, "failed to poll MIDI ports");
                true
            }
        }
    }

    /// Injects a raw message as if the driver had delivered it.
    pub fn feed(&self, raw: &[u8]) -> Result<Option<StateDelta>> {
        let mut decoder = self.lock()?;
        Ok(decoder.handle_message(raw))
    }

    /// Marks the surface connected without a driver, for scripted sessions.
    pub fn attach_virtual(&mut self, name: impl Into<String>) -> Result<()> {
        self.disconnect();
        self.lock()?.reset(true);
        self.port_name = Some(name.into());
        Ok(())
    }

    /// Lists the names of all MIDI input ports.
    #[cfg(feature = "midi")]
    pub fn list_ports() -> Result<Vec<String>> {
        let input = midir::MidiInput::new(&format!("{CLIENT_NAME}-probe"))?;
        Ok(input
            .ports()
            .iter()
            .enumerate()
            .map(|(index, port)| {
                input
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {index}"))
            })
            .collect())
    }

    #[cfg(not(feature = "midi"))]
    pub fn list_ports() -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    #[cfg(feature = "midi")]
    fn connect(&mut self, port_hint: Option<&str>) -> Result<String> {
        let mut input = midir::MidiInput::new(CLIENT_NAME)?;
        input.ignore(midir::Ignore::All);

        let ports = input.ports();
        if ports.is_empty() {
            return Err(FlowTextError::Midi("no MIDI input devices found".into()));
        }

        let hint = port_hint.map(str::to_lowercase);
        let (port, name) = ports
            .iter()
            .filter_map(|port| input.port_name(port).ok().map(|name| (port, name)))
            .find(|(_, name)| {
                hint.as_ref()
                    .map(|hint| name.to_lowercase().contains(hint))
                    .unwrap_or(true)
            })
            .ok_or_else(|| {
                FlowTextError::Midi(format!(
                    "no MIDI input matching `{}`",
                    port_hint.unwrap_or_default()
                ))
            })?;
        let port = port.clone();

        // A fresh snapshot per session; nothing from the last device survives.
        self.lock()?.reset(false);

        let shared = self.shared.clone();
        let connection = input
            .connect(
                &port,
                "flow-text-input",
                move |_timestamp, bytes, _| match shared.lock() {
                    Ok(mut decoder) => {
                        decoder.handle_message(bytes);
                    }
                    Err(_) => tracing::error!("surface decoder has been poisoned"),
                },
                (),
            )
            .map_err(|err| FlowTextError::Midi(err.to_string()))?;

        self.lock()?.set_connected(true);
        self.connection = Some(connection);
        Ok(name)
    }

    #[cfg(not(feature = "midi"))]
    fn connect(&mut self, _port_hint: Option<&str>) -> Result<String> {
        Err(FlowTextError::Midi("built without MIDI support".into()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ControlSurfaceDecoder>> {
        self.shared
            .lock()
            .map_err(|_| FlowTextError::msg("surface decoder has been poisoned"))
    }
}

impl Drop for ControlSurface {
    fn drop(&mut self) {
        #[cfg(feature = "midi")]
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}

impl fmt::Debug for ControlSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSurface")
            .field("port_name", &self.port_name)
            .finish()
    }
}

/// Shared, thread-safe view over the surface state.
#[derive(Clone)]
pub struct SurfaceHandle {
    shared: Arc<Mutex<ControlSurfaceDecoder>>,
}

impl SurfaceHandle {
    /// Copies the whole state under a single lock.
    pub fn snapshot(&self) -> Result<ControlSurfaceState> {
        let decoder = self
            .shared
            .lock()
            .map_err(|_| FlowTextError::msg("surface decoder has been poisoned"))?;
        Ok(decoder.state().clone())
    }
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle").finish()
    }
}

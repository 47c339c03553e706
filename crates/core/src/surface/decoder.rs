use std::fmt;

use super::{ButtonLayout, ControlSurfaceState, DeviceMapping, StateDelta, SurfaceMessage};

/// Owns the surface snapshot and the mapping chosen for this session.
pub struct ControlSurfaceDecoder {
    layout: ButtonLayout,
    mapping: Box<dyn DeviceMapping>,
    state: ControlSurfaceState,
}

impl ControlSurfaceDecoder {
    pub fn new(layout: ButtonLayout) -> Self {
        Self {
            layout,
            mapping: layout.mapping(),
            state: ControlSurfaceState::default(),
        }
    }

    pub fn layout(&self) -> ButtonLayout {
        self.layout
    }

    pub fn state(&self) -> &ControlSurfaceState {
        &self.state
    }

    /// Decodes one raw message and applies it. Unsupported or unmapped input
    /// leaves the state untouched and yields `None`.
    pub fn handle_message(&mut self, raw: &[u8]) -> Option<StateDelta> {
        let message = SurfaceMessage::from_bytes(raw)?;
        let delta = self.mapping.decode(&message)?;
        self.state.apply(delta);
        tracing::trace!(?delta, "surface state updated");
        Some(delta)
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.state.connected = connected;
    }

    /// Replaces the snapshot with a fresh one carrying the given connection flag.
    pub fn reset(&mut self, connected: bool) {
        self.state = ControlSurfaceState::with_connection(connected);
    }
}

impl fmt::Debug for ControlSurfaceDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSurfaceDecoder")
            .field("layout", &self.mapping.name())
            .field("state", &self.state)
            .finish()
    }
}

use serde::{Deserialize, Serialize};

use crate::edge::Edge;

/// Number of channel strips on the surface.
pub const CHANNEL_COUNT: usize = 8;

/// Momentary and latched state of a single button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonState {
    pub pressed: bool,
    pub latched: bool,
}

impl ButtonState {
    /// Updates the momentary level. `latched` flips only on a rising edge.
    pub fn set_pressed(&mut self, pressed: bool) -> Edge {
        let edge = Edge::between(self.pressed, pressed);
        if edge.is_rising() {
            self.latched = !self.latched;
        }
        self.pressed = pressed;
        edge
    }
}

/// Row of buttons on a channel strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonCategory {
    /// "S" (solo/select) row.
    Primary,
    Mute,
    Record,
}

impl ButtonCategory {
    pub const ALL: [ButtonCategory; 3] = [
        ButtonCategory::Primary,
        ButtonCategory::Mute,
        ButtonCategory::Record,
    ];
}

/// The three buttons of one channel strip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelButtons {
    pub primary: ButtonState,
    pub mute: ButtonState,
    pub record: ButtonState,
}

impl ChannelButtons {
    pub fn get(&self, category: ButtonCategory) -> &ButtonState {
        match category {
            ButtonCategory::Primary => &self.primary,
            ButtonCategory::Mute => &self.mute,
            ButtonCategory::Record => &self.record,
        }
    }

    pub fn get_mut(&mut self, category: ButtonCategory) -> &mut ButtonState {
        match category {
            ButtonCategory::Primary => &mut self.primary,
            ButtonCategory::Mute => &mut self.mute,
            ButtonCategory::Record => &mut self.record,
        }
    }
}

/// Named transport section buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportControl {
    MarkerSet,
    MarkerLeft,
    MarkerRight,
    Cycle,
    TrackLeft,
    TrackRight,
    Stop,
    Play,
    Record,
    Forward,
    Rewind,
}

impl TransportControl {
    pub const COUNT: usize = 11;

    pub const ALL: [TransportControl; Self::COUNT] = [
        TransportControl::MarkerSet,
        TransportControl::MarkerLeft,
        TransportControl::MarkerRight,
        TransportControl::Cycle,
        TransportControl::TrackLeft,
        TransportControl::TrackRight,
        TransportControl::Stop,
        TransportControl::Play,
        TransportControl::Record,
        TransportControl::Forward,
        TransportControl::Rewind,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// A single state change produced by decoding one message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateDelta {
    Fader { index: usize, value: f32 },
    Knob { index: usize, value: f32 },
    Button {
        slot: usize,
        category: ButtonCategory,
        pressed: bool,
    },
    Transport {
        control: TransportControl,
        pressed: bool,
    },
}

/// Normalised snapshot of every control on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSurfaceState {
    pub faders: [f32; CHANNEL_COUNT],
    pub knobs: [f32; CHANNEL_COUNT],
    pub buttons: [ChannelButtons; CHANNEL_COUNT],
    transport: [ButtonState; TransportControl::COUNT],
    pub connected: bool,
}

impl Default for ControlSurfaceState {
    fn default() -> Self {
        Self {
            faders: [0.0; CHANNEL_COUNT],
            knobs: [0.0; CHANNEL_COUNT],
            buttons: [ChannelButtons::default(); CHANNEL_COUNT],
            transport: [ButtonState::default(); TransportControl::COUNT],
            connected: false,
        }
    }
}

impl ControlSurfaceState {
    /// An all-zero snapshot with the given connection flag.
    pub fn with_connection(connected: bool) -> Self {
        Self {
            connected,
            ..Self::default()
        }
    }

    pub fn transport(&self, control: TransportControl) -> &ButtonState {
        &self.transport[control.index()]
    }

    pub fn transport_mut(&mut self, control: TransportControl) -> &mut ButtonState {
        &mut self.transport[control.index()]
    }

    pub fn button(&self, slot: usize, category: ButtonCategory) -> Option<&ButtonState> {
        self.buttons.get(slot).map(|strip| strip.get(category))
    }

    /// Applies a decoded change. Out-of-range indices are ignored.
    pub fn apply(&mut self, delta: StateDelta) {
        match delta {
            StateDelta::Fader { index, value } => {
                if let Some(slot) = self.faders.get_mut(index) {
                    *slot = value.clamp(0.0, 1.0);
                }
            }
            StateDelta::Knob { index, value } => {
                if let Some(slot) = self.knobs.get_mut(index) {
                    *slot = value.clamp(0.0, 1.0);
                }
            }
            StateDelta::Button {
                slot,
                category,
                pressed,
            } => {
                if let Some(strip) = self.buttons.get_mut(slot) {
                    strip.get_mut(category).set_pressed(pressed);
                }
            }
            StateDelta::Transport { control, pressed } => {
                self.transport_mut(control).set_pressed(pressed);
            }
        }
    }
}

/// Normalises a 7-bit controller value into [0, 1].
pub fn normalize(value: u8) -> f32 {
    f32::from(value.min(127)) / 127.0
}

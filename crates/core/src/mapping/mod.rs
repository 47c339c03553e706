use serde::{Deserialize, Serialize};

use crate::surface::{ButtonCategory, ControlSurfaceState, TransportControl};

/// Semantic parameters that drive the animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Multiplier applied to the grid layout around the centre.
    pub scale: f32,
    /// Share of the current set's rows on screen: one row at 0, all at 1.
    pub row_fraction: f32,
    /// Weight of the per-glyph random displacement.
    pub offset: f32,
    /// Amplitude of the sinusoidal vertical wobble.
    pub wave: f32,
    /// Upper bound of the random rotation, as a fraction of a full turn.
    pub rotation: f32,
    /// Typing speed in [0, 1].
    pub speed: f32,
    pub text_scale: f32,
    /// Scalar fed through the noise function to seed the layout.
    pub seed: f32,
    pub background_box: bool,
    pub inverted: bool,
}

impl ParameterSet {
    /// Parameters used whenever the surface is not connected.
    pub const DEFAULT: ParameterSet = ParameterSet {
        scale: 1.0,
        row_fraction: 1.0,
        offset: 0.0,
        wave: 0.3,
        rotation: 0.0,
        speed: 0.5,
        text_scale: 1.0,
        seed: 0.5,
        background_box: false,
        inverted: false,
    };

    pub fn set(&mut self, parameter: Parameter, value: f32) {
        match parameter {
            Parameter::Scale => self.scale = value,
            Parameter::RowFraction => self.row_fraction = value,
            Parameter::Offset => self.offset = value,
            Parameter::Wave => self.wave = value,
            Parameter::Rotation => self.rotation = value,
            Parameter::Speed => self.speed = value,
            Parameter::TextScale => self.text_scale = value,
            Parameter::Seed => self.seed = value,
            Parameter::BackgroundBox => self.background_box = value >= 0.5,
            Parameter::Inverted => self.inverted = value >= 0.5,
        }
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Scale,
    RowFraction,
    Offset,
    Wave,
    Rotation,
    Speed,
    TextScale,
    Seed,
    BackgroundBox,
    Inverted,
}

/// Physical control feeding a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlSource {
    Fader { index: usize },
    Knob { index: usize },
    /// Latched state of a channel strip button.
    Toggle {
        slot: usize,
        category: ButtonCategory,
    },
    /// Latched state of a transport button.
    TransportToggle { control: TransportControl },
}

impl ControlSource {
    /// Reads the normalised value of the control, 0 for out-of-range indices.
    pub fn read(&self, state: &ControlSurfaceState) -> f32 {
        match *self {
            ControlSource::Fader { index } => state.faders.get(index).copied().unwrap_or(0.0),
            ControlSource::Knob { index } => state.knobs.get(index).copied().unwrap_or(0.0),
            ControlSource::Toggle { slot, category } => state
                .button(slot, category)
                .map(|button| f32::from(u8::from(button.latched)))
                .unwrap_or(0.0),
            ControlSource::TransportToggle { control } => {
                f32::from(u8::from(state.transport(control).latched))
            }
        }
    }
}

/// Routes one control to one parameter through a linear remap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBinding {
    pub parameter: Parameter,
    pub source: ControlSource,
    /// Output at control value 0.
    pub from: f32,
    /// Output at control value 1.
    pub to: f32,
}

impl ParameterBinding {
    pub const fn new(parameter: Parameter, source: ControlSource, from: f32, to: f32) -> Self {
        Self {
            parameter,
            source,
            from,
            to,
        }
    }

    pub fn evaluate(&self, state: &ControlSurfaceState) -> f32 {
        remap(self.source.read(state), 0.0, 1.0, self.from, self.to)
    }
}

/// Named mapping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingProfile {
    pub name: String,
    pub bindings: Vec<ParameterBinding>,
}

const fn fader(index: usize) -> ControlSource {
    ControlSource::Fader { index }
}

const fn toggle(slot: usize, category: ButtonCategory) -> ControlSource {
    ControlSource::Toggle { slot, category }
}

impl MappingProfile {
    /// Seven faders and two toggles: no text scale control, direct scale.
    pub fn classic() -> Self {
        Self {
            name: "classic".to_string(),
            bindings: vec![
                ParameterBinding::new(Parameter::Scale, fader(0), 0.0, 1.0),
                ParameterBinding::new(Parameter::RowFraction, fader(1), 0.0, 1.0),
                ParameterBinding::new(Parameter::Offset, fader(2), 0.0, 1.0),
                ParameterBinding::new(Parameter::Wave, fader(3), 0.0, 1.0),
                ParameterBinding::new(Parameter::Rotation, fader(4), 0.0, 1.0),
                ParameterBinding::new(Parameter::Speed, fader(5), 0.0, 1.0),
                ParameterBinding::new(Parameter::Seed, fader(6), 0.0, 1.0),
                ParameterBinding::new(
                    Parameter::BackgroundBox,
                    toggle(0, ButtonCategory::Mute),
                    0.0,
                    1.0,
                ),
                ParameterBinding::new(
                    Parameter::Inverted,
                    toggle(0, ButtonCategory::Record),
                    0.0,
                    1.0,
                ),
            ],
        }
    }

    /// Adds a text scale fader, shifting speed and seed one fader right; the
    /// scale fader runs inverted.
    pub fn extended() -> Self {
        Self {
            name: "extended".to_string(),
            bindings: vec![
                ParameterBinding::new(Parameter::Scale, fader(0), 1.0, 0.0),
                ParameterBinding::new(Parameter::RowFraction, fader(1), 0.0, 1.0),
                ParameterBinding::new(Parameter::Offset, fader(2), 0.0, 1.0),
                ParameterBinding::new(Parameter::Wave, fader(3), 0.0, 1.0),
                ParameterBinding::new(Parameter::Rotation, fader(4), 0.0, 1.0),
                ParameterBinding::new(Parameter::TextScale, fader(5), 0.6, 2.0),
                ParameterBinding::new(Parameter::Speed, fader(6), 0.0, 1.0),
                ParameterBinding::new(Parameter::Seed, fader(7), 0.0, 1.0),
                ParameterBinding::new(
                    Parameter::BackgroundBox,
                    toggle(0, ButtonCategory::Mute),
                    0.0,
                    1.0,
                ),
                ParameterBinding::new(
                    Parameter::Inverted,
                    toggle(0, ButtonCategory::Record),
                    0.0,
                    1.0,
                ),
            ],
        }
    }
}

/// Produces the parameters for the current frame.
///
/// A disconnected surface yields [`ParameterSet::DEFAULT`] without looking at
/// the (possibly stale) control values.
pub fn derive_parameters(
    state: &ControlSurfaceState,
    connected: bool,
    profile: &MappingProfile,
) -> ParameterSet {
    let mut parameters = ParameterSet::DEFAULT;
    if !connected {
        return parameters;
    }

    for binding in &profile.bindings {
        parameters.set(binding.parameter, binding.evaluate(state));
    }
    parameters
}

/// Linear remap of `value` from `[in_min, in_max]` to `[out_min, out_max]`.
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span.abs() <= f32::EPSILON {
        return out_min;
    }
    out_min + (value - in_min) / span * (out_max - out_min)
}

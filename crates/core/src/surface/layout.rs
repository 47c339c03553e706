use serde::{Deserialize, Serialize};

use super::{normalize, ButtonCategory, StateDelta, SurfaceMessage, TransportControl, CHANNEL_COUNT};

const FADER_CC_START: u8 = 0;
const KNOB_CC_START: u8 = 16;

/// Translates decoded messages into state changes for one firmware variant.
pub trait DeviceMapping: Send + Sync {
    /// Human readable layout name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `None` for anything the layout does not map.
    fn decode(&self, message: &SurfaceMessage) -> Option<StateDelta>;
}

/// Which button encoding the connected firmware uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonLayout {
    /// Buttons send Note On / Note Off.
    #[default]
    Note,
    /// Buttons send Control Change, value > 0 meaning pressed.
    Cc,
}

impl ButtonLayout {
    pub fn mapping(self) -> Box<dyn DeviceMapping> {
        match self {
            ButtonLayout::Note => Box::new(NoteLayout),
            ButtonLayout::Cc => Box::new(CcLayout),
        }
    }
}

/// Faders and knobs share the same CC ranges in every layout.
fn decode_continuous(controller: u8, value: u8) -> Option<StateDelta> {
    let channels = CHANNEL_COUNT as u8;
    if (FADER_CC_START..FADER_CC_START + channels).contains(&controller) {
        Some(StateDelta::Fader {
            index: usize::from(controller - FADER_CC_START),
            value: normalize(value),
        })
    } else if (KNOB_CC_START..KNOB_CC_START + channels).contains(&controller) {
        Some(StateDelta::Knob {
            index: usize::from(controller - KNOB_CC_START),
            value: normalize(value),
        })
    } else {
        None
    }
}

/// Looks `number` up in a table of consecutive button rows and transport keys.
fn decode_button(
    rows: &[(ButtonCategory, u8)],
    transport: &[(TransportControl, u8)],
    number: u8,
    pressed: bool,
) -> Option<StateDelta> {
    for &(category, start) in rows {
        if number >= start && usize::from(number - start) < CHANNEL_COUNT {
            return Some(StateDelta::Button {
                slot: usize::from(number - start),
                category,
                pressed,
            });
        }
    }

    transport
        .iter()
        .find(|(_, mapped)| *mapped == number)
        .map(|&(control, _)| StateDelta::Transport { control, pressed })
}

const NOTE_ROWS: [(ButtonCategory, u8); 3] = [
    (ButtonCategory::Primary, 46),
    (ButtonCategory::Mute, 32),
    (ButtonCategory::Record, 64),
];

const NOTE_TRANSPORT: [(TransportControl, u8); 8] = [
    (TransportControl::MarkerLeft, 60),
    (TransportControl::MarkerRight, 61),
    (TransportControl::Cycle, 54),
    (TransportControl::TrackLeft, 58),
    (TransportControl::TrackRight, 59),
    (TransportControl::Stop, 43),
    (TransportControl::Play, 44),
    (TransportControl::Record, 45),
];

/// Firmware variant whose buttons send notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteLayout;

impl DeviceMapping for NoteLayout {
    fn name(&self) -> &'static str {
        "note"
    }

    fn decode(&self, message: &SurfaceMessage) -> Option<StateDelta> {
        match *message {
            SurfaceMessage::ControlChange {
                controller, value, ..
            } => decode_continuous(controller, value),
            SurfaceMessage::NoteOn { note, .. } => {
                decode_button(&NOTE_ROWS, &NOTE_TRANSPORT, note, true)
            }
            SurfaceMessage::NoteOff { note, .. } => {
                decode_button(&NOTE_ROWS, &NOTE_TRANSPORT, note, false)
            }
        }
    }
}

const CC_ROWS: [(ButtonCategory, u8); 3] = [
    (ButtonCategory::Primary, 32),
    (ButtonCategory::Mute, 48),
    (ButtonCategory::Record, 64),
];

const CC_TRANSPORT: [(TransportControl, u8); 11] = [
    (TransportControl::MarkerSet, 60),
    (TransportControl::MarkerLeft, 61),
    (TransportControl::MarkerRight, 62),
    (TransportControl::Cycle, 46),
    (TransportControl::TrackLeft, 58),
    (TransportControl::TrackRight, 59),
    (TransportControl::Stop, 42),
    (TransportControl::Play, 41),
    (TransportControl::Record, 45),
    (TransportControl::Forward, 44),
    (TransportControl::Rewind, 43),
];

/// Firmware variant whose buttons send control changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CcLayout;

impl DeviceMapping for CcLayout {
    fn name(&self) -> &'static str {
        "cc"
    }

    fn decode(&self, message: &SurfaceMessage) -> Option<StateDelta> {
        match *message {
            SurfaceMessage::ControlChange {
                controller, value, ..
            } => decode_continuous(controller, value)
                .or_else(|| decode_button(&CC_ROWS, &CC_TRANSPORT, controller, value > 0)),
            SurfaceMessage::NoteOn { .. } | SurfaceMessage::NoteOff { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(controller: u8, value: u8) -> SurfaceMessage {
        SurfaceMessage::ControlChange {
            channel: 0,
            controller,
            value,
        }
    }

    fn note_on(note: u8) -> SurfaceMessage {
        SurfaceMessage::NoteOn {
            channel: 0,
            note,
            velocity: 127,
        }
    }

    #[test]
    fn faders_and_knobs_match_in_both_layouts() {
        for layout in [ButtonLayout::Note, ButtonLayout::Cc] {
            let mapping = layout.mapping();
            assert_eq!(
                mapping.decode(&cc(7, 127)),
                Some(StateDelta::Fader {
                    index: 7,
                    value: 1.0
                })
            );
            assert_eq!(
                mapping.decode(&cc(16, 0)),
                Some(StateDelta::Knob {
                    index: 0,
                    value: 0.0
                })
            );
            assert_eq!(
                mapping.decode(&cc(23, 127)),
                Some(StateDelta::Knob {
                    index: 7,
                    value: 1.0
                })
            );
        }
    }

    #[test]
    fn note_layout_maps_button_rows() {
        let mapping = NoteLayout;
        assert_eq!(
            mapping.decode(&note_on(46)),
            Some(StateDelta::Button {
                slot: 0,
                category: ButtonCategory::Primary,
                pressed: true
            })
        );
        assert_eq!(
            mapping.decode(&note_on(39)),
            Some(StateDelta::Button {
                slot: 7,
                category: ButtonCategory::Mute,
                pressed: true
            })
        );
        assert_eq!(
            mapping.decode(&SurfaceMessage::NoteOff {
                channel: 0,
                note: 45
            }),
            Some(StateDelta::Transport {
                control: TransportControl::Record,
                pressed: false
            })
        );
    }

    #[test]
    fn cc_layout_maps_buttons_by_value() {
        let mapping = CcLayout;
        assert_eq!(
            mapping.decode(&cc(55, 127)),
            Some(StateDelta::Button {
                slot: 7,
                category: ButtonCategory::Mute,
                pressed: true
            })
        );
        assert_eq!(
            mapping.decode(&cc(42, 0)),
            Some(StateDelta::Transport {
                control: TransportControl::Stop,
                pressed: false
            })
        );
        assert_eq!(
            mapping.decode(&cc(43, 1)),
            Some(StateDelta::Transport {
                control: TransportControl::Rewind,
                pressed: true
            })
        );
    }

    #[test]
    fn unmapped_numbers_are_ignored() {
        assert_eq!(NoteLayout.decode(&cc(40, 127)), None);
        assert_eq!(NoteLayout.decode(&note_on(100)), None);
        assert_eq!(NoteLayout.decode(&note_on(62)), None);
        assert_eq!(CcLayout.decode(&cc(100, 127)), None);
        assert_eq!(CcLayout.decode(&note_on(46)), None);
    }
}

use serde::{Deserialize, Serialize};

/// Channel messages understood by the control surface decoder.
///
/// Only the subset a control surface actually emits is modelled; every other
/// status byte is dropped by [`SurfaceMessage::from_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl SurfaceMessage {
    /// Parses a raw message. Returns `None` for short input or any status
    /// other than Note On, Note Off and Control Change.
    ///
    /// A Note On with velocity 0 is read as a Note Off, per the MIDI
    /// running-status convention, rather than as a press.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }

        let status = bytes[0];
        let channel = status & 0x0F;
        // Data bytes are 7-bit; the top bit only appears on malformed input.
        let data1 = bytes[1] & 0x7F;
        let data2 = bytes[2] & 0x7F;

        match status & 0xF0 {
            0x90 if data2 == 0 => Some(SurfaceMessage::NoteOff {
                channel,
                note: data1,
            }),
            0x90 => Some(SurfaceMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            }),
            0x80 => Some(SurfaceMessage::NoteOff {
                channel,
                note: data1,
            }),
            0xB0 => Some(SurfaceMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            SurfaceMessage::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note, velocity],
            SurfaceMessage::NoteOff { channel, note } => [0x80 | (channel & 0x0F), note, 0],
            SurfaceMessage::ControlChange {
                channel,
                controller,
                value,
            } => [0xB0 | (channel & 0x0F), controller, value],
        }
    }
}

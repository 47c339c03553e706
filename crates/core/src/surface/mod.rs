//! Control surface decoding.
//!
//! Raw three-byte messages from the hardware are parsed into
//! [`SurfaceMessage`]s, translated by the active [`DeviceMapping`] into a
//! [`StateDelta`] and folded into the [`ControlSurfaceState`] snapshot.

mod decoder;
mod device;
mod layout;
mod message;
mod state;

pub use decoder::ControlSurfaceDecoder;
pub use device::{ControlSurface, SurfaceHandle};
pub use layout::{ButtonLayout, CcLayout, DeviceMapping, NoteLayout};
pub use message::SurfaceMessage;
pub use state::{
    normalize, ButtonCategory, ButtonState, ChannelButtons, ControlSurfaceState, StateDelta,
    TransportControl, CHANNEL_COUNT,
};

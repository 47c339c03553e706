//! Core library for the Flow Text installation.
//!
//! A MIDI control surface drives a generative kinetic-typography animation.
//! Raw device messages are decoded into a [`ControlSurfaceState`], mapped to
//! a [`ParameterSet`] each frame, and fed to the [`Animator`], which types,
//! holds, drops and replaces text sets. A designated button captures the
//! current parameters for submission elsewhere.

pub mod animation;
pub mod capture;
pub mod config;
pub mod edge;
pub mod error;
pub mod library;
pub mod mapping;
pub mod record;
pub mod render;
pub mod stage;
pub mod surface;
pub mod timeline;

pub use animation::{Animator, FrameOutput, GlyphPose, Phase, PhaseTiming, Stimulus, Viewport};
pub use capture::{CaptureEvent, CaptureMetadata, CaptureQueue, CaptureTrigger, PendingCapture};
pub use config::{AppConfig, CaptureConfig, ProfileKind, SurfaceConfig};
pub use error::{FlowTextError, Result};
pub use library::{TextLibrary, TextSet};
pub use mapping::{derive_parameters, MappingProfile, ParameterSet};
pub use record::{ArtSubmission, CaptureRecorder, RecordingSettings};
pub use render::{GlyphRenderer, TraceRenderer};
pub use stage::{Stage, TransportBindings};
pub use surface::{
    ButtonLayout, ControlSurface, ControlSurfaceDecoder, ControlSurfaceState, SurfaceHandle,
    TransportControl,
};
pub use timeline::{FrameClock, FramePacer};

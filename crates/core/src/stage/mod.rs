//! Per-frame orchestration of surface state, parameters and animation.

use crate::animation::{Animator, FrameOutput, Stimulus};
use crate::capture::{CaptureMetadata, CaptureQueue, CaptureTrigger};
use crate::edge::EdgeBank;
use crate::mapping::{derive_parameters, MappingProfile, ParameterSet};
use crate::surface::{ControlSurfaceState, TransportControl};
use crate::Result;

/// Transport controls that drive the animator, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportBindings {
    /// Issues a restart on every frame it is held.
    pub restart: TransportControl,
    /// Rising edge moves to the previous text set.
    pub previous: TransportControl,
    /// Rising edge moves to the next text set.
    pub next: TransportControl,
    /// Rising edge emits a capture.
    pub capture: TransportControl,
}

impl Default for TransportBindings {
    fn default() -> Self {
        Self {
            restart: TransportControl::Stop,
            previous: TransportControl::TrackLeft,
            next: TransportControl::TrackRight,
            capture: TransportControl::Record,
        }
    }
}

#[derive(Debug)]
pub struct Stage {
    animator: Animator,
    profile: MappingProfile,
    bindings: TransportBindings,
    edges: EdgeBank<TransportControl>,
    capture: CaptureTrigger,
    last_parameters: ParameterSet,
}

impl Stage {
    pub fn new(
        animator: Animator,
        profile: MappingProfile,
        bindings: TransportBindings,
    ) -> (Self, CaptureQueue) {
        let (capture, queue) = CaptureTrigger::new();
        (
            Self {
                animator,
                profile,
                bindings,
                edges: EdgeBank::new(),
                capture,
                last_parameters: ParameterSet::DEFAULT,
            },
            queue,
        )
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn profile(&self) -> &MappingProfile {
        &self.profile
    }

    /// Parameters used by the most recent step.
    pub fn parameters(&self) -> &ParameterSet {
        &self.last_parameters
    }

    /// Runs one frame against a consistent surface snapshot.
    pub fn step(&mut self, frame: u64, state: &ControlSurfaceState) -> FrameOutput {
        let connected = state.connected;
        let parameters = derive_parameters(state, connected, &self.profile);

        if connected {
            self.forward_transport(state);
        } else {
            self.edges.clear();
        }

        let pressed = connected && state.transport(self.bindings.capture).pressed;
        let animator = &self.animator;
        self.capture.observe(pressed, frame, &parameters, || {
            let set = animator.current_set();
            CaptureMetadata {
                title: set.title.clone(),
                author: set.author.clone(),
                text_set_index: animator.text_set_index(),
            }
        });

        self.last_parameters = parameters;
        self.animator.tick(frame, &parameters)
    }

    /// Like [`Stage::step`], but treats an unreadable snapshot as a
    /// disconnected surface.
    pub fn step_snapshot(
        &mut self,
        frame: u64,
        snapshot: Result<ControlSurfaceState>,
    ) -> FrameOutput {
        match snapshot {
            Ok(state) => self.step(frame, &state),
            Err(err) => {
                tracing::warn!(frame, %err, "surface snapshot unavailable, using defaults");
                self.step(frame, &ControlSurfaceState::default())
            }
        }
    }

    fn forward_transport(&mut self, state: &ControlSurfaceState) {
        let TransportBindings {
            restart,
            previous,
            next,
            ..
        } = self.bindings;

        if state.transport(restart).pressed {
            self.animator.request(Stimulus::Restart);
        }
        if self
            .edges
            .update(previous, state.transport(previous).pressed)
            .is_rising()
        {
            self.animator.request(Stimulus::Previous);
        }
        if self
            .edges
            .update(next, state.transport(next).pressed)
            .is_rising()
        {
            self.animator.request(Stimulus::Next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Phase, PhaseTiming, Viewport};
    use crate::library::{TextLibrary, TextSet};
    use crate::FlowTextError;

    fn stage() -> (Stage, CaptureQueue) {
        let library = TextLibrary::new(vec![
            TextSet::new("one", "a", vec!["abc".into()]),
            TextSet::new("two", "b", vec!["de".into()]),
            TextSet::new("three", "c", vec!["fghi".into()]),
        ])
        .unwrap();
        let animator =
            Animator::new(library, PhaseTiming::classic(), Viewport::default()).unwrap();
        Stage::new(animator, MappingProfile::classic(), TransportBindings::default())
    }

    fn connected() -> ControlSurfaceState {
        ControlSurfaceState::with_connection(true)
    }

    #[test]
    fn track_buttons_move_once_per_press() {
        let (mut stage, _queue) = stage();
        let mut state = connected();
        assert_eq!(stage.profile().name, "classic");

        state.transport_mut(TransportControl::TrackRight).pressed = true;
        for frame in 1..=10 {
            stage.step(frame, &state);
        }
        assert_eq!(stage.animator().text_set_index(), 1);

        state.transport_mut(TransportControl::TrackRight).pressed = false;
        stage.step(11, &state);
        state.transport_mut(TransportControl::TrackLeft).pressed = true;
        stage.step(12, &state);
        stage.step(13, &state);
        assert_eq!(stage.animator().text_set_index(), 0);
    }

    #[test]
    fn held_stop_keeps_typing_from_scratch() {
        let (mut stage, _queue) = stage();
        let mut state = connected();
        state.faders[5] = 1.0;
        state.transport_mut(TransportControl::Stop).pressed = true;

        for frame in 1..=200 {
            let output = stage.step(frame, &state);
            assert_eq!(output.phase, Phase::Typing);
            assert!(output.glyphs.len() <= 1);
        }
        assert_eq!(stage.animator().text_set_index(), 0);
    }

    #[test]
    fn disconnected_surface_ignores_controls() {
        let (mut stage, queue) = stage();
        let mut state = ControlSurfaceState::default();
        state.faders[0] = 0.1;
        state.transport_mut(TransportControl::TrackRight).pressed = true;
        state.transport_mut(TransportControl::Record).pressed = true;

        for frame in 1..=5 {
            stage.step(frame, &state);
        }
        assert_eq!(stage.animator().text_set_index(), 0);
        assert_eq!(*stage.parameters(), ParameterSet::DEFAULT);
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn record_press_captures_current_set() {
        let (mut stage, queue) = stage();
        let mut state = connected();
        state.faders[3] = 0.25;
        state.transport_mut(TransportControl::Record).pressed = true;

        for frame in 1..=30 {
            stage.step(frame, &state);
        }
        let pending = queue.try_next().unwrap();
        assert!(queue.try_next().is_none());
        assert_eq!(pending.event.metadata.title, "one");
        assert_eq!(pending.event.frame, 1);
        assert!((pending.event.parameters.wave - 0.25).abs() < 1e-6);
    }

    #[test]
    fn failed_snapshot_falls_back_to_defaults() {
        let (mut stage, _queue) = stage();
        let output = stage.step_snapshot(1, Err(FlowTextError::msg("lock poisoned")));
        assert_eq!(output.frame, 1);
        assert_eq!(*stage.parameters(), ParameterSet::DEFAULT);
    }
}

//! Frame-driven text animation.
//!
//! [`Animator`] cycles every text set through four phases. Glyphs are typed
//! in one by one, held on screen, dropped under gravity and, after a short
//! pause, replaced by the next set.

mod glyph;
mod noise;

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use glyph::{Glyph, GlyphPose, Viewport};
pub use noise::{layout_seed, noise};

use crate::library::{TextLibrary, TextSet};
use crate::mapping::{remap, ParameterSet};
use crate::{FlowTextError, Result};

/// Phase of the wobble advanced per frame, in radians.
const WOBBLE_RATE: f64 = 0.02;
/// Noise frequency of the typing jitter, per frame.
const JITTER_FREQUENCY: f32 = 0.05;
/// Mixed into the layout seed so fall velocities differ from layout draws.
const FALL_SALT: u64 = 0x5EED_FA11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Typing,
    Waiting,
    Falling,
    Restarting,
}

impl Phase {
    /// The phase that naturally follows this one.
    pub fn successor(self) -> Phase {
        match self {
            Phase::Typing => Phase::Waiting,
            Phase::Waiting => Phase::Falling,
            Phase::Falling => Phase::Restarting,
            Phase::Restarting => Phase::Typing,
        }
    }
}

/// External requests that force the animation back to typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stimulus {
    /// Start the current text set over.
    Restart,
    Next,
    Previous,
    Jump(usize),
}

/// Durations and physics constants of one animator variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    /// Frames to hold the fully typed text before it falls.
    pub waiting_frames: u64,
    /// Frames between the last glyph leaving and the next set starting.
    pub restart_frames: u64,
    /// Added to each glyph's vertical velocity every falling frame.
    pub gravity: f32,
    /// Glyphs revealed per frame at full speed.
    pub max_reveal_rate: f32,
    /// Amplitude of the noise jitter added to the typing rate.
    pub reveal_jitter: f32,
    /// Forces a move to the next set every N frames when set.
    pub advance_every: Option<u64>,
}

impl PhaseTiming {
    pub fn classic() -> Self {
        Self {
            waiting_frames: 180,
            restart_frames: 60,
            gravity: 0.35,
            max_reveal_rate: 0.2,
            reveal_jitter: 0.02,
            advance_every: None,
        }
    }

    pub fn extended() -> Self {
        Self {
            waiting_frames: 120,
            restart_frames: 90,
            gravity: 0.5,
            max_reveal_rate: 0.2,
            reveal_jitter: 0.02,
            advance_every: Some(3_600),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(FlowTextError::InvalidConfig(
                "gravity must be a positive number".into(),
            ));
        }
        if !(self.max_reveal_rate.is_finite() && self.max_reveal_rate >= 0.0) {
            return Err(FlowTextError::InvalidConfig(
                "max_reveal_rate must not be negative".into(),
            ));
        }
        if self.advance_every == Some(0) {
            return Err(FlowTextError::InvalidConfig(
                "advance_every must be at least one frame".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub frame: u64,
    pub phase: Phase,
    pub text_set_index: usize,
    /// Glyph edge length in pixels.
    pub glyph_size: f32,
    pub background_box: bool,
    pub inverted: bool,
    /// Visible glyphs only, in reveal order.
    pub glyphs: Vec<GlyphPose>,
}

/// Owns all animation state and advances it once per frame.
#[derive(Debug)]
pub struct Animator {
    library: TextLibrary,
    timing: PhaseTiming,
    viewport: Viewport,
    phase: Phase,
    text_set_index: usize,
    glyphs: Vec<Glyph>,
    progress: f32,
    char_size: f32,
    /// Leading rows of the current set taking part in the animation.
    active_rows: usize,
    frame: u64,
    phase_entered_at: u64,
    reset_this_tick: bool,
    pending: Vec<Stimulus>,
}

impl Animator {
    pub fn new(library: TextLibrary, timing: PhaseTiming, viewport: Viewport) -> Result<Self> {
        timing.validate()?;
        if !viewport.is_valid() {
            return Err(FlowTextError::InvalidInput(
                "viewport dimensions must be positive",
            ));
        }

        let mut animator = Self {
            library,
            timing,
            viewport,
            phase: Phase::Typing,
            text_set_index: 0,
            glyphs: Vec::new(),
            progress: 0.0,
            char_size: 0.0,
            active_rows: 1,
            frame: 0,
            phase_entered_at: 0,
            reset_this_tick: false,
            pending: Vec::new(),
        };
        animator.rebuild();
        Ok(animator)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn text_set_index(&self) -> usize {
        self.text_set_index
    }

    pub fn current_set(&self) -> &TextSet {
        self.library.get(self.text_set_index)
    }

    pub fn library(&self) -> &TextLibrary {
        &self.library
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn timing(&self) -> &PhaseTiming {
        &self.timing
    }

    /// Frame number of the most recent tick.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of leading rows laid out by the most recent typing or waiting
    /// tick.
    pub fn active_rows(&self) -> usize {
        self.active_rows
    }

    /// Lowest y a glyph must pass before the fall is over.
    pub fn bottom_bound(&self) -> f32 {
        self.viewport.height / 2.0 + self.char_size * 2.0
    }

    /// Changes the drawing surface and recomputes sizing for the current set.
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        if !viewport.is_valid() {
            return Err(FlowTextError::InvalidInput(
                "viewport dimensions must be positive",
            ));
        }
        self.viewport = viewport;
        self.update_sizing();
        Ok(())
    }

    /// Queues a stimulus; it is applied at the start of the next tick.
    pub fn request(&mut self, stimulus: Stimulus) {
        self.pending.push(stimulus);
    }

    /// Schedules a jump to `to_index` (wrapped) for the next tick.
    ///
    /// At most one reset takes effect per tick and queued requests are served
    /// first, so this returns `false` when another reset is already waiting.
    pub fn reset(&mut self, to_index: usize) -> bool {
        if !self.pending.is_empty() {
            tracing::debug!(frame = self.frame, to_index, "reset already pending");
            return false;
        }
        self.request(Stimulus::Jump(to_index));
        true
    }

    /// Advances the animation to `frame` using the given parameters.
    pub fn tick(&mut self, frame: u64, parameters: &ParameterSet) -> FrameOutput {
        self.frame = frame;
        self.reset_this_tick = false;

        for stimulus in std::mem::take(&mut self.pending) {
            self.apply(stimulus);
        }

        if let Some(every) = self.timing.advance_every {
            if frame > 0 && frame % every == 0 {
                self.restart_at(self.library.next(self.text_set_index));
            }
        }

        let seed = layout_seed(parameters.seed);
        match self.phase {
            Phase::Typing => {
                self.layout(seed, parameters);
                self.advance_progress(parameters);
                if self.progress >= self.active_glyph_count() as f32 {
                    self.enter(Phase::Waiting);
                }
            }
            Phase::Waiting => {
                self.layout(seed, parameters);
                if self.elapsed() > self.timing.waiting_frames {
                    self.enter(Phase::Falling);
                    self.launch(seed);
                }
            }
            Phase::Falling => {
                self.integrate();
                let bottom = self.bottom_bound();
                if self
                    .glyphs
                    .iter()
                    .filter(|glyph| glyph.visible)
                    .all(|glyph| glyph.position.y > bottom)
                {
                    self.enter(Phase::Restarting);
                }
            }
            Phase::Restarting => {
                if self.elapsed() > self.timing.restart_frames {
                    self.restart_at(self.library.next(self.text_set_index));
                }
            }
        }

        self.output(parameters)
    }

    fn apply(&mut self, stimulus: Stimulus) {
        let target = match stimulus {
            Stimulus::Restart => self.text_set_index,
            Stimulus::Next => self.library.next(self.text_set_index),
            Stimulus::Previous => self.library.previous(self.text_set_index),
            Stimulus::Jump(index) => index,
        };
        self.restart_at(target);
    }

    /// Jumps to `to_index` and starts typing it from scratch. Only the first
    /// call within a tick has any effect.
    fn restart_at(&mut self, to_index: usize) -> bool {
        if self.reset_this_tick {
            tracing::debug!(frame = self.frame, to_index, "reset already applied this tick");
            return false;
        }
        self.reset_this_tick = true;
        self.text_set_index = to_index % self.library.len();
        self.rebuild();
        self.enter(Phase::Typing);
        tracing::debug!(
            frame = self.frame,
            index = self.text_set_index,
            title = %self.current_set().title,
            "animation reset"
        );
        true
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(frame = self.frame, from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        self.phase_entered_at = self.frame;

        match phase {
            Phase::Typing => {
                self.progress = 0.0;
                for glyph in &mut self.glyphs {
                    glyph.visible = false;
                }
            }
            Phase::Waiting => {
                let rows = self.active_rows;
                for glyph in &mut self.glyphs {
                    glyph.visible = glyph.row < rows;
                }
            }
            Phase::Falling | Phase::Restarting => {}
        }
    }

    fn elapsed(&self) -> u64 {
        self.frame.saturating_sub(self.phase_entered_at)
    }

    fn active_glyph_count(&self) -> usize {
        let rows = self.active_rows;
        self.glyphs.iter().filter(|glyph| glyph.row < rows).count()
    }

    fn rebuild(&mut self) {
        self.update_sizing();
        let set = self.library.get(self.text_set_index);
        self.active_rows = set.lines.len().max(1);
        let row_height = self.viewport.height / self.active_rows as f32;
        self.glyphs = Glyph::build_all(set, self.viewport, self.char_size, row_height);
    }

    fn update_sizing(&mut self) {
        let set = self.library.get(self.text_set_index);
        self.char_size = self.viewport.width / set.longest_line().max(1) as f32;
    }

    fn advance_progress(&mut self, parameters: &ParameterSet) {
        let jitter =
            (noise(self.frame as f32 * JITTER_FREQUENCY) - 0.5) * self.timing.reveal_jitter;
        let increment = parameters.speed.clamp(0.0, 1.0) * self.timing.max_reveal_rate + jitter;
        self.progress += increment.max(0.0);

        let rows = self.active_rows;
        for glyph in &mut self.glyphs {
            glyph.visible = glyph.row < rows && (glyph.reveal_index as f32) < self.progress;
        }
    }

    /// Recomputes the pose of every glyph in the active rows from the grid
    /// and the seeded draws.
    fn layout(&mut self, seed: u64, parameters: &ParameterSet) {
        let line_count = self.current_set().lines.len();
        self.active_rows = visible_rows(parameters.row_fraction, line_count);

        let half_width = self.viewport.width / 2.0;
        let half_height = self.viewport.height / 2.0;
        let char_size = self.char_size * parameters.text_scale;
        let row_height = self.viewport.height / self.active_rows as f32;
        let time = (self.frame as f64 * WOBBLE_RATE).rem_euclid(std::f64::consts::TAU) as f32;
        let mut rng = StdRng::seed_from_u64(seed);

        let rows = self.active_rows;
        for glyph in &mut self.glyphs {
            if glyph.row >= rows {
                glyph.visible = false;
                continue;
            }
            glyph.origin =
                glyph::grid_origin(self.viewport, glyph.row, glyph.column, char_size, row_height);

            let jitter = Vec2::new(
                rng.random_range(-half_width..half_width),
                rng.random_range(-half_height..half_height),
            );
            let wobble_phase = time + remap(glyph.origin.x, -half_width, half_width, -PI, PI);
            let wobble = wobble_phase.sin() * char_size * parameters.wave;

            glyph.position = glyph.origin * parameters.scale
                + jitter * parameters.offset
                + Vec2::new(0.0, wobble);
            glyph.rotation = rng.random_range(0.0..TAU) * parameters.rotation;
        }
    }

    /// Gives every glyph in the active rows its initial fall velocities.
    fn launch(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed ^ FALL_SALT);
        let rows = self.active_rows;
        for glyph in self.glyphs.iter_mut().filter(|glyph| glyph.row < rows) {
            glyph.visible = true;
            glyph.velocity_y = rng.random_range(-4.0..0.0);
            glyph.angular_velocity = rng.random_range(-0.1..0.1);
        }
    }

    fn integrate(&mut self) {
        let gravity = self.timing.gravity;
        for glyph in self.glyphs.iter_mut().filter(|glyph| glyph.visible) {
            glyph.velocity_y += gravity;
            glyph.position.y += glyph.velocity_y;
            glyph.rotation += glyph.angular_velocity;
        }
    }

    fn output(&self, parameters: &ParameterSet) -> FrameOutput {
        FrameOutput {
            frame: self.frame,
            phase: self.phase,
            text_set_index: self.text_set_index,
            glyph_size: self.char_size * parameters.text_scale * 0.7,
            background_box: parameters.background_box,
            inverted: parameters.inverted,
            glyphs: self
                .glyphs
                .iter()
                .filter(|glyph| glyph.visible)
                .map(Glyph::pose)
                .collect(),
        }
    }
}

/// Rows shown for a row fraction in `[0, 1]`: one row at 0, every row at 1.
pub fn visible_rows(row_fraction: f32, line_count: usize) -> usize {
    let line_count = line_count.max(1);
    let rows = remap(row_fraction.clamp(0.0, 1.0), 0.0, 1.0, 1.0, line_count as f32);
    (rows.floor() as usize).clamp(1, line_count)
}

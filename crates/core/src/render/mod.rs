use crate::animation::{FrameOutput, Phase};
use crate::Result;

/// Rendering backend abstraction. Implementations rasterise the glyph poses
/// of a frame onto whatever surface they own.
pub trait GlyphRenderer {
    fn draw(&mut self, frame: &FrameOutput) -> Result<()>;
}

/// Renderer that only reports what it would draw through `tracing`.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    last_phase: Option<Phase>,
    frames: u64,
}

impl TraceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl GlyphRenderer for TraceRenderer {
    fn draw(&mut self, frame: &FrameOutput) -> Result<()> {
        if self.last_phase != Some(frame.phase) {
            tracing::info!(
                frame = frame.frame,
                phase = ?frame.phase,
                index = frame.text_set_index,
                "entering phase"
            );
            self.last_phase = Some(frame.phase);
        }
        tracing::trace!(
            frame = frame.frame,
            visible = frame.glyphs.len(),
            glyph_size = frame.glyph_size,
            inverted = frame.inverted,
            "frame drawn"
        );
        self.frames += 1;
        Ok(())
    }
}

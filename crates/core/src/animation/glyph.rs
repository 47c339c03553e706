use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::library::TextSet;

/// Per-glyph animation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub ch: char,
    pub row: usize,
    pub column: usize,
    /// Unscaled grid position, centred on the viewport.
    pub origin: Vec2,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity_y: f32,
    pub angular_velocity: f32,
    /// Fixed place in typing order.
    pub reveal_index: usize,
    pub visible: bool,
}

impl Glyph {
    /// Lays out every character of `set` on a grid of `char_size` columns
    /// and `row_height` rows, centred on the origin.
    pub fn build_all(
        set: &TextSet,
        viewport: Viewport,
        char_size: f32,
        row_height: f32,
    ) -> Vec<Glyph> {
        let mut glyphs = Vec::with_capacity(set.glyph_count());
        for (row, line) in set.lines.iter().enumerate() {
            for (column, ch) in line.chars().enumerate() {
                let origin = grid_origin(viewport, row, column, char_size, row_height);
                glyphs.push(Glyph {
                    ch,
                    row,
                    column,
                    origin,
                    position: origin,
                    rotation: 0.0,
                    velocity_y: 0.0,
                    angular_velocity: 0.0,
                    reveal_index: glyphs.len(),
                    visible: false,
                });
            }
        }
        glyphs
    }

    pub fn pose(&self) -> GlyphPose {
        GlyphPose {
            ch: self.ch,
            position: self.position,
            rotation: self.rotation,
        }
    }
}

/// Centre of a grid cell relative to the viewport centre.
pub(crate) fn grid_origin(
    viewport: Viewport,
    row: usize,
    column: usize,
    char_size: f32,
    row_height: f32,
) -> Vec2 {
    let x = column as f32 * char_size + char_size / 2.0 - viewport.width / 2.0;
    let y = (row as f32 + 0.5) * row_height - viewport.height / 2.0;
    Vec2::new(x, y)
}

/// What the renderer needs to draw one glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphPose {
    pub ch: char,
    pub position: Vec2,
    pub rotation: f32,
}

/// Drawing surface size in pixels; y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_order_follows_reading_order() {
        let set = TextSet::new("t", "a", vec!["ab".into(), "c".into()]);
        let glyphs = Glyph::build_all(&set, Viewport::new(100.0, 100.0), 50.0, 50.0);

        let order: Vec<(char, usize, usize, usize)> = glyphs
            .iter()
            .map(|g| (g.ch, g.row, g.column, g.reveal_index))
            .collect();
        assert_eq!(order, vec![('a', 0, 0, 0), ('b', 0, 1, 1), ('c', 1, 0, 2)]);
        assert!(glyphs.iter().all(|g| !g.visible));
    }

    #[test]
    fn grid_is_centred() {
        let origin = grid_origin(Viewport::new(100.0, 100.0), 0, 0, 50.0, 50.0);
        assert_eq!(origin, Vec2::new(-25.0, -25.0));
        let origin = grid_origin(Viewport::new(100.0, 100.0), 1, 1, 50.0, 50.0);
        assert_eq!(origin, Vec2::new(25.0, 25.0));
        let origin = grid_origin(Viewport::new(100.0, 100.0), 0, 0, 50.0, 100.0);
        assert_eq!(origin, Vec2::new(-25.0, 0.0));
    }
}

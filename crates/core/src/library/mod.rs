use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{FlowTextError, Result};

/// A titled group of lines animated together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSet {
    pub title: String,
    pub author: String,
    pub lines: Vec<String>,
}

impl TextSet {
    pub fn new(title: impl Into<String>, author: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            lines,
        }
    }

    /// Number of glyphs across every line.
    pub fn glyph_count(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).sum()
    }

    /// Length in glyphs of the longest line.
    pub fn longest_line(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(FlowTextError::InvalidTextSet {
                title: self.title.clone(),
                reason: "set has no lines",
            });
        }
        if self.glyph_count() == 0 {
            return Err(FlowTextError::InvalidTextSet {
                title: self.title.clone(),
                reason: "every line is empty",
            });
        }
        Ok(())
    }
}

/// Ordered, validated collection of text sets. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLibrary {
    sets: Vec<TextSet>,
}

impl TextLibrary {
    pub fn new(sets: Vec<TextSet>) -> Result<Self> {
        if sets.is_empty() {
            return Err(FlowTextError::InvalidInput(
                "text library requires at least one text set",
            ));
        }
        for set in &sets {
            set.validate()?;
        }
        Ok(Self { sets })
    }

    /// Parses a JSON array of `{ title, author, lines }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let sets: Vec<TextSet> = serde_json::from_str(json)?;
        Self::new(sets)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Small library bundled with the binary.
    pub fn builtin() -> Self {
        let sets = vec![
            TextSet::new(
                "Night Window",
                "Flow Text",
                vec![
                    "stars begin to blink".to_string(),
                    "slowly over the quiet roofs".to_string(),
                    "and the city forgets its name".to_string(),
                ],
            ),
            TextSet::new(
                "Forest Radio",
                "Flow Text",
                vec![
                    "a far forest hums".to_string(),
                    "carried in on the wind".to_string(),
                ],
            ),
            TextSet::new(
                "Small Steps",
                "Flow Text",
                vec![
                    "every long road".to_string(),
                    "starts with one small step".to_string(),
                    "and a pocket of light".to_string(),
                    "that keeps changing shape".to_string(),
                ],
            ),
        ];
        Self { sets }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[TextSet] {
        &self.sets
    }

    /// Returns the set at `index` wrapped into range.
    pub fn get(&self, index: usize) -> &TextSet {
        &self.sets[index % self.sets.len()]
    }

    /// Wraps any signed index into `0..len`.
    pub fn wrap(&self, index: i64) -> usize {
        let len = self.sets.len() as i64;
        index.rem_euclid(len) as usize
    }

    pub fn next(&self, index: usize) -> usize {
        self.wrap(index as i64 + 1)
    }

    pub fn previous(&self, index: usize) -> usize {
        self.wrap(index as i64 - 1)
    }
}

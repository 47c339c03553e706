//! Press-edge detection shared by every button-like control.

use std::collections::HashMap;
use std::hash::Hash;

/// Transition observed between two consecutive samples of a boolean control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Steady,
}

impl Edge {
    pub fn between(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            _ => Edge::Steady,
        }
    }

    pub fn is_rising(self) -> bool {
        self == Edge::Rising
    }
}

/// Remembers the last sample of a single control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current level and reports the transition from the last one.
    pub fn update(&mut self, current: bool) -> Edge {
        let edge = Edge::between(self.previous, current);
        self.previous = current;
        edge
    }
}

/// One [`EdgeDetector`] per control identity.
#[derive(Debug, Clone)]
pub struct EdgeBank<K> {
    detectors: HashMap<K, EdgeDetector>,
}

impl<K> Default for EdgeBank<K> {
    fn default() -> Self {
        Self {
            detectors: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> EdgeBank<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, control: K, current: bool) -> Edge {
        self.detectors.entry(control).or_default().update(current)
    }

    /// Forgets every remembered level, so held controls fire again.
    pub fn clear(&mut self) {
        self.detectors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_transition_once() {
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.update(false), Edge::Steady);
        assert_eq!(detector.update(true), Edge::Rising);
        assert_eq!(detector.update(true), Edge::Steady);
        assert_eq!(detector.update(false), Edge::Falling);
        assert_eq!(detector.update(false), Edge::Steady);
    }

    #[test]
    fn bank_tracks_controls_independently() {
        let mut bank = EdgeBank::new();
        assert!(bank.update("left", true).is_rising());
        assert!(bank.update("right", true).is_rising());
        assert_eq!(bank.update("left", true), Edge::Steady);
        assert_eq!(bank.update("right", false), Edge::Falling);
    }

    #[test]
    fn cleared_bank_fires_again_for_held_controls() {
        let mut bank = EdgeBank::new();
        assert!(bank.update("stop", true).is_rising());
        assert_eq!(bank.update("stop", true), Edge::Steady);
        bank.clear();
        assert!(bank.update("stop", true).is_rising());
    }
}

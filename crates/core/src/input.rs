//! Logical input - from "which keys are down" to a set of directions.

use std::collections::BTreeSet;

use crate::types::{Direction, DirectionSet};

/// Anything that can answer "is any of these keys held right now".
pub trait InputSource {
    fn is_pressed(&self, names: &[&str]) -> bool;
}

/// Producer of per-tick key snapshots, e.g. a keyboard listener.
pub trait InputFeed {
    fn snapshot(&self) -> PressedKeys;
}

/// Physical key names per logical direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub left: &'static [&'static str],
    pub right: &'static [&'static str],
    pub up: &'static [&'static str],
    pub down: &'static [&'static str],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: &["a", "h", "left"],
            right: &["d", "l", "right"],
            up: &["k", "w", "space", "up"],
            down: &["j", "s", "down"],
        }
    }
}

impl KeyBindings {
    pub fn group(&self, dir: Direction) -> &'static [&'static str] {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    /// Poll each direction group once.
    pub fn read_directions(&self, source: &dyn InputSource) -> DirectionSet {
        Direction::ALL
            .into_iter()
            .filter(|dir| source.is_pressed(self.group(*dir)))
            .collect()
    }
}

/// Immutable set of pressed key names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeys {
    keys: BTreeSet<String>,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Press the first bound key of every direction in `dirs`.
    pub fn from_directions(dirs: DirectionSet, bindings: &KeyBindings) -> Self {
        let keys = Direction::ALL
            .into_iter()
            .filter(|d| dirs.contains(*d))
            .filter_map(|d| bindings.group(d).first().copied());
        Self::from_keys(keys)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl InputSource for PressedKeys {
    fn is_pressed(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.keys.contains(*n))
    }
}

impl InputFeed for PressedKeys {
    fn snapshot(&self) -> PressedKeys {
        self.clone()
    }
}

/// Resolved directions as input, for driving ticks in unit tests. Only the
/// default [`KeyBindings`] groups match.
#[cfg(test)]
impl InputSource for DirectionSet {
    fn is_pressed(&self, names: &[&str]) -> bool {
        let bindings = KeyBindings::default();
        Direction::ALL
            .into_iter()
            .any(|d| self.contains(d) && bindings.group(d) == names)
    }
}

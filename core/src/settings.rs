//! Tunable values read by the population manager whenever a balloon spawns.

use serde::{Deserialize, Serialize};

use crate::{MovementPattern, SpawnSide};

/// Designer-facing tuning knobs. Changes only affect balloons spawned afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonSettings {
    /// Vertical gravity in units per second squared; balloons feel five percent of it.
    pub gravity: f32,
    /// Multiplier applied to the balloon hit radius.
    pub balloon_size: f32,
    /// Horizontal speed of a balloon whose type has a speed multiplier of one.
    pub base_speed: f32,
    /// Side of the arena top-level balloons enter from.
    pub spawn_side: SpawnSidePreference,
    /// Movement pattern assigned to top-level balloons.
    pub movement_pattern: PatternPreference,
}

impl Default for BalloonSettings {
    fn default() -> Self {
        Self {
            gravity: -9.8,
            balloon_size: 1.0,
            base_speed: 1.5,
            spawn_side: SpawnSidePreference::Random,
            movement_pattern: PatternPreference::Random,
        }
    }
}

/// Spawn side configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnSidePreference {
    /// Always enter from the left wall.
    Left,
    /// Always enter from the right wall.
    Right,
    /// Pick a side uniformly for every spawn.
    #[default]
    Random,
}

impl SpawnSidePreference {
    /// Returns the forced side, or `None` when the side is chosen at random.
    #[must_use]
    pub const fn fixed(self) -> Option<SpawnSide> {
        match self {
            Self::Left => Some(SpawnSide::Left),
            Self::Right => Some(SpawnSide::Right),
            Self::Random => None,
        }
    }
}

/// Movement pattern configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternPreference {
    /// Pick one of the five patterns uniformly for every spawn.
    #[default]
    #[serde(rename = "random", alias = "RANDOM")]
    Random,
    /// Force [`MovementPattern::Normal`].
    #[serde(rename = "NORMAL", alias = "normal")]
    Normal,
    /// Force [`MovementPattern::Zigzag`].
    #[serde(rename = "ZIGZAG", alias = "zigzag")]
    Zigzag,
    /// Force [`MovementPattern::Sine`].
    #[serde(rename = "SINE", alias = "sine")]
    Sine,
    /// Force [`MovementPattern::Spiral`].
    #[serde(rename = "SPIRAL", alias = "spiral")]
    Spiral,
    /// Force [`MovementPattern::Rise`].
    #[serde(rename = "RISE", alias = "rise")]
    Rise,
}

impl PatternPreference {
    /// Returns the forced pattern, or `None` when the pattern is chosen at random.
    #[must_use]
    pub const fn fixed(self) -> Option<MovementPattern> {
        match self {
            Self::Random => None,
            Self::Normal => Some(MovementPattern::Normal),
            Self::Zigzag => Some(MovementPattern::Zigzag),
            Self::Sine => Some(MovementPattern::Sine),
            Self::Spiral => Some(MovementPattern::Spiral),
            Self::Rise => Some(MovementPattern::Rise),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let settings: BalloonSettings =
            toml::from_str("base_speed = 2.5\nmovement_pattern = \"ZIGZAG\"\n").expect("parse");
        assert_eq!(settings.base_speed, 2.5);
        assert_eq!(settings.movement_pattern.fixed(), Some(MovementPattern::Zigzag));
        assert_eq!(settings.spawn_side, SpawnSidePreference::Random);
        assert_eq!(settings.balloon_size, 1.0);
    }

    #[test]
    fn spawn_side_preference_reads_lowercase_names() {
        let settings: BalloonSettings = toml::from_str("spawn_side = \"right\"").expect("parse");
        assert_eq!(settings.spawn_side.fixed(), Some(SpawnSide::Right));
    }
}

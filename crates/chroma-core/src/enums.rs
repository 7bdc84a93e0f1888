//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Tower and enemy color. Matching colors deal full damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerColor {
    #[default]
    Red,
    Blue,
}

impl TowerColor {
    pub fn flipped(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// Parse a color id as written in formation definitions and saves.
    /// `a`/`b` are accepted as aliases for red/blue.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "a" => Some(Self::Red),
            "blue" | "b" => Some(Self::Blue),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

/// Enemy archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyArchetype {
    /// A single mid-weight ship.
    Standard,
    /// Slow, heavily armored ship worth extra energy.
    Tank,
    /// Member of a swarm group spawned together.
    Swarm,
}

impl EnemyArchetype {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "tank" => Some(Self::Tank),
            "swarm" => Some(Self::Swarm),
            _ => None,
        }
    }
}

/// Weapon archetype fired by a tower, selected purely by tower level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponVariant {
    Standard,
    Minigun,
    Railgun,
    Rocket,
}

impl WeaponVariant {
    pub fn for_level(level: u8) -> Self {
        match level {
            0..=3 => Self::Standard,
            4 => Self::Minigun,
            5 => Self::Railgun,
            _ => Self::Rocket,
        }
    }
}

/// Grid row. Adjacency is only defined within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Row {
    Top,
    Bottom,
}

impl Row {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Tower interaction mode. Merge and upgrade selection are mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementMode {
    #[default]
    Idle,
    MergeSelecting,
    UpgradeSelecting,
}

/// Top-level game phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Between waves: building, merging, upgrading.
    #[default]
    Build,
    /// A wave is in progress.
    WaveActive,
    /// The game has ended.
    GameOver(GameOutcome),
}

/// How the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Victory,
    Defeat,
}

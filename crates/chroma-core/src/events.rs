//! Events emitted by the simulation for audio, UI feedback, and subscribers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{CellId, TowerId};

/// Domain events published on the event bus and drained into each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    EnemyKilled {
        serial: u64,
        archetype: EnemyArchetype,
        color: TowerColor,
    },
    WaveStarted {
        wave: u32,
        spawn_events: u32,
    },
    WaveCompleted {
        wave: u32,
        energy_reward: u32,
    },
    TowerPlaced {
        tower: TowerId,
        cell: CellId,
        color: TowerColor,
    },
    TowerMerged {
        tower: TowerId,
        consumed: TowerId,
        level: u8,
    },
    TowerUpgraded {
        tower: TowerId,
        level: u8,
        cost: u32,
    },
    EnergyGained {
        amount: u32,
    },
    BaseHit {
        lives_remaining: u32,
    },
    GameOver {
        outcome: GameOutcome,
        wave: u32,
        score: u64,
    },
}

/// Audio cues for the frontend sound system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioCue {
    Fire { variant: WeaponVariant },
    Hit,
    Explosion,
    Merge,
    ColorSwitch,
    Placement,
    BaseHit,
    WaveCleared,
}

/// Why an intent was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    InsufficientEnergy,
    WaveInProgress,
    CellOccupied,
    UnknownCell,
    UnknownTower,
    NotInMergeMode,
    NotInUpgradeMode,
    /// Merge partner differs in color or level.
    MergeMismatch,
    MaxLevel,
    /// Upgrades unlock at a configured wave.
    UpgradeLocked,
    GameOver,
}

/// Error-feedback requests for the UI (shake, flash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Feedback {
    Rejected {
        reason: RejectReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tower: Option<TowerId>,
    },
}

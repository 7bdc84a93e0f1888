//! Player intents sent from an input surface to the simulation.
//!
//! Commands are queued and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::TowerColor;
use crate::types::{CellId, TowerId};

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Towers ---
    /// Build a level-1 tower on an empty cell.
    PlaceTower { cell: CellId, color: TowerColor },
    /// Flip a tower between red and blue.
    SwitchColor { tower: TowerId },
    /// Select a tower while merge mode is active.
    SelectForMerge { tower: TowerId },
    /// Buy one level for a tower while upgrade mode is active.
    UpgradeTower { tower: TowerId },
    /// Scrap a tower and free its cell. No refund.
    RemoveTower { tower: TowerId },
    /// Merge every eligible adjacent pair on the grid.
    MergeAll,

    // --- Modes ---
    ToggleMergeMode,
    ToggleUpgradeMode,

    // --- Flow ---
    StartWave,
    /// Discard the run and start over from the configured initial state.
    Restart,
}

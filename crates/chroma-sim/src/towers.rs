//! Tower economy: placement, color switching, merging, upgrading, removal,
//! and the placement-mode state machine.
//!
//! Every operation either applies fully or records a [`RejectReason`] on the
//! event bus and leaves state untouched.

use chroma_core::config::GameConfig;
use chroma_core::constants::MAX_TOWER_LEVEL;
use chroma_core::enums::{PlacementMode, Row, TowerColor};
use chroma_core::events::{AudioCue, DomainEvent, RejectReason};
use chroma_core::state::MergeHint;
use chroma_core::types::{CellId, TowerId};

use crate::context::SimulationContext;

/// Current placement mode and the pending merge anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeState {
    pub mode: PlacementMode,
    pub anchor: Option<TowerId>,
}

impl ModeState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of clicking a tower while merge-selecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSelection {
    /// First pick; waiting for a partner.
    Anchored(TowerId),
    /// The anchor absorbed the partner.
    Merged { tower: TowerId, level: u8 },
    /// Selection dropped without an error.
    Cleared,
    Rejected,
}

pub fn place(ctx: &mut SimulationContext, config: &GameConfig, cell: CellId, color: TowerColor) -> bool {
    let Some(target) = ctx.grid.cell(cell) else {
        return ctx.bus.reject(RejectReason::UnknownCell, None);
    };
    if target.occupied() {
        return ctx.bus.reject(RejectReason::CellOccupied, target.tower);
    }
    let center = target.center();
    if !ctx.ledger.try_debit(config.player.tower_cost) {
        return ctx.bus.reject(RejectReason::InsufficientEnergy, None);
    }

    let id = ctx.store.spawn_tower(cell, center, color, 1, config);
    ctx.grid.bind(cell, id);
    ctx.bus.publish(DomainEvent::TowerPlaced { tower: id, cell, color });
    ctx.bus.cue(AudioCue::Placement);
    tracing::debug!(%id, %cell, color = color.as_str(), "tower placed");
    true
}

pub fn switch_color(ctx: &mut SimulationContext, config: &GameConfig, tower: TowerId) -> bool {
    if ctx.wave_in_progress() {
        return ctx.bus.reject(RejectReason::WaveInProgress, Some(tower));
    }
    if ctx.store.find_tower(tower).is_none() {
        return ctx.bus.reject(RejectReason::UnknownTower, Some(tower));
    }
    if !ctx.ledger.try_debit(config.player.switch_cost) {
        return ctx.bus.reject(RejectReason::InsufficientEnergy, Some(tower));
    }
    ctx.store.with_tower_mut(tower, |t| t.color = t.color.flipped());
    ctx.bus.cue(AudioCue::ColorSwitch);
    true
}

pub fn select_for_merge(ctx: &mut SimulationContext, config: &GameConfig, tower: TowerId) -> MergeSelection {
    if ctx.modes.mode != PlacementMode::MergeSelecting {
        ctx.bus.reject(RejectReason::NotInMergeMode, Some(tower));
        return MergeSelection::Rejected;
    }
    let Some(picked) = ctx.store.tower(tower) else {
        ctx.bus.reject(RejectReason::UnknownTower, Some(tower));
        return MergeSelection::Rejected;
    };

    let anchor = match ctx.modes.anchor.and_then(|id| ctx.store.tower(id)) {
        Some(anchor) => anchor,
        None => {
            ctx.modes.anchor = Some(tower);
            return MergeSelection::Anchored(tower);
        }
    };

    ctx.modes.anchor = None;
    if anchor.id == picked.id || !anchor.cell.is_adjacent(&picked.cell) {
        return MergeSelection::Cleared;
    }
    if anchor.color != picked.color || anchor.level != picked.level {
        ctx.bus.reject(RejectReason::MergeMismatch, Some(tower));
        return MergeSelection::Rejected;
    }
    if anchor.is_max_level() {
        ctx.bus.reject(RejectReason::MaxLevel, Some(anchor.id));
        return MergeSelection::Rejected;
    }

    let level = merge_pair(ctx, config, anchor.id, picked.id, picked.cell);
    MergeSelection::Merged {
        tower: anchor.id,
        level,
    }
}

/// Fold `source` into `anchor`. The anchor keeps its cell and gains a level.
fn merge_pair(
    ctx: &mut SimulationContext,
    config: &GameConfig,
    anchor: TowerId,
    source: TowerId,
    source_cell: CellId,
) -> u8 {
    ctx.store.despawn_tower(source);
    ctx.grid.vacate(source_cell);
    let level = ctx
        .store
        .with_tower_mut(anchor, |t| {
            t.set_level(t.level + 1, &config.towers, &config.projectiles);
            t.level
        })
        .unwrap_or(MAX_TOWER_LEVEL);
    ctx.bus.publish(DomainEvent::TowerMerged {
        tower: anchor,
        consumed: source,
        level,
    });
    ctx.bus.cue(AudioCue::Merge);
    tracing::debug!(%anchor, %source, level, "towers merged");
    level
}

pub fn upgrade(ctx: &mut SimulationContext, config: &GameConfig, tower: TowerId) -> bool {
    if ctx.modes.mode != PlacementMode::UpgradeSelecting {
        return ctx.bus.reject(RejectReason::NotInUpgradeMode, Some(tower));
    }
    let Some(current) = ctx.store.tower(tower) else {
        return ctx.bus.reject(RejectReason::UnknownTower, Some(tower));
    };
    if ctx.ledger.wave < config.upgrade.min_wave {
        return ctx.bus.reject(RejectReason::UpgradeLocked, Some(tower));
    }
    if current.is_max_level() {
        return ctx.bus.reject(RejectReason::MaxLevel, Some(tower));
    }
    let cost = config
        .upgrade
        .cost_by_level
        .get(usize::from(current.level - 1))
        .copied()
        .unwrap_or(u32::MAX);
    if !ctx.ledger.try_debit(cost) {
        return ctx.bus.reject(RejectReason::InsufficientEnergy, Some(tower));
    }

    let level = current.level + 1;
    ctx.store
        .with_tower_mut(tower, |t| t.set_level(level, &config.towers, &config.projectiles));
    ctx.bus.publish(DomainEvent::TowerUpgraded { tower, level, cost });
    true
}

/// Scrap a tower between waves. No refund.
pub fn remove(ctx: &mut SimulationContext, tower: TowerId) -> bool {
    if ctx.wave_in_progress() {
        return ctx.bus.reject(RejectReason::WaveInProgress, Some(tower));
    }
    let Some(current) = ctx.store.tower(tower) else {
        return ctx.bus.reject(RejectReason::UnknownTower, Some(tower));
    };
    ctx.store.despawn_tower(tower);
    ctx.grid.vacate(current.cell);
    if ctx.modes.anchor == Some(tower) {
        ctx.modes.anchor = None;
    }
    true
}

/// Merge every eligible adjacent pair, bottom row first, left to right.
/// A merged pair is skipped past as a whole. Returns the number of merges.
pub fn merge_all(ctx: &mut SimulationContext, config: &GameConfig) -> u32 {
    if ctx.wave_in_progress() {
        ctx.bus.reject(RejectReason::WaveInProgress, None);
        return 0;
    }
    let mut merges = 0;
    for row in [Row::Bottom, Row::Top] {
        let cells: Vec<CellId> = ctx.grid.row(row).map(|c| c.id).collect();
        let mut i = 0;
        while i + 1 < cells.len() {
            let pair = (
                ctx.grid.tower_at(cells[i]).and_then(|id| ctx.store.tower(id)),
                ctx.grid.tower_at(cells[i + 1]).and_then(|id| ctx.store.tower(id)),
            );
            match pair {
                (Some(left), Some(right)) if mergeable(&left, &right) => {
                    merge_pair(ctx, config, left.id, right.id, right.cell);
                    merges += 1;
                    i += 2;
                }
                _ => i += 1,
            }
        }
    }
    if ctx.modes.anchor.is_some_and(|id| ctx.store.find_tower(id).is_none()) {
        ctx.modes.anchor = None;
    }
    merges
}

fn mergeable(a: &chroma_core::components::Tower, b: &chroma_core::components::Tower) -> bool {
    a.cell.is_adjacent(&b.cell) && a.color == b.color && a.level == b.level && !a.is_max_level()
}

/// Adjacent pairs that could be merged right now. Empty during a wave.
pub fn merge_hints(ctx: &SimulationContext) -> Vec<MergeHint> {
    if ctx.wave_in_progress() {
        return Vec::new();
    }
    let mut hints = Vec::new();
    for row in [Row::Top, Row::Bottom] {
        let towers: Vec<_> = ctx
            .grid
            .row(row)
            .map(|c| c.tower.and_then(|id| ctx.store.tower(id)))
            .collect();
        for pair in towers.windows(2) {
            if let [Some(left), Some(right)] = pair {
                if mergeable(left, right) {
                    hints.push(MergeHint {
                        anchor: left.id,
                        partner: right.id,
                        color: left.color,
                    });
                }
            }
        }
    }
    hints
}

pub fn toggle_merge_mode(ctx: &mut SimulationContext) -> bool {
    toggle_mode(ctx, PlacementMode::MergeSelecting)
}

pub fn toggle_upgrade_mode(ctx: &mut SimulationContext) -> bool {
    toggle_mode(ctx, PlacementMode::UpgradeSelecting)
}

fn toggle_mode(ctx: &mut SimulationContext, mode: PlacementMode) -> bool {
    if ctx.wave_in_progress() {
        return ctx.bus.reject(RejectReason::WaveInProgress, None);
    }
    ctx.modes.mode = if ctx.modes.mode == mode {
        PlacementMode::Idle
    } else {
        mode
    };
    ctx.modes.anchor = None;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::events::Feedback;

    fn setup() -> (SimulationContext, GameConfig) {
        let mut config = GameConfig::default();
        config.player.initial_energy = 2_000;
        (SimulationContext::new(&config, 1), config)
    }

    fn top(i: u8) -> CellId {
        CellId::new(Row::Top, i)
    }

    fn placed(ctx: &mut SimulationContext, config: &GameConfig, cell: CellId, color: TowerColor) -> TowerId {
        assert!(place(ctx, config, cell, color));
        ctx.grid.tower_at(cell).unwrap()
    }

    fn last_rejection(ctx: &mut SimulationContext) -> Option<RejectReason> {
        let (_, _, feedback) = ctx.bus.drain();
        feedback.last().map(|Feedback::Rejected { reason, .. }| *reason)
    }

    #[test]
    fn test_place_rules() {
        let (mut ctx, config) = setup();
        let id = placed(&mut ctx, &config, top(0), TowerColor::Blue);
        assert_eq!(ctx.ledger.energy, 2_000 - 120);
        assert_eq!(ctx.store.tower(id).unwrap().cell, top(0));

        assert!(!place(&mut ctx, &config, top(0), TowerColor::Red));
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::CellOccupied));
        assert!(!place(&mut ctx, &config, top(9), TowerColor::Red));
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::UnknownCell));

        ctx.ledger.energy = 119;
        assert!(!place(&mut ctx, &config, top(1), TowerColor::Red));
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::InsufficientEnergy));
        assert_eq!(ctx.ledger.energy, 119);
        assert!(ctx.grid.tower_at(top(1)).is_none());
    }

    #[test]
    fn test_merge_adjacent_equal_towers() {
        let (mut ctx, config) = setup();
        let a = placed(&mut ctx, &config, top(1), TowerColor::Red);
        let b = placed(&mut ctx, &config, top(2), TowerColor::Red);
        assert!(toggle_merge_mode(&mut ctx));

        assert_eq!(select_for_merge(&mut ctx, &config, a), MergeSelection::Anchored(a));
        assert_eq!(
            select_for_merge(&mut ctx, &config, b),
            MergeSelection::Merged { tower: a, level: 2 }
        );
        assert!(ctx.store.tower(b).is_none());
        assert_eq!(ctx.grid.tower_at(top(1)), Some(a));
        assert_eq!(ctx.grid.tower_at(top(2)), None);
        assert_eq!(ctx.store.tower(a).unwrap().level, 2);
        assert_eq!(ctx.modes.anchor, None);
    }

    #[test]
    fn test_merge_clears_or_rejects() {
        let (mut ctx, config) = setup();
        let a = placed(&mut ctx, &config, top(0), TowerColor::Red);
        let b = placed(&mut ctx, &config, top(1), TowerColor::Blue);
        let far = placed(&mut ctx, &config, top(3), TowerColor::Red);

        assert_eq!(select_for_merge(&mut ctx, &config, a), MergeSelection::Rejected);
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::NotInMergeMode));
        toggle_merge_mode(&mut ctx);

        select_for_merge(&mut ctx, &config, a);
        assert_eq!(select_for_merge(&mut ctx, &config, a), MergeSelection::Cleared);
        select_for_merge(&mut ctx, &config, a);
        assert_eq!(select_for_merge(&mut ctx, &config, far), MergeSelection::Cleared);
        ctx.bus.drain();

        select_for_merge(&mut ctx, &config, a);
        assert_eq!(select_for_merge(&mut ctx, &config, b), MergeSelection::Rejected);
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::MergeMismatch));
        assert_eq!(ctx.modes.anchor, None);
        assert_eq!(ctx.store.tower_ids().len(), 3);
    }

    #[test]
    fn test_merge_level_mismatch_leaves_both_towers() {
        let (mut ctx, config) = setup();
        let a = placed(&mut ctx, &config, top(4), TowerColor::Blue);
        let b = placed(&mut ctx, &config, top(5), TowerColor::Blue);
        ctx.store
            .with_tower_mut(a, |t| t.set_level(3, &config.towers, &config.projectiles));
        ctx.store
            .with_tower_mut(b, |t| t.set_level(2, &config.towers, &config.projectiles));
        toggle_merge_mode(&mut ctx);

        select_for_merge(&mut ctx, &config, a);
        assert_eq!(select_for_merge(&mut ctx, &config, b), MergeSelection::Rejected);
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::MergeMismatch));
        assert_eq!(ctx.store.tower(a).unwrap().level, 3);
        assert_eq!(ctx.store.tower(b).unwrap().level, 2);
        assert_eq!(ctx.grid.tower_at(top(4)), Some(a));
        assert_eq!(ctx.grid.tower_at(top(5)), Some(b));
        assert_eq!(ctx.modes.anchor, None);
    }

    #[test]
    fn test_merge_at_max_level_rejected() {
        let (mut ctx, config) = setup();
        let a = placed(&mut ctx, &config, top(0), TowerColor::Red);
        let b = placed(&mut ctx, &config, top(1), TowerColor::Red);
        for id in [a, b] {
            ctx.store
                .with_tower_mut(id, |t| t.set_level(MAX_TOWER_LEVEL, &config.towers, &config.projectiles));
        }
        toggle_merge_mode(&mut ctx);
        select_for_merge(&mut ctx, &config, a);
        assert_eq!(select_for_merge(&mut ctx, &config, b), MergeSelection::Rejected);
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::MaxLevel));
        assert!(ctx.store.tower(b).is_some());
    }

    #[test]
    fn test_upgrade_gates() {
        let (mut ctx, config) = setup();
        let a = placed(&mut ctx, &config, top(0), TowerColor::Red);
        assert!(!upgrade(&mut ctx, &config, a));
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::NotInUpgradeMode));

        toggle_upgrade_mode(&mut ctx);
        assert!(!upgrade(&mut ctx, &config, a));
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::UpgradeLocked));

        ctx.ledger.wave = 10;
        let energy = ctx.ledger.energy;
        assert!(upgrade(&mut ctx, &config, a));
        assert_eq!(ctx.ledger.energy, energy - 100);
        assert_eq!(ctx.store.tower(a).unwrap().level, 2);

        ctx.ledger.energy = 50;
        assert!(!upgrade(&mut ctx, &config, a));
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::InsufficientEnergy));
        assert_eq!(ctx.store.tower(a).unwrap().level, 2);
    }

    #[test]
    fn test_modes_are_exclusive_and_clear_anchor() {
        let (mut ctx, config) = setup();
        let a = placed(&mut ctx, &config, top(0), TowerColor::Red);
        toggle_merge_mode(&mut ctx);
        select_for_merge(&mut ctx, &config, a);
        assert_eq!(ctx.modes.anchor, Some(a));

        toggle_upgrade_mode(&mut ctx);
        assert_eq!(ctx.modes.mode, PlacementMode::UpgradeSelecting);
        assert_eq!(ctx.modes.anchor, None);
        toggle_upgrade_mode(&mut ctx);
        assert_eq!(ctx.modes.mode, PlacementMode::Idle);
    }

    #[test]
    fn test_merge_all_skips_past_merged_pairs() {
        let (mut ctx, config) = setup();
        let ids: Vec<TowerId> = (0..3)
            .map(|i| placed(&mut ctx, &config, top(i), TowerColor::Blue))
            .collect();
        let bottom = |i| CellId::new(Row::Bottom, i);
        let b0 = placed(&mut ctx, &config, bottom(0), TowerColor::Red);
        placed(&mut ctx, &config, bottom(1), TowerColor::Red);

        assert_eq!(merge_hints(&ctx).len(), 3);
        assert_eq!(merge_all(&mut ctx, &config), 2);
        assert_eq!(ctx.store.tower(ids[0]).unwrap().level, 2);
        assert_eq!(ctx.store.tower(ids[2]).unwrap().level, 1, "third tower left alone");
        assert_eq!(ctx.store.tower(b0).unwrap().level, 2);
        assert!(merge_hints(&ctx).is_empty());
    }

    #[test]
    fn test_switch_and_remove() {
        let (mut ctx, config) = setup();
        let a = placed(&mut ctx, &config, top(4), TowerColor::Red);
        assert!(switch_color(&mut ctx, &config, a));
        assert_eq!(ctx.store.tower(a).unwrap().color, TowerColor::Blue);
        assert!(!switch_color(&mut ctx, &config, TowerId(99)));
        assert_eq!(last_rejection(&mut ctx), Some(RejectReason::UnknownTower));

        assert!(remove(&mut ctx, a));
        assert!(ctx.grid.tower_at(top(4)).is_none());
        assert!(!remove(&mut ctx, a));
    }
}

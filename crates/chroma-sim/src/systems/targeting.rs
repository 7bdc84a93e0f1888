//! Tower cooldowns and target acquisition.

use glam::DVec2;
use hecs::World;
use rand::Rng;

use chroma_core::components::Tower;
use chroma_core::config::GameConfig;
use chroma_core::types::{Position, TowerId};

use crate::bus::EventBus;
use crate::economy::EconomyLedger;
use crate::store::EntityStore;
use crate::weapons;

/// Count every tower's cooldown down by `dt`, floored at zero.
pub fn tick_cooldowns(world: &mut World, dt: f64) {
    for (_entity, tower) in world.query_mut::<&mut Tower>() {
        tower.cooldown_secs = (tower.cooldown_secs - dt).max(0.0);
    }
}

/// Every ready tower fires at the earliest-spawned live enemy whose center
/// lies within its range. Towers act in id order.
pub fn run<R: Rng + ?Sized>(
    store: &mut EntityStore,
    ledger: &mut EconomyLedger,
    bus: &mut EventBus,
    config: &GameConfig,
    rng: &mut R,
) {
    let mut ready: Vec<(TowerId, DVec2, Tower)> = store
        .world()
        .query::<(&Position, &Tower)>()
        .iter()
        .filter(|(_, (_, t))| t.cooldown_secs <= 0.0)
        .map(|(_, (pos, t))| (t.id, pos.0, t.clone()))
        .collect();
    ready.sort_by_key(|(id, _, _)| *id);

    for (id, origin, tower) in ready {
        let target = store
            .live_enemies()
            .into_iter()
            .find(|e| e.body.center.distance(origin) <= tower.stats.range);
        let Some(target) = target else {
            continue;
        };
        weapons::fire(&tower, origin, target.body.center, store, ledger, bus, config, rng);
        store.with_tower_mut(id, |t| t.cooldown_secs = t.stats.fire_interval_secs);
    }
}

//! Kinematic integration and the defended-boundary check.

use hecs::World;

use chroma_core::components::{EnemyInfo, Projectile};
use chroma_core::config::GameConfig;
use chroma_core::events::{AudioCue, DomainEvent};
use chroma_core::types::{Position, Velocity};

use crate::bus::EventBus;
use crate::economy::EconomyLedger;
use crate::store::EntityStore;

/// position += velocity * dt for every enemy.
pub fn move_enemies(world: &mut World, dt: f64) {
    for (_entity, (pos, vel, _)) in world.query_mut::<(&mut Position, &Velocity, &EnemyInfo)>() {
        pos.0 += vel.0 * dt;
    }
}

/// position += velocity * dt for every projectile.
pub fn move_projectiles(world: &mut World, dt: f64) {
    for (_entity, (pos, vel, _)) in world.query_mut::<(&mut Position, &Velocity, &Projectile)>() {
        pos.0 += vel.0 * dt;
    }
}

/// Remove enemies whose right edge reached the base (one life each) and
/// enemies that fell below the playfield (no penalty).
/// Returns true when the last life was lost.
pub fn check_base_hits(
    store: &mut EntityStore,
    ledger: &mut EconomyLedger,
    bus: &mut EventBus,
    config: &GameConfig,
) -> bool {
    let base_x = config.world.base.x;
    let floor = config.world.height;

    let mut crossed = Vec::new();
    let mut fallen = Vec::new();
    for (entity, (pos, info)) in store.world().query::<(&Position, &EnemyInfo)>().iter() {
        if pos.0.x + info.half_extents.x >= base_x {
            crossed.push((info.serial, entity));
        } else if pos.0.y - info.half_extents.y > floor {
            fallen.push(entity);
        }
    }
    crossed.sort_by_key(|(serial, _)| *serial);

    for entity in fallen {
        store.queue_despawn(entity);
    }
    for (_, entity) in crossed {
        if store.is_queued(entity) {
            continue;
        }
        store.queue_despawn(entity);
        let lives_remaining = ledger.lose_life();
        ledger.add_score(-(config.scoring.base_hit_penalty as i64));
        bus.publish(DomainEvent::BaseHit { lives_remaining });
        bus.cue(AudioCue::BaseHit);
        if lives_remaining == 0 {
            return true;
        }
    }
    false
}

//! Cleanup: expires beams and queues projectiles that left the world.

use chroma_core::components::{Beam, Projectile};
use chroma_core::types::{Bounds, Position};

use crate::store::EntityStore;

/// Age every beam by `dt` and queue the ones that have faded.
pub fn age_beams(store: &mut EntityStore, dt: f64) {
    let mut expired = Vec::new();
    for (entity, beam) in store.world_mut().query_mut::<&mut Beam>() {
        beam.remaining_secs -= dt;
        if beam.remaining_secs <= 0.0 {
            expired.push(entity);
        }
    }
    for entity in expired {
        store.queue_despawn(entity);
    }
}

/// Queue projectiles outside `bounds`.
pub fn discard_out_of_bounds(store: &mut EntityStore, bounds: &Bounds) {
    let outside: Vec<_> = store
        .world()
        .query::<(&Position, &Projectile)>()
        .iter()
        .filter(|(_, (pos, _))| !bounds.contains(pos.0))
        .map(|(entity, _)| entity)
        .collect();
    for entity in outside {
        store.queue_despawn(entity);
    }
}

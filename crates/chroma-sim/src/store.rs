//! Entity store: the hecs world plus id counters and the deferred-despawn buffer.
//!
//! Systems never despawn while iterating. They queue entities here and the
//! engine flushes the buffer once per tick, so no entity is skipped or
//! visited twice.

use glam::DVec2;
use hecs::{Entity, World};

use chroma_core::components::{Beam, EnemyInfo, Health, Projectile, Tower};
use chroma_core::config::GameConfig;
use chroma_core::enums::{EnemyArchetype, TowerColor};
use chroma_core::types::{CellId, Position, Rect, TowerId, Velocity};

/// Read-only copy of an enemy's collision data.
#[derive(Debug, Clone, Copy)]
pub struct LiveEnemy {
    pub entity: Entity,
    pub serial: u64,
    pub body: Rect,
}

pub struct EnemySpawn {
    pub center: DVec2,
    pub velocity: DVec2,
    pub hp: f64,
    pub archetype: EnemyArchetype,
    pub color: TowerColor,
    pub spawn_group: u32,
    pub half_extents: DVec2,
}

#[derive(Default)]
pub struct EntityStore {
    world: World,
    despawn_buffer: Vec<Entity>,
    next_enemy_serial: u64,
    next_tower_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Remove every entity. Id counters keep counting.
    pub fn clear(&mut self) {
        self.world.clear();
        self.despawn_buffer.clear();
    }

    pub fn spawn_enemy(&mut self, spawn: EnemySpawn) -> Entity {
        let serial = self.next_enemy_serial;
        self.next_enemy_serial += 1;
        self.world.spawn((
            Position(spawn.center),
            Velocity(spawn.velocity),
            Health::new(spawn.hp),
            EnemyInfo {
                serial,
                archetype: spawn.archetype,
                color: spawn.color,
                spawn_group: spawn.spawn_group,
                half_extents: spawn.half_extents,
            },
        ))
    }

    /// Spawn a tower centered at `center` and return its id.
    pub fn spawn_tower(
        &mut self,
        cell: CellId,
        center: DVec2,
        color: TowerColor,
        level: u8,
        config: &GameConfig,
    ) -> TowerId {
        self.next_tower_id += 1;
        let id = TowerId(self.next_tower_id);
        let tower = Tower::new(id, cell, color, level, &config.towers, &config.projectiles);
        self.world.spawn((Position(center), tower));
        id
    }

    pub fn spawn_projectile(&mut self, origin: DVec2, velocity: DVec2, projectile: Projectile) -> Entity {
        self.world
            .spawn((Position(origin), Velocity(velocity), projectile))
    }

    pub fn spawn_beam(&mut self, beam: Beam) -> Entity {
        self.world.spawn((beam,))
    }

    pub fn find_tower(&self, id: TowerId) -> Option<Entity> {
        self.world
            .query::<&Tower>()
            .iter()
            .find(|(_, t)| t.id == id)
            .map(|(e, _)| e)
    }

    /// Copy of a tower's state, looked up by id.
    pub fn tower(&self, id: TowerId) -> Option<Tower> {
        let entity = self.find_tower(id)?;
        self.world.get::<&Tower>(entity).ok().map(|t| (*t).clone())
    }

    /// Apply `f` to the tower with `id`. Returns `None` if it does not exist.
    pub fn with_tower_mut<R>(&mut self, id: TowerId, f: impl FnOnce(&mut Tower) -> R) -> Option<R> {
        let entity = self.find_tower(id)?;
        let mut tower = self.world.get::<&mut Tower>(entity).ok()?;
        Some(f(&mut tower))
    }

    /// Remove a tower immediately. Only used outside the per-tick systems.
    pub fn despawn_tower(&mut self, id: TowerId) -> bool {
        match self.find_tower(id) {
            Some(entity) => self.world.despawn(entity).is_ok(),
            None => false,
        }
    }

    /// Tower ids in ascending order.
    pub fn tower_ids(&self) -> Vec<TowerId> {
        let mut ids: Vec<TowerId> = self.world.query::<&Tower>().iter().map(|(_, t)| t.id).collect();
        ids.sort();
        ids
    }

    /// Enemies that are alive and not queued for removal, ordered by spawn serial.
    pub fn live_enemies(&self) -> Vec<LiveEnemy> {
        let mut enemies: Vec<LiveEnemy> = self
            .world
            .query::<(&Position, &Health, &EnemyInfo)>()
            .iter()
            .filter(|(e, (_, hp, _))| !hp.is_dead() && !self.despawn_buffer.contains(e))
            .map(|(entity, (pos, _, info))| LiveEnemy {
                entity,
                serial: info.serial,
                body: Rect::new(pos.0, info.half_extents),
            })
            .collect();
        enemies.sort_by_key(|e| e.serial);
        enemies
    }

    pub fn is_enemy_alive(&self, entity: Entity) -> bool {
        !self.despawn_buffer.contains(&entity)
            && self
                .world
                .get::<&Health>(entity)
                .map(|hp| !hp.is_dead())
                .unwrap_or(false)
    }

    pub fn enemy_count(&self) -> usize {
        self.world.query::<&EnemyInfo>().iter().count()
    }

    pub fn queue_despawn(&mut self, entity: Entity) {
        if !self.despawn_buffer.contains(&entity) {
            self.despawn_buffer.push(entity);
        }
    }

    pub fn is_queued(&self, entity: Entity) -> bool {
        self.despawn_buffer.contains(&entity)
    }

    /// Despawn everything queued this tick. Returns how many were removed.
    pub fn flush(&mut self) -> usize {
        let mut removed = 0;
        for entity in self.despawn_buffer.drain(..) {
            if self.world.despawn(entity).is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

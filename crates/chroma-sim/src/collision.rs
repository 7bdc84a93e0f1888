//! Damage application and hit resolution for projectiles, rockets, and beams.

use glam::DVec2;
use hecs::Entity;

use chroma_core::components::{EnemyInfo, Health, Projectile, ProjectileKind};
use chroma_core::config::GameConfig;
use chroma_core::constants::ROCKET_SPLASH_SIZE_FACTOR;
use chroma_core::enums::TowerColor;
use chroma_core::events::{AudioCue, DomainEvent};
use chroma_core::types::{Position, Rect};

use crate::bus::EventBus;
use crate::economy::EconomyLedger;
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub killed: bool,
    pub color_matched: bool,
    pub damage_dealt: f64,
}

/// Circle/AABB overlap. A zero radius degenerates to a point-in-rect test.
pub fn point_hits_rect(point: DVec2, radius: f64, rect: &Rect) -> bool {
    if radius <= 0.0 {
        rect.contains(point)
    } else {
        rect.distance_to_point(point) <= radius
    }
}

/// Damage one enemy. Mismatched colors scale the damage down. A lethal hit
/// queues the enemy for removal and pays out the kill reward.
/// Returns `None` if the enemy is already dead or gone.
pub fn apply_damage(
    store: &mut EntityStore,
    ledger: &mut EconomyLedger,
    bus: &mut EventBus,
    config: &GameConfig,
    enemy: Entity,
    damage: f64,
    color: TowerColor,
) -> Option<DamageOutcome> {
    if !store.is_enemy_alive(enemy) {
        return None;
    }
    let (outcome, info) = {
        let (health, info) = store
            .world_mut()
            .query_one_mut::<(&mut Health, &EnemyInfo)>(enemy)
            .ok()?;
        let color_matched = info.color == color;
        let scaled = if color_matched {
            damage
        } else {
            damage * config.projectiles.color_mismatch_multiplier
        };
        let damage_dealt = health.apply_damage(scaled);
        (
            DamageOutcome {
                killed: health.is_dead(),
                color_matched,
                damage_dealt,
            },
            info.clone(),
        )
    };

    if outcome.killed {
        store.queue_despawn(enemy);
        let reward = ledger.kill_reward(info.archetype, config);
        ledger.credit(reward);
        ledger.add_score(config.scoring.per_kill as i64);
        bus.publish(DomainEvent::EnemyKilled {
            serial: info.serial,
            archetype: info.archetype,
            color: info.color,
        });
        if reward > 0 {
            bus.publish(DomainEvent::EnergyGained { amount: reward });
        }
    }
    Some(outcome)
}

/// Resolve contacts for every traveling projectile. Standard shots and
/// minigun bullets hit the earliest-spawned enemy they touch. Rockets
/// detonate once any enemy is within splash reach of them and damage every
/// enemy inside that reach.
pub fn resolve_projectiles(
    store: &mut EntityStore,
    ledger: &mut EconomyLedger,
    bus: &mut EventBus,
    config: &GameConfig,
) {
    let projectiles: Vec<(Entity, DVec2, Projectile)> = store
        .world()
        .query::<(&Position, &Projectile)>()
        .iter()
        .map(|(e, (pos, p))| (e, pos.0, *p))
        .collect();

    for (entity, point, projectile) in projectiles {
        if store.is_queued(entity) {
            continue;
        }
        let enemies = store.live_enemies();

        match projectile.kind {
            ProjectileKind::Rocket { explosion_radius } => {
                let caught: Vec<Entity> = enemies
                    .iter()
                    .filter(|e| in_splash_reach(point, explosion_radius, &e.body))
                    .map(|e| e.entity)
                    .collect();
                if caught.is_empty() {
                    continue;
                }
                for enemy in caught {
                    apply_damage(
                        store,
                        ledger,
                        bus,
                        config,
                        enemy,
                        projectile.damage,
                        projectile.color,
                    );
                }
                bus.cue(AudioCue::Explosion);
            }
            ProjectileKind::Standard | ProjectileKind::MinigunBullet => {
                let Some(first) = enemies
                    .iter()
                    .find(|e| point_hits_rect(point, projectile.hit_radius, &e.body))
                else {
                    continue;
                };
                apply_damage(
                    store,
                    ledger,
                    bus,
                    config,
                    first.entity,
                    projectile.damage,
                    projectile.color,
                );
                bus.cue(AudioCue::Hit);
            }
        }
        store.queue_despawn(entity);
    }
}

/// Rocket proximity: center distance within the explosion radius plus a
/// share of the enemy's largest side.
pub fn in_splash_reach(point: DVec2, explosion_radius: f64, body: &Rect) -> bool {
    let reach = explosion_radius + ROCKET_SPLASH_SIZE_FACTOR * body.max_side();
    body.center.distance(point) <= reach
}

/// Fire a railgun beam from `origin` along `angle`. Every enemy the beam
/// passes close enough to is damaged, nearest first. Returns the rendered
/// beam length, trimmed to just past the furthest hit.
#[allow(clippy::too_many_arguments)]
pub fn resolve_beam(
    store: &mut EntityStore,
    ledger: &mut EconomyLedger,
    bus: &mut EventBus,
    config: &GameConfig,
    origin: DVec2,
    angle: f64,
    damage: f64,
    color: TowerColor,
) -> f64 {
    let rail = &config.weapons.railgun;
    let dir = DVec2::new(angle.cos(), angle.sin());

    let mut hits: Vec<(f64, Entity)> = store
        .live_enemies()
        .into_iter()
        .filter_map(|enemy| {
            let rel = enemy.body.center - origin;
            let along = rel.dot(dir);
            if !(0.0..=rail.beam_length).contains(&along) {
                return None;
            }
            let perp = dir.perp_dot(rel).abs();
            (perp <= enemy.body.half_diagonal() * rail.hit_threshold).then_some((along, enemy.entity))
        })
        .collect();
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));

    let Some(&(furthest, _)) = hits.last() else {
        return rail.beam_length;
    };
    for &(_, enemy) in &hits {
        apply_damage(store, ledger, bus, config, enemy, damage, color);
    }
    bus.cue(AudioCue::Hit);
    rail.beam_length.min(furthest + rail.end_padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::enums::EnemyArchetype;
    use crate::store::EnemySpawn;

    struct Fixture {
        store: EntityStore,
        ledger: EconomyLedger,
        bus: EventBus,
        config: GameConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = GameConfig::default();
            Self {
                store: EntityStore::new(),
                ledger: EconomyLedger::new(&config),
                bus: EventBus::default(),
                config,
            }
        }

        fn enemy(&mut self, x: f64, y: f64, hp: f64, color: TowerColor) -> Entity {
            self.store.spawn_enemy(EnemySpawn {
                center: DVec2::new(x, y),
                velocity: DVec2::ZERO,
                hp,
                archetype: EnemyArchetype::Swarm,
                color,
                spawn_group: 0,
                half_extents: DVec2::splat(40.0),
            })
        }

        fn health(&self, e: Entity) -> f64 {
            self.store.world().get::<&Health>(e).unwrap().current
        }
    }

    #[test]
    fn test_point_hits_rect() {
        let r = Rect::new(DVec2::ZERO, DVec2::splat(10.0));
        assert!(point_hits_rect(DVec2::new(15.0, 0.0), 5.0, &r));
        assert!(!point_hits_rect(DVec2::new(15.1, 0.0), 5.0, &r));
        assert!(point_hits_rect(DVec2::new(10.0, 10.0), 0.0, &r));
        assert!(!point_hits_rect(DVec2::new(10.5, 0.0), 0.0, &r));
    }

    #[test]
    fn test_color_mismatch_scales_damage() {
        let mut f = Fixture::new();
        let e = f.enemy(0.0, 0.0, 100.0, TowerColor::Blue);
        let out = apply_damage(&mut f.store, &mut f.ledger, &mut f.bus, &f.config, e, 10.0, TowerColor::Red)
            .unwrap();
        assert!(!out.color_matched);
        assert!((out.damage_dealt - 3.0).abs() < 1e-9);
        assert!((f.health(e) - 97.0).abs() < 1e-9);
    }

    #[test]
    fn test_kill_rewards_once_and_skips_dead() {
        let mut f = Fixture::new();
        let e = f.enemy(0.0, 0.0, 5.0, TowerColor::Red);
        let energy = f.ledger.energy;
        let out = apply_damage(&mut f.store, &mut f.ledger, &mut f.bus, &f.config, e, 50.0, TowerColor::Red)
            .unwrap();
        assert!(out.killed);
        assert_eq!(out.damage_dealt, 5.0, "damage clamped by remaining health");
        assert_eq!(f.ledger.energy, energy + 3);
        assert_eq!(f.ledger.score, 10);
        assert!(apply_damage(&mut f.store, &mut f.ledger, &mut f.bus, &f.config, e, 50.0, TowerColor::Red)
            .is_none());
        assert_eq!(f.ledger.energy, energy + 3);
        let kills = f
            .bus
            .events()
            .iter()
            .filter(|ev| matches!(ev, DomainEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
    }

    #[test]
    fn test_railgun_pierces_in_order_and_trims_beam() {
        let mut f = Fixture::new();
        let far = f.enemy(400.0, 0.0, 1000.0, TowerColor::Red);
        let near = f.enemy(200.0, 10.0, 1000.0, TowerColor::Red);
        let off_line = f.enemy(300.0, 200.0, 1000.0, TowerColor::Red);
        let behind = f.enemy(-200.0, 0.0, 1000.0, TowerColor::Red);

        let len = resolve_beam(
            &mut f.store,
            &mut f.ledger,
            &mut f.bus,
            &f.config,
            DVec2::ZERO,
            0.0,
            30.0,
            TowerColor::Red,
        );
        assert!((len - 424.0).abs() < 1e-9, "furthest hit 400 + padding 24");
        assert_eq!(f.health(near), 970.0);
        assert_eq!(f.health(far), 970.0);
        assert_eq!(f.health(off_line), 1000.0);
        assert_eq!(f.health(behind), 1000.0);
    }

    #[test]
    fn test_railgun_kills_in_distance_order() {
        let mut f = Fixture::new();
        f.config.weapons.railgun.beam_length = 400.0;
        // Spawned out of distance order so serial order alone cannot pass.
        let mid = f.enemy(150.0, 0.0, 10.0, TowerColor::Red);
        let far = f.enemy(300.0, 0.0, 10.0, TowerColor::Red);
        let near = f.enemy(50.0, 0.0, 10.0, TowerColor::Red);
        let serial = |f: &Fixture, e: Entity| f.store.world().get::<&EnemyInfo>(e).unwrap().serial;
        let expected = vec![serial(&f, near), serial(&f, mid), serial(&f, far)];

        let len = resolve_beam(
            &mut f.store,
            &mut f.ledger,
            &mut f.bus,
            &f.config,
            DVec2::ZERO,
            0.0,
            30.0,
            TowerColor::Red,
        );

        let killed: Vec<u64> = f
            .bus
            .events()
            .iter()
            .filter_map(|ev| match ev {
                DomainEvent::EnemyKilled { serial, .. } => Some(*serial),
                _ => None,
            })
            .collect();
        assert_eq!(killed, expected);
        assert!(len > 300.0 && len <= 400.0, "beam trimmed past the furthest hit, got {len}");
    }

    #[test]
    fn test_railgun_miss_keeps_full_length() {
        let mut f = Fixture::new();
        f.enemy(0.0, 500.0, 10.0, TowerColor::Red);
        let len = resolve_beam(
            &mut f.store,
            &mut f.ledger,
            &mut f.bus,
            &f.config,
            DVec2::ZERO,
            0.0,
            30.0,
            TowerColor::Red,
        );
        assert_eq!(len, 1400.0);
    }

    #[test]
    fn test_rocket_splashes_everything_in_radius() {
        let mut f = Fixture::new();
        let a = f.enemy(0.0, 0.0, 500.0, TowerColor::Red);
        // Splash reach from the impact point = 90 + 0.35 * 80 = 118.
        let b = f.enemy(70.0, 0.0, 500.0, TowerColor::Red);
        let c = f.enemy(80.0, 0.0, 500.0, TowerColor::Red);
        f.store.spawn_projectile(
            DVec2::new(-45.0, 0.0),
            DVec2::ZERO,
            Projectile {
                kind: ProjectileKind::Rocket {
                    explosion_radius: 90.0,
                },
                damage: 84.0,
                color: TowerColor::Red,
                hit_radius: 14.0,
            },
        );
        resolve_projectiles(&mut f.store, &mut f.ledger, &mut f.bus, &f.config);
        assert_eq!(f.health(a), 416.0);
        assert_eq!(f.health(b), 416.0);
        assert_eq!(f.health(c), 500.0);
    }

    #[test]
    fn test_rocket_detonates_on_proximity_without_contact() {
        let mut f = Fixture::new();
        let e = f.enemy(0.0, 0.0, 500.0, TowerColor::Blue);
        // 80px from center is far outside the 14px contact radius but inside
        // the 118px splash reach.
        let rocket = f.store.spawn_projectile(
            DVec2::new(80.0, 0.0),
            DVec2::ZERO,
            Projectile {
                kind: ProjectileKind::Rocket {
                    explosion_radius: 90.0,
                },
                damage: 100.0,
                color: TowerColor::Blue,
                hit_radius: 14.0,
            },
        );
        resolve_projectiles(&mut f.store, &mut f.ledger, &mut f.bus, &f.config);
        assert_eq!(f.health(e), 400.0);
        assert!(f.store.is_queued(rocket), "rocket consumed by the blast");
    }

    #[test]
    fn test_rocket_out_of_reach_keeps_flying() {
        let mut f = Fixture::new();
        let e = f.enemy(0.0, 0.0, 500.0, TowerColor::Blue);
        let rocket = f.store.spawn_projectile(
            DVec2::new(119.0, 0.0),
            DVec2::ZERO,
            Projectile {
                kind: ProjectileKind::Rocket {
                    explosion_radius: 90.0,
                },
                damage: 100.0,
                color: TowerColor::Blue,
                hit_radius: 14.0,
            },
        );
        resolve_projectiles(&mut f.store, &mut f.ledger, &mut f.bus, &f.config);
        assert_eq!(f.health(e), 500.0);
        assert!(!f.store.is_queued(rocket));
    }

    #[test]
    fn test_splash_reach_grows_with_enemy_size() {
        let small = Rect::new(DVec2::ZERO, DVec2::splat(10.0));
        let large = Rect::new(DVec2::ZERO, DVec2::splat(50.0));
        // 40 + 0.35 * 20 = 47 vs 40 + 0.35 * 100 = 75
        assert!(!in_splash_reach(DVec2::new(60.0, 0.0), 40.0, &small));
        assert!(in_splash_reach(DVec2::new(60.0, 0.0), 40.0, &large));
    }

    #[test]
    fn test_projectile_hits_earliest_enemy_only() {
        let mut f = Fixture::new();
        let first = f.enemy(0.0, 0.0, 100.0, TowerColor::Blue);
        let second = f.enemy(5.0, 0.0, 100.0, TowerColor::Blue);
        let shot = f.store.spawn_projectile(
            DVec2::new(2.0, 0.0),
            DVec2::ZERO,
            Projectile {
                kind: ProjectileKind::Standard,
                damage: 8.0,
                color: TowerColor::Blue,
                hit_radius: 18.0,
            },
        );
        resolve_projectiles(&mut f.store, &mut f.ledger, &mut f.bus, &f.config);
        assert_eq!(f.health(first), 92.0);
        assert_eq!(f.health(second), 100.0);
        assert!(f.store.is_queued(shot), "projectile consumed");
    }
}

//! Weapon firing by tower level.

use glam::DVec2;
use rand::Rng;

use chroma_core::components::{Beam, Projectile, ProjectileKind, Tower};
use chroma_core::config::GameConfig;
use chroma_core::enums::WeaponVariant;
use chroma_core::events::AudioCue;
use chroma_core::types::Velocity;

use crate::bus::EventBus;
use crate::collision;
use crate::economy::EconomyLedger;
use crate::store::EntityStore;

/// Fire `tower` from `origin` at `target`. Railgun damage resolves
/// immediately; every other variant launches projectiles.
#[allow(clippy::too_many_arguments)]
pub fn fire<R: Rng + ?Sized>(
    tower: &Tower,
    origin: DVec2,
    target: DVec2,
    store: &mut EntityStore,
    ledger: &mut EconomyLedger,
    bus: &mut EventBus,
    config: &GameConfig,
    rng: &mut R,
) {
    let d = target - origin;
    let angle = d.y.atan2(d.x);
    let stats = &tower.stats;
    let weapons = &config.weapons;

    match stats.weapon {
        WeaponVariant::Standard => {
            store.spawn_projectile(
                origin,
                Velocity::from_angle(angle, config.projectiles.speed).0,
                Projectile {
                    kind: ProjectileKind::Standard,
                    damage: stats.damage,
                    color: tower.color,
                    hit_radius: stats.projectile_radius,
                },
            );
        }
        WeaponVariant::Minigun => {
            let mg = &weapons.minigun;
            let speed = config.projectiles.speed * mg.speed_factor;
            let damage = stats.damage / f64::from(mg.burst_count);
            for _ in 0..mg.burst_count {
                let jitter = rng.gen_range(-mg.spread..=mg.spread);
                store.spawn_projectile(
                    origin,
                    Velocity::from_angle(angle + jitter, speed).0,
                    Projectile {
                        kind: ProjectileKind::MinigunBullet,
                        damage,
                        color: tower.color,
                        hit_radius: stats.projectile_radius * mg.radius_factor,
                    },
                );
            }
        }
        WeaponVariant::Railgun => {
            let length = collision::resolve_beam(
                store,
                ledger,
                bus,
                config,
                origin,
                angle,
                stats.damage,
                tower.color,
            );
            store.spawn_beam(Beam {
                origin,
                angle,
                length,
                color: tower.color,
                remaining_secs: weapons.railgun.beam_lifetime,
            });
        }
        WeaponVariant::Rocket => {
            let rocket = &weapons.rocket;
            store.spawn_projectile(
                origin,
                Velocity::from_angle(angle, rocket.speed).0,
                Projectile {
                    kind: ProjectileKind::Rocket {
                        explosion_radius: rocket.explosion_radius,
                    },
                    damage: stats.damage,
                    color: tower.color,
                    hit_radius: rocket.hit_radius,
                },
            );
        }
    }
    bus.cue(AudioCue::Fire {
        variant: stats.weapon,
    });
}

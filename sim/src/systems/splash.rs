//! Splash droplets thrown up where the pour stream meets the liquid.

use crate::color::Rgb;
use crate::components::*;
use crate::geometry::SpawnSite;
use crate::rng::SimRng;
use crate::systems::lifecycle::{release_particle, ParticleRegistry};
use bevy_ecs::prelude::*;

const SPLASH_GRAVITY: f32 = -0.0015;
const SPLASH_OPACITY_PER_LIFE: f32 = 0.7;

/// Spawn 2-4 droplets at the impact point, tinted with the liquid color.
/// Returns how many were spawned.
pub fn spawn_splash(
    commands: &mut Commands,
    registry: &mut ParticleRegistry,
    rng: &mut SimRng,
    site: &SpawnSite,
    tint: Rgb,
) -> u32 {
    let count = rng.spread(2.0, 3.0).floor() as u32;
    for _ in 0..count {
        let size = rng.spread(0.01, 0.025);
        let angle = rng.angle();
        let speed = rng.spread(0.01, 0.03);
        let splash = Splash {
            vx: angle.cos() * speed,
            vy: rng.spread(0.02, 0.04),
            vz: angle.sin() * speed,
            gravity: SPLASH_GRAVITY,
            life: 1.0,
            decay: rng.spread(0.02, 0.02),
        };

        let id = registry.allocate(ParticleKind::Splash);
        commands.spawn(SplashBundle::new(
            id,
            Position3::new(site.center_x, site.surface_y + 0.02, site.center_z),
            Appearance::new(size, SPLASH_OPACITY_PER_LIFE, tint),
            splash,
        ));
    }
    count
}

/// System that integrates droplets ballistically and shrinks/fades them with
/// their remaining life.
pub fn splash_update_system(
    mut commands: Commands,
    mut registry: ResMut<ParticleRegistry>,
    mut query: Query<(Entity, &ParticleId, &mut Position3, &mut Appearance, &mut Splash)>,
) {
    for (entity, id, mut pos, mut appearance, mut drop) in query.iter_mut() {
        pos.x += drop.vx;
        pos.y += drop.vy;
        pos.z += drop.vz;
        drop.vy += drop.gravity;
        drop.life -= drop.decay;

        let life = drop.life.max(0.0);
        appearance.opacity = life * SPLASH_OPACITY_PER_LIFE;
        appearance.set_uniform_scale(life);

        if drop.life <= 0.0 {
            release_particle(&mut commands, &mut registry, entity, *id, ParticleKind::Splash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::geometry::BeakerGeometry;
    use crate::ledger::BeakerContents;
    use crate::systems::lifecycle::count_particles;
    use bevy_ecs::system::RunSystemOnce;

    fn world_with_splash(bursts: usize) -> World {
        let mut contents = BeakerContents::new(350.0);
        let water = Catalog::standard().chemical("h2o").unwrap().clone();
        contents.record(&water, 100.0);
        let geometry = BeakerGeometry::new([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
        let site = SpawnSite::resolve(Some(&geometry), &contents).unwrap();

        let mut world = World::new();
        world.insert_resource(ParticleRegistry::default());
        world.insert_resource(SimRng::seeded(5));
        world
            .run_system_once(
                move |mut commands: Commands,
                      mut registry: ResMut<ParticleRegistry>,
                      mut rng: ResMut<SimRng>| {
                    for _ in 0..bursts {
                        let n = spawn_splash(&mut commands, &mut registry, &mut rng, &site, Rgb::WHITE);
                        assert!((2..=4).contains(&n));
                    }
                },
            )
            .unwrap();
        world
    }

    #[test]
    fn test_droplets_arc_and_fall() {
        let mut world = world_with_splash(1);
        let mut schedule = Schedule::default();
        schedule.add_systems(splash_update_system);
        schedule.run(&mut world);

        let mut query = world.query::<(&Splash, &Appearance)>();
        for (drop, appearance) in query.iter(&world) {
            assert!(drop.life < 1.0);
            assert!((appearance.scale[0] - drop.life).abs() < 1e-6);
            assert!(drop.vy < 0.06);
        }
    }

    #[test]
    fn test_droplet_life_strictly_decreases_and_ends_within_bounded_ticks() {
        let mut world = world_with_splash(10);
        let mut schedule = Schedule::default();
        schedule.add_systems(splash_update_system);

        let mut query = world.query::<(&ParticleId, &Splash)>();
        let mut lives: std::collections::HashMap<ParticleId, f32> =
            query.iter(&world).map(|(id, s)| (*id, s.life)).collect();

        for _ in 0..55 {
            schedule.run(&mut world);
            for (id, s) in query.iter(&world) {
                assert!(s.life < lives[id]);
                lives.insert(*id, s.life);
            }
        }
        assert_eq!(count_particles(&mut world, ParticleKind::Splash), 0);
        assert_eq!(world.resource::<ParticleRegistry>().live(), 0);
    }
}

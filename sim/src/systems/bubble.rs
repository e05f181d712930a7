//! Bubble spawning and rise/fade update.

use crate::color::Rgb;
use crate::components::*;
use crate::geometry::SpawnSite;
use crate::rng::SimRng;
use crate::systems::lifecycle::{release_particle, ParticleRegistry};
use bevy_ecs::prelude::*;

/// Opacity of a freshly spawned bubble.
const BUBBLE_OPACITY: f32 = 0.35;
/// Bubbles at or below this opacity are popped.
const POP_OPACITY: f32 = 0.01;
/// Lateral wobble per tick.
const WOBBLE_STEP: f32 = 0.0008;
/// Extra scale gained by the time a bubble reaches the surface.
const SURFACE_GROWTH: f32 = 0.3;

/// How a bubble was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    /// Small, slow bubble (pouring, heating, stirring, mild reactions).
    Gentle,
    /// Large, fast bubble from a violent reaction.
    Violent,
    /// Violent bubble with a 50% chance of being an extra large gas pocket.
    Gas,
}

/// Spawn one bubble somewhere in the lower part of the liquid column.
pub fn spawn_bubble(
    commands: &mut Commands,
    registry: &mut ParticleRegistry,
    rng: &mut SimRng,
    site: &SpawnSite,
    style: BubbleStyle,
) -> ParticleId {
    let violent = style != BubbleStyle::Gentle;
    let size = if violent {
        rng.spread(0.05, 0.1)
    } else {
        rng.spread(0.015, 0.06)
    };

    let (x, z) = site.random_disk_point(rng, 0.75);
    let y = site.floor_y + rng.unit() * site.level * site.beaker_height * 0.6;

    let mut bubble = Bubble {
        speed: if violent {
            rng.spread(0.02, 0.035)
        } else {
            rng.spread(0.004, 0.012)
        },
        max_y: site.surface_y + size * 0.5,
        floor_y: site.floor_y,
        phase: rng.angle(),
        wobble_rate: rng.spread(0.01, 0.025),
        base_scale: 1.0,
    };

    if style == BubbleStyle::Gas && rng.chance(0.5) {
        bubble.base_scale = rng.spread(1.5, 1.5);
        bubble.speed *= 1.5;
    }

    let id = registry.allocate(ParticleKind::Bubble);
    let appearance = Appearance::new(size, BUBBLE_OPACITY, Rgb::WHITE)
        .with_scale([bubble.base_scale; 3]);
    commands.spawn(BubbleBundle::new(id, Position3::new(x, y, z), appearance, bubble));
    id
}

/// System that raises bubbles, wobbles them, grows them toward the surface
/// and pops them once they arrive or fade out.
pub fn bubble_update_system(
    mut commands: Commands,
    mut registry: ResMut<ParticleRegistry>,
    mut query: Query<(Entity, &ParticleId, &mut Position3, &mut Appearance, &mut Bubble)>,
) {
    for (entity, id, mut pos, mut appearance, mut bubble) in query.iter_mut() {
        pos.y += bubble.speed;
        bubble.phase += bubble.wobble_rate;
        pos.x += bubble.phase.sin() * WOBBLE_STEP;
        pos.z += (bubble.phase * 0.7).cos() * WOBBLE_STEP;

        let progress = bubble.progress(pos.y);
        appearance.set_uniform_scale(bubble.base_scale * (1.0 + progress * SURFACE_GROWTH));
        appearance.opacity = BUBBLE_OPACITY * (1.0 - progress * progress);

        if pos.y >= bubble.max_y || appearance.opacity <= POP_OPACITY {
            release_particle(&mut commands, &mut registry, entity, *id, ParticleKind::Bubble);
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

    fn site() -> SpawnSite {
        let mut contents = BeakerContents::new(350.0);
        let water = Catalog::standard().chemical("h2o").unwrap().clone();
        contents.record(&water, 175.0);
        let geometry = BeakerGeometry::new([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
        SpawnSite::resolve(Some(&geometry), &contents).unwrap()
    }

    fn world_with_bubbles(count: usize, style: BubbleStyle) -> World {
        let mut world = World::new();
        world.insert_resource(ParticleRegistry::default());
        world.insert_resource(SimRng::seeded(9));
        let site = site();
        world
            .run_system_once(
                move |mut commands: Commands,
                      mut registry: ResMut<ParticleRegistry>,
                      mut rng: ResMut<SimRng>| {
                    for _ in 0..count {
                        spawn_bubble(&mut commands, &mut registry, &mut rng, &site, style);
                    }
                },
            )
            .unwrap();
        world
    }

    #[test]
    fn test_bubbles_spawn_inside_liquid() {
        let mut world = world_with_bubbles(50, BubbleStyle::Gentle);
        let site = site();
        let mut query = world.query::<(&Position3, &Bubble)>();
        assert_eq!(query.iter(&world).count(), 50);
        for (pos, bubble) in query.iter(&world) {
            assert!(pos.y >= site.floor_y);
            assert!(pos.y < bubble.max_y);
            assert!(bubble.speed >= 0.004 && bubble.speed < 0.016);
        }
    }

    #[test]
    fn test_bubble_rises_monotonically_until_popped() {
        let mut world = world_with_bubbles(1, BubbleStyle::Gentle);
        let mut schedule = Schedule::default();
        schedule.add_systems(bubble_update_system);

        let mut last_y = f32::MIN;
        for _ in 0..2000 {
            let mut query = world.query::<&Position3>();
            let Some(pos) = query.iter(&world).next().copied() else {
                break;
            };
            assert!(pos.y >= last_y);
            last_y = pos.y;
            schedule.run(&mut world);
        }

        assert_eq!(count_particles(&mut world, ParticleKind::Bubble), 0);
        let registry = world.resource::<ParticleRegistry>();
        assert_eq!(registry.live(), 0);
        assert_eq!(registry.pending_records(), 0);
    }

    #[test]
    fn test_violent_bubbles_are_bigger_and_faster() {
        let mut world = world_with_bubbles(30, BubbleStyle::Violent);
        let mut query = world.query::<(&Appearance, &Bubble)>();
        for (appearance, bubble) in query.iter(&world) {
            assert!(appearance.size >= 0.05);
            assert!(bubble.speed >= 0.02);
        }
    }

    #[test]
    fn test_gas_bursts_mix_in_large_fast_pockets() {
        let mut world = world_with_bubbles(60, BubbleStyle::Gas);
        let mut query = world.query::<(&Appearance, &Bubble)>();

        let mut pockets = 0;
        for (appearance, bubble) in query.iter(&world) {
            assert!(appearance.size >= 0.05);
            if bubble.base_scale > 1.0 {
                pockets += 1;
                assert!(bubble.base_scale >= 1.5 && bubble.base_scale <= 3.0);
                assert!(bubble.speed >= 0.029);
                assert_eq!(appearance.scale, [bubble.base_scale; 3]);
            } else {
                assert!(bubble.speed < 0.055);
            }
        }
        assert!(pockets > 0 && pockets < 60);
    }

    #[test]
    fn test_bubble_fades_with_progress() {
        let mut world = world_with_bubbles(20, BubbleStyle::Gentle);
        let mut schedule = Schedule::default();
        schedule.add_systems(bubble_update_system);
        schedule.run(&mut world);

        let mut query = world.query::<(&Position3, &Appearance, &Bubble)>();
        for (pos, appearance, bubble) in query.iter(&world) {
            let p = bubble.progress(pos.y);
            assert!((appearance.opacity - BUBBLE_OPACITY * (1.0 - p * p)).abs() < 1e-5);
            assert!(appearance.scale[0] >= 1.0);
        }
    }
}

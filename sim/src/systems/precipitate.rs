//! Precipitate flakes: spawn mid-column, sink, settle permanently.

use crate::color::Rgb;
use crate::components::*;
use crate::geometry::SpawnSite;
use crate::rng::SimRng;
use crate::systems::lifecycle::ParticleRegistry;
use bevy_ecs::prelude::*;

const PRECIPITATE_OPACITY: f32 = 0.85;
const WOBBLE_STEP: f32 = 0.0003;

/// Spawn `count` irregular flakes of `color` in the middle of the liquid.
pub fn spawn_precipitate(
    commands: &mut Commands,
    registry: &mut ParticleRegistry,
    rng: &mut SimRng,
    site: &SpawnSite,
    color: Rgb,
    count: u32,
) {
    let column = site.surface_y - site.floor_y;
    for _ in 0..count {
        let size = rng.spread(0.015, 0.04);
        let shape = [rng.spread(0.8, 0.6), rng.spread(0.5, 0.4), rng.spread(0.8, 0.6)];
        let (x, z) = site.random_disk_point(rng, 0.8);
        let y = (site.surface_y + site.floor_y) * 0.5 + rng.unit() * column * 0.5;
        // Never start below the resting height, so flakes only ever sink.
        let min_y = (site.floor_y + size + 0.01 + rng.unit() * 0.05).min(y);

        let precipitate = Precipitate {
            settle_speed: rng.spread(0.001, 0.003),
            min_y,
            wobble: rng.angle(),
            wobble_rate: rng.spread(0.005, 0.01),
            settled: false,
        };

        let id = registry.allocate(ParticleKind::Precipitate);
        let appearance = Appearance::new(size, PRECIPITATE_OPACITY, color).with_scale(shape);
        commands.spawn(PrecipitateBundle::new(
            id,
            Position3::new(x, y, z),
            appearance,
            precipitate,
        ));
    }
}

/// System that sinks unsettled flakes. Settled flakes are left untouched until
/// the beaker is cleared.
pub fn precipitate_update_system(mut query: Query<(&mut Position3, &mut Precipitate)>) {
    for (mut pos, mut flake) in query.iter_mut() {
        if flake.settled {
            continue;
        }

        pos.y -= flake.settle_speed;
        flake.wobble += flake.wobble_rate;
        pos.x += flake.wobble.sin() * WOBBLE_STEP;
        pos.z += (flake.wobble * 0.7).cos() * WOBBLE_STEP;

        if pos.y <= flake.min_y {
            pos.y = flake.min_y;
            flake.settled = true;
        }
    }
}

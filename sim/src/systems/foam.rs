//! Foam clusters pinned to the liquid surface.

use crate::color::Rgb;
use crate::components::*;
use crate::geometry::{BeakerGeometry, SpawnSite};
use crate::ledger::BeakerContents;
use crate::rng::SimRng;
use crate::systems::lifecycle::{release_particle, ParticleRegistry};
use bevy_ecs::prelude::*;

const FOAM_OPACITY_PER_LIFE: f32 = 0.6;
const FLOAT_OFFSET: f32 = 0.005;
const BOB_HEIGHT: f32 = 0.003;

/// Spawn `count` foam clusters scattered over the surface.
pub fn spawn_foam(
    commands: &mut Commands,
    registry: &mut ParticleRegistry,
    rng: &mut SimRng,
    site: &SpawnSite,
    count: u32,
) {
    for _ in 0..count {
        let size = rng.spread(0.01, 0.03);
        let (x, z) = site.random_disk_point(rng, 0.85);
        let foam = Foam {
            life: 1.0,
            decay: rng.spread(0.002, 0.004),
            drift_x: rng.centered(0.0004),
            drift_z: rng.centered(0.0004),
            bob_phase: rng.angle(),
            bob_rate: rng.spread(0.02, 0.02),
        };

        let id = registry.allocate(ParticleKind::Foam);
        let appearance = Appearance::new(size, rng.spread(0.5, 0.3), Rgb::WHITE)
            .with_scale([1.0, 0.5, 1.0]);
        commands.spawn(FoamBundle::new(
            id,
            Position3::new(x, site.surface_y + size * 0.3, z),
            appearance,
            foam,
        ));
    }
}

/// System that keeps foam on the (moving) surface, bobs and drifts it, and
/// removes it when its life runs out or the beaker is empty.
pub fn foam_update_system(
    mut commands: Commands,
    geometry: Option<Res<BeakerGeometry>>,
    contents: Res<BeakerContents>,
    mut registry: ResMut<ParticleRegistry>,
    mut query: Query<(Entity, &ParticleId, &mut Position3, &mut Appearance, &mut Foam)>,
) {
    let Some(geometry) = geometry else {
        return;
    };
    let surface_y = geometry.surface_y(contents.fill_fraction());
    let drained = contents.is_empty();

    for (entity, id, mut pos, mut appearance, mut foam) in query.iter_mut() {
        pos.y = surface_y + FLOAT_OFFSET + foam.bob_phase.sin() * BOB_HEIGHT;
        foam.bob_phase += foam.bob_rate;
        pos.x += foam.drift_x;
        pos.z += foam.drift_z;

        foam.life -= foam.decay;
        appearance.opacity = foam.life.max(0.0) * FOAM_OPACITY_PER_LIFE;

        if foam.life <= 0.0 || drained {
            release_particle(&mut commands, &mut registry, entity, *id, ParticleKind::Foam);
        }
    }
}

//! Particle lifecycle bookkeeping shared by all four particle families.
//!
//! The registry hands out ids on spawn and records releases on destruction, so
//! the renderer can create and free the graphical resources behind each
//! particle without ever holding an `Entity`.

use crate::components::*;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// A particle that was created or destroyed since the last drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub id: ParticleId,
    pub kind: ParticleKind,
}

/// Id allocator plus spawn/release journal.
///
/// A particle born and destroyed between two drains never reaches the
/// journal's consumer, so undrained records stay bounded by live particles
/// plus releases of already reported ones.
#[derive(Resource, Debug, Default)]
pub struct ParticleRegistry {
    next_id: u64,
    spawned: Vec<ParticleRecord>,
    released: Vec<ParticleRecord>,
    total_spawned: u64,
    total_released: u64,
}

impl ParticleRegistry {
    /// Reserve an id for a particle about to be spawned.
    pub fn allocate(&mut self, kind: ParticleKind) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        self.total_spawned += 1;
        self.spawned.push(ParticleRecord { id, kind });
        log::trace!("spawn {} #{}", kind.as_str(), id.0);
        id
    }

    /// Note that a particle's resources must be freed.
    pub fn release(&mut self, id: ParticleId, kind: ParticleKind) {
        self.total_released += 1;
        match self.spawned.iter().position(|r| r.id == id) {
            Some(index) => {
                self.spawned.remove(index);
            }
            None => self.released.push(ParticleRecord { id, kind }),
        }
        log::trace!("release {} #{}", kind.as_str(), id.0);
    }

    /// Records waiting for the next drain.
    pub fn pending_records(&self) -> usize {
        self.spawned.len() + self.released.len()
    }

    /// Particles spawned but not yet released.
    pub fn live(&self) -> u64 {
        self.total_spawned - self.total_released
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    pub fn drain_spawned(&mut self) -> Vec<ParticleRecord> {
        std::mem::take(&mut self.spawned)
    }

    pub fn drain_released(&mut self) -> Vec<ParticleRecord> {
        std::mem::take(&mut self.released)
    }
}

/// Destroy one particle from inside a system.
pub fn release_particle(
    commands: &mut Commands,
    registry: &mut ParticleRegistry,
    entity: Entity,
    id: ParticleId,
    kind: ParticleKind,
) {
    commands.entity(entity).despawn();
    registry.release(id, kind);
}

/// Synchronously destroy every live particle. Returns how many were removed.
pub fn despawn_all_particles(world: &mut World) -> usize {
    let mut query = world.query::<(Entity, &ParticleId, &ParticleKind)>();
    let doomed: Vec<_> = query
        .iter(world)
        .map(|(entity, id, kind)| (entity, *id, *kind))
        .collect();

    for &(entity, id, kind) in &doomed {
        world.despawn(entity);
        world.resource_mut::<ParticleRegistry>().release(id, kind);
    }
    doomed.len()
}

/// Number of live particles of one kind.
pub fn count_particles(world: &mut World, kind: ParticleKind) -> usize {
    let mut query = world.query::<&ParticleKind>();
    query.iter(world).filter(|k| **k == kind).count()
}

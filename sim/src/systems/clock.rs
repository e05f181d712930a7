//! Simulation clock resources.

use bevy_ecs::prelude::*;

/// Global simulation tick counter. Incremented before each fixed update.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Elapsed simulation seconds, the time input of the wave shader.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ElapsedTime(pub f32);

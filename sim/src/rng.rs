//! Seeded randomness shared by every system.

use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

/// Single source of randomness for the simulation.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.0.gen::<f32>()
    }

    /// Uniform angle in `[0, TAU)`.
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.unit() * TAU
    }

    /// `base + unit() * spread`.
    #[inline]
    pub fn spread(&mut self, base: f32, spread: f32) -> f32 {
        base + self.unit() * spread
    }

    /// Uniform in `[-half, half)`.
    #[inline]
    pub fn centered(&mut self, half: f32) -> f32 {
        (self.unit() - 0.5) * 2.0 * half
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(0)
    }
}

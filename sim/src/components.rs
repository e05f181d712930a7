//! ECS components for the beaker simulation.
//!
//! Every particle is an entity carrying the shared components (`ParticleId`,
//! `ParticleKind`, `Position3`, `Appearance`) plus exactly one per-kind
//! parameter component. All logic lives in the systems that query them.

use crate::color::Rgb;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SHARED PARTICLE COMPONENTS
// ============================================================================

/// Stable identifier handed to the renderer so it can allocate and free the
/// graphical resources that back a particle.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

/// Which family a particle belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    Bubble,
    Precipitate,
    Foam,
    Splash,
}

impl ParticleKind {
    pub const ALL: [ParticleKind; 4] = [
        ParticleKind::Bubble,
        ParticleKind::Precipitate,
        ParticleKind::Foam,
        ParticleKind::Splash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticleKind::Bubble => "Bubble",
            ParticleKind::Precipitate => "Precipitate",
            ParticleKind::Foam => "Foam",
            ParticleKind::Splash => "Splash",
        }
    }
}

/// 3D world-space position (y is up).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Render hints: base radius, per-axis scale, opacity and tint.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub size: f32,
    pub scale: [f32; 3],
    pub opacity: f32,
    pub tint: Rgb,
}

impl Appearance {
    pub fn new(size: f32, opacity: f32, tint: Rgb) -> Self {
        Self {
            size,
            scale: [1.0; 3],
            opacity,
            tint,
        }
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = [s; 3];
    }
}

// ============================================================================
// PER-KIND PARAMETERS
// ============================================================================

/// Rising gas bubble.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bubble {
    /// Rise per tick.
    pub speed: f32,
    /// Height at which the bubble pops.
    pub max_y: f32,
    /// Beaker floor, the zero point for rise progress.
    pub floor_y: f32,
    pub phase: f32,
    pub wobble_rate: f32,
    /// Scale multiplier applied on top of the growth curve (large gas bubbles).
    pub base_scale: f32,
}

impl Bubble {
    /// Fraction of the way from the floor to the popping height.
    pub fn progress(&self, y: f32) -> f32 {
        let span = self.max_y - self.floor_y;
        if span <= 0.0 {
            1.0
        } else {
            ((y - self.floor_y) / span).max(0.0)
        }
    }
}

/// Solid flake sinking to the floor and staying there.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Precipitate {
    /// Sink per tick.
    pub settle_speed: f32,
    /// Resting height.
    pub min_y: f32,
    pub wobble: f32,
    pub wobble_rate: f32,
    pub settled: bool,
}

/// Foam cluster riding the liquid surface.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Foam {
    /// Remaining life in `0.0..=1.0`.
    pub life: f32,
    /// Life lost per tick.
    pub decay: f32,
    pub drift_x: f32,
    pub drift_z: f32,
    pub bob_phase: f32,
    pub bob_rate: f32,
}

/// Ballistic droplet thrown up where the pour stream hits the liquid.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Splash {
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    /// Change in `vy` per tick.
    pub gravity: f32,
    pub life: f32,
    pub decay: f32,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a bubble entity.
#[derive(Bundle)]
pub struct BubbleBundle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub position: Position3,
    pub appearance: Appearance,
    pub bubble: Bubble,
}

impl BubbleBundle {
    pub fn new(id: ParticleId, position: Position3, appearance: Appearance, bubble: Bubble) -> Self {
        Self {
            id,
            kind: ParticleKind::Bubble,
            position,
            appearance,
            bubble,
        }
    }
}

/// Bundle for spawning a precipitate flake.
#[derive(Bundle)]
pub struct PrecipitateBundle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub position: Position3,
    pub appearance: Appearance,
    pub precipitate: Precipitate,
}

impl PrecipitateBundle {
    pub fn new(
        id: ParticleId,
        position: Position3,
        appearance: Appearance,
        precipitate: Precipitate,
    ) -> Self {
        Self {
            id,
            kind: ParticleKind::Precipitate,
            position,
            appearance,
            precipitate,
        }
    }
}

/// Bundle for spawning a foam cluster.
#[derive(Bundle)]
pub struct FoamBundle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub position: Position3,
    pub appearance: Appearance,
    pub foam: Foam,
}

impl FoamBundle {
    pub fn new(id: ParticleId, position: Position3, appearance: Appearance, foam: Foam) -> Self {
        Self {
            id,
            kind: ParticleKind::Foam,
            position,
            appearance,
            foam,
        }
    }
}

/// Bundle for spawning a splash droplet.
#[derive(Bundle)]
pub struct SplashBundle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub position: Position3,
    pub appearance: Appearance,
    pub splash: Splash,
}

impl SplashBundle {
    pub fn new(id: ParticleId, position: Position3, appearance: Appearance, splash: Splash) -> Self {
        Self {
            id,
            kind: ParticleKind::Splash,
            position,
            appearance,
            splash,
        }
    }
}

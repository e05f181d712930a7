//! Stirring: a gentle rocking of the liquid body plus the odd bubble.

use crate::geometry::{BeakerGeometry, SpawnSite};
use crate::ledger::BeakerContents;
use crate::rng::SimRng;
use crate::systems::bubble::{spawn_bubble, BubbleStyle};
use crate::systems::lifecycle::ParticleRegistry;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

const STIR_ANGLE_STEP: f32 = 0.05;
const STIR_ROCK: f32 = 0.04;
const ROTATION_DECAY: f32 = 0.96;
const STIR_BUBBLE_CHANCE: f32 = 0.1;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StirState {
    pub active: bool,
    pub angle: f32,
    /// Rotation of the liquid body about the vertical axis, in radians.
    pub rotation: f32,
}

impl StirState {
    /// Flip stirring on or off. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    /// Stop the rocking motion; the on/off switch is left alone.
    pub fn settle(&mut self) {
        self.angle = 0.0;
        self.rotation = 0.0;
    }
}

pub fn stir_system(
    mut commands: Commands,
    geometry: Option<Res<BeakerGeometry>>,
    contents: Res<BeakerContents>,
    mut stir: ResMut<StirState>,
    mut registry: ResMut<ParticleRegistry>,
    mut rng: ResMut<SimRng>,
) {
    let Some(geometry) = geometry else {
        return;
    };

    if !stir.active || contents.is_empty() {
        stir.rotation *= ROTATION_DECAY;
        return;
    }

    stir.angle += STIR_ANGLE_STEP;
    stir.rotation = stir.angle.sin() * STIR_ROCK;

    if rng.chance(STIR_BUBBLE_CHANCE) {
        if let Some(site) = SpawnSite::resolve(Some(&*geometry), &contents) {
            spawn_bubble(&mut commands, &mut registry, &mut rng, &site, BubbleStyle::Gentle);
        }
    }
}

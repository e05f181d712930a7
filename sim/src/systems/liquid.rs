//! Liquid surface model and the eased display scalars of the liquid body.
//!
//! The renderer shapes the wave from four scalars (amplitude, ripple,
//! turbulence, fill level) plus elapsed time. Everything here is a
//! first-order filter: each tick moves a fixed fraction toward a target, or
//! decays geometrically toward zero.

use crate::color::Rgb;
use crate::geometry::BeakerGeometry;
use crate::ledger::{default_liquid_color, BeakerContents};
use crate::systems::pour::PourControl;
use crate::systems::stir::StirState;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

const AMPLITUDE_EASE: f32 = 0.05;
const IDLE_AMPLITUDE: f32 = 0.008;
const IDLE_LEVEL: f32 = 0.01;
const POUR_AMPLITUDE: f32 = 0.02;
const STIR_AMPLITUDE: f32 = 0.03;

const RIPPLE_STEP: f32 = 0.02;
const RIPPLE_PER_SPEED: f32 = 0.06;
const RIPPLE_DECAY: f32 = 0.96;

const TURBULENCE_STEP: f32 = 0.015;
const TURBULENCE_STIR_CEILING: f32 = 0.08;
const TURBULENCE_DECAY: f32 = 0.97;
const TURBULENCE_REACTION_CEILING: f32 = 0.15;

/// Per-tick decay of a reaction's amplitude kick.
const KICK_DECAY: f32 = 0.98;
const KICK_FLOOR: f32 = 1e-4;

const FILL_EASE: f32 = 0.08;
const MIN_FILL_SCALE: f32 = 0.001;
const COLOR_EASE: f32 = 0.06;
const OPACITY_EASE: f32 = 0.06;
const TOP_OPACITY_BOOST: f32 = 0.2;
const TOP_OPACITY_MAX: f32 = 0.92;

/// What drives the surface this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceDrive {
    pub level: f32,
    pub pouring: bool,
    pub pour_speed: f32,
    pub stirring: bool,
    pub has_volume: bool,
}

/// Wave channels fed to the surface shader.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceState {
    pub amplitude: f32,
    pub target_amplitude: f32,
    pub ripple: f32,
    pub turbulence: f32,
    /// Extra target amplitude left by the last reaction, fading per tick.
    #[serde(skip)]
    kick: f32,
}

impl SurfaceState {
    pub fn update(&mut self, drive: SurfaceDrive) {
        let mut target = if drive.level > IDLE_LEVEL {
            IDLE_AMPLITUDE
        } else {
            0.0
        };

        if drive.pouring {
            self.ripple = (self.ripple + RIPPLE_STEP).min(RIPPLE_PER_SPEED * drive.pour_speed);
            target = POUR_AMPLITUDE;
        } else {
            self.ripple *= RIPPLE_DECAY;
        }

        if drive.stirring && drive.has_volume {
            self.turbulence = (self.turbulence + TURBULENCE_STEP).min(TURBULENCE_STIR_CEILING);
            target = STIR_AMPLITUDE;
        } else {
            self.turbulence *= TURBULENCE_DECAY;
        }

        self.kick *= KICK_DECAY;
        if self.kick < KICK_FLOOR {
            self.kick = 0.0;
        }

        self.target_amplitude = target.max(self.kick);
        self.amplitude += (self.target_amplitude - self.amplitude) * AMPLITUDE_EASE;
    }

    /// Instantaneous agitation from a reaction.
    pub fn bump_for_reaction(&mut self, violent: bool) {
        let (turbulence, kick) = if violent { (0.12, 0.05) } else { (0.05, 0.025) };
        self.turbulence = (self.turbulence + turbulence).min(TURBULENCE_REACTION_CEILING);
        self.kick = self.kick.max(kick);
        self.target_amplitude = self.target_amplitude.max(self.kick);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Eased display state of the liquid mesh.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidBody {
    /// Vertical scale of the liquid column, `0.001..=1`.
    pub fill_scale: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub top_opacity: f32,
    pub transmission: f32,
    /// World-space height of the eased surface.
    pub surface_y: f32,
    pub radius: f32,
}

impl Default for LiquidBody {
    fn default() -> Self {
        Self {
            fill_scale: MIN_FILL_SCALE,
            color: default_liquid_color(),
            opacity: 0.0,
            top_opacity: 0.0,
            transmission: 0.7,
            surface_y: 0.0,
            radius: 0.0,
        }
    }
}

impl LiquidBody {
    pub fn update(&mut self, geometry: &BeakerGeometry, contents: &BeakerContents) {
        let level = contents.fill_fraction();
        self.fill_scale += (level.max(MIN_FILL_SCALE) - self.fill_scale) * FILL_EASE;

        if let Some(color) = contents.color() {
            self.color.lerp_toward(color, COLOR_EASE);
        }

        let target_opacity = contents.opacity() * (level * 3.0).min(1.0);
        self.opacity += (target_opacity - self.opacity) * OPACITY_EASE;
        let top_target = (target_opacity + TOP_OPACITY_BOOST).min(TOP_OPACITY_MAX);
        self.top_opacity += (top_target - self.top_opacity) * OPACITY_EASE;
        self.transmission = (0.7 - target_opacity * 0.5).max(0.1);

        self.surface_y = geometry.floor_y() + self.fill_scale * geometry.column_height();
        self.radius = geometry.liquid_radius();
    }

    /// Drained look after a clear. Color is kept so the next pour fades from it.
    pub fn reset(&mut self) {
        self.fill_scale = MIN_FILL_SCALE;
        self.opacity = 0.0;
        self.top_opacity = 0.0;
        self.surface_y = 0.0;
    }
}

/// System that advances the surface channels and, once the beaker has a
/// shape, eases the liquid body toward the ledger.
pub fn liquid_update_system(
    geometry: Option<Res<BeakerGeometry>>,
    contents: Res<BeakerContents>,
    control: Res<PourControl>,
    stir: Res<StirState>,
    mut surface: ResMut<SurfaceState>,
    mut body: ResMut<LiquidBody>,
) {
    surface.update(SurfaceDrive {
        level: contents.fill_fraction(),
        pouring: control.pouring,
        pour_speed: control.speed,
        stirring: stir.active,
        has_volume: !contents.is_empty(),
    });

    if let Some(geometry) = geometry {
        body.update(&geometry, &contents);
    }
}

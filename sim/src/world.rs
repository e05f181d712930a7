//! Snapshot types.
//!
//! A `Snapshot` is the serializable view of one moment of the simulation
//! that the rendering host consumes each frame.

use crate::color::Rgb;
use crate::components::*;
use crate::ledger::BeakerContents;
use crate::notifications::Notifications;
use crate::systems::{
    DeferredQueue, LiquidBody, ParticleRecord, ParticleRegistry, PourControl, PourStream,
    StirState, SurfaceState,
};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// One live particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub id: u64,
    pub kind: ParticleKind,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub size: f32,
    pub scale: [f32; 3],
    pub opacity: f32,
    pub color: Rgb,
}

/// One row of the content table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRow {
    pub chemical_id: String,
    pub formula: String,
    pub moles: f32,
    pub display_amount: String,
}

/// Ledger values plus the eased liquid body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidSnapshot {
    pub total_volume: f32,
    pub max_volume: f32,
    /// Target fill level, `total_volume / max_volume`.
    pub level: f32,
    /// Current ledger color; `None` until something is poured.
    pub color: Option<Rgb>,
    pub opacity: f32,
    pub ph: f32,
    pub temperature: f32,
    pub body: LiquidBody,
}

/// Pour gesture and stream state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PourSnapshot {
    pub selected: Option<String>,
    pub pouring: bool,
    pub speed: f32,
    pub stream: PourStream,
}

/// Complete simulation state snapshot for the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds (the wave shader's time input).
    pub time: f32,
    pub liquid: Option<LiquidSnapshot>,
    pub surface: SurfaceState,
    pub contents: Vec<ContentRow>,
    /// De-duplicated reaction descriptions, first seen first.
    pub reactions: Vec<String>,
    /// Messages raised since the previous snapshot.
    pub notifications: Vec<String>,
    /// Live particles ordered by id.
    pub particles: Vec<ParticleSnapshot>,
    /// Particles created since the previous snapshot.
    pub spawned: Vec<ParticleRecord>,
    /// Particles destroyed since the previous snapshot.
    pub released: Vec<ParticleRecord>,
    pub pour: Option<PourSnapshot>,
    pub stir_rotation: f32,
    pub pending_actions: usize,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    ///
    /// Drains the notification queue and the particle spawn/release journal.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut particles = Vec::new();
        let mut query = world.query::<(&ParticleId, &ParticleKind, &Position3, &Appearance)>();
        for (id, kind, pos, appearance) in query.iter(world) {
            particles.push(ParticleSnapshot {
                id: id.0,
                kind: *kind,
                x: pos.x,
                y: pos.y,
                z: pos.z,
                size: appearance.size,
                scale: appearance.scale,
                opacity: appearance.opacity,
                color: appearance.tint,
            });
        }
        particles.sort_by_key(|p| p.id);

        let liquid = world.get_resource::<BeakerContents>().map(|contents| {
            let body = world.get_resource::<LiquidBody>().copied().unwrap_or_default();
            LiquidSnapshot {
                total_volume: contents.total_volume(),
                max_volume: contents.max_volume(),
                level: contents.fill_fraction(),
                color: contents.color(),
                opacity: contents.opacity(),
                ph: contents.ph(),
                temperature: contents.temperature(),
                body,
            }
        });

        let (contents, reactions) = world
            .get_resource::<BeakerContents>()
            .map(|c| {
                let rows = c
                    .entries()
                    .iter()
                    .map(|e| ContentRow {
                        chemical_id: e.chemical_id.clone(),
                        formula: e.formula.clone(),
                        moles: e.moles(),
                        display_amount: e.display_amount(),
                    })
                    .collect();
                (rows, c.reactions().to_vec())
            })
            .unwrap_or_default();

        let pour = world.get_resource::<PourControl>().map(|control| PourSnapshot {
            selected: control.selected.clone(),
            pouring: control.pouring,
            speed: control.speed,
            stream: world.get_resource::<PourStream>().copied().unwrap_or_default(),
        });

        let surface = world.get_resource::<SurfaceState>().copied().unwrap_or_default();
        let stir_rotation = world.get_resource::<StirState>().map_or(0.0, |s| s.rotation);
        let pending_actions = world
            .get_resource::<DeferredQueue>()
            .map_or(0, |q| q.pending().len());

        let notifications = world
            .get_resource_mut::<Notifications>()
            .map(|mut n| n.drain())
            .unwrap_or_default();

        let (spawned, released) = world
            .get_resource_mut::<ParticleRegistry>()
            .map(|mut r| (r.drain_spawned(), r.drain_released()))
            .unwrap_or_default();

        Self {
            tick,
            time,
            liquid,
            surface,
            contents,
            reactions,
            notifications,
            particles,
            spawned,
            released,
            pour,
            stir_rotation,
            pending_actions,
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Live particles of one kind.
    pub fn particles_of(&self, kind: ParticleKind) -> impl Iterator<Item = &ParticleSnapshot> {
        self.particles.iter().filter(move |p| p.kind == kind)
    }
}

//! Public API for the simulation.
//!
//! `BeakerSim` is the interface a rendering host (or a test) uses to drive
//! the beaker: report geometry, forward user input, step time and read back
//! snapshots.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 60 Hz, one tick
//! per rendered frame). When `step(dt)` is called, the simulation accumulates
//! time and runs fixed updates as needed, so particle motion does not depend
//! on the host's frame rate.
//!
//! ## Input Handlers
//!
//! Input methods run synchronously between ticks. They mutate the ledger
//! directly; anything that spawns particles goes through the deferred queue
//! and appears on a later tick.

use crate::catalog::{Catalog, Chemical, ChemicalCategory};
use crate::components::ParticleKind;
use crate::config::BeakerConfig;
use crate::error::PourError;
use crate::geometry::BeakerGeometry;
use crate::ledger::BeakerContents;
use crate::notifications::{Notifications, MSG_CLEARED};
use crate::reaction::{resolve, MixOutcome, ReactionPlan};
use crate::rng::SimRng;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;

/// Chance that an add releases one ambient bubble.
const POUR_BUBBLE_CHANCE: f32 = 0.6;
/// Most fixed ticks a single `step` call will run.
pub const MAX_CATCHUP_TICKS: u32 = 10;
/// Bubbles released when heating past the boil threshold.
const BOIL_BUBBLES: u32 = 5;
/// Bubbles seeded when stirring starts, and their spacing in seconds.
const STIR_START_BUBBLES: u32 = 10;
const STIR_START_SPACING: f32 = 0.05;

/// The main simulation container.
///
/// Holds the ECS world and the frame schedule.
pub struct BeakerSim {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
}

impl BeakerSim {
    /// Create a simulation with the default config and the standard catalog.
    pub fn new() -> Self {
        Self::with_config(BeakerConfig::default())
    }

    pub fn with_config(config: BeakerConfig) -> Self {
        Self::with_catalog(config, Catalog::standard())
    }

    pub fn with_catalog(config: BeakerConfig, catalog: Catalog) -> Self {
        let mut world = World::new();

        // Clock
        world.insert_resource(SimTick(0));
        world.insert_resource(ElapsedTime(0.0));
        world.insert_resource(SimRng::seeded(config.rng_seed));

        // Beaker state
        world.insert_resource(BeakerContents::new(config.max_volume));
        world.insert_resource(SurfaceState::default());
        world.insert_resource(LiquidBody::default());
        world.insert_resource(PourControl::new(&config));
        world.insert_resource(PourStream::new(config.pour_origin_y));
        world.insert_resource(StirState::default());

        // Particles and effects
        world.insert_resource(DeferredQueue::default());
        world.insert_resource(ParticleRegistry::default());
        world.insert_resource(Notifications::default());

        world.insert_resource(catalog);
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                deferred_dispatch_system,
                liquid_update_system,
                bubble_update_system,
                splash_update_system,
                precipitate_update_system,
                foam_update_system,
                pour_stream_system,
                stir_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
        }
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    /// Report the beaker's world-space bounding box once its model is loaded.
    pub fn set_beaker_bounds(&mut self, min: [f32; 3], max: [f32; 3]) {
        self.world.insert_resource(BeakerGeometry::new(min, max));
    }

    pub fn geometry(&self) -> Option<&BeakerGeometry> {
        self.world.get_resource::<BeakerGeometry>()
    }

    /// Height of the burette tip the pour stream falls from.
    pub fn set_pour_origin(&mut self, y: f32) {
        self.world.resource_mut::<PourStream>().origin_y = y;
    }

    // ------------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------------

    /// Step the simulation forward by `dt` seconds.
    ///
    /// A stalled host frame catches up at most [`MAX_CATCHUP_TICKS`] ticks;
    /// the rest of the backlog is dropped. Negative or NaN `dt` is ignored.
    pub fn step(&mut self, dt: f32) {
        let fixed_dt = self.config().fixed_timestep;
        if fixed_dt <= 0.0 || !(dt > 0.0) {
            return;
        }

        self.time_accumulator += dt;
        let mut ticks = 0;
        while self.time_accumulator >= fixed_dt {
            if ticks == MAX_CATCHUP_TICKS {
                log::debug!("dropping {:.3}s of frame backlog", self.time_accumulator);
                self.time_accumulator = 0.0;
                break;
            }
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
            ticks += 1;
        }
    }

    /// Run exactly `ticks` fixed updates.
    pub fn advance_ticks(&mut self, ticks: u32) {
        let fixed_dt = self.config().fixed_timestep;
        for _ in 0..ticks {
            self.fixed_update(fixed_dt);
        }
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self, dt: f32) {
        self.world.resource_mut::<SimTick>().increment();
        self.world.resource_mut::<ElapsedTime>().0 = self.time + dt;

        self.repeat_pour(dt);
        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;
    }

    /// Held pour gesture: one more add every repeat interval.
    fn repeat_pour(&mut self, dt: f32) {
        let interval = self.config().pour_repeat_interval;
        let selected = {
            let mut control = self.world.resource_mut::<PourControl>();
            if !control.pouring {
                return;
            }
            control.repeat_elapsed += dt;
            if control.repeat_elapsed < interval {
                return;
            }
            control.repeat_elapsed -= interval;
            control.selected.clone()
        };

        if let Some(id) = selected {
            // Failures are already surfaced as notifications.
            let _ = self.add_chemical(&id);
        }
    }

    // ------------------------------------------------------------------------
    // Input events
    // ------------------------------------------------------------------------

    /// Load `id` into the burette.
    pub fn select_chemical(&mut self, id: &str) -> Result<(), PourError> {
        let category = self
            .catalog()
            .chemical(id)
            .map(|c| c.category)
            .ok_or_else(|| PourError::UnknownChemical(id.to_string()))?;
        let mut control = self.world.resource_mut::<PourControl>();
        control.selected = Some(id.to_string());
        control.category = category;
        Ok(())
    }

    /// Switch the shelf tab. Deselects the current chemical.
    pub fn select_category(&mut self, category: ChemicalCategory) {
        let mut control = self.world.resource_mut::<PourControl>();
        control.category = category;
        control.selected = None;
    }

    /// Chemicals on the active shelf tab.
    pub fn shelf(&self) -> Vec<&Chemical> {
        let category = self.world.resource::<PourControl>().category;
        self.catalog().chemicals_in(category).collect()
    }

    /// Start a press-and-hold pour at a normalized viewport position.
    ///
    /// Pours once immediately, then every repeat interval until `end_pour`.
    pub fn begin_pour(&mut self, x: f32, y: f32) -> Result<MixOutcome, PourError> {
        let selected = self.world.resource::<PourControl>().selected.clone();
        let Some(id) = selected else {
            return Err(self.reject(PourError::NoChemicalSelected));
        };
        if !self.config().in_interactive_region(x, y) {
            return Err(PourError::OutOfBounds);
        }

        {
            let mut control = self.world.resource_mut::<PourControl>();
            control.pouring = true;
            control.repeat_elapsed = 0.0;
        }
        self.add_chemical(&id)
    }

    /// Release the pour gesture. No add happens after this returns.
    pub fn end_pour(&mut self) {
        self.world.resource_mut::<PourControl>().stop();
    }

    /// Pour one dose of `id` into the beaker.
    pub fn add_chemical(&mut self, id: &str) -> Result<MixOutcome, PourError> {
        let chemical = self.catalog().chemical(id).cloned();
        let Some(chemical) = chemical else {
            return Err(self.reject(PourError::UnknownChemical(id.to_string())));
        };

        let requested = {
            let control = self.world.resource::<PourControl>();
            control.dose(self.config())
        };
        let added = match self.contents().admit(requested) {
            Ok(added) => added,
            Err(err) => return Err(self.reject(err)),
        };

        let hit = {
            let catalog = self.world.resource::<Catalog>();
            let contents = self.world.resource::<BeakerContents>();
            resolve(catalog, contents, &chemical.id)
                .map(|r| (r.partner.to_string(), r.effect.clone()))
        };

        let mut outcome = MixOutcome {
            chemical_id: chemical.id.clone(),
            added,
            reaction: None,
            violent: false,
        };

        match hit {
            Some((partner, effect)) => {
                let newly_logged = self.world.resource_mut::<BeakerContents>().apply_reaction(&effect);
                log::debug!(
                    "{} reacted with {}: {}{}",
                    chemical.id,
                    partner,
                    effect.description,
                    if newly_logged { "" } else { " (already logged)" }
                );

                let plan = ReactionPlan::for_effect(&effect);
                for burst in plan.bursts {
                    self.schedule_action(burst.delay, burst.action);
                }
                self.world.resource_mut::<SurfaceState>().bump_for_reaction(plan.violent);
                if let Some(message) = plan.notification {
                    log::info!("{}", message);
                    self.world.resource_mut::<Notifications>().push(message);
                }

                outcome.reaction = Some(effect.description);
                outcome.violent = plan.violent;
            }
            None => {
                self.world.resource_mut::<BeakerContents>().blend(&chemical, added);
                log::debug!("mixed {:.1} of {}", added, chemical.id);
            }
        }

        self.world.resource_mut::<BeakerContents>().record(&chemical, added);

        if self.world.resource_mut::<SimRng>().chance(POUR_BUBBLE_CHANCE) {
            self.schedule_action(0.0, DeferredAction::Bubble);
        }

        Ok(outcome)
    }

    /// Raise the pour speed one step. Returns the new speed.
    pub fn increase_pour_speed(&mut self) -> f32 {
        self.adjust_pour_speed(1.0)
    }

    /// Lower the pour speed one step. Returns the new speed.
    pub fn decrease_pour_speed(&mut self) -> f32 {
        self.adjust_pour_speed(-1.0)
    }

    fn adjust_pour_speed(&mut self, steps: f32) -> f32 {
        let config = self.config().clone();
        self.world.resource_mut::<PourControl>().adjust_speed(&config, steps)
    }

    /// Heat one step. Past the boil threshold a few bubbles rise.
    /// Returns the new temperature.
    pub fn heat_up(&mut self) -> f32 {
        let (step, threshold) = {
            let config = self.config();
            (config.heat_step, config.boil_bubble_threshold)
        };
        let (temperature, has_volume) = {
            let mut contents = self.world.resource_mut::<BeakerContents>();
            contents.raise_temperature(step);
            (contents.temperature(), !contents.is_empty())
        };

        if temperature > threshold && has_volume {
            for _ in 0..BOIL_BUBBLES {
                self.schedule_action(0.0, DeferredAction::Bubble);
            }
        }
        temperature
    }

    /// Cool one step. Returns the new temperature.
    pub fn heat_down(&mut self) -> f32 {
        let step = self.config().heat_step;
        let mut contents = self.world.resource_mut::<BeakerContents>();
        contents.raise_temperature(-step);
        contents.temperature()
    }

    /// Start or stop stirring. Returns whether stirring is now on.
    pub fn toggle_stir(&mut self) -> bool {
        let active = self.world.resource_mut::<StirState>().toggle();
        if active && !self.contents().is_empty() {
            for i in 0..STIR_START_BUBBLES {
                self.schedule_action(i as f32 * STIR_START_SPACING, DeferredAction::Bubble);
            }
        }
        active
    }

    /// Empty the beaker and return every channel to idle.
    ///
    /// Particles are released synchronously; spawns still queued from before
    /// the clear are dropped when they come due.
    pub fn clear(&mut self) {
        self.world.resource_mut::<BeakerContents>().clear();
        {
            let mut control = self.world.resource_mut::<PourControl>();
            control.selected = None;
            control.stop();
        }

        let removed = despawn_all_particles(&mut self.world);

        self.world.resource_mut::<SurfaceState>().reset();
        self.world.resource_mut::<LiquidBody>().reset();
        self.world.resource_mut::<StirState>().settle();
        self.world.resource_mut::<DeferredQueue>().advance_generation();
        self.world.resource_mut::<Notifications>().push(MSG_CLEARED);

        log::info!("beaker cleared ({} particles released)", removed);
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Get a snapshot of the current simulation state.
    ///
    /// Drains pending notifications and the particle spawn/release journal.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    pub fn contents(&self) -> &BeakerContents {
        self.world.resource::<BeakerContents>()
    }

    pub fn surface(&self) -> &SurfaceState {
        self.world.resource::<SurfaceState>()
    }

    pub fn liquid(&self) -> &LiquidBody {
        self.world.resource::<LiquidBody>()
    }

    pub fn pour_stream(&self) -> &PourStream {
        self.world.resource::<PourStream>()
    }

    pub fn pour_control(&self) -> &PourControl {
        self.world.resource::<PourControl>()
    }

    pub fn stir(&self) -> &StirState {
        self.world.resource::<StirState>()
    }

    pub fn catalog(&self) -> &Catalog {
        self.world.resource::<Catalog>()
    }

    pub fn config(&self) -> &BeakerConfig {
        self.world.resource::<BeakerConfig>()
    }

    /// Messages not yet taken by a snapshot.
    pub fn notifications(&self) -> &Notifications {
        self.world.resource::<Notifications>()
    }

    /// Deferred actions still waiting to fire.
    pub fn pending_actions(&self) -> Vec<&DeferredAction> {
        self.world.resource::<DeferredQueue>().pending()
    }

    pub fn particle_count(&mut self, kind: ParticleKind) -> usize {
        count_particles(&mut self.world, kind)
    }

    pub fn total_particles(&mut self) -> usize {
        ParticleKind::ALL
            .iter()
            .map(|&kind| count_particles(&mut self.world, kind))
            .sum()
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Get a reference to the underlying ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get a mutable reference to the underlying ECS world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn schedule_action(&mut self, delay_secs: f32, action: DeferredAction) {
        let now = self.world.resource::<SimTick>().0;
        let delay = self.config().ticks_for(delay_secs);
        self.world.resource_mut::<DeferredQueue>().schedule(now, delay, action);
    }

    /// Surface a user-facing failure as a notification and hand it back.
    fn reject(&mut self, err: PourError) -> PourError {
        log::debug!("pour rejected: {}", err);
        if err.is_user_facing() {
            self.world.resource_mut::<Notifications>().push(err.to_string());
        }
        err
    }
}

impl Default for BeakerSim {
    fn default() -> Self {
        Self::new()
    }
}

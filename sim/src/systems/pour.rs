//! Pour gesture state and the falling stream between burette and liquid.

use crate::catalog::{Catalog, ChemicalCategory};
use crate::color::Rgb;
use crate::config::BeakerConfig;
use crate::geometry::{BeakerGeometry, SpawnSite};
use crate::ledger::{default_liquid_color, BeakerContents};
use crate::rng::SimRng;
use crate::systems::clock::ElapsedTime;
use crate::systems::lifecycle::ParticleRegistry;
use crate::systems::splash::spawn_splash;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Stream surface height used before the beaker geometry is known.
const FALLBACK_SURFACE_Y: f32 = 0.3;
const STREAM_TOP_OFFSET: f32 = 0.1;
const STREAM_FLOOR_OFFSET: f32 = 0.05;
const MIN_STREAM_LENGTH: f32 = 0.05;
const SWAY_RATE: f32 = 6.0;
const SWAY_WIDTH: f32 = 0.003;
const STREAM_OPACITY: f32 = 0.8;
const STREAM_COLOR_EASE: f32 = 0.15;
const STREAM_OPACITY_EASE: f32 = 0.12;
const STREAM_FADE: f32 = 0.8;
const STREAM_HIDE_OPACITY: f32 = 0.01;
const SPLASH_CHANCE: f32 = 0.4;

/// User-controlled pouring state.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PourControl {
    /// Id of the chemical in the burette.
    pub selected: Option<String>,
    pub category: ChemicalCategory,
    pub pouring: bool,
    /// Pour speed multiplier.
    pub speed: f32,
    /// Seconds since the last repeated add while the gesture is held.
    pub repeat_elapsed: f32,
}

impl PourControl {
    pub fn new(config: &BeakerConfig) -> Self {
        Self {
            selected: None,
            category: ChemicalCategory::Water,
            pouring: false,
            speed: config.pour_speed_default,
            repeat_elapsed: 0.0,
        }
    }

    /// Step the speed by `steps` increments, staying inside the configured
    /// range. Returns the new speed.
    pub fn adjust_speed(&mut self, config: &BeakerConfig, steps: f32) -> f32 {
        self.speed = (self.speed + steps * config.pour_speed_step)
            .clamp(config.pour_speed_min, config.pour_speed_max);
        self.speed
    }

    /// Volume one add would pour at the current speed.
    pub fn dose(&self, config: &BeakerConfig) -> f32 {
        config.pour_rate * self.speed
    }

    pub fn stop(&mut self) {
        self.pouring = false;
        self.repeat_elapsed = 0.0;
    }
}

impl Default for PourControl {
    fn default() -> Self {
        Self::new(&BeakerConfig::default())
    }
}

/// Render state of the liquid stream.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PourStream {
    pub visible: bool,
    /// World-space height of the burette tip.
    pub origin_y: f32,
    pub length: f32,
    pub center_y: f32,
    pub sway_x: f32,
    pub opacity: f32,
    pub color: Rgb,
}

impl PourStream {
    pub fn new(origin_y: f32) -> Self {
        Self {
            visible: false,
            origin_y,
            length: 0.0,
            center_y: origin_y,
            sway_x: 0.0,
            opacity: 0.0,
            color: default_liquid_color(),
        }
    }

    fn fade(&mut self) {
        self.opacity *= STREAM_FADE;
        if self.opacity < STREAM_HIDE_OPACITY {
            self.visible = false;
            self.opacity = 0.0;
        }
    }
}

impl Default for PourStream {
    fn default() -> Self {
        Self::new(BeakerConfig::default().pour_origin_y)
    }
}

/// System that stretches the stream from the burette to the liquid while
/// pouring, throws splash droplets at the impact point, and fades the
/// stream out once the pour stops.
#[allow(clippy::too_many_arguments)]
pub fn pour_stream_system(
    mut commands: Commands,
    geometry: Option<Res<BeakerGeometry>>,
    contents: Res<BeakerContents>,
    catalog: Res<Catalog>,
    config: Res<BeakerConfig>,
    control: Res<PourControl>,
    elapsed: Res<ElapsedTime>,
    mut stream: ResMut<PourStream>,
    mut registry: ResMut<ParticleRegistry>,
    mut rng: ResMut<SimRng>,
) {
    let chemical = control
        .selected
        .as_deref()
        .and_then(|id| catalog.chemical(id));
    let Some(chemical) = chemical.filter(|_| control.pouring) else {
        stream.fade();
        return;
    };

    let (surface_y, floor_y) = match geometry.as_deref() {
        Some(g) => (g.surface_y(contents.fill_fraction()), g.floor_y()),
        None => (FALLBACK_SURFACE_Y, 0.0),
    };
    let top = stream.origin_y + STREAM_TOP_OFFSET;
    let bottom = surface_y.max(floor_y + STREAM_FLOOR_OFFSET);
    let length = top - bottom;

    stream.visible = true;
    if length <= MIN_STREAM_LENGTH {
        return;
    }

    stream.length = length;
    stream.center_y = bottom + length / 2.0;
    stream.sway_x = (elapsed.0 * SWAY_RATE).sin() * SWAY_WIDTH;
    stream.color.lerp_toward(chemical.color, STREAM_COLOR_EASE);
    stream.opacity += (STREAM_OPACITY - stream.opacity) * STREAM_OPACITY_EASE;

    if contents.total_volume() > config.splash_min_volume && rng.chance(SPLASH_CHANCE) {
        if let Some(site) = SpawnSite::resolve(geometry.as_deref(), &contents) {
            let tint = contents.color().unwrap_or_else(default_liquid_color);
            spawn_splash(&mut commands, &mut registry, &mut rng, &site, tint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ParticleKind;
    use crate::systems::lifecycle::count_particles;

    fn stream_world(volume: f32) -> World {
        let catalog = Catalog::standard();
        let mut contents = BeakerContents::new(350.0);
        if volume > 0.0 {
            let water = catalog.chemical("h2o").unwrap().clone();
            contents.blend(&water, volume);
            contents.record(&water, volume);
        }

        let config = BeakerConfig::default();
        let mut control = PourControl::new(&config);
        control.selected = Some("cocl2".to_string());
        control.pouring = true;

        let mut world = World::new();
        world.insert_resource(BeakerGeometry::new([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]));
        world.insert_resource(contents);
        world.insert_resource(catalog);
        world.insert_resource(PourStream::new(config.pour_origin_y));
        world.insert_resource(config);
        world.insert_resource(control);
        world.insert_resource(ElapsedTime(0.25));
        world.insert_resource(ParticleRegistry::default());
        world.insert_resource(SimRng::seeded(8));
        world
    }

    fn run(world: &mut World, ticks: usize) {
        let mut schedule = Schedule::default();
        schedule.add_systems(pour_stream_system);
        for _ in 0..ticks {
            schedule.run(world);
        }
    }

    #[test]
    fn test_speed_stays_in_range() {
        let config = BeakerConfig::default();
        let mut control = PourControl::new(&config);
        for _ in 0..20 {
            control.adjust_speed(&config, 1.0);
        }
        assert_eq!(control.speed, 5.0);
        assert_eq!(control.dose(&config), 50.0);
        for _ in 0..20 {
            control.adjust_speed(&config, -1.0);
        }
        assert_eq!(control.speed, 0.5);
    }

    #[test]
    fn test_stream_spans_burette_to_surface() {
        let mut world = stream_world(175.0);
        run(&mut world, 1);

        let stream = *world.resource::<PourStream>();
        let surface = 0.5 * 3.0 * 0.88;
        assert!(stream.visible);
        assert!((stream.length - (3.6 - surface)).abs() < 1e-4);
        assert!((stream.center_y - (surface + stream.length / 2.0)).abs() < 1e-4);
        assert!(stream.sway_x.abs() <= SWAY_WIDTH);
        assert!((stream.opacity - STREAM_OPACITY * STREAM_OPACITY_EASE).abs() < 1e-6);
    }

    #[test]
    fn test_stream_takes_chemical_color() {
        let mut world = stream_world(175.0);
        run(&mut world, 200);
        assert_eq!(world.resource::<PourStream>().color.to_hex(), "#ff5ca0");
        assert!(count_particles(&mut world, ParticleKind::Splash) > 0);
    }

    #[test]
    fn test_no_splash_into_shallow_liquid() {
        let mut world = stream_world(4.0);
        run(&mut world, 100);
        assert_eq!(count_particles(&mut world, ParticleKind::Splash), 0);
    }

    #[test]
    fn test_stream_fades_and_hides_after_release() {
        let mut world = stream_world(175.0);
        run(&mut world, 30);
        world.resource_mut::<PourControl>().stop();
        run(&mut world, 1);
        assert!(world.resource::<PourStream>().opacity < STREAM_OPACITY);
        run(&mut world, 40);

        let stream = world.resource::<PourStream>();
        assert!(!stream.visible);
        assert_eq!(stream.opacity, 0.0);
    }

    #[test]
    fn test_stream_without_geometry_uses_fallback_surface() {
        let mut world = stream_world(0.0);
        world.remove_resource::<BeakerGeometry>();
        run(&mut world, 1);
        let stream = world.resource::<PourStream>();
        assert!(stream.visible);
        assert!((stream.length - (3.6 - FALLBACK_SURFACE_Y)).abs() < 1e-5);
    }
}

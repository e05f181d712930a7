//! Simulation configuration.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Tunable parameters for the beaker simulation.
///
/// All per-tick easing constants assume `fixed_timestep`; changing it changes
/// how fast animations play, not their shape.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeakerConfig {
    /// Fixed timestep in seconds (e.g., 1/60 for 60 Hz).
    pub fixed_timestep: f32,
    /// Beaker capacity in volume units.
    pub max_volume: f32,
    /// Volume added per pour event at pour speed 1.0.
    pub pour_rate: f32,
    /// Seconds between repeated adds while a pour gesture is held.
    pub pour_repeat_interval: f32,
    pub pour_speed_default: f32,
    pub pour_speed_min: f32,
    pub pour_speed_max: f32,
    pub pour_speed_step: f32,
    /// Degrees added/removed per heat button press.
    pub heat_step: f32,
    /// Heating above this temperature (with liquid present) releases bubbles.
    pub boil_bubble_threshold: f32,
    /// Splash droplets need at least this much liquid to land in.
    pub splash_min_volume: f32,
    /// World-space height of the pour spout tip.
    pub pour_origin_y: f32,
    /// Normalized viewport region (min_x, min_y, max_x, max_y) that accepts pour gestures.
    pub interactive_region: (f32, f32, f32, f32),
    /// Seed for all particle randomness.
    pub rng_seed: u64,
}

impl Default for BeakerConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_volume: 350.0,
            pour_rate: 10.0,
            pour_repeat_interval: 0.15,
            pour_speed_default: 1.0,
            pour_speed_min: 0.5,
            pour_speed_max: 5.0,
            pour_speed_step: 0.5,
            heat_step: 10.0,
            boil_bubble_threshold: 80.0,
            splash_min_volume: 5.0,
            pour_origin_y: 3.5,
            interactive_region: (0.15, 0.1, 0.85, 0.9),
            rng_seed: 0x5eed_b0a7,
        }
    }
}

impl BeakerConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert a delay in seconds to a whole number of ticks (rounded).
    pub fn ticks_for(&self, seconds: f32) -> u64 {
        if self.fixed_timestep <= 0.0 {
            return 0;
        }
        (seconds / self.fixed_timestep).round().max(0.0) as u64
    }

    /// Whether a normalized gesture coordinate lies in the interactive region.
    pub fn in_interactive_region(&self, x: f32, y: f32) -> bool {
        let (min_x, min_y, max_x, max_y) = self.interactive_region;
        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BeakerConfig::from_json(r#"{"max_volume": 500.0, "rng_seed": 7}"#).unwrap();
        assert_eq!(config.max_volume, 500.0);
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.pour_rate, 10.0);
    }

    #[test]
    fn test_ticks_for_delay() {
        let config = BeakerConfig::default();
        assert_eq!(config.ticks_for(0.0), 0);
        assert_eq!(config.ticks_for(0.5), 30);
        assert_eq!(config.ticks_for(0.05), 3);
    }

    #[test]
    fn test_interactive_region_edges() {
        let config = BeakerConfig::default();
        assert!(config.in_interactive_region(0.5, 0.5));
        assert!(config.in_interactive_region(0.15, 0.9));
        assert!(!config.in_interactive_region(0.1, 0.5));
        assert!(!config.in_interactive_region(0.5, 0.95));
    }
}

//! Beaker geometry reported by the rendering host, and the spawn region
//! derived from it.

use crate::ledger::BeakerContents;
use crate::rng::SimRng;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Liquid cylinder radius as a fraction of the beaker's width.
const LIQUID_RADIUS_FRACTION: f32 = 0.39;
/// Radius particles may spawn in, as a fraction of the beaker's width.
const PARTICLE_RADIUS_FRACTION: f32 = 0.34;
/// Usable liquid column as a fraction of the beaker's height.
const COLUMN_HEIGHT_FRACTION: f32 = 0.88;

/// Axis-aligned bounding box of the beaker in world space.
///
/// Absent from the world until the host has loaded its beaker model; every
/// system that needs it treats its absence as "nothing to do".
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeakerGeometry {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BeakerGeometry {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    pub fn floor_y(&self) -> f32 {
        self.min[1]
    }

    pub fn center_x(&self) -> f32 {
        (self.min[0] + self.max[0]) / 2.0
    }

    pub fn center_z(&self) -> f32 {
        (self.min[2] + self.max[2]) / 2.0
    }

    pub fn liquid_radius(&self) -> f32 {
        self.width() * LIQUID_RADIUS_FRACTION
    }

    pub fn particle_radius(&self) -> f32 {
        self.width() * PARTICLE_RADIUS_FRACTION
    }

    /// Height of a completely full liquid column.
    pub fn column_height(&self) -> f32 {
        self.height() * COLUMN_HEIGHT_FRACTION
    }

    /// World-space height of the liquid surface at `level` (0..=1).
    pub fn surface_y(&self, level: f32) -> f32 {
        self.floor_y() + level * self.column_height()
    }
}

/// Snapshot of where particles may appear right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnSite {
    pub floor_y: f32,
    pub center_x: f32,
    pub center_z: f32,
    pub radius: f32,
    pub beaker_height: f32,
    pub level: f32,
    pub surface_y: f32,
}

impl SpawnSite {
    /// `None` when geometry is unknown or the beaker holds no liquid.
    pub fn resolve(geometry: Option<&BeakerGeometry>, contents: &BeakerContents) -> Option<Self> {
        let geometry = geometry?;
        if contents.is_empty() {
            return None;
        }
        let level = contents.fill_fraction();
        Some(Self {
            floor_y: geometry.floor_y(),
            center_x: geometry.center_x(),
            center_z: geometry.center_z(),
            radius: geometry.particle_radius(),
            beaker_height: geometry.height(),
            level,
            surface_y: geometry.surface_y(level),
        })
    }

    /// Random point in a disk of `fraction * radius` around the center axis.
    pub fn random_disk_point(&self, rng: &mut SimRng, fraction: f32) -> (f32, f32) {
        let angle = rng.angle();
        let r = rng.unit() * self.radius * fraction;
        (self.center_x + angle.cos() * r, self.center_z + angle.sin() * r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn geometry() -> BeakerGeometry {
        BeakerGeometry::new([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0])
    }

    #[test]
    fn test_derived_dimensions() {
        let g = geometry();
        assert!((g.liquid_radius() - 0.78).abs() < 1e-5);
        assert!((g.column_height() - 2.64).abs() < 1e-5);
        assert_eq!(g.surface_y(0.0), 0.0);
        assert!((g.surface_y(0.5) - 1.32).abs() < 1e-5);
    }

    #[test]
    fn test_spawn_site_requires_geometry_and_liquid() {
        let mut contents = BeakerContents::new(350.0);
        assert!(SpawnSite::resolve(Some(&geometry()), &contents).is_none());

        let water = Catalog::standard().chemical("h2o").unwrap().clone();
        contents.record(&water, 35.0);
        assert!(SpawnSite::resolve(None, &contents).is_none());

        let site = SpawnSite::resolve(Some(&geometry()), &contents).unwrap();
        assert!((site.level - 0.1).abs() < 1e-6);
        assert!(site.surface_y > site.floor_y);
    }

    #[test]
    fn test_disk_points_stay_inside_radius() {
        let mut contents = BeakerContents::new(350.0);
        let water = Catalog::standard().chemical("h2o").unwrap().clone();
        contents.record(&water, 100.0);
        let site = SpawnSite::resolve(Some(&geometry()), &contents).unwrap();
        let mut rng = SimRng::seeded(3);
        for _ in 0..200 {
            let (x, z) = site.random_disk_point(&mut rng, 0.75);
            assert!((x * x + z * z).sqrt() <= site.radius * 0.75 + 1e-5);
        }
    }
}

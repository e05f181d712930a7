//! Rendering Host Bridge
//!
//! Converts snapshots into flat `f32` arrays for hosts that would rather
//! upload contiguous buffers than walk JSON.
//!
//! # Particle Buffer Layout (Version 1.0)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ HEADER (1 element)                                              │
//! │ [0] particle_count (as f32)                                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ For each particle i (offset = 1 + i * PARTICLE_STRIDE):         │
//! │   [+0]  id       - Particle id (u64 as f32)                     │
//! │   [+1]  kind     - Kind (see KIND_* constants)                  │
//! │   [+2]  x                                                       │
//! │   [+3]  y                                                       │
//! │   [+4]  z                                                       │
//! │   [+5]  size     - Base radius                                  │
//! │   [+6]  scale_x                                                 │
//! │   [+7]  scale_y                                                 │
//! │   [+8]  scale_z                                                 │
//! │   [+9]  opacity                                                 │
//! │   [+10] r                                                       │
//! │   [+11] g                                                       │
//! │   [+12] b                                                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Particles are written in snapshot order (ascending id), so the same
//! snapshot always produces the same buffer.
//!
//! # Surface Uniforms
//!
//! `surface_uniforms` packs the wave shader inputs in this order: time,
//! amplitude, ripple, turbulence, fill scale, surface height, liquid radius,
//! stir rotation.

use crate::components::ParticleKind;
use crate::world::{ParticleSnapshot, Snapshot};

/// Number of f32 values per particle.
///
/// **Part of the host contract. Do not change without versioning.**
pub const PARTICLE_STRIDE: usize = 13;

/// Number of f32 values in the buffer header.
pub const HEADER_SIZE: usize = 1;

/// Number of f32 values returned by `surface_uniforms`.
pub const SURFACE_UNIFORMS: usize = 8;

pub const KIND_BUBBLE: f32 = 0.0;
pub const KIND_PRECIPITATE: f32 = 1.0;
pub const KIND_FOAM: f32 = 2.0;
pub const KIND_SPLASH: f32 = 3.0;

pub const FIELD_ID: usize = 0;
pub const FIELD_KIND: usize = 1;
pub const FIELD_X: usize = 2;
pub const FIELD_Y: usize = 3;
pub const FIELD_Z: usize = 4;
pub const FIELD_SIZE: usize = 5;
pub const FIELD_SCALE_X: usize = 6;
pub const FIELD_SCALE_Y: usize = 7;
pub const FIELD_SCALE_Z: usize = 8;
pub const FIELD_OPACITY: usize = 9;
pub const FIELD_R: usize = 10;
pub const FIELD_G: usize = 11;
pub const FIELD_B: usize = 12;

#[inline]
pub fn kind_to_id(kind: ParticleKind) -> f32 {
    match kind {
        ParticleKind::Bubble => KIND_BUBBLE,
        ParticleKind::Precipitate => KIND_PRECIPITATE,
        ParticleKind::Foam => KIND_FOAM,
        ParticleKind::Splash => KIND_SPLASH,
    }
}

fn push_particle(buffer: &mut Vec<f32>, p: &ParticleSnapshot) {
    buffer.push(p.id as f32);
    buffer.push(kind_to_id(p.kind));
    buffer.push(p.x);
    buffer.push(p.y);
    buffer.push(p.z);
    buffer.push(p.size);
    buffer.extend_from_slice(&p.scale);
    buffer.push(p.opacity);
    buffer.extend_from_slice(&p.color.to_array());
}

/// Pack every live particle of a snapshot into one flat buffer.
pub fn particles_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let count = snapshot.particles.len();
    let buffer_size = calculate_buffer_size(count);

    let mut buffer = Vec::with_capacity(buffer_size);
    buffer.push(count as f32);
    for particle in &snapshot.particles {
        push_particle(&mut buffer, particle);
    }

    debug_assert_eq!(buffer.len(), buffer_size, "Buffer size mismatch");
    buffer
}

/// Wave shader inputs for this snapshot.
pub fn surface_uniforms(snapshot: &Snapshot) -> [f32; SURFACE_UNIFORMS] {
    let (fill_scale, surface_y, radius) = snapshot
        .liquid
        .as_ref()
        .map_or((0.0, 0.0, 0.0), |l| (l.body.fill_scale, l.body.surface_y, l.body.radius));
    [
        snapshot.time,
        snapshot.surface.amplitude,
        snapshot.surface.ripple,
        snapshot.surface.turbulence,
        fill_scale,
        surface_y,
        radius,
        snapshot.stir_rotation,
    ]
}

#[inline]
pub fn calculate_buffer_size(particle_count: usize) -> usize {
    HEADER_SIZE + particle_count * PARTICLE_STRIDE
}

/// Particle count from a flat buffer, `None` if the buffer is empty.
#[inline]
pub fn parse_particle_count(buffer: &[f32]) -> Option<usize> {
    buffer.first().map(|&n| n as usize)
}

#[inline]
pub const fn particle_offset(index: usize) -> usize {
    HEADER_SIZE + index * PARTICLE_STRIDE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BeakerSim;

    #[test]
    fn test_empty_snapshot_is_just_a_header() {
        let mut sim = BeakerSim::new();
        let buffer = particles_to_flatbuffer(&sim.snapshot());
        assert_eq!(buffer, vec![0.0]);
    }

    #[test]
    fn test_buffer_matches_snapshot() {
        let mut sim = BeakerSim::new();
        sim.set_beaker_bounds([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
        sim.add_chemical("h2o").unwrap();
        sim.add_chemical("na").unwrap();
        sim.advance_ticks(10);

        let snapshot = sim.snapshot();
        let buffer = particles_to_flatbuffer(&snapshot);
        let count = parse_particle_count(&buffer).unwrap();
        assert!(count > 0);
        assert_eq!(buffer.len(), calculate_buffer_size(count));

        for (i, p) in snapshot.particles.iter().enumerate() {
            let offset = particle_offset(i);
            assert_eq!(buffer[offset + FIELD_ID], p.id as f32);
            assert_eq!(buffer[offset + FIELD_KIND], kind_to_id(p.kind));
            assert_eq!(buffer[offset + FIELD_Y], p.y);
            assert_eq!(buffer[offset + FIELD_SCALE_Y], p.scale[1]);
            assert_eq!(buffer[offset + FIELD_OPACITY], p.opacity);
            assert_eq!(buffer[offset + FIELD_B], p.color.b);
        }
    }

    #[test]
    fn test_surface_uniforms_follow_snapshot() {
        let mut sim = BeakerSim::new();
        sim.set_beaker_bounds([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
        sim.add_chemical("h2o").unwrap();
        sim.advance_ticks(30);

        let snapshot = sim.snapshot();
        let uniforms = surface_uniforms(&snapshot);
        assert_eq!(uniforms[0], snapshot.time);
        assert_eq!(uniforms[1], snapshot.surface.amplitude);
        assert!(uniforms[4] > 0.001);
        assert!((uniforms[6] - 0.78).abs() < 1e-5);
    }

    #[test]
    fn test_field_offsets_fit_stride() {
        assert_eq!(PARTICLE_STRIDE, FIELD_B + 1);
        assert_eq!(particle_offset(0), HEADER_SIZE);
        assert_eq!(particle_offset(3), HEADER_SIZE + 3 * PARTICLE_STRIDE);
        assert_eq!(parse_particle_count(&[]), None);
    }
}

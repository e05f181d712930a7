//! Serialization utilities for simulation state.

use crate::world::Snapshot;

/// Serialize a snapshot to JSON bytes.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// Serialize a snapshot to a JSON string.
pub fn snapshot_to_json_string(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Deserialize a snapshot from JSON bytes.
pub fn snapshot_from_json(data: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Deserialize a snapshot from a JSON string.
pub fn snapshot_from_json_string(data: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BeakerSim;
    use crate::components::ParticleKind;

    #[test]
    fn test_snapshot_roundtrip() {
        let mut sim = BeakerSim::new();
        sim.set_beaker_bounds([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]);
        sim.add_chemical("cuso4").unwrap();
        sim.add_chemical("naoh").unwrap();
        sim.advance_ticks(40);
        let snapshot = sim.snapshot();

        let json = snapshot_to_json_string(&snapshot).unwrap();
        let restored = snapshot_from_json_string(&json).unwrap();

        assert_eq!(restored.tick, 40);
        assert_eq!(restored.reactions, snapshot.reactions);
        assert_eq!(restored.contents, snapshot.contents);
        assert_eq!(
            restored.particles_of(ParticleKind::Precipitate).count(),
            snapshot.particles_of(ParticleKind::Precipitate).count()
        );
        let liquid = restored.liquid.unwrap();
        assert_eq!(liquid.color.map(|c| c.to_hex()), Some("#3399ee".to_string()));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(snapshot_from_json(b"not json").is_err());
    }
}

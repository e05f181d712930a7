//! Beaker content ledger: volume, composition and derived display scalars.
//!
//! ## Invariants
//! - `total_volume == sum(entry.amount)`
//! - `total_volume <= max_volume`
//! - `ph` is a volume-weighted linear blend, not a logarithmic mix. This is a
//!   visual approximation and is kept as such.

use crate::catalog::{Chemical, ReactionEffect};
use crate::color::Rgb;
use crate::error::PourError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Room temperature the beaker starts at and returns to on clear.
pub const AMBIENT_TEMPERATURE: f32 = 25.0;
/// Lowest reachable temperature.
pub const MIN_TEMPERATURE: f32 = 0.0;
/// Highest reachable temperature.
pub const MAX_TEMPERATURE: f32 = 200.0;
/// Opacity reported before anything is poured.
pub const DEFAULT_OPACITY: f32 = 0.4;
/// pH reported before anything is poured.
pub const NEUTRAL_PH: f32 = 7.0;
/// Color blended against when mixing into liquid that has no color yet.
pub const DEFAULT_LIQUID_HEX: &str = "#b8ddf0";

/// Volume units per molar-equivalent in the content table.
const VOLUME_PER_MOL: f32 = 50.0;
/// Volume units per gram shown for small amounts.
const VOLUME_PER_GRAM: f32 = 10.0;

/// Accumulated amount of one chemical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub chemical_id: String,
    pub formula: String,
    pub amount: f32,
}

impl ContentEntry {
    /// Molar-equivalent amount.
    pub fn moles(&self) -> f32 {
        self.amount / VOLUME_PER_MOL
    }

    /// Human-readable amount for the content table.
    pub fn display_amount(&self) -> String {
        if self.amount < VOLUME_PER_MOL {
            format!("{:.1}g", self.amount / VOLUME_PER_GRAM)
        } else {
            format!("{:.2} mol 100%", self.moles())
        }
    }
}

/// Mutable aggregate of everything in the beaker.
#[derive(Resource, Debug, Clone)]
pub struct BeakerContents {
    max_volume: f32,
    total_volume: f32,
    entries: Vec<ContentEntry>,
    color: Option<Rgb>,
    opacity: f32,
    ph: f32,
    temperature: f32,
    reactions: Vec<String>,
}

impl BeakerContents {
    pub fn new(max_volume: f32) -> Self {
        Self {
            max_volume,
            total_volume: 0.0,
            entries: Vec::new(),
            color: None,
            opacity: DEFAULT_OPACITY,
            ph: NEUTRAL_PH,
            temperature: AMBIENT_TEMPERATURE,
            reactions: Vec::new(),
        }
    }

    pub fn max_volume(&self) -> f32 {
        self.max_volume
    }

    pub fn total_volume(&self) -> f32 {
        self.total_volume
    }

    pub fn is_empty(&self) -> bool {
        self.total_volume <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.total_volume >= self.max_volume
    }

    /// Target fill level in `0.0..=1.0`.
    pub fn fill_fraction(&self) -> f32 {
        if self.max_volume <= 0.0 {
            0.0
        } else {
            (self.total_volume / self.max_volume).clamp(0.0, 1.0)
        }
    }

    pub fn entries(&self) -> &[ContentEntry] {
        &self.entries
    }

    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn ph(&self) -> f32 {
        self.ph
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// De-duplicated reaction log in first-seen order.
    pub fn reactions(&self) -> &[String] {
        &self.reactions
    }

    /// How much of `requested` fits. Rejects outright when already full.
    pub fn admit(&self, requested: f32) -> Result<f32, PourError> {
        if self.is_full() {
            return Err(PourError::CapacityExceeded);
        }
        Ok(requested.max(0.0).min(self.max_volume - self.total_volume))
    }

    /// Book `amount` of `chemical` into the ledger, merging repeated chemicals.
    pub fn record(&mut self, chemical: &Chemical, amount: f32) {
        let amount = amount.max(0.0).min(self.max_volume - self.total_volume);
        match self.entries.iter_mut().find(|e| e.chemical_id == chemical.id) {
            Some(entry) => entry.amount += amount,
            None => self.entries.push(ContentEntry {
                chemical_id: chemical.id.clone(),
                formula: chemical.formula.clone(),
                amount,
            }),
        }
        self.total_volume += amount;
    }

    /// Replace display scalars with a reaction's result and log it once.
    ///
    /// Returns `true` if the description was new to the log.
    pub fn apply_reaction(&mut self, effect: &ReactionEffect) -> bool {
        self.color = Some(effect.color);
        self.opacity = effect.opacity;
        self.ph = effect.ph;
        if let Some(heat) = effect.heat {
            self.raise_temperature(heat);
        }
        self.log_reaction(&effect.description)
    }

    /// Simple mixing for a non-reacting add of `added` volume.
    ///
    /// Into an empty beaker the chemical's own values are taken outright;
    /// otherwise everything blends by `added / (old + added)`.
    pub fn blend(&mut self, chemical: &Chemical, added: f32) {
        if self.is_empty() {
            self.color = Some(chemical.color);
            self.opacity = chemical.opacity;
            self.ph = chemical.ph.unwrap_or(NEUTRAL_PH);
            return;
        }
        let total = self.total_volume + added;
        if total <= 0.0 {
            return;
        }
        let ratio = added / total;
        let base = self.color.unwrap_or_else(default_liquid_color);
        self.color = Some(base.lerp(chemical.color, ratio));
        self.opacity = self.opacity * (1.0 - ratio) + chemical.opacity * ratio;
        if let Some(ph) = chemical.ph {
            self.ph = self.ph * (1.0 - ratio) + ph * ratio;
        }
    }

    /// Append to the reaction log unless already present.
    pub fn log_reaction(&mut self, description: &str) -> bool {
        if self.reactions.iter().any(|r| r == description) {
            return false;
        }
        self.reactions.push(description.to_string());
        true
    }

    /// Shift temperature by `delta`, clamped to the reachable range.
    pub fn raise_temperature(&mut self, delta: f32) {
        self.temperature = (self.temperature + delta).clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
    }

    /// Back to an empty beaker at room temperature.
    pub fn clear(&mut self) {
        *self = Self::new(self.max_volume);
    }
}

impl Default for BeakerContents {
    fn default() -> Self {
        Self::new(350.0)
    }
}

pub fn default_liquid_color() -> Rgb {
    Rgb::from_hex(DEFAULT_LIQUID_HEX).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn chemical(id: &str) -> Chemical {
        Catalog::standard().chemical(id).unwrap().clone()
    }

    #[test]
    fn test_first_pour_takes_chemical_values_outright() {
        let mut contents = BeakerContents::new(350.0);
        let cuso4 = chemical("cuso4");
        contents.blend(&cuso4, 10.0);
        contents.record(&cuso4, 10.0);
        assert_eq!(contents.color().unwrap().to_hex(), "#3388cc");
        assert_eq!(contents.opacity(), 0.75);
        assert_eq!(contents.ph(), 4.0);
    }

    #[test]
    fn test_metal_into_empty_beaker_reports_neutral_ph() {
        let mut contents = BeakerContents::new(350.0);
        contents.blend(&chemical("fe"), 10.0);
        assert_eq!(contents.ph(), NEUTRAL_PH);
    }

    #[test]
    fn test_blend_is_volume_weighted_linear() {
        let mut contents = BeakerContents::new(350.0);
        let hcl = chemical("hcl");
        let koh = chemical("koh");
        contents.blend(&hcl, 30.0);
        contents.record(&hcl, 30.0);
        contents.blend(&koh, 10.0);
        contents.record(&koh, 10.0);
        // ratio = 10 / 40
        assert!((contents.ph() - (1.0 * 0.75 + 13.5 * 0.25)).abs() < 1e-4);
        assert!((contents.opacity() - (0.45 * 0.75 + 0.37 * 0.25)).abs() < 1e-4);
    }

    #[test]
    fn test_metal_does_not_shift_ph() {
        let mut contents = BeakerContents::new(350.0);
        let hcl = chemical("hcl");
        contents.blend(&hcl, 10.0);
        contents.record(&hcl, 10.0);
        let zn = chemical("zn");
        contents.blend(&zn, 10.0);
        assert_eq!(contents.ph(), 1.0);
        assert!(contents.opacity() > 0.45);
    }

    #[test]
    fn test_equal_volume_mixing_is_order_independent() {
        let a = chemical("hno3");
        let b = chemical("cocl2");

        let mut ab = BeakerContents::new(350.0);
        for c in [&a, &b] {
            ab.blend(c, 10.0);
            ab.record(c, 10.0);
        }
        let mut ba = BeakerContents::new(350.0);
        for c in [&b, &a] {
            ba.blend(c, 10.0);
            ba.record(c, 10.0);
        }

        let (x, y) = (ab.color().unwrap(), ba.color().unwrap());
        assert!((x.r - y.r).abs() < 1e-3 && (x.g - y.g).abs() < 1e-3 && (x.b - y.b).abs() < 1e-3);
        assert!((ab.ph() - ba.ph()).abs() < 1e-3);
    }

    #[test]
    fn test_record_accumulates_and_keeps_total() {
        let mut contents = BeakerContents::new(350.0);
        let water = chemical("h2o");
        let salt = chemical("nacl");
        contents.record(&water, 10.0);
        contents.record(&salt, 5.0);
        contents.record(&water, 15.0);
        assert_eq!(contents.entries().len(), 2);
        assert_eq!(contents.entries()[0].amount, 25.0);
        let sum: f32 = contents.entries().iter().map(|e| e.amount).sum();
        assert_eq!(sum, contents.total_volume());
    }

    #[test]
    fn test_admit_never_overfills() {
        let mut contents = BeakerContents::new(100.0);
        let water = chemical("h2o");
        contents.record(&water, 95.0);
        assert_eq!(contents.admit(10.0), Ok(5.0));
        contents.record(&water, 5.0);
        assert!(contents.is_full());
        assert_eq!(contents.admit(10.0), Err(PourError::CapacityExceeded));
    }

    #[test]
    fn test_reaction_log_is_deduplicated() {
        let mut contents = BeakerContents::new(350.0);
        let catalog = Catalog::standard();
        let effect = catalog.reaction("hcl", "naoh").unwrap();
        assert!(contents.apply_reaction(effect));
        assert!(!contents.apply_reaction(effect));
        assert_eq!(contents.reactions().len(), 1);
    }

    #[test]
    fn test_temperature_clamped() {
        let mut contents = BeakerContents::new(350.0);
        contents.raise_temperature(500.0);
        assert_eq!(contents.temperature(), MAX_TEMPERATURE);
        contents.raise_temperature(-500.0);
        assert_eq!(contents.temperature(), MIN_TEMPERATURE);
    }

    #[test]
    fn test_display_amounts() {
        let small = ContentEntry { chemical_id: "h2o".into(), formula: "H₂O".into(), amount: 20.0 };
        assert_eq!(small.display_amount(), "2.0g");
        assert!((small.moles() - 0.4).abs() < 1e-6);
        let large = ContentEntry { amount: 75.0, ..small };
        assert_eq!(large.display_amount(), "1.50 mol 100%");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut contents = BeakerContents::new(350.0);
        contents.record(&chemical("h2o"), 10.0);
        contents.raise_temperature(30.0);
        contents.log_reaction("x");
        contents.clear();
        assert_eq!(contents.total_volume(), 0.0);
        assert_eq!(contents.temperature(), AMBIENT_TEMPERATURE);
        assert!(contents.reactions().is_empty());
        assert!(contents.entries().is_empty());
        assert!(contents.color().is_none());
        assert_eq!(contents.max_volume(), 350.0);
    }
}

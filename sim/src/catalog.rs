//! Chemical catalog: static chemical and reaction definitions.
//!
//! The catalog is built once at startup and never mutated afterwards. Reactions
//! are keyed by an unordered pair of chemical ids, so `(a, b)` and `(b, a)`
//! always resolve to the same effect and each pair is defined exactly once.

use crate::color::Rgb;
use crate::error::{CatalogError, CatalogResult};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// DATA TYPES
// ============================================================================

/// Shelf a chemical is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChemicalCategory {
    #[default]
    Water,
    Acids,
    Bases,
    Salts,
    Metals,
}

impl ChemicalCategory {
    pub const ALL: [ChemicalCategory; 5] = [
        ChemicalCategory::Water,
        ChemicalCategory::Acids,
        ChemicalCategory::Bases,
        ChemicalCategory::Salts,
        ChemicalCategory::Metals,
    ];
}

/// Immutable chemical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chemical {
    pub id: String,
    pub formula: String,
    pub name: String,
    pub category: ChemicalCategory,
    pub color: Rgb,
    pub opacity: f32,
    /// `None` for metals, which do not shift the blended pH.
    pub ph: Option<f32>,
    #[serde(default)]
    pub reactive: bool,
}

/// Solid that settles out of a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecipitateSpec {
    pub color: Rgb,
    pub count: u32,
}

/// Outcome of mixing a reacting pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionEffect {
    pub color: Rgb,
    pub opacity: f32,
    pub ph: f32,
    pub description: String,
    #[serde(default)]
    pub heat: Option<f32>,
    #[serde(default)]
    pub produces_gas: bool,
    #[serde(default)]
    pub violent: bool,
    #[serde(default)]
    pub precipitate: Option<PrecipitateSpec>,
}

/// Normalized unordered pair of chemical ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn ids(&self) -> (&str, &str) {
        (&self.0, &self.1)
    }
}

/// Reaction entry as written in a catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionDefinition {
    pub between: [String; 2],
    #[serde(flatten)]
    pub effect: ReactionEffect,
}

/// Serializable form of a whole catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub chemicals: Vec<Chemical>,
    #[serde(default)]
    pub reactions: Vec<ReactionDefinition>,
}

// ============================================================================
// CATALOG
// ============================================================================

/// Lookup tables for chemicals and reactions.
#[derive(Resource, Debug, Clone, Default)]
pub struct Catalog {
    chemicals: Vec<Chemical>,
    index: HashMap<String, usize>,
    reactions: HashMap<PairKey, ReactionEffect>,
}

impl Catalog {
    /// Build a catalog from a document, rejecting duplicates and dangling ids.
    pub fn from_document(doc: CatalogDocument) -> CatalogResult<Self> {
        let mut catalog = Self::default();
        for chemical in doc.chemicals {
            catalog.insert_chemical(chemical)?;
        }
        for def in doc.reactions {
            let [a, b] = def.between;
            catalog.insert_reaction(&a, &b, def.effect)?;
        }
        Ok(catalog)
    }

    /// Parse a catalog from its JSON document form.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Export as a document (reactions sorted by pair for stable output).
    pub fn to_document(&self) -> CatalogDocument {
        let mut reactions: Vec<_> = self
            .reactions
            .iter()
            .map(|(key, effect)| {
                let (a, b) = key.ids();
                ReactionDefinition {
                    between: [a.to_string(), b.to_string()],
                    effect: effect.clone(),
                }
            })
            .collect();
        reactions.sort_by(|x, y| x.between.cmp(&y.between));
        CatalogDocument {
            chemicals: self.chemicals.clone(),
            reactions,
        }
    }

    fn insert_chemical(&mut self, chemical: Chemical) -> CatalogResult<()> {
        if self.index.contains_key(&chemical.id) {
            return Err(CatalogError::DuplicateChemical(chemical.id));
        }
        self.index.insert(chemical.id.clone(), self.chemicals.len());
        self.chemicals.push(chemical);
        Ok(())
    }

    fn insert_reaction(&mut self, a: &str, b: &str, effect: ReactionEffect) -> CatalogResult<()> {
        for id in [a, b] {
            if !self.index.contains_key(id) {
                return Err(CatalogError::UnknownChemical(id.to_string()));
            }
        }
        let key = PairKey::new(a, b);
        if self.reactions.contains_key(&key) {
            return Err(CatalogError::DuplicateReaction(a.to_string(), b.to_string()));
        }
        self.reactions.insert(key, effect);
        Ok(())
    }

    pub fn chemical(&self, id: &str) -> Option<&Chemical> {
        self.index.get(id).map(|&i| &self.chemicals[i])
    }

    pub fn chemicals(&self) -> &[Chemical] {
        &self.chemicals
    }

    /// Chemicals on one shelf, in display order.
    pub fn chemicals_in(&self, category: ChemicalCategory) -> impl Iterator<Item = &Chemical> {
        self.chemicals.iter().filter(move |c| c.category == category)
    }

    /// Symmetric reaction lookup.
    pub fn reaction(&self, a: &str, b: &str) -> Option<&ReactionEffect> {
        self.reactions.get(&PairKey::new(a, b))
    }

    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Every defined reacting pair.
    pub fn reacting_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.reactions.keys().map(|k| k.ids())
    }

    /// The built-in laboratory shelf.
    pub fn standard() -> Self {
        let mut catalog = Self::default();
        for chemical in standard_chemicals() {
            catalog.index.insert(chemical.id.clone(), catalog.chemicals.len());
            catalog.chemicals.push(chemical);
        }
        for (a, b, effect) in standard_reactions() {
            catalog.reactions.insert(PairKey::new(a, b), effect);
        }
        catalog
    }
}

// ============================================================================
// STANDARD DATA
// ============================================================================

fn rgb(hex: &str) -> Rgb {
    Rgb::from_hex(hex).unwrap_or_default()
}

fn chem(
    id: &str,
    formula: &str,
    name: &str,
    category: ChemicalCategory,
    color: &str,
    opacity: f32,
    ph: Option<f32>,
) -> Chemical {
    Chemical {
        id: id.to_string(),
        formula: formula.to_string(),
        name: name.to_string(),
        category,
        color: rgb(color),
        opacity,
        ph,
        reactive: false,
    }
}

fn standard_chemicals() -> Vec<Chemical> {
    use ChemicalCategory::*;
    let mut sodium = chem("na", "Na", "Sodium", Metals, "#cccccc", 0.9, None);
    sodium.reactive = true;
    let mut potassium = chem("k", "K", "Potassium", Metals, "#bbbbbb", 0.9, None);
    potassium.reactive = true;

    vec![
        chem("h2o", "H₂O", "Water", Water, "#b8ddf0", 0.4, Some(7.0)),
        chem("d2o", "D₂O", "Heavy Water", Water, "#a0ccee", 0.42, Some(7.0)),
        chem("hcl", "HCl", "Hydrochloric", Acids, "#f0e8a0", 0.45, Some(1.0)),
        chem("h2so4", "H₂SO₄", "Sulfuric", Acids, "#f5dda0", 0.55, Some(0.3)),
        chem("hno3", "HNO₃", "Nitric", Acids, "#f8f0a0", 0.5, Some(1.2)),
        chem("hf", "HF", "Hydrofluoric", Acids, "#d5eed5", 0.35, Some(3.2)),
        chem("ch3cooh", "CH₃COOH", "Acetic", Acids, "#f0f0e8", 0.3, Some(2.9)),
        chem("naoh", "NaOH", "Sodium Hydr.", Bases, "#c5e0ff", 0.35, Some(14.0)),
        chem("koh", "KOH", "Potassium Hydr.", Bases, "#bdd8f8", 0.37, Some(13.5)),
        chem("nh3", "NH₃", "Ammonia", Bases, "#ddf0d8", 0.25, Some(11.6)),
        chem("ca_oh_2", "Ca(OH)₂", "Lime Water", Bases, "#e8e8e8", 0.4, Some(12.4)),
        chem("nacl", "NaCl", "Table Salt", Salts, "#f0f0f0", 0.25, Some(7.0)),
        chem("cuso4", "CuSO₄", "Copper Sulf.", Salts, "#3388cc", 0.75, Some(4.0)),
        chem("kmno4", "KMnO₄", "Potass. Perm.", Salts, "#8820dd", 0.9, Some(7.0)),
        chem("fecl3", "FeCl₃", "Iron(III) Chl.", Salts, "#bb7722", 0.7, Some(2.0)),
        chem("cocl2", "CoCl₂", "Cobalt Chl.", Salts, "#ff5ca0", 0.65, Some(5.0)),
        sodium,
        potassium,
        chem("fe", "Fe", "Iron", Metals, "#888888", 0.95, None),
        chem("cu", "Cu", "Copper", Metals, "#cc7733", 0.95, None),
        chem("zn", "Zn", "Zinc", Metals, "#aabbcc", 0.9, None),
    ]
}

fn effect(color: &str, opacity: f32, ph: f32, description: &str) -> ReactionEffect {
    ReactionEffect {
        color: rgb(color),
        opacity,
        ph,
        description: description.to_string(),
        heat: None,
        produces_gas: false,
        violent: false,
        precipitate: None,
    }
}

fn with_precipitate(mut e: ReactionEffect, color: &str, count: u32) -> ReactionEffect {
    e.precipitate = Some(PrecipitateSpec { color: rgb(color), count });
    e
}

fn with_heat(mut e: ReactionEffect, heat: f32) -> ReactionEffect {
    e.heat = Some(heat);
    e
}

fn violent_with_gas(mut e: ReactionEffect, heat: f32) -> ReactionEffect {
    e.violent = true;
    e.produces_gas = true;
    e.heat = Some(heat);
    e
}

fn standard_reactions() -> Vec<(&'static str, &'static str, ReactionEffect)> {
    vec![
        (
            "hcl",
            "naoh",
            with_heat(effect("#f0f0f0", 0.25, 7.0, "HCl + NaOH → NaCl + H₂O"), 15.0),
        ),
        (
            "h2so4",
            "naoh",
            with_heat(
                effect("#f0f0f0", 0.28, 7.0, "H₂SO₄ + 2NaOH → Na₂SO₄ + 2H₂O"),
                25.0,
            ),
        ),
        (
            "cuso4",
            "naoh",
            with_precipitate(
                effect("#3399ee", 0.8, 9.0, "CuSO₄ + 2NaOH → Cu(OH)₂↓ + Na₂SO₄"),
                "#2277cc",
                12,
            ),
        ),
        (
            "fecl3",
            "naoh",
            with_precipitate(
                effect("#cc5500", 0.85, 9.0, "FeCl₃ + 3NaOH → Fe(OH)₃↓ + 3NaCl"),
                "#994400",
                10,
            ),
        ),
        ("kmno4", "h2o", effect("#7718cc", 0.85, 7.0, "KMnO₄ dissolved in H₂O")),
        (
            "cocl2",
            "naoh",
            with_precipitate(
                effect("#ff7799", 0.75, 9.0, "CoCl₂ + 2NaOH → Co(OH)₂↓ + 2NaCl"),
                "#cc3366",
                8,
            ),
        ),
        ("cuso4", "h2o", effect("#3388cc", 0.7, 4.0, "CuSO₄ dissolved in H₂O")),
        ("cocl2", "h2o", effect("#ff5ca0", 0.6, 5.0, "CoCl₂ dissolved in H₂O")),
        ("hf", "h2o", effect("#d5eed5", 0.35, 3.2, "HF dissolved in H₂O")),
        (
            "na",
            "h2o",
            violent_with_gas(
                effect("#c5e0ff", 0.35, 14.0, "2Na + 2H₂O → 2NaOH + H₂↑ (Violent!)"),
                60.0,
            ),
        ),
        (
            "k",
            "h2o",
            violent_with_gas(
                effect("#bdd8f8", 0.37, 14.0, "2K + 2H₂O → 2KOH + H₂↑ (Very Violent!)"),
                90.0,
            ),
        ),
    ]
}

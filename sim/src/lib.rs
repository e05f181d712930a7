//! Virtual Chemistry Beaker - Simulation Core
//!
//! A fixed-timestep ECS simulation of a lab beaker: chemicals are poured,
//! react, change the liquid's color, pH and temperature, and throw off
//! bubbles, precipitate, foam and splash droplets. Uses `bevy_ecs` for the
//! entity-component-system architecture. Rendering, UI and input wiring live
//! in the host; this crate exposes scalars, particle positions and
//! snapshots.

pub mod api;
pub mod catalog;
pub mod color;
pub mod components;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ledger;
pub mod notifications;
pub mod reaction;
pub mod render_bridge;
pub mod rng;
pub mod systems;
pub mod world;

pub use api::BeakerSim;
pub use catalog::{Catalog, Chemical, ChemicalCategory, ReactionEffect};
pub use color::Rgb;
pub use components::*;
pub use config::BeakerConfig;
pub use error::{CatalogError, PourError};
pub use geometry::BeakerGeometry;
pub use ledger::BeakerContents;
pub use reaction::MixOutcome;
pub use systems::*;
pub use world::Snapshot;

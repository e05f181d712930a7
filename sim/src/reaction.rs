//! Reaction resolver: decides what an add does to the beaker.
//!
//! Lookup is by unordered pair, so `try_react(a, b) == try_react(b, a)`.
//! When several chemicals are already in the beaker, the first entry (in
//! pour order) that reacts with the incoming chemical wins and no other
//! reaction fires for that add.

use crate::catalog::{Catalog, ReactionEffect};
use crate::ledger::BeakerContents;
use crate::notifications::MSG_VIOLENT_REACTION;
use crate::systems::deferred::DeferredAction;
use serde::{Deserialize, Serialize};

const GENTLE_BUBBLES: u32 = 10;
const GENTLE_BUBBLE_SPACING: f32 = 0.05;
const VIOLENT_BUBBLES: u32 = 25;
const VIOLENT_BUBBLE_SPACING: f32 = 0.03;
const PRECIPITATE_DELAY: f32 = 0.3;
const GAS_BUBBLES: u32 = 20;
const GAS_BUBBLE_SPACING: f32 = 0.06;
/// Foam waves of a violent reaction: `(delay seconds, clusters)`.
const VIOLENT_FOAM: [(f32, u32); 3] = [(0.0, 30), (0.5, 15), (1.0, 10)];
const PRECIPITATE_FOAM: u32 = 5;

/// Effect of `incoming` poured onto `existing`, if they react.
pub fn try_react<'a>(catalog: &'a Catalog, existing: &str, incoming: &str) -> Option<&'a ReactionEffect> {
    catalog.reaction(existing, incoming)
}

/// A reaction picked for one add.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedReaction<'a> {
    /// Chemical already in the beaker that reacted.
    pub partner: &'a str,
    pub effect: &'a ReactionEffect,
}

/// First existing entry, in pour order, that reacts with `incoming`.
pub fn resolve<'a>(
    catalog: &'a Catalog,
    contents: &'a BeakerContents,
    incoming: &str,
) -> Option<ResolvedReaction<'a>> {
    contents.entries().iter().find_map(|entry| {
        try_react(catalog, &entry.chemical_id, incoming).map(|effect| ResolvedReaction {
            partner: entry.chemical_id.as_str(),
            effect,
        })
    })
}

/// One staggered spawn of a reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    /// Seconds after the add.
    pub delay: f32,
    pub action: DeferredAction,
}

/// Everything a reaction schedules beyond its immediate ledger update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReactionPlan {
    pub bursts: Vec<Burst>,
    pub violent: bool,
    pub notification: Option<&'static str>,
}

impl ReactionPlan {
    pub fn for_effect(effect: &ReactionEffect) -> Self {
        let mut bursts = Vec::new();
        let violent = effect.violent;

        let (count, spacing) = if violent {
            (VIOLENT_BUBBLES, VIOLENT_BUBBLE_SPACING)
        } else {
            (GENTLE_BUBBLES, GENTLE_BUBBLE_SPACING)
        };
        bursts.extend((0..count).map(|i| Burst {
            delay: i as f32 * spacing,
            action: DeferredAction::ReactionBubble { violent },
        }));

        if let Some(precipitate) = &effect.precipitate {
            bursts.push(Burst {
                delay: PRECIPITATE_DELAY,
                action: DeferredAction::Precipitate {
                    color: precipitate.color,
                    count: precipitate.count,
                },
            });
        }

        if effect.produces_gas {
            bursts.extend((0..GAS_BUBBLES).map(|i| Burst {
                delay: i as f32 * GAS_BUBBLE_SPACING,
                action: DeferredAction::GasBubble,
            }));
        }

        if violent {
            bursts.extend(VIOLENT_FOAM.iter().map(|&(delay, count)| Burst {
                delay,
                action: DeferredAction::Foam { count },
            }));
        } else if effect.precipitate.is_some() {
            bursts.push(Burst {
                delay: 0.0,
                action: DeferredAction::Foam { count: PRECIPITATE_FOAM },
            });
        }

        Self {
            bursts,
            violent,
            notification: violent.then_some(MSG_VIOLENT_REACTION),
        }
    }

    /// Number of bursts matching `pred`.
    pub fn count(&self, pred: impl Fn(&DeferredAction) -> bool) -> usize {
        self.bursts.iter().filter(|b| pred(&b.action)).count()
    }
}

/// What a successful add did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixOutcome {
    pub chemical_id: String,
    /// Volume actually poured, after capping at capacity.
    pub added: f32,
    /// Description of the reaction that fired, if any.
    pub reaction: Option<String>,
    pub violent: bool,
}

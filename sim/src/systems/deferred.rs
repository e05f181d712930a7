//! Staggered, single-shot effects on the simulation timeline.
//!
//! Reaction bursts and other delayed spawns are queued as `(fire_at, seq)`
//! entries in a min-heap and dispatched at the start of the tick they come
//! due. Each entry remembers the beaker generation it was queued in; a clear
//! bumps the generation, so anything queued before it is dropped when it
//! fires.

use crate::color::Rgb;
use crate::geometry::{BeakerGeometry, SpawnSite};
use crate::ledger::BeakerContents;
use crate::rng::SimRng;
use crate::systems::bubble::{spawn_bubble, BubbleStyle};
use crate::systems::clock::SimTick;
use crate::systems::foam::spawn_foam;
use crate::systems::lifecycle::ParticleRegistry;
use crate::systems::precipitate::spawn_precipitate;
use bevy_ecs::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A spawn waiting for its tick.
#[derive(Debug, Clone, PartialEq)]
pub enum DeferredAction {
    /// Ambient bubble from pouring, heating or stirring.
    Bubble,
    /// One bubble of a reaction's burst.
    ReactionBubble { violent: bool },
    /// One bubble of a gas burst.
    GasBubble,
    Precipitate { color: Rgb, count: u32 },
    Foam { count: u32 },
}

#[derive(Debug, Clone)]
struct Scheduled {
    fire_at: u64,
    seq: u64,
    generation: u64,
    action: DeferredAction,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.fire_at, self.seq).cmp(&(other.fire_at, other.seq))
    }
}

/// Min-heap of pending actions. Ties fire in scheduling order.
#[derive(Resource, Debug, Default)]
pub struct DeferredQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
    generation: u64,
}

impl DeferredQueue {
    /// Queue `action` to fire `delay_ticks` after `now`.
    ///
    /// Actions never fire on the tick they were queued in: a zero delay means
    /// the next tick.
    pub fn schedule(&mut self, now: u64, delay_ticks: u64, action: DeferredAction) {
        let entry = Scheduled {
            fire_at: now + delay_ticks.max(1),
            seq: self.next_seq,
            generation: self.generation,
            action,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(entry));
    }

    /// Invalidate everything queued so far.
    pub fn advance_generation(&mut self) {
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Next action due at or before `tick`, skipping stale ones.
    pub fn pop_due(&mut self, tick: u64) -> Option<DeferredAction> {
        while self.heap.peek().is_some_and(|Reverse(e)| e.fire_at <= tick) {
            let Reverse(entry) = self.heap.pop()?;
            if entry.generation == self.generation {
                return Some(entry.action);
            }
            log::debug!("dropping {:?} queued before a clear", entry.action);
        }
        None
    }

    /// Live (current generation) actions still waiting, in firing order.
    pub fn pending(&self) -> Vec<&DeferredAction> {
        let mut live: Vec<&Scheduled> = self
            .heap
            .iter()
            .map(|Reverse(e)| e)
            .filter(|e| e.generation == self.generation)
            .collect();
        live.sort();
        live.into_iter().map(|e| &e.action).collect()
    }

    /// Number of queued entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// System that fires every action due this tick.
///
/// Actions whose preconditions no longer hold (no geometry, empty beaker) are
/// consumed without effect.
pub fn deferred_dispatch_system(
    mut commands: Commands,
    tick: Res<SimTick>,
    geometry: Option<Res<BeakerGeometry>>,
    contents: Res<BeakerContents>,
    mut queue: ResMut<DeferredQueue>,
    mut registry: ResMut<ParticleRegistry>,
    mut rng: ResMut<SimRng>,
) {
    let site = SpawnSite::resolve(geometry.as_deref(), &contents);

    while let Some(action) = queue.pop_due(tick.0) {
        let Some(site) = site else {
            log::debug!("skipping {:?}: no liquid to spawn into", action);
            continue;
        };

        match action {
            DeferredAction::Bubble => {
                spawn_bubble(&mut commands, &mut registry, &mut rng, &site, BubbleStyle::Gentle);
            }
            DeferredAction::ReactionBubble { violent } => {
                let style = if violent {
                    BubbleStyle::Violent
                } else {
                    BubbleStyle::Gentle
                };
                spawn_bubble(&mut commands, &mut registry, &mut rng, &site, style);
            }
            DeferredAction::GasBubble => {
                spawn_bubble(&mut commands, &mut registry, &mut rng, &site, BubbleStyle::Gas);
            }
            DeferredAction::Precipitate { color, count } => {
                spawn_precipitate(&mut commands, &mut registry, &mut rng, &site, color, count);
            }
            DeferredAction::Foam { count } => {
                spawn_foam(&mut commands, &mut registry, &mut rng, &site, count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::components::ParticleKind;
    use crate::systems::lifecycle::count_particles;

    #[test]
    fn test_fires_in_time_then_sequence_order() {
        let mut queue = DeferredQueue::default();
        queue.schedule(0, 5, DeferredAction::Foam { count: 1 });
        queue.schedule(0, 2, DeferredAction::Bubble);
        queue.schedule(0, 5, DeferredAction::Foam { count: 2 });

        assert_eq!(queue.pop_due(1), None);
        assert_eq!(queue.pop_due(2), Some(DeferredAction::Bubble));
        assert_eq!(queue.pop_due(4), None);
        assert_eq!(queue.pop_due(9), Some(DeferredAction::Foam { count: 1 }));
        assert_eq!(queue.pop_due(9), Some(DeferredAction::Foam { count: 2 }));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_delay_waits_one_tick() {
        let mut queue = DeferredQueue::default();
        queue.schedule(10, 0, DeferredAction::Bubble);
        assert_eq!(queue.pop_due(10), None);
        assert_eq!(queue.pop_due(11), Some(DeferredAction::Bubble));
    }

    #[test]
    fn test_new_generation_drops_stale_actions() {
        let mut queue = DeferredQueue::default();
        queue.schedule(0, 3, DeferredAction::Foam { count: 30 });
        queue.advance_generation();
        queue.schedule(0, 3, DeferredAction::Bubble);

        assert_eq!(queue.pending(), vec![&DeferredAction::Bubble]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_due(3), Some(DeferredAction::Bubble));
        assert_eq!(queue.pop_due(3), None);
        assert!(queue.is_empty());
    }

    fn dispatch_world(with_liquid: bool) -> World {
        let mut contents = BeakerContents::new(350.0);
        if with_liquid {
            let water = Catalog::standard().chemical("h2o").unwrap().clone();
            contents.record(&water, 100.0);
        }
        let mut world = World::new();
        world.insert_resource(SimTick(1));
        world.insert_resource(BeakerGeometry::new([-1.0, 0.0, -1.0], [1.0, 3.0, 1.0]));
        world.insert_resource(contents);
        world.insert_resource(ParticleRegistry::default());
        world.insert_resource(SimRng::seeded(2));
        world.insert_resource(DeferredQueue::default());
        world
    }

    #[test]
    fn test_dispatch_spawns_due_actions() {
        let mut world = dispatch_world(true);
        {
            let mut queue = world.resource_mut::<DeferredQueue>();
            queue.schedule(0, 1, DeferredAction::ReactionBubble { violent: false });
            queue.schedule(0, 1, DeferredAction::Foam { count: 5 });
            queue.schedule(0, 1, DeferredAction::Precipitate { color: Rgb::WHITE, count: 4 });
            queue.schedule(0, 30, DeferredAction::GasBubble);
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(deferred_dispatch_system);
        schedule.run(&mut world);

        assert_eq!(count_particles(&mut world, ParticleKind::Bubble), 1);
        assert_eq!(count_particles(&mut world, ParticleKind::Foam), 5);
        assert_eq!(count_particles(&mut world, ParticleKind::Precipitate), 4);
        assert_eq!(world.resource::<DeferredQueue>().pending().len(), 1);
    }

    #[test]
    fn test_dispatch_into_empty_beaker_is_a_no_op() {
        let mut world = dispatch_world(false);
        world
            .resource_mut::<DeferredQueue>()
            .schedule(0, 1, DeferredAction::Foam { count: 30 });

        let mut schedule = Schedule::default();
        schedule.add_systems(deferred_dispatch_system);
        schedule.run(&mut world);

        assert_eq!(count_particles(&mut world, ParticleKind::Foam), 0);
        assert!(world.resource::<DeferredQueue>().is_empty());
    }
}

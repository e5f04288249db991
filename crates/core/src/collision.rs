//! Collision module - axis-separated tile probing
//!
//! The player never moves more than one tile per axis per tick, so collision
//! is a broad-phase occupancy test of the tile(s) the player is about to
//! enter. Probes are issued per axis to avoid corner ambiguity:
//!
//! 1. vertical: `(0, vy)` if moving vertically, else both `(0, -1)` and
//!    `(0, 1)` so ground and roof contact are known every tick;
//! 2. horizontal: `(vx, 0)` if moving horizontally;
//! 3. fallback: the full velocity vector, only if 1 and 2 found nothing.
//!
//! Because the vertical probes always run, an idle player (zero velocity)
//! still re-verifies ground and roof contact every tick; no separate
//! zero-vector probe is needed.
//!
//! Events come out in probe order, then ascending collider id, which makes
//! trigger dispatch deterministic.

use std::collections::{BTreeMap, BTreeSet};

use arrayvec::ArrayVec;

use crate::entity::{Entity, EntityId};
use crate::types::{Offset, Side};

/// One contact between the player and a collider, valid for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    pub obj: EntityId,
    /// Face of `obj` the player is approaching.
    pub side: Side,
    /// Tile the probe tested.
    pub target_pos: Offset,
    /// Player position when the probe ran.
    pub player_pos: Offset,
}

/// Stateless probing plus a running count of occupancy tests.
#[derive(Debug, Clone, Default)]
pub struct CollisionEngine {
    tests: u64,
}

impl CollisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total `occupies_tile` checks performed so far.
    pub fn tests_performed(&self) -> u64 {
        self.tests
    }

    /// Collect this tick's events for a player at `pos` moving by `velocity`.
    ///
    /// `colliders` selects which members of `objects` take part; ids without
    /// an object are skipped.
    pub fn gather_collisions(
        &mut self,
        pos: Offset,
        velocity: Offset,
        objects: &BTreeMap<EntityId, Entity>,
        colliders: &BTreeSet<EntityId>,
    ) -> Vec<CollisionEvent> {
        let mut probes: ArrayVec<Offset, 3> = ArrayVec::new();
        if velocity.y != 0 {
            probes.push(velocity.only_y());
        } else {
            probes.push(Offset::new(0, -1));
            probes.push(Offset::new(0, 1));
        }
        if velocity.x != 0 {
            probes.push(velocity.only_x());
        }

        let mut events = Vec::new();
        for delta in probes {
            self.probe(pos, delta, objects, colliders, &mut events);
        }

        if events.is_empty() && !velocity.is_zero() {
            self.probe(pos, velocity, objects, colliders, &mut events);
        }

        events
    }

    fn probe(
        &mut self,
        pos: Offset,
        delta: Offset,
        objects: &BTreeMap<EntityId, Entity>,
        colliders: &BTreeSet<EntityId>,
        out: &mut Vec<CollisionEvent>,
    ) {
        let target = pos + delta;
        let side = Side::from_vector(delta);
        self.tests += colliders.len() as u64;
        for id in colliders {
            let Some(obj) = objects.get(id) else {
                continue;
            };
            if obj.occupies_tile(target) {
                out.push(CollisionEvent {
                    obj: *id,
                    side,
                    target_pos: target,
                    player_pos: pos,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, ObjectSpec};
    use crate::rng::SimpleRng;
    use crate::types::Size;

    type World = (BTreeMap<EntityId, Entity>, BTreeSet<EntityId>);

    fn world(specs: &[(EntityKind, (i32, i32), (i32, i32))]) -> World {
        let mut rng = SimpleRng::new(1);
        let mut objects = BTreeMap::new();
        let mut colliders = BTreeSet::new();
        for (i, (kind, pos, size)) in specs.iter().enumerate() {
            let id = EntityId(i as u32 + 1);
            let entity = Entity::new(
                id,
                ObjectSpec {
                    kind: kind.clone(),
                    pos: (*pos).into(),
                    size: Size::new(size.0, size.1),
                    layer_number: 1,
                },
                &mut rng,
            );
            if entity.is_collider() {
                colliders.insert(id);
            }
            objects.insert(id, entity);
        }
        (objects, colliders)
    }

    #[test]
    fn empty_world_yields_nothing() {
        let mut engine = CollisionEngine::new();
        let events = engine.gather_collisions(
            Offset::new(1, 1),
            Offset::new(1, 1),
            &BTreeMap::new(),
            &BTreeSet::new(),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn idle_player_detects_ground_and_roof() {
        let (objects, colliders) = world(&[
            (EntityKind::Floor, (0, 6), (10, 1)),
            (EntityKind::Floor, (0, 4), (10, 1)),
        ]);
        let mut engine = CollisionEngine::new();
        let events =
            engine.gather_collisions(Offset::new(3, 5), Offset::ZERO, &objects, &colliders);
        let sides: Vec<Side> = events.iter().map(|e| e.side).collect();
        assert_eq!(sides, vec![Side::Top, Side::Bottom]);
        assert_eq!(engine.tests_performed(), 4);
    }

    #[test]
    fn diagonal_move_reports_single_axis_side() {
        // Wall to the right only; moving down-right must report RIGHT, not BOTTOM.
        let (objects, colliders) = world(&[(EntityKind::Floor, (5, 0), (1, 10))]);
        let mut engine = CollisionEngine::new();
        let events =
            engine.gather_collisions(Offset::new(4, 3), Offset::new(1, 1), &objects, &colliders);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].side, Side::Right);
        assert_eq!(events[0].target_pos, Offset::new(5, 3));
    }

    #[test]
    fn corner_is_only_found_by_fallback_probe() {
        let (objects, colliders) = world(&[(EntityKind::Floor, (5, 5), (1, 1))]);
        let mut engine = CollisionEngine::new();
        let events =
            engine.gather_collisions(Offset::new(4, 4), Offset::new(1, 1), &objects, &colliders);
        assert_eq!(events.len(), 1);
        // Tie between axes goes vertical.
        assert_eq!(events[0].side, Side::Bottom);
        assert_eq!(events[0].target_pos, Offset::new(5, 5));
    }

    #[test]
    fn events_are_ordered_by_probe_then_id() {
        let (objects, colliders) = world(&[
            (EntityKind::Star, (3, 4), (1, 1)),
            (EntityKind::Floor, (4, 3), (1, 1)),
            (EntityKind::Floor, (3, 4), (1, 1)),
        ]);
        let mut engine = CollisionEngine::new();
        let events =
            engine.gather_collisions(Offset::new(3, 3), Offset::new(1, 1), &objects, &colliders);
        let ids: Vec<u32> = events.iter().map(|e| e.obj.0).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn idle_player_next_to_a_wall_reports_no_side_contact() {
        let (objects, colliders) = world(&[(EntityKind::Floor, (5, 0), (1, 10))]);
        let mut engine = CollisionEngine::new();
        let events =
            engine.gather_collisions(Offset::new(4, 3), Offset::ZERO, &objects, &colliders);
        assert!(events.is_empty(), "{events:?}");
    }

    #[test]
    fn closing_a_gap_hits_the_wall_exactly_once() {
        for (wall_x, start_x, step, side) in [(7, 2, 1, Side::Right), (0, 4, -1, Side::Left)] {
            let (objects, colliders) = world(&[(EntityKind::Floor, (wall_x, 0), (1, 10))]);
            let mut engine = CollisionEngine::new();
            let velocity = Offset::new(step, 0);
            let mut pos = Offset::new(start_x, 3);
            let mut moves = 0;
            loop {
                let events = engine.gather_collisions(pos, velocity, &objects, &colliders);
                if !events.is_empty() {
                    assert_eq!(events.len(), 1);
                    assert_eq!(events[0].side, side);
                    assert_eq!(events[0].target_pos, Offset::new(wall_x, 3));
                    break;
                }
                pos += velocity;
                moves += 1;
                assert!(moves <= 10, "never reached the wall");
            }
            // The gap between player and wall is crossed tile by tile.
            assert_eq!(moves, (wall_x - start_x).abs() - 1);
            assert_eq!(pos.x + step, wall_x);
        }
    }

    #[test]
    fn non_colliders_are_ignored() {
        let (objects, colliders) = world(&[(EntityKind::Light, (3, 4), (1, 2))]);
        assert!(colliders.is_empty());
        let mut engine = CollisionEngine::new();
        let events =
            engine.gather_collisions(Offset::new(3, 3), Offset::new(0, 1), &objects, &colliders);
        assert!(events.is_empty());
    }
}

//! Perception and target-selection leaves: find actors around the acting
//! actor, narrow the list down, and pick one.

use std::cmp::Ordering;

use mossgard_world::{Actor, ActorId, GameHandler, Knowledge, Vector};
use rand::Rng;

use super::{FactionFilter, Leaf, SortKey};
use crate::status::Status;

/// Collect the actors on the four orthogonally adjacent tiles.
pub(super) fn find_neighbours(leaf: &Leaf, actor: ActorId, game: &mut GameHandler) -> Status {
    let Some(position) = own_position(game, actor) else {
        return Status::Failure;
    };
    let found: Vec<ActorId> = position
        .orthogonal_neighbours()
        .into_iter()
        .filter_map(|neighbour| game.get_actor_at(neighbour))
        .collect();
    store_found(leaf, actor, game, found)
}

/// Collect the actors in a rectangle around the acting actor, excluding
/// its own tile.
pub(super) fn find_around(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
    horizontal: i32,
    vertical: i32,
) -> Status {
    let Some(position) = own_position(game, actor) else {
        return Status::Failure;
    };
    let mut found = Vec::new();
    for x in (position.x - horizontal)..=(position.x + horizontal) {
        for y in (position.y - vertical)..=(position.y + vertical) {
            let candidate = Vector::new(x, y);
            if candidate == position {
                continue;
            }
            if let Some(other) = game.get_actor_at(candidate) {
                found.push(other);
            }
        }
    }
    store_found(leaf, actor, game, found)
}

fn store_found(leaf: &Leaf, actor: ActorId, game: &mut GameHandler, found: Vec<ActorId>) -> Status {
    if found.is_empty() {
        leaf.forget_output(game, actor);
        Status::Failure
    } else {
        leaf.remember(game, actor, Knowledge::Actors(found));
        Status::Success
    }
}

/// Sort the remembered list in place. Actors that left the world since
/// the list was written are dropped. The sort is stable, so ties keep
/// their discovery order and a seeded run stays reproducible.
pub(super) fn sort_actors(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
    key: &SortKey,
    reverse: bool,
) -> Status {
    let Some(position) = own_position(game, actor) else {
        return Status::Failure;
    };
    let Some(mut found) = leaf.recall_actors(game, actor) else {
        return Status::Failure;
    };
    found.retain(|id| game.actor(*id).is_some_and(Actor::is_alive));
    if found.is_empty() {
        return Status::Failure;
    }

    let value_of = |id: ActorId| -> f32 {
        let Some(subject) = game.actor(id) else {
            return f32::MAX;
        };
        match key {
            SortKey::Distance => (subject.position - position).magnitude_squared() as f32,
            SortKey::Attribute(name) => subject
                .attribute(name)
                .and_then(|value| value.as_number())
                .unwrap_or(0.0),
        }
    };
    if reverse {
        found.sort_by(|a, b| value_of(*b).partial_cmp(&value_of(*a)).unwrap_or(Ordering::Equal));
    } else {
        found.sort_by(|a, b| value_of(*a).partial_cmp(&value_of(*b)).unwrap_or(Ordering::Equal));
    }

    // The sorted list replaces the one it was read from.
    if let Some(slot) = leaf.input() {
        if slot.in_blackboard {
            if let Some(me) = game.actor_mut(actor) {
                me.remember_knowledge(&slot.path, Knowledge::Actors(found));
            }
        }
    }
    Status::Success
}

/// Keep only actors in the requested faction relation to the acting
/// actor.
pub(super) fn filter_actors(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
    filter: FactionFilter,
) -> Status {
    let Some(own_faction) = game.actor(actor).map(|me| me.faction) else {
        return Status::Failure;
    };
    let Some(found) = leaf.recall_actors(game, actor) else {
        return Status::Failure;
    };
    let kept: Vec<ActorId> = found
        .into_iter()
        .filter(|id| match game.actor(*id) {
            Some(subject) => match filter {
                FactionFilter::Any => true,
                FactionFilter::Enemy => subject.faction != own_faction,
                FactionFilter::Friend => subject.faction == own_faction,
            },
            None => false,
        })
        .collect();
    store_found(leaf, actor, game, kept)
}

/// Select the first still-living actor of the remembered list.
pub(super) fn select_first(leaf: &Leaf, actor: ActorId, game: &mut GameHandler) -> Status {
    let Some(found) = leaf.recall_actors(game, actor) else {
        return Status::Failure;
    };
    let Some(first) = found
        .into_iter()
        .find(|id| game.actor(*id).is_some_and(Actor::is_alive))
    else {
        leaf.forget_output(game, actor);
        return Status::Failure;
    };
    leaf.remember(game, actor, Knowledge::Actor(first));
    Status::Success
}

/// Select a uniformly random still-living actor of the remembered list.
pub(super) fn select_any(leaf: &Leaf, actor: ActorId, game: &mut GameHandler) -> Status {
    let Some(found) = leaf.recall_actors(game, actor) else {
        return Status::Failure;
    };
    let alive: Vec<ActorId> = found
        .into_iter()
        .filter(|id| game.actor(*id).is_some_and(Actor::is_alive))
        .collect();
    if alive.is_empty() {
        leaf.forget_output(game, actor);
        return Status::Failure;
    }
    let pick = alive[game.rng_mut().gen_range(0..alive.len())];
    leaf.remember(game, actor, Knowledge::Actor(pick));
    Status::Success
}

/// Promote the actor remembered by a previous `inspect` to the selected
/// target.
pub(super) fn select_inspected(leaf: &Leaf, actor: ActorId, game: &mut GameHandler) -> Status {
    match leaf.recall_actor(game, actor) {
        Some(inspected) if game.actor(inspected).is_some_and(Actor::is_alive) => {
            leaf.remember(game, actor, Knowledge::Actor(inspected));
            Status::Success
        }
        _ => {
            leaf.forget_output(game, actor);
            Status::Failure
        }
    }
}

fn own_position(game: &GameHandler, actor: ActorId) -> Option<Vector> {
    game.actor(actor).map(|me: &Actor| me.position)
}

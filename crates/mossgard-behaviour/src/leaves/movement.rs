//! Movement leaves: pick a direction, verify it, and take the step.

use mossgard_world::{Action, ActorId, Direction, GameHandler, Knowledge};
use rand::Rng;

use super::Leaf;
use crate::status::Status;

/// Pick a uniformly random direction whose destination tile is free.
pub(super) fn calculate_random_direction(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
) -> Status {
    let Some(position) = game.actor(actor).map(|me| me.position) else {
        return Status::Failure;
    };
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|direction| game.is_free(position + direction.delta()))
        .collect();
    if open.is_empty() {
        leaf.forget_output(game, actor);
        return Status::Failure;
    }
    let direction = open[game.rng_mut().gen_range(0..open.len())];
    leaf.remember(game, actor, Knowledge::Direction(direction));
    Status::Success
}

/// Reuse the direction of the most recent move on record, refused or
/// not, to keep an actor wandering in a straight line instead of
/// jittering. A following `check-direction` weeds out directions that
/// stopped working.
pub(super) fn calculate_previous_direction(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
) -> Status {
    let previous = game.actor(actor).and_then(|me| {
        me.last_actions()
            .iter()
            .rev()
            .find_map(Action::move_direction)
    });
    match previous {
        Some(direction) => {
            leaf.remember(game, actor, Knowledge::Direction(direction));
            Status::Success
        }
        None => {
            leaf.forget_output(game, actor);
            Status::Failure
        }
    }
}

/// Plot a path to the remembered destination and store its waypoints.
pub(super) fn calculate_path(leaf: &Leaf, actor: ActorId, game: &mut GameHandler) -> Status {
    let Some(position) = game.actor(actor).map(|me| me.position) else {
        return Status::Failure;
    };
    let Some(destination) = leaf.recall_position(game, actor) else {
        leaf.forget_output(game, actor);
        return Status::Failure;
    };
    match game.find_path(position, destination) {
        Some(waypoints) if !waypoints.is_empty() => {
            leaf.remember(game, actor, Knowledge::Positions(waypoints));
            Status::Success
        }
        // Unreachable destination, or we are already standing on it.
        _ => {
            leaf.forget_output(game, actor);
            Status::Failure
        }
    }
}

/// Consume the next waypoint of the remembered path and turn it into a
/// direction. Reaching the final waypoint succeeds with no direction
/// left behind; a stale or blocked waypoint fails and drops the
/// direction so a later `move` cannot act on it.
pub(super) fn calculate_path_direction(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
) -> Status {
    let Some(position) = game.actor(actor).map(|me| me.position) else {
        return Status::Failure;
    };
    let waypoint = match (leaf.input(), game.actor_mut(actor)) {
        (Some(slot), Some(me)) if slot.in_blackboard => {
            match me.blackboard_mut().get_mut(&slot.path) {
                Some(Knowledge::Positions(waypoints)) => waypoints.pop(),
                _ => None,
            }
        }
        _ => None,
    };
    let Some(waypoint) = waypoint else {
        leaf.forget_output(game, actor);
        return Status::Failure;
    };
    if waypoint == position {
        leaf.forget_output(game, actor);
        return Status::Success;
    }
    if !position.is_orthogonal_neighbour(waypoint) || !game.is_free(waypoint) {
        leaf.forget_output(game, actor);
        return Status::Failure;
    }
    let direction = Direction::from_vectors(position, waypoint);
    leaf.remember(game, actor, Knowledge::Direction(direction));
    Status::Success
}

/// Succeed when the remembered direction points at a free tile.
pub(super) fn check_direction(leaf: &Leaf, actor: ActorId, game: &mut GameHandler) -> Status {
    let Some(direction) = leaf.recall_direction(game, actor) else {
        return Status::Failure;
    };
    let Some(position) = game.actor(actor).map(|me| me.position) else {
        return Status::Failure;
    };
    if game.is_free(position + direction.delta()) {
        Status::Success
    } else {
        Status::Failure
    }
}

/// Commit one step in the remembered direction. A step into an occupied
/// tile resolves as an attack; either way the leaf succeeds only when
/// the committed action did.
pub(super) fn step(leaf: &Leaf, actor: ActorId, game: &mut GameHandler) -> Status {
    let Some(direction) = leaf.recall_direction(game, actor) else {
        return Status::Failure;
    };
    match game.move_actor(actor, direction) {
        Some(Action::Move { success: true, .. }) | Some(Action::Attack { success: true, .. }) => {
            Status::Success
        }
        _ => Status::Failure,
    }
}

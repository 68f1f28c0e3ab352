//! Combat leaves: bank battle energy and aim at or away from a target.

use mossgard_world::{ActorId, BattleKind, Direction, GameHandler, Knowledge};
use rand::Rng;

use super::Leaf;
use crate::status::Status;

/// Bank a random share of current stamina as attack or defence energy.
/// An actor already prepared the requested way keeps its bank.
pub(super) fn prepare_to_battle(actor: ActorId, game: &mut GameHandler, kind: BattleKind) -> Status {
    let (already, stamina) = {
        let Some(me) = game.actor(actor) else {
            return Status::Failure;
        };
        let already = match kind {
            BattleKind::Attack => me.prepared_to_attack(),
            BattleKind::Defence => me.prepared_to_defence(),
        };
        (already, me.stamina)
    };
    if already {
        return Status::Success;
    }
    let energy = game.rng_mut().gen_range(1..=stamina.max(1));
    match game.prepare_to_battle(actor, kind, energy) {
        Some(_) => Status::Success,
        None => Status::Failure,
    }
}

/// Aim at the selected target.
pub(super) fn calculate_attack_direction(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
) -> Status {
    let Some(target) = leaf.recall_actor(game, actor) else {
        return Status::Failure;
    };
    let Some(target_position) = game.actor(target).map(|other| other.position) else {
        leaf.forget_output(game, actor);
        return Status::Failure;
    };
    let Some(position) = game.actor(actor).map(|me| me.position) else {
        return Status::Failure;
    };
    let direction = Direction::from_vectors(position, target_position);
    leaf.remember(game, actor, Knowledge::Direction(direction));
    Status::Success
}

/// Pick a random free direction that does not point at the selected
/// threat.
pub(super) fn calculate_flee_direction(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
) -> Status {
    let Some(threat) = leaf.recall_actor(game, actor) else {
        return Status::Failure;
    };
    let Some(threat_position) = game.actor(threat).map(|other| other.position) else {
        leaf.forget_output(game, actor);
        return Status::Failure;
    };
    let Some(position) = game.actor(actor).map(|me| me.position) else {
        return Status::Failure;
    };
    let toward_threat = Direction::from_vectors(position, threat_position);
    let escapes: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|direction| {
            *direction != toward_threat && game.is_free(position + direction.delta())
        })
        .collect();
    if escapes.is_empty() {
        leaf.forget_output(game, actor);
        return Status::Failure;
    }
    let direction = escapes[game.rng_mut().gen_range(0..escapes.len())];
    leaf.remember(game, actor, Knowledge::Direction(direction));
    Status::Success
}

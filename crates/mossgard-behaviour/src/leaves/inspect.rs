//! The `inspect` leaf: compare an attribute of the acting actor or of
//! remembered actors against a fixed operand.

use std::cmp::Ordering;

use mossgard_world::{Actor, ActorId, GameHandler, Knowledge};
use tracing::warn;

use super::Leaf;
use crate::status::Status;

/// Which actor(s) the comparison runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectTarget {
    /// The acting actor itself.
    Own,
    /// Succeed on the first remembered actor that matches.
    Any,
    /// Succeed only when every remembered actor matches.
    All,
}

/// Comparison operator. `is` and `not` are spelled aliases for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    LessEqual,
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Less => ordering == Ordering::Less,
            CompareOp::LessEqual => ordering != Ordering::Greater,
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::GreaterEqual => ordering != Ordering::Less,
            CompareOp::Greater => ordering == Ordering::Greater,
        }
    }
}

/// The right-hand side of the comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Number(f32),
    /// Resolved against the inspected actor's own maximum for the
    /// attribute, so `hp < 50%` means half of that actor's `max_hp`.
    Percent(f32),
    Flag(bool),
}

/// A fully parsed inspect comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspect {
    pub target: InspectTarget,
    pub attribute: String,
    pub operator: CompareOp,
    pub operand: Operand,
}

impl Inspect {
    /// Whether `subject` passes the comparison. Flags compare as 0/1.
    fn matches(&self, subject: &Actor) -> bool {
        let value = match subject.attribute(&self.attribute) {
            Some(Knowledge::Number(number)) => number,
            Some(Knowledge::Flag(flag)) => flag as i32 as f32,
            _ => return false,
        };
        let operand = match self.operand {
            Operand::Number(number) => number,
            Operand::Flag(flag) => flag as i32 as f32,
            Operand::Percent(percent) => match subject.attribute_maximum(&self.attribute) {
                Some(maximum) => maximum * percent / 100.0,
                None => return false,
            },
        };
        match value.partial_cmp(&operand) {
            Some(ordering) => self.operator.holds(ordering),
            None => false,
        }
    }
}

pub(super) fn evaluate(
    leaf: &Leaf,
    actor: ActorId,
    game: &mut GameHandler,
    inspect: &Inspect,
) -> Status {
    let candidates: Vec<ActorId> = match inspect.target {
        InspectTarget::Own => vec![actor],
        InspectTarget::Any | InspectTarget::All => match leaf.recall(game, actor) {
            Some(Knowledge::Actors(found)) => found,
            Some(Knowledge::Actor(single)) => vec![single],
            Some(other) => {
                warn!(
                    found = other.kind(),
                    "inspect input is not an actor or a list of actors"
                );
                return Status::Failure;
            }
            None => return Status::Failure,
        },
    };
    if candidates.is_empty() {
        return Status::Failure;
    }

    match inspect.target {
        InspectTarget::All => {
            for id in candidates {
                let Some(subject) = game.actor(id) else {
                    return Status::Failure;
                };
                if !inspect.matches(subject) {
                    return Status::Failure;
                }
            }
            Status::Success
        }
        InspectTarget::Own | InspectTarget::Any => {
            for id in candidates {
                if let Some(subject) = game.actor(id) {
                    if inspect.matches(subject) {
                        leaf.remember(game, actor, Knowledge::Actor(id));
                        return Status::Success;
                    }
                }
            }
            leaf.forget_output(game, actor);
            Status::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> Actor {
        let mut actor = Actor::new("subject", "goblin");
        actor.max_hp = 20;
        actor.hp = 8;
        actor.max_stamina = 12;
        actor.stamina = 12;
        actor
    }

    fn inspect(attribute: &str, operator: CompareOp, operand: Operand) -> Inspect {
        Inspect {
            target: InspectTarget::Own,
            attribute: attribute.into(),
            operator,
            operand,
        }
    }

    #[test]
    fn percent_operand_resolves_against_own_maximum() {
        // 8 of 20 hp is below half.
        let below_half = inspect("hp", CompareOp::Less, Operand::Percent(50.0));
        assert!(below_half.matches(&subject()));

        let above_third = inspect("hp", CompareOp::Greater, Operand::Percent(33.0));
        assert!(above_third.matches(&subject()));
    }

    #[test]
    fn number_operand_compares_directly() {
        assert!(inspect("hp", CompareOp::Equal, Operand::Number(8.0)).matches(&subject()));
        assert!(!inspect("stamina", CompareOp::Less, Operand::Number(12.0)).matches(&subject()));
    }

    #[test]
    fn flags_compare_as_booleans() {
        let unprepared = inspect("prepared_to_battle", CompareOp::Equal, Operand::Flag(false));
        assert!(unprepared.matches(&subject()));
    }

    #[test]
    fn unknown_attribute_never_matches() {
        assert!(!inspect("charisma", CompareOp::Greater, Operand::Number(0.0)).matches(&subject()));
    }
}

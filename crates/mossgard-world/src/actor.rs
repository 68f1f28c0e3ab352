//! Actors
//!
//! The creatures (and players) inhabiting the world: typed attributes,
//! battle-preparation state, a bounded action log, and the transient
//! working memory behaviour trees read and write.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{Action, BattleKind};
use crate::geometry::Vector;
use crate::memory::{Blackboard, Knowledge, MemoryPath};

/// How many actions the log keeps.
const ACTION_LOG_LEN: usize = 5;

/// Stable unique identifier for an actor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Generate an id from `rng`. The world assigns ids this way on
    /// insertion so that a seeded run is reproducible.
    pub fn from_rng(rng: &mut impl rand::Rng) -> Self {
        Self(Uuid::from_u128(rng.gen()))
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// One actor in the world.
///
/// `kind` doubles as the behaviour-tree lookup key: a creature of kind
/// `goblin` is driven by the tree named `goblin`. Actors of kind `player`
/// are never driven by trees.
#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    pub name: String,
    pub kind: String,
    pub faction: u32,
    pub position: Vector,
    pub max_hp: i32,
    pub hp: i32,
    pub max_stamina: i32,
    pub stamina: i32,
    pub stamina_regeneration: i32,
    pub attack_energy: i32,
    pub defence_energy: i32,
    pub next_action_time: u64,
    pub last_action_time: u64,
    pub actions_in_round: u32,
    pub exhausted: bool,
    last_actions: Vec<Action>,
    blackboard: Blackboard,
}

impl Actor {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: ActorId::random(),
            name: name.into(),
            kind: kind.into(),
            faction: 0,
            position: Vector::new(0, 0),
            max_hp: 20,
            hp: 20,
            max_stamina: 12,
            stamina: 12,
            stamina_regeneration: 1,
            attack_energy: 0,
            defence_energy: 0,
            next_action_time: 0,
            last_action_time: 0,
            actions_in_round: 0,
            exhausted: false,
            last_actions: Vec::new(),
            blackboard: Blackboard::new(),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ActorId) {
        self.id = id;
    }

    /// Players act on their own schedule; the tree driver skips them.
    pub fn is_player(&self) -> bool {
        self.kind == "player"
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Effective attack value. Unprepared attackers still hit for 1.
    pub fn attack_power(&self) -> i32 {
        self.attack_energy.max(1)
    }

    /// Effective defence value.
    pub fn defence_power(&self) -> i32 {
        self.defence_energy
    }

    /// Whether the actor acted at all this round.
    pub fn acted(&self) -> bool {
        self.actions_in_round > 0
    }

    /// The most recent action, if any.
    pub fn last_action(&self) -> Option<&Action> {
        self.last_actions.last()
    }

    /// The bounded action log, oldest first.
    pub fn last_actions(&self) -> &[Action] {
        &self.last_actions
    }

    /// Prepared for battle: the latest action was a preparation and some
    /// energy is still banked (moving or attacking clears it).
    pub fn prepared_to_battle(&self) -> bool {
        matches!(self.last_action(), Some(Action::PrepareToBattle { .. }))
            && self.attack_energy.max(self.defence_energy) > 0
    }

    pub fn prepared_to_attack(&self) -> bool {
        self.prepared_to_battle()
            && self.last_action().and_then(Action::battle_kind) == Some(BattleKind::Attack)
    }

    pub fn prepared_to_defence(&self) -> bool {
        self.prepared_to_battle()
            && self.last_action().and_then(Action::battle_kind) == Some(BattleKind::Defence)
    }

    /// Record an action: charges stamina (repeated actions in one round get
    /// progressively more expensive), appends to the bounded log, and
    /// schedules the next action time. Players keep their own pace and are
    /// not scheduled.
    pub fn push_action(&mut self, action: Action, time_to_next: u64) {
        self.actions_in_round += 1;
        self.last_action_time = action.time();
        self.stamina -= 2 * self.actions_in_round as i32 * action.stamina_cost();

        if !self.is_player() {
            self.next_action_time = action.time() + time_to_next;
        }

        self.last_actions.push(action);
        if self.last_actions.len() > ACTION_LOG_LEN {
            self.last_actions.remove(0);
        }
    }

    /// Overdrawn stamina knocks the actor out for a while; recovered actors
    /// wake up once their timer has passed.
    pub fn handle_exhausting(&mut self, time: u64) {
        if self.stamina < 0 {
            self.exhausted = true;
            self.next_action_time = time + (-self.stamina as u64) * 10;
        } else if self.exhausted && self.next_action_time <= time {
            self.exhausted = false;
        }
    }

    /// Read a memory path: the blackboard when `in_blackboard`, the actor's
    /// own attributes otherwise. Absence is an ordinary `None`.
    pub fn recall_knowledge(&self, path: &MemoryPath, in_blackboard: bool) -> Option<Knowledge> {
        if in_blackboard {
            self.blackboard.get(path).cloned()
        } else {
            match path.segments() {
                [name] => self.attribute(name),
                _ => None,
            }
        }
    }

    /// Write a value into the blackboard. Attributes are never writable
    /// through memory paths.
    pub fn remember_knowledge(&mut self, path: &MemoryPath, value: Knowledge) {
        self.blackboard.set(path, value);
    }

    /// Drop a blackboard entry. Forgetting a missing path is a no-op.
    pub fn forget_knowledge(&mut self, path: &MemoryPath) {
        self.blackboard.remove(path);
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    /// A typed read of one of the actor's own attributes, used by the
    /// `self.` memory scope and the inspect node.
    pub fn attribute(&self, name: &str) -> Option<Knowledge> {
        match name {
            "position" => Some(Knowledge::Position(self.position)),
            "hp" => Some(Knowledge::Number(self.hp as f32)),
            "max_hp" => Some(Knowledge::Number(self.max_hp as f32)),
            "stamina" => Some(Knowledge::Number(self.stamina as f32)),
            "max_stamina" => Some(Knowledge::Number(self.max_stamina as f32)),
            "faction" => Some(Knowledge::Number(self.faction as f32)),
            "prepared_to_battle" => Some(Knowledge::Flag(self.prepared_to_battle())),
            "prepared_to_attack" => Some(Knowledge::Flag(self.prepared_to_attack())),
            "prepared_to_defence" => Some(Knowledge::Flag(self.prepared_to_defence())),
            _ => None,
        }
    }

    /// Maximum paired with a percent-comparable attribute, used to resolve
    /// percent operands against this actor's own scale.
    pub fn attribute_maximum(&self, name: &str) -> Option<f32> {
        match name {
            "hp" => Some(self.max_hp as f32),
            "stamina" => Some(self.max_stamina as f32),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;

    fn move_record(time: u64) -> Action {
        Action::Move {
            time,
            success: true,
            previous_position: Some(Vector::new(0, 0)),
            direction: Direction::Right,
        }
    }

    #[test]
    fn action_log_is_bounded_and_ordered() {
        let mut actor = Actor::new("<Goblin>", "goblin");
        for time in 0..8 {
            actor.push_action(move_record(time), 1);
        }
        assert_eq!(actor.last_actions().len(), ACTION_LOG_LEN);
        assert_eq!(actor.last_actions().first().unwrap().time(), 3);
        assert_eq!(actor.last_action().unwrap().time(), 7);
    }

    #[test]
    fn repeat_actions_in_a_round_cost_more() {
        let mut actor = Actor::new("<Goblin>", "goblin");
        let before = actor.stamina;
        actor.push_action(move_record(1), 1);
        assert_eq!(actor.stamina, before - 2);
        actor.push_action(move_record(1), 1);
        assert_eq!(actor.stamina, before - 2 - 4);
    }

    #[test]
    fn exhaustion_sets_in_and_recovers() {
        let mut actor = Actor::new("<Goblin>", "goblin");
        actor.stamina = -3;
        actor.handle_exhausting(100);
        assert!(actor.exhausted);
        assert_eq!(actor.next_action_time, 130);

        actor.stamina = 2;
        actor.handle_exhausting(129);
        assert!(actor.exhausted);
        actor.handle_exhausting(130);
        assert!(!actor.exhausted);
    }

    #[test]
    fn prepared_flags_follow_the_last_action() {
        let mut actor = Actor::new("<Goblin>", "goblin");
        assert!(!actor.prepared_to_battle());

        actor.attack_energy = 4;
        actor.push_action(
            Action::PrepareToBattle {
                time: 1,
                kind: BattleKind::Attack,
                energy: 4,
            },
            1,
        );
        assert!(actor.prepared_to_battle());
        assert!(actor.prepared_to_attack());
        assert!(!actor.prepared_to_defence());

        // A later move makes the preparation stale.
        actor.push_action(move_record(2), 1);
        assert!(!actor.prepared_to_battle());
    }

    #[test]
    fn attribute_reads_are_typed() {
        let mut actor = Actor::new("<Goblin>", "goblin");
        actor.position = Vector::new(3, 4);
        actor.hp = 7;

        assert_eq!(
            actor.attribute("position"),
            Some(Knowledge::Position(Vector::new(3, 4)))
        );
        assert_eq!(actor.attribute("hp"), Some(Knowledge::Number(7.0)));
        assert_eq!(
            actor.attribute("prepared_to_battle"),
            Some(Knowledge::Flag(false))
        );
        assert_eq!(actor.attribute("charisma"), None);

        assert_eq!(actor.attribute_maximum("hp"), Some(20.0));
        assert_eq!(actor.attribute_maximum("faction"), None);
    }

    #[test]
    fn self_scope_recall_reads_attributes_not_blackboard() {
        let mut actor = Actor::new("<Goblin>", "goblin");
        let path = MemoryPath::parse("hp");
        actor.remember_knowledge(&path, Knowledge::Number(999.0));

        assert_eq!(
            actor.recall_knowledge(&path, false),
            Some(Knowledge::Number(20.0))
        );
        assert_eq!(
            actor.recall_knowledge(&path, true),
            Some(Knowledge::Number(999.0))
        );
    }
}

//! Action Records
//!
//! Every committed (or refused) world mutation produces one of these
//! records. They land in the acting actor's bounded action log and in the
//! runner's JSONL output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::geometry::{Direction, Vector};

/// Which way an actor channels its battle energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleKind {
    Attack,
    Defence,
}

impl BattleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BattleKind::Attack => "attack",
            BattleKind::Defence => "defence",
        }
    }
}

impl fmt::Display for BattleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BattleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(BattleKind::Attack),
            "defence" => Ok(BattleKind::Defence),
            other => Err(format!("unknown battle kind: '{other}'")),
        }
    }
}

/// A single action taken by an actor, stamped with the simulation tick it
/// occurred on. Refused actions (out of stamina, still on cooldown) are
/// recorded too, with `success: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Move {
        time: u64,
        success: bool,
        previous_position: Option<Vector>,
        direction: Direction,
    },
    Attack {
        time: u64,
        defender: ActorId,
        success: bool,
        defender_alive: bool,
        damage: i32,
    },
    PrepareToBattle {
        time: u64,
        kind: BattleKind,
        energy: i32,
    },
}

impl Action {
    /// The tick this action occurred on.
    pub fn time(&self) -> u64 {
        match self {
            Action::Move { time, .. }
            | Action::Attack { time, .. }
            | Action::PrepareToBattle { time, .. } => *time,
        }
    }

    /// Stamina multiplier charged when the action is pushed onto an actor.
    pub fn stamina_cost(&self) -> i32 {
        1
    }

    /// The move direction, when this is a move record.
    pub fn move_direction(&self) -> Option<Direction> {
        match self {
            Action::Move { direction, .. } => Some(*direction),
            _ => None,
        }
    }

    /// The preparation kind, when this is a prepare record.
    pub fn battle_kind(&self) -> Option<BattleKind> {
        match self {
            Action::PrepareToBattle { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

//! Game Handler
//!
//! The authority over map, actors and time. All world mutations
//! (movement, combat, battle preparation) commit through here, one action
//! per call, so a tick can never interleave half-applied effects.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::action::{Action, BattleKind};
use crate::actor::{Actor, ActorId};
use crate::geometry::{Direction, Vector};
use crate::map::{GridMap, Tile};
use crate::pathfinding;

/// Why a position cannot be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedMovement {
    /// Outside the map bounds.
    OutOfBounds,
    /// Impassable terrain.
    Obstacle(Tile),
    /// Another actor is standing there.
    Occupied(ActorId),
}

/// The simulation world: one map, one actor table, one seeded RNG.
pub struct GameHandler {
    map: GridMap,
    actors: BTreeMap<ActorId, Actor>,
    time: u64,
    rng: SmallRng,
    to_kill: Vec<ActorId>,
}

impl GameHandler {
    pub fn new(map: GridMap, seed: u64) -> Self {
        Self {
            map,
            actors: BTreeMap::new(),
            time: 0,
            rng: SmallRng::seed_from_u64(seed),
            to_kill: Vec::new(),
        }
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// The shared simulation RNG. All randomness (including behaviour-tree
    /// dice rolls) draws from here, keeping runs reproducible per seed.
    pub fn rng_mut(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Add an actor, reassigning its id from the world RNG. Seeded ids
    /// keep the actor table's iteration order reproducible across runs.
    pub fn insert_actor(&mut self, mut actor: Actor) -> ActorId {
        let id = ActorId::from_rng(&mut self.rng);
        actor.set_id(id);
        self.actors.insert(id, actor);
        id
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// All actors, in stable id order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Ids of all actors, in stable order. Snapshot for iteration while
    /// mutating the world.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    /// Can an actor enter `position` right now?
    pub fn check_position(&self, position: Vector) -> Result<(), BlockedMovement> {
        let Some(tile) = self.map.get(position) else {
            return Err(BlockedMovement::OutOfBounds);
        };
        if !tile.passable() {
            return Err(BlockedMovement::Obstacle(tile));
        }
        if let Some(occupant) = self.get_actor_at(position) {
            return Err(BlockedMovement::Occupied(occupant));
        }
        Ok(())
    }

    /// Shorthand for "check_position succeeds".
    pub fn is_free(&self, position: Vector) -> bool {
        self.check_position(position).is_ok()
    }

    /// The actor standing at `position`, if any.
    pub fn get_actor_at(&self, position: Vector) -> Option<ActorId> {
        self.actors
            .values()
            .find(|actor| actor.position == position)
            .map(Actor::id)
    }

    /// A random free position, or `None` when the map is too crowded to
    /// find one in a bounded number of attempts.
    pub fn free_position(&mut self) -> Option<Vector> {
        for _ in 0..1000 {
            let candidate = Vector::new(
                self.rng.gen_range(0..self.map.width()),
                self.rng.gen_range(0..self.map.height()),
            );
            if self.is_free(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Shortest path from `start` to `goal` over the current map, ordered
    /// for consumption from the back (last element is the first step).
    pub fn find_path(&self, start: Vector, goal: Vector) -> Option<Vec<Vector>> {
        pathfinding::a_star(&self.map, start, goal)
    }

    /// Move one step. A move into an occupied tile becomes an attack on
    /// the occupant; bush and rock drain extra stamina; any movement
    /// forfeits banked battle energy.
    pub fn move_actor(&mut self, actor_id: ActorId, direction: Direction) -> Option<Action> {
        let (position, stamina, next_action_time) = {
            let actor = self.actors.get(&actor_id)?;
            (actor.position, actor.stamina, actor.next_action_time)
        };

        if stamina <= 0 || next_action_time > self.time {
            let action = Action::Move {
                time: self.time,
                success: false,
                previous_position: None,
                direction,
            };
            self.push_action(actor_id, action.clone());
            return Some(action);
        }

        let destination = position + direction.delta();
        match self.check_position(destination) {
            Err(BlockedMovement::Occupied(defender)) => self.attack_actor(actor_id, defender),
            Err(_) => {
                let action = Action::Move {
                    time: self.time,
                    success: false,
                    previous_position: None,
                    direction,
                };
                self.push_action(actor_id, action.clone());
                Some(action)
            }
            Ok(()) => {
                let tile = self.map.get(destination)?;
                let time = self.time;
                let actor = self.actors.get_mut(&actor_id)?;
                match tile {
                    Tile::Bush => actor.stamina -= 5,
                    Tile::Rock => actor.stamina -= 20,
                    _ => {}
                }
                actor.handle_exhausting(time);
                actor.attack_energy = 0;
                actor.defence_energy = 0;
                actor.position = destination;

                let action = Action::Move {
                    time,
                    success: true,
                    previous_position: Some(position),
                    direction,
                };
                self.push_action(actor_id, action.clone());
                Some(action)
            }
        }
    }

    /// Resolve one attack. Both sides spend their banked energy; damage is
    /// attack minus defence; a defender at 0 hp is queued for removal at
    /// the end of the tick.
    pub fn attack_actor(&mut self, attacker_id: ActorId, defender_id: ActorId) -> Option<Action> {
        let (attacker_position, stamina, next_action_time, attack) = {
            let attacker = self.actors.get(&attacker_id)?;
            (
                attacker.position,
                attacker.stamina,
                attacker.next_action_time,
                attacker.attack_power(),
            )
        };
        let (defender_position, defence) = {
            let defender = self.actors.get(&defender_id)?;
            (defender.position, defender.defence_power())
        };

        if stamina <= 0
            || next_action_time > self.time
            || !attacker_position.is_orthogonal_neighbour(defender_position)
        {
            let action = Action::Attack {
                time: self.time,
                defender: defender_id,
                success: false,
                defender_alive: true,
                damage: 0,
            };
            self.push_action(attacker_id, action.clone());
            return Some(action);
        }

        let time = self.time;
        let damage = attack - defence;

        {
            let attacker = self.actors.get_mut(&attacker_id)?;
            attacker.stamina -= attacker.attack_energy.max(1);
            attacker.handle_exhausting(time);
            attacker.attack_energy = 0;
            attacker.defence_energy = 0;
        }

        let defender_alive = {
            let defender = self.actors.get_mut(&defender_id)?;
            defender.stamina -= defender.defence_energy.max(1);
            defender.attack_energy = 0;
            defender.defence_energy = 0;
            defender.hp -= damage;
            defender.is_alive()
        };

        if !defender_alive {
            self.to_kill.push(defender_id);
        }

        debug!(
            attacker = %attacker_id,
            defender = %defender_id,
            damage,
            defender_alive,
            "attack resolved"
        );

        let action = Action::Attack {
            time,
            defender: defender_id,
            success: true,
            defender_alive,
            damage,
        };
        self.push_action(attacker_id, action.clone());
        Some(action)
    }

    /// Bank energy for the coming fight: attack energy and defence energy
    /// are mutually exclusive.
    pub fn prepare_to_battle(
        &mut self,
        actor_id: ActorId,
        kind: BattleKind,
        energy: i32,
    ) -> Option<Action> {
        {
            let actor = self.actors.get_mut(&actor_id)?;
            match kind {
                BattleKind::Attack => {
                    actor.attack_energy = energy;
                    actor.defence_energy = 0;
                }
                BattleKind::Defence => {
                    actor.attack_energy = 0;
                    actor.defence_energy = energy;
                }
            }
        }

        let action = Action::PrepareToBattle {
            time: self.time,
            kind,
            energy,
        };
        self.push_action(actor_id, action.clone());
        Some(action)
    }

    /// Advance the clock and run per-actor upkeep: round counters reset,
    /// stamina regenerates toward its cap, exhaustion timers tick.
    pub fn begin_tick(&mut self) {
        self.time += 1;
        let time = self.time;
        for actor in self.actors.values_mut() {
            actor.actions_in_round = 0;
            if actor.stamina < actor.max_stamina {
                actor.stamina = (actor.stamina + actor.stamina_regeneration).min(actor.max_stamina);
                actor.handle_exhausting(time);
            }
        }
    }

    /// Remove everyone queued for death this tick; returns the removed ids.
    pub fn flush_kills(&mut self) -> Vec<ActorId> {
        let mut removed = Vec::new();
        for id in std::mem::take(&mut self.to_kill) {
            if self.actors.remove(&id).is_some() {
                debug!(actor = %id, "actor removed");
                removed.push(id);
            }
        }
        removed
    }

    fn push_action(&mut self, actor_id: ActorId, action: Action) {
        let time_to_next = self.rng.gen_range(1..=3);
        if let Some(actor) = self.actors.get_mut(&actor_id) {
            actor.push_action(action, time_to_next);
        }
    }
}

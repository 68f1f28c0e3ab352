//! Simulation Runner
//!
//! Builds a world from the tuning config, spawns the configured
//! populations, and drives every non-player actor through its
//! behaviour tree once per tick.

use thiserror::Error;
use tracing::{debug, info};

use mossgard_behaviour::{BehaviourError, TreeLibrary};
use mossgard_world::{Actor, GameHandler};

use crate::config::{ConfigError, SimConfig};
use crate::logger::{ActionLogger, ActionRecord};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Behaviour(#[from] BehaviourError),
    #[error("failed to write the action log: {0}")]
    Log(#[from] std::io::Error),
    #[error("no free tile left while spawning '{kind}'")]
    WorldFull { kind: String },
}

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub ticks: u64,
    pub actions: u64,
    pub deaths: u64,
    pub survivors: usize,
}

pub struct Runner {
    game: GameHandler,
    library: TreeLibrary,
    logger: ActionLogger,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner").finish_non_exhaustive()
    }
}

impl Runner {
    /// Build the world and spawn every configured population. Each
    /// spawn entry must name a loaded behaviour tree.
    pub fn new(
        config: &SimConfig,
        library: TreeLibrary,
        logger: ActionLogger,
    ) -> Result<Self, RunError> {
        let map = config.map.build()?;
        let mut game = GameHandler::new(map, config.simulation.seed);

        for spawn in &config.spawn {
            library.get(&spawn.kind)?;
            for index in 1..=spawn.count {
                let Some(position) = game.free_position() else {
                    return Err(RunError::WorldFull {
                        kind: spawn.kind.clone(),
                    });
                };
                let mut actor = Actor::new(format!("{} {}", spawn.kind, index), &spawn.kind);
                actor.faction = spawn.faction;
                actor.position = position;
                actor.max_hp = spawn.max_hp;
                actor.hp = spawn.max_hp;
                actor.max_stamina = spawn.max_stamina;
                actor.stamina = spawn.max_stamina;
                actor.stamina_regeneration = spawn.stamina_regeneration;
                let id = game.insert_actor(actor);
                debug!(%id, kind = %spawn.kind, ?position, "spawned actor");
            }
        }

        Ok(Self {
            game,
            library,
            logger,
        })
    }

    pub fn game(&self) -> &GameHandler {
        &self.game
    }

    /// Drive the world for `ticks` ticks and flush the action log.
    pub fn run(&mut self, ticks: u64) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();
        for _ in 0..ticks {
            summary.ticks += 1;
            self.tick(&mut summary)?;
        }
        self.logger.flush()?;
        summary.survivors = self.game.actors().filter(|actor| actor.is_alive()).count();
        info!(
            ticks = summary.ticks,
            actions = summary.actions,
            deaths = summary.deaths,
            survivors = summary.survivors,
            "run finished"
        );
        Ok(summary)
    }

    fn tick(&mut self, summary: &mut RunSummary) -> Result<(), RunError> {
        self.game.begin_tick();
        let time = self.game.time();

        for id in self.game.actor_ids() {
            let Some(actor) = self.game.actor(id) else {
                continue;
            };
            if actor.is_player()
                || !actor.is_alive()
                || actor.exhausted
                || actor.stamina <= 0
                || actor.next_action_time > time
            {
                continue;
            }
            let kind = actor.kind.clone();

            let status = self.library.evaluate(&kind, id, &mut self.game)?;
            debug!(actor = %id, tree = %kind, %status, "evaluated");

            if let Some(actor) = self.game.actor(id) {
                let records: Vec<ActionRecord> = actor
                    .last_actions()
                    .iter()
                    .filter(|action| action.time() == time)
                    .map(|action| ActionRecord {
                        tick: time,
                        actor: id,
                        name: actor.name.clone(),
                        kind: kind.clone(),
                        action: action.clone(),
                    })
                    .collect();
                for record in records {
                    self.logger.log(&record)?;
                    summary.actions += 1;
                }
            }
        }

        let removed = self.game.flush_kills();
        summary.deaths += removed.len() as u64;
        for id in removed {
            debug!(actor = %id, tick = time, "actor died");
        }
        Ok(())
    }
}

//! Configuration Loading
//!
//! All runner settings come from a TOML tuning file; the command line can
//! override the seed and tick count. Partial files are fine, every section
//! falls back to its defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mossgard_world::{GridMap, MapParseError, Tile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("bad map layout: {0}")]
    Map(#[from] MapParseError),
}

/// Complete runner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub map: MapConfig,
    /// One entry per creature population to spawn.
    pub spawn: Vec<SpawnConfig>,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Number of ticks to simulate.
    pub ticks: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1000,
        }
    }
}

/// The world map: either an inline ASCII layout or a plain ground
/// rectangle of the given size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    /// ASCII layout (`.` ground, `"` bush, `^` rock, `~` water, `*` tree).
    /// Takes precedence over width/height when present.
    pub layout: Option<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 24,
            height: 16,
            layout: None,
        }
    }
}

impl MapConfig {
    pub fn build(&self) -> Result<GridMap, ConfigError> {
        match &self.layout {
            Some(layout) => Ok(GridMap::parse(layout)?),
            None => Ok(GridMap::filled(self.width, self.height, Tile::Ground)),
        }
    }
}

/// One spawned population. `kind` doubles as the behaviour tree name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub kind: String,
    pub faction: u32,
    pub count: u32,
    pub max_hp: i32,
    pub max_stamina: i32,
    pub stamina_regeneration: i32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            kind: "goblin".into(),
            faction: 0,
            count: 1,
            max_hp: 20,
            max_stamina: 12,
            stamina_regeneration: 1,
        }
    }
}

//! Tile Map
//!
//! Tile kinds and the row-major grid the simulation runs on. World
//! generation is out of scope; maps are built programmatically or parsed
//! from ASCII fixtures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Vector;

/// A terrain tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Ground,
    Bush,
    Rock,
    Water,
    Tree,
}

impl Tile {
    /// Whether an actor can stand on this tile at all.
    pub fn passable(self) -> bool {
        !matches!(self, Tile::Water | Tile::Tree)
    }

    /// Path cost of stepping onto this tile; `None` for impassable terrain.
    /// Bush and rock are crossable but punishing, matching their stamina
    /// drain on movement.
    pub fn movement_cost(self) -> Option<u32> {
        match self {
            Tile::Ground => Some(1),
            Tile::Bush => Some(5),
            Tile::Rock => Some(20),
            Tile::Water | Tile::Tree => None,
        }
    }

    /// The ASCII symbol used by map fixtures and dumps.
    pub fn symbol(self) -> char {
        match self {
            Tile::Ground => '.',
            Tile::Bush => '"',
            Tile::Rock => '^',
            Tile::Water => '~',
            Tile::Tree => '*',
        }
    }

    fn from_symbol(symbol: char) -> Option<Tile> {
        match symbol {
            '.' | ' ' => Some(Tile::Ground),
            '"' => Some(Tile::Bush),
            '^' => Some(Tile::Rock),
            '~' => Some(Tile::Water),
            '*' => Some(Tile::Tree),
            _ => None,
        }
    }
}

/// Errors from parsing an ASCII map fixture.
#[derive(Debug, Error)]
pub enum MapParseError {
    #[error("map is empty")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown tile symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },
}

/// A rectangular, row-major tile grid.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl GridMap {
    /// A map of the given size filled with one tile kind.
    pub fn filled(width: i32, height: i32, tile: Tile) -> Self {
        assert!(width > 0 && height > 0, "map dimensions must be positive");
        Self {
            width,
            height,
            tiles: vec![tile; (width * height) as usize],
        }
    }

    /// Parse an ASCII fixture: one line per row, one symbol per tile.
    pub fn parse(text: &str) -> Result<Self, MapParseError> {
        let rows: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
        let height = rows.len();
        if height == 0 {
            return Err(MapParseError::Empty);
        }
        let width = rows[0].chars().count();

        let mut tiles = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            let symbols: Vec<char> = line.chars().collect();
            if symbols.len() != width {
                return Err(MapParseError::RaggedRow {
                    row,
                    found: symbols.len(),
                    expected: width,
                });
            }
            for (column, symbol) in symbols.into_iter().enumerate() {
                let tile = Tile::from_symbol(symbol).ok_or(MapParseError::UnknownSymbol {
                    symbol,
                    row,
                    column,
                })?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            width: width as i32,
            height: height as i32,
            tiles,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, position: Vector) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.width && position.y < self.height
    }

    pub fn get(&self, position: Vector) -> Option<Tile> {
        if !self.contains(position) {
            return None;
        }
        Some(self.tiles[(position.y * self.width + position.x) as usize])
    }

    pub fn set(&mut self, position: Vector, tile: Tile) {
        if self.contains(position) {
            self.tiles[(position.y * self.width + position.x) as usize] = tile;
        }
    }

    /// Render the map back to its ASCII form.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.tiles[(y * self.width + x) as usize].symbol());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_through_ascii() {
        let source = "..\"\n~^.\n";
        let error = GridMap::parse(source).unwrap_err();
        assert!(matches!(error, MapParseError::RaggedRow { row: 1, .. }));

        let source = "..\"\n~^*\n";
        let map = GridMap::parse(source).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert_eq!(map.get(Vector::new(2, 0)), Some(Tile::Bush));
        assert_eq!(map.get(Vector::new(0, 1)), Some(Tile::Water));
        assert_eq!(map.to_ascii(), "..\"\n~^*\n");
    }

    #[test]
    fn out_of_bounds_is_none() {
        let map = GridMap::filled(4, 3, Tile::Ground);
        assert!(map.contains(Vector::new(3, 2)));
        assert!(!map.contains(Vector::new(4, 2)));
        assert!(!map.contains(Vector::new(-1, 0)));
        assert_eq!(map.get(Vector::new(0, 3)), None);
    }

    #[test]
    fn passability_matches_movement_cost() {
        for tile in [Tile::Ground, Tile::Bush, Tile::Rock, Tile::Water, Tile::Tree] {
            assert_eq!(tile.passable(), tile.movement_cost().is_some());
        }
    }
}

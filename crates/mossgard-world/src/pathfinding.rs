//! Pathfinding
//!
//! A* over the tile grid, weighted by terrain movement cost. Actors are
//! deliberately not treated as obstacles: paths are plans, and whoever is
//! in the way now may be gone by the time the path is walked.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::geometry::Vector;
use crate::map::GridMap;

/// Shortest path from `start` to `goal`, or `None` when the goal is
/// unreachable. The result is ordered goal-first so callers can `pop()`
/// the next waypoint off the end.
pub fn a_star(map: &GridMap, start: Vector, goal: Vector) -> Option<Vec<Vector>> {
    if start == goal {
        return Some(Vec::new());
    }
    if !map.contains(goal) {
        return None;
    }

    let mut frontier: BinaryHeap<Reverse<(u32, Vector)>> = BinaryHeap::new();
    let mut came_from: HashMap<Vector, Vector> = HashMap::new();
    let mut cost_so_far: HashMap<Vector, u32> = HashMap::new();

    frontier.push(Reverse((0, start)));
    cost_so_far.insert(start, 0);

    while let Some(Reverse((_, current))) = frontier.pop() {
        if current == goal {
            break;
        }

        for candidate in current.orthogonal_neighbours() {
            let Some(tile) = map.get(candidate) else {
                continue;
            };
            let Some(step_cost) = tile.movement_cost() else {
                continue;
            };
            let new_cost = cost_so_far[&current] + step_cost;
            if cost_so_far
                .get(&candidate)
                .map_or(true, |&known| new_cost < known)
            {
                cost_so_far.insert(candidate, new_cost);
                let priority = new_cost + candidate.manhattan(goal) as u32;
                frontier.push(Reverse((priority, candidate)));
                came_from.insert(candidate, current);
            }
        }
    }

    if !came_from.contains_key(&goal) {
        return None;
    }

    let mut path = Vec::new();
    let mut tile = goal;
    while tile != start {
        path.push(tile);
        tile = came_from[&tile];
    }
    Some(path)
}

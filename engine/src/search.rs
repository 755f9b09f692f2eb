// ═══════════════════════════════════════════════════════════════════════
// BFS distance engine
//
// Flood-fill shortest paths over the walkable subgraph induced by the
// grid's one-step adjacency. The maze is assumed connected for all
// agent-reachable floor, so running out of frontier before every target
// is found is an invariant violation surfaced as an explicit error.
// ═══════════════════════════════════════════════════════════════════════

use crate::grid::Grid;
use crate::types::Point;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("walkable graph is disconnected: {missing} target(s) unreachable from {origin}")]
    Disconnected { origin: Point, missing: usize },
}

/// All cells within `max_distance` hops of `origin` (origin excluded),
/// mapped to their hop count.
pub fn neighbours(grid: &Grid, origin: Point, max_distance: u32) -> HashMap<Point, u32> {
    let mut distances: HashMap<Point, u32> = HashMap::new();
    let mut queue: VecDeque<(Point, u32)> = VecDeque::new();
    distances.insert(origin, 0);
    queue.push_back((origin, 0));

    while let Some((current, dist)) = queue.pop_front() {
        if dist == max_distance {
            continue;
        }
        for next in grid.step_neighbours(current) {
            if !distances.contains_key(&next) {
                distances.insert(next, dist + 1);
                queue.push_back((next, dist + 1));
            }
        }
    }

    distances.remove(&origin);
    distances
}

/// Shortest-path distance from `origin` to every cell in `targets`,
/// expanding ring by ring and stopping as soon as all targets have been
/// recorded. Targets are recorded the first time they are reached; the
/// origin itself is a target at distance 0.
pub fn path_distances(
    grid: &Grid,
    origin: Point,
    targets: &HashSet<Point>,
) -> Result<HashMap<Point, u32>, SearchError> {
    let mut found: HashMap<Point, u32> = HashMap::new();
    if targets.is_empty() {
        return Ok(found);
    }

    let mut visited: HashSet<Point> = HashSet::new();
    let mut queue: VecDeque<(Point, u32)> = VecDeque::new();
    visited.insert(origin);
    queue.push_back((origin, 0));

    while let Some((current, dist)) = queue.pop_front() {
        if targets.contains(&current) {
            found.insert(current, dist);
            if found.len() == targets.len() {
                return Ok(found);
            }
        }
        for next in grid.step_neighbours(current) {
            if visited.insert(next) {
                queue.push_back((next, dist + 1));
            }
        }
    }

    Err(SearchError::Disconnected {
        origin,
        missing: targets.len() - found.len(),
    })
}

/// Single-target convenience form.
pub fn path_distance(grid: &Grid, origin: Point, target: Point) -> Result<u32, SearchError> {
    let targets: HashSet<Point> = [target].into_iter().collect();
    let found = path_distances(grid, origin, &targets)?;
    Ok(found[&target])
}

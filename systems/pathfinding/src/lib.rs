#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Baseline pathing and coin placement over a generated track.
//!
//! The baseline path is the breadth-first shortest route from the start to
//! the nearest finish cell, moving one cell per step in any of the nine
//! direction offsets. Coins are scattered away from the entrance and valued by
//! how far a participant must stray from the baseline to collect them.

use std::collections::{HashSet, VecDeque};

use log::debug;
use racetrack_core::{CellFlags, Coin, Direction, Position, TrackGrid};
use rand::Rng;
use thiserror::Error;

/// Multiplier applied to a coin's distance from the baseline path.
pub const COIN_VALUE_FACTOR: u32 = 3;

/// Errors raised while searching for the baseline path.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// No finish cell can be reached from the start.
    #[error("no finish cell is reachable from {start}")]
    Unreachable {
        /// Position the search started from.
        start: Position,
    },
}

/// Errors raised while scattering coins across the track.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Fewer eligible cells exist than coins were requested.
    #[error("requested {requested} coins but only {available} cells can hold one")]
    InsufficientCells {
        /// Number of coins requested.
        requested: u32,
        /// Number of cells eligible for a coin.
        available: usize,
    },
    /// Coins cannot be valued without a baseline path.
    #[error("coins cannot be valued against an empty baseline path")]
    EmptyPath,
}

/// Arena record of a breadth-first search node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PathNode {
    position: Position,
    parent: Option<usize>,
}

/// Finds the shortest start-to-finish route through the grid.
///
/// Neighbours are explored in canonical [`Direction::ALL`] order, so among
/// equally short routes the first one discovered wins. The search stops as
/// soon as a cell carrying [`CellFlags::FINISH`] is dequeued. The returned
/// path starts with `start` and ends on the finish cell.
pub fn shortest_path(start: Position, grid: &TrackGrid) -> Result<Vec<Position>, PathError> {
    if grid.is_blocked(start) {
        return Err(PathError::Unreachable { start });
    }

    let mut arena = vec![PathNode {
        position: start,
        parent: None,
    }];
    let mut discovered = HashSet::from([start]);
    let mut queue = VecDeque::from([0usize]);

    while let Some(current) = queue.pop_front() {
        let Some(node) = arena.get(current).copied() else {
            continue;
        };
        if grid.has(node.position, CellFlags::FINISH) {
            let path = unwind(&arena, current);
            debug!("baseline path from {start} spans {} cells", path.len());
            return Ok(path);
        }

        for direction in Direction::ALL {
            let next = node.position.step(direction);
            if grid.is_blocked(next) || !discovered.insert(next) {
                continue;
            }
            queue.push_back(arena.len());
            arena.push(PathNode {
                position: next,
                parent: Some(current),
            });
        }
    }

    Err(PathError::Unreachable { start })
}

fn unwind(arena: &[PathNode], last: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(last);
    while let Some(index) = cursor {
        let Some(node) = arena.get(index) else {
            break;
        };
        path.push(node.position);
        cursor = node.parent;
    }
    path.reverse();
    path
}

/// Minimum Manhattan distance from `cell` to any position on `path`.
///
/// Returns `None` for an empty path.
#[must_use]
pub fn distance_to_path(cell: Position, path: &[Position]) -> Option<u32> {
    path.iter()
        .map(|step| cell.manhattan_distance(*step))
        .min()
}

/// Scatters `count` coins across the grid and flags their cells.
///
/// Candidate cells lie at or beyond `scale` on both axes, keeping the
/// entrance row and column clear. Rows and columns are sampled uniformly
/// until `count` distinct non-wall cells without a coin are found. Each coin
/// is worth [`COIN_VALUE_FACTOR`] times its distance to the baseline path.
/// The eligible cell count is checked before any random draw so sampling
/// always terminates.
pub fn coin_placement<R: Rng + ?Sized>(
    grid: &mut TrackGrid,
    count: u32,
    scale: u32,
    rng: &mut R,
    path: &[Position],
) -> Result<Vec<Coin>, PlacementError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if path.is_empty() {
        return Err(PlacementError::EmptyPath);
    }

    let offset = i32::try_from(scale).unwrap_or(i32::MAX);
    let eligible = |grid: &TrackGrid, cell: Position| {
        cell.row() >= offset
            && cell.column() >= offset
            && !grid.is_blocked(cell)
            && !grid.has(cell, CellFlags::COIN)
    };

    let requested = usize::try_from(count).unwrap_or(usize::MAX);
    let available = grid
        .positions()
        .filter(|cell| eligible(grid, *cell))
        .count();
    if available < requested {
        return Err(PlacementError::InsufficientCells {
            requested: count,
            available,
        });
    }

    let rows = i32::try_from(grid.rows()).unwrap_or(i32::MAX);
    let columns = i32::try_from(grid.columns()).unwrap_or(i32::MAX);
    let mut coins = Vec::with_capacity(requested);

    while coins.len() < requested {
        let cell = Position::new(rng.gen_range(offset..rows), rng.gen_range(offset..columns));
        if !eligible(grid, cell) {
            continue;
        }
        let distance = distance_to_path(cell, path).unwrap_or(0);
        grid.insert(cell, CellFlags::COIN);
        coins.push(Coin::new(cell, COIN_VALUE_FACTOR * distance));
    }

    debug!(
        "placed {} coins worth {} in total",
        coins.len(),
        coins.iter().map(|coin| coin.value()).sum::<u32>()
    );

    Ok(coins)
}

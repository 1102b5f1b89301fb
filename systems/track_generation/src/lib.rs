#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic maze track generation.
//!
//! A race track starts life as a small logical maze: odd/odd lattice cells are
//! open, everything else is wall. Randomized depth-first carving turns the
//! lattice into a perfect maze, a single hole-punching pass opens loops, and
//! the result is upscaled into the physical grid participants drive on before
//! sharp corners get smoothed. Every random decision is drawn from the caller's
//! generator in a fixed order so identical seeds yield identical tracks.

use std::collections::HashSet;

use log::debug;
use racetrack_core::{CellFlags, Position, RaceConfig, TrackGrid};
use rand::{seq::SliceRandom, Rng};

/// Logical cell through which participants enter the maze.
pub const LOGICAL_START: Position = Position::new(0, 1);

/// Logical lattice cell the carving walk begins from.
pub const CARVE_ORIGIN: Position = Position::new(1, 1);

/// Number of hole-punching passes applied to a freshly carved maze.
pub const HOLE_PUNCH_PASSES: u32 = 1;

/// Lattice steps explored by the carving walk: north, west, east, south.
const LATTICE_STEPS: [(i32, i32); 4] = [(-2, 0), (0, -2), (0, 2), (2, 0)];

/// Orthogonal wall layouts `(up, down, left, right)` around a wall that may
/// be punched through. `true` marks a wall neighbour.
const HOLE_PATTERNS: [WallPattern; 7] = [
    WallPattern::new(false, false, false, false),
    WallPattern::new(true, true, false, false),
    WallPattern::new(false, false, true, true),
    WallPattern::new(true, false, false, false),
    WallPattern::new(false, false, false, true),
    WallPattern::new(false, false, true, false),
    WallPattern::new(false, true, false, false),
];

/// Orthogonal wall layouts forming a sharp corner that gets smoothed away.
const CORNER_PATTERNS: [WallPattern; 4] = [
    WallPattern::new(true, false, true, false),
    WallPattern::new(false, true, true, false),
    WallPattern::new(false, true, false, true),
    WallPattern::new(true, false, false, true),
];

/// Physical track produced by [`generate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedTrack {
    /// Upscaled grid participants race on.
    pub grid: TrackGrid,
    /// Standing position every participant starts from.
    pub start: Position,
}

/// Builds the unconnected lattice: odd/odd cells are empty, the rest is wall.
#[must_use]
pub fn init(rows: u32, columns: u32) -> TrackGrid {
    let mut grid = TrackGrid::filled(rows, columns, CellFlags::WALL);
    let lattice: Vec<Position> = grid
        .positions()
        .filter(|cell| cell.row() % 2 == 1 && cell.column() % 2 == 1)
        .collect();
    for cell in lattice {
        grid.set(cell, CellFlags::EMPTY);
    }
    grid
}

/// Carves a perfect maze through the lattice starting at `origin`.
///
/// The walk is a randomized depth-first search driven by an explicit stack,
/// visiting cells in the same order a recursive formulation would. Each cell
/// shuffles its four lattice steps on entry; a neighbour two cells away is
/// entered when it lies below the top border, right of the left border,
/// inside the grid and has not been visited yet. Entering a neighbour clears
/// the wall between the two lattice cells.
pub fn carve<R: Rng + ?Sized>(origin: Position, grid: &mut TrackGrid, rng: &mut R) {
    let mut visited = HashSet::new();
    let _ = visited.insert(origin);
    let mut stack = vec![CarveFrame::enter(origin, rng)];

    while let Some(frame) = stack.last_mut() {
        let Some(&(row_step, column_step)) = frame.steps.get(frame.cursor) else {
            let _ = stack.pop();
            continue;
        };
        frame.cursor += 1;
        let cell = frame.cell;

        let neighbour = Position::new(cell.row() + row_step, cell.column() + column_step);
        if !is_carvable(grid, neighbour, &visited) {
            continue;
        }

        grid.clear_wall(Position::new(
            cell.row() + row_step / 2,
            cell.column() + column_step / 2,
        ));
        let _ = visited.insert(neighbour);
        stack.push(CarveFrame::enter(neighbour, rng));
    }
}

/// Randomly opens walls to create loops in a carved maze.
///
/// Cells are visited in row-major order over `2..len-1` on both axes. A wall
/// whose neighbourhood matches one of the hole patterns consumes exactly one
/// uniform draw and is opened when that draw falls below `probability`.
/// Cells that do not match consume nothing, which keeps the random stream
/// aligned across probabilities.
pub fn punch_holes<R: Rng + ?Sized>(
    grid: &mut TrackGrid,
    passes: u32,
    probability: f64,
    rng: &mut R,
) {
    let rows = extent(grid.rows());
    let columns = extent(grid.columns());
    let mut opened = 0usize;

    for _ in 0..passes {
        for row in 2..rows - 1 {
            for column in 2..columns - 1 {
                let cell = Position::new(row, column);
                if !grid.has(cell, CellFlags::WALL) {
                    continue;
                }
                if !HOLE_PATTERNS.contains(&WallPattern::around(grid, cell)) {
                    continue;
                }
                if rng.gen::<f64>() < probability {
                    grid.clear_wall(cell);
                    opened += 1;
                }
            }
        }
    }

    debug!("punched {opened} holes with probability {probability}");
}

/// Removes interior walls that form sharp diagonal corners.
///
/// Patterns are matched against the grid as it was before the pass, so a
/// removed corner never exposes its neighbours to further cuts.
pub fn cut_corners(grid: &mut TrackGrid) {
    let source = grid.clone();
    let rows = extent(source.rows());
    let columns = extent(source.columns());

    for row in 1..rows - 1 {
        for column in 1..columns - 1 {
            let cell = Position::new(row, column);
            if source.has(cell, CellFlags::WALL)
                && CORNER_PATTERNS.contains(&WallPattern::around(&source, cell))
            {
                grid.clear_wall(cell);
            }
        }
    }
}

/// Replaces every cell with a `factor` × `factor` block of identical flags.
#[must_use]
pub fn upscale(grid: &TrackGrid, factor: u32) -> TrackGrid {
    let mut scaled = TrackGrid::filled(
        grid.rows().saturating_mul(factor),
        grid.columns().saturating_mul(factor),
        CellFlags::NONE,
    );
    let factor = extent(factor);

    for cell in grid.positions() {
        let flags = grid.flags(cell).unwrap_or_default();
        for row in 0..factor {
            for column in 0..factor {
                scaled.set(
                    Position::new(cell.row() * factor + row, cell.column() * factor + column),
                    flags,
                );
            }
        }
    }

    scaled
}

/// Logical finish cell of a maze with the provided number of columns.
#[must_use]
pub fn logical_finish(columns: u32) -> Position {
    Position::new(0, extent(columns) - 2)
}

/// Runs the complete generation pipeline for a race configuration.
///
/// The configuration is expected to have passed [`RaceConfig::validate`].
pub fn generate<R: Rng + ?Sized>(config: &RaceConfig, rng: &mut R) -> GeneratedTrack {
    let mut maze = init(config.rows, config.columns);
    maze.set(LOGICAL_START, CellFlags::EMPTY);
    maze.set(
        logical_finish(config.columns),
        CellFlags::EMPTY | CellFlags::FINISH,
    );

    carve(CARVE_ORIGIN, &mut maze, rng);
    punch_holes(&mut maze, HOLE_PUNCH_PASSES, config.hole_probability, rng);

    let mut grid = upscale(&maze, config.scale);
    cut_corners(&mut grid);

    let scale = extent(config.scale);
    let start = Position::new(
        LOGICAL_START.row() * scale + scale / 2,
        LOGICAL_START.column() * scale + scale / 2,
    );

    debug!(
        "generated {}x{} track, start {start}",
        grid.rows(),
        grid.columns()
    );

    GeneratedTrack { grid, start }
}

#[derive(Debug)]
struct CarveFrame {
    cell: Position,
    steps: [(i32, i32); 4],
    cursor: usize,
}

impl CarveFrame {
    fn enter<R: Rng + ?Sized>(cell: Position, rng: &mut R) -> Self {
        let mut steps = LATTICE_STEPS;
        steps.shuffle(rng);
        Self {
            cell,
            steps,
            cursor: 0,
        }
    }
}

fn is_carvable(grid: &TrackGrid, cell: Position, visited: &HashSet<Position>) -> bool {
    cell.row() > 0
        && cell.column() > 0
        && grid.has(cell, CellFlags::EMPTY)
        && !visited.contains(&cell)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct WallPattern {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl WallPattern {
    const fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        Self {
            up,
            down,
            left,
            right,
        }
    }

    fn around(grid: &TrackGrid, cell: Position) -> Self {
        let wall = |row: i32, column: i32| {
            grid.has(
                Position::new(cell.row() + row, cell.column() + column),
                CellFlags::WALL,
            )
        };
        Self::new(wall(-1, 0), wall(1, 0), wall(0, -1), wall(0, 1))
    }
}

fn extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement resolution for a single participant turn.
//!
//! A steering impulse bends the participant's velocity, the resulting travel
//! segment is rasterized, and the first wall along it stops the participant
//! on the last free cell. The resolver then leaves a trace along the travelled
//! segment and sweeps every coin the segment touched off the grid.

use log::debug;
use racetrack_core::{
    geometry::{coverage, line_8connect},
    CellFlags, Direction, ParticipantState, Position, TrackGrid, Velocity,
};

/// Result of resolving one steering impulse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Authoritative state after the move.
    pub state: ParticipantState,
    /// Whether a blocked cell cut the travel segment short.
    pub clamped: bool,
    /// Cells whose coin was collected by this move, in sweep order.
    pub collected: Vec<Position>,
}

/// Applies `impulse` to `state` and resolves the resulting travel on `grid`.
///
/// The grid is updated in place: every cell of the travelled 8-connected line
/// gains [`CellFlags::TRACE`], and every coin inside the travelled swath loses
/// [`CellFlags::COIN`]. A collected coin is removed from the grid, so it can be
/// reported at most once across all moves.
pub fn resolve(
    state: ParticipantState,
    impulse: Direction,
    grid: &mut TrackGrid,
) -> MoveOutcome {
    let origin = state.position;
    let velocity = state.velocity.accelerate(impulse);
    let target = origin.offset(velocity);

    let line = line_8connect(origin, target);
    let free = line
        .iter()
        .take_while(|cell| !grid.is_blocked(**cell))
        .count();
    let clamped = free < line.len();

    let next = if clamped {
        let reachable = free
            .checked_sub(1)
            .and_then(|index| line.get(index).copied())
            .unwrap_or(origin);
        ParticipantState::new(reachable, Velocity::between(origin, reachable))
    } else {
        ParticipantState::new(target, velocity)
    };

    if clamped {
        debug!("travel {origin} -> {target} clamped at {}", next.position);
    }

    for cell in line_8connect(origin, next.position) {
        grid.insert(cell, CellFlags::TRACE);
    }

    let collected: Vec<Position> = coverage(origin, next.position)
        .into_iter()
        .filter(|cell| grid.has(*cell, CellFlags::COIN))
        .collect();
    for cell in &collected {
        grid.remove(*cell, CellFlags::COIN);
    }

    MoveOutcome {
        state: next,
        clamped,
        collected,
    }
}

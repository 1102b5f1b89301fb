//! Stock driver implementations.

use std::time::Duration;

use log::warn;
use racetrack_core::{Direction, ParticipantState, Position, SlotId, TrackGrid, Velocity};
use racetrack_system_pathfinding::shortest_path;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::{Driver, DriverContext};

/// Driver that never produces a steering decision.
///
/// Used for replays, where it forfeits on its first turn.
#[derive(Clone, Debug)]
pub struct DummyDriver {
    slot: SlotId,
    state: ParticipantState,
}

impl DummyDriver {
    /// Creates a dummy driver for the context's slot.
    #[must_use]
    pub fn new(context: DriverContext) -> Self {
        Self {
            slot: context.slot,
            state: context.state,
        }
    }

    /// Creates a boxed dummy driver.
    #[must_use]
    pub fn boxed(context: DriverContext) -> Box<dyn Driver> {
        Box::new(Self::new(context))
    }
}

impl Driver for DummyDriver {
    fn slot(&self) -> SlotId {
        self.slot
    }

    fn state(&self) -> ParticipantState {
        self.state
    }

    fn steer(&mut self, _remaining: Duration) -> Option<Direction> {
        None
    }

    fn sync(&mut self, state: ParticipantState) {
        self.state = state;
    }
}

/// Driver picking one of the nine impulses uniformly at random.
#[derive(Clone, Debug)]
pub struct RandomDriver {
    slot: SlotId,
    state: ParticipantState,
    rng: ChaCha8Rng,
}

impl RandomDriver {
    /// Creates a random driver seeded from the context's generator.
    #[must_use]
    pub fn new(context: DriverContext) -> Self {
        Self {
            slot: context.slot,
            state: context.state,
            rng: context.rng,
        }
    }

    /// Creates a boxed random driver.
    #[must_use]
    pub fn boxed(context: DriverContext) -> Box<dyn Driver> {
        Box::new(Self::new(context))
    }
}

impl Driver for RandomDriver {
    fn slot(&self) -> SlotId {
        self.slot
    }

    fn state(&self) -> ParticipantState {
        self.state
    }

    fn steer(&mut self, _remaining: Duration) -> Option<Direction> {
        Direction::ALL.choose(&mut self.rng).copied()
    }

    fn sync(&mut self, state: ParticipantState) {
        self.state = state;
    }
}

/// Driver walking its own baseline path one cell per turn.
///
/// The follower aims for a velocity equal to the step toward the next path
/// cell. When that step cannot be reached with a single impulse it brakes to
/// a standstill first, so it never leaves the path. A participant that finds
/// itself off the path, for instance after a clamped move, plans a new path
/// from where it stands.
#[derive(Clone, Debug)]
pub struct FollowerDriver {
    slot: SlotId,
    state: ParticipantState,
    grid: TrackGrid,
    path: Vec<Position>,
}

impl FollowerDriver {
    /// Creates a follower and plans its path on the context's grid copy.
    #[must_use]
    pub fn new(context: DriverContext) -> Self {
        let path = plan(context.slot, context.state.position, &context.grid);
        Self {
            slot: context.slot,
            state: context.state,
            grid: context.grid,
            path,
        }
    }

    /// Creates a boxed follower.
    #[must_use]
    pub fn boxed(context: DriverContext) -> Box<dyn Driver> {
        Box::new(Self::new(context))
    }

    fn next_waypoint(&mut self) -> Option<Position> {
        let position = self.state.position;
        let index = match self.path.iter().position(|cell| *cell == position) {
            Some(index) => index,
            None => {
                self.path = plan(self.slot, position, &self.grid);
                0
            }
        };
        self.path.get(index + 1).copied()
    }
}

impl Driver for FollowerDriver {
    fn slot(&self) -> SlotId {
        self.slot
    }

    fn state(&self) -> ParticipantState {
        self.state
    }

    fn steer(&mut self, _remaining: Duration) -> Option<Direction> {
        let velocity = self.state.velocity;
        let desired = self
            .next_waypoint()
            .map_or(Velocity::ZERO, |waypoint| {
                Velocity::between(self.state.position, waypoint)
            });

        let row = desired.row() - velocity.row();
        let column = desired.column() - velocity.column();
        if row.abs() > 1 || column.abs() > 1 {
            return Some(Direction::from_components(-velocity.row(), -velocity.column()));
        }
        Some(Direction::from_components(row, column))
    }

    fn sync(&mut self, state: ParticipantState) {
        self.state = state;
    }
}

fn plan(slot: SlotId, from: Position, grid: &TrackGrid) -> Vec<Position> {
    match shortest_path(from, grid) {
        Ok(path) => path,
        Err(error) => {
            warn!("follower {slot} cannot plan a path: {error}");
            Vec::new()
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative race state management.
//!
//! The world owns the track grid, the coin ledger and every participant's
//! bookkeeping for the lifetime of a race. Adapters mutate it exclusively by
//! submitting [`Command`] values to [`apply`] and observe it through the
//! [`query`] module.

mod setup;

use log::{debug, info, warn};
use racetrack_core::{
    duration_nanos, validate_participant_count, CellFlags, Coin, Command, Direction,
    DisqualificationReason, Event, FinishReason, ParticipantState, Position, RaceConfig, SlotId,
    TrackGrid, DISQUALIFIED_BUDGET,
};
use racetrack_system_movement::resolve;
use racetrack_system_track_generation::GeneratedTrack;
use std::time::Duration;

pub use setup::{RaceSetup, SetupError};

/// Lifecycle phase of a race.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacePhase {
    /// The world waits for the steering decision of the provided slot.
    AwaitingAction(SlotId),
    /// The race ended and rejects further commands.
    Finished(FinishReason),
}

/// Coin together with its collection status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoinRecord {
    coin: Coin,
    collected: bool,
}

impl CoinRecord {
    /// Coin placed on the track.
    #[must_use]
    pub const fn coin(&self) -> Coin {
        self.coin
    }

    /// Whether a participant already collected the coin.
    #[must_use]
    pub const fn collected(&self) -> bool {
        self.collected
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Participant {
    state: ParticipantState,
    score: i64,
    remaining: i64,
}

impl Participant {
    fn has_time(&self) -> bool {
        self.remaining > 0
    }
}

/// Represents the authoritative race state.
#[derive(Clone, Debug)]
pub struct World {
    config: RaceConfig,
    grid: TrackGrid,
    start: Position,
    path: Vec<Position>,
    coins: Vec<CoinRecord>,
    participants: Vec<Participant>,
    active: SlotId,
    iteration: u32,
    max_iterations: u32,
    phase: RacePhase,
}

impl World {
    /// Creates a race for `participant_count` participants on a prepared setup.
    ///
    /// Every participant starts at rest on the start cell with a full time
    /// budget and a score of one minus the baseline path length. A race whose
    /// start already satisfies a terminal condition is finished immediately.
    pub fn new(setup: RaceSetup, participant_count: usize) -> Result<Self, SetupError> {
        validate_participant_count(participant_count)?;

        let (config, mut grid, start, path, coins) = setup.into_parts();
        let par = i64::try_from(path.len()).unwrap_or(i64::MAX).saturating_sub(1);
        let budget = config.time_budget_nanos();
        let coin_total = coins
            .iter()
            .fold(0u32, |total, coin| total.saturating_add(coin.value()));
        let max_iterations = u32::try_from(path.len())
            .unwrap_or(u32::MAX)
            .saturating_add(coin_total);

        let participants = SlotId::first(participant_count)
            .map(|slot| {
                grid.insert(start, CellFlags::occupied(slot));
                Participant {
                    state: ParticipantState::at_rest(start),
                    score: -par,
                    remaining: budget,
                }
            })
            .collect();

        let mut world = Self {
            config,
            grid,
            start,
            path,
            coins: coins
                .into_iter()
                .map(|coin| CoinRecord {
                    coin,
                    collected: false,
                })
                .collect(),
            participants,
            active: SlotId::new(0),
            iteration: 0,
            max_iterations,
            phase: RacePhase::AwaitingAction(SlotId::new(0)),
        };

        info!(
            "race ready: {participant_count} participants, baseline {} cells, iteration budget {}",
            world.path.len(),
            world.max_iterations
        );

        let mut events = Vec::new();
        world.check_finished(&mut events);
        Ok(world)
    }

    /// Generates a seeded race and seats `participant_count` participants.
    pub fn generate(config: RaceConfig, participant_count: usize) -> Result<Self, SetupError> {
        Self::new(RaceSetup::generate(config)?, participant_count)
    }

    /// Seats `participant_count` participants on a prebuilt track.
    pub fn from_track(
        track: GeneratedTrack,
        coins: Vec<Coin>,
        config: RaceConfig,
        participant_count: usize,
    ) -> Result<Self, SetupError> {
        Self::new(RaceSetup::from_track(track, coins, config)?, participant_count)
    }

    fn participant(&self, slot: SlotId) -> Option<&Participant> {
        self.participants.get(slot.index())
    }

    fn participant_mut(&mut self, slot: SlotId) -> Option<&mut Participant> {
        self.participants.get_mut(slot.index())
    }

    fn disqualify(&mut self, slot: SlotId, reason: DisqualificationReason, out: &mut Vec<Event>) {
        if let Some(participant) = self.participant_mut(slot) {
            participant.remaining = DISQUALIFIED_BUDGET;
        }
        warn!("participant {slot} disqualified: {reason:?}");
        out.push(Event::ParticipantDisqualified { slot, reason });
    }

    fn steer(&mut self, slot: SlotId, direction: Direction, elapsed: Duration, out: &mut Vec<Event>) {
        let Some(from) = self.participant(slot).map(|participant| participant.state) else {
            return;
        };
        let occupied = CellFlags::occupied(slot);

        self.grid.remove(from.position, occupied);
        self.grid.insert(from.position, CellFlags::TRACE);
        let outcome = resolve(from, direction, &mut self.grid);
        self.grid.insert(outcome.state.position, occupied);

        let mut bonus = 0i64;
        let mut collected = Vec::new();
        for cell in &outcome.collected {
            let Some(record) = self
                .coins
                .iter_mut()
                .find(|record| !record.collected && record.coin.position() == *cell)
            else {
                continue;
            };
            record.collected = true;
            bonus += i64::from(record.coin.value());
            collected.push(record.coin);
        }

        let Some(participant) = self.participant_mut(slot) else {
            return;
        };
        participant.state = outcome.state;
        participant.score = participant.score + 1 - bonus;
        participant.remaining = participant
            .remaining
            .saturating_sub(duration_nanos(elapsed));
        let exhausted = !participant.has_time();

        debug!(
            "participant {slot} steered {direction}: {from} -> {}{}",
            outcome.state,
            if outcome.clamped { " (clamped)" } else { "" }
        );
        out.push(Event::ParticipantMoved {
            slot,
            from,
            to: outcome.state,
            clamped: outcome.clamped,
        });
        for coin in collected {
            debug!("participant {slot} collected coin worth {}", coin.value());
            out.push(Event::CoinCollected { slot, coin });
        }

        if exhausted {
            warn!("participant {slot} exhausted its time budget");
            out.push(Event::ParticipantDisqualified {
                slot,
                reason: DisqualificationReason::TimeExhausted,
            });
        }
    }

    /// Hands the turn to the next slot with time left, wrapping into a new
    /// iteration past the last slot.
    fn advance(&mut self, out: &mut Vec<Event>) {
        if !self.participants.iter().any(Participant::has_time) {
            return;
        }

        let count = self.participants.len();
        let mut index = self.active.index();
        loop {
            index += 1;
            if index >= count {
                index = 0;
                self.iteration = self.iteration.saturating_add(1);
                out.push(Event::IterationAdvanced {
                    iteration: self.iteration,
                });
            }
            if self.participants.get(index).is_some_and(Participant::has_time) {
                break;
            }
        }

        self.active = SlotId::new(u8::try_from(index).unwrap_or(0));
        self.phase = RacePhase::AwaitingAction(self.active);
    }

    fn check_finished(&mut self, out: &mut Vec<Event>) {
        let active = self.participant(self.active);
        let reason = if self.iteration > self.max_iterations {
            FinishReason::IterationBudgetExhausted
        } else if !active.is_some_and(Participant::has_time) {
            FinishReason::NoActiveParticipants
        } else if active.is_some_and(|participant| {
            self.grid
                .has(participant.state.position, CellFlags::FINISH)
        }) {
            FinishReason::FinishLineReached { slot: self.active }
        } else {
            return;
        };

        info!("race finished after {} iterations: {reason:?}", self.iteration);
        self.phase = RacePhase::Finished(reason);
        out.push(Event::RaceFinished { reason });
    }

    fn effective_score(&self, participant: &Participant) -> i64 {
        if participant.has_time() {
            participant.score
        } else {
            i64::from(self.config.scale)
                .saturating_mul(i64::from(self.grid.rows()))
                .saturating_mul(i64::from(self.grid.columns()))
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Steer {
            slot,
            claimed,
            direction,
            elapsed,
        } => {
            let RacePhase::AwaitingAction(active) = world.phase else {
                debug!("ignoring steering from {slot}: race finished");
                out_events.push(Event::CommandRejected { slot });
                return;
            };

            let authoritative = world.participant(active).map(|participant| participant.state);
            match direction {
                None => world.disqualify(active, DisqualificationReason::InvalidAction, out_events),
                Some(_) if slot != active || authoritative != Some(claimed) => {
                    warn!(
                        "protocol violation: {slot} claimed {claimed} while {active} holds {:?}",
                        authoritative
                    );
                    world.disqualify(active, DisqualificationReason::StateMismatch, out_events);
                }
                Some(direction) => world.steer(active, direction, elapsed, out_events),
            }

            world.advance(out_events);
            world.check_finished(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{CoinRecord, RacePhase, World};
    use racetrack_core::{Coin, ParticipantState, Position, RaceConfig, SlotId, TrackGrid};

    /// Current lifecycle phase of the race.
    #[must_use]
    pub fn phase(world: &World) -> RacePhase {
        world.phase
    }

    /// Slot whose steering decision the world awaits, if the race is running.
    #[must_use]
    pub fn active_slot(world: &World) -> Option<SlotId> {
        match world.phase {
            RacePhase::AwaitingAction(slot) => Some(slot),
            RacePhase::Finished(_) => None,
        }
    }

    /// Number of completed passes over every participant.
    #[must_use]
    pub fn iteration(world: &World) -> u32 {
        world.iteration
    }

    /// Iteration budget: baseline length plus the total value of all coins.
    #[must_use]
    pub fn max_iterations(world: &World) -> u32 {
        world.max_iterations
    }

    /// Configuration the race was built from.
    #[must_use]
    pub fn config(world: &World) -> &RaceConfig {
        &world.config
    }

    /// Position every participant started from.
    #[must_use]
    pub fn start(world: &World) -> Position {
        world.start
    }

    /// Baseline path from the start to the nearest finish cell.
    #[must_use]
    pub fn baseline_path(world: &World) -> &[Position] {
        &world.path
    }

    /// Coin ledger including collection status.
    #[must_use]
    pub fn coins(world: &World) -> &[CoinRecord] {
        &world.coins
    }

    /// Live track grid including trace and occupancy flags.
    #[must_use]
    pub fn grid(world: &World) -> &TrackGrid {
        &world.grid
    }

    /// Number of participants seated in the race.
    #[must_use]
    pub fn participant_count(world: &World) -> usize {
        world.participants.len()
    }

    /// Authoritative physical state of a slot.
    #[must_use]
    pub fn state(world: &World, slot: SlotId) -> Option<ParticipantState> {
        world.participant(slot).map(|participant| participant.state)
    }

    /// Raw score of a slot: turns taken minus par minus coins collected.
    #[must_use]
    pub fn score(world: &World, slot: SlotId) -> Option<i64> {
        world.participant(slot).map(|participant| participant.score)
    }

    /// Score used for comparison, replaced by a penalty once a slot is out of time.
    #[must_use]
    pub fn effective_score(world: &World, slot: SlotId) -> Option<i64> {
        world
            .participant(slot)
            .map(|participant| world.effective_score(participant))
    }

    /// Remaining decision time of a slot in signed nanoseconds.
    #[must_use]
    pub fn remaining_budget(world: &World, slot: SlotId) -> Option<i64> {
        world.participant(slot).map(|participant| participant.remaining)
    }

    /// Whether a slot still takes turns.
    #[must_use]
    pub fn is_active(world: &World, slot: SlotId) -> bool {
        world
            .participant(slot)
            .is_some_and(|participant| participant.has_time())
    }

    /// Captures the immutable view a driver is constructed from.
    ///
    /// The grid and coins are copies; drivers never observe later mutations.
    #[must_use]
    pub fn snapshot(world: &World, slot: SlotId) -> Option<RaceSnapshot> {
        let state = state(world, slot)?;
        Some(RaceSnapshot {
            slot,
            state,
            grid: world.grid.clone(),
            coins: world
                .coins
                .iter()
                .filter(|record| !record.collected())
                .map(CoinRecord::coin)
                .collect(),
            seed: world.config.seed,
            time_budget: world.config.time_budget,
        })
    }

    /// Ranks every slot by effective score, ties broken by slot order.
    #[must_use]
    pub fn standings(world: &World) -> Vec<Standing> {
        let mut standings: Vec<Standing> = world
            .participants
            .iter()
            .zip(SlotId::first(world.participants.len()))
            .map(|(participant, slot)| Standing {
                slot,
                score: world.effective_score(participant),
                remaining: participant.remaining,
                disqualified: !participant.has_time(),
            })
            .collect();
        standings.sort_by_key(|standing| (standing.score, standing.slot));
        standings
    }

    /// Immutable race snapshot handed to a participant's driver.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct RaceSnapshot {
        /// Slot the driver steers.
        pub slot: SlotId,
        /// Physical state of the slot when the snapshot was taken.
        pub state: ParticipantState,
        /// Copy of the track grid.
        pub grid: TrackGrid,
        /// Coins still on the track.
        pub coins: Vec<Coin>,
        /// Race seed, used to seed the driver's own generator.
        pub seed: u64,
        /// Decision time granted to each participant.
        pub time_budget: Duration,
    }

    /// Final or interim placing of a single slot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Standing {
        /// Ranked slot.
        pub slot: SlotId,
        /// Effective score; lower is better.
        pub score: i64,
        /// Remaining decision time in signed nanoseconds.
        pub remaining: i64,
        /// Whether the slot was removed from the race.
        pub disqualified: bool,
    }
}

//! Turn loop driving seated drivers against the world.

use std::{
    fmt,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result as AnyResult};
use log::{debug, info, warn};
use racetrack_core::{Command, Event, FinishReason, SlotId};
use racetrack_rendering::{Frame, RenderingBackend};
use racetrack_system_drivers::{Driver, DriverContext, DriverRegistry, RegistryError};
use racetrack_world::{self as world, query, RacePhase, World};

use crate::args::RenderMode;

/// Driver steering one slot, together with the kind it was requested as.
pub(crate) struct Entrant {
    kind: String,
    driver: Box<dyn Driver>,
}

/// Builds one driver per slot from the kinds given in slot order.
///
/// In replay mode every slot is seated with the dummy driver instead.
pub(crate) fn seat(
    world: &World,
    registry: &DriverRegistry,
    kinds: &[String],
    replay: bool,
) -> AnyResult<Vec<Entrant>> {
    SlotId::first(kinds.len())
        .zip(kinds)
        .map(|(slot, kind)| -> AnyResult<Entrant> {
            let snapshot = query::snapshot(world, slot)
                .with_context(|| format!("{slot} is not part of the race"))?;
            let requested = if replay {
                warn!("replay mode: {slot} drives as {} instead of {kind}", DriverRegistry::DUMMY);
                DriverRegistry::DUMMY
            } else {
                kind.as_str()
            };
            let driver = registry.build(requested, DriverContext::from(snapshot))?;
            Ok(Entrant {
                kind: kind.to_ascii_lowercase(),
                driver,
            })
        })
        .collect()
}

/// Checks every requested kind before any race state is built.
pub(crate) fn check_kinds(registry: &DriverRegistry, kinds: &[String]) -> Result<(), RegistryError> {
    match kinds.iter().find(|kind| !registry.contains(kind)) {
        Some(kind) => Err(RegistryError::UnknownKind {
            kind: kind.clone(),
            available: registry.kinds().collect::<Vec<_>>().join(", "),
        }),
        None => Ok(()),
    }
}

/// Runs turns until the race finishes and reports the finishing condition.
pub(crate) fn run(
    world: &mut World,
    entrants: &mut [Entrant],
    render: RenderMode,
    backend: &mut dyn RenderingBackend,
) -> AnyResult<FinishReason> {
    let mut events = Vec::new();
    let mut turn = 0_u32;

    while let Some(slot) = query::active_slot(world) {
        let entrant = entrants
            .get_mut(slot.index())
            .with_context(|| format!("no driver seated in {slot}"))?;
        let remaining = query::remaining_budget(world, slot)
            .and_then(|nanos| u64::try_from(nanos).ok())
            .map_or(Duration::ZERO, Duration::from_nanos);

        let claimed = entrant.driver.state();
        let started = Instant::now();
        let direction = entrant.driver.steer(remaining);
        let elapsed = started.elapsed();

        events.clear();
        world::apply(
            world,
            Command::Steer {
                slot,
                claimed,
                direction,
                elapsed,
            },
            &mut events,
        );
        for event in &events {
            match event {
                Event::ParticipantMoved { slot, to, .. } => {
                    if let Some(entrant) = entrants.get_mut(slot.index()) {
                        entrant.driver.sync(*to);
                    }
                }
                Event::CoinCollected { slot, coin } => {
                    debug!("{slot} collected a coin worth {} at {}", coin.value(), coin.position());
                }
                Event::ParticipantDisqualified { slot, reason } => {
                    info!("{slot} disqualified: {reason:?}");
                }
                Event::RaceFinished { reason } => info!("race finished: {}", describe(*reason)),
                Event::IterationAdvanced { .. } | Event::CommandRejected { .. } => {}
            }
        }

        turn += 1;
        if render == RenderMode::Turns {
            backend.present(&Frame::capture(format!("TURN {turn}"), query::grid(world)))?;
        }
    }

    if render != RenderMode::None {
        backend.present(&Frame::capture("FINAL", query::grid(world)))?;
    }

    match query::phase(world) {
        RacePhase::Finished(reason) => Ok(reason),
        RacePhase::AwaitingAction(slot) => bail!("race stopped while awaiting {slot}"),
    }
}

fn describe(reason: FinishReason) -> String {
    match reason {
        FinishReason::FinishLineReached { slot } => format!("{slot} reached the finish line"),
        FinishReason::IterationBudgetExhausted => "iteration budget exhausted".to_owned(),
        FinishReason::NoActiveParticipants => "no participant has time left".to_owned(),
    }
}

/// Outcome of a single participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SummaryEntry {
    slot: SlotId,
    kind: String,
    score: i64,
    remaining: i64,
}

/// Final report printed after a race.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RaceSummary {
    iteration: u32,
    baseline: usize,
    reason: FinishReason,
    entries: Vec<SummaryEntry>,
}

impl RaceSummary {
    /// Collects the final figures of every seated participant.
    pub(crate) fn collect(world: &World, entrants: &[Entrant], reason: FinishReason) -> Self {
        let entries = SlotId::first(entrants.len())
            .zip(entrants)
            .map(|(slot, entrant)| SummaryEntry {
                slot,
                kind: entrant.kind.clone(),
                score: query::effective_score(world, slot).unwrap_or_default(),
                remaining: query::remaining_budget(world, slot).unwrap_or_default(),
            })
            .collect();

        Self {
            iteration: query::iteration(world),
            baseline: query::baseline_path(world).len(),
            reason,
            entries,
        }
    }
}

impl fmt::Display for RaceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ITERATION: {} BASELINE: {} RESULT: {}",
            self.iteration,
            self.baseline,
            describe(self.reason)
        )?;
        for entry in &self.entries {
            writeln!(
                f,
                "\t{} ({}) SCORE: {} REMAINING: {}ms",
                entry.slot,
                entry.kind,
                entry.score,
                entry.remaining / 1_000_000
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use racetrack_core::{Position, RaceConfig, TrackGrid};
    use racetrack_rendering::TerminalBackend;
    use racetrack_system_track_generation::GeneratedTrack;

    fn corridor(participants: usize) -> World {
        let grid = TrackGrid::from_ascii(
            "#..-#\n\
             #####\n\
             #####\n\
             #####\n\
             #####",
        )
        .expect("layout");
        let config = RaceConfig {
            rows: 5,
            columns: 5,
            scale: 1,
            hole_probability: 0.0,
            coin_count: 0,
            seed: 11,
            time_budget: Duration::from_secs(5),
        };
        World::from_track(
            GeneratedTrack {
                grid,
                start: Position::new(0, 1),
            },
            Vec::new(),
            config,
            participants,
        )
        .expect("valid corridor")
    }

    fn kinds(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn follower_wins_the_corridor() {
        let mut world = corridor(1);
        let registry = DriverRegistry::with_stock_drivers();
        let mut entrants = seat(&world, &registry, &kinds(&["Follower"]), false).expect("seated");
        let mut backend = TerminalBackend::new(Vec::new());

        let reason = run(&mut world, &mut entrants, RenderMode::Final, &mut backend)
            .expect("race completes");

        assert_eq!(
            reason,
            FinishReason::FinishLineReached {
                slot: SlotId::new(0)
            }
        );
        let summary = RaceSummary::collect(&world, &entrants, reason);
        assert_eq!(summary.entries.len(), 1);
        assert_eq!(summary.entries[0].kind, "follower");
        assert_eq!(summary.entries[0].score, 0);
        assert_eq!(summary.baseline, 3);

        let written = String::from_utf8(backend.into_inner()).expect("utf-8");
        assert!(written.starts_with("FINAL\n"));
        assert_eq!(written.lines().count(), 6);
    }

    #[test]
    fn replay_mode_seats_dummies_that_forfeit() {
        let mut world = corridor(2);
        let registry = DriverRegistry::with_stock_drivers();
        let mut entrants =
            seat(&world, &registry, &kinds(&["follower", "random"]), true).expect("seated");
        let mut backend = TerminalBackend::new(Vec::new());

        let reason = run(&mut world, &mut entrants, RenderMode::None, &mut backend)
            .expect("race completes");

        assert_eq!(reason, FinishReason::NoActiveParticipants);
        assert!(backend.into_inner().is_empty());
        let summary = RaceSummary::collect(&world, &entrants, reason);
        assert_eq!(summary.entries[0].kind, "follower");
        assert_eq!(summary.entries[1].kind, "random");
        assert!(summary.entries.iter().all(|entry| entry.remaining < 0));
    }

    #[test]
    fn turn_rendering_presents_every_turn() {
        let mut world = corridor(1);
        let registry = DriverRegistry::with_stock_drivers();
        let mut entrants = seat(&world, &registry, &kinds(&["follower"]), false).expect("seated");
        let mut backend = TerminalBackend::new(Vec::new());

        let _ = run(&mut world, &mut entrants, RenderMode::Turns, &mut backend)
            .expect("race completes");

        let written = String::from_utf8(backend.into_inner()).expect("utf-8");
        let titles: Vec<&str> = written
            .lines()
            .filter(|line| line.starts_with("TURN") || line.starts_with("FINAL"))
            .collect();
        assert_eq!(titles, vec!["TURN 1", "TURN 2", "FINAL"]);
    }

    #[test]
    fn unknown_kinds_are_caught_up_front() {
        let registry = DriverRegistry::with_stock_drivers();
        assert!(check_kinds(&registry, &kinds(&["follower", "RANDOM"])).is_ok());
        let error = check_kinds(&registry, &kinds(&["dummy", "keyboard"])).expect_err("unknown");
        assert_eq!(
            error,
            RegistryError::UnknownKind {
                kind: "keyboard".to_owned(),
                available: "dummy, follower, random".to_owned(),
            }
        );
    }

    #[test]
    fn summary_lists_every_slot() {
        let summary = RaceSummary {
            iteration: 4,
            baseline: 9,
            reason: FinishReason::IterationBudgetExhausted,
            entries: vec![SummaryEntry {
                slot: SlotId::new(0),
                kind: "random".to_owned(),
                score: 12,
                remaining: 2_500_000,
            }],
        };
        let text = summary.to_string();
        assert!(text.starts_with("ITERATION: 4 BASELINE: 9 RESULT: iteration budget exhausted\n"));
        assert!(text.contains("(random) SCORE: 12 REMAINING: 2ms"));
    }
}

use std::time::Duration;

use racetrack_core::{
    Command, Direction, DisqualificationReason, Event, FinishReason, Position, RaceConfig, SlotId,
    TrackGrid,
};
use racetrack_system_drivers::{Driver, DriverContext, DriverRegistry};
use racetrack_system_track_generation::GeneratedTrack;
use racetrack_world::{self as world, query, RacePhase, World};

fn elbow_track() -> World {
    let grid = TrackGrid::from_ascii(
        "#.####\n\
         #.####\n\
         #....-\n\
         ######",
    )
    .expect("layout");
    let config = RaceConfig {
        rows: 4,
        columns: 6,
        scale: 1,
        hole_probability: 0.0,
        coin_count: 0,
        seed: 3,
        time_budget: Duration::from_secs(60),
    };
    let track = GeneratedTrack {
        grid,
        start: Position::new(0, 1),
    };
    World::from_track(track, Vec::new(), config, 1).expect("valid setup")
}

fn seat(world: &World, kinds: &[&str]) -> Vec<Box<dyn Driver>> {
    let registry = DriverRegistry::with_stock_drivers();
    kinds
        .iter()
        .zip(SlotId::first(kinds.len()))
        .map(|(kind, slot)| {
            let snapshot = query::snapshot(world, slot).expect("seated slot");
            registry
                .build(kind, DriverContext::from(snapshot))
                .expect("stock kind")
        })
        .collect()
}

fn race(world: &mut World, drivers: &mut [Box<dyn Driver>]) -> Vec<Event> {
    let mut log = Vec::new();
    while let Some(slot) = query::active_slot(world) {
        let driver = &mut drivers[slot.index()];
        let remaining = query::remaining_budget(world, slot).unwrap_or_default();
        let direction = driver.steer(Duration::from_nanos(remaining.max(0) as u64));
        let mut events = Vec::new();
        world::apply(
            world,
            Command::Steer {
                slot,
                claimed: driver.state(),
                direction,
                elapsed: Duration::ZERO,
            },
            &mut events,
        );
        for event in &events {
            if let Event::ParticipantMoved { slot, to, .. } = event {
                drivers[slot.index()].sync(*to);
            }
        }
        log.extend(events);
    }
    log
}

#[test]
fn follower_completes_an_elbow_at_par() {
    let mut world = elbow_track();
    let mut drivers = seat(&world, &["follower"]);

    let log = race(&mut world, &mut drivers);

    let moves = log
        .iter()
        .filter(|event| matches!(event, Event::ParticipantMoved { .. }))
        .count();
    assert_eq!(moves, query::baseline_path(&world).len() - 1);
    assert_eq!(
        query::phase(&world),
        RacePhase::Finished(FinishReason::FinishLineReached {
            slot: SlotId::new(0)
        })
    );
    assert_eq!(query::score(&world, SlotId::new(0)), Some(0));
}

#[test]
fn dummy_forfeits_its_first_turn() {
    let mut world = elbow_track();
    let mut drivers = seat(&world, &["dummy"]);

    let log = race(&mut world, &mut drivers);

    assert_eq!(
        log.first(),
        Some(&Event::ParticipantDisqualified {
            slot: SlotId::new(0),
            reason: DisqualificationReason::InvalidAction
        })
    );
    assert_eq!(
        query::phase(&world),
        RacePhase::Finished(FinishReason::NoActiveParticipants)
    );
}

#[test]
fn random_drivers_share_the_race_seed() {
    let world = elbow_track();
    let mut first = seat(&world, &["random"]);
    let mut second = seat(&world, &["random"]);

    let sequence = |driver: &mut Box<dyn Driver>| -> Vec<Option<Direction>> {
        (0..32).map(|_| driver.steer(Duration::from_secs(1))).collect()
    };
    let a = sequence(&mut first[0]);
    let b = sequence(&mut second[0]);
    assert_eq!(a, b);
    assert!(a.iter().all(Option::is_some));
}

fn generated_config() -> RaceConfig {
    RaceConfig {
        rows: 9,
        columns: 15,
        scale: 2,
        hole_probability: 0.1,
        coin_count: 3,
        seed: 77,
        time_budget: Duration::from_secs(60),
    }
}

#[test]
fn mixed_field_races_are_reproducible() {
    let run = || {
        let mut world = World::generate(generated_config(), 3).expect("valid setup");
        let mut drivers = seat(&world, &["follower", "random", "follower"]);
        let log = race(&mut world, &mut drivers);
        (log, query::standings(&world))
    };

    let (first_log, first_standings) = run();
    let (second_log, second_standings) = run();
    assert_eq!(first_log, second_log);
    assert_eq!(first_standings, second_standings);
    assert!(!first_log.iter().any(|event| matches!(
        event,
        Event::ParticipantDisqualified {
            reason: DisqualificationReason::StateMismatch,
            ..
        }
    )));
}

use std::time::Duration;

use racetrack_core::{
    CellFlags, Coin, Command, Direction, DisqualificationReason, Event, FinishReason,
    ParticipantState, Position, RaceConfig, SlotId, TrackGrid, Velocity,
};
use racetrack_system_track_generation::GeneratedTrack;
use racetrack_world::{self as world, query, RacePhase, RaceSetup, SetupError, World};

fn config(time_budget: Duration) -> RaceConfig {
    RaceConfig {
        rows: 5,
        columns: 5,
        scale: 1,
        hole_probability: 0.0,
        coin_count: 0,
        seed: 1,
        time_budget,
    }
}

fn track(layout: &str) -> GeneratedTrack {
    GeneratedTrack {
        grid: TrackGrid::from_ascii(layout).expect("layout"),
        start: Position::new(0, 1),
    }
}

fn corridor(participants: usize) -> World {
    let layout = "#..-#\n#####\n#####\n#####\n#####";
    World::from_track(
        track(layout),
        Vec::new(),
        config(Duration::from_secs(5)),
        participants,
    )
    .expect("valid setup")
}

fn steer(world: &mut World, direction: Direction, elapsed: Duration) -> Vec<Event> {
    let slot = query::active_slot(world).expect("race running");
    let claimed = query::state(world, slot).expect("seated slot");
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Steer {
            slot,
            claimed,
            direction: Some(direction),
            elapsed,
        },
        &mut events,
    );
    events
}

#[test]
fn corridor_baseline_has_three_cells() {
    let world = corridor(1);
    assert_eq!(
        query::baseline_path(&world),
        &[Position::new(0, 1), Position::new(0, 2), Position::new(0, 3)]
    );
}

#[test]
fn steering_east_reaches_the_finish_at_par() {
    let mut world = corridor(1);
    let slot = SlotId::new(0);
    let mut turns = 0;

    while query::active_slot(&world).is_some() {
        let _ = steer(&mut world, Direction::East, Duration::from_millis(1));
        turns += 1;
        assert!(turns <= 3, "race should end by the third turn");
    }

    assert_eq!(turns, 2);
    assert_eq!(
        query::phase(&world),
        RacePhase::Finished(FinishReason::FinishLineReached { slot })
    );
    assert_eq!(
        query::state(&world, slot),
        Some(ParticipantState::new(Position::new(0, 3), Velocity::new(0, 2)))
    );
    assert_eq!(query::score(&world, slot), Some(0));
    assert_eq!(query::effective_score(&world, slot), Some(0));
}

#[test]
fn second_move_is_clamped_onto_the_finish() {
    let mut world = corridor(1);
    let first = steer(&mut world, Direction::East, Duration::ZERO);
    assert!(first.iter().any(|event| matches!(
        event,
        Event::ParticipantMoved { clamped: false, .. }
    )));

    let second = steer(&mut world, Direction::East, Duration::ZERO);
    assert!(second.iter().any(|event| matches!(
        event,
        Event::ParticipantMoved { clamped: true, .. }
    )));
    assert_eq!(
        second.last(),
        Some(&Event::RaceFinished {
            reason: FinishReason::FinishLineReached {
                slot: SlotId::new(0)
            }
        })
    );
}

#[test]
fn coins_strictly_between_positions_are_collected_once() {
    let layout = "#.....-#\n########\n########";
    let coin = Coin::new(Position::new(0, 3), 9);
    let mut world = World::from_track(
        track(layout),
        vec![coin],
        config(Duration::from_secs(5)),
        1,
    )
    .expect("valid setup");
    assert_eq!(query::score(&world, SlotId::new(0)), Some(-5));
    assert_eq!(query::max_iterations(&world), 6 + 9);

    let first = steer(&mut world, Direction::East, Duration::ZERO);
    assert!(!first
        .iter()
        .any(|event| matches!(event, Event::CoinCollected { .. })));

    let second = steer(&mut world, Direction::East, Duration::ZERO);
    assert_eq!(
        query::state(&world, SlotId::new(0)).map(|state| state.position),
        Some(Position::new(0, 4))
    );
    assert!(second.contains(&Event::CoinCollected {
        slot: SlotId::new(0),
        coin
    }));
    assert_eq!(query::score(&world, SlotId::new(0)), Some(-5 + 2 - 9));
    assert!(query::coins(&world)[0].collected());
    assert!(!query::grid(&world).has(coin.position(), CellFlags::COIN));

    let mut later = Vec::new();
    for direction in [Direction::West, Direction::West, Direction::East] {
        if query::active_slot(&world).is_none() {
            break;
        }
        later.extend(steer(&mut world, direction, Duration::ZERO));
    }
    assert!(!later
        .iter()
        .any(|event| matches!(event, Event::CoinCollected { .. })));
}

#[test]
fn tampered_state_disqualifies_the_active_slot() {
    let mut world = corridor(2);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Steer {
            slot: SlotId::new(0),
            claimed: ParticipantState::at_rest(Position::new(0, 2)),
            direction: Some(Direction::East),
            elapsed: Duration::ZERO,
        },
        &mut events,
    );

    assert_eq!(
        events.first(),
        Some(&Event::ParticipantDisqualified {
            slot: SlotId::new(0),
            reason: DisqualificationReason::StateMismatch
        })
    );
    assert_eq!(
        query::state(&world, SlotId::new(0)),
        Some(ParticipantState::at_rest(Position::new(0, 1)))
    );
    assert!(!query::grid(&world).has(Position::new(0, 2), CellFlags::TRACE));
    assert_eq!(query::active_slot(&world), Some(SlotId::new(1)));
}

#[test]
fn impersonating_another_slot_disqualifies_the_active_slot() {
    let mut world = corridor(2);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Steer {
            slot: SlotId::new(1),
            claimed: ParticipantState::at_rest(Position::new(0, 1)),
            direction: Some(Direction::East),
            elapsed: Duration::ZERO,
        },
        &mut events,
    );

    assert!(events.contains(&Event::ParticipantDisqualified {
        slot: SlotId::new(0),
        reason: DisqualificationReason::StateMismatch
    }));
    assert!(query::is_active(&world, SlotId::new(1)));
    assert!(!query::is_active(&world, SlotId::new(0)));
}

#[test]
fn overrunning_the_time_budget_ends_a_solo_race() {
    let layout = "#..-#\n#####\n#####";
    let mut world = World::from_track(
        track(layout),
        Vec::new(),
        config(Duration::from_millis(3)),
        1,
    )
    .expect("valid setup");

    let events = steer(&mut world, Direction::East, Duration::from_millis(4));

    assert!(events.contains(&Event::ParticipantDisqualified {
        slot: SlotId::new(0),
        reason: DisqualificationReason::TimeExhausted
    }));
    assert_eq!(
        query::phase(&world),
        RacePhase::Finished(FinishReason::NoActiveParticipants)
    );
    assert_eq!(query::effective_score(&world, SlotId::new(0)), Some(15));
}

#[test]
fn idling_exhausts_the_iteration_budget() {
    let mut world = corridor(1);
    let mut turns = 0;
    while query::active_slot(&world).is_some() {
        let _ = steer(&mut world, Direction::Stay, Duration::ZERO);
        turns += 1;
    }
    assert_eq!(turns, 4);
    assert_eq!(query::iteration(&world), 4);
    assert_eq!(
        query::phase(&world),
        RacePhase::Finished(FinishReason::IterationBudgetExhausted)
    );
}

#[test]
fn starting_on_the_finish_ends_the_race_immediately() {
    let layout = "#-.#\n####\n####";
    let world = World::from_track(
        track(layout),
        Vec::new(),
        config(Duration::from_secs(1)),
        1,
    )
    .expect("valid setup");
    assert_eq!(
        query::phase(&world),
        RacePhase::Finished(FinishReason::FinishLineReached {
            slot: SlotId::new(0)
        })
    );
}

#[test]
fn unreachable_finish_is_a_setup_error() {
    let layout = "#.#-#\n#####\n#####";
    let error = World::from_track(
        track(layout),
        Vec::new(),
        config(Duration::from_secs(1)),
        1,
    )
    .expect_err("finish walled off");
    assert!(matches!(error, SetupError::UnreachableFinish(_)));
}

#[test]
fn coins_on_walls_are_rejected() {
    let layout = "#..-#\n#####\n#####";
    let error = RaceSetup::from_track(
        track(layout),
        vec![Coin::new(Position::new(1, 1), 3)],
        config(Duration::from_secs(1)),
    )
    .expect_err("coin on a wall");
    assert_eq!(
        error,
        SetupError::MisplacedCoin {
            position: Position::new(1, 1)
        }
    );
}

#[test]
fn coins_sharing_a_cell_are_rejected() {
    let layout = "#....-#\n#######\n#######";
    let error = RaceSetup::from_track(
        track(layout),
        vec![
            Coin::new(Position::new(0, 3), 6),
            Coin::new(Position::new(0, 2), 3),
            Coin::new(Position::new(0, 3), 9),
        ],
        config(Duration::from_secs(1)),
    )
    .expect_err("two coins on one cell");
    assert_eq!(
        error,
        SetupError::DuplicateCoin {
            position: Position::new(0, 3)
        }
    );
}

#[test]
fn participant_counts_outside_one_to_four_are_rejected() {
    assert!(matches!(World::generate(generated_config(), 0), Err(SetupError::Config(_))));
    assert!(matches!(World::generate(generated_config(), 5), Err(SetupError::Config(_))));
}

fn generated_config() -> RaceConfig {
    RaceConfig {
        rows: 9,
        columns: 14,
        scale: 2,
        hole_probability: 0.2,
        coin_count: 4,
        seed: 2024,
        time_budget: Duration::from_secs(1),
    }
}

#[test]
fn generated_setups_are_reproducible() {
    let first = RaceSetup::generate(generated_config()).expect("valid setup");
    let second = RaceSetup::generate(generated_config()).expect("valid setup");
    assert_eq!(first, second);
    assert_eq!(first.coins().len(), 4);
    assert_eq!(first.grid().count(CellFlags::COIN), 4);
    assert_eq!(first.path().first(), Some(&first.start()));
}

#[test]
fn invalid_configurations_fail_before_generation() {
    let mut config = generated_config();
    config.rows = 2;
    assert!(matches!(RaceSetup::generate(config), Err(SetupError::Config(_))));
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Participant decision making.
//!
//! A [`Driver`] chooses one steering impulse per turn from the immutable
//! snapshot it was built with. Drivers are looked up by kind in a
//! [`DriverRegistry`], which ships with the stock `dummy`, `random` and
//! `follower` kinds.

mod stock;

use std::{collections::BTreeMap, time::Duration};

use racetrack_core::{Coin, Direction, ParticipantState, SlotId, TrackGrid};
use racetrack_world::query::RaceSnapshot;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

pub use stock::{DummyDriver, FollowerDriver, RandomDriver};

/// Decision logic steering a single participant slot.
pub trait Driver {
    /// Slot the driver steers.
    fn slot(&self) -> SlotId;

    /// State the driver believes its participant is in.
    fn state(&self) -> ParticipantState;

    /// Chooses the next steering impulse, or `None` to forfeit.
    fn steer(&mut self, remaining: Duration) -> Option<Direction>;

    /// Adopts the authoritative state reported after a turn.
    fn sync(&mut self, state: ParticipantState);
}

/// Everything a driver is constructed from.
#[derive(Clone, Debug)]
pub struct DriverContext {
    /// Slot the driver steers.
    pub slot: SlotId,
    /// Initial state of the participant.
    pub state: ParticipantState,
    /// Private copy of the track grid.
    pub grid: TrackGrid,
    /// Private copy of the coins on the track.
    pub coins: Vec<Coin>,
    /// Generator reserved for the driver's own decisions.
    pub rng: ChaCha8Rng,
}

impl From<RaceSnapshot> for DriverContext {
    fn from(snapshot: RaceSnapshot) -> Self {
        Self {
            slot: snapshot.slot,
            state: snapshot.state,
            grid: snapshot.grid,
            coins: snapshot.coins,
            rng: ChaCha8Rng::seed_from_u64(snapshot.seed),
        }
    }
}

/// Builds a boxed driver from its construction context.
pub type DriverConstructor = fn(DriverContext) -> Box<dyn Driver>;

/// Errors raised while resolving driver kinds.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No constructor is registered under the requested kind.
    #[error("unknown driver kind '{kind}' (available: {available})")]
    UnknownKind {
        /// Requested kind.
        kind: String,
        /// Comma separated list of registered kinds.
        available: String,
    },
}

/// Maps driver kind identifiers to constructors.
#[derive(Clone, Debug, Default)]
pub struct DriverRegistry {
    constructors: BTreeMap<String, DriverConstructor>,
}

impl DriverRegistry {
    /// Identifier of the driver that never steers.
    pub const DUMMY: &'static str = "dummy";
    /// Identifier of the driver steering uniformly at random.
    pub const RANDOM: &'static str = "random";
    /// Identifier of the driver following the baseline path.
    pub const FOLLOWER: &'static str = "follower";

    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every stock driver kind.
    #[must_use]
    pub fn with_stock_drivers() -> Self {
        let mut registry = Self::new();
        registry.register(Self::DUMMY, DummyDriver::boxed);
        registry.register(Self::RANDOM, RandomDriver::boxed);
        registry.register(Self::FOLLOWER, FollowerDriver::boxed);
        registry
    }

    /// Registers `constructor` under `kind`, replacing any previous entry.
    pub fn register(&mut self, kind: &str, constructor: DriverConstructor) {
        let _ = self
            .constructors
            .insert(kind.to_ascii_lowercase(), constructor);
    }

    /// Whether a constructor is registered under `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(&kind.to_ascii_lowercase())
    }

    /// Registered kinds in lexicographic order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Builds a driver of the requested kind.
    pub fn build(
        &self,
        kind: &str,
        context: DriverContext,
    ) -> Result<Box<dyn Driver>, RegistryError> {
        let constructor = self
            .constructors
            .get(&kind.to_ascii_lowercase())
            .ok_or_else(|| RegistryError::UnknownKind {
                kind: kind.to_owned(),
                available: self.kinds().collect::<Vec<_>>().join(", "),
            })?;
        Ok(constructor(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use racetrack_core::{CellFlags, Position};

    fn context() -> DriverContext {
        DriverContext {
            slot: SlotId::new(2),
            state: ParticipantState::at_rest(Position::new(0, 0)),
            grid: TrackGrid::filled(3, 3, CellFlags::EMPTY),
            coins: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    #[test]
    fn stock_registry_lists_every_kind() {
        let registry = DriverRegistry::with_stock_drivers();
        assert_eq!(
            registry.kinds().collect::<Vec<_>>(),
            vec!["dummy", "follower", "random"]
        );
        assert!(registry.contains("Random"));
    }

    #[test]
    fn unknown_kinds_are_reported() {
        let registry = DriverRegistry::with_stock_drivers();
        let error = registry
            .build("keyboard", context())
            .err()
            .expect("unknown kind");
        assert_eq!(
            error,
            RegistryError::UnknownKind {
                kind: "keyboard".to_owned(),
                available: "dummy, follower, random".to_owned(),
            }
        );
    }

    #[test]
    fn built_drivers_keep_their_slot() {
        let registry = DriverRegistry::with_stock_drivers();
        for kind in ["dummy", "random", "follower"] {
            let driver = registry.build(kind, context()).expect("stock kind");
            assert_eq!(driver.slot(), SlotId::new(2));
            assert_eq!(driver.state(), ParticipantState::at_rest(Position::new(0, 0)));
        }
    }

    #[test]
    fn custom_constructors_override_stock_ones() {
        let mut registry = DriverRegistry::with_stock_drivers();
        registry.register("RANDOM", DummyDriver::boxed);
        let mut driver = registry.build("random", context()).expect("registered");
        assert_eq!(driver.steer(Duration::from_secs(1)), None);
    }
}

//! Race setup pipeline: track, baseline path and coins.

use std::collections::HashSet;

use log::info;
use racetrack_core::{CellFlags, Coin, ConfigError, Position, RaceConfig, TrackGrid};
use racetrack_system_pathfinding::{coin_placement, shortest_path, PathError, PlacementError};
use racetrack_system_track_generation::{generate, GeneratedTrack};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Errors that prevent a race from being set up.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SetupError {
    /// The configuration or participant count was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No finish cell can be reached from the start position.
    #[error("track has no reachable finish: {0}")]
    UnreachableFinish(#[from] PathError),
    /// Coins could not be scattered across the track.
    #[error("coin placement failed: {0}")]
    CoinPlacement(#[from] PlacementError),
    /// A prebuilt coin sits on a wall or outside the grid.
    #[error("coin at {position} is not on a traversable cell")]
    MisplacedCoin {
        /// Position of the offending coin.
        position: Position,
    },
    /// Two prebuilt coins share a cell.
    #[error("more than one coin placed at {position}")]
    DuplicateCoin {
        /// Position shared by the coins.
        position: Position,
    },
}

/// Everything a race needs before participants join.
///
/// A setup owns the track grid with coin flags applied, the start position,
/// the baseline path and the coin ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceSetup {
    config: RaceConfig,
    grid: TrackGrid,
    start: Position,
    path: Vec<Position>,
    coins: Vec<Coin>,
}

impl RaceSetup {
    /// Runs the full seeded pipeline: generation, baseline path, coins.
    ///
    /// A single generator seeded from `config.seed` is consumed by carving,
    /// hole punching and coin placement, in that order.
    pub fn generate(config: RaceConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let GeneratedTrack { mut grid, start } = generate(&config, &mut rng);
        let path = shortest_path(start, &grid)?;
        let coins = coin_placement(
            &mut grid,
            config.coin_count,
            config.scale,
            &mut rng,
            &path,
        )?;

        info!(
            "generated {}x{} track from seed {}: baseline {} cells, {} coins",
            grid.rows(),
            grid.columns(),
            config.seed,
            path.len(),
            coins.len()
        );

        Ok(Self {
            config,
            grid,
            start,
            path,
            coins,
        })
    }

    /// Builds a setup around a prebuilt track and coin list.
    ///
    /// Coin cells are flagged on the grid and the baseline path is searched
    /// afresh. Every coin needs a traversable cell of its own. Only the scale, seed and time budget of `config` influence the
    /// race; its logical dimensions and coin count are not cross-checked.
    pub fn from_track(
        track: GeneratedTrack,
        coins: Vec<Coin>,
        config: RaceConfig,
    ) -> Result<Self, SetupError> {
        config.validate()?;

        let GeneratedTrack { mut grid, start } = track;
        let mut occupied = HashSet::with_capacity(coins.len());
        for coin in &coins {
            let position = coin.position();
            if grid.is_blocked(position) {
                return Err(SetupError::MisplacedCoin { position });
            }
            if !occupied.insert(position) {
                return Err(SetupError::DuplicateCoin { position });
            }
            grid.insert(position, CellFlags::COIN);
        }
        let path = shortest_path(start, &grid)?;

        Ok(Self {
            config,
            grid,
            start,
            path,
            coins,
        })
    }

    /// Configuration the race was built from.
    #[must_use]
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Track grid with coin flags applied.
    #[must_use]
    pub fn grid(&self) -> &TrackGrid {
        &self.grid
    }

    /// Position every participant starts from.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Baseline path from the start to the nearest finish cell.
    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Coins scattered across the track.
    #[must_use]
    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub(crate) fn into_parts(self) -> (RaceConfig, TrackGrid, Position, Vec<Position>, Vec<Coin>) {
        (self.config, self.grid, self.start, self.path, self.coins)
    }
}

//! Command-line parameters.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use racetrack_core::RaceConfig;

/// Runs a turn-based vector race on a generated maze track.
#[derive(Parser, Debug)]
#[command(name = "racetrack", version, long_about = None)]
pub(crate) struct Args {
    /// Number of logical maze rows before upscaling (at least 3)
    rows: u32,
    /// Number of logical maze columns before upscaling (at least 4)
    columns: u32,
    /// Factor by which every maze cell is upscaled (at least 1)
    scale: u32,
    /// Probability of punching a hole into an eligible maze wall (0 to 1)
    hole_probability: f64,
    /// Number of coins scattered across the track
    coins: u32,
    /// Seed driving track generation, coin placement and driver randomness
    seed: u64,
    /// Total decision time granted to each participant, in milliseconds
    time_budget_ms: u64,
    /// Driver kind of each participant (dummy, random, follower), one to four
    #[arg(required = true, num_args = 1..=4)]
    pub(crate) participants: Vec<String>,
    /// When to print the text rendering of the track
    #[arg(long, value_enum, default_value_t = RenderMode::Final)]
    pub(crate) render: RenderMode,
    /// Replace every participant with the dummy driver
    #[arg(long)]
    pub(crate) replay: bool,
}

impl Args {
    /// Race configuration described by the positional parameters.
    pub(crate) fn config(&self) -> RaceConfig {
        RaceConfig {
            rows: self.rows,
            columns: self.columns,
            scale: self.scale,
            hole_probability: self.hole_probability,
            coin_count: self.coins,
            seed: self.seed,
            time_budget: Duration::from_millis(self.time_budget_ms),
        }
    }
}

/// Moments at which the track is rendered as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum RenderMode {
    /// Never render the track.
    None,
    /// Render the track once the race finished.
    Final,
    /// Render the track after every turn and once the race finished.
    Turns,
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the racetrack engine.
//!
//! This crate defines the data model and message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing a participant's steering decision, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what happened on the track. Systems operate on
//! [`TrackGrid`] values and never own participant bookkeeping.

use std::{fmt, ops::BitOr, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod geometry;

/// Maximum number of participants that may share a single race.
pub const MAX_PARTICIPANTS: usize = 4;

/// Remaining-time sentinel assigned to participants removed from the race.
pub const DISQUALIFIED_BUDGET: i64 = -1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Applies the steering decision of the participant whose turn is active.
    Steer {
        /// Slot the submitting participant claims to drive.
        slot: SlotId,
        /// State the submitting participant believes it is in.
        claimed: ParticipantState,
        /// Chosen steering impulse, or `None` when the participant produced no decision.
        direction: Option<Direction>,
        /// Wall-clock time the participant spent deciding.
        elapsed: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a participant's turn was resolved on the track.
    ParticipantMoved {
        /// Slot of the participant that moved.
        slot: SlotId,
        /// State before the turn was applied.
        from: ParticipantState,
        /// Authoritative state after the turn was applied.
        to: ParticipantState,
        /// Whether a wall cut the travel segment short.
        clamped: bool,
    },
    /// Reports that a participant's travel swath collected a coin.
    CoinCollected {
        /// Slot of the collecting participant.
        slot: SlotId,
        /// Coin removed from the track.
        coin: Coin,
    },
    /// Reports that a participant was removed from further turns.
    ParticipantDisqualified {
        /// Slot of the removed participant.
        slot: SlotId,
        /// Reason the participant was removed.
        reason: DisqualificationReason,
    },
    /// Announces that every participant completed a turn and a new iteration began.
    IterationAdvanced {
        /// Index of the iteration that just started.
        iteration: u32,
    },
    /// Announces that the race reached a terminal condition.
    RaceFinished {
        /// Condition that ended the race.
        reason: FinishReason,
    },
    /// Reports that a steering command arrived after the race had finished.
    CommandRejected {
        /// Slot named by the rejected command.
        slot: SlotId,
    },
}

/// Reasons a participant may be removed from the race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisqualificationReason {
    /// The participant did not produce a steering direction.
    InvalidAction,
    /// The submitted slot or state diverged from the authoritative record.
    StateMismatch,
    /// The participant exhausted its decision-time budget.
    TimeExhausted,
}

/// Terminal conditions of a race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishReason {
    /// The active participant stands on a finish cell.
    FinishLineReached {
        /// Slot of the participant standing on the finish line.
        slot: SlotId,
    },
    /// The iteration counter exceeded the race's iteration budget.
    IterationBudgetExhausted,
    /// No participant has decision time left.
    NoActiveParticipants,
}

/// Participant slot index, also selecting the participant's occupancy flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u8);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the slot.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Slot index usable for indexing per-participant tables.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Enumerates the first `count` slots, capped at [`MAX_PARTICIPANTS`].
    pub fn first(count: usize) -> impl Iterator<Item = SlotId> {
        (0..count.min(MAX_PARTICIPANTS)).map(|index| SlotId(index as u8))
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as signed row and column indices.
///
/// Positions order row-major: first by row, then by column.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    row: i32,
    column: i32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Position reached after travelling by the provided velocity.
    #[must_use]
    pub const fn offset(self, velocity: Velocity) -> Self {
        Self::new(self.row + velocity.row(), self.column + velocity.column())
    }

    /// Neighbouring position in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        Self::new(self.row + direction.row(), self.column + direction.column())
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub const fn manhattan_distance(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Signed per-turn displacement of a participant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Velocity {
    row: i32,
    column: i32,
}

impl Velocity {
    /// Velocity of a participant at rest.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new velocity from its row and column components.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Displacement that carries `from` onto `to`.
    #[must_use]
    pub const fn between(from: Position, to: Position) -> Self {
        Self::new(to.row() - from.row(), to.column() - from.column())
    }

    /// Row component of the velocity.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Column component of the velocity.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Velocity after applying a steering impulse.
    #[must_use]
    pub const fn accelerate(self, impulse: Direction) -> Self {
        Self::new(self.row + impulse.row(), self.column + impulse.column())
    }

    /// Whether the velocity carries no displacement.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.row == 0 && self.column == 0
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.row, self.column)
    }
}

/// Steering impulse whose components are each the sign of a displacement.
///
/// Directions double as the unit offsets enumerating the nine neighbour cells,
/// including the zero vector. Ordering mirrors [`Position`]: by row component,
/// then by column component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Zero impulse, keeping the current velocity.
    Stay,
    /// Decreasing column.
    West,
    /// Decreasing row and column.
    NorthWest,
    /// Decreasing row.
    North,
    /// Decreasing row, increasing column.
    NorthEast,
    /// Increasing column.
    East,
    /// Increasing row and column.
    SouthEast,
    /// Increasing row.
    South,
    /// Increasing row, decreasing column.
    SouthWest,
}

impl Direction {
    /// Every direction in canonical enumeration order.
    pub const ALL: [Direction; 9] = [
        Direction::Stay,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
    ];

    /// Builds the direction whose components are the signs of the provided values.
    #[must_use]
    pub const fn from_components(row: i32, column: i32) -> Self {
        match (row.signum(), column.signum()) {
            (0, 0) => Direction::Stay,
            (0, -1) => Direction::West,
            (-1, -1) => Direction::NorthWest,
            (-1, 0) => Direction::North,
            (-1, 1) => Direction::NorthEast,
            (0, 1) => Direction::East,
            (1, 1) => Direction::SouthEast,
            (1, 0) => Direction::South,
            _ => Direction::SouthWest,
        }
    }

    /// Direction pointing from one position toward another.
    #[must_use]
    pub const fn toward(from: Position, to: Position) -> Self {
        Self::from_components(to.row() - from.row(), to.column() - from.column())
    }

    /// Row component of the impulse.
    #[must_use]
    pub const fn row(self) -> i32 {
        match self {
            Direction::NorthWest | Direction::North | Direction::NorthEast => -1,
            Direction::SouthEast | Direction::South | Direction::SouthWest => 1,
            Direction::Stay | Direction::West | Direction::East => 0,
        }
    }

    /// Column component of the impulse.
    #[must_use]
    pub const fn column(self) -> i32 {
        match self {
            Direction::West | Direction::NorthWest | Direction::SouthWest => -1,
            Direction::NorthEast | Direction::East | Direction::SouthEast => 1,
            Direction::Stay | Direction::North | Direction::South => 0,
        }
    }

    /// Short compass name of the direction.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Stay => "0",
            Direction::West => "W",
            Direction::NorthWest => "NW",
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
        }
    }
}

impl Ord for Direction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row(), self.column()).cmp(&(other.row(), other.column()))
    }
}

impl PartialOrd for Direction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Direction::ALL
            .into_iter()
            .find(|direction| direction.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseDirectionError(trimmed.to_owned()))
    }
}

/// Error returned when a string does not name a direction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("'{0}' is not a direction (expected one of 0, W, NW, N, NE, E, SE, S, SW)")]
pub struct ParseDirectionError(String);

/// Bitmask of the features present on a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellFlags(u16);

impl CellFlags {
    /// No flags at all.
    pub const NONE: Self = Self(0);
    /// Traversable cell.
    pub const EMPTY: Self = Self(1 << 0);
    /// Impassable cell.
    pub const WALL: Self = Self(1 << 1);
    /// Cell that ends the race for a participant standing on it.
    pub const FINISH: Self = Self(1 << 2);
    /// Cell previously traversed by any participant.
    pub const TRACE: Self = Self(1 << 3);
    /// Cell holding an uncollected coin.
    pub const COIN: Self = Self(1 << 4);

    const OCCUPIED_SHIFT: u32 = 5;

    /// Flag marking the cell a participant slot currently stands on.
    #[must_use]
    pub fn occupied(slot: SlotId) -> Self {
        let bit = 1u16
            .checked_shl(Self::OCCUPIED_SHIFT + u32::from(slot.get()))
            .unwrap_or(0);
        Self(bit)
    }

    /// Creates flags from a raw bitmask.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bitmask of the flags.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether every flag in `other` is present.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the cell is a wall.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        self.contains(Self::WALL)
    }

    /// Combination of both flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Adds the provided flags.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Removes the provided flags.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for CellFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Dense row-major grid of cell flags making up the race track.
///
/// Coordinates outside the grid are reported as blocked so that travel
/// segments can never leave the track.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackGrid {
    rows: u32,
    columns: u32,
    cells: Vec<CellFlags>,
}

impl TrackGrid {
    /// Creates a grid where every cell carries the provided flags.
    #[must_use]
    pub fn filled(rows: u32, columns: u32, flags: CellFlags) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![flags; capacity],
        }
    }

    /// Parses a grid from a textual layout, one line per row.
    ///
    /// Recognised glyphs: `#` wall, `.` or space empty, `-` finish, `*` coin,
    /// `~` trace. Every non-wall glyph also carries [`CellFlags::EMPTY`].
    pub fn from_ascii(layout: &str) -> Result<Self, GridParseError> {
        let lines: Vec<&str> = layout.lines().filter(|line| !line.is_empty()).collect();
        let Some(first) = lines.first() else {
            return Err(GridParseError::Empty);
        };
        let width = first.chars().count();
        let mut cells = Vec::with_capacity(width * lines.len());

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridParseError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, glyph) in line.chars().enumerate() {
                let flags = match glyph {
                    '#' => CellFlags::WALL,
                    '.' | ' ' => CellFlags::EMPTY,
                    '-' => CellFlags::EMPTY | CellFlags::FINISH,
                    '*' => CellFlags::EMPTY | CellFlags::COIN,
                    '~' => CellFlags::EMPTY | CellFlags::TRACE,
                    other => {
                        return Err(GridParseError::UnknownGlyph {
                            glyph: other,
                            row,
                            column,
                        })
                    }
                };
                cells.push(flags);
            }
        }

        Ok(Self {
            rows: u32::try_from(lines.len()).map_err(|_| GridParseError::TooLarge)?,
            columns: u32::try_from(width).map_err(|_| GridParseError::TooLarge)?,
            cells,
        })
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Dense flags stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellFlags] {
        &self.cells
    }

    /// Whether the position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Flags stored at the provided position, if it lies within the grid.
    #[must_use]
    pub fn flags(&self, position: Position) -> Option<CellFlags> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Whether the cell at `position` carries every flag in `flags`.
    #[must_use]
    pub fn has(&self, position: Position, flags: CellFlags) -> bool {
        self.flags(position)
            .map_or(false, |cell| cell.contains(flags))
    }

    /// Whether the position is a wall or lies outside the grid.
    #[must_use]
    pub fn is_blocked(&self, position: Position) -> bool {
        self.flags(position).map_or(true, CellFlags::is_wall)
    }

    /// Replaces the flags stored at the provided position.
    pub fn set(&mut self, position: Position, flags: CellFlags) {
        if let Some(cell) = self.cell_mut(position) {
            *cell = flags;
        }
    }

    /// Adds flags to the cell at the provided position.
    pub fn insert(&mut self, position: Position, flags: CellFlags) {
        if let Some(cell) = self.cell_mut(position) {
            cell.insert(flags);
        }
    }

    /// Removes flags from the cell at the provided position.
    pub fn remove(&mut self, position: Position, flags: CellFlags) {
        if let Some(cell) = self.cell_mut(position) {
            cell.remove(flags);
        }
    }

    /// Turns the cell at the provided position into a traversable cell.
    pub fn clear_wall(&mut self, position: Position) {
        if let Some(cell) = self.cell_mut(position) {
            cell.remove(CellFlags::WALL);
            cell.insert(CellFlags::EMPTY);
        }
    }

    /// Iterates every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let columns = i32::try_from(self.columns).unwrap_or(0);
        let rows = i32::try_from(self.rows).unwrap_or(0);
        (0..rows).flat_map(move |row| (0..columns).map(move |column| Position::new(row, column)))
    }

    /// Counts the cells carrying every flag in `flags`.
    #[must_use]
    pub fn count(&self, flags: CellFlags) -> usize {
        self.cells.iter().filter(|cell| cell.contains(flags)).count()
    }

    fn cell_mut(&mut self, position: Position) -> Option<&mut CellFlags> {
        let index = self.index(position)?;
        self.cells.get_mut(index)
    }

    fn index(&self, position: Position) -> Option<usize> {
        let row = u32::try_from(position.row()).ok()?;
        let column = u32::try_from(position.column()).ok()?;
        if row < self.rows && column < self.columns {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Errors that can occur while parsing a textual grid layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridParseError {
    /// The layout contained no rows.
    #[error("grid layout is empty")]
    Empty,
    /// A row had a different width than the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The layout contained a glyph with no flag mapping.
    #[error("unknown glyph '{glyph}' at ({row}, {column})")]
    UnknownGlyph {
        /// Unrecognised character.
        glyph: char,
        /// Zero-based row of the glyph.
        row: usize,
        /// Zero-based column of the glyph.
        column: usize,
    },
    /// The layout dimensions do not fit the grid's index type.
    #[error("grid layout is too large")]
    TooLarge,
}

/// Physical state of a participant: where it stands and how fast it travels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantState {
    /// Cell the participant stands on.
    pub position: Position,
    /// Displacement applied on the previous turn.
    pub velocity: Velocity,
}

impl ParticipantState {
    /// Creates a state from explicit position and velocity.
    #[must_use]
    pub const fn new(position: Position, velocity: Velocity) -> Self {
        Self { position, velocity }
    }

    /// Creates a state standing still at the provided position.
    #[must_use]
    pub const fn at_rest(position: Position) -> Self {
        Self::new(position, Velocity::ZERO)
    }
}

impl fmt::Display for ParticipantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p:{} v:{}", self.position, self.velocity)
    }
}

/// Collectible placed on the track, lowering the collector's score by its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    position: Position,
    value: u32,
}

impl Coin {
    /// Creates a coin at the provided position.
    #[must_use]
    pub const fn new(position: Position, value: u32) -> Self {
        Self { position, value }
    }

    /// Cell holding the coin.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Score reduction granted on collection.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }
}

/// Parameters that fully determine a generated race.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Number of logical maze rows before upscaling.
    pub rows: u32,
    /// Number of logical maze columns before upscaling.
    pub columns: u32,
    /// Factor by which every logical cell is upscaled.
    pub scale: u32,
    /// Probability of punching a hole into an eligible wall.
    pub hole_probability: f64,
    /// Number of coins scattered across the track.
    pub coin_count: u32,
    /// Seed driving every random decision of the race.
    pub seed: u64,
    /// Total decision time granted to each participant.
    pub time_budget: Duration,
}

impl RaceConfig {
    /// Smallest accepted number of logical rows.
    pub const MIN_ROWS: u32 = 3;
    /// Smallest accepted number of logical columns.
    pub const MIN_COLUMNS: u32 = 4;
    /// Largest accepted number of cells in the upscaled grid.
    pub const MAX_CELLS: u64 = 1 << 24;

    /// Checks that the configuration can produce a playable track.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < Self::MIN_ROWS {
            return Err(ConfigError::TooFewRows { rows: self.rows });
        }
        if self.columns < Self::MIN_COLUMNS {
            return Err(ConfigError::TooFewColumns {
                columns: self.columns,
            });
        }
        if self.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        if !(0.0..=1.0).contains(&self.hole_probability) {
            return Err(ConfigError::InvalidHoleProbability {
                probability: self.hole_probability,
            });
        }
        if self.time_budget.is_zero() {
            return Err(ConfigError::ZeroTimeBudget);
        }

        let fits = |extent: u32| {
            extent
                .checked_mul(self.scale)
                .and_then(|scaled| i32::try_from(scaled).ok())
                .is_some()
        };
        let cells = u64::from(self.rows)
            .checked_mul(u64::from(self.columns))
            .and_then(|cells| cells.checked_mul(u64::from(self.scale)))
            .and_then(|cells| cells.checked_mul(u64::from(self.scale)));
        let bounded = cells.is_some_and(|cells| cells <= Self::MAX_CELLS);
        if !fits(self.rows) || !fits(self.columns) || !bounded {
            return Err(ConfigError::GridTooLarge {
                rows: self.rows,
                columns: self.columns,
                scale: self.scale,
            });
        }

        Ok(())
    }

    /// Time budget expressed in signed nanoseconds, saturating on overflow.
    #[must_use]
    pub fn time_budget_nanos(&self) -> i64 {
        duration_nanos(self.time_budget)
    }
}

/// Converts a duration into signed nanoseconds, saturating on overflow.
#[must_use]
pub fn duration_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

/// Checks that the number of participants fits the available slots.
pub fn validate_participant_count(count: usize) -> Result<(), ConfigError> {
    if count == 0 || count > MAX_PARTICIPANTS {
        return Err(ConfigError::ParticipantCount { count });
    }
    Ok(())
}

/// Reasons a race configuration may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The maze needs at least three logical rows.
    #[error("at least {} rows are required (received {rows})", RaceConfig::MIN_ROWS)]
    TooFewRows {
        /// Provided row count.
        rows: u32,
    },
    /// The maze needs at least four logical columns.
    #[error(
        "at least {} columns are required (received {columns})",
        RaceConfig::MIN_COLUMNS
    )]
    TooFewColumns {
        /// Provided column count.
        columns: u32,
    },
    /// Upscaling by zero would erase the track.
    #[error("scale must be positive")]
    ZeroScale,
    /// Hole probability must lie within `0.0..=1.0`.
    #[error("hole probability must lie within 0..=1 (received {probability})")]
    InvalidHoleProbability {
        /// Provided probability.
        probability: f64,
    },
    /// Every participant needs some decision time.
    #[error("time budget must be positive")]
    ZeroTimeBudget,
    /// The upscaled grid exceeds the cell limit or signed 32-bit coordinates.
    #[error("a {rows}x{columns} maze scaled by {scale} is too large")]
    GridTooLarge {
        /// Provided row count.
        rows: u32,
        /// Provided column count.
        columns: u32,
        /// Provided scale factor.
        scale: u32,
    },
    /// Races host between one and four participants.
    #[error("between 1 and {} participants are required (received {count})", MAX_PARTICIPANTS)]
    ParticipantCount {
        /// Provided participant count.
        count: usize,
    },
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for racetrack adapters.
//!
//! Two views of a track grid are provided: a one-character-per-cell text
//! rendering and a list of colored shape descriptors laid out in cell units.
//! Both are rebuilt from the grid on demand.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use racetrack_core::{CellFlags, Position, SlotId, TrackGrid, MAX_PARTICIPANTS};

/// Offset of a shape from its cell's top-left corner, in cell units.
pub const CELL_INSET: f32 = 0.1;

/// Edge length of a shape, in cell units.
pub const CELL_EXTENT: f32 = 0.8;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Fill of wall blocks.
    pub const WALL: Self = Self::from_rgb_u8(64, 64, 64);
    /// Fill of trace markers.
    pub const TRACE: Self = Self::from_rgb_u8(192, 192, 192);
    /// Fill of finish blocks.
    pub const FINISH: Self = Self::from_rgb_u8(255, 175, 175);
    /// Fill of coin markers.
    pub const COIN: Self = Self::from_rgb_u8(244, 180, 0);
    /// Fill of each participant slot's marker.
    pub const PARTICIPANTS: [Self; MAX_PARTICIPANTS] = [
        Self::from_rgb_u8(219, 68, 55),
        Self::from_rgb_u8(15, 157, 88),
        Self::from_rgb_u8(66, 133, 244),
        Self::from_rgb_u8(128, 128, 128),
    ];

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Geometric primitive used for a shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Filled rectangle.
    Block,
    /// Filled ellipse.
    Marker,
}

/// Colored shape positioned in cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    /// Primitive to draw.
    pub kind: ShapeKind,
    /// Fill color.
    pub color: Color,
    /// Top-left corner; `x` grows with columns, `y` with rows.
    pub origin: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl Shape {
    fn at(cell: Position, kind: ShapeKind, color: Color) -> Self {
        Self {
            kind,
            color,
            origin: Vec2::new(
                cell.column() as f32 + CELL_INSET,
                cell.row() as f32 + CELL_INSET,
            ),
            size: Vec2::splat(CELL_EXTENT),
        }
    }
}

/// Shapes describing a whole track, listed cell by cell in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of cell rows covered by the scene.
    pub rows: u32,
    /// Number of cell columns covered by the scene.
    pub columns: u32,
    /// Shapes in drawing order.
    pub shapes: Vec<Shape>,
}

impl Scene {
    /// Describes every flagged feature of the grid.
    ///
    /// Within a cell, shapes stack as wall, trace, finish, coin, then one
    /// marker per occupying slot.
    #[must_use]
    pub fn from_grid(grid: &TrackGrid) -> Self {
        let mut shapes = Vec::new();
        for cell in grid.positions() {
            let Some(flags) = grid.flags(cell) else {
                continue;
            };
            let layers = [
                (CellFlags::WALL, ShapeKind::Block, Color::WALL),
                (CellFlags::TRACE, ShapeKind::Marker, Color::TRACE),
                (CellFlags::FINISH, ShapeKind::Block, Color::FINISH),
                (CellFlags::COIN, ShapeKind::Marker, Color::COIN),
            ];
            for (flag, kind, color) in layers {
                if flags.contains(flag) {
                    shapes.push(Shape::at(cell, kind, color));
                }
            }
            for (slot, color) in SlotId::first(MAX_PARTICIPANTS).zip(Color::PARTICIPANTS) {
                if flags.contains(CellFlags::occupied(slot)) {
                    shapes.push(Shape::at(cell, ShapeKind::Marker, color));
                }
            }
        }

        Self {
            rows: grid.rows(),
            columns: grid.columns(),
            shapes,
        }
    }
}

/// Character drawn for a cell, chosen by its highest-priority flag.
#[must_use]
pub fn glyph(flags: CellFlags) -> char {
    const OCCUPANTS: [char; MAX_PARTICIPANTS] = ['X', 'Y', 'Z', 'W'];

    let occupant = SlotId::first(MAX_PARTICIPANTS)
        .zip(OCCUPANTS)
        .filter(|(slot, _)| flags.contains(CellFlags::occupied(*slot)))
        .map(|(_, glyph)| glyph)
        .last();
    if let Some(glyph) = occupant {
        return glyph;
    }

    [
        (CellFlags::COIN, '*'),
        (CellFlags::TRACE, '~'),
        (CellFlags::FINISH, '-'),
        (CellFlags::WALL, '#'),
        (CellFlags::EMPTY, ' '),
    ]
    .into_iter()
    .find(|(flag, _)| flags.contains(*flag))
    .map_or('.', |(_, glyph)| glyph)
}

/// Renders the grid as text, one line per row.
#[must_use]
pub fn render_text(grid: &TrackGrid) -> String {
    let width = usize::try_from(grid.columns()).unwrap_or(0);
    let mut text = String::new();
    for row in grid.cells().chunks(width.max(1)) {
        text.extend(row.iter().copied().map(glyph));
        text.push('\n');
    }
    text
}

/// Everything a backend needs to show one state of the race.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Heading describing the frame.
    pub title: String,
    /// Text rendering of the grid.
    pub text: String,
    /// Shape descriptors of the grid.
    pub scene: Scene,
}

impl Frame {
    /// Captures both renderings of `grid` under the provided title.
    #[must_use]
    pub fn capture<T>(title: T, grid: &TrackGrid) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            text: render_text(grid),
            scene: Scene::from_grid(grid),
        }
    }
}

/// Rendering backend capable of presenting frames.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}

/// Backend printing the text rendering of each frame to a writer.
#[derive(Debug)]
pub struct TerminalBackend<W> {
    out: W,
}

impl<W: Write> TerminalBackend<W> {
    /// Creates a backend writing to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        writeln!(self.out, "{}", frame.title).context("failed to write frame title")?;
        self.out
            .write_all(frame.text.as_bytes())
            .context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}

//! Discrete rasterization of straight travel segments between grid cells.
//!
//! Two flavours of Bresenham lines answer "which cells does the body step
//! through", while [`coverage`] answers "which cells does the continuous
//! segment between cell centres touch at all". Every function returns a single
//! cell for a degenerate segment.

use crate::Position;

/// Rasterizes the segment between two cells allowing diagonal steps.
///
/// The first element is `from`, the last is `to`, and consecutive cells are
/// 8-connected neighbours.
#[must_use]
pub fn line_8connect(from: Position, to: Position) -> Vec<Position> {
    let row_delta = (to.row() - from.row()).abs();
    let column_delta = (to.column() - from.column()).abs();
    let row_step = if from.row() < to.row() { 1 } else { -1 };
    let column_step = if from.column() < to.column() { 1 } else { -1 };

    let steps = row_delta.max(column_delta) + 1;
    let mut cells = Vec::with_capacity(usize::try_from(steps).unwrap_or(0));
    let mut error = row_delta - column_delta;
    let (mut row, mut column) = (from.row(), from.column());

    for _ in 0..steps {
        cells.push(Position::new(row, column));
        let doubled = 2 * error;
        if doubled < row_delta {
            column += column_step;
            error += row_delta;
        }
        if -column_delta < doubled {
            row += row_step;
            error -= column_delta;
        }
    }

    cells
}

/// Rasterizes the segment between two cells using orthogonal steps only.
///
/// The first element is `from`, the last is `to`, and consecutive cells share
/// an edge.
#[must_use]
pub fn line_4connect(from: Position, to: Position) -> Vec<Position> {
    let row_delta = (to.row() - from.row()).abs();
    let column_delta = (to.column() - from.column()).abs();
    let row_step = if from.row() < to.row() { 1 } else { -1 };
    let column_step = if from.column() < to.column() { 1 } else { -1 };

    let steps = row_delta + column_delta + 1;
    let mut cells = Vec::with_capacity(usize::try_from(steps).unwrap_or(0));
    let mut error = 0;
    let (mut row, mut column) = (from.row(), from.column());

    for _ in 0..steps {
        cells.push(Position::new(row, column));
        let after_column = error + row_delta;
        let after_row = error - column_delta;
        if after_column.abs() < after_row.abs() {
            column += column_step;
            error = after_column;
        } else {
            row += row_step;
            error = after_row;
        }
    }

    cells
}

/// Locates `point` relative to the directed line `a -> b`.
///
/// Returns `-1`, `0` or `1` as the sign of the 2D cross product; `0` means the
/// point lies on the line (or the line is degenerate).
#[must_use]
pub fn side(a: Position, b: Position, point: Position) -> i32 {
    let cross = (b.row() - a.row()) * (point.column() - a.column())
        - (b.column() - a.column()) * (point.row() - a.row());
    cross.signum()
}

/// Every cell whose square is crossed or touched by the segment joining the
/// centres of `from` and `to`.
///
/// Coordinates are doubled so that cell centres and cell corners both land on
/// integer lattice points. A cell within the bounding box is covered unless all
/// four of its corners lie strictly on the same side of the segment's line.
/// Cells are distinct and ordered by walking the bounding box from `from`
/// toward `to`.
#[must_use]
pub fn coverage(from: Position, to: Position) -> Vec<Position> {
    let row_step = if to.row() < from.row() { -1 } else { 1 };
    let column_step = if to.column() < from.column() { -1 } else { 1 };
    let start = centre(from);
    let end = centre(to);

    let mut cells = Vec::new();
    let mut row = from.row();
    loop {
        let mut column = from.column();
        loop {
            let sides: i32 = corners(Position::new(row, column))
                .into_iter()
                .map(|corner| side(start, end, corner))
                .sum();
            if sides.abs() != 4 {
                cells.push(Position::new(row, column));
            }
            if column == to.column() {
                break;
            }
            column += column_step;
        }
        if row == to.row() {
            break;
        }
        row += row_step;
    }

    cells
}

fn centre(cell: Position) -> Position {
    Position::new(cell.row() * 2 + 1, cell.column() * 2 + 1)
}

fn corners(cell: Position) -> [Position; 4] {
    let top = cell.row() * 2;
    let left = cell.column() * 2;
    [
        Position::new(top, left),
        Position::new(top + 2, left),
        Position::new(top, left + 2),
        Position::new(top + 2, left + 2),
    ]
}

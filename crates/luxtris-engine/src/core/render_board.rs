use std::fmt;

use serde::Serialize;

use super::{
    board::Board,
    piece::{Piece, PieceKind},
};

/// A single cell of the composited view handed to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderCell {
    #[default]
    Empty,
    /// Landing preview of the active piece.
    Ghost(PieceKind),
    /// Cell of the falling piece.
    Active(PieceKind),
    /// Locked cell.
    Locked(PieceKind),
    /// Locked cell in a row that is waiting to be collapsed.
    Clearing(PieceKind),
}

impl RenderCell {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == RenderCell::Empty
    }

    #[must_use]
    pub fn kind(self) -> Option<PieceKind> {
        match self {
            RenderCell::Empty => None,
            RenderCell::Ghost(kind)
            | RenderCell::Active(kind)
            | RenderCell::Locked(kind)
            | RenderCell::Clearing(kind) => Some(kind),
        }
    }

    /// ASCII form: `.` empty, `:` ghost, `=` clearing, piece letter otherwise.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            RenderCell::Empty => '.',
            RenderCell::Ghost(_) => ':',
            RenderCell::Clearing(_) => '=',
            RenderCell::Active(kind) | RenderCell::Locked(kind) => kind.as_char(),
        }
    }
}

/// Cell-by-cell view of the board with the active piece, its ghost and clearing
/// rows drawn in.
///
/// [`Board`] only knows about locked cells; this is what a renderer draws.
///
/// # Example
///
/// ```
/// use luxtris_engine::{Board, Piece, PieceKind, RenderBoard, RenderCell};
///
/// let board = Board::new(10, 20);
/// let piece = Piece::spawn(PieceKind::O, 10);
///
/// let mut view = RenderBoard::from_board(&board);
/// view.fill_piece_as(&piece.simulate_drop_position(&board), RenderCell::Ghost);
/// view.fill_piece_as(&piece, RenderCell::Active);
///
/// assert_eq!(view.cell(4, 0), RenderCell::Active(PieceKind::O));
/// assert_eq!(view.cell(4, 19), RenderCell::Ghost(PieceKind::O));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderBoard {
    width: usize,
    rows: Vec<Vec<RenderCell>>,
}

impl Serialize for RenderBoard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(
            self.rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.as_char()).collect::<String>()),
        )
    }
}

impl fmt::Display for RenderBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: String = row.iter().map(|cell| cell.as_char()).collect();
            writeln!(f, "|{line}|")?;
        }
        writeln!(f, "+{}+", "-".repeat(self.width))
    }
}

impl RenderBoard {
    /// Creates a view holding the board's locked cells.
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        let rows = board
            .rows()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or(RenderCell::Empty, RenderCell::Locked))
                    .collect()
            })
            .collect();
        Self {
            width: board.width(),
            rows,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> RenderCell {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or_default()
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[RenderCell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Draws the piece's on-board cells with the given cell constructor.
    ///
    /// Cells above the top row are skipped.
    pub fn fill_piece_as(&mut self, piece: &Piece, cell: fn(PieceKind) -> RenderCell) {
        for (x, y) in piece.occupied_positions() {
            let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
                *slot = cell(piece.kind());
            }
        }
    }

    /// Marks the locked cells of the given rows as clearing.
    pub fn mark_clearing(&mut self, rows: &[usize]) {
        for &y in rows {
            let Some(row) = self.rows.get_mut(y) else {
                continue;
            };
            for slot in row {
                if let RenderCell::Locked(kind) = *slot {
                    *slot = RenderCell::Clearing(kind);
                }
            }
        }
    }
}

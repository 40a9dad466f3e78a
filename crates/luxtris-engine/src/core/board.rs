use serde::{Deserialize, Serialize};

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    piece::{Color, Piece, PieceKind},
};

/// A single cell of the board: empty, or the kind of the piece that locked there.
pub type Cell = Option<PieceKind>;

/// The playfield grid of locked cells.
///
/// Rows are indexed top to bottom (`0` is the top row), columns left to right.
/// The dimensions are fixed at construction; only [`Board::lock`] and
/// [`Board::collapse`] change cell contents.
///
/// Pieces may extend above row `0` (negative rows). Those cells are checked
/// against the side walls but never against locked cells, and they are dropped
/// when the piece locks.
///
/// # Example
///
/// ```
/// use luxtris_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::new(10, 20);
/// let piece = Piece::spawn(PieceKind::O, 10).shifted(0, 18);
///
/// assert!(!board.is_colliding(&piece));
/// assert!(board.collides(&piece, 0, 1));
///
/// board.lock(&piece);
/// assert_eq!(board.cell(4, 19), Some(PieceKind::O));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    rows: Vec<Vec<Cell>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: one string per row, '.' for empty and the piece letter otherwise
        serializer.collect_seq(self.rows.iter().map(|row| row_to_string(row)))
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let lines = Vec::<String>::deserialize(deserializer)?;
        let width = lines.first().map_or(0, |line| line.chars().count());
        if lines.is_empty() || width == 0 {
            return Err(serde::de::Error::custom("board must have at least one cell"));
        }

        let mut rows = Vec::with_capacity(lines.len());
        for (y, line) in lines.iter().enumerate() {
            let row = line
                .chars()
                .map(|c| match c {
                    '.' => Ok(None),
                    c => PieceKind::from_char(c).map(Some).ok_or_else(|| {
                        serde::de::Error::custom(format!("invalid cell '{c}' at row {y}"))
                    }),
                })
                .collect::<Result<Vec<_>, D::Error>>()?;
            if row.len() != width {
                return Err(serde::de::Error::custom(format!(
                    "expected {width} cells at row {y}, got {}",
                    row.len()
                )));
            }
            rows.push(row);
        }

        Ok(Self { width, rows })
    }
}

fn row_to_string(row: &[Cell]) -> String {
    row.iter()
        .map(|cell| cell.map_or('.', PieceKind::as_char))
        .collect()
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Session constructors reject such
    /// configurations with a [`ConfigError`](crate::ConfigError) before reaching here.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            width > 0 && height > 0,
            "board dimensions must be positive, got {width}x{height}"
        );
        Self {
            width,
            rows: vec![vec![None; width]; height],
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

    /// Returns the cell at `(x, y)`, or `None` if it is empty or outside the board.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows.get(y).and_then(|row| row.get(x).copied().flatten())
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Returns `true` if no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(Option::is_none)
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(None);
        }
    }

    /// Checks if the piece, shifted by `(dx, dy)`, would leave the board or overlap
    /// a locked cell.
    ///
    /// Cells above the top row are only checked against the side walls.
    #[must_use]
    pub fn collides(&self, piece: &Piece, dx: i32, dy: i32) -> bool {
        piece.occupied_positions().any(|(x, y)| {
            let (x, y) = (x + dx, y + dy);
            let Ok(col) = usize::try_from(x) else {
                return true;
            };
            if col >= self.width {
                return true;
            }
            let Ok(row) = usize::try_from(y) else {
                return false;
            };
            row >= self.height() || self.rows[row][col].is_some()
        })
    }

    /// Checks if the piece collides at its current position.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        self.collides(piece, 0, 0)
    }

    /// Locks a piece onto the board by writing its kind into its cells.
    ///
    /// Cells above the top row are silently dropped.
    pub fn lock(&mut self, piece: &Piece) {
        for (x, y) in piece.occupied_positions() {
            let (Ok(col), Ok(row)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = Some(piece.kind());
            }
        }
    }

    /// Returns the indices of completely filled rows, top to bottom.
    #[must_use]
    pub fn find_full_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .map(|(y, _)| y)
            .collect()
    }

    /// Removes the given rows and inserts as many empty rows at the top.
    ///
    /// The remaining rows keep their relative order. Out-of-range and duplicate
    /// indices are ignored.
    pub fn collapse(&mut self, rows: &[usize]) {
        if rows.is_empty() {
            return;
        }
        let height = self.height();
        let mut kept: Vec<_> = std::mem::take(&mut self.rows)
            .into_iter()
            .enumerate()
            .filter(|(y, _)| !rows.contains(y))
            .map(|(_, row)| row)
            .collect();
        let removed = height - kept.len();
        let width = self.width;
        self.rows = Vec::with_capacity(height);
        self.rows
            .extend(std::iter::repeat_with(|| vec![None; width]).take(removed));
        self.rows.append(&mut kept);
    }

    /// Returns `true` if every cell outside `cleared_rows` is empty.
    ///
    /// Rows that are about to be cleared are ignored, so a full row never
    /// prevents a perfect clear.
    #[must_use]
    pub fn is_perfect_clear(&self, cleared_rows: &[usize]) -> bool {
        self.rows
            .iter()
            .enumerate()
            .filter(|(y, _)| !cleared_rows.contains(y))
            .all(|(_, row)| row.iter().all(Option::is_none))
    }

    /// Returns the colors of a row's cells, white for empty ones.
    #[must_use]
    pub fn row_colors(&self, y: usize) -> Vec<Color> {
        const EMPTY_COLOR: Color = Color::from_rgb(0xff_ff_ff);
        self.rows.get(y).map_or_else(Vec::new, |row| {
            row.iter()
                .map(|cell| cell.map_or(EMPTY_COLOR, PieceKind::color))
                .collect()
        })
    }

    /// Creates a `Board` from ASCII art for testing.
    ///
    /// '.' is an empty cell and a piece letter (`IOTSZJL`) is a locked cell of that
    /// kind. Every row must have the same width; rows are listed top to bottom
    /// and align with the bottom of a board of the given height.
    #[must_use]
    pub fn from_ascii(height: usize, art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines.first().map_or(BOARD_WIDTH, |line| line.chars().count());
        assert!(
            lines.len() <= height,
            "art has {} rows but board height is {height}",
            lines.len()
        );

        let mut board = Self::new(width, height);
        let top = height - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<Cell> = line.chars().map(PieceKind::from_char).collect();
            assert_eq!(
                cells.len(),
                width,
                "Each row must have exactly {width} cells, got {} at row {i}",
                cells.len()
            );
            board.rows[top + i] = cells;
        }
        board
    }
}

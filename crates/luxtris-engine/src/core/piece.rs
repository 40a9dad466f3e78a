use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::board::Board;

/// A falling piece (tetromino) with position, rotation, and kind.
///
/// Pieces are immutable values: movement and rotation return new `Piece` instances,
/// and the caller decides whether to commit them after a collision check.
///
/// # Coordinate System
///
/// - Position is the top-left anchor of the piece's current shape matrix
/// - X increases rightward, Y increases downward
/// - Y may be negative while a piece sits above the visible board
///
/// # Example
///
/// ```
/// use luxtris_engine::{Piece, PieceKind};
///
/// let piece = Piece::spawn(PieceKind::T, 10);
/// assert_eq!((piece.position().x(), piece.position().y()), (4, 0));
///
/// let rotated = piece.shifted(1, 0).rotated_right();
/// assert_eq!(rotated.rotation().index(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "kind#rotation@x,y" (e.g., "S#1@4,18")
        let s = format!(
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.position.x,
            self.position.y
        );
        serializer.serialize_str(&s)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let (kind_str, rest) = s.split_once('#').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing '#' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let mut kind_chars = kind_str.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => PieceKind::from_char(c)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid piece kind: {c}")))?,
            _ => {
                return Err(serde::de::Error::custom(format!(
                    "piece kind must be single character, got '{kind_str}'"
                )));
            }
        };

        let (rotation_str, position_str) = rest.split_once('@').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing '@' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let rotation_num = rotation_str.parse::<u8>().map_err(|e| {
            serde::de::Error::custom(format!("invalid rotation: {rotation_str} ({e})"))
        })?;
        if rotation_num > 3 {
            return Err(serde::de::Error::custom(format!(
                "rotation must be 0-3, got {rotation_num}"
            )));
        }

        let (x_str, y_str) = position_str.split_once(',').ok_or_else(|| {
            serde::de::Error::custom(format!(
                "missing ',' in format 'kind#rotation@x,y', got '{s}'"
            ))
        })?;
        let x = x_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid x position: {x_str} ({e})")))?;
        let y = y_str
            .parse::<i32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid y position: {y_str} ({e})")))?;

        Ok(Piece {
            position: PiecePosition::new(x, y),
            rotation: PieceRotation(rotation_num),
            kind,
        })
    }
}

impl Piece {
    /// Creates a piece in its spawn orientation at the neutral anchor `(0, 0)`.
    ///
    /// This is the form a piece takes while it sits in the hold slot.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::ORIGIN,
            rotation: PieceRotation::default(),
            kind,
        }
    }

    /// Creates a piece at its spawn location on a board of the given width.
    ///
    /// The piece is horizontally centered (`floor(width/2) - floor(shape_width/2)`)
    /// on the top row.
    #[must_use]
    pub fn spawn(kind: PieceKind, board_width: usize) -> Self {
        let shape_width = kind.shape(PieceRotation::default()).width();
        let x = board_width / 2 - shape_width / 2;
        Self::new(kind).with_position(PiecePosition::new(
            i32::try_from(x).unwrap_or(i32::MAX),
            0,
        ))
    }

    #[must_use]
    pub fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.kind.color()
    }

    /// Returns the shape matrix for the current rotation.
    #[must_use]
    pub fn shape(&self) -> &'static PieceShape {
        self.kind.shape(self.rotation)
    }

    /// Returns the board coordinates of every occupied cell.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape()
            .occupied_cells()
            .map(move |(dx, dy)| (self.position.x + dx, self.position.y + dy))
    }

    #[must_use]
    pub fn with_position(self, position: PiecePosition) -> Self {
        Self { position, ..self }
    }

    #[must_use]
    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        self.with_position(self.position.offset(dx, dy))
    }

    /// Returns the piece rotated 90° clockwise around its anchor.
    #[must_use]
    pub fn rotated_right(self) -> Self {
        Self {
            rotation: self.rotation.rotated_right(),
            ..self
        }
    }

    /// Rotates clockwise, resolving collisions with wall kicks.
    ///
    /// Returns `None` when the rotated piece collides at every kick offset.
    #[must_use]
    pub fn super_rotated_right(self, board: &Board) -> Option<Self> {
        rotation_kicks(self.rotated_right())
            .into_iter()
            .find(|piece| !board.is_colliding(piece))
    }

    /// Returns the position this piece would land at if dropped straight down.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while !board.collides(&dropped, 0, 1) {
            dropped = dropped.shifted(0, 1);
        }
        dropped
    }
}

/// Candidate placements for a rotated piece, in the order they are tried.
///
/// This is a simplified kick table, not SRS: the rotated piece in place, then one
/// column left, one column right and one row up. Only the position changes.
fn rotation_kicks(rotated: Piece) -> ArrayVec<Piece, 4> {
    ArrayVec::from([
        rotated,
        rotated.shifted(-1, 0),
        rotated.shifted(1, 0),
        rotated.shifted(0, -1),
    ])
}

/// Top-left anchor of a piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PiecePosition {
    x: i32,
    y: i32,
}

impl PiecePosition {
    pub const ORIGIN: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn rotated_right(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An RGB color attached to each piece kind.
///
/// Displays and serializes as a CSS-style hex string (`#64ffda`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn from_rgb(rgb: u32) -> Self {
        let [_, r, g, b] = rgb.to_be_bytes();
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the shape matrix of this kind in the given rotation.
    #[must_use]
    pub fn shape(self, rotation: PieceRotation) -> &'static PieceShape {
        &PIECE_SHAPES[self as usize][rotation.index()]
    }

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            PieceKind::I => Color::from_rgb(0x64_ff_da),
            PieceKind::O => Color::from_rgb(0xff_d9_3d),
            PieceKind::T => Color::from_rgb(0xff_6b_9d),
            PieceKind::S => Color::from_rgb(0x00_e6_76),
            PieceKind::Z => Color::from_rgb(0xff_57_22),
            PieceKind::J => Color::from_rgb(0x21_96_f3),
            PieceKind::L => Color::from_rgb(0xff_98_00),
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use luxtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use luxtris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

/// Boolean occupancy matrix of a piece in one rotation.
///
/// Stored in a 4×4 buffer; only the top-left `width × height` region is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    cells: [[bool; 4]; 4],
    width: u8,
    height: u8,
}

impl PieceShape {
    /// Largest extent of any shape in either direction.
    pub const MAX_SIZE: usize = 4;

    #[expect(clippy::cast_possible_truncation)]
    const fn from_rows(rows: &[&[u8]]) -> Self {
        let mut cells = [[false; 4]; 4];
        let mut y = 0;
        while y < rows.len() {
            let mut x = 0;
            while x < rows[y].len() {
                cells[y][x] = rows[y][x] != 0;
                x += 1;
            }
            y += 1;
        }
        Self {
            cells,
            width: rows[0].len() as u8,
            height: rows.len() as u8,
        }
    }

    /// Rotates the matrix 90° clockwise: transpose, then reverse each row.
    #[must_use]
    pub const fn rotated_clockwise(&self) -> Self {
        let mut cells = [[false; 4]; 4];
        let old_height = self.height as usize;
        let mut y = 0;
        while y < self.width as usize {
            let mut x = 0;
            while x < old_height {
                cells[y][x] = self.cells[old_height - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        Self {
            cells,
            width: self.height,
            height: self.width,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width() && y < self.height() && self.cells[y][x]
    }

    /// Returns the `(dx, dy)` offsets of occupied cells, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |dy| {
            (0..self.width)
                .filter(move |&dx| self.cells[usize::from(dy)][usize::from(dx)])
                .map(move |dx| (i32::from(dx), i32::from(dy)))
        })
    }
}

const fn shape_rotations(shape: PieceShape) -> [PieceShape; 4] {
    let mut rotations = [shape; 4];
    let mut i = 1;
    while i < 4 {
        rotations[i] = rotations[i - 1].rotated_clockwise();
        i += 1;
    }
    rotations
}

const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = [
    // I-piece
    shape_rotations(PieceShape::from_rows(&[&[1, 1, 1, 1]])),
    // O-piece
    shape_rotations(PieceShape::from_rows(&[&[1, 1], &[1, 1]])),
    // T-piece
    shape_rotations(PieceShape::from_rows(&[&[0, 1, 0], &[1, 1, 1]])),
    // S-piece
    shape_rotations(PieceShape::from_rows(&[&[0, 1, 1], &[1, 1, 0]])),
    // Z-piece
    shape_rotations(PieceShape::from_rows(&[&[1, 1, 0], &[0, 1, 1]])),
    // J-piece
    shape_rotations(PieceShape::from_rows(&[&[1, 0, 0], &[1, 1, 1]])),
    // L-piece
    shape_rotations(PieceShape::from_rows(&[&[0, 0, 1], &[1, 1, 1]])),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_rows(shape: &PieceShape) -> Vec<String> {
        (0..shape.height())
            .map(|y| {
                (0..shape.width())
                    .map(|x| if shape.is_occupied(x, y) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_every_shape_has_four_cells() {
        for kind in PieceKind::ALL {
            for rotation in 0..4 {
                let shape = kind.shape(PieceRotation(rotation));
                assert_eq!(
                    shape.occupied_cells().count(),
                    4,
                    "{kind:?} rotation {rotation}"
                );
            }
        }
    }

    #[test]
    fn test_clockwise_rotation_of_t() {
        let t = PieceKind::T;
        assert_eq!(shape_rows(t.shape(PieceRotation(0))), [".#.", "###"]);
        assert_eq!(shape_rows(t.shape(PieceRotation(1))), ["#.", "##", "#."]);
        assert_eq!(shape_rows(t.shape(PieceRotation(2))), ["###", ".#."]);
        assert_eq!(shape_rows(t.shape(PieceRotation(3))), [".#", "##", ".#"]);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let i = PieceKind::I;
        assert_eq!(i.shape(PieceRotation(0)).width(), 4);
        assert_eq!(i.shape(PieceRotation(0)).height(), 1);
        assert_eq!(i.shape(PieceRotation(1)).width(), 1);
        assert_eq!(i.shape(PieceRotation(1)).height(), 4);
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for kind in PieceKind::ALL {
            let shape = kind.shape(PieceRotation(0));
            let back = shape
                .rotated_clockwise()
                .rotated_clockwise()
                .rotated_clockwise()
                .rotated_clockwise();
            assert_eq!(&back, shape, "{kind:?}");
        }
    }

    #[test]
    fn test_spawn_is_centered() {
        assert_eq!(Piece::spawn(PieceKind::I, 10).position(), PiecePosition::new(3, 0));
        assert_eq!(Piece::spawn(PieceKind::O, 10).position(), PiecePosition::new(4, 0));
        assert_eq!(Piece::spawn(PieceKind::T, 10).position(), PiecePosition::new(4, 0));
    }

    #[test]
    fn test_occupied_positions_follow_anchor() {
        let piece = Piece::new(PieceKind::O).with_position(PiecePosition::new(3, -1));
        let cells: Vec<_> = piece.occupied_positions().collect();
        assert_eq!(cells, [(3, -1), (4, -1), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_kick_order() {
        let piece = Piece::new(PieceKind::T).with_position(PiecePosition::new(4, 5));
        let kicks: Vec<_> = rotation_kicks(piece.rotated_right())
            .iter()
            .map(|p| (p.position().x(), p.position().y()))
            .collect();
        assert_eq!(kicks, [(4, 5), (3, 5), (5, 5), (4, 4)]);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(PieceKind::I.color().to_string(), "#64ffda");
        assert_eq!(PieceKind::J.color().to_string(), "#2196f3");
        assert_eq!(
            serde_json::to_string(&PieceKind::O.color()).unwrap(),
            "\"#ffd93d\""
        );
    }

    #[test]
    fn test_piece_serialization() {
        let piece = Piece {
            position: PiecePosition::new(4, 18),
            rotation: PieceRotation(1),
            kind: PieceKind::S,
        };

        let serialized = serde_json::to_string(&piece).unwrap();
        assert_eq!(serialized, "\"S#1@4,18\"");

        let deserialized: Piece = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, piece);
    }

    #[test]
    fn test_piece_serialization_negative_row() {
        let piece = Piece::new(PieceKind::I)
            .rotated_right()
            .with_position(PiecePosition::new(3, -1));
        let serialized = serde_json::to_string(&piece).unwrap();
        assert_eq!(serialized, "\"I#1@3,-1\"");
        assert_eq!(serde_json::from_str::<Piece>(&serialized).unwrap(), piece);
    }

    #[test]
    fn test_piece_deserialization_error_cases() {
        assert!(serde_json::from_str::<Piece>("\"S1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1#4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1@4\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"X#1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"SS#1@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#4@4,18\"").is_err());
        assert!(serde_json::from_str::<Piece>("\"S#1@abc,18\"").is_err());
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }
}

pub use self::{board::*, piece::*, render_board::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod render_board;

/// Default playfield width in cells.
pub const BOARD_WIDTH: usize = 10;
/// Default playfield height in cells.
pub const BOARD_HEIGHT: usize = 20;

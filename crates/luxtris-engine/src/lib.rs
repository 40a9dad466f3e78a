pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected engine configuration.
///
/// Returned by [`EngineConfig::validate`] and by every [`GameSession`] constructor.
/// These are programmer errors, so sessions refuse to start with them instead of
/// degrading at runtime.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board dimensions must be positive, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    #[display("board {width}x{height} cannot fit a {piece_size}x{piece_size} piece")]
    BoardTooSmall {
        width: usize,
        height: usize,
        piece_size: usize,
    },
    #[display("piece set must contain at least one piece kind")]
    EmptyPieceSet,
    #[display("lookahead depth must be at least 1")]
    EmptyLookahead,
    #[display("base drop interval must be positive")]
    ZeroDropInterval,
    #[display("minimum drop interval {min_ms}ms exceeds base drop interval {base_ms}ms")]
    InvertedDropInterval { min_ms: u64, base_ms: u64 },
    #[display("speed factor must be in (0, 1], got {factor}")]
    SpeedFactorOutOfRange { factor: f64 },
    #[display("lines per level must be at least 1")]
    ZeroLinesPerLevel,
}

use serde::Serialize;

use crate::core::{
    board::Board,
    piece::{Piece, PieceKind},
    render_board::RenderBoard,
};

use super::{GameSession, GameStats, GameStatus};

/// Everything a presentation layer needs to draw one frame.
///
/// Serializes to JSON with boards as row strings and pieces in their
/// `"kind#rotation@x,y"` form.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub stats: GameStats,
    /// Gravity speed in rows per second.
    pub speed: f64,
    pub clock_ms: u64,
    /// Locked cells only.
    pub board: Board,
    /// Locked cells with clearing rows, ghost and falling piece drawn in.
    pub view: RenderBoard,
    pub active: Option<Piece>,
    pub ghost: Option<Piece>,
    pub held: Option<Piece>,
    pub next: Vec<PieceKind>,
    pub clearing_rows: Vec<usize>,
}

impl GameSession {
    /// Captures the current state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let interval = self.stats().drop_interval().as_secs_f64();
        GameSnapshot {
            status: self.status(),
            stats: self.stats().clone(),
            speed: if interval > 0.0 { 1.0 / interval } else { 0.0 },
            clock_ms: u64::try_from(self.clock().as_millis()).unwrap_or(u64::MAX),
            board: self.board().clone(),
            view: self.render_board(),
            active: self.active_piece().copied(),
            ghost: self.ghost_position(),
            held: self.held_piece().copied(),
            next: self.next_pieces().collect(),
            clearing_rows: self.clearing_rows().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineConfig, PieceSeed};

    #[test]
    fn test_snapshot_json() {
        let config = EngineConfig {
            pieces: vec![PieceKind::O],
            lookahead: 2,
            ..EngineConfig::default()
        };
        let mut session = GameSession::with_seed(config, PieceSeed::default()).unwrap();
        session.start_game();

        let snapshot = session.snapshot();
        assert!((snapshot.speed - 1.0).abs() < f64::EPSILON);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "playing");
        assert_eq!(json["active"], "O#0@4,0");
        assert_eq!(json["ghost"], "O#0@4,18");
        assert_eq!(json["held"], serde_json::Value::Null);
        assert_eq!(json["next"], serde_json::json!(["O", "O"]));
        assert_eq!(json["stats"]["level"], 1);
        assert_eq!(json["stats"]["drop_interval"], 1000);
        assert_eq!(json["view"][0], "....OO....");
        assert_eq!(json["view"][19], "....::....");
        assert_eq!(json["board"][0], "..........");
    }
}

use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::core::{Color, PieceKind};

/// Final numbers of a finished game, handed to whoever keeps high scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub score: usize,
    pub level: usize,
    pub lines: usize,
}

/// Notable things that happened inside the engine.
///
/// Events are fire-and-forget: the engine never reads anything back from the
/// receiver. Presentation layers use them to trigger sounds and effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A piece was merged into the board.
    PieceLocked { kind: PieceKind },
    /// The active piece was hard dropped by `cells` rows.
    HardDropped { cells: usize },
    /// Full rows were found and are waiting to collapse.
    ///
    /// `colors` holds the cell colors of each row, in the same order as `rows`.
    LineClearStarted {
        rows: Vec<usize>,
        colors: Vec<Vec<Color>>,
    },
    /// Four rows were cleared at once by a piece of the given color.
    TetrisCleared { color: Color },
    /// The clear left the board empty.
    PerfectClear { bonus: usize },
    /// Points awarded by a line clear, with the last cleared row as a position hint.
    ScoreGained { amount: usize, row_hint: usize },
    LevelUp { level: usize },
    GameOver {
        #[serde(flatten)]
        result: GameResult,
    },
}

/// Receiver of [`GameEvent`]s, such as an effects or audio layer.
pub trait EventSink {
    fn handle(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn handle(&mut self, event: GameEvent) {
        self.push(event);
    }
}

impl EventSink for mpsc::Sender<GameEvent> {
    fn handle(&mut self, event: GameEvent) {
        // A disconnected receiver just means nobody is listening anymore.
        let _ = self.send(event);
    }
}

/// Adapts a closure into an [`EventSink`].
///
/// # Example
///
/// ```
/// use luxtris_engine::{CallbackSink, EventSink, GameEvent};
///
/// let mut levels = Vec::new();
/// let mut sink = CallbackSink(|event| {
///     if let GameEvent::LevelUp { level } = event {
///         levels.push(level);
///     }
/// });
/// sink.handle(GameEvent::LevelUp { level: 2 });
/// drop(sink);
///
/// assert_eq!(levels, [2]);
/// ```
#[derive(Debug)]
pub struct CallbackSink<F>(pub F);

impl<F> EventSink for CallbackSink<F>
where
    F: FnMut(GameEvent),
{
    fn handle(&mut self, event: GameEvent) {
        (self.0)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_forwards_events() {
        let (mut tx, rx) = mpsc::channel();
        tx.handle(GameEvent::PerfectClear { bonus: 3000 });
        assert_eq!(rx.recv().unwrap(), GameEvent::PerfectClear { bonus: 3000 });

        drop(rx);
        // Sending after the receiver is gone must not panic.
        tx.handle(GameEvent::LevelUp { level: 3 });
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::GameOver {
            result: GameResult {
                score: 1200,
                level: 2,
                lines: 14,
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "event": "game_over", "score": 1200, "level": 2, "lines": 14 })
        );

        let event = GameEvent::TetrisCleared {
            color: PieceKind::I.color(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "event": "tetris_cleared", "color": "#64ffda" })
        );
    }
}

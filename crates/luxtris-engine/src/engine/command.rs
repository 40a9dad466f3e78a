use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::GameSession;

/// A single input to a [`GameSession`], as a value.
///
/// Scripted drivers and replays store games as command lists. In JSON, unit
/// commands are plain strings and the others are single-key objects:
///
/// ```
/// use luxtris_engine::Command;
///
/// let commands: Vec<Command> =
///     serde_json::from_str(r#"["start", "left", { "tick": { "ms": 16 } }, "hard_drop"]"#).unwrap();
/// assert_eq!(commands[2], Command::Tick { ms: 16 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Resume,
    TogglePause,
    End,
    Reset,
    Left,
    Right,
    SoftDrop,
    Move { dx: i32, dy: i32 },
    Rotate,
    HardDrop,
    Hold,
    CommitClear,
    /// Advances game time by `ms` milliseconds.
    Tick { ms: u64 },
}

impl GameSession {
    /// Runs a command and returns whether it had an effect.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start_game(),
            Command::Pause => self.pause_game(),
            Command::Resume => self.resume_game(),
            Command::TogglePause => self.toggle_pause(),
            Command::End => self.end_game(),
            Command::Reset => self.reset_game(),
            Command::Left => self.move_piece(-1, 0),
            Command::Right => self.move_piece(1, 0),
            Command::SoftDrop => self.soft_drop(),
            Command::Move { dx, dy } => self.move_piece(dx, dy),
            Command::Rotate => self.rotate(),
            Command::HardDrop => self.hard_drop(),
            Command::Hold => self.hold(),
            Command::CommitClear => self.commit_clear(),
            Command::Tick { ms } => self.tick(Duration::from_millis(ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineConfig, PieceKind, PieceSeed};

    #[test]
    fn test_command_json_forms() {
        assert_eq!(
            serde_json::to_value(Command::TogglePause).unwrap(),
            serde_json::json!("toggle_pause")
        );
        assert_eq!(
            serde_json::to_value(Command::Move { dx: -2, dy: 0 }).unwrap(),
            serde_json::json!({ "move": { "dx": -2, "dy": 0 } })
        );
        assert!(serde_json::from_str::<Command>(r#""teleport""#).is_err());
    }

    #[test]
    fn test_apply_script() {
        let config = EngineConfig {
            pieces: vec![PieceKind::O],
            ..EngineConfig::default()
        };
        let mut session = GameSession::with_seed(config, PieceSeed::default()).unwrap();
        let script: Vec<Command> = serde_json::from_str(
            r#"["left", "start", "left", "left", "left", "left", "left", "hard_drop", "pause", "right"]"#,
        )
        .unwrap();
        let applied: Vec<bool> = script.into_iter().map(|c| session.apply(c)).collect();

        assert_eq!(
            applied,
            [false, true, true, true, true, true, false, true, true, false]
        );
        assert_eq!(session.board().cell(0, 19), Some(PieceKind::O));
        assert!(session.status().is_paused());
    }
}

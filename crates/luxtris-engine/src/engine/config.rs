use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    core::{BOARD_HEIGHT, BOARD_WIDTH, PieceKind, PieceRotation},
};

/// Tunable rules of a game session.
///
/// Every field has a default matching the classic ruleset, so a configuration
/// file only needs to list what it overrides. Durations are whole milliseconds.
///
/// # Example
///
/// ```
/// use luxtris_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "line_clear_delay_ms": 0 }"#).unwrap();
/// assert_eq!(config.board_width, 10);
/// assert!(config.line_clear_delay().is_zero());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_width: usize,
    pub board_height: usize,
    /// Number of upcoming pieces kept in the preview queue.
    pub lookahead: usize,
    /// Piece kinds the generator draws from, uniformly.
    pub pieces: Vec<PieceKind>,
    /// Two clears closer together than this extend the combo.
    pub combo_window_ms: u64,
    /// How long full rows stay visible before they collapse.
    pub line_clear_delay_ms: u64,
    /// Gravity interval at level 1.
    pub base_drop_interval_ms: u64,
    /// Gravity never gets faster than this.
    pub min_drop_interval_ms: u64,
    /// Per-level multiplier applied to the drop interval.
    pub speed_factor: f64,
    pub lines_per_level: usize,
    /// Multiplied by the level when a clear empties the board.
    pub perfect_clear_bonus: usize,
    pub hard_drop_points_per_cell: usize,
    /// Multiplied by the combo count once the combo exceeds one.
    pub combo_bonus: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            lookahead: 5,
            pieces: PieceKind::ALL.to_vec(),
            combo_window_ms: 3000,
            line_clear_delay_ms: 200,
            base_drop_interval_ms: 1000,
            min_drop_interval_ms: 100,
            speed_factor: 0.833,
            lines_per_level: 10,
            perfect_clear_bonus: 3000,
            hard_drop_points_per_cell: 2,
            combo_bonus: 50,
        }
    }
}

impl EngineConfig {
    /// Checks that a session can be built from this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.board_width, self.board_height);
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyBoard { width, height });
        }
        if self.pieces.is_empty() {
            return Err(ConfigError::EmptyPieceSet);
        }
        // Every piece must be able to spawn and rotate somewhere on the board.
        let piece_size = self
            .pieces
            .iter()
            .map(|kind| {
                let shape = kind.shape(PieceRotation::default());
                shape.width().max(shape.height())
            })
            .max()
            .unwrap_or(0);
        if width < piece_size || height < piece_size {
            return Err(ConfigError::BoardTooSmall {
                width,
                height,
                piece_size,
            });
        }
        if self.lookahead == 0 {
            return Err(ConfigError::EmptyLookahead);
        }
        if self.base_drop_interval_ms == 0 {
            return Err(ConfigError::ZeroDropInterval);
        }
        if self.min_drop_interval_ms > self.base_drop_interval_ms {
            return Err(ConfigError::InvertedDropInterval {
                min_ms: self.min_drop_interval_ms,
                base_ms: self.base_drop_interval_ms,
            });
        }
        if !(self.speed_factor > 0.0 && self.speed_factor <= 1.0) {
            return Err(ConfigError::SpeedFactorOutOfRange {
                factor: self.speed_factor,
            });
        }
        if self.lines_per_level == 0 {
            return Err(ConfigError::ZeroLinesPerLevel);
        }
        Ok(())
    }

    #[must_use]
    pub fn combo_window(&self) -> Duration {
        Duration::from_millis(self.combo_window_ms)
    }

    #[must_use]
    pub fn line_clear_delay(&self) -> Duration {
        Duration::from_millis(self.line_clear_delay_ms)
    }

    #[must_use]
    pub fn base_drop_interval(&self) -> Duration {
        Duration::from_millis(self.base_drop_interval_ms)
    }

    #[must_use]
    pub fn min_drop_interval(&self) -> Duration {
        Duration::from_millis(self.min_drop_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.combo_window(), Duration::from_secs(3));
        assert_eq!(config.line_clear_delay(), Duration::from_millis(200));
        assert_eq!(config.pieces.len(), PieceKind::LEN);
    }

    #[test]
    fn test_rejects_empty_board() {
        let config = EngineConfig {
            board_width: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyBoard {
                width: 0,
                height: 20
            })
        );
    }

    #[test]
    fn test_rejects_board_narrower_than_i_piece() {
        let config = EngineConfig {
            board_width: 3,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooSmall { piece_size: 4, .. })
        ));

        // Without the I-piece a 3-wide board is fine.
        let config = EngineConfig {
            board_width: 3,
            pieces: vec![PieceKind::T, PieceKind::O],
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_empty_piece_set() {
        let config = EngineConfig {
            pieces: vec![],
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPieceSet));
    }

    #[test]
    fn test_rejects_bad_timing() {
        let zero_lookahead = EngineConfig {
            lookahead: 0,
            ..EngineConfig::default()
        };
        assert_eq!(zero_lookahead.validate(), Err(ConfigError::EmptyLookahead));

        let zero_interval = EngineConfig {
            base_drop_interval_ms: 0,
            min_drop_interval_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(zero_interval.validate(), Err(ConfigError::ZeroDropInterval));

        let inverted = EngineConfig {
            min_drop_interval_ms: 2000,
            ..EngineConfig::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedDropInterval { .. })
        ));

        for factor in [0.0, -0.5, 1.5, f64::NAN] {
            let config = EngineConfig {
                speed_factor: factor,
                ..EngineConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::SpeedFactorOutOfRange { .. })
                ),
                "factor {factor}"
            );
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "pieces": ["O"], "combo_window_ms": 500 }"#).unwrap();
        assert_eq!(config.pieces, [PieceKind::O]);
        assert_eq!(config.combo_window(), Duration::from_millis(500));
        assert_eq!(config.board_height, 20);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::EmptyBoard {
                width: 0,
                height: 20
            }
            .to_string(),
            "board dimensions must be positive, got 0x20"
        );
        assert_eq!(
            ConfigError::EmptyPieceSet.to_string(),
            "piece set must contain at least one piece kind"
        );
    }
}

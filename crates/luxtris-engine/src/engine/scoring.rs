use std::time::Duration;

use serde::Serialize;

use super::{EngineConfig, GameEvent, GameResult, events::EventSink};

/// Score values for line clears, multiplied by the current level.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 40 points
/// - 2 lines: 100 points
/// - 3 lines: 300 points
/// - 4 lines: 1200 points
pub const SCORE_TABLE: [usize; 5] = [0, 40, 100, 300, 1200];

/// Score, progression and combo state of a game.
///
/// Tracks:
///
/// - **Score**: line clears scaled by level, combo bonuses, perfect clears and
///   hard-drop distance
/// - **Level**: `lines / lines_per_level + 1`, never decreasing
/// - **Drop interval**: shrinks geometrically with the level down to a floor
/// - **Combo**: consecutive clears closer together than the combo window
/// - **Completed pieces** and a histogram of simultaneous line clears
///
/// # Example
///
/// ```
/// use luxtris_engine::{EngineConfig, GameStats};
///
/// let mut stats = GameStats::new(&EngineConfig::default());
/// let mut events = Vec::new();
/// stats.update_score(4, 19, &mut events);
///
/// assert_eq!(stats.score(), 1200);
/// assert_eq!(stats.lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct GameStats {
    score: usize,
    level: usize,
    lines: usize,
    combo: usize,
    #[serde(skip)]
    last_clear_at: Option<Duration>,
    #[serde(serialize_with = "serialize_millis")]
    drop_interval: Duration,
    completed_pieces: usize,
    line_cleared_counter: [usize; 5],
    #[serde(skip)]
    rules: ScoringRules,
}

/// The part of [`EngineConfig`] that scoring needs.
#[derive(Debug, Clone, Copy)]
struct ScoringRules {
    lines_per_level: usize,
    combo_window: Duration,
    combo_bonus: usize,
    perfect_clear_bonus: usize,
    hard_drop_points_per_cell: usize,
    base_drop_interval: Duration,
    min_drop_interval: Duration,
    speed_factor: f64,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl GameStats {
    /// Creates statistics for a fresh game: score 0, level 1, base drop interval.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let rules = ScoringRules {
            lines_per_level: config.lines_per_level,
            combo_window: config.combo_window(),
            combo_bonus: config.combo_bonus,
            perfect_clear_bonus: config.perfect_clear_bonus,
            hard_drop_points_per_cell: config.hard_drop_points_per_cell,
            base_drop_interval: config.base_drop_interval(),
            min_drop_interval: config.min_drop_interval(),
            speed_factor: config.speed_factor,
        };
        Self::from_rules(rules)
    }

    fn from_rules(rules: ScoringRules) -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            combo: 0,
            last_clear_at: None,
            drop_interval: rules.drop_interval_for_level(1),
            completed_pieces: 0,
            line_cleared_counter: [0; 5],
            rules,
        }
    }

    /// Returns the counters to their starting values, keeping the rules.
    pub fn reset(&mut self) {
        *self = Self::from_rules(self.rules);
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Returns the total number of lines cleared.
    #[must_use]
    pub const fn lines(&self) -> usize {
        self.lines
    }

    #[must_use]
    pub const fn combo(&self) -> usize {
        self.combo
    }

    /// Returns the game time of the most recent line clear.
    #[must_use]
    pub const fn last_clear_at(&self) -> Option<Duration> {
        self.last_clear_at
    }

    /// Returns the current gravity interval.
    #[must_use]
    pub const fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Returns a histogram of locks by number of lines they cleared.
    ///
    /// Array indices represent:
    /// - `[0]`: Number of locks with 0 lines cleared
    /// - `[1]`: Number of singles (1 line)
    /// - `[2]`: Number of doubles (2 lines)
    /// - `[3]`: Number of triples (3 lines)
    /// - `[4]`: Number of tetrises (4 lines)
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Returns the final numbers reported at game over.
    #[must_use]
    pub const fn result(&self) -> GameResult {
        GameResult {
            score: self.score,
            level: self.level,
            lines: self.lines,
        }
    }

    /// Returns the gravity interval for the given level.
    ///
    /// `max(min, floor(base * speed_factor ^ (level - 1)))`
    #[must_use]
    pub fn drop_interval_for_level(&self, level: usize) -> Duration {
        self.rules.drop_interval_for_level(level)
    }

    /// Counts a locked piece.
    pub const fn register_lock(&mut self) {
        self.completed_pieces += 1;
    }

    /// Records a lock that completed rows at game time `now` and updates the combo.
    ///
    /// The combo grows when the previous clear happened less than the combo
    /// window ago, otherwise it starts over at 1.
    pub fn register_clear(&mut self, now: Duration) {
        let within_window = self
            .last_clear_at
            .is_some_and(|last| now.saturating_sub(last) < self.rules.combo_window);
        self.combo = if within_window { self.combo + 1 } else { 1 };
        self.last_clear_at = Some(now);
    }

    /// Records a lock that completed no rows.
    pub const fn reset_combo(&mut self) {
        self.combo = 0;
        self.line_cleared_counter[0] += 1;
    }

    /// Adds the perfect-clear bonus for the current level and returns it.
    pub fn award_perfect_clear(&mut self) -> usize {
        let bonus = self.rules.perfect_clear_bonus * self.level;
        self.score += bonus;
        bonus
    }

    /// Adds hard-drop points for the given number of rows travelled.
    pub fn award_hard_drop(&mut self, cells: usize) {
        self.score += cells * self.rules.hard_drop_points_per_cell;
    }

    /// Scores a committed line clear and advances progression.
    ///
    /// `row_hint` is where a presentation layer may show the gained points.
    pub fn update_score(
        &mut self,
        lines_cleared: usize,
        row_hint: usize,
        events: &mut impl EventSink,
    ) {
        let index = lines_cleared.min(SCORE_TABLE.len() - 1);
        let base = SCORE_TABLE[index];
        let combo_bonus = if self.combo > 1 {
            self.combo * self.rules.combo_bonus
        } else {
            0
        };
        let gained = base * self.level + combo_bonus;
        self.score += gained;
        self.line_cleared_counter[index] += 1;

        let old_level = self.level;
        self.lines += lines_cleared;
        self.level = self.lines / self.rules.lines_per_level + 1;
        self.drop_interval = self.rules.drop_interval_for_level(self.level);

        if base > 0 {
            events.handle(GameEvent::ScoreGained {
                amount: gained,
                row_hint,
            });
        }
        if self.level > old_level {
            events.handle(GameEvent::LevelUp { level: self.level });
        }
    }
}

impl ScoringRules {
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn drop_interval_for_level(&self, level: usize) -> Duration {
        let exponent = i32::try_from(level.saturating_sub(1)).unwrap_or(i32::MAX);
        let base_ms = self.base_drop_interval.as_millis() as f64;
        let millis = (base_ms * self.speed_factor.powi(exponent)).floor() as u64;
        Duration::from_millis(millis).max(self.min_drop_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> GameStats {
        GameStats::new(&EngineConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let stats = stats();
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.combo(), 0);
        assert_eq!(stats.drop_interval(), Duration::from_secs(1));
        assert_eq!(stats.last_clear_at(), None);
    }

    #[test]
    fn test_score_table_at_level_one() {
        for (lines, expected) in [(1, 40), (2, 100), (3, 300), (4, 1200)] {
            let mut stats = stats();
            let mut events = Vec::new();
            stats.update_score(lines, 19, &mut events);
            assert_eq!(stats.score(), expected, "{lines} lines");
            assert_eq!(
                events,
                [GameEvent::ScoreGained {
                    amount: expected,
                    row_hint: 19
                }]
            );
        }
    }

    #[test]
    fn test_score_scales_with_level() {
        let mut stats = stats();
        let mut events = Vec::new();
        for _ in 0..10 {
            stats.update_score(1, 19, &mut events);
        }
        assert_eq!(stats.level(), 2);
        let before = stats.score();
        stats.update_score(2, 19, &mut events);
        assert_eq!(stats.score() - before, 200);
    }

    #[test]
    fn test_combo_window() {
        let mut stats = stats();
        stats.register_clear(Duration::from_millis(1000));
        assert_eq!(stats.combo(), 1);
        stats.register_clear(Duration::from_millis(3999));
        assert_eq!(stats.combo(), 2);
        // Exactly the window apart is too late.
        stats.register_clear(Duration::from_millis(6999));
        assert_eq!(stats.combo(), 1);

        stats.reset_combo();
        assert_eq!(stats.combo(), 0);
        assert_eq!(stats.last_clear_at(), Some(Duration::from_millis(6999)));
    }

    #[test]
    fn test_combo_bonus_applies_from_second_clear() {
        let mut stats = stats();
        let mut events = Vec::new();
        stats.register_clear(Duration::ZERO);
        stats.update_score(1, 19, &mut events);
        assert_eq!(stats.score(), 40);

        stats.register_clear(Duration::from_millis(500));
        stats.update_score(1, 19, &mut events);
        assert_eq!(stats.score(), 40 + 40 + 2 * 50);
    }

    #[test]
    fn test_level_up_event_and_faster_gravity() {
        let mut stats = stats();
        let mut events = Vec::new();
        stats.update_score(4, 19, &mut events);
        stats.update_score(4, 19, &mut events);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelUp { .. })));

        events.clear();
        stats.update_score(2, 18, &mut events);
        assert_eq!(stats.lines(), 10);
        assert_eq!(stats.level(), 2);
        assert_eq!(
            events,
            [
                GameEvent::ScoreGained {
                    amount: 100,
                    row_hint: 18
                },
                GameEvent::LevelUp { level: 2 },
            ]
        );
        assert!(stats.drop_interval() < Duration::from_secs(1));
    }

    #[test]
    fn test_drop_interval_curve() {
        let stats = stats();
        assert_eq!(stats.drop_interval_for_level(1), Duration::from_millis(1000));
        assert_eq!(stats.drop_interval_for_level(2), Duration::from_millis(833));

        let mut previous = Duration::MAX;
        for level in 1..40 {
            let interval = stats.drop_interval_for_level(level);
            assert!(interval <= previous);
            assert!(interval >= Duration::from_millis(100));
            previous = interval;
        }
        assert_eq!(stats.drop_interval_for_level(30), Duration::from_millis(100));
    }

    #[test]
    fn test_bonuses() {
        let mut stats = stats();
        assert_eq!(stats.award_perfect_clear(), 3000);
        stats.award_hard_drop(18);
        assert_eq!(stats.score(), 3036);

        let mut events = Vec::new();
        stats.update_score(0, 0, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_reset_keeps_rules() {
        let config = EngineConfig {
            base_drop_interval_ms: 500,
            ..EngineConfig::default()
        };
        let mut stats = GameStats::new(&config);
        stats.award_hard_drop(3);
        stats.register_lock();
        stats.reset();
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.completed_pieces(), 0);
        assert_eq!(stats.drop_interval(), Duration::from_millis(500));
        assert_eq!(stats.drop_interval_for_level(1), Duration::from_millis(500));
    }

    #[test]
    fn test_result() {
        let mut stats = stats();
        let mut events = Vec::new();
        stats.update_score(3, 17, &mut events);
        assert_eq!(
            stats.result(),
            GameResult {
                score: 300,
                level: 1,
                lines: 3
            }
        );
    }
}

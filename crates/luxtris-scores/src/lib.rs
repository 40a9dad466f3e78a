//! High score table for finished games.
//!
//! The engine only reports a [`GameResult`] at game over; this crate turns it
//! into a named, dated entry and keeps the best ones. Storage is left to the
//! caller: the table is serde-serializable.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use luxtris_engine::GameResult;
//! use luxtris_scores::{HighScoreEntry, HighScoreTable};
//!
//! let result = GameResult { score: 1200, level: 2, lines: 12 };
//! let mut table = HighScoreTable::new();
//! assert!(table.qualifies(result.score));
//!
//! let entry = HighScoreEntry::new("  ada ", result, Utc::now())?;
//! assert_eq!(table.insert(entry), Some(1));
//! assert_eq!(table.best().map(|e| e.name.as_str()), Some("ada"));
//! # Ok::<(), luxtris_scores::ScoreEntryError>(())
//! ```

use chrono::{DateTime, Utc};
use luxtris_engine::GameResult;
use serde::{Deserialize, Serialize};

/// Rejected player name.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScoreEntryError {
    #[display("player name must not be empty")]
    EmptyName,
    #[display("player name must be at most {max} characters, got {len}")]
    NameTooLong { len: usize, max: usize },
}

/// One row of the high score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: usize,
    pub level: usize,
    pub lines: usize,
    pub date: DateTime<Utc>,
}

impl HighScoreEntry {
    /// Longest accepted player name, in characters.
    pub const MAX_NAME_LEN: usize = 20;

    /// Creates an entry for a finished game.
    ///
    /// Surrounding whitespace is trimmed from `name`.
    pub fn new(
        name: &str,
        result: GameResult,
        date: DateTime<Utc>,
    ) -> Result<Self, ScoreEntryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoreEntryError::EmptyName);
        }
        let len = name.chars().count();
        if len > Self::MAX_NAME_LEN {
            return Err(ScoreEntryError::NameTooLong {
                len,
                max: Self::MAX_NAME_LEN,
            });
        }
        let GameResult {
            score,
            level,
            lines,
        } = result;
        Ok(Self {
            name: name.to_owned(),
            score,
            level,
            lines,
            date,
        })
    }
}

/// The best entries, highest score first.
///
/// Entries with equal scores keep their insertion order, so an earlier score
/// stays ahead of a later tie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScoreTable {
    entries: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    /// Number of entries the table keeps.
    pub const CAPACITY: usize = 10;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the entries, best first.
    #[must_use]
    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    #[must_use]
    pub fn best(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks whether a game with this score would make it into the table.
    #[must_use]
    pub fn qualifies(&self, score: usize) -> bool {
        self.entries.len() < Self::CAPACITY
            || self.entries.last().is_some_and(|lowest| score > lowest.score)
    }

    /// Adds an entry, dropping the lowest one if the table overflows.
    ///
    /// Returns the 1-based rank of the new entry, or `None` if it did not make
    /// the table.
    pub fn insert(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let index = self.entries.partition_point(|e| e.score >= entry.score);
        self.entries.insert(index, entry);
        self.entries.truncate(Self::CAPACITY);
        Some(index + 1)
    }

    /// Rebuilds a table from stored entries, restoring order and capacity.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = HighScoreEntry>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(Self::CAPACITY);
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn entry(name: &str, score: usize) -> HighScoreEntry {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        HighScoreEntry::new(
            name,
            GameResult {
                score,
                level: 1,
                lines: 0,
            },
            date,
        )
        .unwrap()
    }

    #[test]
    fn test_entry_name_validation() {
        let result = GameResult {
            score: 10,
            level: 1,
            lines: 0,
        };
        let now = Utc::now();
        assert_eq!(
            HighScoreEntry::new("   ", result, now),
            Err(ScoreEntryError::EmptyName)
        );
        assert_eq!(
            HighScoreEntry::new(&"x".repeat(21), result, now),
            Err(ScoreEntryError::NameTooLong { len: 21, max: 20 })
        );
        assert_eq!(
            HighScoreEntry::new(&"é".repeat(20), result, now).unwrap().name,
            "é".repeat(20)
        );
    }

    #[test]
    fn test_insert_keeps_descending_order() {
        let mut table = HighScoreTable::new();
        assert_eq!(table.insert(entry("a", 300)), Some(1));
        assert_eq!(table.insert(entry("b", 500)), Some(1));
        assert_eq!(table.insert(entry("c", 100)), Some(3));
        assert_eq!(table.insert(entry("d", 300)), Some(3));

        let names: Vec<_> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "d", "c"]);
    }

    #[test]
    fn test_table_keeps_top_ten() {
        let mut table = HighScoreTable::new();
        for score in 1..=10 {
            assert!(table.qualifies(score * 100));
            table.insert(entry("p", score * 100));
        }
        assert_eq!(table.len(), HighScoreTable::CAPACITY);

        // A tie with the lowest entry does not displace it.
        assert!(!table.qualifies(100));
        assert_eq!(table.insert(entry("late", 100)), None);

        assert_eq!(table.insert(entry("new", 150)), Some(10));
        assert_eq!(table.len(), HighScoreTable::CAPACITY);
        assert_eq!(table.entries().last().unwrap().score, 150);
        assert_eq!(table.best().unwrap().score, 1000);
    }

    #[test]
    fn test_from_entries_sorts_and_truncates() {
        let table = HighScoreTable::from_entries((0..15).map(|i| entry("p", i)));
        assert_eq!(table.len(), 10);
        assert_eq!(table.best().unwrap().score, 14);
        assert_eq!(table.entries().last().unwrap().score, 5);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut table = HighScoreTable::new();
        table.insert(entry("ada", 40));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "name": "ada",
                "score": 40,
                "level": 1,
                "lines": 0,
                "date": "2024-05-01T12:00:00Z",
            }])
        );
        let back: HighScoreTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}

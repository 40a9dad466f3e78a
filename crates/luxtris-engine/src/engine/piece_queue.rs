use std::{collections::VecDeque, fmt::Write as _};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Lookahead queue of upcoming pieces.
///
/// Each piece is drawn independently and uniformly from the configured piece
/// kinds. There is no 7-bag: repeats and droughts are possible.
///
/// The queue is topped up to its lookahead depth both before and after every
/// draw, so the preview always shows `depth` pieces.
///
/// # Example
///
/// ```
/// use luxtris_engine::{PieceKind, PieceQueue, PieceSeed};
///
/// let mut queue = PieceQueue::with_seed(PieceSeed::default(), &PieceKind::ALL, 5);
/// let first = queue.pop_next();
/// assert!(PieceKind::ALL.contains(&first));
/// assert_eq!(queue.next_pieces().count(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    kinds: ArrayVec<PieceKind, { PieceKind::LEN }>,
    depth: usize,
    queue: VecDeque<PieceKind>,
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed for the queue's random number generator.
/// The same seed produces the same piece sequence, which makes sessions
/// reproducible for tests and scripted replays.
///
/// Serializes as a 32-character hex string.
///
/// # Example
///
/// ```
/// use luxtris_engine::PieceSeed;
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
/// let json = serde_json::to_string(&seed).unwrap();
/// assert_eq!(json.len(), 34);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self::from_u128(num))
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceQueue {
    /// Creates a queue drawing from `kinds` with a fixed seed.
    ///
    /// Duplicate kinds are ignored, so they do not skew the distribution.
    ///
    /// # Panics
    ///
    /// Panics if `kinds` is empty or `depth` is zero. Session constructors reject
    /// both through [`EngineConfig::validate`](crate::EngineConfig::validate).
    #[must_use]
    pub fn with_seed(seed: PieceSeed, kinds: &[PieceKind], depth: usize) -> Self {
        let mut unique: ArrayVec<PieceKind, { PieceKind::LEN }> = ArrayVec::new();
        for &kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        assert!(!unique.is_empty(), "piece queue needs at least one kind");
        assert!(depth > 0, "piece queue needs a positive lookahead depth");

        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            kinds: unique,
            depth,
            queue: VecDeque::with_capacity(depth + 1),
        };
        this.refill();
        this
    }

    /// Tops the queue up to the lookahead depth.
    fn refill(&mut self) {
        while self.queue.len() < self.depth {
            let kind = self.kinds[self.rng.random_range(0..self.kinds.len())];
            self.queue.push_back(kind);
        }
    }

    /// Drops every queued piece and draws a fresh lookahead.
    ///
    /// The random generator keeps its state, so consecutive games differ.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.refill();
    }

    /// Draws the next piece.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (should never happen with proper refill logic).
    pub fn pop_next(&mut self) -> PieceKind {
        self.refill();
        let next = self
            .queue
            .pop_front()
            .expect("piece queue should never be empty");
        self.refill();
        next
    }

    /// Returns the piece [`Self::pop_next`] would return.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.queue[0]
    }

    /// Returns an iterator over the upcoming pieces, nearest first.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}

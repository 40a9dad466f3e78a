//! Game rules and session state built on the core data structures:
//!
//! - [`GameSession`] - One game: state machine, piece control, lock-and-resolve, timing
//! - [`GameStats`] - Score, level, lines, combo and gravity interval
//! - [`PieceQueue`] - Uniform random piece generation with a lookahead preview
//! - [`PieceSeed`] - Seed for deterministic piece generation
//! - [`EngineConfig`] - Tunable rules, validated when a session is built
//! - [`GameEvent`] / [`EventSink`] - Notifications for effects and audio layers
//! - [`Command`] - Session inputs as serializable values
//! - [`GameSnapshot`] - Serializable view of a session for rendering
//!
//! # Game Flow
//!
//! 1. Build a [`GameSession`] from an [`EngineConfig`] and start it from the menu
//! 2. The caller moves, rotates, holds and drops the falling piece
//! 3. [`GameSession::tick`] advances gravity and pending line clears
//! 4. A piece that cannot move down locks; full rows clear after a short delay
//! 5. The next piece spawns; if it collides the game is over
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use luxtris_engine::{EngineConfig, GameEvent, GameSession};
//!
//! let mut session = GameSession::new(EngineConfig::default())?;
//! session.start_game();
//!
//! while session.status().is_playing() {
//!     session.hard_drop();
//!     session.tick(Duration::from_millis(250));
//! }
//!
//! let game_over = session
//!     .drain_events()
//!     .find(|event| matches!(event, GameEvent::GameOver { .. }));
//! assert!(game_over.is_some());
//! # Ok::<(), luxtris_engine::ConfigError>(())
//! ```

pub use self::{
    command::*, config::*, events::*, piece_queue::*, scoring::*, session::*, snapshot::*,
};

mod command;
mod config;
mod events;
mod piece_queue;
mod scoring;
mod session;
mod snapshot;

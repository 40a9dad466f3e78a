use std::time::Duration;

use rand::Rng as _;
use serde::Serialize;

use crate::{
    ConfigError,
    core::{
        board::Board,
        piece::{Color, Piece, PieceKind, PiecePosition},
        render_board::{RenderBoard, RenderCell},
    },
};

use super::{
    EngineConfig, GameEvent, GameResult, GameStats, PieceQueue, PieceSeed, events::EventSink,
};

/// Lifecycle state of a [`GameSession`].
///
/// Piece commands and [`GameSession::tick`] only have an effect while
/// [`GameStatus::Playing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Rows that are full and waiting for the line-clear delay to run out.
#[derive(Debug, Clone)]
struct PendingClear {
    rows: Vec<usize>,
    remaining: Duration,
}

/// A single game, driven by commands and time ticks from the caller.
///
/// The session is synchronous and owns all game state. It never reads a clock:
/// game time only advances through [`GameSession::tick`], so a fixed seed and
/// command sequence always reproduces the same game.
///
/// Every command returns whether it had an effect. Rejected commands (wrong
/// status, collisions) leave the session untouched.
///
/// Events are buffered until the caller collects them with
/// [`GameSession::drain_events`] or [`GameSession::flush_events`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use luxtris_engine::{EngineConfig, GameSession, PieceSeed};
///
/// let mut session = GameSession::with_seed(EngineConfig::default(), PieceSeed::default())?;
/// assert!(session.start_game());
///
/// session.move_piece(-1, 0);
/// session.rotate();
/// session.hard_drop();
/// session.tick(Duration::from_millis(16));
///
/// assert_eq!(session.stats().completed_pieces(), 1);
/// # Ok::<(), luxtris_engine::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: EngineConfig,
    board: Board,
    queue: PieceQueue,
    active: Option<Piece>,
    held: Option<Piece>,
    stats: GameStats,
    status: GameStatus,
    clock: Duration,
    gravity_elapsed: Duration,
    pending_clear: Option<PendingClear>,
    events: Vec<GameEvent>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::build(EngineConfig::default(), rand::rng().random())
    }
}

impl GameSession {
    /// Creates a session in the menu with a random seed.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Creates a session in the menu whose piece sequence is fixed by `seed`.
    pub fn with_seed(config: EngineConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    fn build(config: EngineConfig, seed: PieceSeed) -> Self {
        Self {
            board: Board::new(config.board_width, config.board_height),
            queue: PieceQueue::with_seed(seed, &config.pieces, config.lookahead),
            active: None,
            held: None,
            stats: GameStats::new(&config),
            status: GameStatus::Menu,
            clock: Duration::ZERO,
            gravity_elapsed: Duration::ZERO,
            pending_clear: None,
            events: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the falling piece.
    ///
    /// There is none outside a game and while full rows are waiting to collapse.
    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<&Piece> {
        self.held.as_ref()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.next_pieces()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Returns the game time accumulated by [`Self::tick`] while playing.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Returns the rows currently waiting to collapse, top to bottom.
    #[must_use]
    pub fn clearing_rows(&self) -> &[usize] {
        self.pending_clear
            .as_ref()
            .map(|pending| pending.rows.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn result(&self) -> GameResult {
        self.stats.result()
    }

    /// Returns the buffered events without consuming them.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Removes and returns the buffered events, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Hands every buffered event to `sink`, oldest first.
    pub fn flush_events(&mut self, sink: &mut impl EventSink) {
        for event in self.events.drain(..) {
            sink.handle(event);
        }
    }

    /// Returns the landing position of the falling piece.
    #[must_use]
    pub fn ghost_position(&self) -> Option<Piece> {
        self.active
            .map(|piece| piece.simulate_drop_position(&self.board))
    }

    /// Composes the locked cells, clearing rows, ghost and falling piece into
    /// one view.
    #[must_use]
    pub fn render_board(&self) -> RenderBoard {
        let mut view = RenderBoard::from_board(&self.board);
        view.mark_clearing(self.clearing_rows());
        if let Some(ghost) = self.ghost_position() {
            view.fill_piece_as(&ghost, RenderCell::Ghost);
        }
        if let Some(active) = &self.active {
            view.fill_piece_as(active, RenderCell::Active);
        }
        view
    }

    /// Starts a new game from the menu.
    ///
    /// Clears the board, score and hold slot, draws a fresh preview and spawns
    /// the first piece.
    pub fn start_game(&mut self) -> bool {
        if !self.status.is_menu() {
            return false;
        }
        self.clear_game();
        self.queue.reset();
        self.status = GameStatus::Playing;
        self.spawn_next();
        true
    }

    pub fn pause_game(&mut self) -> bool {
        if !self.status.is_playing() {
            return false;
        }
        self.status = GameStatus::Paused;
        true
    }

    pub fn resume_game(&mut self) -> bool {
        if !self.status.is_paused() {
            return false;
        }
        self.status = GameStatus::Playing;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.status {
            GameStatus::Playing => self.pause_game(),
            GameStatus::Paused => self.resume_game(),
            GameStatus::Menu | GameStatus::GameOver => false,
        }
    }

    /// Abandons the current game and returns to the menu without a game-over event.
    ///
    /// The abandoned game is wiped like [`Self::reset_game`] does.
    pub fn end_game(&mut self) -> bool {
        if self.status.is_menu() {
            return false;
        }
        self.clear_game();
        self.status = GameStatus::Menu;
        true
    }

    /// Leaves the game-over screen, wiping the finished game.
    pub fn reset_game(&mut self) -> bool {
        if !self.status.is_game_over() {
            return false;
        }
        self.clear_game();
        self.status = GameStatus::Menu;
        true
    }

    fn clear_game(&mut self) {
        self.board.clear();
        self.stats.reset();
        self.active = None;
        self.held = None;
        self.pending_clear = None;
        self.clock = Duration::ZERO;
        self.gravity_elapsed = Duration::ZERO;
    }

    fn playing_piece(&self) -> Option<Piece> {
        self.active.filter(|_| self.status.is_playing())
    }

    /// Moves the falling piece if the target position is free.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.playing_piece() else {
            return false;
        };
        if self.board.collides(&piece, dx, dy) {
            return false;
        }
        self.active = Some(piece.shifted(dx, dy));
        true
    }

    /// Rotates the falling piece clockwise, trying in place, left, right, then up.
    pub fn rotate(&mut self) -> bool {
        let Some(piece) = self.playing_piece() else {
            return false;
        };
        let Some(rotated) = piece.super_rotated_right(&self.board) else {
            return false;
        };
        self.active = Some(rotated);
        true
    }

    /// Moves the falling piece one row down, locking it if it cannot move.
    pub fn soft_drop(&mut self) -> bool {
        let Some(piece) = self.playing_piece() else {
            return false;
        };
        if !self.move_piece(0, 1) {
            self.lock_and_resolve(piece);
        }
        true
    }

    /// Drops the falling piece to its landing position and locks it.
    ///
    /// Scores points for every row travelled.
    pub fn hard_drop(&mut self) -> bool {
        if self.playing_piece().is_none() {
            return false;
        }
        let mut cells = 0;
        while self.move_piece(0, 1) {
            cells += 1;
        }
        self.stats.award_hard_drop(cells);
        self.events.push(GameEvent::HardDropped { cells });
        if let Some(piece) = self.active {
            self.lock_and_resolve(piece);
        }
        true
    }

    /// Puts the falling piece into the hold slot.
    ///
    /// With an empty slot the next piece spawns; otherwise the held piece takes
    /// the falling piece's position. The held piece keeps its rotation and moves
    /// to the neutral anchor. Rejected if the incoming piece would collide.
    pub fn hold(&mut self) -> bool {
        let Some(piece) = self.playing_piece() else {
            return false;
        };
        let incoming = match self.held {
            Some(held) => held.with_position(piece.position()),
            None => Piece::spawn(self.queue.peek_next(), self.board.width()),
        };
        if self.board.is_colliding(&incoming) {
            return false;
        }
        if self.held.is_none() {
            self.queue.pop_next();
        }
        self.held = Some(piece.with_position(PiecePosition::ORIGIN));
        self.active = Some(incoming);
        true
    }

    /// Advances game time by `delta`.
    ///
    /// While rows are clearing this counts down the line-clear delay and
    /// commits the clear when it runs out. Otherwise gravity accumulates, and
    /// once the accumulated time exceeds the drop interval the falling piece
    /// moves down one row (locking if it cannot) and the accumulator restarts.
    ///
    /// Returns `false` when not playing.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.status.is_playing() {
            return false;
        }
        self.clock += delta;

        if let Some(pending) = &mut self.pending_clear {
            pending.remaining = pending.remaining.saturating_sub(delta);
            if pending.remaining.is_zero() {
                self.commit_clear();
            }
            return true;
        }

        self.gravity_elapsed += delta;
        if self.gravity_elapsed > self.stats.drop_interval() {
            self.gravity_elapsed = Duration::ZERO;
            self.soft_drop();
        }
        true
    }

    /// Collapses the clearing rows now, scores them and spawns the next piece.
    ///
    /// Called by [`Self::tick`] once the line-clear delay runs out; hosts that
    /// drive animations themselves may call it earlier.
    pub fn commit_clear(&mut self) -> bool {
        if !self.status.is_playing() {
            return false;
        }
        let Some(PendingClear { rows, .. }) = self.pending_clear.take() else {
            return false;
        };
        self.board.collapse(&rows);
        let row_hint = rows.last().copied().unwrap_or(0);
        self.stats.update_score(rows.len(), row_hint, &mut self.events);
        self.spawn_next();
        true
    }

    fn lock_and_resolve(&mut self, piece: Piece) {
        self.board.lock(&piece);
        self.active = None;
        self.stats.register_lock();
        self.events.push(GameEvent::PieceLocked { kind: piece.kind() });

        let rows = self.board.find_full_rows();
        if rows.is_empty() {
            self.stats.reset_combo();
            self.spawn_next();
        } else {
            self.begin_clear(rows, piece.color());
        }
    }

    fn begin_clear(&mut self, rows: Vec<usize>, color: Color) {
        // The game clock stops while paused, so pausing also freezes the combo window.
        self.stats.register_clear(self.clock);

        let colors = rows.iter().map(|&y| self.board.row_colors(y)).collect();
        self.events.push(GameEvent::LineClearStarted {
            rows: rows.clone(),
            colors,
        });
        if self.board.is_perfect_clear(&rows) {
            let bonus = self.stats.award_perfect_clear();
            self.events.push(GameEvent::PerfectClear { bonus });
        }
        if rows.len() == 4 {
            self.events.push(GameEvent::TetrisCleared { color });
        }

        let delay = self.config.line_clear_delay();
        self.pending_clear = Some(PendingClear {
            rows,
            remaining: delay,
        });
        if delay.is_zero() {
            self.commit_clear();
        }
    }

    fn spawn_next(&mut self) {
        let piece = Piece::spawn(self.queue.pop_next(), self.board.width());
        if self.board.is_colliding(&piece) {
            self.status = GameStatus::GameOver;
            self.active = None;
            self.events.push(GameEvent::GameOver {
                result: self.stats.result(),
            });
            return;
        }
        self.active = Some(piece);
    }
}

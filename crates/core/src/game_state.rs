//! Game state - one playable session around a board
//!
//! [`GameState`] owns the board and everything that mutates it, and is the
//! only place that decides whether player input is accepted. It holds the
//! single-session guard: swaps are refused while a cascade is running.

use std::fmt;

use crate::board::Board;
use crate::cascade::{CascadeContext, CascadeEngine, CascadePhase, StepReport};
use crate::config::{ConfigError, GameConfig};
use crate::events::{BoardEvent, EventLog, ScoreSink};
use crate::matcher::board_has_match;
use crate::rng::{RandomSource, SimpleRng};
use crate::score::ScoreTracker;
use crate::snapshot::{fnv1a64_cells, GameSnapshot, SwapFeedback};
use crate::swap::{attempt_swap, find_swap_candidate, RejectReason, SwapOutcome};
use crate::types::{GameAction, Pos, CLEAR_FLASH_MS};

/// Upper bound on steps for [`GameState::settle`].
pub const SETTLE_STEP_BUDGET: u32 = 100_000;

/// What a selection press did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// First pick stored.
    Selected(Pos),
    /// The same cell was picked twice; selection dropped.
    Deselected,
    /// Second pick; the swap was attempted and the selection dropped.
    Swapped(SwapOutcome),
    /// A cascade is running or the session has not started.
    Busy,
    OutOfRange,
}

pub struct GameState {
    config: GameConfig,
    board: Board,
    cascade: CascadeEngine,
    score: ScoreTracker,
    rng: Box<dyn RandomSource>,
    events: EventLog,
    score_sink: Option<Box<dyn ScoreSink>>,

    started: bool,
    episode_id: u32,
    moves: u32,
    cursor: Pos,
    first_selected: Option<Pos>,
    last_swap: Option<SwapFeedback>,

    fill_timer_ms: u32,
    flash: Vec<Pos>,
    flash_ms: u32,
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("board", &self.board.to_rows())
            .field("phase", &self.cascade.phase())
            .field("score", &self.score.score())
            .field("cursor", &self.cursor)
            .field("first_selected", &self.first_selected)
            .field("episode_id", &self.episode_id)
            .finish_non_exhaustive()
    }
}

impl GameState {
    /// Create an unstarted session with an all-EMPTY board.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.width, config.height);
        let rng = Box::new(SimpleRng::new(config.seed));
        Ok(Self::assemble(config, board, rng))
    }

    /// Create a started session around an existing board.
    ///
    /// The board's size overrides the configured one. A board with EMPTY cells
    /// begins with a fill session, one with standing matches begins by
    /// clearing them. Otherwise it is immediately playable.
    pub fn from_board(mut config: GameConfig, board: Board) -> Result<Self, ConfigError> {
        config.width = board.width();
        config.height = board.height();
        config.validate()?;
        let rng = Box::new(SimpleRng::new(config.seed));
        let mut state = Self::assemble(config, board, rng);
        state.started = true;
        if state.board.empty_count() > 0 {
            state.cascade.begin_fill();
        } else if board_has_match(&state.board) {
            state.cascade.begin_after_swap();
        }
        Ok(state)
    }

    fn assemble(config: GameConfig, board: Board, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            board,
            cascade: CascadeEngine::new(),
            score: ScoreTracker::new(),
            rng,
            events: EventLog::new(),
            score_sink: None,
            started: false,
            episode_id: 0,
            moves: 0,
            cursor: Pos::new(0, 0),
            first_selected: None,
            last_swap: None,
            fill_timer_ms: 0,
            flash: Vec::new(),
            flash_ms: 0,
        }
    }

    /// Replace the spawn color source.
    pub fn with_random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn set_score_sink(&mut self, sink: Box<dyn ScoreSink>) {
        self.score_sink = Some(sink);
    }

    /// Begin the initial fill. Does nothing if already started.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.fill_timer_ms = 0;
        self.cascade.begin_fill();
        tracing::info!(
            width = self.config.width,
            height = self.config.height,
            seed = self.config.seed,
            episode = self.episode_id,
            "session started"
        );
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> CascadePhase {
        self.cascade.phase()
    }

    pub fn cascade(&self) -> &CascadeEngine {
        &self.cascade
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    /// Accepted swaps this episode.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn cursor(&self) -> Pos {
        self.cursor
    }

    pub fn selected(&self) -> Option<Pos> {
        self.first_selected
    }

    /// Whether player input would currently be accepted.
    pub fn is_playable(&self) -> bool {
        self.started && !self.cascade.is_active()
    }

    /// Presenter notifications not yet drained.
    ///
    /// The log only spans the current session: each swap attempt starts it over.
    pub fn events(&self) -> &[BoardEvent] {
        self.events.events()
    }

    /// Take the presenter notifications recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        self.events.drain()
    }

    /// A swap the player could make right now, if any.
    pub fn hint(&self) -> Option<(Pos, Pos)> {
        if !self.is_playable() {
            return None;
        }
        find_swap_candidate(&self.board)
    }

    /// Pick the piece at `pos`.
    pub fn select(&mut self, pos: Pos) -> SelectOutcome {
        if !self.is_playable() {
            return SelectOutcome::Busy;
        }
        if !self.board.contains(pos) {
            return SelectOutcome::OutOfRange;
        }
        match self.first_selected.take() {
            None => {
                self.first_selected = Some(pos);
                SelectOutcome::Selected(pos)
            }
            Some(first) if first == pos => SelectOutcome::Deselected,
            Some(first) => SelectOutcome::Swapped(self.attempt_swap(first, pos)),
        }
    }

    /// Swap two pieces directly, bypassing the selection state.
    pub fn attempt_swap(&mut self, a: Pos, b: Pos) -> SwapOutcome {
        if !self.is_playable() {
            return SwapOutcome::Rejected(RejectReason::CascadeActive);
        }
        // Notifications nobody drained belong to a finished session.
        self.events.clear();
        let outcome = attempt_swap(
            &mut self.board,
            a,
            b,
            self.config.fill_time_ms,
            &mut self.events,
        );
        match &outcome {
            SwapOutcome::Accepted(_) => {
                self.moves += 1;
                self.last_swap = Some(SwapFeedback::Accepted);
                self.fill_timer_ms = 0;
                self.cascade.begin_after_swap();
            }
            SwapOutcome::Rejected(RejectReason::NoMatch) => {
                self.last_swap = Some(SwapFeedback::Rejected);
            }
            SwapOutcome::Rejected(_) => {}
        }
        outcome
    }

    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::CursorUp => self.move_cursor(0, -1),
            GameAction::CursorDown => self.move_cursor(0, 1),
            GameAction::CursorLeft => self.move_cursor(-1, 0),
            GameAction::CursorRight => self.move_cursor(1, 0),
            GameAction::Select => !matches!(
                self.select(self.cursor),
                SelectOutcome::Busy | SelectOutcome::OutOfRange
            ),
            GameAction::Cancel => self.first_selected.take().is_some(),
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Put the cursor on `pos` (pointer hosts). Off-board positions are ignored.
    pub fn set_cursor(&mut self, pos: Pos) -> bool {
        if !self.board.contains(pos) {
            return false;
        }
        self.cursor = pos;
        true
    }

    fn move_cursor(&mut self, dx: i16, dy: i16) -> bool {
        let next = self.cursor.offset(dx, dy);
        if !self.board.contains(next) {
            return false;
        }
        self.cursor = next;
        true
    }

    /// Rebuild an empty board and fill it again. The color source continues
    /// where it was, so consecutive episodes differ.
    pub fn restart(&mut self) {
        self.board = Board::new(self.config.width, self.config.height);
        self.cascade = CascadeEngine::new();
        self.score.reset();
        self.events.clear();
        self.moves = 0;
        self.first_selected = None;
        self.last_swap = None;
        self.flash.clear();
        self.flash_ms = 0;
        self.episode_id = self.episode_id.wrapping_add(1);
        self.started = false;
        self.start();
    }

    /// Advance by `elapsed_ms`. The cascade steps once per elapsed fill
    /// interval. Returns whether anything visible changed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.started {
            return false;
        }

        let mut changed = false;
        if self.flash_ms > 0 {
            self.flash_ms = self.flash_ms.saturating_sub(elapsed_ms);
            if self.flash_ms == 0 {
                self.flash.clear();
                changed = true;
            }
        }

        if !self.cascade.is_active() {
            self.fill_timer_ms = 0;
            return changed;
        }

        let interval = self.config.fill_time_ms;
        if interval == 0 {
            return self.settle() > 0 || changed;
        }

        self.fill_timer_ms = self.fill_timer_ms.saturating_add(elapsed_ms);
        while self.cascade.is_active() && self.fill_timer_ms >= interval {
            self.fill_timer_ms -= interval;
            self.step_cascade();
            changed = true;
        }
        if !self.cascade.is_active() {
            self.fill_timer_ms = 0;
        }
        changed
    }

    /// Run the cascade to completion without waiting. Returns the steps taken.
    pub fn settle(&mut self) -> u32 {
        let mut steps = 0;
        while self.cascade.is_active() && steps < SETTLE_STEP_BUDGET {
            self.step_cascade();
            steps += 1;
        }
        if self.cascade.is_active() {
            tracing::warn!(steps, "session did not settle within budget");
        }
        self.fill_timer_ms = 0;
        steps
    }

    fn step_cascade(&mut self) -> StepReport {
        let mark = self.events.events().len();
        let Self {
            config,
            board,
            cascade,
            score,
            rng,
            events,
            score_sink,
            ..
        } = self;
        let mut ctx = CascadeContext {
            board,
            rng: &mut **rng,
            palette: &config.palette,
            score,
            presenter: events,
            score_sink: score_sink.as_deref_mut().map(|s| s as &mut dyn ScoreSink),
            move_ms: config.fill_time_ms,
        };
        let report = cascade.step(&mut ctx);

        if report.cleared > 0 {
            self.flash.clear();
            self.flash
                .extend(self.events.events()[mark..].iter().filter_map(|e| match e {
                    BoardEvent::Cleared { piece } => Some(piece.pos()),
                    _ => None,
                }));
            self.flash_ms = CLEAR_FLASH_MS;
        }
        report
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.width = self.board.width();
        out.height = self.board.height();
        self.board.write_color_grid(&mut out.cells);
        out.board_hash = fnv1a64_cells(&out.cells);
        out.score = self.score.score();
        out.moves = self.moves;
        out.phase = self.cascade.phase();
        out.cursor = self.cursor;
        out.selected = self.first_selected;
        out.flash.clear();
        out.flash.extend_from_slice(&self.flash);
        out.last_swap = self.last_swap;
        out.episode_id = self.episode_id;
        out.seed = self.config.seed;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRng;
    use crate::types::ColorType;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn small_config() -> GameConfig {
        GameConfig {
            width: 5,
            height: 5,
            fill_time_ms: 50,
            seed: 7,
            ..GameConfig::default()
        }
    }

    fn ready(rows: &[&str]) -> GameState {
        GameState::from_board(small_config(), Board::from_rows(rows).unwrap()).unwrap()
    }

    #[test]
    fn new_session_is_not_started() {
        let state = GameState::new(small_config()).unwrap();
        assert!(!state.started());
        assert_eq!(state.phase(), CascadePhase::Idle);
        assert_eq!(state.board().empty_count(), 25);
    }

    #[test]
    fn invalid_config_is_refused() {
        let cfg = GameConfig {
            palette: vec![],
            ..GameConfig::default()
        };
        assert_eq!(GameState::new(cfg).unwrap_err(), ConfigError::EmptyPalette);
    }

    #[test]
    fn start_then_settle_fills_the_board() {
        let mut state = GameState::new(small_config()).unwrap();
        state.start();
        assert_eq!(state.phase(), CascadePhase::Dropping);

        let steps = state.settle();
        assert!(steps >= 5);
        assert_eq!(state.phase(), CascadePhase::Idle);
        assert_eq!(state.board().empty_count(), 0);
        assert!(!board_has_match(state.board()));
    }

    #[test]
    fn tick_steps_once_per_fill_interval() {
        let mut state = GameState::new(small_config()).unwrap();
        state.start();

        assert!(!state.tick(49));
        assert_eq!(state.cascade().sweeps(), 0);
        assert!(state.tick(1));
        assert_eq!(state.cascade().sweeps(), 1);
        assert!(state.tick(100));
        assert_eq!(state.cascade().sweeps(), 3);
    }

    #[test]
    fn select_then_adjacent_select_swaps() {
        let mut state = ready(&["GBGB", "RRBR", "BGYG"]);
        assert_eq!(state.select(Pos::new(2, 1)), SelectOutcome::Selected(Pos::new(2, 1)));
        assert_eq!(state.selected(), Some(Pos::new(2, 1)));

        match state.select(Pos::new(3, 1)) {
            SelectOutcome::Swapped(outcome) => assert!(outcome.is_accepted()),
            other => panic!("expected a swap, got {:?}", other),
        }
        assert_eq!(state.selected(), None);
        assert_eq!(state.phase(), CascadePhase::Matching);
        assert_eq!(state.moves(), 1);
        assert_eq!(state.snapshot().last_swap, Some(SwapFeedback::Accepted));
    }

    #[test]
    fn second_press_always_clears_selection() {
        let mut state = ready(&["RGB", "GBR", "BRG"]);
        state.select(Pos::new(0, 0));
        assert_eq!(state.select(Pos::new(0, 0)), SelectOutcome::Deselected);
        assert_eq!(state.selected(), None);

        state.select(Pos::new(0, 0));
        let far = state.select(Pos::new(2, 2));
        assert_eq!(far, SelectOutcome::Swapped(SwapOutcome::Rejected(RejectReason::NotAdjacent)));
        assert_eq!(state.selected(), None);
        assert_eq!(state.snapshot().last_swap, None);
    }

    #[test]
    fn input_is_refused_during_cascade() {
        let mut state = GameState::new(small_config()).unwrap();
        assert_eq!(state.select(Pos::new(0, 0)), SelectOutcome::Busy);
        state.start();
        assert_eq!(state.select(Pos::new(0, 0)), SelectOutcome::Busy);
        assert_eq!(
            state.attempt_swap(Pos::new(0, 0), Pos::new(1, 0)),
            SwapOutcome::Rejected(RejectReason::CascadeActive)
        );
    }

    #[test]
    fn out_of_range_select_keeps_selection() {
        let mut state = ready(&["RGB", "GBR", "BRG"]);
        state.select(Pos::new(1, 1));
        assert_eq!(state.select(Pos::new(3, 0)), SelectOutcome::OutOfRange);
        assert_eq!(state.selected(), Some(Pos::new(1, 1)));
    }

    #[test]
    fn cursor_stays_on_board() {
        let mut state = ready(&["RG", "GR"]);
        assert!(!state.apply_action(GameAction::CursorUp));
        assert!(!state.apply_action(GameAction::CursorLeft));
        assert!(state.apply_action(GameAction::CursorRight));
        assert!(state.apply_action(GameAction::CursorDown));
        assert!(!state.apply_action(GameAction::CursorDown));
        assert_eq!(state.cursor(), Pos::new(1, 1));

        assert!(state.apply_action(GameAction::Select));
        assert!(state.apply_action(GameAction::Cancel));
        assert!(!state.apply_action(GameAction::Cancel));
    }

    #[test]
    fn swap_clears_scores_and_flashes() {
        let mut state = ready(&["GBGB", "RRBR", "BGYG"])
            .with_random_source(Box::new(SequenceRng::new(vec![0, 1, 2, 3, 4, 5])));
        assert!(state.attempt_swap(Pos::new(2, 1), Pos::new(3, 1)).is_accepted());

        assert!(state.tick(50));
        assert!(state.score() >= 3);
        let snap = state.snapshot();
        assert!(snap.flash.contains(&Pos::new(0, 1)));

        state.settle();
        assert!(state.is_playable());
        assert_eq!(state.board().empty_count(), 0);
        let cleared = state
            .events()
            .iter()
            .filter(|e| matches!(e, BoardEvent::Cleared { .. }))
            .count();
        assert_eq!(state.score(), cleared as u32);
    }

    #[test]
    fn undrained_events_cover_only_the_latest_swap() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.start();
        state.settle();

        let mut rounds = 0;
        while rounds < 20 {
            let Some((a, b)) = state.hint() else { break };
            let before = state.score();
            assert!(state.attempt_swap(a, b).is_accepted());
            state.settle();

            let cleared = state
                .events()
                .iter()
                .filter(|e| matches!(e, BoardEvent::Cleared { .. }))
                .count();
            assert_eq!(cleared as u32, state.score() - before);
            rounds += 1;
        }
        assert!(rounds > 0);
    }

    #[test]
    fn flash_expires() {
        let mut state = ready(&["RRR", "GBG", "BGB"]);
        state.tick(50);
        assert!(!state.snapshot().flash.is_empty());
        state.settle();
        state.tick(CLEAR_FLASH_MS);
        assert!(state.snapshot().flash.is_empty());
    }

    #[test]
    fn score_sink_sees_every_point() {
        struct Recorder(Rc<RefCell<Vec<(u32, u32)>>>);
        impl ScoreSink for Recorder {
            fn score_changed(&mut self, delta: u32, total: u32) {
                self.0.borrow_mut().push((delta, total));
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut state = ready(&["RRR", "GBG", "BGB"]);
        state.set_score_sink(Box::new(Recorder(seen.clone())));
        state.settle();

        let seen = seen.borrow();
        assert_eq!(seen.len() as u32, state.score());
        assert_eq!(seen.first(), Some(&(1, 1)));
        assert!(seen.windows(2).all(|w| w[1].1 == w[0].1 + 1));
    }

    #[test]
    fn restart_resets_and_bumps_episode() {
        let mut state = ready(&["RRR", "GBG", "BGB"]);
        state.settle();
        assert!(state.score() > 0);

        assert!(state.apply_action(GameAction::Restart));
        assert_eq!(state.episode_id(), 1);
        assert_eq!(state.score(), 0);
        assert_eq!(state.phase(), CascadePhase::Dropping);
        assert_eq!(state.board().empty_count(), 9);
    }

    #[test]
    fn snapshot_mirrors_state() {
        let mut state = ready(&["RG", "GR"]);
        state.select(Pos::new(1, 0));
        let snap = state.snapshot();
        assert_eq!(snap.width, 2);
        assert_eq!(snap.rows(), vec!["RG", "GR"]);
        assert_eq!(snap.selected, Some(Pos::new(1, 0)));
        assert_eq!(snap.color_at(0, 0), Some(ColorType::Red));
        assert_eq!(snap.board_hash, fnv1a64_cells(&snap.cells));
        assert!(snap.playable());
    }

    #[test]
    fn hint_finds_an_accepted_swap() {
        let mut state = ready(&["RGB", "GRR", "BGB"]);
        let (a, b) = state.hint().unwrap();
        assert!(state.attempt_swap(a, b).is_accepted());
    }
}

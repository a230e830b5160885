//! Cascade engine - gravity, refill and match clearing until the board settles
//!
//! A cascade session is an explicit state machine advanced one step at a time
//! by the host:
//!
//! ```text
//! Idle -> Dropping -> Matching -> Idle
//!            ^           |
//!            |           v
//!            +------ Refilling
//! ```
//!
//! A swap session enters at `Matching`. `Idle` is only reached from
//! `Matching`: a drop sweep that moves nothing runs matching in the same step.
//!
//! - **Dropping**: one drop sweep per step. Every movable piece with an EMPTY
//!   cell directly below falls one row, then every EMPTY cell in row 0 receives
//!   a freshly spawned piece. A sweep that moves nothing ends the drop phase.
//! - **Matching**: every clearable piece is checked (row-major) and each piece
//!   of each match is cleared once. Runs atomically within the step.
//! - **Refilling**: pieces were cleared; the next step starts dropping again.
//!   With nothing cleared the session ends in `Idle`.
//!
//! Steps are the suspension points: the host renders between them and decides
//! how long to wait (the configured fill time). Only one session may run
//! against a board at a time; there is no way to abort one half-way.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::events::{Presenter, ScoreSink};
use crate::matcher::find_match;
use crate::piece::PieceKind;
use crate::rng::RandomSource;
use crate::score::ScoreTracker;
use crate::types::{ColorType, Pos, SPAWN_ROW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadePhase {
    Idle,
    Dropping,
    Matching,
    Refilling,
}

impl CascadePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CascadePhase::Idle => "idle",
            CascadePhase::Dropping => "dropping",
            CascadePhase::Matching => "matching",
            CascadePhase::Refilling => "refilling",
        }
    }
}

/// Everything a cascade step touches besides its own state.
pub struct CascadeContext<'a> {
    pub board: &'a mut Board,
    pub rng: &'a mut dyn RandomSource,
    /// Validated, non-empty spawn palette.
    pub palette: &'a [ColorType],
    pub score: &'a mut ScoreTracker,
    pub presenter: &'a mut dyn Presenter,
    pub score_sink: Option<&'a mut dyn ScoreSink>,
    /// Animation hint attached to every move notification.
    pub move_ms: u32,
}

/// Result of one drop sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub moved: usize,
    pub spawned: usize,
}

impl SweepReport {
    pub fn any(&self) -> bool {
        self.moved > 0 || self.spawned > 0
    }
}

/// Result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub from: CascadePhase,
    pub to: CascadePhase,
    pub sweep: SweepReport,
    pub cleared: usize,
}

impl StepReport {
    pub fn changed_board(&self) -> bool {
        self.sweep.any() || self.cleared > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeEngine {
    phase: CascadePhase,
    /// Drop sweeps run in the current session.
    sweeps: u32,
    /// Matching passes that cleared something in the current session.
    clear_passes: u32,
    /// Pieces cleared in the current session.
    cleared: u32,
}

impl Default for CascadeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadeEngine {
    pub fn new() -> Self {
        Self {
            phase: CascadePhase::Idle,
            sweeps: 0,
            clear_passes: 0,
            cleared: 0,
        }
    }

    pub fn phase(&self) -> CascadePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != CascadePhase::Idle
    }

    pub fn sweeps(&self) -> u32 {
        self.sweeps
    }

    pub fn clear_passes(&self) -> u32 {
        self.clear_passes
    }

    pub fn cleared(&self) -> u32 {
        self.cleared
    }

    /// Start a fill session (initial board or after external edits).
    pub fn begin_fill(&mut self) {
        self.begin(CascadePhase::Dropping);
    }

    /// Start a session right after an accepted swap: clear first, then drop.
    pub fn begin_after_swap(&mut self) {
        self.begin(CascadePhase::Matching);
    }

    fn begin(&mut self, phase: CascadePhase) {
        if self.is_active() {
            tracing::warn!(current = self.phase.as_str(), "cascade restarted while active");
        }
        self.phase = phase;
        self.sweeps = 0;
        self.clear_passes = 0;
        self.cleared = 0;
        tracing::debug!(phase = phase.as_str(), "cascade session started");
    }

    /// Advance the session by one step.
    pub fn step(&mut self, ctx: &mut CascadeContext<'_>) -> StepReport {
        let from = self.phase;
        let mut sweep = SweepReport::default();
        let mut cleared = 0;

        match self.phase {
            CascadePhase::Idle => {}
            CascadePhase::Dropping | CascadePhase::Refilling => {
                sweep = drop_sweep(ctx);
                self.sweeps += 1;
                tracing::trace!(
                    sweep = self.sweeps,
                    moved = sweep.moved,
                    spawned = sweep.spawned,
                    "drop sweep"
                );
                if sweep.any() {
                    self.phase = CascadePhase::Dropping;
                } else {
                    // Settled: matching happens in the same step.
                    cleared = self.run_matching(ctx);
                }
            }
            CascadePhase::Matching => {
                cleared = self.run_matching(ctx);
            }
        }

        if from != self.phase {
            tracing::debug!(from = from.as_str(), to = self.phase.as_str(), cleared, "cascade phase");
        }

        StepReport {
            from,
            to: self.phase,
            sweep,
            cleared,
        }
    }

    fn run_matching(&mut self, ctx: &mut CascadeContext<'_>) -> usize {
        self.phase = CascadePhase::Matching;
        let cleared = clear_all_matches(ctx);
        self.cleared += cleared as u32;
        if cleared > 0 {
            self.clear_passes += 1;
            self.phase = CascadePhase::Refilling;
        } else {
            self.phase = CascadePhase::Idle;
            tracing::info!(
                sweeps = self.sweeps,
                passes = self.clear_passes,
                cleared = self.cleared,
                "board settled"
            );
        }
        cleared
    }

    /// Step until the session is idle or `max_steps` is reached.
    ///
    /// Returns the number of steps taken. A finite budget keeps a pathological
    /// random source from spinning forever; callers check [`Self::is_active`].
    pub fn run_to_idle(&mut self, ctx: &mut CascadeContext<'_>, max_steps: u32) -> u32 {
        let mut steps = 0;
        while self.is_active() && steps < max_steps {
            self.step(ctx);
            steps += 1;
        }
        if self.is_active() {
            tracing::warn!(steps, phase = self.phase.as_str(), "cascade did not settle within budget");
        }
        steps
    }
}

/// One gravity sweep followed by the top-row refill.
///
/// Rows are visited bottom-up so that a piece moves at most one row per sweep.
pub fn drop_sweep(ctx: &mut CascadeContext<'_>) -> SweepReport {
    let width = ctx.board.width() as i16;
    let height = ctx.board.height() as i16;
    let mut report = SweepReport::default();

    for y in (0..height - 1).rev() {
        for x in 0..width {
            let from = Pos::new(x, y);
            let to = Pos::new(x, y + 1);
            let piece = ctx.board[from];
            if !piece.is_movable() || !ctx.board[to].kind().is_empty() {
                continue;
            }
            if ctx.board.set(to, piece).is_err() || ctx.board.spawn(from, PieceKind::Empty).is_err() {
                continue;
            }
            ctx.presenter.piece_moved(&ctx.board[to], from, to, ctx.move_ms);
            report.moved += 1;
        }
    }

    for x in 0..width {
        let pos = Pos::new(x, 0);
        if !ctx.board[pos].kind().is_empty() {
            continue;
        }
        let len = ctx.palette.len();
        if len == 0 {
            break;
        }
        // Host sources may ignore the bound; reduce rather than index past it.
        let color = ctx.palette[ctx.rng.next_index(len) % len];
        if ctx.board.spawn(pos, PieceKind::Normal(color)).is_err() {
            continue;
        }
        let piece = ctx.board[pos];
        ctx.presenter.piece_spawned(&piece, pos);
        ctx.presenter
            .piece_moved(&piece, Pos::new(x, SPAWN_ROW), pos, ctx.move_ms);
        report.spawned += 1;
    }

    report
}

/// Clear every piece that belongs to a match, scanning row-major.
///
/// Returns the number of pieces cleared. Each piece is cleared at most once:
/// it is flagged, scored, reported and replaced by an EMPTY piece.
pub fn clear_all_matches(ctx: &mut CascadeContext<'_>) -> usize {
    let width = ctx.board.width() as i16;
    let height = ctx.board.height() as i16;
    let mut cleared = 0;

    for y in 0..height {
        for x in 0..width {
            let pos = Pos::new(x, y);
            let piece = ctx.board[pos];
            if !piece.is_clearable() || piece.is_being_cleared() {
                continue;
            }
            if let Some(found) = find_match(ctx.board, &piece, pos, false) {
                for &p in found.positions() {
                    if clear_piece(ctx, p) {
                        cleared += 1;
                    }
                }
            }
        }
    }

    cleared
}

/// Clear a single piece. Already-cleared and non-clearable cells are skipped.
pub fn clear_piece(ctx: &mut CascadeContext<'_>, pos: Pos) -> bool {
    let piece = match ctx.board.get(pos) {
        Some(p) if p.is_clearable() && !p.is_being_cleared() => *p,
        _ => return false,
    };
    if ctx.board.mark_being_cleared(pos).is_err() {
        return false;
    }
    ctx.presenter.piece_cleared(&ctx.board[pos]);
    let total = ctx.score.on_piece_cleared();
    if let Some(sink) = ctx.score_sink.as_deref_mut() {
        sink.score_changed(1, total);
    }
    if ctx.board.spawn(pos, PieceKind::Empty).is_err() {
        return false;
    }
    tracing::trace!(id = piece.id().0, x = pos.x, y = pos.y, "piece cleared");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BoardEvent, EventLog};
    use crate::matcher::board_has_match;
    use crate::rng::{SequenceRng, SimpleRng};

    struct Fixture {
        board: Board,
        rng: SequenceRng,
        score: ScoreTracker,
        log: EventLog,
    }

    impl Fixture {
        fn new(rows: &[&str], spawn: Vec<usize>) -> Self {
            Self {
                board: Board::from_rows(rows).unwrap(),
                rng: SequenceRng::new(spawn),
                score: ScoreTracker::new(),
                log: EventLog::new(),
            }
        }

        fn ctx<'a>(&'a mut self, palette: &'a [ColorType]) -> CascadeContext<'a> {
            CascadeContext {
                board: &mut self.board,
                rng: &mut self.rng,
                palette,
                score: &mut self.score,
                presenter: &mut self.log,
                score_sink: None,
                move_ms: 100,
            }
        }
    }

    #[test]
    fn sweep_moves_pieces_down_one_row() {
        let mut fx = Fixture::new(&["R.", "..", "G."], vec![0]);
        let palette = [ColorType::Blue];
        let report = drop_sweep(&mut fx.ctx(&palette));

        // Red fell one row; both top cells got spawned blues.
        assert_eq!(report.moved, 1);
        assert_eq!(report.spawned, 2);
        assert_eq!(fx.board.to_rows(), vec!["BB", "R.", "G."]);
    }

    #[test]
    fn sweep_on_full_board_does_nothing() {
        let mut fx = Fixture::new(&["RG", "GR"], vec![0]);
        let palette = [ColorType::Blue];
        let before = fx.board.clone();
        let report = drop_sweep(&mut fx.ctx(&palette));
        assert!(!report.any());
        assert_eq!(fx.board, before);
        assert!(fx.log.events().is_empty());
    }

    #[test]
    fn spawned_piece_enters_from_above() {
        let mut fx = Fixture::new(&["."], vec![1]);
        let palette = [ColorType::Red, ColorType::Green];
        drop_sweep(&mut fx.ctx(&palette));

        assert_eq!(fx.board.color_at(Pos::new(0, 0)), Some(ColorType::Green));
        match fx.log.events() {
            [BoardEvent::Spawned { pos, .. }, BoardEvent::Moved { from, to, .. }] => {
                assert_eq!(*pos, Pos::new(0, 0));
                assert_eq!(*from, Pos::new(0, -1));
                assert_eq!(*to, Pos::new(0, 0));
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    struct OutOfBounds;

    impl RandomSource for OutOfBounds {
        fn next_index(&mut self, len: usize) -> usize {
            len + 1
        }
    }

    #[test]
    fn spawn_wraps_out_of_range_indices() {
        let mut board = Board::from_rows(&["..", "RG"]).unwrap();
        let mut score = ScoreTracker::new();
        let mut log = EventLog::new();
        let mut rng = OutOfBounds;
        let palette = [ColorType::Red, ColorType::Blue];
        let mut ctx = CascadeContext {
            board: &mut board,
            rng: &mut rng,
            palette: &palette,
            score: &mut score,
            presenter: &mut log,
            score_sink: None,
            move_ms: 100,
        };
        let report = drop_sweep(&mut ctx);

        assert_eq!(report.spawned, 2);
        assert_eq!(board.to_rows(), vec!["BB", "RG"]);
    }

    #[test]
    fn sweep_with_empty_palette_spawns_nothing() {
        let mut fx = Fixture::new(&[".R"], vec![0]);
        let report = drop_sweep(&mut fx.ctx(&[]));
        assert_eq!(report.spawned, 0);
        assert_eq!(fx.board.to_rows(), vec![".R"]);
    }

    #[test]
    fn clear_all_matches_scores_each_piece_once() {
        // An L shape: the corner belongs to both the row and the column.
        let mut fx = Fixture::new(&["RGB", "RBG", "RRR"], vec![0]);
        let palette = [ColorType::Yellow];
        let cleared = clear_all_matches(&mut fx.ctx(&palette));

        assert_eq!(cleared, 5);
        assert_eq!(fx.score.score(), 5);
        assert_eq!(fx.log.cleared_count(), 5);
        assert_eq!(fx.board.to_rows(), vec![".GB", ".BG", "..."]);
        for e in fx.log.events() {
            if let BoardEvent::Cleared { piece } = e {
                assert!(piece.is_being_cleared());
            }
        }
    }

    #[test]
    fn clear_piece_skips_empty_cells() {
        let mut fx = Fixture::new(&[".R"], vec![0]);
        let palette = [ColorType::Yellow];
        let mut ctx = fx.ctx(&palette);
        assert!(!clear_piece(&mut ctx, Pos::new(0, 0)));
        assert!(clear_piece(&mut ctx, Pos::new(1, 0)));
        assert!(!clear_piece(&mut ctx, Pos::new(1, 0)));
        assert_eq!(fx.score.score(), 1);
    }

    #[test]
    fn session_from_empty_board_settles_without_matches() {
        let mut board = Board::new(6, 6);
        let mut rng = SimpleRng::new(42);
        let mut score = ScoreTracker::new();
        let mut log = EventLog::new();
        let palette = ColorType::PALETTE;
        let mut engine = CascadeEngine::new();
        engine.begin_fill();

        let mut ctx = CascadeContext {
            board: &mut board,
            rng: &mut rng,
            palette: &palette,
            score: &mut score,
            presenter: &mut log,
            score_sink: None,
            move_ms: 0,
        };
        engine.run_to_idle(&mut ctx, 10_000);

        assert_eq!(engine.phase(), CascadePhase::Idle);
        assert_eq!(board.empty_count(), 0);
        assert!(!board_has_match(&board));
        assert_eq!(score.score(), engine.cleared());
    }

    #[test]
    fn phases_follow_the_state_machine() {
        // A vertical red triple is cleared and refilled yellow, purple, yellow,
        // which cannot line up with anything.
        let mut fx = Fixture::new(&["RG", "RB", "RG"], vec![1, 2, 1]);
        let palette = [ColorType::Red, ColorType::Yellow, ColorType::Purple];
        let mut engine = CascadeEngine::new();
        engine.begin_after_swap();
        assert_eq!(engine.phase(), CascadePhase::Matching);

        let mut ctx = fx.ctx(&palette);
        let first = engine.step(&mut ctx);
        assert_eq!(first.from, CascadePhase::Matching);
        assert_eq!(first.to, CascadePhase::Refilling);
        assert_eq!(first.cleared, 3);

        let second = engine.step(&mut ctx);
        assert_eq!(second.to, CascadePhase::Dropping);
        assert!(second.sweep.any());

        let steps = engine.run_to_idle(&mut ctx, 100);
        assert!(steps >= 2);
        assert_eq!(engine.phase(), CascadePhase::Idle);
        assert_eq!(fx.board.empty_count(), 0);
        assert_eq!(fx.score.score(), 3);
    }

    #[test]
    fn idle_step_is_a_no_op() {
        let mut fx = Fixture::new(&["RG", "GR"], vec![0]);
        let palette = [ColorType::Blue];
        let mut engine = CascadeEngine::new();
        let report = engine.step(&mut fx.ctx(&palette));
        assert!(!report.changed_board());
        assert_eq!(report.to, CascadePhase::Idle);
    }
}

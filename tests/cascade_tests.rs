use tui_match3::core::{
    attempt_swap, board_has_match, find_swap_candidate, Board, BoardEvent, CascadeContext,
    CascadeEngine, CascadePhase, EventLog, NullPresenter, ScoreSink, ScoreTracker, SequenceRng,
    SimpleRng,
};
use tui_match3::types::ColorType;

const BUDGET: u32 = 10_000;

#[derive(Default)]
struct Totals(Vec<(u32, u32)>);

impl ScoreSink for Totals {
    fn score_changed(&mut self, delta: u32, total: u32) {
        self.0.push((delta, total));
    }
}

fn fill(width: u16, height: u16, seed: u32, palette: &[ColorType]) -> (Board, ScoreTracker, CascadeEngine) {
    let mut board = Board::new(width, height);
    let mut rng = SimpleRng::new(seed);
    let mut score = ScoreTracker::new();
    let mut presenter = NullPresenter;
    let mut engine = CascadeEngine::new();
    engine.begin_fill();
    let mut ctx = CascadeContext {
        board: &mut board,
        rng: &mut rng,
        palette,
        score: &mut score,
        presenter: &mut presenter,
        score_sink: None,
        move_ms: 0,
    };
    engine.run_to_idle(&mut ctx, BUDGET);
    (board, score, engine)
}

#[test]
fn initial_fill_settles_for_many_seeds() {
    for seed in 1..60 {
        let (board, _, engine) = fill(8, 8, seed, &ColorType::PALETTE);
        assert_eq!(engine.phase(), CascadePhase::Idle, "seed {}", seed);
        assert_eq!(board.empty_count(), 0, "seed {}", seed);
        assert!(!board_has_match(&board), "seed {}", seed);
    }
}

#[test]
fn small_palette_still_settles() {
    // Three colors make chain reactions frequent.
    let palette = [ColorType::Red, ColorType::Blue, ColorType::Green];
    for seed in 1..30 {
        let (board, score, engine) = fill(6, 6, seed, &palette);
        assert_eq!(engine.phase(), CascadePhase::Idle);
        assert!(!board_has_match(&board));
        assert_eq!(score.score(), engine.cleared());
    }
}

#[test]
fn first_sweep_of_an_empty_board_only_spawns_the_top_row() {
    let mut board = Board::new(4, 3);
    let mut rng = SequenceRng::new(vec![0, 1]);
    let mut score = ScoreTracker::new();
    let mut log = EventLog::new();
    let palette = [ColorType::Red, ColorType::Blue];
    let mut engine = CascadeEngine::new();
    engine.begin_fill();

    let mut ctx = CascadeContext {
        board: &mut board,
        rng: &mut rng,
        palette: &palette,
        score: &mut score,
        presenter: &mut log,
        score_sink: None,
        move_ms: 40,
    };
    let report = engine.step(&mut ctx);

    assert_eq!(report.sweep.moved, 0);
    assert_eq!(report.sweep.spawned, 4);
    assert_eq!(report.to, CascadePhase::Dropping);
    assert_eq!(board.to_rows(), vec!["RBRB", "....", "...."]);
    assert_eq!(log.spawned_count(), 4);
}

#[test]
fn swap_then_cascade_scores_monotonically() {
    let palette = [ColorType::Red, ColorType::Blue, ColorType::Green, ColorType::Yellow];
    let (mut board, mut score, mut engine) = fill(7, 7, 11, &palette);
    let mut rng = SimpleRng::new(99);
    let mut sink = Totals::default();
    let mut log = EventLog::new();

    for _ in 0..15 {
        let Some((a, b)) = find_swap_candidate(&board) else {
            break;
        };
        let before = score.score();
        assert!(attempt_swap(&mut board, a, b, 0, &mut log).is_accepted());
        engine.begin_after_swap();
        let mut ctx = CascadeContext {
            board: &mut board,
            rng: &mut rng,
            palette: &palette,
            score: &mut score,
            presenter: &mut log,
            score_sink: Some(&mut sink),
            move_ms: 0,
        };
        engine.run_to_idle(&mut ctx, BUDGET);

        assert_eq!(engine.phase(), CascadePhase::Idle);
        assert!(score.score() >= before + 3, "an accepted swap clears at least a run");
        assert!(!board_has_match(&board));
        assert_eq!(board.empty_count(), 0);
    }

    let cleared_ids: Vec<u32> = log
        .events()
        .iter()
        .filter_map(|e| match e {
            BoardEvent::Cleared { piece } => Some(piece.id().0),
            _ => None,
        })
        .collect();
    let mut unique = cleared_ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), cleared_ids.len(), "no piece is cleared twice");

    assert!(sink.0.iter().all(|&(delta, _)| delta == 1));
    assert!(sink.0.windows(2).all(|w| w[1].1 == w[0].1 + 1));
    assert_eq!(sink.0.last().map(|&(_, total)| total), Some(score.score()));
}

#[test]
fn same_seed_same_board() {
    let (a, _, _) = fill(8, 8, 4242, &ColorType::PALETTE);
    let (b, _, _) = fill(8, 8, 4242, &ColorType::PALETTE);
    let (c, _, _) = fill(8, 8, 4243, &ColorType::PALETTE);
    assert_eq!(a.to_rows(), b.to_rows());
    assert_ne!(a.to_rows(), c.to_rows());
}

#[test]
fn cleared_pieces_are_flagged_when_reported() {
    let mut board = Board::from_rows(&["YYY", "RGB", "GBR"]).unwrap();
    let mut rng = SequenceRng::new(vec![0, 1, 2]);
    let mut score = ScoreTracker::new();
    let mut log = EventLog::new();
    let palette = [ColorType::Purple, ColorType::Orange, ColorType::Blue];
    let mut engine = CascadeEngine::new();
    engine.begin_after_swap();

    let mut ctx = CascadeContext {
        board: &mut board,
        rng: &mut rng,
        palette: &palette,
        score: &mut score,
        presenter: &mut log,
        score_sink: None,
        move_ms: 0,
    };
    let report = engine.step(&mut ctx);
    assert_eq!(report.cleared, 3);
    assert_eq!(board.to_rows()[0], "...");
    for event in log.events() {
        if let BoardEvent::Cleared { piece } = event {
            assert!(piece.is_being_cleared());
            assert_eq!(piece.pos().y, 0);
        }
    }
    assert!(board.cells().iter().all(|p| !p.is_being_cleared()));
}

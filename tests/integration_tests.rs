use tui_match3::core::{
    board_has_match, Board, CascadePhase, GameConfig, GameState, SelectOutcome, SwapFeedback,
};
use tui_match3::types::{ColorType, GameAction, Pos, TICK_MS};

fn config(seed: u32) -> GameConfig {
    GameConfig {
        width: 6,
        height: 6,
        fill_time_ms: 48,
        seed,
        ..GameConfig::default()
    }
}

fn settled(seed: u32) -> GameState {
    let mut game = GameState::new(config(seed)).unwrap();
    game.start();
    game.settle();
    game
}

#[test]
fn ticking_and_settling_reach_the_same_board() {
    let fast = settled(31);

    let mut slow = GameState::new(config(31)).unwrap();
    slow.start();
    let mut frames = 0;
    while !slow.is_playable() {
        slow.tick(TICK_MS);
        frames += 1;
        assert!(frames < 100_000, "cascade never settled");
    }

    assert_eq!(fast.board().to_rows(), slow.board().to_rows());
    assert_eq!(fast.snapshot().board_hash, slow.snapshot().board_hash);
}

#[test]
fn intermediate_frames_are_observable() {
    let mut game = GameState::new(config(5)).unwrap();
    game.start();
    game.tick(48);
    let snap = game.snapshot();
    assert_eq!(snap.phase, CascadePhase::Dropping);
    assert_eq!(snap.rows()[0].chars().filter(|c| *c != '.').count(), 6);
    assert!(snap.rows()[1..].iter().all(|r| r == "......"));
}

#[test]
fn keyboard_session_swaps_and_resolves() {
    let board = Board::from_rows(&[
        "RBBRRB", //
        "BRRBBR", //
        "BRRBRR", //
        "RBBRBB", //
        "BRRBRR", //
        "RBRRBB", //
    ])
    .unwrap();
    let mut game = GameState::from_board(config(1), board).unwrap();
    assert!(game.is_playable());

    // Cursor to (2, 2), select, step right, select.
    for action in [
        GameAction::CursorRight,
        GameAction::CursorRight,
        GameAction::CursorDown,
        GameAction::CursorDown,
        GameAction::Select,
        GameAction::CursorRight,
        GameAction::Select,
    ] {
        assert!(game.apply_action(action), "{:?}", action);
    }

    assert_eq!(game.phase(), CascadePhase::Matching);
    assert_eq!(game.snapshot().last_swap, Some(SwapFeedback::Accepted));
    assert!(!game.apply_action(GameAction::Select), "input is refused mid-cascade");

    game.settle();
    assert!(game.is_playable());
    assert!(game.score() >= 3);
    assert!(!board_has_match(game.board()));
}

#[test]
fn rejected_selection_reports_feedback_and_keeps_board() {
    let board = Board::from_rows(&["RGB", "GBR", "BRG"]).unwrap();
    let mut game = GameState::from_board(config(1), board).unwrap();
    let before = game.board().clone();

    game.select(Pos::new(0, 0));
    let outcome = game.select(Pos::new(1, 0));

    assert!(matches!(outcome, SelectOutcome::Swapped(ref o) if !o.is_accepted()));
    assert_eq!(game.board(), &before);
    assert_eq!(game.snapshot().last_swap, Some(SwapFeedback::Rejected));
    assert!(game.is_playable());
}

#[test]
fn restart_gives_a_fresh_episode() {
    let mut game = settled(8);
    let first = game.board().to_rows();
    game.apply_action(GameAction::Restart);
    game.settle();

    assert_eq!(game.episode_id(), 1);
    assert_eq!(game.moves(), 0);
    assert_ne!(game.board().to_rows(), first);
    assert_eq!(game.board().empty_count(), 0);
}

#[test]
fn restricted_palette_is_respected() {
    let cfg = GameConfig {
        palette: vec![ColorType::Red, ColorType::Blue, ColorType::Green],
        ..config(77)
    };
    let mut game = GameState::new(cfg).unwrap();
    game.start();
    game.settle();
    for piece in game.board().cells() {
        assert!(matches!(
            piece.color(),
            Some(ColorType::Red | ColorType::Blue | ColorType::Green)
        ));
    }
}

#[test]
fn simulated_play_never_leaves_matches() {
    let mut game = settled(2026);
    for _ in 0..25 {
        let Some((a, b)) = game.hint() else {
            break;
        };
        let score = game.score();
        assert!(game.attempt_swap(a, b).is_accepted());
        game.settle();
        assert!(game.score() > score);
        assert!(!board_has_match(game.board()));
    }
    assert!(game.moves() > 0);
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_match3::core::{
    board_has_match, find_match, find_swap_candidate, GameConfig, GameSnapshot, GameState,
};
use tui_match3::types::Pos;

fn settled(seed: u32) -> GameState {
    let mut state = GameState::new(GameConfig {
        seed,
        ..GameConfig::default()
    })
    .expect("default config is valid");
    state.start();
    state.settle();
    state
}

fn bench_initial_fill(c: &mut Criterion) {
    c.bench_function("fill_8x8_to_idle", |b| {
        b.iter(|| black_box(settled(black_box(12345))))
    });
}

fn bench_find_match(c: &mut Criterion) {
    let state = settled(12345);
    let board = state.board();

    c.bench_function("find_match_all_cells", |b| {
        b.iter(|| {
            for piece in board.cells() {
                black_box(find_match(board, piece, piece.pos(), false));
            }
        })
    });

    c.bench_function("board_has_match", |b| b.iter(|| black_box(board_has_match(board))));
}

fn bench_swap_and_settle(c: &mut Criterion) {
    let base = settled(777);

    c.bench_function("swap_then_settle", |b| {
        b.iter_batched(
            || settled(777),
            |mut state| {
                if let Some((from, to)) = state.hint() {
                    state.attempt_swap(from, to);
                    state.settle();
                }
                black_box(state.score())
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("find_swap_candidate", |b| {
        b.iter(|| black_box(find_swap_candidate(base.board())))
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut state = settled(4242);

    c.bench_function("game_tick_16ms_idle", |b| {
        b.iter(|| {
            state.tick(black_box(16));
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut state = settled(9);
    state.select(Pos::new(3, 3));
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            state.snapshot_into(&mut snap);
            black_box(snap.board_hash)
        })
    });
}

criterion_group!(
    benches,
    bench_initial_fill,
    bench_find_match,
    bench_swap_and_settle,
    bench_tick,
    bench_snapshot
);
criterion_main!(benches);

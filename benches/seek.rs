//! Seek and playback benchmarks.
//!
//! Run with: cargo bench --bench seek

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use playback::playback::{Match, PlaybackConfig};
use playback::testkit::{synthetic_match, SyntheticOptions};

fn complete_match(rounds: u32) -> Match {
    let options = SyntheticOptions { rounds, config: PlaybackConfig::default(), ..Default::default() };
    let mut game_match = synthetic_match(&options).expect("synthetic match");
    game_match.mark_stream_complete();
    game_match
}

fn bench_backward_seek(c: &mut Criterion) {
    let mut group = c.benchmark_group("backward_seek");

    for rounds in [100u32, 400, 1000].iter() {
        let mut game_match = complete_match(*rounds);
        // Capture every snapshot up front.
        game_match.jump_to_end().expect("seek to end");

        group.bench_with_input(BenchmarkId::from_parameter(format!("{}_rounds", rounds)), rounds, |b, &rounds| {
            b.iter(|| {
                game_match.jump_to_round(black_box(rounds / 2 + 17)).expect("seek");
                game_match.jump_to_round(black_box(rounds)).expect("seek");
            });
        });
    }

    group.finish();
}

fn bench_turn_scrub(c: &mut Criterion) {
    let mut game_match = complete_match(100);
    game_match.jump_to_round(50).expect("seek");
    let turns = game_match.current_round().turns_len();

    c.bench_function("turn_scrub", |b| {
        b.iter(|| {
            game_match.jump_to_turn(black_box(turns)).expect("forward");
            game_match.jump_to_turn(black_box(0)).expect("rewind");
        });
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut game_match = complete_match(100);
    game_match.jump_to_round(80).expect("seek");

    c.bench_function("fingerprint", |b| {
        b.iter(|| black_box(game_match.fingerprint().expect("fingerprint")));
    });
}

criterion_group!(benches, bench_backward_seek, bench_turn_scrub, bench_fingerprint);
criterion_main!(benches);

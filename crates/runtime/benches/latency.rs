use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sizing::{reduce, SizingEdit, SizingState};

const EDITS: [SizingEdit; 5] = [
    SizingEdit::Leverage(4.5),
    SizingEdit::Lots(33),
    SizingEdit::Deposit(7_500_000.0),
    SizingEdit::StartRate(8.1),
    SizingEdit::PerLotMargin(45_000.0),
];

fn bench_sizing_edit_latency(c: &mut Criterion) {
    c.bench_function("sizing_reduce_edit_sequence", |b| {
        b.iter(|| {
            let mut state = SizingState::default();
            for edit in EDITS {
                state = reduce(state, black_box(edit));
            }
            black_box(state)
        });
    });
}

criterion_group!(benches, bench_sizing_edit_latency);
criterion_main!(benches);

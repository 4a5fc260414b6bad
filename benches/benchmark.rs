//! Benchmarks for the intro sequence controller and seen-state stores.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use introseq::{
    DocumentSeenStore, HostScreen, IntroConfig, IntroSequence, MemorySeenStore, OverlayBinding,
    OverlayNotifier, SeenStore,
};

/// Host that keeps notifiers so the benchmark can play the user.
#[derive(Default)]
struct BenchHost {
    notifiers: Vec<OverlayNotifier>,
}

impl HostScreen for BenchHost {
    type Overlay = ();
    type Layer = ();

    fn create_overlay(&mut self, _config: &IntroConfig, binding: OverlayBinding) {
        self.notifiers.push(binding.notifier);
    }

    fn show_overlay(&mut self, _overlay: &mut ()) {}

    fn dismiss_overlay(&mut self, _overlay: &mut ()) {}

    fn attach_intercepting_layer(&mut self) {}

    fn detach_intercepting_layer(&mut self, _layer: ()) {}
}

fn filled_sequence(num_intros: usize) -> IntroSequence<BenchHost> {
    let mut sequence = IntroSequence::new(BenchHost::default(), MemorySeenStore::shared());
    for i in 0..num_intros {
        sequence.add(IntroConfig::new().with_view_id(format!("intro-{}", i)));
    }
    sequence
}

fn bench_add(c: &mut Criterion) {
    c.bench_function("add", |b| {
        let mut sequence = IntroSequence::new(BenchHost::default(), MemorySeenStore::shared());
        let mut i = 0u64;
        b.iter(|| {
            sequence.add(IntroConfig::new().with_view_id(format!("intro-{}", i)));
            i += 1;
        })
    });
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for num_intros in [1, 10, 50].iter() {
        group.bench_with_input(
            BenchmarkId::new("intros", num_intros),
            num_intros,
            |b, &n| {
                b.iter(|| {
                    let mut sequence = filled_sequence(n);
                    sequence.start();
                    for index in 0..n {
                        sequence.pump();
                        sequence.host().notifiers[index].intro_done(true);
                        sequence.pump();
                    }
                    black_box(sequence.is_finished())
                })
            },
        );
    }
    group.finish();
}

fn bench_skip(c: &mut Criterion) {
    c.bench_function("skip_50_intros", |b| {
        b.iter(|| {
            let mut sequence = filled_sequence(50);
            sequence.start();
            sequence.pump();
            sequence.skip();
            black_box(sequence.cursor())
        })
    });
}

fn bench_document_set_displayed(c: &mut Criterion) {
    c.bench_function("document_set_displayed", |b| {
        let mut store = DocumentSeenStore::new();
        let mut i = 0u64;
        b.iter(|| {
            store.set_displayed(&format!("intro-{}", i));
            i += 1;
        })
    });
}

fn bench_document_is_displayed(c: &mut Criterion) {
    c.bench_function("document_is_displayed", |b| {
        let mut store = DocumentSeenStore::new();
        for i in 0..100 {
            store.set_displayed(&format!("intro-{}", i));
        }
        b.iter(|| black_box(store.is_displayed("intro-50")))
    });
}

fn bench_document_merge(c: &mut Criterion) {
    c.bench_function("document_merge", |b| {
        let mut base = DocumentSeenStore::new();
        for i in 0..10 {
            base.set_displayed(&format!("intro-{}", i));
        }
        let base_bytes = base.save();

        b.iter(|| {
            let mut phone = DocumentSeenStore::from_bytes(&base_bytes).unwrap();
            let mut tablet = DocumentSeenStore::from_bytes(&base_bytes).unwrap();
            phone.set_displayed("phone-only");
            tablet.set_displayed("tablet-only");

            phone.merge(&mut tablet).unwrap();
            black_box(&phone);
        })
    });
}

criterion_group!(
    benches,
    bench_add,
    bench_full_run,
    bench_skip,
    bench_document_set_displayed,
    bench_document_is_displayed,
    bench_document_merge,
);

criterion_main!(benches);

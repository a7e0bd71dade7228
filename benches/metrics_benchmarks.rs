use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tierdrill::catalog::Catalog;
use tierdrill::engine::progression::ProgressionGate;
use tierdrill::engine::scoring::strict_accuracy;
use tierdrill::session::input::apply_input;
use tierdrill::session::metrics::MetricsEngine;
use tierdrill::session::result::SessionRecord;
use tierdrill::store::memory::MemoryHistory;
use tierdrill::store::{SessionHistory, UserContext, UserId};

fn long_target(words: usize) -> String {
    let vocab = ["river", "stone", "quick", "amber", "lantern", "violet", "north", "echo"];
    (0..words)
        .map(|i| vocab[i % vocab.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every prefix of `target`, with a typo injected every 11th character.
fn keystroke_inputs(target: &str) -> Vec<String> {
    let mut inputs = Vec::new();
    let mut typed = String::new();
    for (i, ch) in target.chars().enumerate() {
        if i % 11 == 10 {
            typed.push('#');
            inputs.push(typed.clone());
            typed.pop();
            inputs.push(typed.clone());
        }
        typed.push(ch);
        inputs.push(typed.clone());
    }
    inputs
}

fn bench_update(c: &mut Criterion) {
    let target = long_target(200);
    let inputs = keystroke_inputs(&target);

    c.bench_function("metrics update per keystroke (200 words)", |b| {
        b.iter(|| {
            let mut engine = MetricsEngine::new(&target);
            for input in &inputs {
                black_box(apply_input(&mut engine, black_box(input)));
            }
            engine.accuracy()
        })
    });

    let last = inputs.last().cloned().unwrap_or_default();
    c.bench_function("strict accuracy (200 words)", |b| {
        b.iter(|| strict_accuracy(black_box(&target), black_box(&last)))
    });
}

fn bench_gate(c: &mut Criterion) {
    let catalog = Catalog::bundled().expect("bundled catalog");
    let history = MemoryHistory::new();
    let user = UserContext {
        id: UserId(1),
        name: "bench".to_string(),
    };
    // Finish the first five tiers, several times over
    for drill in catalog.drills().iter().filter(|d| d.tier.get() <= 5) {
        let mut engine = MetricsEngine::new(&drill.body);
        apply_input(&mut engine, &drill.body);
        for _ in 0..20 {
            let record = SessionRecord::from_attempt(&user, drill, &engine, &drill.body, 20.0, chrono::Utc::now());
            history.append(&record).expect("append");
        }
    }
    let gate = ProgressionGate::new(&catalog, &history);

    c.bench_function("unlocked_up_to (300 sessions)", |b| {
        b.iter(|| gate.unlocked_up_to(black_box(user.id)))
    });
}

criterion_group!(benches, bench_update, bench_gate);
criterion_main!(benches);

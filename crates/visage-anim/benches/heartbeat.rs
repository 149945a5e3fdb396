//! Benchmarks for the aggregator heartbeat path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use visage_anim::{Aggregator, Channel, Config};

fn loaded_aggregator(snippets: usize, keyframes: usize) -> Aggregator {
    let mut agg = Aggregator::new(Config::default());
    for s in 0..snippets {
        let mut json = format!(r#"{{"name":"bench_{s}","loop":true,"curves":{{"#);
        for ch in 0..4 {
            if ch > 0 {
                json.push(',');
            }
            json.push_str(&format!(r#""{ch}":["#));
            for k in 0..keyframes {
                if k > 0 {
                    json.push(',');
                }
                let t = k as f32 * 0.1;
                let v = (k % 2) as f32 * 0.8;
                json.push_str(&format!(r#"{{"t":{t},"v":{v}}}"#));
            }
            json.push(']');
        }
        json.push_str("}}");
        agg.load_json(&json).unwrap();
    }
    agg
}

fn bench_heartbeat(c: &mut Criterion) {
    let mut agg = loaded_aggregator(16, 8);
    let mut sink = |_: &Channel, _: f32, _: u32| {};

    c.bench_function("heartbeat_16x8", |b| {
        b.iter(|| agg.heartbeat(black_box(0.016), &mut sink))
    });
}

fn bench_evaluate_only(c: &mut Criterion) {
    let mut agg = loaded_aggregator(64, 4);
    let mut sink = |_: &Channel, _: f32, _: u32| {};

    c.bench_function("evaluate_64x4", |b| {
        b.iter(|| agg.evaluate(black_box(&mut sink)))
    });
}

criterion_group!(benches, bench_heartbeat, bench_evaluate_only);
criterion_main!(benches);

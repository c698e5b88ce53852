use divan::Bencher;
use newsfeed_core::parse::json;
use newsfeed_core::{News, Record};

fn main() {
    // Run registered benchmarks.
    divan::main();
}

#[divan::bench]
fn fingerprint_news(bencher: Bencher) {
    let record: Record = News::new("Fire downtown", "Springfield")
        .expect("Can't fail")
        .into();

    bencher.bench_local(move || divan::black_box(&record).fingerprint());
}

#[divan::bench(args = [1, 100, 1000])]
fn decode_json_collection(bencher: Bencher, n: usize) {
    let envelopes: Vec<_> = (0..n)
        .map(|i| {
            format!(r#"{{"type":"news","data":{{"text":"Item {i}","city":"Springfield"}}}}"#)
        })
        .collect();
    let input = format!(r#"{{"records":[{}]}}"#, envelopes.join(","));

    bencher.bench_local(move || {
        json::decode(divan::black_box(input.as_bytes())).expect("Can't fail")
    });
}

#[divan::bench]
fn render_news(bencher: Bencher) {
    let record: Record = News::new("Fire downtown", "Springfield")
        .expect("Can't fail")
        .into();

    bencher.bench_local(move || divan::black_box(&record).render());
}

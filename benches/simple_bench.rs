use criterion::{black_box, criterion_group, criterion_main, Criterion};
use seqex::Pattern;

fn is_even(n: &i32) -> bool {
    n % 2 == 0
}

fn is_odd(n: &i32) -> bool {
    n % 2 != 0
}

fn long_input(len: usize) -> Vec<i32> {
    (0..len as i32).collect()
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_alternating_run", |b| {
        b.iter(|| {
            Pattern::matching(is_even)
                .followed_by(is_odd)
                .one_or_more(true)
                .compile()
                .unwrap()
        })
    });
}

fn bench_find_all(c: &mut Criterion) {
    let matcher = Pattern::matching(is_even).one_or_more(true).compile().unwrap();
    let input = long_input(10_000);
    c.bench_function("find_all_10k", |b| {
        b.iter(|| black_box(matcher.find_all(input.clone())))
    });
}

fn bench_scanner_push(c: &mut Criterion) {
    let matcher = Pattern::matching(is_even).one_or_more(false).compile().unwrap();
    let input = long_input(10_000);
    c.bench_function("scanner_push_10k", |b| {
        b.iter(|| {
            let mut scanner = matcher.scanner();
            for &n in &input {
                black_box(scanner.push(n).unwrap());
            }
            black_box(scanner.end().unwrap());
        })
    });
}

criterion_group!(benches, bench_compile, bench_find_all, bench_scanner_push);
criterion_main!(benches);

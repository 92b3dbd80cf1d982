//! Benchmarks for lexer throughput on representative ASN.1 module sizes.

use asn1wrs::lexer::Lexer;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::fmt::Write as _;
use std::hint::black_box;

fn small_module() -> String {
    "Foo DEFINITIONS ::= BEGIN \
     Age ::= INTEGER (0..120) \
     Msg ::= CHOICE { hello [0] IA5String, goodbye [1] IA5String } \
     END"
        .to_string()
}

/// A synthetic module with `n` independent `SEQUENCE` type assignments, to
/// exercise the lexer on a source size closer to a real protocol schema.
fn large_module(n: usize) -> String {
    let mut src = String::from("Foo DEFINITIONS ::= BEGIN\n");
    for i in 0..n {
        let _ = writeln!(src, "Type{i} ::= SEQUENCE {{ a INTEGER, b OCTET STRING, c BOOLEAN }}");
    }
    src.push_str("END");
    src
}

fn benchmark_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let small = small_module();
    group.bench_function("tokenize_small_module", |b| {
        b.iter(|| Lexer::new(black_box(&small)).tokenize().expect("tokenizes"));
    });

    for size in [10usize, 100, 1000] {
        let large = large_module(size);
        group.bench_with_input(BenchmarkId::new("tokenize_n_sequences", size), &large, |b, src| {
            b.iter(|| Lexer::new(black_box(src)).tokenize().expect("tokenizes"));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_lexer);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vcon::script::Evaluator;
use vcon::terminal::CaptureTerminal;

fn evaluator() -> Evaluator {
    let (term, _) = CaptureTerminal::new();
    Evaluator::new(Box::new(term))
}

/// `n` lines of mixed words, quotes and expansions.
fn make_script(n: usize) -> String {
    let line = "list plain \"quoted $x text\\n\" 'single $x' ${name} {brace {nested} $x}\n";
    line.repeat(n)
}

fn bench_tokenize(c: &mut Criterion) {
    let small = make_script(10);
    let large = make_script(1000);

    let mut g = c.benchmark_group("tokenize");

    g.bench_function("mixed_small", |b| {
        let mut ev = evaluator();
        ev.env_mut().set_new("x", "value".into()).unwrap();
        b.iter(|| ev.evaluate_string(black_box(&small)).unwrap())
    });
    g.bench_function("mixed_large", |b| {
        let mut ev = evaluator();
        ev.env_mut().set_new("x", "value".into()).unwrap();
        b.iter(|| ev.evaluate_string(black_box(&large)).unwrap())
    });

    let body = "inner line with {braces} and 'quotes'\n".repeat(200);
    let multi_line = format!("list {{\n{body}}}\n");
    g.bench_function("brace_continuation", |b| {
        let mut ev = evaluator();
        b.iter(|| ev.evaluate_string(black_box(&multi_line)).unwrap())
    });

    g.finish();
}

fn bench_pipes(c: &mut Criterion) {
    let mut ev = evaluator();
    let line = "list a b c d e f g h | list | list | list | len";
    c.bench_function("pipe_chain", |b| {
        b.iter(|| ev.evaluate_string(black_box(line)).unwrap())
    });
}

criterion_group!(benches, bench_tokenize, bench_pipes);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use eyre::Result;
use tinyc::{fib, Module};

const SOURCE: &str = include_str!("../tests/programs/fibonacci.c");

fn fibonacci_parse() -> Result<Module> {
    Ok(Module::parse_str(SOURCE)?)
}

fn fibonacci_to_tac(module: &Module) -> Result<Vec<u8>> {
    Ok(module.serialize_tac()?)
}

fn fibonacci_from_tac(tac: &[u8]) -> Result<Module> {
    Ok(Module::from_tac(tac)?)
}

fn fibonacci_run(module: &Module, recursive: bool, n: i32) -> Result<i32> {
    let func = module.get_func(match recursive {
        true => "fibb",
        false => "fibb_iter",
    })?;
    Ok(func.call(&[n])?)
}

fn criterion_benchmark(c: &mut Criterion) {
    let module = fibonacci_parse().expect("fibonacci_parse");
    let tac = fibonacci_to_tac(&module).expect("fibonacci_to_tac");

    c.bench_function("fibonacci_parse", |b| b.iter(fibonacci_parse));
    c.bench_function("fibonacci_to_tac", |b| b.iter(|| fibonacci_to_tac(&module)));
    c.bench_function("fibonacci_from_tac", |b| b.iter(|| fibonacci_from_tac(&tac)));
    c.bench_function("fibonacci_x86_64", |b| b.iter(|| module.to_x86_64()));
    c.bench_function("fibonacci_iterative_30", |b| b.iter(|| fibonacci_run(&module, false, 30)));
    c.bench_function("fibonacci_recursive_20", |b| b.iter(|| fibonacci_run(&module, true, 20)));
    c.bench_function("fibonacci_native_recursive_20", |b| {
        b.iter(|| fib::fibonacci_recursive(std::hint::black_box(20)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

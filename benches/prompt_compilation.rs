//! Benchmarks for prompt compilation performance
//!
//! This benchmark measures:
//! - Message list to backend prompt rendering
//! - Memoized compilation (cache hit path)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tgi_gateway::prompt::{compile, PromptCompiler};
use tgi_gateway::types::message::Message;

fn simple_conversation() -> Vec<Message> {
    vec![
        Message::system("You are a helpful assistant."),
        Message::user("Hello, world!"),
    ]
}

fn long_conversation() -> Vec<Message> {
    let mut messages = vec![Message::system("You are a helpful assistant.")];
    for i in 0..50 {
        messages.push(Message::user(format!("User message number {}", i)));
    }
    messages
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("prompt_compilation");

    let simple = simple_conversation();
    let long = long_conversation();

    group.bench_with_input(BenchmarkId::new("compile", "simple"), &simple, |b, msgs| {
        b.iter(|| compile(black_box(msgs)))
    });

    group.bench_with_input(
        BenchmarkId::new("compile", "long_conversation"),
        &long,
        |b, msgs| b.iter(|| compile(black_box(msgs))),
    );

    group.finish();
}

fn bench_memoized_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("prompt_memo");

    let messages = long_conversation();
    let compiler = PromptCompiler::new();
    let key = "bench-key";
    compiler.compile_cached(key, &messages); // warm the memo

    group.bench_function("cached_hit", |b| {
        b.iter(|| compiler.compile_cached(black_box(key), black_box(&messages)))
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_memoized_compile);
criterion_main!(benches);

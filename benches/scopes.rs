//! Benchmarks for scope analysis.
//!
//! Measures the stages a redefinition goes through on a synthetic class with many composables:
//! - Class file parsing
//! - Scope tree construction
//! - Invalidation key resolution
//! - Snapshot diffing

extern crate groupscope;

use criterion::{criterion_group, criterion_main, Criterion};
use groupscope::{config::FUNCTION_KEY_META, prelude::*};
use std::hint::black_box;

const COMPOSABLE: &str = "(Landroidx/compose/runtime/Composer;I)V";
const COMPOSER: &str = "androidx/compose/runtime/Composer";
const FUNCTIONS: i32 = 64;

fn group(code: &mut CodeBuilder, start: &str, end: &str, end_descriptor: &str, key: i32) {
    code.aload(0).iconst(key).invokeinterface(COMPOSER, start, "(I)V");
    code.invokestatic("com/example/BenchKt", &format!("helper{}", key % 8), "()I")
        .pop();
    code.aload(0).invokeinterface(COMPOSER, end, end_descriptor);
}

/// A class with `FUNCTIONS` composables, each holding a restart group with two nested replace
/// groups, and eight helpers returning `seed`.
fn class(seed: i32) -> Vec<u8> {
    let mut class = ClassBuilder::new("com/example/BenchKt");
    for function in 0..FUNCTIONS {
        let key = function * 10;
        class = class.method(&format!("Screen{function}"), COMPOSABLE, |method| {
            method.function_key(FUNCTION_KEY_META, key).code(|code| {
                code.aload(0)
                    .iconst(key + 1)
                    .invokeinterface(
                        COMPOSER,
                        "startRestartGroup",
                        "(I)Landroidx/compose/runtime/Composer;",
                    )
                    .astore(0);
                group(code, "startReplaceGroup", "endReplaceGroup", "()V", key + 2);
                group(code, "startReplaceGroup", "endReplaceGroup", "()V", key + 3);
                code.aload(0)
                    .invokeinterface(
                        COMPOSER,
                        "endRestartGroup",
                        "()Landroidx/compose/runtime/ScopeUpdateScope;",
                    )
                    .pop()
                    .return_void();
            })
        });
    }
    for helper in 0..8 {
        class = class.method(&format!("helper{helper}"), "()I", |method| {
            method.code(|code| {
                code.iconst(seed + helper).ireturn();
            })
        });
    }
    class.build()
}

fn snapshot(bytes: &[u8]) -> Snapshot {
    let class = ClassUnit::parse(bytes).unwrap();
    analyze_class(&class, &AnalysisConfig::default())
        .trees
        .into_iter()
        .collect()
}

/// Benchmark decoding the class file and all method bodies.
fn bench_parse_class(c: &mut Criterion) {
    let bytes = class(0);

    c.bench_function("parse_class", |b| {
        b.iter(|| {
            let class = ClassUnit::parse(black_box(&bytes)).unwrap();
            for method in class.methods() {
                black_box(method.instructions(&class).unwrap());
            }
        });
    });
}

/// Benchmark building the scope trees of every method.
fn bench_analyze_class(c: &mut Criterion) {
    let bytes = class(0);
    let class = ClassUnit::parse(&bytes).unwrap();
    let config = AnalysisConfig::default();

    c.bench_function("analyze_class", |b| {
        b.iter(|| black_box(analyze_class(black_box(&class), &config)));
    });
}

/// Benchmark resolving the invalidation key of every group.
fn bench_resolve_all(c: &mut Criterion) {
    let snapshot = snapshot(&class(0));
    let keys: Vec<GroupKey> = snapshot.group_keys().collect();

    c.bench_function("resolve_all_groups", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(resolve(&snapshot, *key));
            }
        });
    });
}

/// Benchmark diffing two snapshots where every helper changed.
fn bench_diff(c: &mut Criterion) {
    let before = snapshot(&class(0));
    let after = snapshot(&class(1));

    c.bench_function("diff_snapshots", |b| {
        b.iter(|| black_box(diff(black_box(&before), black_box(&after))));
    });
}

criterion_group!(
    benches,
    bench_parse_class,
    bench_analyze_class,
    bench_resolve_all,
    bench_diff,
);
criterion_main!(benches);

//! Registry and dispatch benchmarks
//!
//! Benchmarks for the hot runtime paths:
//! - find_by_name() on a populated factory
//! - deep registration of a fresh lineage
//! - ancestry checks across a multiple-inheritance graph
//! - invoke() through bound class methods and plain extensions
//!
//! Run with: `cargo bench --bench registry`

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use metaxis::args;
use metaxis::runtime::{
    Argument, ClassBuilder, ClassHandle, MetaClass, MetaObject, Object, ObjectExtension,
    ObjectFactory, invoke,
};
use std::sync::atomic::{AtomicUsize, Ordering};

static BENCH_ID: AtomicUsize = AtomicUsize::new(0);

/// Generate a unique class name for benchmarks
fn unique_name(prefix: &str) -> String {
    let id = BENCH_ID.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{id}")
}

fn chain(depth: usize) -> Vec<ClassHandle> {
    let mut classes: Vec<ClassHandle> = Vec::with_capacity(depth);
    for _ in 0..depth {
        let mut builder = ClassBuilder::new(unique_name("bench.Chain"));
        if let Some(parent) = classes.last() {
            builder = builder.base(*parent);
        }
        classes.push(builder.build());
    }
    classes
}

fn bench_find_by_name(c: &mut Criterion) {
    let factory = ObjectFactory::new();
    for _ in 0..256 {
        let class = ClassBuilder::new(unique_name("bench.Lookup")).build();
        factory.register(class).unwrap();
    }
    let target = factory.names()[128];

    c.bench_function("find_by_name", |b| {
        b.iter(|| black_box(factory.find_by_name(black_box(target))));
    });
}

fn bench_deep_register(c: &mut Criterion) {
    let leaf = *chain(8).last().unwrap();

    c.bench_function("deep_register_depth_8", |b| {
        b.iter_batched(
            ObjectFactory::new,
            |factory| {
                factory.register(leaf).unwrap();
                black_box(factory)
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_has_ancestor(c: &mut Criterion) {
    let classes = chain(16);
    let root = classes[0];
    let leaf = classes[15];

    c.bench_function("has_ancestor_depth_16", |b| {
        b.iter(|| black_box(leaf.has_ancestor(black_box(root))));
    });
}

fn bench_invoke(c: &mut Criterion) {
    let object = Object::static_meta_class().create("bench").unwrap();
    let base = object.as_object().unwrap();
    base.add_extension(&ObjectExtension::new("noop", |_| Ok(Argument::void())))
        .unwrap();

    c.bench_function("invoke_extension", |b| {
        b.iter(|| black_box(invoke(&object, "noop", &args![]).unwrap()));
    });

    c.bench_function("invoke_bound_method", |b| {
        b.iter(|| black_box(invoke(&object, "getName", &args![]).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_find_by_name,
    bench_deep_register,
    bench_has_ancestor,
    bench_invoke
);
criterion_main!(benches);

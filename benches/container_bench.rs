//! Benchmarks for the DI container

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use token_injector::{
    Construct, Container, ContainerOptions, Factory, Instances, Result, Tokens, alias, factory,
    singleton, transient_factory, value,
};

#[allow(dead_code)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

#[allow(dead_code)]
struct Repository {
    small: Arc<SmallService>,
    medium: Arc<MediumService>,
}

impl Construct for Repository {
    fn construct(instances: &Instances<'_>) -> Result<Self> {
        Ok(Repository {
            small: instances.get("small")?,
            medium: instances.get("medium")?,
        })
    }
}

fn base_tokens() -> Tokens {
    Tokens::new()
        .add("small", value(SmallService { value: 42 }))
        .add(
            "medium",
            factory(|_| {
                Ok(MediumService {
                    name: "test".to_string(),
                    values: vec![1, 2, 3, 4, 5],
                })
            }),
        )
        .add("repository", singleton::<Repository>())
        .add("small_alias", alias("small"))
        .add("fresh", transient_factory(|_| Ok(SmallService { value: 7 })))
}

fn bench_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("creation");

    group.bench_function("root_eager", |b| {
        b.iter(|| black_box(Container::create(base_tokens()).unwrap()))
    });

    group.bench_function("root_lazy", |b| {
        b.iter(|| {
            black_box(
                Container::create_with_options(base_tokens(), ContainerOptions::new().lazy(true))
                    .unwrap(),
            )
        })
    });

    let root = Container::create(base_tokens()).unwrap();
    group.bench_function("empty_child", |b| {
        b.iter(|| black_box(root.create_child(Tokens::new()).unwrap()))
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    let container = Container::create(base_tokens()).unwrap();

    group.bench_function("scoped_cached", |b| {
        b.iter(|| black_box(container.get::<MediumService>("medium").unwrap()))
    });

    group.bench_function("singleton_cached", |b| {
        b.iter(|| black_box(container.get::<Repository>("repository").unwrap()))
    });

    group.bench_function("alias", |b| {
        b.iter(|| black_box(container.get::<SmallService>("small_alias").unwrap()))
    });

    group.bench_function("transient", |b| {
        b.iter(|| black_box(container.get::<SmallService>("fresh").unwrap()))
    });

    group.bench_function("by_type", |b| {
        b.iter(|| black_box(container.get_type::<Repository>().unwrap()))
    });

    let unregistered = Factory::new(|_| Ok(SmallService { value: 1 }));
    group.bench_function("unregistered_factory", |b| {
        b.iter(|| black_box(container.get_factory(&unregistered).unwrap()))
    });

    group.bench_function("not_found", |b| {
        b.iter(|| black_box(container.try_get::<SmallService>("missing")))
    });

    group.finish();
}

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");

    for depth in [1usize, 4, 16] {
        let root = Container::create(base_tokens()).unwrap();
        let mut leaf = root.clone();
        for _ in 0..depth {
            leaf = leaf.create_child(Tokens::new()).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("singleton_from_leaf", depth), &leaf, |b, leaf| {
            b.iter(|| black_box(leaf.get::<Repository>("repository").unwrap()))
        });

        // first resolve from a fresh child walks to the root and builds
        group.bench_with_input(BenchmarkId::new("scoped_fresh_child", depth), &leaf, |b, leaf| {
            b.iter(|| {
                let request = leaf.create_child(Tokens::new()).unwrap();
                black_box(request.get::<MediumService>("medium").unwrap())
            })
        });
    }

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("concurrent_reads_4", |b| {
        let container = Container::create(base_tokens()).unwrap();

        b.iter(|| {
            thread::scope(|scope| {
                for _ in 0..4 {
                    scope.spawn(|| {
                        for _ in 0..100 {
                            let _ = container.get::<Repository>("repository").unwrap();
                        }
                    });
                }
            })
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_creation,
    bench_resolution,
    bench_hierarchy,
    bench_concurrent,
);

criterion_main!(benches);

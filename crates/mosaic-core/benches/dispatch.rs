use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mosaic_core::{ClassBuilder, ClassDefinition, ClassRef, InterfaceBuilder, InterfaceDefinition, Value};

/// Chain of `depth` classes, each overriding `depth` and chaining up
fn chain(depth: usize) -> ClassRef {
    let builder = ClassBuilder::default();
    let mut class = builder
        .build(ClassDefinition::new("Level0").method("depth", |_, _| Ok(Value::from(0))))
        .unwrap();
    for level in 1..depth {
        class = builder
            .build(
                ClassDefinition::new(format!("Level{}", level))
                    .extends(&class)
                    .method("depth", |this, args| {
                        let below = this.parent(args)?.as_int().unwrap_or(0);
                        Ok(Value::from(below + 1))
                    }),
            )
            .unwrap();
    }
    class
}

fn bench_dispatch(c: &mut Criterion) {
    let class = ClassBuilder::default()
        .build(
            ClassDefinition::new("Counter")
                .method("get", |_, _| Ok(Value::from(1)))
                .value("label", "counter"),
        )
        .unwrap();
    let obj = class.new_instance().unwrap();

    c.bench_function("call_method", |b| {
        b.iter(|| obj.call(black_box("get"), &[]).unwrap());
    });
    c.bench_function("get_value", |b| {
        b.iter(|| obj.get(black_box("label")).unwrap());
    });
}

fn bench_parent_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("parent_chain");

    for depth in [1usize, 4, 16] {
        let obj = chain(depth).new_instance().unwrap();
        group.bench_with_input(BenchmarkId::new("depth", depth), &obj, |b, obj| {
            b.iter(|| obj.call(black_box("depth"), &[]).unwrap());
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let ifaces = InterfaceBuilder::new();
    let a = ifaces
        .build(
            InterfaceDefinition::new("A")
                .method("a", |_, _| Ok(Value::Undefined))
                .unimplemented("x"),
        )
        .unwrap();
    let b_iface = ifaces
        .build(
            InterfaceDefinition::new("B")
                .requires(&a)
                .method("b", |_, _| Ok(Value::Undefined)),
        )
        .unwrap();
    let builder = ClassBuilder::default();

    c.bench_function("build_class_two_interfaces", |b| {
        b.iter(|| {
            builder
                .build(
                    ClassDefinition::new("Composite")
                        .implements(&a)
                        .implements(&b_iface)
                        .method("x", |_, _| Ok(Value::Undefined)),
                )
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_dispatch, bench_parent_chain, bench_build);
criterion_main!(benches);

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use veneer_context::ProjectionContext;
use veneer_table::AttributeTableBuilder;
use veneer_types::{
    Attribute, AttributeKind, AttributeProvider, AssemblyVersion, BindingFlags,
    MethodDescription, TypeDescription, TypeKind, TypeRef, Universe, UniverseBuilder,
};

/// A flat assembly of `count` classes with one method each
fn universe(count: usize) -> (Arc<Universe>, Vec<TypeRef>) {
    let mut b = UniverseBuilder::new();
    let asm = b.add_assembly("Bench", AssemblyVersion::new(1, 0, 0, 0));
    let int = b.add_type(asm, "System", "Int32", TypeKind::Struct);
    let types: Vec<_> = (0..count)
        .map(|i| {
            let ty = b.add_type(asm, "Bench", &format!("Type{}", i), TypeKind::Class);
            b.add_method(ty, "Run", &[("x", int.handle())], Some(int.handle()));
            ty
        })
        .collect();
    let universe = b.build().unwrap();
    let refs = types
        .into_iter()
        .map(|ty| universe.ty(ty).unwrap())
        .collect();
    (universe, refs)
}

fn context(types: &[TypeRef]) -> ProjectionContext {
    let mut table = AttributeTableBuilder::new();
    for ty in types.iter().step_by(2) {
        table.add_type_attributes(
            ty.as_ref(),
            [Attribute::new(AttributeKind::new("ObsoleteAttribute"))],
        );
    }
    ProjectionContext::new(Arc::new(table.build()))
}

fn bench_map_type(c: &mut Criterion) {
    let (_universe, types) = universe(64);
    let ctx = context(&types);

    // Keep proxies alive so every lookup after the first is a cache hit
    let _held: Vec<TypeRef> = types.iter().map(|ty| ctx.map_type(ty)).collect();
    c.bench_function("map_type_cached", |b| {
        b.iter(|| {
            for ty in &types {
                black_box(ctx.map_type(black_box(ty)));
            }
        });
    });

    c.bench_function("map_type_cold", |b| {
        b.iter(|| {
            let ctx = context(&types);
            for ty in &types {
                black_box(ctx.map_type(black_box(ty)));
            }
        });
    });
}

fn bench_attributes(c: &mut Criterion) {
    let mut group = c.benchmark_group("attributes");
    let obsolete = AttributeKind::new("ObsoleteAttribute");

    for count in [16usize, 256] {
        let (_universe, types) = universe(count);
        let ctx = context(&types);
        let projected: Vec<TypeRef> = types.iter().map(|ty| ctx.map_type(ty)).collect();

        group.bench_with_input(BenchmarkId::new("type_query", count), &projected, |b, projected| {
            b.iter(|| {
                projected
                    .iter()
                    .filter(|ty| ty.is_defined(black_box(&obsolete), true))
                    .count()
            });
        });

        group.bench_with_input(BenchmarkId::new("parameter_query", count), &projected, |b, projected| {
            b.iter(|| {
                for ty in projected {
                    for method in ty.methods(BindingFlags::DEFAULT) {
                        for param in method.parameters() {
                            black_box(param.custom_attributes(None, false));
                        }
                    }
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_map_type, bench_attributes);
criterion_main!(benches);

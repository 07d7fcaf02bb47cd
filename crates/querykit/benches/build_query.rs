use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use querykit::{CondOp, QueryBuilder, WhereCondition};

/// Builder with `n` equality conditions:
/// SELECT * FROM events WHERE col0 = $1 AND col1 = $2 ...
fn builder_with_conditions(n: usize) -> QueryBuilder {
    let mut qb = QueryBuilder::new().select("*").from("events");
    for i in 0..n {
        qb = qb.where_cond(WhereCondition::new(format!("col{i}"), CondOp::Eq, i as i64));
    }
    qb
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/build");

    for n in [1, 5, 10, 50, 100] {
        let qb = builder_with_conditions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.build().unwrap()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let qb = QueryBuilder::new()
                    .select("*")
                    .from("events")
                    .in_list("id", values.clone());
                black_box(qb.build().unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_in_list);
criterion_main!(benches);

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chol_analyse::{Analyse, AnalyseConfig, AmdOrdering};

/// A symmetric, upper-triangle-only CSC pattern for benchmarking: `(rows, ptr)`.
struct Case {
    name: String,
    rows: Vec<usize>,
    ptr: Vec<usize>,
    n: usize,
}

/// A 2-D five-point-stencil Laplacian on a `side x side` grid, the
/// classic nested-dissection stress case: sparse, regular, large fill
/// under a naive ordering.
fn grid5(side: usize) -> Case {
    let n = side * side;
    let idx = |r: usize, c: usize| r * side + c;
    let mut cols: Vec<Vec<usize>> = vec![Vec::new(); n];
    for r in 0..side {
        for c in 0..side {
            let j = idx(r, c);
            cols[j].push(j);
            if c + 1 < side {
                cols[j.max(idx(r, c + 1))].push(j.min(idx(r, c + 1)));
            }
            if r + 1 < side {
                cols[j.max(idx(r + 1, c))].push(j.min(idx(r + 1, c)));
            }
        }
    }
    let mut ptr = vec![0usize];
    let mut rows = Vec::new();
    for col in &mut cols {
        col.sort_unstable();
        col.dedup();
        rows.extend_from_slice(col);
        ptr.push(rows.len());
    }
    Case {
        name: format!("grid5/{side}x{side}"),
        rows,
        ptr,
        n,
    }
}

/// A plain tridiagonal pattern: the cheapest possible nontrivial case,
/// useful as a per-entry baseline for the pipeline's fixed overhead.
fn tridiagonal(n: usize) -> Case {
    let mut rows = Vec::new();
    let mut ptr = vec![0usize];
    for j in 0..n {
        if j > 0 {
            rows.push(j - 1);
        }
        rows.push(j);
        ptr.push(rows.len());
    }
    Case {
        name: format!("tridiagonal/{n}"),
        rows,
        ptr,
        n,
    }
}

fn cases() -> Vec<Case> {
    vec![
        tridiagonal(2_000),
        tridiagonal(20_000),
        grid5(16),
        grid5(40),
        grid5(80),
    ]
}

fn bench_full_analyse(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyse/full_pipeline");

    for case in cases() {
        group.throughput(Throughput::Elements(case.rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(&case.name), &case, |b, case| {
            b.iter(|| {
                let mut analyse = Analyse::new(&case.rows, &case.ptr, AnalyseConfig::default())
                    .expect("valid pattern");
                let sym = analyse.run(&AmdOrdering::default()).expect("analysis succeeds");
                black_box(sym);
            });
        });
        assert!(case.n > 0);
    }

    group.finish();
}

fn bench_ordering_only(c: &mut Criterion) {
    use chol_analyse::Ordering;

    let mut group = c.benchmark_group("analyse/amd_ordering");

    for case in cases() {
        group.throughput(Throughput::Elements(case.rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(&case.name), &case, |b, case| {
            let (upper, lower) =
                chol_analyse::pattern::ingest(&case.rows, &case.ptr).expect("valid pattern");
            let ordering = AmdOrdering::default();
            b.iter(|| {
                let perm = ordering.order(&upper, &lower).expect("amd succeeds");
                black_box(perm);
            });
        });
    }

    group.finish();
}

criterion_group!(analyse, bench_full_analyse, bench_ordering_only);
criterion_main!(analyse);

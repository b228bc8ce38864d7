use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use quadrs_api::{solve_qp, QpBuilder, Settings};
use quadrs_core::math::Scalar;
use quadrs_core::problem::{CscMatrix, Problem};
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn random_diagonal_spd(n: usize, rng: &mut SmallRng) -> CscMatrix<Scalar> {
    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices = Vec::with_capacity(n);
    let mut data = Vec::with_capacity(n);
    indptr.push(0);
    for col in 0..n {
        indices.push(col);
        data.push(1.0 + rng.gen::<Scalar>() * 0.1);
        indptr.push(indices.len());
    }
    CscMatrix {
        nrows: n,
        ncols: n,
        indptr,
        indices,
        data,
    }
}

fn random_constraints(m: usize, n: usize, rng: &mut SmallRng) -> CscMatrix<Scalar> {
    let mut indptr = Vec::with_capacity(n + 1);
    let mut indices = Vec::new();
    let mut data = Vec::new();
    indptr.push(0);
    for _col in 0..n {
        for row in 0..m {
            indices.push(row);
            data.push(rng.gen::<Scalar>() * 0.5 - 0.25);
        }
        indptr.push(indices.len());
    }
    CscMatrix {
        nrows: m,
        ncols: n,
        indptr,
        indices,
        data,
    }
}

fn build_problem(n: usize, m: usize, rng: &mut SmallRng) -> Problem<Scalar> {
    let p = random_diagonal_spd(n, rng);
    let q = (0..n)
        .map(|_| rng.gen::<Scalar>() - 0.5)
        .collect::<Vec<_>>();
    let a = random_constraints(m, n, rng);
    let u = (0..m).map(|_| rng.gen::<Scalar>() + 0.5).collect::<Vec<_>>();
    let l = vec![-1.0; m];
    QpBuilder::new()
        .p(p)
        .q(q)
        .a(a)
        .l(l)
        .u(u)
        .build()
        .expect("benchmark problem must be valid")
}

fn solve_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("admm_qp_solve");
    let mut rng = SmallRng::seed_from_u64(42);
    group.bench_function("n=30_m=45", |b| {
        b.iter_batched(
            || build_problem(30, 45, &mut rng),
            |problem| {
                let _ = solve_qp(&problem, Settings::default()).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, solve_benchmark);
criterion_main!(benches);

use anyhow::Result;
use quadrs_api::{solve_qp, QpBuilder, Settings};
use quadrs_core::math::Scalar;
use quadrs_core::problem::CscMatrix;

/// Minimum-variance portfolio: budget and target-return rows are equalities,
/// the per-asset weight rows are boxes in [0, 1].
fn main() -> Result<()> {
    let returns = [0.12, 0.10, 0.07, 0.03];
    let cov_diag = [0.05, 0.02, 0.01, 0.005];
    let target_return = 0.08;
    let n = returns.len();

    let p = diagonal_csc(&cov_diag);
    let q = vec![0.0; n];

    // rows: 1ᵀw = 1, rᵀw = target, then I for the weight boxes
    let mut indptr = vec![0];
    let mut indices = Vec::new();
    let mut data = Vec::new();
    for col in 0..n {
        indices.push(0);
        data.push(1.0);
        indices.push(1);
        data.push(returns[col]);
        indices.push(2 + col);
        data.push(1.0);
        indptr.push(data.len());
    }
    let a = CscMatrix {
        nrows: 2 + n,
        ncols: n,
        indptr,
        indices,
        data,
    };

    let mut l = vec![1.0, target_return];
    let mut u = vec![1.0, target_return];
    l.extend(std::iter::repeat(0.0).take(n));
    u.extend(std::iter::repeat(1.0).take(n));

    let problem = QpBuilder::<Scalar>::new()
        .p(p)
        .q(q)
        .a(a)
        .l(l)
        .u(u)
        .build()?;

    let settings = Settings {
        max_iter: 4000,
        ..Settings::default()
    };
    let solution = solve_qp(&problem, settings)?;

    println!("status: {:?}", solution.info.status);
    println!("weights: {:?}", solution.primal);
    println!("variance: {:.6}", 2.0 * solution.objective_value);
    Ok(())
}

fn diagonal_csc(diag: &[Scalar]) -> CscMatrix<Scalar> {
    let mut indptr = Vec::with_capacity(diag.len() + 1);
    let mut indices = Vec::with_capacity(diag.len());
    let mut data = Vec::with_capacity(diag.len());
    indptr.push(0);
    for (idx, &value) in diag.iter().enumerate() {
        indices.push(idx);
        data.push(value);
        indptr.push(indices.len());
    }
    CscMatrix {
        nrows: diag.len(),
        ncols: diag.len(),
        indptr,
        indices,
        data,
    }
}

use anyhow::Result;
use quadrs_api::{solve_qp, QpBuilder, Settings};
use quadrs_core::math::Scalar;
use quadrs_core::problem::CscMatrix;

fn main() -> Result<()> {
    let p = diagonal_csc(&[2.0, 4.0, 6.0]);
    let q = vec![-2.0, -5.0, -3.0];

    let problem = QpBuilder::<Scalar>::new()
        .p(p)
        .q(q)
        .a(CscMatrix::identity(3))
        .l(vec![0.0, -1.0, 0.0])
        .u(vec![1.0, 2.0, 4.0])
        .build()?;

    let solution = solve_qp(&problem, Settings::default())?;

    println!("status: {:?}", solution.info.status);
    println!("x: {:?}", solution.primal);
    println!("objective: {:.6}", solution.objective_value);
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

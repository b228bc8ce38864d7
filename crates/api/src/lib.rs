#![forbid(unsafe_code)]

use quadrs_core::math::Real;
use quadrs_core::options::SettingsError;
use quadrs_core::traits::FactorizationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use quadrs_algos::AdmmSolver;
pub use quadrs_core::options::Settings;
pub use quadrs_core::problem::{CscMatrix, Problem};
pub use quadrs_core::solution::{Solution, SolveInfo, Status};
pub use quadrs_core::stats::SolveStats;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("invalid problem: {0}")]
    InvalidProblem(String),
    #[error("factorization failed: {0}")]
    Factorization(String),
}

fn classify(err: anyhow::Error) -> SolverError {
    if err.is::<SettingsError>() {
        SolverError::InvalidSettings(err.to_string())
    } else if err.is::<FactorizationError>() {
        SolverError::Factorization(err.to_string())
    } else {
        SolverError::InvalidProblem(err.to_string())
    }
}

/// Assembles a [`Problem`] from its parts. Omitted constraint bounds default
/// to the loose ±∞ rows; an omitted constraint matrix yields an
/// unconstrained problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpBuilder<T: Real> {
    p: Option<CscMatrix<T>>,
    q: Option<Vec<T>>,
    a: Option<CscMatrix<T>>,
    l: Option<Vec<T>>,
    u: Option<Vec<T>>,
}

impl<T> Default for QpBuilder<T>
where
    T: Real,
{
    fn default() -> Self {
        Self {
            p: None,
            q: None,
            a: None,
            l: None,
            u: None,
        }
    }
}

impl<T> QpBuilder<T>
where
    T: Real,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn p(mut self, matrix: CscMatrix<T>) -> Self {
        self.p = Some(matrix);
        self
    }

    pub fn q(mut self, vector: Vec<T>) -> Self {
        self.q = Some(vector);
        self
    }

    pub fn a(mut self, matrix: CscMatrix<T>) -> Self {
        self.a = Some(matrix);
        self
    }

    pub fn l(mut self, lower: Vec<T>) -> Self {
        self.l = Some(lower);
        self
    }

    pub fn u(mut self, upper: Vec<T>) -> Self {
        self.u = Some(upper);
        self
    }

    pub fn build(self) -> Result<Problem<T>, SolverError> {
        let p = self
            .p
            .ok_or_else(|| SolverError::InvalidProblem("quadratic matrix missing".into()))?;
        let q = self
            .q
            .ok_or_else(|| SolverError::InvalidProblem("linear term missing".into()))?;
        let n = q.len();
        let a = self.a.unwrap_or_else(|| CscMatrix::zeros(0, n));
        let m = a.nrows;
        let l = self.l.unwrap_or_else(|| vec![T::neg_infinity(); m]);
        let u = self.u.unwrap_or_else(|| vec![T::infinity(); m]);
        let problem = Problem { p, q, a, l, u };
        problem
            .validate()
            .map_err(|err| SolverError::InvalidProblem(err.to_string()))?;
        Ok(problem)
    }
}

/// One-shot solve of a QP, returning a snapshot of the result.
///
/// Non-convergence is not an error: a solver that hits the iteration cap
/// returns a solution whose `info.status` is [`Status::MaxIter`].
pub fn solve_qp<T: Real>(
    problem: &Problem<T>,
    settings: Settings<T>,
) -> Result<Solution<T>, SolverError> {
    let mut solver = AdmmSolver::<T>::new(problem.nvars(), problem.nconstr());
    *solver.settings_mut() = settings;
    solver.solve(problem).map_err(classify)?;
    Ok(Solution {
        primal: solver.primal_solution().to_vec(),
        dual: solver.dual_solution().to_vec(),
        slack: solver.slack().to_vec(),
        objective_value: problem.objective(solver.primal_solution()),
        info: *solver.info(),
        stats: solver.stats().clone(),
    })
}

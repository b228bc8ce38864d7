use crate::math::Real;
use crate::problem::CscMatrix;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactorizationError {
    #[error("KKT matrix is {nrows}x{ncols}, expected square")]
    NotSquare { nrows: usize, ncols: usize },
    #[error("matrix dimension {found} does not match the computed factorization ({expected})")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("solve called before a successful compute")]
    NotComputed,
    #[error("near-singular pivot at column {column} (|d| = {magnitude:.3e})")]
    SingularPivot { column: usize, magnitude: f64 },
}

/// Symmetric sparse factorization backend for KKT systems.
///
/// Implementations must handle symmetric quasi-definite matrices, i.e. a
/// positive definite leading block against a negative definite trailing
/// diagonal block. The sparsity pattern seen by `compute` stays fixed until
/// the next `compute`; `factorize` only refreshes the numeric values.
pub trait KktSolver<T: Real>: Send {
    /// Symbolic and numeric factorization of `matrix`.
    fn compute(&mut self, matrix: &CscMatrix<T>) -> Result<(), FactorizationError>;

    /// Numeric refactorization; `matrix` must have the pattern last passed to
    /// [`KktSolver::compute`].
    fn factorize(&mut self, matrix: &CscMatrix<T>) -> Result<(), FactorizationError>;

    /// Solves M v = rhs in place.
    fn solve(&self, rhs: &mut [T]) -> Result<(), FactorizationError>;
}

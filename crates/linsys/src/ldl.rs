use quadrs_core::math::Real;
use quadrs_core::problem::CscMatrix;
use quadrs_core::traits::{FactorizationError, KktSolver};
use num_traits::FromPrimitive;

/// Unpivoted LDLᵀ factorization of a symmetric quasi-definite matrix.
///
/// The CSC input is scattered into a dense workspace before factoring, so the
/// cost is O(dim³) regardless of sparsity. Quasi-definiteness guarantees every
/// pivot is nonzero without permutations: pivots come out positive over the
/// leading block and negative over the trailing diagonal block.
pub struct LdlKktSolver<T: Real> {
    dim: usize,
    /// Row-major unit lower-triangular factor; the unit diagonal is stored.
    lower: Vec<T>,
    diag: Vec<T>,
    /// Dense scatter of the input, row-major, refreshed on every (re)factor.
    work: Vec<T>,
    computed: bool,
}

impl<T> LdlKktSolver<T>
where
    T: Real + FromPrimitive,
{
    pub fn new() -> Self {
        Self {
            dim: 0,
            lower: Vec::new(),
            diag: Vec::new(),
            work: Vec::new(),
            computed: false,
        }
    }

    fn pivot_floor() -> T {
        T::from_f64(1e-12).unwrap()
    }

    fn scatter(&mut self, matrix: &CscMatrix<T>) {
        for value in self.work.iter_mut() {
            *value = T::zero();
        }
        for col in 0..matrix.ncols {
            for idx in matrix.indptr[col]..matrix.indptr[col + 1] {
                self.work[matrix.indices[idx] * self.dim + col] = matrix.data[idx];
            }
        }
    }

    fn refactor(&mut self) -> Result<(), FactorizationError> {
        let dim = self.dim;
        for i in 0..dim {
            for j in 0..dim {
                self.lower[i * dim + j] = if i == j { T::one() } else { T::zero() };
            }
        }
        for j in 0..dim {
            let mut d_j = self.work[j * dim + j];
            for k in 0..j {
                let l_jk = self.lower[j * dim + k];
                d_j -= l_jk * l_jk * self.diag[k];
            }
            if d_j.abs() <= Self::pivot_floor() {
                self.computed = false;
                return Err(FactorizationError::SingularPivot {
                    column: j,
                    magnitude: d_j.abs().to_f64().unwrap_or(f64::NAN),
                });
            }
            self.diag[j] = d_j;

            for i in (j + 1)..dim {
                let mut l_ij = self.work[i * dim + j];
                for k in 0..j {
                    l_ij -= self.lower[i * dim + k] * self.lower[j * dim + k] * self.diag[k];
                }
                self.lower[i * dim + j] = l_ij / d_j;
            }
        }
        self.computed = true;
        Ok(())
    }
}

impl<T> Default for LdlKktSolver<T>
where
    T: Real + FromPrimitive,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KktSolver<T> for LdlKktSolver<T>
where
    T: Real + FromPrimitive,
{
    fn compute(&mut self, matrix: &CscMatrix<T>) -> Result<(), FactorizationError> {
        if matrix.nrows != matrix.ncols {
            return Err(FactorizationError::NotSquare {
                nrows: matrix.nrows,
                ncols: matrix.ncols,
            });
        }
        self.dim = matrix.nrows;
        self.lower = vec![T::zero(); self.dim * self.dim];
        self.diag = vec![T::zero(); self.dim];
        self.work = vec![T::zero(); self.dim * self.dim];
        self.computed = false;
        self.scatter(matrix);
        self.refactor()
    }

    fn factorize(&mut self, matrix: &CscMatrix<T>) -> Result<(), FactorizationError> {
        if self.dim == 0 && matrix.nrows != 0 {
            return Err(FactorizationError::NotComputed);
        }
        if matrix.nrows != self.dim || matrix.ncols != self.dim {
            return Err(FactorizationError::DimensionMismatch {
                expected: self.dim,
                found: matrix.nrows,
            });
        }
        self.scatter(matrix);
        self.refactor()
    }

    fn solve(&self, rhs: &mut [T]) -> Result<(), FactorizationError> {
        if !self.computed {
            return Err(FactorizationError::NotComputed);
        }
        if rhs.len() != self.dim {
            return Err(FactorizationError::DimensionMismatch {
                expected: self.dim,
                found: rhs.len(),
            });
        }
        let dim = self.dim;
        for i in 0..dim {
            for j in 0..i {
                let l_ij = self.lower[i * dim + j];
                rhs[i] = rhs[i] - l_ij * rhs[j];
            }
        }
        for i in 0..dim {
            rhs[i] = rhs[i] / self.diag[i];
        }
        for i in (0..dim).rev() {
            for j in (i + 1)..dim {
                let l_ji = self.lower[j * dim + i];
                rhs[i] = rhs[i] - l_ji * rhs[j];
            }
        }
        Ok(())
    }
}

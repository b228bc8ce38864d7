use crate::math::Real;
use serde::{Deserialize, Serialize};
use sprs::CsMat;
use thiserror::Error;

/// Bounds with magnitude beyond this are treated as absent when classifying
/// constraint rows.
pub const LOOSE_BOUNDS_LIMIT: f64 = 1e16;

/// Rows with `u - l` below this gap are treated as equality constraints.
pub const EQUALITY_GAP: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
    #[error("non-finite data: {0}")]
    NonFinite(String),
}

pub type ProblemResult<T> = Result<T, ProblemError>;

/// Compressed sparse column matrix. Row indices are required to be strictly
/// increasing within each column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CscMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<usize>,
    pub data: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: Real,
{
    /// A matrix of the given shape with no stored entries.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            indptr: vec![0; ncols + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut indptr = Vec::with_capacity(n + 1);
        let mut indices = Vec::with_capacity(n);
        let mut data = Vec::with_capacity(n);
        indptr.push(0);
        for i in 0..n {
            indices.push(i);
            data.push(T::one());
            indptr.push(indices.len());
        }
        Self {
            nrows: n,
            ncols: n,
            indptr,
            indices,
            data,
        }
    }

    /// Builds a CSC matrix from a row-major dense slice, dropping exact zeros.
    pub fn from_dense(nrows: usize, ncols: usize, entries: &[T]) -> Self {
        assert_eq!(entries.len(), nrows * ncols, "dense shape mismatch");
        let mut indptr = Vec::with_capacity(ncols + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for col in 0..ncols {
            for row in 0..nrows {
                let value = entries[row * ncols + col];
                if value != T::zero() {
                    indices.push(row);
                    data.push(value);
                }
            }
            indptr.push(indices.len());
        }
        Self {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        }
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if self.indptr.len() != self.ncols + 1 {
            return Err(ProblemError::DimensionMismatch(format!(
                "indptr length {} != ncols + 1 ({})",
                self.indptr.len(),
                self.ncols + 1
            )));
        }
        if self.indices.len() != self.data.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "indices length {} != data length {}",
                self.indices.len(),
                self.data.len()
            )));
        }
        if self.indptr[0] != 0 || self.indptr[self.ncols] != self.indices.len() {
            return Err(ProblemError::InvalidStructure(
                "indptr must start at 0 and end at nnz".into(),
            ));
        }
        for col in 0..self.ncols {
            let start = self.indptr[col];
            let end = self.indptr[col + 1];
            if end < start {
                return Err(ProblemError::InvalidStructure(format!(
                    "indptr decreases at column {col}"
                )));
            }
            for idx in start..end {
                if self.indices[idx] >= self.nrows {
                    return Err(ProblemError::InvalidStructure(format!(
                        "row index {} out of range in column {col}",
                        self.indices[idx]
                    )));
                }
                if idx > start && self.indices[idx] <= self.indices[idx - 1] {
                    return Err(ProblemError::InvalidStructure(format!(
                        "row indices not strictly increasing in column {col}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// out = M x
    pub fn mul_vec(&self, x: &[T], out: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(out.len(), self.nrows);
        for value in out.iter_mut() {
            *value = T::zero();
        }
        for col in 0..self.ncols {
            let xc = x[col];
            for idx in self.indptr[col]..self.indptr[col + 1] {
                out[self.indices[idx]] += self.data[idx] * xc;
            }
        }
    }

    /// out = Mᵀ x
    pub fn mul_vec_t(&self, x: &[T], out: &mut [T]) {
        assert_eq!(x.len(), self.nrows);
        assert_eq!(out.len(), self.ncols);
        for col in 0..self.ncols {
            let mut acc = T::zero();
            for idx in self.indptr[col]..self.indptr[col + 1] {
                acc += self.data[idx] * x[self.indices[idx]];
            }
            out[col] = acc;
        }
    }

    /// CSC transpose via counting sort; columns of the result stay sorted.
    pub fn transpose(&self) -> CscMatrix<T> {
        let mut indptr = vec![0usize; self.nrows + 1];
        for &row in &self.indices {
            indptr[row + 1] += 1;
        }
        for i in 0..self.nrows {
            indptr[i + 1] += indptr[i];
        }
        let mut cursor = indptr.clone();
        let mut indices = vec![0usize; self.nnz()];
        let mut data = vec![T::zero(); self.nnz()];
        for col in 0..self.ncols {
            for idx in self.indptr[col]..self.indptr[col + 1] {
                let row = self.indices[idx];
                let dest = cursor[row];
                indices[dest] = col;
                data[dest] = self.data[idx];
                cursor[row] += 1;
            }
        }
        CscMatrix {
            nrows: self.ncols,
            ncols: self.nrows,
            indptr,
            indices,
            data,
        }
    }

    pub fn to_csmat(&self) -> ProblemResult<CsMat<T>> {
        self.validate()?;
        Ok(CsMat::new_csc(
            (self.nrows, self.ncols),
            self.indptr.clone(),
            self.indices.clone(),
            self.data.clone(),
        ))
    }

    pub fn from_csmat(matrix: &CsMat<T>) -> Self {
        let csc = matrix.to_csc();
        let (nrows, ncols) = csc.shape();
        let mut indptr = Vec::with_capacity(ncols + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for column in csc.outer_iterator() {
            for (row, value) in column.iter() {
                indices.push(row);
                data.push(*value);
            }
            indptr.push(indices.len());
        }
        Self {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        }
    }
}

/// Convex quadratic program
///
/// ```text
/// minimize   ½ xᵀ P x + qᵀ x
/// subject to l ≤ A x ≤ u
/// ```
///
/// `p` must be symmetric positive semidefinite with both triangles stored.
/// Bound entries may be ±∞ (or any magnitude beyond [`LOOSE_BOUNDS_LIMIT`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem<T> {
    pub p: CscMatrix<T>,
    pub q: Vec<T>,
    pub a: CscMatrix<T>,
    pub l: Vec<T>,
    pub u: Vec<T>,
}

impl<T> Problem<T>
where
    T: Real,
{
    pub fn nvars(&self) -> usize {
        self.q.len()
    }

    pub fn nconstr(&self) -> usize {
        self.a.nrows
    }

    /// ½ xᵀ P x + qᵀ x at the given point.
    pub fn objective(&self, x: &[T]) -> T {
        let mut px = vec![T::zero(); self.nvars()];
        self.p.mul_vec(x, &mut px);
        let half = T::from_f64(0.5).unwrap();
        half * crate::math::dot(x, &px) + crate::math::dot(&self.q, x)
    }

    pub fn validate(&self) -> ProblemResult<()> {
        let n = self.nvars();
        let m = self.nconstr();
        self.p.validate()?;
        self.a.validate()?;
        if self.p.nrows != n || self.p.ncols != n {
            return Err(ProblemError::DimensionMismatch(format!(
                "quadratic matrix is {}x{}, expected {n}x{n}",
                self.p.nrows, self.p.ncols
            )));
        }
        if self.a.ncols != n {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint matrix has {} columns, expected {n}",
                self.a.ncols
            )));
        }
        if self.l.len() != m || self.u.len() != m {
            return Err(ProblemError::DimensionMismatch(format!(
                "bound lengths {}/{} != constraint rows {m}",
                self.l.len(),
                self.u.len()
            )));
        }
        for (name, values) in [("P", &self.p.data), ("A", &self.a.data), ("q", &self.q)] {
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(ProblemError::NonFinite(format!(
                    "{name} contains a non-finite entry at position {i}"
                )));
            }
        }
        for (i, (&lo, &hi)) in self.l.iter().zip(self.u.iter()).enumerate() {
            if lo.is_nan() || hi.is_nan() {
                return Err(ProblemError::NonFinite(format!("NaN bound at row {i}")));
            }
            if lo == T::infinity() || hi == T::neg_infinity() {
                return Err(ProblemError::InvalidStructure(format!(
                    "bound at row {i} is infinite on the closed side"
                )));
            }
            if lo > hi {
                return Err(ProblemError::InvalidStructure(format!(
                    "lower bound exceeds upper bound at row {i}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-row constraint classification, derived once per solve from (l, u).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Inequality,
    Equality,
    LooseBounds,
}

pub fn classify_constraints<T: Real>(l: &[T], u: &[T]) -> Vec<ConstraintKind> {
    assert_eq!(l.len(), u.len());
    let loose = T::from_f64(LOOSE_BOUNDS_LIMIT).unwrap();
    let gap = T::from_f64(EQUALITY_GAP).unwrap();
    l.iter()
        .zip(u.iter())
        .map(|(&lo, &hi)| {
            if lo < -loose && hi > loose {
                ConstraintKind::LooseBounds
            } else if hi - lo < gap {
                ConstraintKind::Equality
            } else {
                ConstraintKind::Inequality
            }
        })
        .collect()
}

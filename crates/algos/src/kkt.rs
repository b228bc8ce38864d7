use quadrs_core::math::Real;
use quadrs_core::problem::CscMatrix;

/// The symmetric KKT matrix of the ADMM subproblem,
///
/// ```text
/// M = [ P + σI      Aᵀ       ]
///     [   A      −diag(ρ⁻¹)  ]
/// ```
///
/// assembled directly in CSC form with both triangles stored. The sparsity
/// pattern depends only on P and A, so a penalty change rewrites the m
/// trailing diagonal entries in place and leaves the pattern untouched.
pub struct KktMatrix<T: Real> {
    n: usize,
    m: usize,
    mat: CscMatrix<T>,
    /// Data offsets of the −ρ⁻¹ diagonal entries, one per constraint row.
    rho_offsets: Vec<usize>,
}

impl<T> KktMatrix<T>
where
    T: Real,
{
    /// Assembles M from validated problem data. `p` must carry both triangles
    /// and sorted columns; the σ-shifted diagonal is inserted whether or not
    /// P stores an explicit diagonal.
    pub fn build(p: &CscMatrix<T>, a: &CscMatrix<T>, sigma: T, rho_inv: &[T]) -> Self {
        let n = p.ncols;
        let m = a.nrows;
        assert_eq!(p.nrows, n, "P must be square");
        assert_eq!(a.ncols, n, "A column count must match P");
        assert_eq!(rho_inv.len(), m);

        let at = a.transpose();
        let dim = n + m;
        let mut indptr = Vec::with_capacity(dim + 1);
        let mut indices = Vec::with_capacity(p.nnz() + 2 * a.nnz() + dim);
        let mut data = Vec::with_capacity(p.nnz() + 2 * a.nnz() + dim);
        let mut rho_offsets = Vec::with_capacity(m);
        indptr.push(0);

        // Left block columns: P + σI stacked over A.
        for j in 0..n {
            let mut wrote_diag = false;
            for idx in p.indptr[j]..p.indptr[j + 1] {
                let row = p.indices[idx];
                let value = p.data[idx];
                if row == j {
                    indices.push(j);
                    data.push(value + sigma);
                    wrote_diag = true;
                } else {
                    if row > j && !wrote_diag {
                        indices.push(j);
                        data.push(sigma);
                        wrote_diag = true;
                    }
                    indices.push(row);
                    data.push(value);
                }
            }
            if !wrote_diag {
                indices.push(j);
                data.push(sigma);
            }
            for idx in a.indptr[j]..a.indptr[j + 1] {
                indices.push(n + a.indices[idx]);
                data.push(a.data[idx]);
            }
            indptr.push(indices.len());
        }

        // Right block columns: Aᵀ over the −diag(ρ⁻¹) trailing block.
        for i in 0..m {
            for idx in at.indptr[i]..at.indptr[i + 1] {
                indices.push(at.indices[idx]);
                data.push(at.data[idx]);
            }
            rho_offsets.push(data.len());
            indices.push(n + i);
            data.push(-rho_inv[i]);
            indptr.push(indices.len());
        }

        Self {
            n,
            m,
            mat: CscMatrix {
                nrows: dim,
                ncols: dim,
                indptr,
                indices,
                data,
            },
            rho_offsets,
        }
    }

    pub fn matrix(&self) -> &CscMatrix<T> {
        &self.mat
    }

    pub fn dim(&self) -> usize {
        self.n + self.m
    }

    /// Rewrites the −diag(ρ⁻¹) block in place after a penalty update.
    pub fn update_rho(&mut self, rho_inv: &[T]) {
        assert_eq!(rho_inv.len(), self.m);
        for (i, &offset) in self.rho_offsets.iter().enumerate() {
            self.mat.data[offset] = -rho_inv[i];
        }
    }
}

/// Fills the length-(n+m) KKT right-hand side
///
/// ```text
/// rhs = [ σ·x − q, z − ρ⁻¹ ⊙ y ].
/// ```
pub fn form_rhs<T: Real>(
    sigma: T,
    x: &[T],
    q: &[T],
    z: &[T],
    rho_inv: &[T],
    y: &[T],
    rhs: &mut [T],
) {
    let n = x.len();
    let m = z.len();
    assert_eq!(rhs.len(), n + m);
    for i in 0..n {
        rhs[i] = sigma * x[i] - q[i];
    }
    for i in 0..m {
        rhs[n + i] = z[i] - rho_inv[i] * y[i];
    }
}

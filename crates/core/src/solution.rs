use crate::math::Real;
use crate::stats::SolveStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Solved,
    MaxIter,
}

/// Outcome of the most recent solve. Meaningful only after `solve` returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolveInfo<T> {
    pub status: Status,
    /// Post-loop iteration count: the loop counter is incremented before the
    /// exit test, so this equals `max_iter + 1` when the cap was hit.
    pub iter: usize,
    pub res_prim: T,
    pub res_dual: T,
}

impl<T> Default for SolveInfo<T>
where
    T: Real,
{
    fn default() -> Self {
        Self {
            status: Status::MaxIter,
            iter: 0,
            res_prim: T::infinity(),
            res_dual: T::infinity(),
        }
    }
}

/// Snapshot returned by the one-shot facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution<T: Real> {
    pub primal: Vec<T>,
    pub dual: Vec<T>,
    pub slack: Vec<T>,
    pub objective_value: T,
    pub info: SolveInfo<T>,
    pub stats: SolveStats<T>,
}

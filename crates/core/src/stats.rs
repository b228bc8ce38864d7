use crate::math::Real;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One row of the solve history, recorded at every termination check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord<T> {
    pub iteration: usize,
    pub objective: T,
    pub res_prim: T,
    pub res_dual: T,
    pub rho: T,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveStats<T: Real> {
    pub history: Vec<IterationRecord<T>>,
    pub solve_time: Duration,
    pub factorizations: usize,
    pub linear_solves: usize,
}

impl<T> SolveStats<T>
where
    T: Real,
{
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            solve_time: Duration::ZERO,
            factorizations: 0,
            linear_solves: 0,
        }
    }

    pub fn push(&mut self, record: IterationRecord<T>) {
        self.history.push(record);
    }
}

impl<T> Default for SolveStats<T>
where
    T: Real,
{
    fn default() -> Self {
        Self::new()
    }
}

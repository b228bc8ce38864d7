use anyhow::Result;
use num_traits::FromPrimitive;
use quadrs_core::math::{dot, norm_inf, norm_inf_diff, project_interval, Real, Stopwatch};
use quadrs_core::options::Settings;
use quadrs_core::problem::{classify_constraints, ConstraintKind, Problem, ProblemError};
use quadrs_core::solution::{SolveInfo, Status};
use quadrs_core::stats::{IterationRecord, SolveStats};
use quadrs_core::traits::KktSolver;
use quadrs_linsys::LdlKktSolver;
use tracing::debug;

use crate::kkt::{form_rhs, KktMatrix};

pub const RHO_MIN: f64 = 1e-6;
pub const RHO_MAX: f64 = 1e6;
/// Penalty multiplier for rows classified as equality constraints.
pub const RHO_EQ_SCALE: f64 = 1e3;
/// Regularizer guarding the divisions in the penalty estimate.
pub const DIV_BY_ZERO_REGUL: f64 = 1e-10;

/// ADMM solver for convex QPs using the OSQP splitting.
///
/// The solver is sized at construction; every [`AdmmSolver::solve`] call must
/// pass a problem with matching dimensions. Iterates persist across calls so
/// a warm-started solve continues from the previous solution.
pub struct AdmmSolver<T: Real, L: KktSolver<T> = LdlKktSolver<T>> {
    n: usize,
    m: usize,
    settings: Settings<T>,
    info: SolveInfo<T>,
    stats: SolveStats<T>,

    // iterates
    x: Vec<T>,
    z: Vec<T>,
    y: Vec<T>,
    x_tilde: Vec<T>,
    z_tilde: Vec<T>,
    z_prev: Vec<T>,

    // penalty state
    rho: T,
    rho_vec: Vec<T>,
    rho_inv_vec: Vec<T>,
    constr_type: Vec<ConstraintKind>,

    iter: usize,
    res_prim: T,
    res_dual: T,
    // scale references cached by the residual update
    max_ax_z_norm: T,
    max_px_aty_q_norm: T,

    // preallocated work vectors
    rhs: Vec<T>,
    ax: Vec<T>,
    px: Vec<T>,
    aty: Vec<T>,

    linear_solver: L,
}

impl<T> AdmmSolver<T, LdlKktSolver<T>>
where
    T: Real + FromPrimitive,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self::with_solver(n, m, LdlKktSolver::new())
    }
}

impl<T, L> AdmmSolver<T, L>
where
    T: Real + FromPrimitive,
    L: KktSolver<T>,
{
    pub fn with_solver(n: usize, m: usize, linear_solver: L) -> Self {
        Self {
            n,
            m,
            settings: Settings::default(),
            info: SolveInfo::default(),
            stats: SolveStats::new(),
            x: vec![T::zero(); n],
            z: vec![T::zero(); m],
            y: vec![T::zero(); m],
            x_tilde: vec![T::zero(); n],
            z_tilde: vec![T::zero(); m],
            z_prev: vec![T::zero(); m],
            rho: T::zero(),
            rho_vec: vec![T::zero(); m],
            rho_inv_vec: vec![T::zero(); m],
            constr_type: vec![ConstraintKind::Inequality; m],
            iter: 0,
            res_prim: T::infinity(),
            res_dual: T::infinity(),
            max_ax_z_norm: T::zero(),
            max_px_aty_q_norm: T::zero(),
            rhs: vec![T::zero(); n + m],
            ax: vec![T::zero(); m],
            px: vec![T::zero(); n],
            aty: vec![T::zero(); n],
            linear_solver,
        }
    }

    pub fn primal_solution(&self) -> &[T] {
        &self.x
    }

    pub fn dual_solution(&self) -> &[T] {
        &self.y
    }

    pub fn slack(&self) -> &[T] {
        &self.z
    }

    pub fn rho(&self) -> T {
        self.rho
    }

    pub fn info(&self) -> &SolveInfo<T> {
        &self.info
    }

    pub fn stats(&self) -> &SolveStats<T> {
        &self.stats
    }

    pub fn settings(&self) -> &Settings<T> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings<T> {
        &mut self.settings
    }

    /// Seeds the iterates for the next warm-started solve.
    pub fn warm_start(&mut self, x: &[T], z: &[T], y: &[T]) {
        self.x.copy_from_slice(x);
        self.z.copy_from_slice(z);
        self.y.copy_from_slice(y);
    }

    /// Runs the ADMM iteration to convergence or the iteration cap.
    ///
    /// Inputs are validated before any state is touched. A factorization
    /// failure aborts the solve; hitting the cap is not an error and is
    /// reported as [`Status::MaxIter`].
    pub fn solve(&mut self, problem: &Problem<T>) -> Result<()> {
        self.settings.validate()?;
        problem.validate()?;
        if problem.nvars() != self.n || problem.nconstr() != self.m {
            return Err(ProblemError::DimensionMismatch(format!(
                "problem is {}x{}, solver was sized for {}x{}",
                problem.nconstr(),
                problem.nvars(),
                self.m,
                self.n
            ))
            .into());
        }

        let timer = Stopwatch::new();
        self.stats = SolveStats::new();

        if !self.settings.warm_start {
            self.x.iter_mut().for_each(|v| *v = T::zero());
            self.z.iter_mut().for_each(|v| *v = T::zero());
            self.y.iter_mut().for_each(|v| *v = T::zero());
        }

        self.constr_type = classify_constraints(&problem.l, &problem.u);
        self.rho_update(self.settings.rho);

        let mut kkt = KktMatrix::build(
            &problem.p,
            &problem.a,
            self.settings.sigma,
            &self.rho_inv_vec,
        );
        self.linear_solver.compute(kkt.matrix())?;
        self.stats.factorizations += 1;

        let alpha = self.settings.alpha;
        let one_minus_alpha = T::one() - alpha;
        let max_iter = self.settings.max_iter;

        self.iter = 1;
        while self.iter <= max_iter {
            self.z_prev.copy_from_slice(&self.z);

            // x_tilde, z_tilde from the KKT solve; the tail of the solution
            // vector is the auxiliary dual ν
            form_rhs(
                self.settings.sigma,
                &self.x,
                &problem.q,
                &self.z_prev,
                &self.rho_inv_vec,
                &self.y,
                &mut self.rhs,
            );
            self.linear_solver.solve(&mut self.rhs)?;
            self.stats.linear_solves += 1;
            self.x_tilde.copy_from_slice(&self.rhs[..self.n]);
            for i in 0..self.m {
                let nu = self.rhs[self.n + i];
                self.z_tilde[i] = self.z_prev[i] + self.rho_inv_vec[i] * (nu - self.y[i]);
            }

            // relaxed x update
            for i in 0..self.n {
                self.x[i] = alpha * self.x_tilde[i] + one_minus_alpha * self.x[i];
            }

            // relaxed z update, projected onto [l, u]
            for i in 0..self.m {
                let relaxed = alpha * self.z_tilde[i]
                    + one_minus_alpha * self.z_prev[i]
                    + self.rho_inv_vec[i] * self.y[i];
                self.z[i] = project_interval(relaxed, problem.l[i], problem.u[i]);
            }

            // dual update
            for i in 0..self.m {
                let relaxed = alpha * self.z_tilde[i] + one_minus_alpha * self.z_prev[i];
                self.y[i] += self.rho_vec[i] * (relaxed - self.z[i]);
            }

            let cadence = self.settings.check_termination;
            let checked = cadence != 0 && self.iter % cadence == 0;
            if checked {
                self.update_state(problem);
                let half = T::from_f64(0.5).unwrap();
                let objective = half * dot(&self.x, &self.px) + dot(&problem.q, &self.x);
                self.stats.push(IterationRecord {
                    iteration: self.iter,
                    objective,
                    res_prim: self.res_prim,
                    res_dual: self.res_dual,
                    rho: self.rho,
                    elapsed: timer.elapsed(),
                });
                debug!(
                    iter = self.iter,
                    objective = objective.to_f64().unwrap_or(f64::NAN),
                    res_prim = self.res_prim.to_f64().unwrap_or(f64::NAN),
                    res_dual = self.res_dual.to_f64().unwrap_or(f64::NAN),
                    "termination check"
                );
                if self.termination_criteria() {
                    self.info.status = Status::Solved;
                    break;
                }
            }

            if self.settings.adaptive_rho && self.iter % self.settings.adaptive_rho_interval == 0 {
                if !checked {
                    self.update_state(problem);
                }
                let rho_new = self
                    .rho_estimate()
                    .max(T::from_f64(RHO_MIN).unwrap())
                    .min(T::from_f64(RHO_MAX).unwrap());
                if rho_new < self.rho / self.settings.adaptive_rho_tolerance
                    || rho_new > self.rho * self.settings.adaptive_rho_tolerance
                {
                    debug!(
                        iter = self.iter,
                        rho = rho_new.to_f64().unwrap_or(f64::NAN),
                        "penalty update"
                    );
                    self.rho_update(rho_new);
                    kkt.update_rho(&self.rho_inv_vec);
                    self.linear_solver.factorize(kkt.matrix())?;
                    self.stats.factorizations += 1;
                }
            }

            self.iter += 1;
        }

        if self.iter > max_iter {
            self.info.status = Status::MaxIter;
        }
        self.info.iter = self.iter;
        self.stats.solve_time = timer.elapsed();
        Ok(())
    }

    /// Rebuilds the per-row penalty and its inverse from a scalar penalty and
    /// the current classification.
    fn rho_update(&mut self, rho0: T) {
        let rho_min = T::from_f64(RHO_MIN).unwrap();
        let eq_scale = T::from_f64(RHO_EQ_SCALE).unwrap();
        for i in 0..self.m {
            self.rho_vec[i] = match self.constr_type[i] {
                ConstraintKind::LooseBounds => rho_min,
                ConstraintKind::Equality => eq_scale * rho0,
                ConstraintKind::Inequality => rho0,
            };
            self.rho_inv_vec[i] = T::one() / self.rho_vec[i];
        }
        self.rho = rho0;
    }

    /// Refreshes residuals and the infinity-norm scale references.
    fn update_state(&mut self, problem: &Problem<T>) {
        problem.a.mul_vec(&self.x, &mut self.ax);
        problem.p.mul_vec(&self.x, &mut self.px);
        problem.a.mul_vec_t(&self.y, &mut self.aty);

        let norm_ax = norm_inf(&self.ax);
        let norm_z = norm_inf(&self.z);
        self.max_ax_z_norm = norm_ax.max(norm_z);

        let norm_px = norm_inf(&self.px);
        let norm_aty = norm_inf(&self.aty);
        let norm_q = norm_inf(&problem.q);
        self.max_px_aty_q_norm = norm_px.max(norm_aty).max(norm_q);

        let res_prim = norm_inf_diff(&self.ax, &self.z);
        let mut res_dual = T::zero();
        for i in 0..self.n {
            res_dual = res_dual.max((self.px[i] + problem.q[i] + self.aty[i]).abs());
        }
        self.res_prim = res_prim;
        self.res_dual = res_dual;
        self.info.res_prim = res_prim;
        self.info.res_dual = res_dual;
    }

    fn termination_criteria(&self) -> bool {
        let eps_prim = self.settings.eps_abs + self.settings.eps_rel * self.max_ax_z_norm;
        let eps_dual = self.settings.eps_abs + self.settings.eps_rel * self.max_px_aty_q_norm;
        self.res_prim <= eps_prim && self.res_dual <= eps_dual
    }

    /// Penalty balancing the normalized primal and dual residuals.
    fn rho_estimate(&self) -> T {
        let regul = T::from_f64(DIV_BY_ZERO_REGUL).unwrap();
        let rp = self.res_prim / (self.max_ax_z_norm + regul);
        let rd = self.res_dual / (self.max_px_aty_q_norm + regul);
        self.rho * (rp / (rd + regul)).sqrt()
    }
}

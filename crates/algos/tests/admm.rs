use quadrs_algos::AdmmSolver;
use quadrs_core::math::Scalar;
use quadrs_core::problem::{CscMatrix, Problem};
use quadrs_core::solution::Status;

fn box_problem(q: Vec<Scalar>, lower: Scalar, upper: Scalar) -> Problem<Scalar> {
    let n = q.len();
    Problem {
        p: CscMatrix::identity(n),
        q,
        a: CscMatrix::identity(n),
        l: vec![lower; n],
        u: vec![upper; n],
    }
}

#[test]
fn unconstrained_quadratic() {
    let problem = Problem {
        p: CscMatrix::identity(2),
        q: vec![-2.0, -3.0],
        a: CscMatrix::identity(2),
        l: vec![Scalar::NEG_INFINITY; 2],
        u: vec![Scalar::INFINITY; 2],
    };
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    solver.solve(&problem).expect("solve");

    assert_eq!(solver.info().status, Status::Solved);
    let x = solver.primal_solution();
    assert!((x[0] - 2.0).abs() < 1e-3);
    assert!((x[1] - 3.0).abs() < 1e-3);
}

#[test]
fn equality_constrained() {
    let problem = Problem {
        p: CscMatrix::identity(2),
        q: vec![0.0, 0.0],
        a: CscMatrix::from_dense(1, 2, &[1.0, 1.0]),
        l: vec![1.0],
        u: vec![1.0],
    };
    let mut solver = AdmmSolver::<Scalar>::new(2, 1);
    solver.solve(&problem).expect("solve");

    assert_eq!(solver.info().status, Status::Solved);
    let x = solver.primal_solution();
    assert!((x[0] - 0.5).abs() < 1e-3);
    assert!((x[1] - 0.5).abs() < 1e-3);
    // stationarity pins the multiplier of the sum constraint
    assert!((solver.dual_solution()[0] + 0.5).abs() < 1e-2);
}

#[test]
fn box_constrained_actives_upper_bounds() {
    let problem = box_problem(vec![-1.0, -1.0], 0.0, 0.5);
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    solver.solve(&problem).expect("solve");

    assert_eq!(solver.info().status, Status::Solved);
    let x = solver.primal_solution();
    assert!((x[0] - 0.5).abs() < 1e-2);
    assert!((x[1] - 0.5).abs() < 1e-2);
    for &yi in solver.dual_solution() {
        assert!(yi >= -1e-6, "upper-bound multiplier must be nonnegative");
    }
    for (i, &zi) in solver.slack().iter().enumerate() {
        assert!(zi >= problem.l[i] && zi <= problem.u[i]);
    }
}

#[test]
fn tight_equality_at_origin() {
    let problem = Problem {
        p: CscMatrix::identity(2),
        q: vec![0.0, 0.0],
        a: CscMatrix::from_dense(1, 2, &[1.0, 1.0]),
        l: vec![0.0],
        u: vec![0.0],
    };
    let mut solver = AdmmSolver::<Scalar>::new(2, 1);
    solver.solve(&problem).expect("solve");

    assert_eq!(solver.info().status, Status::Solved);
    let x = solver.primal_solution();
    assert!(x[0].abs() < 1e-6);
    assert!(x[1].abs() < 1e-6);
}

#[test]
fn iteration_cap_reports_post_loop_count() {
    let problem = box_problem(vec![-1.0, -1.0], 0.0, 0.5);
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    solver.settings_mut().max_iter = 1;
    solver.solve(&problem).expect("solve");

    assert_eq!(solver.info().status, Status::MaxIter);
    assert_eq!(solver.info().iter, 2);
    for &v in solver
        .primal_solution()
        .iter()
        .chain(solver.slack())
        .chain(solver.dual_solution())
    {
        assert!(v.is_finite());
    }
}

#[test]
fn adaptive_rho_recovers_from_oversized_penalty() {
    let problem = Problem {
        p: CscMatrix::identity(2),
        q: vec![-2.0, -3.0],
        a: CscMatrix::identity(2),
        l: vec![-10.0, -10.0],
        u: vec![10.0, 10.0],
    };

    let mut fixed = AdmmSolver::<Scalar>::new(2, 2);
    fixed.settings_mut().rho = 1000.0;
    fixed.solve(&problem).expect("solve");
    assert_eq!(fixed.info().status, Status::MaxIter);

    let mut adaptive = AdmmSolver::<Scalar>::new(2, 2);
    adaptive.settings_mut().rho = 1000.0;
    adaptive.settings_mut().adaptive_rho = true;
    adaptive.solve(&problem).expect("solve");

    assert_eq!(adaptive.info().status, Status::Solved);
    assert!(adaptive.info().iter < fixed.info().iter);
    assert!(adaptive.rho() < 1000.0 / 5.0, "penalty must have decreased");
    assert!(adaptive.stats().factorizations >= 2);
}

#[test]
fn adaptive_rho_changes_only_on_its_cadence() {
    let problem = Problem {
        p: CscMatrix::identity(2),
        q: vec![-2.0, -3.0],
        a: CscMatrix::identity(2),
        l: vec![-10.0, -10.0],
        u: vec![10.0, 10.0],
    };
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    {
        let settings = solver.settings_mut();
        settings.rho = 1000.0;
        settings.adaptive_rho = true;
        settings.adaptive_rho_interval = 10;
        settings.check_termination = 1;
    }
    solver.solve(&problem).expect("solve");

    let history = &solver.stats().history;
    assert!(history.len() >= 2);
    let mut changed = false;
    for pair in history.windows(2) {
        if pair[0].rho != pair[1].rho {
            changed = true;
            assert_eq!(
                pair[0].iteration % 10,
                0,
                "penalty changed off the adaptation cadence"
            );
        }
    }
    assert!(changed, "expected at least one penalty change");
}

#[test]
fn warm_start_is_nearly_stationary_at_the_solution() {
    let problem = box_problem(vec![-1.0, -1.0], 0.0, 0.5);
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    solver.settings_mut().eps_abs = 1e-6;
    solver.settings_mut().eps_rel = 1e-6;
    solver.solve(&problem).expect("solve");
    assert_eq!(solver.info().status, Status::Solved);

    let x_star = solver.primal_solution().to_vec();
    let z_star = solver.slack().to_vec();
    let y_star = solver.dual_solution().to_vec();

    solver.settings_mut().warm_start = true;
    solver.settings_mut().max_iter = 1;
    solver.solve(&problem).expect("solve");

    for (after, before) in solver
        .primal_solution()
        .iter()
        .zip(x_star.iter())
        .chain(solver.slack().iter().zip(z_star.iter()))
        .chain(solver.dual_solution().iter().zip(y_star.iter()))
    {
        assert!((after - before).abs() < 1e-3);
    }
}

#[test]
fn solved_iterates_satisfy_the_tolerances() {
    let problem = box_problem(vec![-1.0, -1.0], 0.0, 0.5);
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    solver.solve(&problem).expect("solve");
    assert_eq!(solver.info().status, Status::Solved);

    let x = solver.primal_solution();
    let z = solver.slack();
    let y = solver.dual_solution();
    let (eps_abs, eps_rel) = (solver.settings().eps_abs, solver.settings().eps_rel);

    let mut ax = vec![0.0; 2];
    problem.a.mul_vec(x, &mut ax);
    let mut px = vec![0.0; 2];
    problem.p.mul_vec(x, &mut px);
    let mut aty = vec![0.0; 2];
    problem.a.mul_vec_t(y, &mut aty);

    let norm_inf = |v: &[Scalar]| v.iter().fold(0.0 as Scalar, |acc, e| acc.max(e.abs()));
    let res_prim = ax
        .iter()
        .zip(z.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, Scalar::max);
    let res_dual = px
        .iter()
        .zip(problem.q.iter())
        .zip(aty.iter())
        .map(|((p, q), a)| (p + q + a).abs())
        .fold(0.0, Scalar::max);

    assert!(res_prim <= eps_abs + eps_rel * norm_inf(&ax).max(norm_inf(z)));
    assert!(
        res_dual
            <= eps_abs + eps_rel * norm_inf(&px).max(norm_inf(&aty)).max(norm_inf(&problem.q))
    );
}

#[test]
fn seeded_warm_start_converges_at_the_first_check() {
    let problem = box_problem(vec![-1.0, -1.0], 0.0, 0.5);
    let mut cold = AdmmSolver::<Scalar>::new(2, 2);
    cold.settings_mut().eps_abs = 1e-6;
    cold.settings_mut().eps_rel = 1e-6;
    cold.solve(&problem).expect("solve");
    assert_eq!(cold.info().status, Status::Solved);

    let mut warm = AdmmSolver::<Scalar>::new(2, 2);
    warm.settings_mut().warm_start = true;
    warm.warm_start(
        cold.primal_solution(),
        cold.slack(),
        cold.dual_solution(),
    );
    warm.solve(&problem).expect("solve");

    assert_eq!(warm.info().status, Status::Solved);
    assert_eq!(warm.info().iter, warm.settings().check_termination);
}

#[test]
fn disabled_termination_check_runs_to_the_cap() {
    let problem = box_problem(vec![-1.0, -1.0], 0.0, 0.5);
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    solver.settings_mut().check_termination = 0;
    solver.settings_mut().max_iter = 50;
    solver.solve(&problem).expect("solve");

    assert_eq!(solver.info().status, Status::MaxIter);
    assert_eq!(solver.info().iter, 51);
    assert!(solver.stats().history.is_empty());
}

#[test]
fn solve_twice_without_warm_start_matches() {
    let problem = box_problem(vec![-1.0, -1.0], 0.0, 0.5);
    let mut solver = AdmmSolver::<Scalar>::new(2, 2);
    solver.solve(&problem).expect("solve");
    let first = solver.primal_solution().to_vec();
    let first_iters = solver.info().iter;

    solver.solve(&problem).expect("solve");
    assert_eq!(solver.info().iter, first_iters);
    for (a, b) in solver.primal_solution().iter().zip(first.iter()) {
        assert_eq!(a, b, "cold solves must be deterministic");
    }
}

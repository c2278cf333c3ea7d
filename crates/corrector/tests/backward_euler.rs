//! Backward Euler steps driven through the corrector with the reference
//! solvers.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use stiff_core::{
    CallbackError, ConvFail, LinearSolver, NonlinearSolver, OdeRhs, SetupInput, SolveInput,
    Vector,
};
use stiff_corrector::{
    CorrectFlag, CorrectorConfig, CorrectorMem, Integrator, IntegratorState, Outcome,
};
use stiff_solvers::{Dense, FixedPoint, Newton};

/// `y' = diag(-1, -100) y`
fn stiff_rhs(_t: f64, y: &Vector, ydot: &mut Vector) -> Result<(), CallbackError> {
    ydot[0] = -y[0];
    ydot[1] = -100.0 * y[1];
    Ok(())
}

/// Linear solver wrapper that records the failure flag of every setup.
struct Watched<L> {
    inner: L,
    conv_fails: Rc<RefCell<Vec<ConvFail>>>,
}

impl<L: LinearSolver> LinearSolver for Watched<L> {
    fn setup(
        &mut self,
        input: &SetupInput<'_>,
        scratch: &mut [Vector; 3],
    ) -> Result<bool, CallbackError> {
        self.conv_fails.borrow_mut().push(input.conv_fail);
        self.inner.setup(input, scratch)
    }

    fn solve(&mut self, b: &mut Vector, input: &SolveInput<'_>) -> Result<(), CallbackError> {
        self.inner.solve(b, input)
    }
}

/// Sets up the order-one prediction and coefficients for a step of size `h`.
fn predict(state: &mut IntegratorState, rhs: &mut impl OdeRhs, y: &Vector, h: f64) {
    let mut fy = Vector::zeros(y.len());
    rhs.rhs(state.tn, y, &mut fy).expect("rhs succeeds");

    state.zn[1] = fy * h;
    state.zn[0] = y + &state.zn[1];

    state.gamma_ratio = if state.counters.steps > 0 {
        h / state.gamma_prev
    } else {
        1.0
    };
    state.h = h;
    state.gamma = h;
    state.rl1 = 1.0;
    state.tn += h;
}

/// Takes one step and returns the number of corrector iterations.
fn step(integrator: &mut Integrator, rhs: &mut impl OdeRhs, h: f64, tol: f64) -> usize {
    let y = integrator.state().y.clone();
    predict(integrator.state_mut(), rhs, &y, h);

    let outcome = integrator
        .correct(CorrectFlag::FirstCall, tol)
        .expect("no fatal failure");
    let Outcome::Converged { iterations } = outcome else {
        panic!("step did not converge: {outcome:?}");
    };

    integrator.state_mut().counters.steps += 1;
    iterations
}

#[test]
fn newton_with_dense_solver_matches_backward_euler() {
    let jac_evals = Rc::new(Cell::new(0));
    let counter = Rc::clone(&jac_evals);
    let jacobian = move |_t: f64,
                         _y: &Vector,
                         _fy: &Vector,
                         jac: &mut DMatrix<f64>|
          -> Result<(), CallbackError> {
        counter.set(counter.get() + 1);
        jac[(0, 0)] = -1.0;
        jac[(1, 1)] = -100.0;
        Ok(())
    };

    let mut state = IntegratorState::new(2);
    state.y = Vector::from_vec(vec![1.0, 1.0]);

    let mem = CorrectorMem::new(state, stiff_rhs)
        .with_linear_solver(Dense::new(2, jacobian))
        .with_reporter(());
    let mut integrator = Integrator::new(mem);
    integrator
        .set_nonlinear_solver(Box::new(Newton::new(2)))
        .expect("newton should bind");
    integrator.init_nonlinear_solver().expect("should initialize");

    let mut rhs = stiff_rhs;
    let mut expected = [1.0_f64, 1.0];

    for _ in 0..3 {
        let iterations = step(&mut integrator, &mut rhs, 0.01, 1e-6);
        assert_eq!(iterations, 2);

        expected[0] /= 1.01;
        expected[1] /= 2.0;
        assert_relative_eq!(integrator.state().y[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(integrator.state().y[1], expected[1], epsilon = 1e-12);
    }

    assert_eq!(integrator.state().counters.linear_setups, 1);
    assert_eq!(jac_evals.get(), 1);

    // Halving the step forces a new matrix but reuses the Jacobian.
    for _ in 0..2 {
        step(&mut integrator, &mut rhs, 0.005, 1e-6);

        expected[0] /= 1.005;
        expected[1] /= 1.5;
        assert_relative_eq!(integrator.state().y[0], expected[0], epsilon = 1e-12);
        assert_relative_eq!(integrator.state().y[1], expected[1], epsilon = 1e-12);
    }

    assert_eq!(integrator.state().counters.linear_setups, 2);
    assert_eq!(jac_evals.get(), 1);
}

#[test]
fn fixed_point_converges_on_a_mild_problem() {
    let mut decay = |_t: f64, y: &Vector, ydot: &mut Vector| -> Result<(), CallbackError> {
        ydot.copy_from(y);
        *ydot *= -1.0;
        Ok(())
    };

    let mut state = IntegratorState::new(1);
    state.y[0] = 1.0;

    let config = CorrectorConfig::new(10, 0.3, 2.0, 0.3, 20).expect("valid config");
    let mem = CorrectorMem::new(state, decay)
        .with_config(config)
        .with_reporter(());
    let mut integrator = Integrator::new(mem);
    integrator
        .set_nonlinear_solver(Box::new(FixedPoint::new(1)))
        .expect("fixed point should bind");
    integrator.init_nonlinear_solver().expect("should initialize");

    let mut expected = 1.0_f64;
    for _ in 0..4 {
        step(&mut integrator, &mut decay, 0.05, 1e-10);
        expected /= 1.05;
        assert_relative_eq!(integrator.state().y[0], expected, epsilon = 1e-9);
    }

    assert_eq!(integrator.state().counters.linear_setups, 0);
}

#[test]
fn stale_jacobian_is_refreshed_within_one_attempt() {
    // y' = -lambda y, with lambda jumping from 1 to 1000 after the first step.
    let lambda = Rc::new(Cell::new(1.0_f64));
    let jac_evals = Rc::new(Cell::new(0));

    let rhs = {
        let lambda = Rc::clone(&lambda);
        move |_t: f64, y: &Vector, ydot: &mut Vector| -> Result<(), CallbackError> {
            ydot.copy_from(y);
            *ydot *= -lambda.get();
            Ok(())
        }
    };
    let jacobian = {
        let lambda = Rc::clone(&lambda);
        let counter = Rc::clone(&jac_evals);
        move |_t: f64,
              _y: &Vector,
              _fy: &Vector,
              jac: &mut DMatrix<f64>|
              -> Result<(), CallbackError> {
            counter.set(counter.get() + 1);
            jac[(0, 0)] = -lambda.get();
            Ok(())
        }
    };

    let conv_fails = Rc::new(RefCell::new(Vec::new()));
    let lsolver = Watched {
        inner: Dense::new(1, jacobian),
        conv_fails: Rc::clone(&conv_fails),
    };

    let mut state = IntegratorState::new(1);
    state.y[0] = 1.0;

    let mem = CorrectorMem::new(state, rhs.clone())
        .with_linear_solver(lsolver)
        .with_reporter(());
    let mut integrator = Integrator::new(mem);
    integrator
        .set_nonlinear_solver(Box::new(Newton::new(1)))
        .expect("newton should bind");
    integrator.init_nonlinear_solver().expect("should initialize");

    let mut rhs = rhs;
    let h = 0.01;

    step(&mut integrator, &mut rhs, h, 1e-6);
    let y1 = 1.0 / 1.01;
    assert_relative_eq!(integrator.state().y[0], y1, epsilon = 1e-12);
    assert_eq!(jac_evals.get(), 1);

    // The saved matrix I + h now diverges; Newton retries with a bad-Jacobian
    // setup, which makes the dense solver re-evaluate at the new stiffness.
    lambda.set(1000.0);
    let iterations = step(&mut integrator, &mut rhs, h, 1e-6);

    assert_eq!(iterations, 2);
    assert_relative_eq!(integrator.state().y[0], y1 / 11.0, epsilon = 1e-12);
    assert_eq!(
        *conv_fails.borrow(),
        vec![ConvFail::NoFailures, ConvFail::BadJacobian]
    );
    assert_eq!(jac_evals.get(), 2);
    assert_eq!(integrator.state().counters.linear_setups, 2);

    let solver = integrator.nonlinear_solver().expect("newton is bound");
    assert_eq!(solver.convergence_failures(), 1);
}

//! Direct iteration for fixed-point problems `G(y) = y`.
//!
//! Each iteration evaluates `g = G(y)`, takes `delta = g - y` as the
//! increment, sets `y = g`, and runs the wired convergence test on `delta`.
//! No linear solver is involved; linear setup and solve functions are
//! accepted and ignored so integrators can wire them unconditionally.

use stiff_core::{
    Capability, Convergence, ConvergenceTestFn, Failure, LinearSetupFn, LinearSolveFn, NlsError,
    NonlinearSolver, SolverType, Stage, SystemFn, Vector,
};

use crate::DEFAULT_MAX_ITERS;

/// Fixed-point solver for [`SolverType::FixedPoint`] problems.
pub struct FixedPoint<C> {
    gy: Vector,
    delta: Vector,
    sys: Option<SystemFn<C>>,
    ctest: Option<ConvergenceTestFn<C>>,
    max_iters: usize,
    cur_iter: usize,
    total_iters: usize,
    conv_fails: usize,
}

impl<C> FixedPoint<C> {
    /// Creates a fixed-point solver for systems of dimension `dim`.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            gy: Vector::zeros(dim),
            delta: Vector::zeros(dim),
            sys: None,
            ctest: None,
            max_iters: DEFAULT_MAX_ITERS,
            cur_iter: 0,
            total_iters: 0,
            conv_fails: 0,
        }
    }

    /// Returns the iteration limit per solve.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    fn iterate(
        &mut self,
        sys: SystemFn<C>,
        ctest: ConvergenceTestFn<C>,
        ycor: &mut Vector,
        weights: &Vector,
        tol: f64,
        ctx: &mut C,
    ) -> Result<(), Failure> {
        for iter in 0..self.max_iters {
            self.cur_iter = iter;

            sys(ctx, ycor, &mut self.gy)?;

            self.delta.copy_from(&self.gy);
            self.delta -= &*ycor;
            ycor.copy_from(&self.gy);
            self.total_iters += 1;

            match ctest(ctx, iter, ycor, &self.delta, tol, weights)? {
                Convergence::Converged => return Ok(()),
                Convergence::Diverged => break,
                Convergence::Continue => {}
            }
        }

        Err(Failure::Recoverable(Stage::Convergence))
    }
}

impl<C> NonlinearSolver<C> for FixedPoint<C> {
    fn solver_type(&self) -> SolverType {
        SolverType::FixedPoint
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn initialize(&mut self) -> Result<(), NlsError> {
        if self.sys.is_none() {
            return Err(NlsError::MissingFunction("system"));
        }
        if self.ctest.is_none() {
            return Err(NlsError::MissingFunction("convergence test"));
        }
        self.cur_iter = 0;
        Ok(())
    }

    fn solve(
        &mut self,
        y0: &Vector,
        ycor: &mut Vector,
        weights: &Vector,
        tol: f64,
        _call_setup: bool,
        ctx: &mut C,
    ) -> Result<(), Failure> {
        let (Some(sys), Some(ctest)) = (self.sys, self.ctest) else {
            return Err(Failure::Fatal(Stage::Configuration));
        };

        if y0.len() != self.gy.len() || ycor.len() != self.gy.len() {
            log::debug!(
                "fixed point: sized for {} unknowns, called with {}",
                self.gy.len(),
                y0.len()
            );
            return Err(Failure::Fatal(Stage::Configuration));
        }

        ycor.copy_from(y0);

        let result = self.iterate(sys, ctest, ycor, weights, tol, ctx);
        if matches!(result, Err(Failure::Recoverable(_))) {
            self.conv_fails += 1;
        }
        result
    }

    fn set_system_fn(&mut self, f: SystemFn<C>) -> Result<(), NlsError> {
        self.sys = Some(f);
        Ok(())
    }

    fn set_convergence_test_fn(&mut self, f: ConvergenceTestFn<C>) -> Result<(), NlsError> {
        self.ctest = Some(f);
        Ok(())
    }

    fn set_linear_setup_fn(&mut self, _f: Option<LinearSetupFn<C>>) -> Result<(), NlsError> {
        Ok(())
    }

    fn set_linear_solve_fn(&mut self, _f: Option<LinearSolveFn<C>>) -> Result<(), NlsError> {
        Ok(())
    }

    fn set_max_iters(&mut self, max_iters: usize) -> Result<(), NlsError> {
        if max_iters == 0 {
            return Err(NlsError::InvalidMaxIters);
        }
        self.max_iters = max_iters;
        Ok(())
    }

    fn current_iteration(&self) -> usize {
        self.cur_iter
    }

    fn iterations(&self) -> usize {
        self.total_iters
    }

    fn convergence_failures(&self) -> usize {
        self.conv_fails
    }
}

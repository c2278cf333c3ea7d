//! Newton iteration for root-finding problems `F(y) = 0`.
//!
//! # Algorithm
//!
//! Starting from the initial guess, each iteration:
//!
//! 1. Solves `M delta = -F(y)` with the wired linear solve.
//! 2. Updates `y += delta`.
//! 3. Runs the wired convergence test on `delta`.
//! 4. Re-evaluates `F(y)` if more work is needed.
//!
//! The linear setup runs at most once per attempt, before the first
//! iteration, when the caller requests it. The matrix is otherwise frozen
//! for the whole solve (modified Newton).
//!
//! # Recovery
//!
//! If an attempt fails recoverably while the Jacobian was not current and a
//! setup function is wired, the solver retries once from the initial guess
//! with a fresh setup flagged as a bad Jacobian. Fatal failures are returned
//! immediately.


use stiff_core::{
    Capability, Convergence, ConvergenceTestFn, Failure, LinearSetupFn, LinearSolveFn, NlsError,
    NonlinearSolver, SolverType, Stage, SystemFn, Vector,
};

use crate::DEFAULT_MAX_ITERS;

/// Newton solver for [`SolverType::RootFind`] problems.
pub struct Newton<C> {
    delta: Vector,
    sys: Option<SystemFn<C>>,
    lsetup: Option<LinearSetupFn<C>>,
    lsolve: Option<LinearSolveFn<C>>,
    ctest: Option<ConvergenceTestFn<C>>,
    max_iters: usize,
    cur_iter: usize,
    jcur: bool,
    total_iters: usize,
    conv_fails: usize,
}

/// Functions a Newton attempt needs, resolved once per solve.
struct Wired<C> {
    sys: SystemFn<C>,
    lsetup: Option<LinearSetupFn<C>>,
    lsolve: LinearSolveFn<C>,
    ctest: ConvergenceTestFn<C>,
}

impl<C> Newton<C> {
    /// Creates a Newton solver for systems of dimension `dim`.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            delta: Vector::zeros(dim),
            sys: None,
            lsetup: None,
            lsolve: None,
            ctest: None,
            max_iters: DEFAULT_MAX_ITERS,
            cur_iter: 0,
            jcur: false,
            total_iters: 0,
            conv_fails: 0,
        }
    }

    /// Returns the iteration limit per attempt.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    fn wired(&self) -> Result<Wired<C>, NlsError> {
        Ok(Wired {
            sys: self.sys.ok_or(NlsError::MissingFunction("system"))?,
            lsetup: self.lsetup,
            lsolve: self
                .lsolve
                .ok_or(NlsError::MissingFunction("linear solve"))?,
            ctest: self
                .ctest
                .ok_or(NlsError::MissingFunction("convergence test"))?,
        })
    }

    /// Runs one attempt from the current `ycor`.
    #[allow(clippy::too_many_arguments)]
    fn attempt(
        &mut self,
        wired: &Wired<C>,
        ycor: &mut Vector,
        weights: &Vector,
        tol: f64,
        call_setup: bool,
        jbad: bool,
        ctx: &mut C,
    ) -> Result<(), Failure> {
        self.cur_iter = 0;

        (wired.sys)(ctx, ycor, &mut self.delta)?;

        if call_setup {
            if let Some(lsetup) = wired.lsetup {
                self.jcur = lsetup(ctx, ycor, &self.delta, jbad)?;
            }
        }

        loop {
            self.delta.neg_mut();
            (wired.lsolve)(ctx, ycor, &mut self.delta)?;
            *ycor += &self.delta;
            self.total_iters += 1;

            match (wired.ctest)(ctx, self.cur_iter, ycor, &self.delta, tol, weights)? {
                Convergence::Converged => return Ok(()),
                Convergence::Diverged => return Err(Failure::Recoverable(Stage::Convergence)),
                Convergence::Continue => {}
            }

            self.cur_iter += 1;
            if self.cur_iter >= self.max_iters {
                return Err(Failure::Recoverable(Stage::Convergence));
            }

            (wired.sys)(ctx, ycor, &mut self.delta)?;
        }
    }
}

impl<C> NonlinearSolver<C> for Newton<C> {
    fn solver_type(&self) -> SolverType {
        SolverType::RootFind
    }

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn initialize(&mut self) -> Result<(), NlsError> {
        self.wired()?;
        self.cur_iter = 0;
        self.jcur = false;
        Ok(())
    }

    fn solve(
        &mut self,
        y0: &Vector,
        ycor: &mut Vector,
        weights: &Vector,
        tol: f64,
        call_setup: bool,
        ctx: &mut C,
    ) -> Result<(), Failure> {
        let wired = self
            .wired()
            .map_err(|_| Failure::Fatal(Stage::Configuration))?;

        if y0.len() != self.delta.len() || ycor.len() != self.delta.len() {
            log::debug!(
                "newton: sized for {} unknowns, called with {}",
                self.delta.len(),
                y0.len()
            );
            return Err(Failure::Fatal(Stage::Configuration));
        }

        ycor.copy_from(y0);
        self.jcur = false;

        let mut call_setup = call_setup;
        let mut jbad = false;

        loop {
            match self.attempt(&wired, ycor, weights, tol, call_setup, jbad, ctx) {
                Ok(()) => return Ok(()),
                Err(failure @ Failure::Fatal(_)) => return Err(failure),
                Err(failure) => {
                    self.conv_fails += 1;

                    if jbad || self.jcur || wired.lsetup.is_none() {
                        return Err(failure);
                    }

                    log::trace!("newton: {failure}, retrying with a fresh Jacobian");
                    jbad = true;
                    call_setup = true;
                    ycor.copy_from(y0);
                }
            }
        }
    }

    fn set_system_fn(&mut self, f: SystemFn<C>) -> Result<(), NlsError> {
        self.sys = Some(f);
        Ok(())
    }

    fn set_convergence_test_fn(&mut self, f: ConvergenceTestFn<C>) -> Result<(), NlsError> {
        self.ctest = Some(f);
        Ok(())
    }

    fn set_linear_setup_fn(&mut self, f: Option<LinearSetupFn<C>>) -> Result<(), NlsError> {
        self.lsetup = f;
        Ok(())
    }

    fn set_linear_solve_fn(&mut self, f: Option<LinearSolveFn<C>>) -> Result<(), NlsError> {
        self.lsolve = f;
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

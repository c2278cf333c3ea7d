use std::fmt;

use thiserror::Error;

use crate::{Convergence, Failure, Vector};

/// Kind of nonlinear problem a solver expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverType {
    /// Solves `F(x) = 0` (Newton-type). Requires a linear solve.
    RootFind,
    /// Solves `G(x) = x` by direct iteration. No linear solve.
    FixedPoint,
}

/// An operation a [`NonlinearSolver`] may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    QueryType,
    Initialize,
    Solve,
    Release,
    SetSystemFn,
    SetConvergenceTestFn,
    SetLinearSetupFn,
    SetLinearSolveFn,
    SetMaxIters,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::QueryType => "query type",
            Capability::Initialize => "initialize",
            Capability::Solve => "solve",
            Capability::Release => "release",
            Capability::SetSystemFn => "set system function",
            Capability::SetConvergenceTestFn => "set convergence test function",
            Capability::SetLinearSetupFn => "set linear setup function",
            Capability::SetLinearSolveFn => "set linear solve function",
            Capability::SetMaxIters => "set maximum iterations",
        };
        f.write_str(name)
    }
}

/// Operations every solver must support before an integrator accepts it.
pub const REQUIRED_CAPABILITIES: [Capability; 5] = [
    Capability::QueryType,
    Capability::Initialize,
    Capability::Solve,
    Capability::Release,
    Capability::SetSystemFn,
];

/// Errors raised while configuring or initializing a nonlinear solver.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NlsError {
    #[error("operation not supported: {0}")]
    Unsupported(Capability),

    #[error("maximum iterations must be at least 1")]
    InvalidMaxIters,

    #[error("{0} function has not been set")]
    MissingFunction(&'static str),
}

/// Evaluates the nonlinear system at `ycor`, writing the residual
/// (root-finding) or the fixed-point map (fixed-point) into the output.
pub type SystemFn<C> = fn(&mut C, &Vector, &mut Vector) -> Result<(), Failure>;

/// Sets up the linear solver. Arguments are the correction, the current
/// residual, and whether the solver considers the Jacobian bad. Returns
/// whether the Jacobian is now current.
pub type LinearSetupFn<C> = fn(&mut C, &Vector, &Vector, bool) -> Result<bool, Failure>;

/// Solves the linear system in place. Arguments are the correction and the
/// right-hand side, which is overwritten with the solution.
pub type LinearSolveFn<C> = fn(&mut C, &Vector, &mut Vector) -> Result<(), Failure>;

/// Tests convergence of one iterate. Arguments are the zero-based iteration
/// index, the correction, the latest increment, the tolerance, and the error
/// weights.
pub type ConvergenceTestFn<C> =
    fn(&mut C, usize, &Vector, &Vector, f64, &Vector) -> Result<Convergence, Failure>;

/// A pluggable nonlinear solver.
///
/// The solver owns the iteration loop; the integrator that owns the solver
/// provides the system, convergence test, and (for root-finding solvers)
/// linear setup and solve as plain functions over its context type `C`.
/// Those functions receive the same `ctx` that the integrator passes to
/// [`solve`](NonlinearSolver::solve).
///
/// Optional operations default to [`NlsError::Unsupported`]. [`supports`]
/// lets an integrator check for the operations it relies on before binding.
///
/// [`supports`]: NonlinearSolver::supports
pub trait NonlinearSolver<C> {
    /// Returns the kind of problem this solver expects.
    fn solver_type(&self) -> SolverType;

    /// Returns true if the solver implements `capability`.
    ///
    /// The default claims only the operations without an `Unsupported`
    /// default. Solvers that override an optional setter override this too.
    fn supports(&self, capability: Capability) -> bool {
        !matches!(
            capability,
            Capability::SetConvergenceTestFn
                | Capability::SetLinearSetupFn
                | Capability::SetLinearSolveFn
                | Capability::SetMaxIters
        )
    }

    /// Prepares the solver for use after all functions are wired.
    ///
    /// # Errors
    ///
    /// Returns an error if a required function is missing.
    fn initialize(&mut self) -> Result<(), NlsError>;

    /// Solves the nonlinear system.
    ///
    /// `y0` is the initial guess, copied into `ycor`, which holds the final
    /// iterate on return. `call_setup` requests a linear solver setup before
    /// the first iteration.
    ///
    /// # Errors
    ///
    /// Forwards any [`Failure`] returned by a wired function, and returns
    /// [`Failure::Recoverable`] with [`Stage::Convergence`] when the
    /// iteration diverges or exhausts its iteration limit.
    ///
    /// [`Stage::Convergence`]: crate::Stage::Convergence
    fn solve(
        &mut self,
        y0: &Vector,
        ycor: &mut Vector,
        weights: &Vector,
        tol: f64,
        call_setup: bool,
        ctx: &mut C,
    ) -> Result<(), Failure>;

    /// Releases resources held by the solver before it is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if release is not supported.
    fn release(&mut self) -> Result<(), NlsError> {
        Ok(())
    }

    /// Sets the nonlinear system function.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver does not accept a system function.
    fn set_system_fn(&mut self, f: SystemFn<C>) -> Result<(), NlsError>;

    /// Sets the convergence test.
    ///
    /// # Errors
    ///
    /// Returns [`NlsError::Unsupported`] by default.
    fn set_convergence_test_fn(&mut self, f: ConvergenceTestFn<C>) -> Result<(), NlsError> {
        let _ = f;
        Err(NlsError::Unsupported(Capability::SetConvergenceTestFn))
    }

    /// Sets or clears the linear solver setup function.
    ///
    /// # Errors
    ///
    /// Returns [`NlsError::Unsupported`] by default.
    fn set_linear_setup_fn(&mut self, f: Option<LinearSetupFn<C>>) -> Result<(), NlsError> {
        let _ = f;
        Err(NlsError::Unsupported(Capability::SetLinearSetupFn))
    }

    /// Sets or clears the linear solver solve function.
    ///
    /// # Errors
    ///
    /// Returns [`NlsError::Unsupported`] by default.
    fn set_linear_solve_fn(&mut self, f: Option<LinearSolveFn<C>>) -> Result<(), NlsError> {
        let _ = f;
        Err(NlsError::Unsupported(Capability::SetLinearSolveFn))
    }

    /// Sets the maximum number of iterations per solve.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_iters` is zero or the operation is unsupported.
    fn set_max_iters(&mut self, max_iters: usize) -> Result<(), NlsError> {
        let _ = max_iters;
        Err(NlsError::Unsupported(Capability::SetMaxIters))
    }

    /// Returns the zero-based index of the current iteration.
    fn current_iteration(&self) -> usize;

    /// Returns the total number of iterations performed across all solves.
    fn iterations(&self) -> usize {
        0
    }

    /// Returns the total number of solves that failed to converge.
    fn convergence_failures(&self) -> usize {
        0
    }
}

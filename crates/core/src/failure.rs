use std::fmt;

use thiserror::Error;

/// Failure returned by a user callback (right-hand side, Jacobian, linear solver).
///
/// A recoverable failure asks the caller to retry the step with altered
/// parameters, typically a smaller step size. A fatal failure ends the
/// integration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CallbackError {
    #[error("recoverable callback failure")]
    Recoverable,

    #[error("unrecoverable callback failure")]
    Fatal,
}

/// Where in a corrector iteration a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// The right-hand side function.
    Rhs,
    /// The linear solver setup (Jacobian evaluation and factorization).
    LinearSetup,
    /// The linear solver solve.
    LinearSolve,
    /// The iteration diverged or ran out of iterations.
    Convergence,
    /// The nonlinear solver was not wired correctly.
    Configuration,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Rhs => "right-hand side",
            Stage::LinearSetup => "linear setup",
            Stage::LinearSolve => "linear solve",
            Stage::Convergence => "convergence",
            Stage::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// Failure flowing through a nonlinear solve.
///
/// Every callback wired into a [`NonlinearSolver`](crate::NonlinearSolver)
/// reports failure with this type, and the solver forwards it unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    #[error("recoverable {0} failure")]
    Recoverable(Stage),

    #[error("unrecoverable {0} failure")]
    Fatal(Stage),
}

impl Failure {
    /// Translates a callback error into a failure at the given stage.
    #[must_use]
    pub fn from_callback(error: CallbackError, stage: Stage) -> Self {
        match error {
            CallbackError::Recoverable => Failure::Recoverable(stage),
            CallbackError::Fatal => Failure::Fatal(stage),
        }
    }

    /// Returns true if the caller may retry with altered parameters.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Failure::Recoverable(_))
    }

    /// Returns the stage that failed.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Failure::Recoverable(stage) | Failure::Fatal(stage) => *stage,
        }
    }
}

/// Outcome of a convergence test on one iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    /// The iterate satisfies the tolerance.
    Converged,
    /// Not yet converged; iterate again.
    Continue,
    /// The corrections are growing; abandon the attempt.
    Diverged,
}

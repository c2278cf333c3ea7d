use crate::{CallbackError, Vector};

/// Why the linear solver setup is being called.
///
/// Linear solvers use this to decide whether a saved Jacobian can be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConvFail {
    /// First call of a step, or the previous attempt failed its error test.
    #[default]
    NoFailures,
    /// The nonlinear solver flagged the Jacobian as bad.
    BadJacobian,
    /// The previous corrector attempt failed for another reason.
    Other,
}

/// Linear multistep family of the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    Adams,
    #[default]
    Bdf,
}

/// Integrator data available to [`LinearSolver::setup`].
#[derive(Debug, Clone, Copy)]
pub struct SetupInput<'a> {
    /// Reason for this setup call.
    pub conv_fail: ConvFail,
    /// Current time.
    pub t: f64,
    /// Current implicit-method coefficient.
    pub gamma: f64,
    /// Value of `gamma` at the previous setup.
    pub gamma_prev: f64,
    /// Number of steps taken so far.
    pub step: usize,
    /// Current predicted or corrected state.
    pub y: &'a Vector,
    /// Right-hand side evaluated at `y`.
    pub fy: &'a Vector,
}

/// Integrator data available to [`LinearSolver::solve`].
#[derive(Debug, Clone, Copy)]
pub struct SolveInput<'a> {
    /// Error weights.
    pub weights: &'a Vector,
    /// Current state.
    pub y: &'a Vector,
    /// Right-hand side evaluated at `y`.
    pub fy: &'a Vector,
    /// Ratio of the current `gamma` to the `gamma` used at the last setup.
    pub gamma_ratio: f64,
    /// Linear multistep family in use.
    pub method: Method,
}

/// Solver for the linear systems `M x = b` with `M ≈ I - gamma * J`.
///
/// `setup` evaluates or reuses the Jacobian and prepares `M`; `solve`
/// overwrites `b` with the solution.
pub trait LinearSolver {
    /// Prepares the linear system for subsequent solves.
    ///
    /// `scratch` holds three work vectors of state length.
    /// Returns `true` if the Jacobian was freshly evaluated (is current).
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::Recoverable`] if setup failed but may succeed
    /// with a smaller step, and [`CallbackError::Fatal`] otherwise.
    fn setup(
        &mut self,
        input: &SetupInput<'_>,
        scratch: &mut [Vector; 3],
    ) -> Result<bool, CallbackError>;

    /// Solves `M x = b` in place.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::Recoverable`] if the solve failed but may
    /// succeed after a fresh setup, and [`CallbackError::Fatal`] otherwise.
    fn solve(&mut self, b: &mut Vector, input: &SolveInput<'_>) -> Result<(), CallbackError>;
}

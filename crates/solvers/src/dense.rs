//! Dense direct solver for `M x = b` with `M = I - gamma * J`.
//!
//! The Jacobian `J` comes from a user callback. Setup decides whether the
//! saved Jacobian is still usable; if not, it re-evaluates it. In either case
//! it forms `M` for the current `gamma` and LU-factors it.
//!
//! The Jacobian is re-evaluated when any of these hold:
//!
//! - no step has been taken yet
//! - at least [`Config::max_steps_between_jac`] steps passed since the last
//!   evaluation
//! - the nonlinear solver flagged it as bad and `gamma` changed by less than
//!   [`Config::dgmax_jbad`] since the last setup
//! - the previous corrector attempt failed for another reason
//!
//! For BDF methods, `solve` scales the solution by `2 / (1 + gamma_ratio)` to
//! compensate for a `gamma` that changed since the matrix was factored.

mod config;

pub use config::{Config, ConfigError};

use nalgebra::{DMatrix, Dyn, LU};
use stiff_core::{CallbackError, ConvFail, LinearSolver, Method, SetupInput, SolveInput, Vector};

/// Computes the Jacobian `J = df/dy` at `(t, y)`.
///
/// `fy` holds `f(t, y)`. `jac` is zeroed before each call.
/// Closures with the matching signature implement this trait.
pub trait Jacobian {
    /// Writes the Jacobian into `jac`.
    ///
    /// # Errors
    ///
    /// Returns a [`CallbackError`] if the Jacobian cannot be evaluated.
    fn jacobian(
        &mut self,
        t: f64,
        y: &Vector,
        fy: &Vector,
        jac: &mut DMatrix<f64>,
    ) -> Result<(), CallbackError>;
}

impl<F> Jacobian for F
where
    F: FnMut(f64, &Vector, &Vector, &mut DMatrix<f64>) -> Result<(), CallbackError>,
{
    fn jacobian(
        &mut self,
        t: f64,
        y: &Vector,
        fy: &Vector,
        jac: &mut DMatrix<f64>,
    ) -> Result<(), CallbackError> {
        self(t, y, fy, jac)
    }
}

/// Dense LU linear solver.
pub struct Dense<J> {
    jac_fn: J,
    config: Config,
    saved_jac: DMatrix<f64>,
    lu: Option<LU<f64, Dyn, Dyn>>,
    step_at_last_jac: usize,
    jac_evals: usize,
}

impl<J: Jacobian> Dense<J> {
    /// Creates a dense solver for systems of dimension `dim`.
    #[must_use]
    pub fn new(dim: usize, jac_fn: J) -> Self {
        Self::with_config(dim, jac_fn, Config::default())
    }

    /// Creates a dense solver with a custom configuration.
    #[must_use]
    pub fn with_config(dim: usize, jac_fn: J, config: Config) -> Self {
        Self {
            jac_fn,
            config,
            saved_jac: DMatrix::zeros(dim, dim),
            lu: None,
            step_at_last_jac: 0,
            jac_evals: 0,
        }
    }

    /// Returns the number of Jacobian evaluations.
    #[must_use]
    pub fn jac_evals(&self) -> usize {
        self.jac_evals
    }

    /// Returns true if setup must re-evaluate the Jacobian.
    fn needs_jacobian(&self, input: &SetupInput<'_>) -> bool {
        let dgamma = (input.gamma / input.gamma_prev - 1.0).abs();

        input.step == 0
            || input.step >= self.step_at_last_jac + self.config.max_steps_between_jac()
            || (input.conv_fail == ConvFail::BadJacobian && dgamma < self.config.dgmax_jbad())
            || input.conv_fail == ConvFail::Other
    }
}

impl<J: Jacobian> LinearSolver for Dense<J> {
    fn setup(
        &mut self,
        input: &SetupInput<'_>,
        _scratch: &mut [Vector; 3],
    ) -> Result<bool, CallbackError> {
        if input.y.len() != self.saved_jac.nrows() {
            self.lu = None;
            return Err(CallbackError::Fatal);
        }

        let jcur = self.needs_jacobian(input);

        if jcur {
            self.jac_evals += 1;
            self.step_at_last_jac = input.step;
            self.saved_jac.fill(0.0);
            self.jac_fn
                .jacobian(input.t, input.y, input.fy, &mut self.saved_jac)?;
            log::debug!(
                "dense: evaluated Jacobian at step {} (t = {:.6e})",
                input.step,
                input.t
            );
        }

        let mut matrix = self.saved_jac.scale(-input.gamma);
        for i in 0..matrix.nrows() {
            matrix[(i, i)] += 1.0;
        }

        let lu = matrix.lu();
        if !lu.is_invertible() {
            self.lu = None;
            return Err(CallbackError::Recoverable);
        }
        self.lu = Some(lu);

        Ok(jcur)
    }

    fn solve(&mut self, b: &mut Vector, input: &SolveInput<'_>) -> Result<(), CallbackError> {
        let lu = self.lu.as_ref().ok_or(CallbackError::Fatal)?;
        if b.len() != self.saved_jac.nrows() {
            return Err(CallbackError::Fatal);
        }

        if !lu.solve_mut(b) {
            return Err(CallbackError::Recoverable);
        }

        #[allow(clippy::float_cmp)]
        if input.method == Method::Bdf && input.gamma_ratio != 1.0 {
            *b *= 2.0 / (1.0 + input.gamma_ratio);
        }

        Ok(())
    }
}

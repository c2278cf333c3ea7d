//! Corrector iteration for implicit multistep ODE integrators.
//!
//! At every attempted step, an implicit method must solve a nonlinear
//! equation for the correction `acor` that turns the predicted solution
//! `zn[0]` into the corrected one `y = zn[0] + acor`. This crate connects a
//! pluggable [`NonlinearSolver`] to the integrator's numerical state:
//!
//! - the correction equation itself, as a residual for root-finding solvers
//!   and as a fixed-point map for fixed-point solvers
//! - a bridge that forwards linear setup and solve calls to the attached
//!   [`LinearSolver`] with integrator bookkeeping
//! - a convergence test based on a running contraction-rate estimate
//! - the binding that validates a solver and wires all of the above into it
//! - [`Integrator::correct`], which runs one corrector attempt
//!
//! # Example
//!
//! ```
//! use stiff_core::{CallbackError, Vector};
//! use stiff_corrector::{CorrectFlag, CorrectorMem, Integrator, IntegratorState, Outcome};
//! use stiff_solvers::FixedPoint;
//!
//! // y' = -y, one backward Euler step of size 0.1 from y = 1.
//! let rhs = |_t: f64, y: &Vector, ydot: &mut Vector| -> Result<(), CallbackError> {
//!     ydot[0] = -y[0];
//!     Ok(())
//! };
//!
//! let mut state = IntegratorState::new(1);
//! state.h = 0.1;
//! state.gamma = 0.1;
//! state.zn[0][0] = 0.9;
//! state.zn[1][0] = -0.1;
//!
//! let mut integrator = Integrator::new(CorrectorMem::new(state, rhs));
//! integrator
//!     .set_nonlinear_solver(Box::new(FixedPoint::new(1)))
//!     .expect("fixed-point solver should bind");
//! integrator.init_nonlinear_solver().expect("should initialize");
//!
//! let outcome = integrator
//!     .correct(CorrectFlag::FirstCall, 0.1)
//!     .expect("no fatal failure");
//! assert!(matches!(outcome, Outcome::Converged { .. }));
//! ```
//!
//! [`NonlinearSolver`]: stiff_core::NonlinearSolver
//! [`LinearSolver`]: stiff_core::LinearSolver

mod binding;
mod config;
mod convergence;
mod correct;
mod error;
mod linear;
mod memory;
mod state;
mod system;

pub use config::{ConfigError, CorrectorConfig};
pub use convergence::Attempt;
pub use correct::{CorrectFlag, Outcome};
pub use error::Error;
pub use memory::CorrectorMem;
pub use state::{Counters, IntegratorState};

use stiff_core::NonlinearSolver;

/// Log target and report component for this crate.
const COMPONENT: &str = "stiff_corrector";

/// An integrator's corrector: its memory plus the bound nonlinear solver.
///
/// The solver is stored apart from [`CorrectorMem`] so it can be driven with
/// the memory as its context.
pub struct Integrator {
    mem: CorrectorMem,
    nls: Option<Box<dyn NonlinearSolver<CorrectorMem>>>,
}

impl Integrator {
    /// Creates an integrator with no nonlinear solver bound.
    #[must_use]
    pub fn new(mem: CorrectorMem) -> Self {
        Self { mem, nls: None }
    }

    #[must_use]
    pub fn memory(&self) -> &CorrectorMem {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut CorrectorMem {
        &mut self.mem
    }

    #[must_use]
    pub fn state(&self) -> &IntegratorState {
        &self.mem.state
    }

    pub fn state_mut(&mut self) -> &mut IntegratorState {
        &mut self.mem.state
    }

    /// Returns the bound nonlinear solver, if any.
    #[must_use]
    pub fn nonlinear_solver(&self) -> Option<&dyn NonlinearSolver<CorrectorMem>> {
        self.nls.as_deref()
    }
}

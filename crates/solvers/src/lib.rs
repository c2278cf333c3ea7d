//! Reference solvers for implicit ODE corrector iterations.
//!
//! The nonlinear solvers implement [`NonlinearSolver`] and are driven by the
//! functions an integrator wires into them. The linear solver implements
//! [`LinearSolver`] for the systems a Newton iteration needs.
//!
//! # Solvers
//!
//! - [`newton`] — Newton iteration for root-finding problems
//! - [`fixed_point`] — direct iteration for fixed-point problems
//! - [`dense`] — dense LU solver for `M = I - gamma * J`
//!
//! [`NonlinearSolver`]: stiff_core::NonlinearSolver
//! [`LinearSolver`]: stiff_core::LinearSolver

pub mod dense;
pub mod fixed_point;
pub mod newton;

pub use dense::Dense;
pub use fixed_point::FixedPoint;
pub use newton::Newton;

/// Default iteration limit of the reference nonlinear solvers.
pub const DEFAULT_MAX_ITERS: usize = 3;

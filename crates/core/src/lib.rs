//! Core traits and types for implicit ODE corrector iterations.
//!
//! This crate defines the shared vocabulary that integrators, nonlinear
//! solvers, and linear solvers build on:
//!
//! - [`Vector`] and [`wrms_norm`] — state vectors and the weighted RMS norm
//!   used by every convergence metric
//! - [`OdeRhs`] — the user's right-hand side `y' = f(t, y)`
//! - [`LinearSolver`] — the setup/solve contract for `M = I - gamma * J`
//! - [`NonlinearSolver`] — a pluggable root-finding or fixed-point iteration
//!   whose system, convergence test, and linear callbacks are wired in by the
//!   integrator that owns it
//! - [`CallbackError`], [`Failure`], [`Convergence`] — explicit outcome types
//!   that replace signed status codes
//! - [`Reporter`] — receives a [`Report`] on every error path

mod failure;
mod linear;
mod nonlinear;
mod report;
mod rhs;
mod vector;

pub use failure::{CallbackError, Convergence, Failure, Stage};
pub use linear::{ConvFail, LinearSolver, Method, SetupInput, SolveInput};
pub use nonlinear::{
    Capability, ConvergenceTestFn, LinearSetupFn, LinearSolveFn, NlsError, NonlinearSolver,
    REQUIRED_CAPABILITIES, SolverType, SystemFn,
};
pub use report::{LogReporter, Report, Reporter, Severity};
pub use rhs::OdeRhs;
pub use vector::{Vector, wrms_norm};

use stiff_core::{Capability, NlsError, Stage};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by the corrector.
///
/// Recoverable step failures are not errors; see [`Outcome`](crate::Outcome).
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    #[error("nonlinear solver does not support: {0}")]
    MissingCapability(Capability),

    #[error("failed to set {what} on the nonlinear solver")]
    Wiring {
        what: &'static str,
        #[source]
        source: NlsError,
    },

    #[error("no nonlinear solver is bound")]
    NoNonlinearSolver,

    #[error("nonlinear solver initialization failed")]
    Init(#[source] NlsError),

    #[error("unrecoverable {0} failure")]
    Fatal(Stage),

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("{vector} has length {found}, expected {expected}")]
    DimensionMismatch {
        vector: &'static str,
        expected: usize,
        found: usize,
    },
}

use stiff_core::{Failure, LinearSolver, LogReporter, OdeRhs, Report, Reporter};

use crate::{COMPONENT, CorrectorConfig, Error, IntegratorState, convergence::Attempt};

/// Everything the corrector callbacks operate on.
///
/// A bound nonlinear solver receives this as its context, so the correction
/// equation, linear bridge, and convergence test are all methods here.
pub struct CorrectorMem {
    pub state: IntegratorState,
    pub(crate) rhs: Box<dyn OdeRhs>,
    pub(crate) lsolver: Option<Box<dyn LinearSolver>>,
    pub(crate) reporter: Box<dyn Reporter>,
    pub(crate) config: CorrectorConfig,
    pub(crate) attempt: Attempt,
}

impl CorrectorMem {
    /// Creates corrector memory with the default config, no linear solver,
    /// and a [`LogReporter`].
    #[must_use]
    pub fn new(state: IntegratorState, rhs: impl OdeRhs + 'static) -> Self {
        Self {
            state,
            rhs: Box::new(rhs),
            lsolver: None,
            reporter: Box::new(LogReporter),
            config: CorrectorConfig::default(),
            attempt: Attempt::default(),
        }
    }

    /// Attaches a linear solver.
    #[must_use]
    pub fn with_linear_solver(mut self, lsolver: impl LinearSolver + 'static) -> Self {
        self.lsolver = Some(Box::new(lsolver));
        self
    }

    /// Replaces the error reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Replaces the config.
    #[must_use]
    pub fn with_config(mut self, config: CorrectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Attaches or detaches the linear solver.
    ///
    /// Takes effect for the nonlinear solver at the next
    /// [`init_nonlinear_solver`](crate::Integrator::init_nonlinear_solver).
    pub fn set_linear_solver(&mut self, lsolver: Option<Box<dyn LinearSolver>>) {
        self.lsolver = lsolver;
    }

    #[must_use]
    pub fn has_linear_solver(&self) -> bool {
        self.lsolver.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    /// Returns the convergence scope of the current corrector attempt.
    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    /// Sends a report to the reporter.
    pub(crate) fn report(&mut self, report: &Report) {
        self.reporter.report(report);
    }

    /// Reports `failure` from `operation` and returns it unchanged.
    pub(crate) fn fail(&mut self, operation: &'static str, failure: Failure) -> Failure {
        let report = if failure.is_recoverable() {
            Report::warning(COMPONENT, operation, failure.to_string())
        } else {
            Report::error(COMPONENT, operation, failure.to_string())
        };
        self.report(&report);
        failure
    }

    /// Reports `error` from `operation` and returns it unchanged.
    pub(crate) fn reject(&mut self, operation: &'static str, error: Error) -> Error {
        self.report(&Report::error(COMPONENT, operation, error.to_string()));
        error
    }
}

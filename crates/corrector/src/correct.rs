use stiff_core::{ConvFail, Failure, Stage, Vector};

use crate::{COMPONENT, Error, Integrator, convergence::Attempt};

/// Why the step controller is calling [`Integrator::correct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrectFlag {
    /// First attempt of a new step.
    FirstCall,
    /// Retry after the corrector failed to converge.
    PrevConvFail,
    /// Retry after the step failed its error test.
    PrevErrFail,
}

/// Result of a corrector attempt that did not fail fatally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The correction converged after `iterations` iterations.
    Converged { iterations: usize },
    /// The attempt failed at `stage`; the step may be retried, typically
    /// with a smaller step size or a fresh Jacobian.
    Recoverable(Stage),
}

impl Integrator {
    /// Runs one corrector attempt for the current step.
    ///
    /// Decides whether the linear solver needs a new setup, solves for the
    /// correction `acor` starting from zero, and sets `y = zn[0] + acor`
    /// whether or not the attempt converged.
    ///
    /// `tol` is the convergence tolerance in the weighted RMS norm of the
    /// error weights `ewt`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTolerance`] unless `tol` is positive and
    /// finite, [`Error::NoNonlinearSolver`] if nothing is bound,
    /// [`Error::DimensionMismatch`] if the state vectors disagree in length,
    /// and [`Error::Fatal`] if any stage failed unrecoverably.
    pub fn correct(&mut self, flag: CorrectFlag, tol: f64) -> Result<Outcome, Error> {
        if !tol.is_finite() || tol <= 0.0 {
            return Err(self.mem.reject("correct", Error::InvalidTolerance(tol)));
        }
        if let Err(error) = self.mem.state.check_dimensions() {
            return Err(self.mem.reject("correct", error));
        }

        let Some(nls) = self.nls.as_mut() else {
            return Err(self.mem.reject("correct", Error::NoNonlinearSolver));
        };
        let mem = &mut self.mem;

        let call_setup = if mem.has_linear_solver() {
            mem.state.conv_fail = match flag {
                CorrectFlag::FirstCall | CorrectFlag::PrevErrFail => ConvFail::NoFailures,
                CorrectFlag::PrevConvFail => ConvFail::Other,
            };

            let counters = &mem.state.counters;
            matches!(flag, CorrectFlag::PrevConvFail | CorrectFlag::PrevErrFail)
                || counters.steps == 0
                || counters.steps >= counters.step_at_last_setup + mem.config.msbp()
                || (mem.state.gamma_ratio - 1.0).abs() > mem.config.dgmax_lsetup()
        } else {
            mem.state.conv_rate = 1.0;
            false
        };

        log::trace!(
            target: COMPONENT,
            "corrector attempt at t = {:.6e} ({flag:?}, setup = {call_setup})",
            mem.state.tn
        );

        mem.attempt = Attempt::default();
        let y0 = Vector::zeros(mem.state.dim());
        let weights = mem.state.ewt.clone();
        let mut acor = std::mem::replace(&mut mem.state.acor, Vector::zeros(0));

        let result = nls.solve(&y0, &mut acor, &weights, tol, call_setup, mem);

        mem.state.acor = acor;
        mem.state.y.copy_from(&mem.state.zn[0]);
        mem.state.y += &mem.state.acor;

        match result {
            Ok(()) => Ok(Outcome::Converged {
                iterations: nls.current_iteration() + 1,
            }),
            Err(Failure::Recoverable(stage)) => {
                log::debug!(target: COMPONENT, "corrector attempt failed at {stage}");
                Ok(Outcome::Recoverable(stage))
            }
            // Callback failures are reported where they occur.
            Err(Failure::Fatal(Stage::Configuration)) => {
                Err(mem.reject("correct", Error::Fatal(Stage::Configuration)))
            }
            Err(Failure::Fatal(stage)) => Err(Error::Fatal(stage)),
        }
    }
}

//! Convergence test for the corrector iteration.
//!
//! With `del` the weighted RMS norm of the latest increment, the test keeps
//! a contraction-rate estimate `crate = max(crdown * crate, del / delp)` and
//! accepts the iterate once `del * min(1, crate) <= tol`. An increment more
//! than `rdiv` times larger than the previous one ends the attempt.

use stiff_core::{Convergence, Failure, Vector, wrms_norm};

use crate::CorrectorMem;

/// Convergence state scoped to one corrector attempt.
///
/// A fresh `Attempt` is opened by every call to
/// [`Integrator::correct`](crate::Integrator::correct).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Attempt {
    delp: f64,
}

impl Attempt {
    /// Returns the increment norm of the previous iteration.
    #[must_use]
    pub fn previous_norm(&self) -> f64 {
        self.delp
    }
}

impl CorrectorMem {
    /// Tests iteration `m` of the current attempt.
    ///
    /// `delta` is the latest increment and `ycor` the correction after it.
    /// On convergence, records the norm of the accumulated correction in
    /// `acnrm`.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches the convergence test a nonlinear
    /// solver expects.
    pub fn test_convergence(
        &mut self,
        m: usize,
        ycor: &Vector,
        delta: &Vector,
        tol: f64,
        weights: &Vector,
    ) -> Result<Convergence, Failure> {
        let del = wrms_norm(delta, weights);
        let delp = self.attempt.delp;
        let state = &mut self.state;

        if m > 0 {
            state.conv_rate = (self.config.crdown() * state.conv_rate).max(del / delp);
        }

        let dcon = del * state.conv_rate.min(1.0) / tol;

        if dcon <= 1.0 {
            state.acnrm = if m == 0 { del } else { wrms_norm(ycor, weights) };
            log::trace!(
                target: crate::COMPONENT,
                "converged at iteration {m} (del = {del:.3e}, rate = {:.3e})",
                state.conv_rate
            );
            return Ok(Convergence::Converged);
        }

        if m >= 1 && del > self.config.rdiv() * delp {
            log::trace!(
                target: crate::COMPONENT,
                "diverged at iteration {m} (del = {del:.3e}, delp = {delp:.3e})"
            );
            return Ok(Convergence::Diverged);
        }

        self.attempt.delp = del;
        Ok(Convergence::Continue)
    }
}

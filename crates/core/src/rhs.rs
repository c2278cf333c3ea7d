use crate::{CallbackError, Vector};

/// Right-hand side of an ODE system `y' = f(t, y)`.
///
/// Implementations write `f(t, y)` into `ydot`, which has the same length as
/// `y`. Returning [`CallbackError::Recoverable`] asks the integrator to retry
/// the step with a smaller step size; [`CallbackError::Fatal`] ends the
/// integration.
///
/// Closures with the matching signature implement this trait.
pub trait OdeRhs {
    /// Evaluates the right-hand side at `(t, y)`.
    ///
    /// # Errors
    ///
    /// Returns a [`CallbackError`] if the derivative cannot be evaluated.
    fn rhs(&mut self, t: f64, y: &Vector, ydot: &mut Vector) -> Result<(), CallbackError>;
}

/// Blanket implementation for right-hand side closures.
impl<F> OdeRhs for F
where
    F: FnMut(f64, &Vector, &mut Vector) -> Result<(), CallbackError>,
{
    fn rhs(&mut self, t: f64, y: &Vector, ydot: &mut Vector) -> Result<(), CallbackError> {
        self(t, y, ydot)
    }
}

//! The correction equation.
//!
//! With `y = zn[0] + ycor`, a step solves
//!
//! ```text
//! rl1 * zn[1] + ycor - gamma * f(tn, y) = 0
//! ```
//!
//! for `ycor`. Root-finding solvers get the left-hand side as a residual.
//! Fixed-point solvers get the equivalent map
//! `ycor = rl1 * (h * f(tn, y) - zn[1])`.

use stiff_core::{Failure, Stage, Vector};

use crate::CorrectorMem;

impl CorrectorMem {
    /// Evaluates the corrector residual at `ycor` into `res`.
    ///
    /// Also sets `y = zn[0] + ycor` and leaves `f(tn, y)` in `ftemp` for the
    /// linear solver.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] at [`Stage::Rhs`] if the right-hand side fails.
    pub fn residual(&mut self, ycor: &Vector, res: &mut Vector) -> Result<(), Failure> {
        self.update_y(ycor);

        let state = &mut self.state;
        state.counters.rhs_evals += 1;
        if let Err(err) = self.rhs.rhs(state.tn, &state.y, &mut state.ftemp) {
            return Err(self.fail("residual", Failure::from_callback(err, Stage::Rhs)));
        }

        res.copy_from(&state.zn[1]);
        res.scale_mut(state.rl1);
        *res += ycor;
        res.axpy(-state.gamma, &state.ftemp, 1.0);
        Ok(())
    }

    /// Evaluates the fixed-point map at `ycor` into `res`.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] at [`Stage::Rhs`] if the right-hand side fails.
    pub fn fixed_point(&mut self, ycor: &Vector, res: &mut Vector) -> Result<(), Failure> {
        self.update_y(ycor);

        let state = &mut self.state;
        state.counters.rhs_evals += 1;
        if let Err(err) = self.rhs.rhs(state.tn, &state.y, res) {
            return Err(self.fail("fixed_point", Failure::from_callback(err, Stage::Rhs)));
        }

        res.scale_mut(state.h);
        *res -= &state.zn[1];
        res.scale_mut(state.rl1);
        Ok(())
    }

    fn update_y(&mut self, ycor: &Vector) {
        self.state.y.copy_from(&self.state.zn[0]);
        self.state.y += ycor;
    }
}

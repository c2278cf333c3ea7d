//! Bridge from a nonlinear solver to the attached linear solver.

use stiff_core::{ConvFail, Failure, SetupInput, SolveInput, Stage, Vector};

use crate::CorrectorMem;

impl CorrectorMem {
    /// Sets up the linear solver for the current `gamma`.
    ///
    /// `jbad` marks the Jacobian as bad, so the linear solver sees
    /// [`ConvFail::BadJacobian`]. Whatever the outcome, the setup is counted
    /// and `gamma_prev`, `gamma_ratio`, the contraction rate, and the
    /// step of the last setup are reset.
    ///
    /// Returns whether the Jacobian is now current.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] at [`Stage::LinearSetup`] if the linear solver
    /// fails or none is attached.
    pub fn linear_setup(
        &mut self,
        _ycor: &Vector,
        _res: &Vector,
        jbad: bool,
    ) -> Result<bool, Failure> {
        if jbad {
            self.state.conv_fail = ConvFail::BadJacobian;
        }

        let Some(lsolver) = self.lsolver.as_mut() else {
            return Err(self.fail("linear_setup", Failure::Fatal(Stage::LinearSetup)));
        };

        let state = &mut self.state;
        let input = SetupInput {
            conv_fail: state.conv_fail,
            t: state.tn,
            gamma: state.gamma,
            gamma_prev: state.gamma_prev,
            step: state.counters.steps,
            y: &state.y,
            fy: &state.ftemp,
        };
        let result = lsolver.setup(&input, &mut state.scratch);

        state.counters.linear_setups += 1;
        state.jcur = result.unwrap_or(false);
        state.gamma_prev = state.gamma;
        state.gamma_ratio = 1.0;
        state.conv_rate = 1.0;
        state.counters.step_at_last_setup = state.counters.steps;

        log::debug!(
            target: crate::COMPONENT,
            "linear setup at step {} (gamma = {:.6e}, jcur = {})",
            state.counters.steps,
            state.gamma,
            state.jcur
        );

        result.map_err(|err| {
            self.fail("linear_setup", Failure::from_callback(err, Stage::LinearSetup))
        })
    }

    /// Solves the linear system in place, overwriting `delta` with the
    /// solution.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`] at [`Stage::LinearSolve`] if the linear solver
    /// fails or none is attached.
    pub fn linear_solve(&mut self, _ycor: &Vector, delta: &mut Vector) -> Result<(), Failure> {
        let Some(lsolver) = self.lsolver.as_mut() else {
            return Err(self.fail("linear_solve", Failure::Fatal(Stage::LinearSolve)));
        };

        let state = &self.state;
        let input = SolveInput {
            weights: &state.ewt,
            y: &state.y,
            fy: &state.ftemp,
            gamma_ratio: state.gamma_ratio,
            method: state.method,
        };

        lsolver
            .solve(delta, &input)
            .map_err(|err| {
                self.fail("linear_solve", Failure::from_callback(err, Stage::LinearSolve))
            })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use approx::assert_relative_eq;
    use stiff_core::{CallbackError, LinearSolver, Method};

    use super::*;
    use crate::IntegratorState;

    #[derive(Default)]
    struct Seen {
        conv_fails: Vec<ConvFail>,
        gamma_ratios: Vec<f64>,
    }

    /// Returns a fixed setup result and halves the right-hand side on solve.
    struct Scripted {
        setup: Result<bool, CallbackError>,
        solve: Result<(), CallbackError>,
        seen: Rc<RefCell<Seen>>,
    }

    impl LinearSolver for Scripted {
        fn setup(
            &mut self,
            input: &SetupInput<'_>,
            _scratch: &mut [Vector; 3],
        ) -> Result<bool, CallbackError> {
            self.seen.borrow_mut().conv_fails.push(input.conv_fail);
            self.setup
        }

        fn solve(&mut self, b: &mut Vector, input: &SolveInput<'_>) -> Result<(), CallbackError> {
            self.seen.borrow_mut().gamma_ratios.push(input.gamma_ratio);
            self.solve?;
            *b *= 0.5;
            Ok(())
        }
    }

    fn rhs(_t: f64, _y: &Vector, ydot: &mut Vector) -> Result<(), CallbackError> {
        ydot.fill(0.0);
        Ok(())
    }

    fn mem_with(
        setup: Result<bool, CallbackError>,
        solve: Result<(), CallbackError>,
    ) -> (CorrectorMem, Rc<RefCell<Seen>>) {
        let seen = Rc::new(RefCell::new(Seen::default()));
        let lsolver = Scripted {
            setup,
            solve,
            seen: Rc::clone(&seen),
        };

        let mut state = IntegratorState::new(1);
        state.gamma = 0.4;
        state.gamma_prev = 0.1;
        state.gamma_ratio = 4.0;
        state.conv_rate = 0.7;
        state.counters.steps = 12;

        let mem = CorrectorMem::new(state, rhs)
            .with_linear_solver(lsolver)
            .with_reporter(());
        (mem, seen)
    }

    #[test]
    fn setup_bookkeeping_runs_regardless_of_status() {
        let cases = [
            (Ok(true), Ok(true)),
            (Err(CallbackError::Recoverable), Err(Failure::Recoverable(Stage::LinearSetup))),
            (Err(CallbackError::Fatal), Err(Failure::Fatal(Stage::LinearSetup))),
        ];

        for (setup, expected) in cases {
            let (mut mem, _seen) = mem_with(setup, Ok(()));
            let v = Vector::zeros(1);

            assert_eq!(mem.linear_setup(&v, &v, false), expected);

            let state = &mem.state;
            assert_eq!(state.counters.linear_setups, 1);
            assert_eq!(state.counters.step_at_last_setup, 12);
            assert_relative_eq!(state.gamma_ratio, 1.0);
            assert_relative_eq!(state.conv_rate, 1.0);
            assert_relative_eq!(state.gamma_prev, 0.4);
            assert_eq!(state.jcur, expected == Ok(true));
        }
    }

    #[test]
    fn bad_jacobian_is_passed_to_setup() {
        let (mut mem, seen) = mem_with(Ok(false), Ok(()));
        let v = Vector::zeros(1);

        mem.linear_setup(&v, &v, false).expect("setup succeeds");
        mem.linear_setup(&v, &v, true).expect("setup succeeds");

        assert_eq!(
            seen.borrow().conv_fails,
            vec![ConvFail::NoFailures, ConvFail::BadJacobian]
        );
        assert_eq!(mem.state.conv_fail, ConvFail::BadJacobian);
    }

    #[test]
    fn solve_forwards_gamma_ratio_and_status() {
        let (mut mem, seen) = mem_with(Ok(true), Ok(()));
        let ycor = Vector::zeros(1);
        let mut delta = Vector::from_element(1, 3.0);

        mem.linear_solve(&ycor, &mut delta).expect("solve succeeds");
        assert_relative_eq!(delta[0], 1.5);
        assert_eq!(seen.borrow().gamma_ratios, vec![4.0]);
        assert_eq!(mem.state.method, Method::Bdf);

        let (mut mem, _seen) = mem_with(Ok(true), Err(CallbackError::Recoverable));
        assert_eq!(
            mem.linear_solve(&ycor, &mut delta),
            Err(Failure::Recoverable(Stage::LinearSolve))
        );
        assert_eq!(mem.state.counters.linear_setups, 0);
    }

    #[test]
    fn missing_linear_solver_is_fatal() {
        let mut mem = CorrectorMem::new(IntegratorState::new(1), rhs).with_reporter(());
        let v = Vector::zeros(1);
        let mut delta = Vector::zeros(1);

        assert_eq!(
            mem.linear_setup(&v, &v, false),
            Err(Failure::Fatal(Stage::LinearSetup))
        );
        assert_eq!(
            mem.linear_solve(&v, &mut delta),
            Err(Failure::Fatal(Stage::LinearSolve))
        );
    }
}

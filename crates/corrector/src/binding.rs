//! Binding a nonlinear solver to an [`Integrator`].
//!
//! A candidate is checked for the operations the corrector relies on, and
//! the system function matching its [`SolverType`] is wired in along with
//! the convergence test and iteration limit. Only a fully wired candidate
//! replaces the current binding, so a rejected candidate leaves the
//! integrator as it was.


use stiff_core::{
    LinearSetupFn, LinearSolveFn, NlsError, NonlinearSolver, REQUIRED_CAPABILITIES, Report,
    SolverType, SystemFn,
};

use crate::{COMPONENT, CorrectorMem, Error, Integrator};

impl Integrator {
    /// Binds `solver` as the integrator's nonlinear solver.
    ///
    /// Root-finding solvers are wired to the corrector residual and
    /// fixed-point solvers to the fixed-point map. Any previously bound
    /// solver is released once the new one is fully wired.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCapability`] if the solver lacks a required
    /// operation, or [`Error::Wiring`] if it rejects a function or the
    /// iteration limit. The current binding is unchanged on error.
    pub fn set_nonlinear_solver(
        &mut self,
        mut solver: Box<dyn NonlinearSolver<CorrectorMem>>,
    ) -> Result<(), Error> {
        if let Some(&missing) = REQUIRED_CAPABILITIES
            .iter()
            .find(|&&capability| !solver.supports(capability))
        {
            let error = Error::MissingCapability(missing);
            return Err(self.mem.reject("set_nonlinear_solver", error));
        }

        let sys: SystemFn<CorrectorMem> = match solver.solver_type() {
            SolverType::RootFind => CorrectorMem::residual,
            SolverType::FixedPoint => CorrectorMem::fixed_point,
        };

        if let Err(error) = self.wire(&mut solver, sys) {
            return Err(self.mem.reject("set_nonlinear_solver", error));
        }

        if let Some(mut previous) = self.nls.take() {
            if let Err(err) = previous.release() {
                self.mem.report(&Report::warning(
                    COMPONENT,
                    "set_nonlinear_solver",
                    format!("previous solver failed to release: {err}"),
                ));
            }
        }

        log::debug!(
            target: COMPONENT,
            "bound {:?} nonlinear solver",
            solver.solver_type()
        );
        self.nls = Some(solver);
        Ok(())
    }

    /// Prepares the bound solver for an integration.
    ///
    /// Call once at the start of each integration setup phase. The linear
    /// bridge is wired in when a linear solver is attached and cleared
    /// otherwise. The solver's own initialization runs last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoNonlinearSolver`] if nothing is bound,
    /// [`Error::DimensionMismatch`] if the state vectors disagree in length,
    /// or [`Error::Init`] if the solver rejects the linear functions or fails
    /// to initialize.
    pub fn init_nonlinear_solver(&mut self) -> Result<(), Error> {
        if let Err(error) = self.mem.state.check_dimensions() {
            return Err(self.mem.reject("init_nonlinear_solver", error));
        }

        let Some(nls) = self.nls.as_mut() else {
            return Err(self
                .mem
                .reject("init_nonlinear_solver", Error::NoNonlinearSolver));
        };

        let linear = if self.mem.has_linear_solver() {
            let setup: LinearSetupFn<CorrectorMem> = CorrectorMem::linear_setup;
            let solve: LinearSolveFn<CorrectorMem> = CorrectorMem::linear_solve;
            nls.set_linear_setup_fn(Some(setup))
                .and_then(|()| nls.set_linear_solve_fn(Some(solve)))
        } else {
            allow_unsupported(nls.set_linear_setup_fn(None))
                .and_then(|()| allow_unsupported(nls.set_linear_solve_fn(None)))
        };
        let result = linear.and_then(|()| nls.initialize());

        result.map_err(|err| {
            let error = Error::Init(err);
            self.mem.report(&Report::error(
                COMPONENT,
                "init_nonlinear_solver",
                format!("{error}: {err}"),
            ));
            error
        })
    }

    fn wire(
        &self,
        solver: &mut Box<dyn NonlinearSolver<CorrectorMem>>,
        sys: SystemFn<CorrectorMem>,
    ) -> Result<(), Error> {
        solver
            .set_system_fn(sys)
            .map_err(|source| Error::Wiring {
                what: "system function",
                source,
            })?;
        solver
            .set_convergence_test_fn(CorrectorMem::test_convergence)
            .map_err(|source| Error::Wiring {
                what: "convergence test",
                source,
            })?;
        solver
            .set_max_iters(self.mem.config.max_iters())
            .map_err(|source| Error::Wiring {
                what: "maximum iterations",
                source,
            })
    }
}

/// Clearing a function a solver does not support leaves nothing to clear.
fn allow_unsupported(result: Result<(), NlsError>) -> Result<(), NlsError> {
    match result {
        Err(NlsError::Unsupported(_)) => Ok(()),
        other => other,
    }
}

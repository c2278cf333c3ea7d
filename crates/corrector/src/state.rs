use stiff_core::{ConvFail, Method, Vector};

use crate::Error;

/// Work counters maintained by the corrector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counters {
    /// Right-hand side evaluations made by the correction equation.
    pub rhs_evals: usize,
    /// Calls to the linear solver setup.
    pub linear_setups: usize,
    /// Steps completed by the integrator.
    pub steps: usize,
    /// Value of `steps` at the last linear setup.
    pub step_at_last_setup: usize,
}

/// Numerical state of an implicit multistep integrator.
///
/// The step controller owns the prediction (`zn`), the step coefficients,
/// and the error weights; the corrector reads them and writes `y`, `ftemp`,
/// `acor`, and the convergence bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorState {
    /// Current solution, `zn[0] + acor` after a corrector attempt.
    pub y: Vector,
    /// History: the predicted value and the predicted scaled derivative `h y'`.
    pub zn: [Vector; 2],
    /// Error weights.
    pub ewt: Vector,
    /// Right-hand side at `y`, written by the residual evaluation.
    pub ftemp: Vector,
    /// Work vectors lent to the linear solver setup.
    pub scratch: [Vector; 3],
    /// Accumulated correction.
    pub acor: Vector,

    /// Current time.
    pub tn: f64,
    /// Current step size.
    pub h: f64,
    /// Implicit-method coefficient `h * rl1`.
    pub gamma: f64,
    /// Value of `gamma` at the last linear setup.
    pub gamma_prev: f64,
    /// `gamma / gamma_prev`.
    pub gamma_ratio: f64,
    /// Reciprocal of the leading method coefficient `l[1]`.
    pub rl1: f64,
    /// Contraction-rate estimate of the corrector iteration.
    pub conv_rate: f64,
    /// Norm of the accumulated correction at convergence.
    pub acnrm: f64,

    pub method: Method,
    /// Reason passed to the next linear setup.
    pub conv_fail: ConvFail,
    /// Whether the Jacobian was evaluated at the last setup.
    pub jcur: bool,
    pub counters: Counters,
}

impl IntegratorState {
    /// Creates a zeroed state of dimension `dim` with unit error weights.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            y: Vector::zeros(dim),
            zn: [Vector::zeros(dim), Vector::zeros(dim)],
            ewt: Vector::from_element(dim, 1.0),
            ftemp: Vector::zeros(dim),
            scratch: [Vector::zeros(dim), Vector::zeros(dim), Vector::zeros(dim)],
            acor: Vector::zeros(dim),
            tn: 0.0,
            h: 0.0,
            gamma: 0.0,
            gamma_prev: 0.0,
            gamma_ratio: 1.0,
            rl1: 1.0,
            conv_rate: 1.0,
            acnrm: 0.0,
            method: Method::default(),
            conv_fail: ConvFail::default(),
            jcur: false,
            counters: Counters::default(),
        }
    }

    /// Returns the system dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.y.len()
    }

    /// Checks that every vector has the length of `y`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] naming the first vector whose
    /// length differs.
    pub fn check_dimensions(&self) -> Result<(), Error> {
        let expected = self.dim();
        let vectors = [
            ("zn[0]", &self.zn[0]),
            ("zn[1]", &self.zn[1]),
            ("ewt", &self.ewt),
            ("ftemp", &self.ftemp),
            ("scratch[0]", &self.scratch[0]),
            ("scratch[1]", &self.scratch[1]),
            ("scratch[2]", &self.scratch[2]),
            ("acor", &self.acor),
        ];

        for (vector, v) in vectors {
            if v.len() != expected {
                return Err(Error::DimensionMismatch {
                    vector,
                    expected,
                    found: v.len(),
                });
            }
        }
        Ok(())
    }
}

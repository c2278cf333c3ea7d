use thiserror::Error;

/// Configuration for the dense linear solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    max_steps_between_jac: usize,
    dgmax_jbad: f64,
}

/// Errors that can occur when validating a dense solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_steps_between_jac must be at least 1")]
    MaxStepsBetweenJac,

    #[error("dgmax_jbad must be finite and positive")]
    DgmaxJbad,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_steps_between_jac: 51,
            dgmax_jbad: 0.2,
        }
    }
}

impl Config {
    /// Creates a new config with validated values.
    ///
    /// `max_steps_between_jac` is the number of steps after which the
    /// Jacobian is re-evaluated regardless of convergence history.
    /// `dgmax_jbad` is the largest relative change in `gamma` for which a
    /// bad-Jacobian setup re-evaluates the Jacobian.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range.
    pub fn new(max_steps_between_jac: usize, dgmax_jbad: f64) -> Result<Self, ConfigError> {
        if max_steps_between_jac == 0 {
            return Err(ConfigError::MaxStepsBetweenJac);
        }
        if !dgmax_jbad.is_finite() || dgmax_jbad <= 0.0 {
            return Err(ConfigError::DgmaxJbad);
        }

        Ok(Self {
            max_steps_between_jac,
            dgmax_jbad,
        })
    }

    #[must_use]
    pub fn max_steps_between_jac(&self) -> usize {
        self.max_steps_between_jac
    }

    #[must_use]
    pub fn dgmax_jbad(&self) -> f64 {
        self.dgmax_jbad
    }
}

use thiserror::Error;

/// Configuration for the corrector iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorrectorConfig {
    max_iters: usize,
    crdown: f64,
    rdiv: f64,
    dgmax_lsetup: f64,
    msbp: usize,
}

/// Errors that can occur when validating a corrector config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_iters must be at least 1")]
    MaxIters,

    #[error("crdown must be in (0, 1)")]
    Crdown,

    #[error("rdiv must be finite and greater than 1")]
    Rdiv,

    #[error("dgmax_lsetup must be finite and positive")]
    DgmaxLsetup,

    #[error("msbp must be at least 1")]
    Msbp,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            max_iters: 3,
            crdown: 0.3,
            rdiv: 2.0,
            dgmax_lsetup: 0.3,
            msbp: 20,
        }
    }
}

impl CorrectorConfig {
    /// Creates a new config with validated values.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range.
    pub fn new(
        max_iters: usize,
        crdown: f64,
        rdiv: f64,
        dgmax_lsetup: f64,
        msbp: usize,
    ) -> Result<Self, ConfigError> {
        if max_iters == 0 {
            return Err(ConfigError::MaxIters);
        }
        if !(crdown > 0.0 && crdown < 1.0) {
            return Err(ConfigError::Crdown);
        }
        if !rdiv.is_finite() || rdiv <= 1.0 {
            return Err(ConfigError::Rdiv);
        }
        if !dgmax_lsetup.is_finite() || dgmax_lsetup <= 0.0 {
            return Err(ConfigError::DgmaxLsetup);
        }
        if msbp == 0 {
            return Err(ConfigError::Msbp);
        }

        Ok(Self {
            max_iters,
            crdown,
            rdiv,
            dgmax_lsetup,
            msbp,
        })
    }

    /// Returns the iteration limit installed on bound solvers.
    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    /// Returns the decay factor applied to the contraction-rate estimate.
    #[must_use]
    pub fn crdown(&self) -> f64 {
        self.crdown
    }

    /// Returns the increment ratio above which an iteration is diverging.
    #[must_use]
    pub fn rdiv(&self) -> f64 {
        self.rdiv
    }

    /// Returns the largest `|gamma_ratio - 1|` tolerated without a new
    /// linear setup.
    #[must_use]
    pub fn dgmax_lsetup(&self) -> f64 {
        self.dgmax_lsetup
    }

    /// Returns the maximum number of steps between linear setups.
    #[must_use]
    pub fn msbp(&self) -> usize {
        self.msbp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let default = CorrectorConfig::default();
        let validated = CorrectorConfig::new(3, 0.3, 2.0, 0.3, 20).expect("defaults are valid");
        assert_eq!(default, validated);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            CorrectorConfig::new(0, 0.3, 2.0, 0.3, 20),
            Err(ConfigError::MaxIters)
        );
        assert_eq!(
            CorrectorConfig::new(3, 1.0, 2.0, 0.3, 20),
            Err(ConfigError::Crdown)
        );
        assert_eq!(
            CorrectorConfig::new(3, f64::NAN, 2.0, 0.3, 20),
            Err(ConfigError::Crdown)
        );
        assert_eq!(
            CorrectorConfig::new(3, 0.3, 1.0, 0.3, 20),
            Err(ConfigError::Rdiv)
        );
        assert_eq!(
            CorrectorConfig::new(3, 0.3, 2.0, f64::INFINITY, 20),
            Err(ConfigError::DgmaxLsetup)
        );
        assert_eq!(
            CorrectorConfig::new(3, 0.3, 2.0, 0.3, 0),
            Err(ConfigError::Msbp)
        );
    }
}

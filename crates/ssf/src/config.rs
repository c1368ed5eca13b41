//! Configuration of the simulation engine.

use crate::error::SsfError;

/// Default variance scale of ordinary shocks.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Default variance of the diffuse directions of the initial state.
pub const DEFAULT_DIFFUSE_SCALE: f64 = 100.0;

/// Variance scales used by [`RandomGenerator`](crate::RandomGenerator).
///
/// `scale` multiplies the stationary initial covariance, the process noise
/// and the measurement errors. `diffuse_scale` is the finite variance
/// given to the diffuse directions of the initial state, standing in for
/// an improper prior.
///
/// # Example
///
/// ```
/// use ssfsim_ssf::SimulationConfig;
///
/// let config = SimulationConfig::new().with_diffuse_scale(1e4);
/// assert_eq!(config.scale(), 1.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    scale: f64,
    diffuse_scale: f64,
}

impl SimulationConfig {
    /// Creates a configuration with `scale = 1` and `diffuse_scale = 100`.
    pub fn new() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            diffuse_scale: DEFAULT_DIFFUSE_SCALE,
        }
    }

    /// Sets the variance scale of ordinary shocks.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the variance of the diffuse directions.
    pub fn with_diffuse_scale(mut self, diffuse_scale: f64) -> Self {
        self.diffuse_scale = diffuse_scale;
        self
    }

    /// Returns the variance scale of ordinary shocks.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the variance of the diffuse directions.
    pub fn diffuse_scale(&self) -> f64 {
        self.diffuse_scale
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SsfError::InvalidConfig`] if either scale is negative or
    /// non-finite.
    pub fn validate(&self) -> Result<(), SsfError> {
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(SsfError::InvalidConfig {
                reason: format!("scale must be finite and >= 0, got {}", self.scale),
            });
        }
        if !self.diffuse_scale.is_finite() || self.diffuse_scale < 0.0 {
            return Err(SsfError::InvalidConfig {
                reason: format!(
                    "diffuse_scale must be finite and >= 0, got {}",
                    self.diffuse_scale
                ),
            });
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SimulationConfig::new();
        assert_eq!(cfg.scale(), 1.0);
        assert_eq!(cfg.diffuse_scale(), 100.0);
        assert_eq!(cfg, SimulationConfig::default());
    }

    #[test]
    fn builder() {
        let cfg = SimulationConfig::new()
            .with_scale(2.5)
            .with_diffuse_scale(1e6);
        assert_eq!(cfg.scale(), 2.5);
        assert_eq!(cfg.diffuse_scale(), 1e6);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_negative_scale() {
        let err = SimulationConfig::new().with_scale(-1.0).validate().unwrap_err();
        match err {
            SsfError::InvalidConfig { reason } => assert!(reason.contains("scale")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn rejects_infinite_diffuse_scale() {
        let err = SimulationConfig::new()
            .with_diffuse_scale(f64::INFINITY)
            .validate()
            .unwrap_err();
        match err {
            SsfError::InvalidConfig { reason } => assert!(reason.contains("diffuse_scale")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }
}

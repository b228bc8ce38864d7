use crate::math::Real;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{name} must be positive (got {value})")]
    NotPositive { name: &'static str, value: f64 },
    #[error("alpha must lie strictly between 0 and 2 (got {0})")]
    AlphaOutOfRange(f64),
    #[error("{name} must be nonnegative (got {value})")]
    Negative { name: &'static str, value: f64 },
    #[error("max_iter must be at least 1")]
    MaxIterZero,
    #[error("adaptive_rho_interval must be at least 1")]
    AdaptiveRhoIntervalZero,
    #[error("adaptive_rho_tolerance must exceed 1 (got {0})")]
    AdaptiveRhoToleranceTooSmall(f64),
}

/// ADMM solver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings<T: Real> {
    /// Initial penalty, > 0.
    pub rho: T,
    /// Proximal regularization, > 0 and small.
    pub sigma: T,
    /// Over-relaxation, in (0, 2); values in [1.5, 1.8] typically help.
    pub alpha: T,
    pub eps_rel: T,
    pub eps_abs: T,
    pub max_iter: usize,
    /// Termination-test cadence; 0 disables the test entirely.
    pub check_termination: usize,
    /// Reuse x, z, y from the previous solve.
    pub warm_start: bool,
    pub adaptive_rho: bool,
    /// Multiplicative change required before a new penalty is applied, > 1.
    pub adaptive_rho_tolerance: T,
    pub adaptive_rho_interval: usize,
}

impl<T> Default for Settings<T>
where
    T: Real,
{
    fn default() -> Self {
        Self {
            rho: T::from_f64(1e-1).unwrap(),
            sigma: T::from_f64(1e-6).unwrap(),
            alpha: T::one(),
            eps_rel: T::from_f64(1e-3).unwrap(),
            eps_abs: T::from_f64(1e-3).unwrap(),
            max_iter: 1000,
            check_termination: 25,
            warm_start: false,
            adaptive_rho: false,
            adaptive_rho_tolerance: T::from_f64(5.0).unwrap(),
            adaptive_rho_interval: 25,
        }
    }
}

impl<T> Settings<T>
where
    T: Real,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        let as_f64 = |value: T| value.to_f64().unwrap_or(f64::NAN);
        for (name, value) in [("rho", self.rho), ("sigma", self.sigma)] {
            if !(value > T::zero()) {
                return Err(SettingsError::NotPositive {
                    name,
                    value: as_f64(value),
                });
            }
        }
        if !(self.alpha > T::zero() && self.alpha < T::from_f64(2.0).unwrap()) {
            return Err(SettingsError::AlphaOutOfRange(as_f64(self.alpha)));
        }
        for (name, value) in [("eps_rel", self.eps_rel), ("eps_abs", self.eps_abs)] {
            if !(value >= T::zero()) {
                return Err(SettingsError::Negative {
                    name,
                    value: as_f64(value),
                });
            }
        }
        if self.max_iter == 0 {
            return Err(SettingsError::MaxIterZero);
        }
        if self.adaptive_rho_interval == 0 {
            return Err(SettingsError::AdaptiveRhoIntervalZero);
        }
        if !(self.adaptive_rho_tolerance > T::one()) {
            return Err(SettingsError::AdaptiveRhoToleranceTooSmall(as_f64(
                self.adaptive_rho_tolerance,
            )));
        }
        Ok(())
    }
}

//! Stellar initial mass function sampling
//!
//! Inverse-transform sampling of the broken power-law IMF of Maschberger
//! (2013, MNRAS 429, 1725), Table 1: the auxiliary function is equation 1 and
//! the quantile function equation 4.

use serde::{Deserialize, Serialize};

use crate::constants::PhysicalConstants;
use crate::{ensure_positive, ImpactError, Result};

/// IMF shape parameters. Masses are in solar masses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImfParams {
    /// Scale mass mu [M_sun]
    pub mu: f64,
    /// High-mass power-law exponent
    pub alpha: f64,
    /// Low-mass power-law exponent
    pub beta: f64,
    /// Lower mass limit [M_sun]
    pub lower_mass: f64,
    /// Upper mass limit [M_sun]
    pub upper_mass: f64,
}

impl Default for ImfParams {
    fn default() -> Self {
        Self {
            mu: 0.2,
            alpha: 2.3,
            beta: 1.4,
            lower_mass: 0.1,
            upper_mass: 50.0,
        }
    }
}

impl ImfParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("imf.mu", self.mu),
            ("imf.lower_mass", self.lower_mass),
            ("imf.upper_mass", self.upper_mass),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ImpactError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        if self.upper_mass <= self.lower_mass {
            return Err(ImpactError::InvalidConfig(
                "imf.upper_mass must be greater than imf.lower_mass".to_string(),
            ));
        }

        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return Err(ImpactError::InvalidConfig(
                "imf.alpha and imf.beta must be finite".to_string(),
            ));
        }

        // Both exponents appear as 1 / (1 - x) in the quantile function.
        if self.alpha == 1.0 || self.beta == 1.0 {
            return Err(ImpactError::InvalidConfig(
                "imf.alpha and imf.beta must differ from 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Quantile function of the IMF with the limit terms precomputed.
///
/// All masses handled by the sampler are SI kilograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileSampler {
    mu: f64,
    alpha: f64,
    beta: f64,
    lower_mass: f64,
    upper_mass: f64,
    aux_lower: f64,
    aux_upper: f64,
}

impl QuantileSampler {
    pub fn new(params: &ImfParams, constants: &PhysicalConstants) -> Result<Self> {
        params.validate()?;

        let mut sampler = Self {
            mu: params.mu * constants.solar_mass,
            alpha: params.alpha,
            beta: params.beta,
            lower_mass: params.lower_mass * constants.solar_mass,
            upper_mass: params.upper_mass * constants.solar_mass,
            aux_lower: 0.0,
            aux_upper: 0.0,
        };
        sampler.aux_lower = sampler.auxiliary(sampler.lower_mass);
        sampler.aux_upper = sampler.auxiliary(sampler.upper_mass);
        Ok(sampler)
    }

    /// Auxiliary function A(m) = (1 + (m / mu)^(1 - alpha))^(1 - beta)
    pub fn auxiliary(&self, stellar_mass: f64) -> f64 {
        (1.0 + (stellar_mass / self.mu).powf(1.0 - self.alpha)).powf(1.0 - self.beta)
    }

    /// Lower and upper mass limits [kg]
    pub fn limits(&self) -> (f64, f64) {
        (self.lower_mass, self.upper_mass)
    }

    /// Stellar mass [kg] for a uniform draw `u` in the open interval (0, 1)
    pub fn quantile(&self, u: f64) -> Result<f64> {
        if !(u > 0.0 && u < 1.0) {
            return Err(ImpactError::Domain {
                quantity: "imf quantile argument",
                value: u,
            });
        }

        let base = u * (self.aux_upper - self.aux_lower) + self.aux_lower;
        let mass = self.mu
            * (base.powf(1.0 / (1.0 - self.beta)) - 1.0).powf(1.0 / (1.0 - self.alpha));

        ensure_positive("sampled stellar mass", mass)?;
        Ok(mass)
    }

    /// Applies the quantile function to every draw, preserving order
    pub fn sample(&self, draws: &[f64]) -> Result<Vec<f64>> {
        draws.iter().map(|&u| self.quantile(u)).collect()
    }
}

/// Stellar masses [kg] for `draws`, index-aligned with the input
pub fn sample_stellar_masses(
    draws: &[f64],
    params: &ImfParams,
    constants: &PhysicalConstants,
) -> Result<Vec<f64>> {
    QuantileSampler::new(params, constants)?.sample(draws)
}

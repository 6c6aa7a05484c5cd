//! Interstellar rock masses and sublimation lifetimes
//!
//! Rock masses follow the power law of Adams & Napier (2022), Equation 7.
//! Radii assume a constant bulk density and lifetimes grow with the square of
//! the radius.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::constants::PhysicalConstants;
use crate::{ImpactError, Result};

/// Where the normalisation constant A enters the rock-mass quantile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RockNormalisation {
    /// m(u) = [A (u M_u^(1-P) + (1-u) M_l^(1-P))]^(1/(1-P))
    #[default]
    Bracketed,
    /// m(u) = A [u M_u^(1-P) + (1-u) M_l^(1-P)]^(1/(1-P))
    Prefactor,
    /// A omitted; samples stay within [M_l, M_u]
    Unnormalised,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RockParams {
    /// Power-law exponent P
    pub exponent: f64,
    /// Lower mass bound M_l [kg]; the upper bound is the Moon's mass
    pub lower_mass: f64,
    /// m_2 as a fraction of the reference mass m_R (Earth)
    pub secondary_mass_fraction: f64,
    /// Bulk density [kg/m^3]
    pub bulk_density: f64,
    /// Lifetime coefficient [Myr / m^2]
    pub lifetime_coefficient: f64,
    pub normalisation: RockNormalisation,
}

impl Default for RockParams {
    fn default() -> Self {
        Self {
            exponent: 1.8,
            lower_mass: 10.0,
            secondary_mass_fraction: 0.1,
            bulk_density: 4_000.0,
            lifetime_coefficient: 75.0,
            normalisation: RockNormalisation::Bracketed,
        }
    }
}

impl RockParams {
    pub fn validate(&self, constants: &PhysicalConstants) -> Result<()> {
        for (name, value) in [
            ("rock.lower_mass", self.lower_mass),
            ("rock.secondary_mass_fraction", self.secondary_mass_fraction),
            ("rock.bulk_density", self.bulk_density),
            ("rock.lifetime_coefficient", self.lifetime_coefficient),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ImpactError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        if !self.exponent.is_finite() || self.exponent == 1.0 || self.exponent == 2.0 {
            return Err(ImpactError::InvalidConfig(format!(
                "rock.exponent must be finite and differ from 1 and 2, got {}",
                self.exponent
            )));
        }

        if self.lower_mass >= constants.moon_mass {
            return Err(ImpactError::InvalidConfig(
                "rock.lower_mass must be below the Moon's mass".to_string(),
            ));
        }

        Ok(())
    }
}

/// Rock mass quantile and the mass -> radius -> lifetime chain, with every
/// constant folded in up front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RockModel {
    normalisation: RockNormalisation,
    scale: f64,
    lower_term: f64,
    upper_term: f64,
    inverse_exponent: f64,
    bulk_density: f64,
    lifetime_coefficient: f64,
    seconds_per_myr: f64,
}

/// Rock masses with their radii and lifetimes, index-aligned
#[derive(Debug, Clone, PartialEq)]
pub struct RockPopulation {
    pub mass: Vec<f64>,
    pub radius: Vec<f64>,
    pub lifetime: Vec<f64>,
}

impl RockPopulation {
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }
}

impl RockModel {
    pub fn new(params: &RockParams, constants: &PhysicalConstants) -> Result<Self> {
        params.validate(constants)?;

        let p = params.exponent;
        let reference_mass = constants.earth_mass;
        let secondary_mass = params.secondary_mass_fraction * reference_mass;

        Ok(Self {
            normalisation: params.normalisation,
            scale: (2.0 - p) * reference_mass / secondary_mass.powf(2.0 - p),
            lower_term: params.lower_mass.powf(1.0 - p),
            upper_term: constants.moon_mass.powf(1.0 - p),
            inverse_exponent: 1.0 / (1.0 - p),
            bulk_density: params.bulk_density,
            lifetime_coefficient: params.lifetime_coefficient,
            seconds_per_myr: constants.seconds_per_myr(),
        })
    }

    /// Normalisation constant A = (2 - P) m_R / m_2^(2 - P)
    pub fn normalisation_constant(&self) -> f64 {
        self.scale
    }

    /// Rock mass [kg] for a uniform draw `u` in [0, 1]
    #[inline]
    pub fn mass(&self, u: f64) -> f64 {
        let mix = u * self.upper_term + (1.0 - u) * self.lower_term;
        match self.normalisation {
            RockNormalisation::Bracketed => (self.scale * mix).powf(self.inverse_exponent),
            RockNormalisation::Prefactor => self.scale * mix.powf(self.inverse_exponent),
            RockNormalisation::Unnormalised => mix.powf(self.inverse_exponent),
        }
    }

    /// Smallest and largest mass the quantile can produce
    pub fn mass_support(&self) -> (f64, f64) {
        let a = self.mass(0.0);
        let b = self.mass(1.0);
        (a.min(b), a.max(b))
    }

    pub fn sample_masses(&self, draws: &[f64]) -> Result<Vec<f64>> {
        if let Some(&bad) = draws.iter().find(|u| !(**u >= 0.0 && **u <= 1.0)) {
            return Err(ImpactError::Domain {
                quantity: "rock quantile argument",
                value: bad,
            });
        }

        let masses: Vec<f64> = draws.iter().map(|&u| self.mass(u)).collect();
        if let Some(&bad) = masses.iter().find(|m| !(m.is_finite() && **m > 0.0)) {
            return Err(ImpactError::Domain {
                quantity: "sampled rock mass",
                value: bad,
            });
        }

        Ok(masses)
    }

    /// Sphere radius [m] of a rock of `mass` kg
    #[inline]
    pub fn mass_to_radius(&self, mass: f64) -> f64 {
        (3.0 * mass / (4.0 * PI * self.bulk_density)).cbrt()
    }

    #[inline]
    pub fn radius_to_mass(&self, radius: f64) -> f64 {
        4.0 / 3.0 * PI * radius.powi(3) * self.bulk_density
    }

    /// Sublimation lifetime [s] of a rock of `radius` m
    #[inline]
    pub fn radius_to_lifetime(&self, radius: f64) -> f64 {
        self.lifetime_coefficient * radius * radius * self.seconds_per_myr
    }

    pub fn build_population(&self, draws: &[f64]) -> Result<RockPopulation> {
        let mass = self.sample_masses(draws)?;
        let radius: Vec<f64> = mass.iter().map(|&m| self.mass_to_radius(m)).collect();
        let lifetime: Vec<f64> = radius.iter().map(|&r| self.radius_to_lifetime(r)).collect();

        if let Some(&bad) = lifetime.iter().find(|t| !t.is_finite()) {
            return Err(ImpactError::Domain {
                quantity: "rock lifetime",
                value: bad,
            });
        }

        Ok(RockPopulation {
            mass,
            radius,
            lifetime,
        })
    }
}

/// Rock masses [kg] for `draws` in [0, 1]
pub fn sample_rock_masses(
    draws: &[f64],
    params: &RockParams,
    constants: &PhysicalConstants,
) -> Result<Vec<f64>> {
    RockModel::new(params, constants)?.sample_masses(draws)
}

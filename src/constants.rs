//! Physical constants
//!
//! All values are SI. A single `PhysicalConstants` value is threaded through
//! every component so a run uses one consistent set.

use serde::{Deserialize, Serialize};

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Physical constants used by the sampler, disk model and collision estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Gravitational constant [m^3 kg^-1 s^-2]
    pub gravitational_constant: f64,
    /// Solar mass [kg]
    pub solar_mass: f64,
    /// Earth mass [kg]
    pub earth_mass: f64,
    /// Earth radius [m]
    pub earth_radius: f64,
    /// Moon mass [kg]
    pub moon_mass: f64,
    /// Astronomical unit [m]
    pub astronomical_unit: f64,
    /// Parsec [m]
    pub parsec: f64,
    /// Mean Gregorian year [days]
    pub days_per_year: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravitational_constant: 6.674_30e-11,
            solar_mass: 1.988_409_870_698_051e30,
            earth_mass: 5.972_167_867_791_379e24,
            earth_radius: 6.378_1e6,
            moon_mass: 7.347_673_09e22,
            astronomical_unit: 1.495_978_707e11,
            parsec: 3.085_677_581_491_367_3e16,
            days_per_year: 365.2425,
        }
    }
}

impl PhysicalConstants {
    /// Length of a year in seconds
    pub fn seconds_per_year(&self) -> f64 {
        self.days_per_year * SECONDS_PER_DAY
    }

    /// Length of a megayear in seconds
    pub fn seconds_per_myr(&self) -> f64 {
        1.0e6 * self.seconds_per_year()
    }

    /// Cubic astronomical unit [m^3]
    pub fn au_cubed(&self) -> f64 {
        self.astronomical_unit.powi(3)
    }

    /// Earth surface escape velocity [m/s]
    pub fn earth_escape_velocity(&self) -> f64 {
        (2.0 * self.gravitational_constant * self.earth_mass / self.earth_radius).sqrt()
    }

    pub fn is_finite_positive(&self) -> bool {
        [
            self.gravitational_constant,
            self.solar_mass,
            self.earth_mass,
            self.earth_radius,
            self.moon_mass,
            self.astronomical_unit,
            self.parsec,
            self.days_per_year,
        ]
        .iter()
        .all(|value| value.is_finite() && *value > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::PhysicalConstants;

    #[test]
    fn gregorian_year_length() {
        let constants = PhysicalConstants::default();
        assert_eq!(constants.seconds_per_year(), 365.2425 * 86_400.0);
    }

    #[test]
    fn earth_escape_velocity_is_about_eleven_km_s() {
        let v_esc = PhysicalConstants::default().earth_escape_velocity();
        assert!((v_esc - 11_180.0).abs() < 30.0, "v_esc = {v_esc}");
    }

    #[test]
    fn defaults_are_positive() {
        assert!(PhysicalConstants::default().is_finite_positive());
        let broken = PhysicalConstants {
            earth_radius: 0.0,
            ..PhysicalConstants::default()
        };
        assert!(!broken.is_finite_positive());
    }
}

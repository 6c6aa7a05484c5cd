//! Unit conversions between SI and the astronomical units used in the report.

use crate::constants::PhysicalConstants;

/// Number density in AU^-3 to m^-3
pub fn per_au3_to_si(density: f64, constants: &PhysicalConstants) -> f64 {
    density / constants.au_cubed()
}

/// Number density in m^-3 to AU^-3
pub fn si_to_per_au3(density: f64, constants: &PhysicalConstants) -> f64 {
    density * constants.au_cubed()
}

pub fn km_s_to_m_s(velocity: f64) -> f64 {
    velocity * 1.0e3
}

pub fn seconds_to_myr(seconds: f64, constants: &PhysicalConstants) -> f64 {
    seconds / constants.seconds_per_myr()
}

pub fn myr_to_seconds(myr: f64, constants: &PhysicalConstants) -> f64 {
    myr * constants.seconds_per_myr()
}

/// Mass density kg/m^3 to M_sun/AU^3
pub fn si_to_msun_au3(density: f64, constants: &PhysicalConstants) -> f64 {
    density * constants.au_cubed() / constants.solar_mass
}

/// Mass density kg/m^3 to M_sun/pc^3
pub fn si_to_msun_pc3(density: f64, constants: &PhysicalConstants) -> f64 {
    density * constants.parsec.powi(3) / constants.solar_mass
}

/// Mass density kg/m^3 to g/cm^3
pub fn si_to_g_cm3(density: f64) -> f64 {
    density / 1.0e3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn au_density_round_trip_is_close() {
        let constants = PhysicalConstants::default();
        let si = per_au3_to_si(0.2, &constants);
        let back = si_to_per_au3(si, &constants);
        assert!((back - 0.2).abs() < 1e-15);
    }

    #[test]
    fn water_density_in_cgs() {
        assert_eq!(si_to_g_cm3(1000.0), 1.0);
    }

    #[test]
    fn myr_conversion_matches_year_length() {
        let constants = PhysicalConstants::default();
        let seconds = myr_to_seconds(1.0, &constants);
        assert_eq!(seconds, 1.0e6 * 365.2425 * 86_400.0);
        assert!((seconds_to_myr(seconds, &constants) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn solar_density_conversions_scale_with_volume() {
        let constants = PhysicalConstants::default();
        let rho = 1.0e-15;
        let au = si_to_msun_au3(rho, &constants);
        let pc = si_to_msun_pc3(rho, &constants);
        let ratio = pc / au;
        let expected = (constants.parsec / constants.astronomical_unit).powi(3);
        assert!((ratio / expected - 1.0).abs() < 1e-12);
    }
}

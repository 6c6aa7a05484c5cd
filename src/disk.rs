//! Protoplanetary disk model
//!
//! Every stellar mass gets one disk. Radius follows the empirical scaling of
//! Equation 13 in https://doi.org/10.1093/mnras/stac1513; the disk is treated
//! as a thin slab of fixed height.

use std::f64::consts::PI;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::PhysicalConstants;
use crate::{ImpactError, Result};

/// Scaling relations for the disk model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskParams {
    /// Disk radius of a solar-mass star [AU]
    pub radius_scale_au: f64,
    /// Exponent of the radius-mass relation
    pub radius_exponent: f64,
    /// Slab height [AU]
    pub height_au: f64,
    /// Disk mass as a fraction of stellar mass
    pub disk_mass_fraction: f64,
    /// Dust mass as a fraction of disk mass
    pub dust_mass_fraction: f64,
    /// Empirical divisor applied to the radius before any geometry
    pub reduction_factor: f64,
}

impl Default for DiskParams {
    fn default() -> Self {
        Self {
            radius_scale_au: 200.0,
            radius_exponent: 0.3,
            height_au: 0.1,
            disk_mass_fraction: 0.1,
            dust_mass_fraction: 0.01,
            reduction_factor: 1.0,
        }
    }
}

impl DiskParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("disk.radius_scale_au", self.radius_scale_au),
            ("disk.height_au", self.height_au),
            ("disk.disk_mass_fraction", self.disk_mass_fraction),
            ("disk.dust_mass_fraction", self.dust_mass_fraction),
            ("disk.reduction_factor", self.reduction_factor),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ImpactError::InvalidConfig(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        if !self.radius_exponent.is_finite() {
            return Err(ImpactError::InvalidConfig(
                "disk.radius_exponent must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

/// Derived properties of a single disk, SI units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskState {
    pub stellar_mass: f64,
    pub radius: f64,
    pub reduced_radius: f64,
    pub volume: f64,
    pub disk_mass: f64,
    pub dust_mass: f64,
    pub density: f64,
    pub csa_sideview: f64,
    pub csa_topview: f64,
}

impl DiskState {
    /// Disk around a star of `stellar_mass` kg. The mass must be positive.
    fn derive(stellar_mass: f64, params: &DiskParams, constants: &PhysicalConstants) -> Self {
        let au = constants.astronomical_unit;
        let radius = params.radius_scale_au
            * au
            * (stellar_mass / constants.solar_mass).powf(params.radius_exponent);
        let reduced_radius = radius / params.reduction_factor;
        let height = params.height_au * au;

        let circumference = 2.0 * PI * reduced_radius;
        let volume = reduced_radius * height * circumference;

        let disk_mass = params.disk_mass_fraction * stellar_mass;
        let dust_mass = params.dust_mass_fraction * disk_mass;

        Self {
            stellar_mass,
            radius,
            reduced_radius,
            volume,
            disk_mass,
            dust_mass,
            density: dust_mass / volume,
            csa_sideview: reduced_radius * height,
            csa_topview: PI * reduced_radius * reduced_radius,
        }
    }
}

/// Disk properties for a whole stellar population, index-aligned with the
/// stellar masses it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskPopulation {
    stellar_mass: Vec<f64>,
    radius: Vec<f64>,
    reduced_radius: Vec<f64>,
    volume: Vec<f64>,
    disk_mass: Vec<f64>,
    dust_mass: Vec<f64>,
    density: Vec<f64>,
    csa_sideview: Vec<f64>,
    csa_topview: Vec<f64>,
}

/// Builds the disk population for `stellar_masses` [kg].
///
/// Fails on the first mass that is not finite and positive.
pub fn build_disk_population(
    stellar_masses: &[f64],
    params: &DiskParams,
    constants: &PhysicalConstants,
) -> Result<DiskPopulation> {
    params.validate()?;

    if let Some(&bad) = stellar_masses
        .iter()
        .find(|mass| !(mass.is_finite() && **mass > 0.0))
    {
        return Err(ImpactError::Domain {
            quantity: "stellar mass",
            value: bad,
        });
    }

    let states: Vec<DiskState> = stellar_masses
        .par_iter()
        .map(|&mass| DiskState::derive(mass, params, constants))
        .collect();

    let len = states.len();
    let mut population = DiskPopulation {
        stellar_mass: Vec::with_capacity(len),
        radius: Vec::with_capacity(len),
        reduced_radius: Vec::with_capacity(len),
        volume: Vec::with_capacity(len),
        disk_mass: Vec::with_capacity(len),
        dust_mass: Vec::with_capacity(len),
        density: Vec::with_capacity(len),
        csa_sideview: Vec::with_capacity(len),
        csa_topview: Vec::with_capacity(len),
    };

    for state in states {
        population.stellar_mass.push(state.stellar_mass);
        population.radius.push(state.radius);
        population.reduced_radius.push(state.reduced_radius);
        population.volume.push(state.volume);
        population.disk_mass.push(state.disk_mass);
        population.dust_mass.push(state.dust_mass);
        population.density.push(state.density);
        population.csa_sideview.push(state.csa_sideview);
        population.csa_topview.push(state.csa_topview);
    }

    Ok(population)
}

impl DiskPopulation {
    pub fn len(&self) -> usize {
        self.stellar_mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stellar_mass.is_empty()
    }

    pub fn stellar_mass(&self) -> &[f64] {
        &self.stellar_mass
    }

    pub fn radius(&self) -> &[f64] {
        &self.radius
    }

    pub fn reduced_radius(&self) -> &[f64] {
        &self.reduced_radius
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    /// Disk (gas + dust) mass
    pub fn mass(&self) -> &[f64] {
        &self.disk_mass
    }

    pub fn dust_mass(&self) -> &[f64] {
        &self.dust_mass
    }

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    pub fn csa_sideview(&self) -> &[f64] {
        &self.csa_sideview
    }

    pub fn csa_topview(&self) -> &[f64] {
        &self.csa_topview
    }

    pub fn get(&self, index: usize) -> Option<DiskState> {
        if index >= self.len() {
            return None;
        }

        Some(DiskState {
            stellar_mass: self.stellar_mass[index],
            radius: self.radius[index],
            reduced_radius: self.reduced_radius[index],
            volume: self.volume[index],
            disk_mass: self.disk_mass[index],
            dust_mass: self.dust_mass[index],
            density: self.density[index],
            csa_sideview: self.csa_sideview[index],
            csa_topview: self.csa_topview[index],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = DiskState> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }

    /// Checks that an array joined against this population has one entry per disk
    pub fn ensure_aligned(&self, context: &'static str, len: usize) -> Result<()> {
        crate::ensure_len(context, self.len(), len)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::{build_disk_population, DiskParams};
    use crate::constants::PhysicalConstants;
    use crate::ImpactError;

    fn rel_eq(a: f64, b: f64, tol: f64) -> bool {
        ((a - b) / b).abs() <= tol
    }

    #[test]
    fn solar_mass_disk_has_reference_radius() {
        let constants = PhysicalConstants::default();
        let disks =
            build_disk_population(&[constants.solar_mass], &DiskParams::default(), &constants)
                .unwrap();
        let disk = disks.get(0).unwrap();
        assert!(rel_eq(disk.radius, 200.0 * constants.astronomical_unit, 1e-12));
        assert_eq!(disk.radius, disk.reduced_radius);
    }

    #[test]
    fn mass_and_density_invariants_hold() {
        let constants = PhysicalConstants::default();
        let masses: Vec<f64> = (1..=200)
            .map(|i| i as f64 * 0.25 * constants.solar_mass)
            .collect();
        let disks = build_disk_population(&masses, &DiskParams::default(), &constants).unwrap();

        assert_eq!(disks.len(), masses.len());
        for (idx, disk) in disks.iter().enumerate() {
            assert_eq!(disk.stellar_mass, masses[idx]);
            assert!(rel_eq(disk.disk_mass, 0.1 * masses[idx], 1e-12));
            assert!(rel_eq(disk.dust_mass, 0.01 * disk.disk_mass, 1e-12));
            assert!(rel_eq(disk.density, disk.dust_mass / disk.volume, 1e-12));
            assert!(disk.density > 0.0);
        }
    }

    #[test]
    fn slab_geometry() {
        let constants = PhysicalConstants::default();
        let params = DiskParams::default();
        let disks =
            build_disk_population(&[3.0 * constants.solar_mass], &params, &constants).unwrap();
        let disk = disks.get(0).unwrap();
        let height = 0.1 * constants.astronomical_unit;

        assert!(rel_eq(
            disk.volume,
            2.0 * PI * disk.reduced_radius.powi(2) * height,
            1e-12
        ));
        assert!(rel_eq(disk.csa_sideview, disk.reduced_radius * height, 1e-12));
        assert!(rel_eq(disk.csa_topview, PI * disk.reduced_radius.powi(2), 1e-12));
    }

    #[test]
    fn reduction_factor_shrinks_geometry_only() {
        let constants = PhysicalConstants::default();
        let masses = [0.5 * constants.solar_mass];
        let full = build_disk_population(&masses, &DiskParams::default(), &constants).unwrap();
        let reduced = build_disk_population(
            &masses,
            &DiskParams {
                reduction_factor: 10.0,
                ..DiskParams::default()
            },
            &constants,
        )
        .unwrap();

        assert_eq!(full.radius(), reduced.radius());
        assert_eq!(full.mass(), reduced.mass());
        assert!(rel_eq(reduced.reduced_radius()[0], full.radius()[0] / 10.0, 1e-12));
        assert!(rel_eq(reduced.density()[0], 100.0 * full.density()[0], 1e-12));
    }

    #[test]
    fn non_positive_mass_is_rejected() {
        let constants = PhysicalConstants::default();
        let result = build_disk_population(
            &[constants.solar_mass, 0.0],
            &DiskParams::default(),
            &constants,
        );
        assert!(matches!(result, Err(ImpactError::Domain { .. })));
    }

    #[test]
    fn zero_reduction_factor_is_a_config_error() {
        let constants = PhysicalConstants::default();
        let params = DiskParams {
            reduction_factor: 0.0,
            ..DiskParams::default()
        };
        assert!(matches!(
            build_disk_population(&[constants.solar_mass], &params, &constants),
            Err(ImpactError::InvalidConfig(_))
        ));
    }

    #[test]
    fn alignment_check_reports_lengths() {
        let constants = PhysicalConstants::default();
        let disks = build_disk_population(
            &[constants.solar_mass; 4],
            &DiskParams::default(),
            &constants,
        )
        .unwrap();
        assert!(disks.ensure_aligned("test", 4).is_ok());
        assert!(matches!(
            disks.ensure_aligned("test", 3),
            Err(ImpactError::LengthMismatch {
                expected: 4,
                got: 3,
                ..
            })
        ));
    }
}

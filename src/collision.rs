//! Collision times of interstellar objects with Earth and with disks
//!
//! A body of cross section C moving at v_o through objects of number density
//! n_o is hit after t = 1 / (n_o C v_o). Gravitational focusing multiplies the
//! geometric cross section by (1 + v_esc^2 / v_o^2).

use std::f64::consts::PI;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::PhysicalConstants;
use crate::disk::DiskPopulation;
use crate::units::si_to_per_au3;
use crate::{ensure_positive, ImpactError, Result};

/// Escape velocity used to focus the disk cross sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeVelocityModel {
    /// sqrt(2 G (M_star + M_disk) / R_disk)
    #[default]
    StarAndDisk,
    /// sqrt(2 G M_disk / R_disk)
    DiskOnly,
    /// No focusing; geometric cross sections only
    Geometric,
}

impl EscapeVelocityModel {
    pub fn escape_velocity(
        self,
        stellar_mass: f64,
        disk_mass: f64,
        disk_radius: f64,
        constants: &PhysicalConstants,
    ) -> f64 {
        let g = constants.gravitational_constant;
        match self {
            Self::StarAndDisk => (2.0 * g * (stellar_mass + disk_mass) / disk_radius).sqrt(),
            Self::DiskOnly => (2.0 * g * disk_mass / disk_radius).sqrt(),
            Self::Geometric => 0.0,
        }
    }
}

/// Cross-section enhancement 1 + v_esc^2 / v_o^2
#[inline]
pub fn focusing_factor(escape_velocity: f64, velocity: f64) -> f64 {
    1.0 + (escape_velocity * escape_velocity) / (velocity * velocity)
}

/// Geometric cross section of Earth, pi R^2
pub fn earth_geometric_cross_section(constants: &PhysicalConstants) -> f64 {
    PI * constants.earth_radius * constants.earth_radius
}

/// Earth cross section including gravitational focusing at `velocity`
pub fn earth_focused_cross_section(velocity: f64, constants: &PhysicalConstants) -> f64 {
    earth_geometric_cross_section(constants)
        * focusing_factor(constants.earth_escape_velocity(), velocity)
}

/// t = 1 / (n_o C v_o), all inputs must be finite and positive
pub fn collision_time(number_density: f64, cross_section: f64, velocity: f64) -> Result<f64> {
    ensure_positive("number density", number_density)?;
    ensure_positive("cross section", cross_section)?;
    ensure_positive("relative velocity", velocity)?;

    let time = 1.0 / (number_density * cross_section * velocity);
    ensure_positive("collision time", time)?;
    Ok(time)
}

/// Time [s] for an object to hit Earth, with `number_density` in m^-3 and
/// `velocity` in m/s
pub fn t_coll_earth(number_density: f64, velocity: f64, constants: &PhysicalConstants) -> Result<f64> {
    ensure_positive("relative velocity", velocity)?;
    collision_time(
        number_density,
        earth_focused_cross_section(velocity, constants),
        velocity,
    )
}

/// Per-disk collision times [s] for edge-on and face-on encounters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskCollisionTimes {
    pub side: Vec<f64>,
    pub top: Vec<f64>,
}

impl DiskCollisionTimes {
    pub fn len(&self) -> usize {
        self.side.len()
    }

    pub fn is_empty(&self) -> bool {
        self.side.is_empty()
    }
}

/// Collision times for every disk in `disks` at one (n_o, v_o) point
pub fn t_coll_disk(
    number_density: f64,
    velocity: f64,
    disks: &DiskPopulation,
    model: EscapeVelocityModel,
    constants: &PhysicalConstants,
) -> Result<DiskCollisionTimes> {
    ensure_positive("number density", number_density)?;
    ensure_positive("relative velocity", velocity)?;

    let stellar_mass = disks.stellar_mass();
    let disk_mass = disks.mass();
    let disk_radius = disks.reduced_radius();
    let csa_side = disks.csa_sideview();
    let csa_top = disks.csa_topview();

    let times: Vec<(f64, f64)> = (0..disks.len())
        .into_par_iter()
        .map(|idx| {
            let v_esc =
                model.escape_velocity(stellar_mass[idx], disk_mass[idx], disk_radius[idx], constants);
            let focus = focusing_factor(v_esc, velocity);
            let side = 1.0 / (number_density * csa_side[idx] * focus * velocity);
            let top = 1.0 / (number_density * csa_top[idx] * focus * velocity);
            (side, top)
        })
        .collect();

    let (side, top): (Vec<f64>, Vec<f64>) = times.into_iter().unzip();

    for value in side.iter().chain(top.iter()) {
        ensure_positive("disk collision time", *value)?;
    }

    Ok(DiskCollisionTimes { side, top })
}

/// One Earth collision time on the (n_o, v_o) grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionRow {
    /// n_o [m^-3], the value the time was computed from
    pub number_density: f64,
    /// n_o [AU^-3], key of the nested encoding
    pub density_au3: f64,
    /// v_o [m/s]
    pub velocity: f64,
    /// Collision time [s]
    pub time: f64,
}

/// Flat table of Earth collision times in sweep order (n_o outer, v_o inner)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionTable {
    pub rows: Vec<CollisionRow>,
}

impl CollisionTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionRow> {
        self.rows.iter()
    }

    /// Exact-key lookup by the SI density and velocity the grid was built from
    pub fn get(&self, number_density: f64, velocity: f64) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.number_density == number_density && row.velocity == velocity)
            .map(|row| row.time)
    }

    /// Nested `density_au3 -> velocity -> time` object with float keys
    /// written by [`encode_key`]
    pub fn to_nested_json(&self) -> Value {
        let mut outer = Map::new();
        for row in &self.rows {
            let inner = outer
                .entry(encode_key(row.density_au3))
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(inner) = inner {
                inner.insert(encode_key(row.velocity), Value::from(row.time));
            }
        }
        Value::Object(outer)
    }
}

/// Shortest round-trip decimal form of a float, used for JSON object keys
pub fn encode_key(value: f64) -> String {
    format!("{value:e}")
}

pub fn decode_key(key: &str) -> Result<f64> {
    key.parse::<f64>()
        .map_err(|_| ImpactError::InvalidConfig(format!("malformed numeric key: {key}")))
}

/// Flattens a nested `density -> velocity -> time` object back into
/// `(density_au3, velocity, time)` triples
pub fn decode_nested_json(value: &Value) -> Result<Vec<(f64, f64, f64)>> {
    let outer = value
        .as_object()
        .ok_or_else(|| ImpactError::InvalidConfig("expected a JSON object".to_string()))?;

    let mut triples = Vec::new();
    for (density_key, inner) in outer {
        let density = decode_key(density_key)?;
        let inner = inner.as_object().ok_or_else(|| {
            ImpactError::InvalidConfig(format!("expected an object under key {density_key}"))
        })?;
        for (velocity_key, time) in inner {
            let velocity = decode_key(velocity_key)?;
            let time = time.as_f64().ok_or_else(|| {
                ImpactError::InvalidConfig(format!(
                    "expected a number at {density_key}/{velocity_key}"
                ))
            })?;
            triples.push((density, velocity, time));
        }
    }

    Ok(triples)
}

/// Disk collision times for the whole population at one grid point
#[derive(Debug, Clone, PartialEq)]
pub struct DiskSweepCell {
    pub number_density: f64,
    pub density_au3: f64,
    pub velocity: f64,
    pub times: DiskCollisionTimes,
}

/// A single `(stellar_mass, n_o, v_o)` entry of a disk sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskCollisionRow {
    pub stellar_mass: f64,
    pub number_density: f64,
    pub density_au3: f64,
    pub velocity: f64,
    pub side: f64,
    pub top: f64,
}

/// Disk collision times over the (n_o, v_o) grid for every disk.
///
/// Stored as one population-wide array pair per grid cell; [`DiskSweep::rows`]
/// walks it as the flat `stellar_mass -> n_o -> v_o` table.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskSweep {
    stellar_mass: Vec<f64>,
    cells: Vec<DiskSweepCell>,
}

impl DiskSweep {
    pub fn stellar_mass(&self) -> &[f64] {
        &self.stellar_mass
    }

    pub fn cells(&self) -> &[DiskSweepCell] {
        &self.cells
    }

    /// Number of flat rows, disks x grid cells
    pub fn len(&self) -> usize {
        self.stellar_mass.len() * self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell(&self, number_density: f64, velocity: f64) -> Option<&DiskSweepCell> {
        self.cells
            .iter()
            .find(|cell| cell.number_density == number_density && cell.velocity == velocity)
    }

    pub fn rows(&self) -> impl Iterator<Item = DiskCollisionRow> + '_ {
        self.stellar_mass
            .iter()
            .enumerate()
            .flat_map(move |(idx, &stellar_mass)| {
                self.cells.iter().map(move |cell| DiskCollisionRow {
                    stellar_mass,
                    number_density: cell.number_density,
                    density_au3: cell.density_au3,
                    velocity: cell.velocity,
                    side: cell.times.side[idx],
                    top: cell.times.top[idx],
                })
            })
    }

    /// Exact-key lookup; with repeated stellar masses the first disk wins
    pub fn get(
        &self,
        stellar_mass: f64,
        number_density: f64,
        velocity: f64,
    ) -> Option<DiskCollisionRow> {
        let idx = self.stellar_mass.iter().position(|&m| m == stellar_mass)?;
        let cell = self.cell(number_density, velocity)?;
        Some(DiskCollisionRow {
            stellar_mass,
            number_density,
            density_au3: cell.density_au3,
            velocity,
            side: cell.times.side[idx],
            top: cell.times.top[idx],
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub earth: CollisionTable,
    pub disks: Option<DiskSweep>,
}

fn check_grid(name: &'static str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(ImpactError::InvalidConfig(format!("{name} grid is empty")));
    }

    for &value in values {
        ensure_positive(name, value)?;
    }

    for (idx, value) in values.iter().enumerate() {
        if values[..idx].contains(value) {
            return Err(ImpactError::InvalidConfig(format!(
                "{name} grid repeats the value {value}"
            )));
        }
    }

    Ok(())
}

/// Evaluates collision times for every (n_o, v_o) pair, outer over
/// `number_densities` [m^-3], inner over `velocities` [m/s], in input order.
///
/// With `disks`, the population-wide disk times are evaluated at every grid
/// point as well.
pub fn sweep(
    number_densities: &[f64],
    velocities: &[f64],
    disks: Option<&DiskPopulation>,
    model: EscapeVelocityModel,
    constants: &PhysicalConstants,
) -> Result<SweepResult> {
    check_grid("number density", number_densities)?;
    check_grid("relative velocity", velocities)?;

    let mut earth = Vec::with_capacity(number_densities.len() * velocities.len());
    let mut cells = Vec::new();

    for &number_density in number_densities {
        let density_au3 = si_to_per_au3(number_density, constants);

        for &velocity in velocities {
            let time = t_coll_earth(number_density, velocity, constants)?;
            earth.push(CollisionRow {
                number_density,
                density_au3,
                velocity,
                time,
            });

            if let Some(disks) = disks {
                tracing::debug!(
                    density_au3,
                    velocity,
                    disks = disks.len(),
                    "evaluating disk collision times"
                );
                cells.push(DiskSweepCell {
                    number_density,
                    density_au3,
                    velocity,
                    times: t_coll_disk(number_density, velocity, disks, model, constants)?,
                });
            }
        }
    }

    Ok(SweepResult {
        earth: CollisionTable { rows: earth },
        disks: disks.map(|disks| DiskSweep {
            stellar_mass: disks.stellar_mass().to_vec(),
            cells,
        }),
    })
}

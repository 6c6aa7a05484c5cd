//! Pipeline driver
//!
//! Runs the stages strictly in order: stellar masses, disks, collision
//! sweeps, rocks, then the comparison of rock lifetimes with Earth collision
//! times. Any error aborts the run.

use serde::Serialize;
use tracing::info;

use crate::analysis::{
    log_histogram, summarize, survival_table, LogHistogram, PopulationSummary, SurvivalRow,
};
use crate::collision::{self, DiskCollisionTimes, EscapeVelocityModel, SweepResult};
use crate::config::PipelineConfig;
use crate::constants::PhysicalConstants;
use crate::disk::{build_disk_population, DiskPopulation};
use crate::imf::{ImfParams, QuantileSampler};
use crate::rock::{RockModel, RockNormalisation, RockPopulation};
use crate::sampling::{rock_stream_seed, uniform_open01};
use crate::units::{seconds_to_myr, si_to_per_au3};
use crate::Result;

/// Uniform draws and the stellar masses [kg] they map to, index-aligned
#[derive(Debug, Clone, PartialEq)]
pub struct StellarSample {
    pub draws: Vec<f64>,
    pub masses: Vec<f64>,
}

pub fn sample_stellar_population(
    count: usize,
    seed: u64,
    params: &ImfParams,
    constants: &PhysicalConstants,
) -> Result<StellarSample> {
    let sampler = QuantileSampler::new(params, constants)?;
    let draws = uniform_open01(count, seed);
    let masses = sampler.sample(&draws)?;
    Ok(StellarSample { draws, masses })
}

/// Collision times at the 'Oumuamua-like reference density and velocity
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCollision {
    pub number_density: f64,
    pub density_au3: f64,
    pub velocity: f64,
    pub earth_time: f64,
    pub disk_times: DiskCollisionTimes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub samples: usize,
    pub rock_samples: usize,
    pub escape_velocity_model: EscapeVelocityModel,
    pub rock_normalisation: RockNormalisation,
    pub reduction_factor: f64,
    pub reference_density_au3: f64,
    pub reference_velocity_km_s: f64,
    pub earth_collision_time_myr: f64,
    pub stellar_mass_msun: PopulationSummary,
    pub disk_density_kg_m3: PopulationSummary,
    pub disk_side_time_myr: PopulationSummary,
    pub disk_top_time_myr: PopulationSummary,
    pub rock_mass_kg: PopulationSummary,
    pub rock_lifetime_myr: PopulationSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub config: PipelineConfig,
    pub stellar: StellarSample,
    pub disks: DiskPopulation,
    pub sweep: SweepResult,
    pub reference: ReferenceCollision,
    pub rocks: RockPopulation,
    pub survival: Vec<SurvivalRow>,
    /// Stellar masses binned in solar masses between the IMF limits
    pub imf_histogram: LogHistogram,
    pub rock_histogram: LogHistogram,
    pub summary: RunSummary,
}

fn myr_summary(seconds: &[f64], constants: &PhysicalConstants) -> PopulationSummary {
    let myr: Vec<f64> = seconds.iter().map(|&t| seconds_to_myr(t, constants)).collect();
    summarize(&myr)
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;
    let constants = &config.constants;

    info!(samples = config.samples, seed = config.seed, "sampling stellar masses");
    let stellar = sample_stellar_population(config.samples, config.seed, &config.imf, constants)?;

    info!(
        reduction_factor = config.disk.reduction_factor,
        "building disk population"
    );
    let disks = build_disk_population(&stellar.masses, &config.disk, constants)?;
    disks.ensure_aligned("disk population", stellar.masses.len())?;

    let number_densities = config.number_density_grid();
    let velocities = config.velocity_grid();
    info!(
        densities = number_densities.len(),
        velocities = velocities.len(),
        disk_sweep = config.disk_sweep,
        model = ?config.escape_velocity_model,
        "sweeping collision times"
    );
    let sweep = collision::sweep(
        &number_densities,
        &velocities,
        config.disk_sweep.then_some(&disks),
        config.escape_velocity_model,
        constants,
    )?;

    let (n_o, v_o) = config.reference_point();
    let reference = ReferenceCollision {
        number_density: n_o,
        density_au3: si_to_per_au3(n_o, constants),
        velocity: v_o,
        earth_time: collision::t_coll_earth(n_o, v_o, constants)?,
        disk_times: collision::t_coll_disk(
            n_o,
            v_o,
            &disks,
            config.escape_velocity_model,
            constants,
        )?,
    };
    disks.ensure_aligned("reference disk collision times", reference.disk_times.len())?;
    info!(
        earth_time_myr = seconds_to_myr(reference.earth_time, constants),
        "reference Earth collision time"
    );

    info!(
        rock_samples = config.rock_samples,
        normalisation = ?config.rock.normalisation,
        "sampling rock masses"
    );
    let rock_model = RockModel::new(&config.rock, constants)?;
    let rock_draws = uniform_open01(config.rock_samples, rock_stream_seed(config.seed));
    let rocks = rock_model.build_population(&rock_draws)?;

    info!("comparing rock lifetimes with collision times");
    let survival = survival_table(&rocks.lifetime, &sweep.earth);

    let stellar_msun: Vec<f64> = stellar
        .masses
        .iter()
        .map(|&m| m / constants.solar_mass)
        .collect();
    let imf_histogram = log_histogram(
        &stellar_msun,
        config.imf.lower_mass,
        config.imf.upper_mass,
        config.histogram_bins,
    )?;
    let (rock_lower, rock_upper) = rock_model.mass_support();
    let rock_histogram = log_histogram(&rocks.mass, rock_lower, rock_upper, config.histogram_bins)?;

    let summary = RunSummary {
        seed: config.seed,
        samples: config.samples,
        rock_samples: config.rock_samples,
        escape_velocity_model: config.escape_velocity_model,
        rock_normalisation: config.rock.normalisation,
        reduction_factor: config.disk.reduction_factor,
        reference_density_au3: config.reference_density_au3,
        reference_velocity_km_s: config.reference_velocity_km_s,
        earth_collision_time_myr: seconds_to_myr(reference.earth_time, constants),
        stellar_mass_msun: summarize(&stellar_msun),
        disk_density_kg_m3: summarize(disks.density()),
        disk_side_time_myr: myr_summary(&reference.disk_times.side, constants),
        disk_top_time_myr: myr_summary(&reference.disk_times.top, constants),
        rock_mass_kg: summarize(&rocks.mass),
        rock_lifetime_myr: myr_summary(&rocks.lifetime, constants),
    };

    info!("pipeline complete");
    Ok(PipelineOutput {
        config: config.clone(),
        stellar,
        disks,
        sweep,
        reference,
        rocks,
        survival,
        imf_histogram,
        rock_histogram,
        summary,
    })
}

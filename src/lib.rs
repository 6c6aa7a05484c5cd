//! iso-impact - interstellar object impact statistics
//!
//! Monte Carlo pipeline that samples a stellar initial mass function, derives
//! protoplanetary disk properties for every star, and estimates how long an
//! 'Oumuamua-like interstellar object takes to hit a disk or Earth. A separate
//! rock-mass distribution is converted into sublimation lifetimes so the two
//! timescales can be compared.

pub mod analysis;
pub mod collision;
pub mod config;
pub mod constants;
pub mod disk;
pub mod imf;
pub mod output;
pub mod pipeline;
pub mod rock;
pub mod sampling;
pub mod units;

use thiserror::Error;

pub use collision::{
    sweep, t_coll_disk, t_coll_earth, CollisionTable, DiskCollisionTimes, DiskSweep,
    EscapeVelocityModel, SweepResult,
};
pub use config::PipelineConfig;
pub use constants::PhysicalConstants;
pub use disk::{build_disk_population, DiskParams, DiskPopulation, DiskState};
pub use imf::{sample_stellar_masses, ImfParams, QuantileSampler};
pub use output::{create_timestamped_output_dir, write_pipeline_output, OutputFiles};
pub use pipeline::{run_pipeline, sample_stellar_population, PipelineOutput};
pub use rock::{sample_rock_masses, RockModel, RockNormalisation, RockParams, RockPopulation};

#[derive(Debug, Error)]
pub enum ImpactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{quantity} outside its domain: {value}")]
    Domain { quantity: &'static str, value: f64 },
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
}

pub type Result<T> = std::result::Result<T, ImpactError>;

pub(crate) fn ensure_len(context: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        return Ok(());
    }

    Err(ImpactError::LengthMismatch {
        context,
        expected,
        got,
    })
}

pub(crate) fn ensure_positive(quantity: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ImpactError::Domain { quantity, value })
    }
}

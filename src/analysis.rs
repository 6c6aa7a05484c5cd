//! Derived statistics handed to plotting: rock survival against collision
//! times, population summaries and log-binned histograms.

use serde::Serialize;

use crate::collision::CollisionTable;
use crate::{ImpactError, Result};

/// Fraction of rocks whose sublimation lifetime exceeds `collision_time`
pub fn survival_fraction(lifetimes: &[f64], collision_time: f64) -> f64 {
    if lifetimes.is_empty() {
        return 0.0;
    }

    let survivors = lifetimes.iter().filter(|&&t| t > collision_time).count();
    survivors as f64 / lifetimes.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurvivalRow {
    pub density_au3: f64,
    pub velocity: f64,
    pub collision_time: f64,
    pub survival_fraction: f64,
}

/// Survival fraction of the rock population at every Earth grid point
pub fn survival_table(lifetimes: &[f64], earth: &CollisionTable) -> Vec<SurvivalRow> {
    let mut sorted = lifetimes.to_vec();
    sorted.sort_by(f64::total_cmp);

    earth
        .iter()
        .map(|row| {
            let survivors = sorted.len() - sorted.partition_point(|&t| t <= row.time);
            let fraction = if sorted.is_empty() {
                0.0
            } else {
                survivors as f64 / sorted.len() as f64
            };
            SurvivalRow {
                density_au3: row.density_au3,
                velocity: row.velocity,
                collision_time: row.time,
                survival_fraction: fraction,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PopulationSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

pub fn summarize(values: &[f64]) -> PopulationSummary {
    if values.is_empty() {
        return PopulationSummary::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    };

    PopulationSummary {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean: sorted.iter().sum::<f64>() / count as f64,
        median,
    }
}

/// Counts in logarithmically spaced bins. Values equal to the upper edge
/// land in the last bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogHistogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub underflow: usize,
    pub overflow: usize,
}

pub fn log_histogram(values: &[f64], lower: f64, upper: f64, bins: usize) -> Result<LogHistogram> {
    if bins == 0 {
        return Err(ImpactError::InvalidConfig(
            "histogram needs at least one bin".to_string(),
        ));
    }

    if !(lower.is_finite() && upper.is_finite() && lower > 0.0 && upper > lower) {
        return Err(ImpactError::InvalidConfig(format!(
            "histogram range must satisfy 0 < lower < upper, got [{lower}, {upper}]"
        )));
    }

    let log_lower = lower.log10();
    let step = (upper.log10() - log_lower) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins)
        .map(|idx| 10f64.powf(log_lower + step * idx as f64))
        .collect();
    edges[0] = lower;
    edges[bins] = upper;

    let mut counts = vec![0; bins];
    let mut underflow = 0;
    let mut overflow = 0;

    for &value in values {
        if value < lower {
            underflow += 1;
        } else if value > upper {
            overflow += 1;
        } else {
            let bin = edges.partition_point(|&edge| edge <= value).saturating_sub(1);
            counts[bin.min(bins - 1)] += 1;
        }
    }

    Ok(LogHistogram {
        edges,
        counts,
        underflow,
        overflow,
    })
}

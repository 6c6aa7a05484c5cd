use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use serde::Serialize;

use crate::analysis::{LogHistogram, SurvivalRow};
use crate::collision::{CollisionTable, DiskCollisionTimes, DiskSweep};
use crate::disk::DiskPopulation;
use crate::pipeline::PipelineOutput;
use crate::rock::RockPopulation;
use crate::{ensure_len, Result};

pub const DEFAULT_OUTPUT_ROOT: &str = "output-iso-impact";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
}

/// Fresh `root/<UTC timestamp>` directory; a counter suffix avoids reuse
pub fn create_timestamped_output_dir(root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

/// Shortest representation that parses back to the same float
fn fmt_f64(value: f64) -> String {
    format!("{value:e}")
}

pub fn write_stellar_masses_csv(path: &Path, draws: &[f64], masses: &[f64]) -> Result<()> {
    ensure_len("stellar masses", draws.len(), masses.len())?;

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["u", "stellar_mass"])?;
    for (u, mass) in draws.iter().zip(masses) {
        writer.write_record([fmt_f64(*u), fmt_f64(*mass)])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_disk_population_csv(path: &Path, disks: &DiskPopulation) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "stellar_mass",
        "radius",
        "reduced_radius",
        "volume",
        "disk_mass",
        "dust_mass",
        "density",
        "csa_sideview",
        "csa_topview",
    ])?;

    for disk in disks.iter() {
        writer.write_record([
            fmt_f64(disk.stellar_mass),
            fmt_f64(disk.radius),
            fmt_f64(disk.reduced_radius),
            fmt_f64(disk.volume),
            fmt_f64(disk.disk_mass),
            fmt_f64(disk.dust_mass),
            fmt_f64(disk.density),
            fmt_f64(disk.csa_sideview),
            fmt_f64(disk.csa_topview),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_rock_population_csv(path: &Path, rocks: &RockPopulation) -> Result<()> {
    ensure_len("rock radius", rocks.mass.len(), rocks.radius.len())?;
    ensure_len("rock lifetime", rocks.mass.len(), rocks.lifetime.len())?;

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["mass", "radius", "lifetime"])?;
    for idx in 0..rocks.len() {
        writer.write_record([
            fmt_f64(rocks.mass[idx]),
            fmt_f64(rocks.radius[idx]),
            fmt_f64(rocks.lifetime[idx]),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_earth_collision_csv(path: &Path, table: &CollisionTable) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["number_density", "density_au3", "velocity", "time"])?;
    for row in table.iter() {
        writer.write_record([
            fmt_f64(row.number_density),
            fmt_f64(row.density_au3),
            fmt_f64(row.velocity),
            fmt_f64(row.time),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_earth_collision_json(path: &Path, table: &CollisionTable) -> Result<()> {
    let payload = serde_json::to_string_pretty(&table.to_nested_json())?;
    fs::write(path, payload)?;
    Ok(())
}

pub fn write_disk_collision_csv(
    path: &Path,
    stellar_mass: &[f64],
    times: &DiskCollisionTimes,
) -> Result<()> {
    ensure_len("disk side times", stellar_mass.len(), times.side.len())?;
    ensure_len("disk top times", stellar_mass.len(), times.top.len())?;

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["stellar_mass", "side", "top"])?;
    for idx in 0..stellar_mass.len() {
        writer.write_record([
            fmt_f64(stellar_mass[idx]),
            fmt_f64(times.side[idx]),
            fmt_f64(times.top[idx]),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct DiskSweepSummaryRow {
    density_au3: String,
    velocity: String,
    side_min: String,
    side_median: String,
    side_max: String,
    top_min: String,
    top_median: String,
    top_max: String,
}

/// One row per grid cell with the spread of disk collision times
pub fn write_disk_sweep_summary_csv(path: &Path, sweep: &DiskSweep) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for cell in sweep.cells() {
        let side = crate::analysis::summarize(&cell.times.side);
        let top = crate::analysis::summarize(&cell.times.top);
        writer.serialize(DiskSweepSummaryRow {
            density_au3: fmt_f64(cell.density_au3),
            velocity: fmt_f64(cell.velocity),
            side_min: fmt_f64(side.min),
            side_median: fmt_f64(side.median),
            side_max: fmt_f64(side.max),
            top_min: fmt_f64(top.min),
            top_median: fmt_f64(top.median),
            top_max: fmt_f64(top.max),
        })?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_survival_csv(path: &Path, rows: &[SurvivalRow]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["density_au3", "velocity", "collision_time", "survival_fraction"])?;
    for row in rows {
        writer.write_record([
            fmt_f64(row.density_au3),
            fmt_f64(row.velocity),
            fmt_f64(row.collision_time),
            fmt_f64(row.survival_fraction),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_histogram_csv(path: &Path, histogram: &LogHistogram) -> Result<()> {
    ensure_len(
        "histogram edges",
        histogram.counts.len() + 1,
        histogram.edges.len(),
    )?;

    let mut writer = Writer::from_path(path)?;
    writer.write_record(["lower_edge", "upper_edge", "count"])?;
    for (idx, count) in histogram.counts.iter().enumerate() {
        writer.write_record([
            fmt_f64(histogram.edges[idx]),
            fmt_f64(histogram.edges[idx + 1]),
            count.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Writes every artifact of a pipeline run into `output_dir`
pub fn write_pipeline_output(output_dir: &Path, output: &PipelineOutput) -> Result<OutputFiles> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();
    let mut target = |name: &str| {
        let path = output_dir.join(name);
        written.push(path.clone());
        path
    };

    write_json(&target("config.json"), &output.config)?;
    write_stellar_masses_csv(
        &target("stellar_masses.csv"),
        &output.stellar.draws,
        &output.stellar.masses,
    )?;
    write_disk_population_csv(&target("disk_population.csv"), &output.disks)?;
    write_earth_collision_csv(&target("earth_collision_times.csv"), &output.sweep.earth)?;
    write_earth_collision_json(&target("earth_collision_times.json"), &output.sweep.earth)?;
    write_disk_collision_csv(
        &target("disk_collision_times.csv"),
        output.disks.stellar_mass(),
        &output.reference.disk_times,
    )?;
    if let Some(disk_sweep) = &output.sweep.disks {
        write_disk_sweep_summary_csv(&target("disk_sweep_summary.csv"), disk_sweep)?;
    }
    write_rock_population_csv(&target("rock_population.csv"), &output.rocks)?;
    write_survival_csv(&target("survival.csv"), &output.survival)?;
    write_histogram_csv(&target("imf_histogram.csv"), &output.imf_histogram)?;
    write_histogram_csv(&target("rock_mass_histogram.csv"), &output.rock_histogram)?;
    write_json(&target("summary.json"), &output.summary)?;

    tracing::info!(
        files = written.len(),
        dir = %output_dir.display(),
        "wrote pipeline artifacts"
    );

    Ok(OutputFiles {
        output_dir: output_dir.to_path_buf(),
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::log_histogram;
    use crate::collision::CollisionRow;

    #[test]
    fn floats_are_written_in_round_trip_form() {
        for value in [0.1, 1.0 / 3.0, 1.988_409_870_698_051e30, 7.04e-24] {
            assert_eq!(fmt_f64(value).parse::<f64>().unwrap(), value);
        }
    }

    #[test]
    fn earth_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("earth.csv");
        let table = CollisionTable {
            rows: vec![CollisionRow {
                number_density: 1e-30,
                density_au3: 3.348,
                velocity: 26_000.0,
                time: 4.25e15,
            }],
        };
        write_earth_collision_csv(&path, &table).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines[0], "number_density,density_au3,velocity,time");
        assert_eq!(lines[1], "1e-30,3.348e0,2.6e4,4.25e15");
    }

    #[test]
    fn mismatched_stellar_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_stellar_masses_csv(&dir.path().join("s.csv"), &[0.5], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn histogram_csv_lists_every_bin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.csv");
        let histogram = log_histogram(&[1.5, 2.5, 7.0], 1.0, 10.0, 4).unwrap();
        write_histogram_csv(&path, &histogram).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 5);
    }

    #[test]
    fn timestamped_dirs_do_not_collide() {
        let root = tempfile::tempdir().unwrap();
        let a = create_timestamped_output_dir(root.path()).unwrap();
        let b = create_timestamped_output_dir(root.path()).unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
    }
}

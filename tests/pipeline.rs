use std::fs;

use iso_impact::collision::decode_nested_json;
use iso_impact::units::{per_au3_to_si, seconds_to_myr};
use iso_impact::{run_pipeline, write_pipeline_output, PipelineConfig};

fn config() -> PipelineConfig {
    PipelineConfig {
        samples: 2_000,
        rock_samples: 1_500,
        seed: 42,
        histogram_bins: 20,
        ..PipelineConfig::default()
    }
}

#[test]
fn repeated_runs_write_identical_artifacts() {
    let config = config();
    let first = run_pipeline(&config).unwrap();
    let second = run_pipeline(&config).unwrap();

    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let files_a = write_pipeline_output(dir_a.path(), &first).unwrap();
    let files_b = write_pipeline_output(dir_b.path(), &second).unwrap();

    assert_eq!(files_a.written.len(), files_b.written.len());
    for (a, b) in files_a.written.iter().zip(&files_b.written) {
        assert_eq!(a.file_name(), b.file_name());
        let bytes_a = fs::read(a).unwrap();
        let bytes_b = fs::read(b).unwrap();
        assert!(!bytes_a.is_empty(), "{} is empty", a.display());
        assert_eq!(bytes_a, bytes_b, "{} differs between runs", a.display());
    }
}

#[test]
fn earth_grid_is_keyed_by_si_density_and_raw_velocity() {
    let config = config();
    let output = run_pipeline(&config).unwrap();
    let constants = &config.constants;

    assert_eq!(output.sweep.earth.len(), 25);
    for &n_au3 in &config.number_densities_au3 {
        for &v_km_s in &config.velocities_km_s {
            let n_o = per_au3_to_si(n_au3, constants);
            let v_o = v_km_s * 1.0e3;
            let time = output.sweep.earth.get(n_o, v_o).unwrap();
            assert!(time.is_finite() && time > 0.0);
        }
    }

    let myr = seconds_to_myr(output.reference.earth_time, constants);
    assert!((myr / 134.730_135_709_21 - 1.0).abs() < 1e-9);
    assert_eq!(output.summary.earth_collision_time_myr, myr);
}

#[test]
fn nested_json_dump_round_trips() {
    let output = run_pipeline(&config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_pipeline_output(dir.path(), &output).unwrap();

    let raw = fs::read_to_string(dir.path().join("earth_collision_times.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let triples = decode_nested_json(&value).unwrap();

    assert_eq!(triples.len(), output.sweep.earth.len());
    for row in output.sweep.earth.iter() {
        assert!(triples.iter().any(|&(density, velocity, time)| {
            density == row.density_au3 && velocity == row.velocity && time == row.time
        }));
    }
}

#[test]
fn disk_invariants_hold_across_the_population() {
    let output = run_pipeline(&config()).unwrap();
    let disks = &output.disks;

    assert_eq!(disks.len(), output.stellar.masses.len());
    for disk in disks.iter() {
        assert!((disk.disk_mass / (0.1 * disk.stellar_mass) - 1.0).abs() < 1e-12);
        assert!((disk.dust_mass / (0.01 * disk.disk_mass) - 1.0).abs() < 1e-12);
        assert!(disk.density > 0.0);
    }

    let sweep = output.sweep.disks.as_ref().unwrap();
    assert!(sweep
        .rows()
        .all(|row| row.side.is_finite() && row.top.is_finite() && row.side > row.top));
}

#[test]
fn config_file_drives_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.toml");
    fs::write(
        &path,
        "samples = 300\nrock_samples = 200\nseed = 9\ndisk_sweep = false\n\n[rock]\nnormalisation = \"unnormalised\"\n",
    )
    .unwrap();

    let config = PipelineConfig::load(Some(&path)).unwrap();
    let output = run_pipeline(&config).unwrap();

    assert_eq!(output.stellar.masses.len(), 300);
    assert!(output.sweep.disks.is_none());
    let (lower, upper) = (10.0, config.constants.moon_mass);
    assert!(output
        .rocks
        .mass
        .iter()
        .all(|&m| m >= lower * (1.0 - 1e-12) && m <= upper * (1.0 + 1e-12)));
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use iso_impact::output::DEFAULT_OUTPUT_ROOT;
use iso_impact::units::seconds_to_myr;
use iso_impact::{create_timestamped_output_dir, run_pipeline, write_pipeline_output, PipelineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Interstellar object collision times with protoplanetary disks and Earth"
)]
struct Cli {
    /// JSON or TOML run configuration (defaults to ./iso_impact.json if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory; a timestamped directory under output-iso-impact/ by default
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of stellar mass draws
    #[arg(long)]
    samples: Option<usize>,

    /// Number of rock mass draws
    #[arg(long)]
    rock_samples: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Divisor applied to disk radii
    #[arg(long)]
    reduction_factor: Option<f64>,

    /// Skip the per-disk sweep over the density/velocity grid
    #[arg(long)]
    no_disk_sweep: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("failed to load config")?;
    if let Some(v) = cli.samples {
        config.samples = v;
    }
    if let Some(v) = cli.rock_samples {
        config.rock_samples = v;
    }
    if let Some(v) = cli.seed {
        config.seed = v;
    }
    if let Some(v) = cli.reduction_factor {
        config.disk.reduction_factor = v;
    }
    if cli.no_disk_sweep {
        config.disk_sweep = false;
    }
    config.validate().context("invalid configuration")?;

    let output_dir = match cli.output {
        Some(dir) => dir,
        None => create_timestamped_output_dir(&PathBuf::from(DEFAULT_OUTPUT_ROOT))
            .context("failed to create output directory")?,
    };

    let output = run_pipeline(&config).context("pipeline run failed")?;
    let files = write_pipeline_output(&output_dir, &output)
        .with_context(|| format!("failed to write artifacts to {}", output_dir.display()))?;

    println!(
        "Earth collision time at {} AU^-3, {} km/s: {:.3} Myr",
        config.reference_density_au3,
        config.reference_velocity_km_s,
        seconds_to_myr(output.reference.earth_time, &config.constants)
    );
    println!("Output directory: {}", files.output_dir.display());
    Ok(())
}

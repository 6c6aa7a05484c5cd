use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::collision::EscapeVelocityModel;
use crate::constants::PhysicalConstants;
use crate::disk::DiskParams;
use crate::imf::ImfParams;
use crate::rock::RockParams;
use crate::units::{km_s_to_m_s, per_au3_to_si};
use crate::{ImpactError, Result};

pub const DEFAULT_SAMPLES: usize = 1_000_000;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of stellar mass draws
    #[serde_as(as = "DefaultOnNull")]
    pub samples: usize,
    /// Number of rock mass draws
    #[serde_as(as = "DefaultOnNull")]
    pub rock_samples: usize,
    #[serde_as(as = "DefaultOnNull")]
    pub seed: u64,
    /// Number density grid [AU^-3]
    pub number_densities_au3: Vec<f64>,
    /// Relative velocity grid [km/s]
    pub velocities_km_s: Vec<f64>,
    /// 'Oumuamua-like number density [AU^-3]
    #[serde_as(as = "DefaultOnNull")]
    pub reference_density_au3: f64,
    /// 'Oumuamua-like velocity relative to the Sun [km/s]
    #[serde_as(as = "DefaultOnNull")]
    pub reference_velocity_km_s: f64,
    /// Evaluate disk collision times at every grid point, not just the reference
    #[serde_as(as = "DefaultOnNull")]
    pub disk_sweep: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub escape_velocity_model: EscapeVelocityModel,
    #[serde_as(as = "DefaultOnNull")]
    pub histogram_bins: usize,
    pub imf: ImfParams,
    pub disk: DiskParams,
    pub rock: RockParams,
    pub constants: PhysicalConstants,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            rock_samples: DEFAULT_SAMPLES,
            seed: 0x1_0A4A_2017_u64,
            number_densities_au3: vec![0.01, 0.05, 0.1, 0.5, 1.0],
            velocities_km_s: vec![1.0, 5.0, 10.0, 20.0, 30.0],
            reference_density_au3: 0.2,
            reference_velocity_km_s: 26.0,
            disk_sweep: true,
            escape_velocity_model: EscapeVelocityModel::StarAndDisk,
            histogram_bins: 50,
            imf: ImfParams::default(),
            disk: DiskParams::default(),
            rock: RockParams::default(),
            constants: PhysicalConstants::default(),
        }
    }
}

fn validate_grid(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(ImpactError::InvalidConfig(format!(
            "{name} must contain at least one value"
        )));
    }

    if values.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
        return Err(ImpactError::InvalidConfig(format!(
            "{name} must contain only finite values greater than zero"
        )));
    }

    if values.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(ImpactError::InvalidConfig(format!(
            "{name} must be strictly increasing"
        )));
    }

    Ok(())
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(ImpactError::InvalidConfig(
                "samples must be greater than zero".to_string(),
            ));
        }

        if self.rock_samples == 0 {
            return Err(ImpactError::InvalidConfig(
                "rock_samples must be greater than zero".to_string(),
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ImpactError::InvalidConfig(
                "histogram_bins must be greater than zero".to_string(),
            ));
        }

        validate_grid("number_densities_au3", &self.number_densities_au3)?;
        validate_grid("velocities_km_s", &self.velocities_km_s)?;

        for (name, value) in [
            ("reference_density_au3", self.reference_density_au3),
            ("reference_velocity_km_s", self.reference_velocity_km_s),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ImpactError::InvalidConfig(format!(
                    "{name} must be finite and greater than zero"
                )));
            }
        }

        if !self.constants.is_finite_positive() {
            return Err(ImpactError::InvalidConfig(
                "physical constants must be finite and positive".to_string(),
            ));
        }

        self.imf.validate()?;
        self.disk.validate()?;
        self.rock.validate(&self.constants)?;
        Ok(())
    }

    /// Number density grid [m^-3]
    pub fn number_density_grid(&self) -> Vec<f64> {
        self.number_densities_au3
            .iter()
            .map(|&n| per_au3_to_si(n, &self.constants))
            .collect()
    }

    /// Velocity grid [m/s]
    pub fn velocity_grid(&self) -> Vec<f64> {
        self.velocities_km_s.iter().map(|&v| km_s_to_m_s(v)).collect()
    }

    /// Reference (n_o [m^-3], v_o [m/s])
    pub fn reference_point(&self) -> (f64, f64) {
        (
            per_au3_to_si(self.reference_density_au3, &self.constants),
            km_s_to_m_s(self.reference_velocity_km_s),
        )
    }

    /// Loads a config from JSON, or TOML when the extension is `.toml`
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            toml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };
        Ok(config)
    }

    /// Loads `path` if given, else `iso_impact.json` from the working
    /// directory if present, else the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let cwd_config = Path::new("iso_impact.json");
        if cwd_config.exists() {
            return Self::from_file(cwd_config);
        }

        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;
    use crate::collision::EscapeVelocityModel;
    use crate::rock::RockNormalisation;
    use crate::ImpactError;

    #[test]
    fn defaults_are_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn non_monotone_grid_is_reported() {
        let config = PipelineConfig {
            velocities_km_s: vec![1.0, 10.0, 5.0],
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ImpactError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_density_is_reported() {
        let config = PipelineConfig {
            number_densities_au3: vec![0.0, 0.1],
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_reduction_factor_is_reported() {
        let mut config = PipelineConfig::default();
        config.disk.reduction_factor = -10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn grids_convert_to_si() {
        let config = PipelineConfig::default();
        let densities = config.number_density_grid();
        assert_eq!(densities.len(), 5);
        assert_eq!(densities[4], 1.0 / config.constants.au_cubed());
        assert_eq!(config.velocity_grid()[2], 10_000.0);

        let (n_o, v_o) = config.reference_point();
        assert_eq!(n_o, 0.2 / config.constants.au_cubed());
        assert_eq!(v_o, 26_000.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let raw = r#"{
            "samples": 1000,
            "disk_sweep": null,
            "escape_velocity_model": "disk_only",
            "rock": { "normalisation": "unnormalised" }
        }"#;
        let config: PipelineConfig = serde_json::from_str(raw).unwrap();
        let defaults = PipelineConfig::default();

        assert_eq!(config.samples, 1000);
        assert_eq!(config.seed, defaults.seed);
        assert!(!config.disk_sweep);
        assert_eq!(config.escape_velocity_model, EscapeVelocityModel::DiskOnly);
        assert_eq!(config.rock.normalisation, RockNormalisation::Unnormalised);
        assert_eq!(config.rock.exponent, defaults.rock.exponent);
        assert_eq!(config.velocities_km_s, defaults.velocities_km_s);
    }

    #[test]
    fn toml_config_is_accepted() {
        let raw = r#"
            samples = 500
            velocities_km_s = [2.0, 4.0]

            [disk]
            reduction_factor = 10.0
        "#;
        let config: PipelineConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.samples, 500);
        assert_eq!(config.velocities_km_s, vec![2.0, 4.0]);
        assert_eq!(config.disk.reduction_factor, 10.0);
        config.validate().unwrap();
    }
}

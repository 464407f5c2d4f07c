//! Simulation configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use rusim_models::power::profile::{check_finite, options};
use rusim_models::power::{ConfigError, HardwareProfile, HardwareProfileBuilder};

use crate::source::BasicEnergySourceConfig;

const DEFAULT_TX_POWER_DBM: f64 = 30.;
const DEFAULT_SIMULATION_LENGTH: f64 = 60.;
const DEFAULT_SEED: u64 = 123;

/// Error returned when a configuration file can not be loaded.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file can not be read.
    #[error("can't read file {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not a valid YAML config.
    #[error("can't parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Some option is outside of its domain.
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Holds raw config parsed from YAML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuEnergyConfig {
    ru: Option<HardwareProfileBuilder>,
    tx_power_dbm: Option<f64>,
    energy_source: Option<BasicEnergySourceConfig>,
    simulation: Option<SimulationSettings>,
}

/// Parameters of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSettings {
    /// Length of simulation in seconds.
    #[serde(default = "default_simulation_length")]
    pub length: f64,
    /// Random seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_simulation_length() -> f64 {
    DEFAULT_SIMULATION_LENGTH
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            length: DEFAULT_SIMULATION_LENGTH,
            seed: DEFAULT_SEED,
        }
    }
}

/// Configuration of a radio unit energy simulation.
///
/// Example YAML file (all fields are optional):
///
/// ```yaml
/// ru:
///   EtaPA: 0.3
///   FixedOverheadW: 80
///   NumTrx: 64
///   DeltaDC: 0.07
///   DeltaMS: 0.09
///   DeltaCool: 0.1
///   Vdc: 48
///   SleepPowerW: 5
///   SleepThresholdDbm: 0
///   LossesInSleep: false
/// tx_power_dbm: 30
/// energy_source:
///   initial_energy_j: 1.0e7
///   supply_voltage_v: 48
///   update_interval: 1
/// simulation:
///   length: 3600
///   seed: 123
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RuEnergyConfig {
    /// Radio unit hardware profile.
    pub profile: HardwareProfile,
    /// Fallback transmit power in dBm.
    pub tx_power_dbm: f64,
    /// Energy source parameters.
    pub energy_source: BasicEnergySourceConfig,
    /// Simulation run parameters.
    pub simulation: SimulationSettings,
}

impl Default for RuEnergyConfig {
    fn default() -> Self {
        Self {
            profile: HardwareProfile::default(),
            tx_power_dbm: DEFAULT_TX_POWER_DBM,
            energy_source: BasicEnergySourceConfig::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl RuEnergyConfig {
    /// Creates config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Result<Self, ConfigFileError> {
        let yaml = std::fs::read_to_string(file_name).map_err(|source| ConfigFileError::Io {
            path: file_name.to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Creates config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigFileError> {
        let raw: RawRuEnergyConfig = serde_yaml::from_str(yaml)?;
        let profile = raw.ru.unwrap_or_default().build()?;
        let tx_power_dbm = check_finite(options::TX_POWER_DBM, raw.tx_power_dbm.unwrap_or(DEFAULT_TX_POWER_DBM))?;
        let energy_source = raw.energy_source.unwrap_or_default();
        energy_source.validate()?;
        let simulation = raw.simulation.unwrap_or_default();
        if !(simulation.length >= 0. && simulation.length.is_finite()) {
            return Err(ConfigError::out_of_domain("SimulationLength", simulation.length, "a finite value >= 0").into());
        }
        Ok(Self {
            profile,
            tx_power_dbm,
            energy_source,
            simulation,
        })
    }
}

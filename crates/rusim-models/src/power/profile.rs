//! Radio unit hardware profile.

use serde::{Deserialize, Serialize};

use crate::power::error::ConfigError;

/// Names of the recognized configuration options.
pub mod options {
    /// Power amplifier efficiency.
    pub const ETA_PA: &str = "EtaPA";
    /// Fixed per-TRX overhead power in W.
    pub const FIXED_OVERHEAD_W: &str = "FixedOverheadW";
    /// Additional per-TRX mmWave overhead power in W.
    pub const MMWAVE_OVERHEAD_W: &str = "MmwaveOverheadW";
    /// Feeder (antenna cable) loss fraction.
    pub const DELTA_AF: &str = "DeltaAf";
    /// DC-DC conversion loss fraction.
    pub const DELTA_DC: &str = "DeltaDC";
    /// Mains supply loss fraction.
    pub const DELTA_MS: &str = "DeltaMS";
    /// Cooling loss fraction.
    pub const DELTA_COOL: &str = "DeltaCool";
    /// Number of TRX chains.
    pub const NUM_TRX: &str = "NumTrx";
    /// DC supply voltage in V.
    pub const VDC: &str = "Vdc";
    /// Per-TRX sleep power in W.
    pub const SLEEP_POWER_W: &str = "SleepPowerW";
    /// Sleep threshold in dBm.
    pub const SLEEP_THRESHOLD_DBM: &str = "SleepThresholdDbm";
    /// Whether supply and cooling losses apply in sleep state.
    pub const LOSSES_IN_SLEEP: &str = "LossesInSleep";
    /// Fallback transmit power in dBm.
    pub const TX_POWER_DBM: &str = "TxPowerDbm";
}

const DEFAULT_ETA_PA: f64 = 0.3;
const DEFAULT_FIXED_OVERHEAD_W: f64 = 80.;
const DEFAULT_MMWAVE_OVERHEAD_W: f64 = 0.;
const DEFAULT_DELTA_AF: f64 = 0.;
const DEFAULT_DELTA_DC: f64 = 0.07;
const DEFAULT_DELTA_MS: f64 = 0.09;
const DEFAULT_DELTA_COOL: f64 = 0.1;
const DEFAULT_NUM_TRX: u32 = 64;
const DEFAULT_VDC: f64 = 48.;
const DEFAULT_SLEEP_POWER_W: f64 = 5.;
const DEFAULT_SLEEP_THRESHOLD_DBM: f64 = 0.;

fn check_efficiency(option: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value > 0. && value <= 1. {
        Ok(value)
    } else {
        Err(ConfigError::out_of_domain(option, value, "a value in (0, 1]"))
    }
}

fn check_loss_fraction(option: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0. ..1.).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::out_of_domain(option, value, "a value in [0, 1)"))
    }
}

fn check_non_negative(option: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value >= 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::out_of_domain(option, value, "a finite value >= 0"))
    }
}

fn check_positive(option: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value > 0. && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::out_of_domain(option, value, "a finite value > 0"))
    }
}

/// Checks that the value is a finite real number, e.g. a power level in dBm.
pub fn check_finite(option: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::out_of_domain(option, value, "a finite value"))
    }
}

/// Hardware and efficiency parameters of a radio unit.
///
/// All fields are validated on assignment, so a profile always holds values
/// inside their domains:
///
/// | option | field | domain |
/// |---|---|---|
/// | `EtaPA` | PA efficiency | (0, 1] |
/// | `FixedOverheadW` | fixed per-TRX overhead, W | >= 0 |
/// | `MmwaveOverheadW` | mmWave per-TRX overhead, W | >= 0 |
/// | `DeltaAf`, `DeltaDC`, `DeltaMS`, `DeltaCool` | loss fractions | [0, 1) |
/// | `NumTrx` | TRX count | >= 1 |
/// | `Vdc` | DC supply voltage, V | > 0 |
/// | `SleepPowerW` | per-TRX sleep power, W | >= 0 |
/// | `SleepThresholdDbm` | sleep threshold, dBm | any finite value |
/// | `LossesInSleep` | apply supply losses in sleep | bool |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HardwareProfileBuilder", into = "HardwareProfileBuilder")]
pub struct HardwareProfile {
    eta_pa: f64,
    fixed_overhead_w: f64,
    mmwave_overhead_w: f64,
    delta_af: f64,
    delta_dc: f64,
    delta_ms: f64,
    delta_cool: f64,
    num_trx: u32,
    vdc: f64,
    sleep_power_w: f64,
    sleep_threshold_dbm: f64,
    losses_in_sleep: bool,
}

impl Default for HardwareProfile {
    /// Creates a profile of a 64-TRX macro radio unit
    /// with 30% PA efficiency and 80 W fixed overhead per TRX.
    fn default() -> Self {
        Self {
            eta_pa: DEFAULT_ETA_PA,
            fixed_overhead_w: DEFAULT_FIXED_OVERHEAD_W,
            mmwave_overhead_w: DEFAULT_MMWAVE_OVERHEAD_W,
            delta_af: DEFAULT_DELTA_AF,
            delta_dc: DEFAULT_DELTA_DC,
            delta_ms: DEFAULT_DELTA_MS,
            delta_cool: DEFAULT_DELTA_COOL,
            num_trx: DEFAULT_NUM_TRX,
            vdc: DEFAULT_VDC,
            sleep_power_w: DEFAULT_SLEEP_POWER_W,
            sleep_threshold_dbm: DEFAULT_SLEEP_THRESHOLD_DBM,
            losses_in_sleep: false,
        }
    }
}

impl HardwareProfile {
    /// Returns a builder initialized with default values.
    pub fn builder() -> HardwareProfileBuilder {
        HardwareProfileBuilder::default()
    }

    /// Returns power amplifier efficiency.
    pub fn eta_pa(&self) -> f64 {
        self.eta_pa
    }

    /// Returns fixed per-TRX overhead power in W.
    pub fn fixed_overhead_w(&self) -> f64 {
        self.fixed_overhead_w
    }

    /// Returns mmWave per-TRX overhead power in W.
    pub fn mmwave_overhead_w(&self) -> f64 {
        self.mmwave_overhead_w
    }

    /// Returns feeder loss fraction.
    pub fn delta_af(&self) -> f64 {
        self.delta_af
    }

    /// Returns DC-DC conversion loss fraction.
    pub fn delta_dc(&self) -> f64 {
        self.delta_dc
    }

    /// Returns mains supply loss fraction.
    pub fn delta_ms(&self) -> f64 {
        self.delta_ms
    }

    /// Returns cooling loss fraction.
    pub fn delta_cool(&self) -> f64 {
        self.delta_cool
    }

    /// Returns number of TRX chains.
    pub fn num_trx(&self) -> u32 {
        self.num_trx
    }

    /// Returns DC supply voltage in V.
    pub fn vdc(&self) -> f64 {
        self.vdc
    }

    /// Returns per-TRX sleep power in W.
    pub fn sleep_power_w(&self) -> f64 {
        self.sleep_power_w
    }

    /// Returns sleep threshold in dBm.
    pub fn sleep_threshold_dbm(&self) -> f64 {
        self.sleep_threshold_dbm
    }

    /// Returns whether DC-DC, mains and cooling losses are applied to sleep power.
    pub fn losses_in_sleep(&self) -> bool {
        self.losses_in_sleep
    }

    /// Sets power amplifier efficiency, must be in (0, 1].
    pub fn set_eta_pa(&mut self, eta_pa: f64) -> Result<&mut Self, ConfigError> {
        self.eta_pa = check_efficiency(options::ETA_PA, eta_pa)?;
        Ok(self)
    }

    /// Sets fixed per-TRX overhead power in W, must be non-negative.
    pub fn set_fixed_overhead_w(&mut self, power: f64) -> Result<&mut Self, ConfigError> {
        self.fixed_overhead_w = check_non_negative(options::FIXED_OVERHEAD_W, power)?;
        Ok(self)
    }

    /// Sets mmWave per-TRX overhead power in W, must be non-negative.
    pub fn set_mmwave_overhead_w(&mut self, power: f64) -> Result<&mut Self, ConfigError> {
        self.mmwave_overhead_w = check_non_negative(options::MMWAVE_OVERHEAD_W, power)?;
        Ok(self)
    }

    /// Sets feeder loss fraction, must be in [0, 1).
    pub fn set_delta_af(&mut self, loss: f64) -> Result<&mut Self, ConfigError> {
        self.delta_af = check_loss_fraction(options::DELTA_AF, loss)?;
        Ok(self)
    }

    /// Sets DC-DC conversion loss fraction, must be in [0, 1).
    pub fn set_delta_dc(&mut self, loss: f64) -> Result<&mut Self, ConfigError> {
        self.delta_dc = check_loss_fraction(options::DELTA_DC, loss)?;
        Ok(self)
    }

    /// Sets mains supply loss fraction, must be in [0, 1).
    pub fn set_delta_ms(&mut self, loss: f64) -> Result<&mut Self, ConfigError> {
        self.delta_ms = check_loss_fraction(options::DELTA_MS, loss)?;
        Ok(self)
    }

    /// Sets cooling loss fraction, must be in [0, 1).
    pub fn set_delta_cool(&mut self, loss: f64) -> Result<&mut Self, ConfigError> {
        self.delta_cool = check_loss_fraction(options::DELTA_COOL, loss)?;
        Ok(self)
    }

    /// Sets number of TRX chains, must be at least 1.
    pub fn set_num_trx(&mut self, num_trx: u32) -> Result<&mut Self, ConfigError> {
        if num_trx < 1 {
            return Err(ConfigError::out_of_domain(
                options::NUM_TRX,
                num_trx as f64,
                "an integer >= 1",
            ));
        }
        self.num_trx = num_trx;
        Ok(self)
    }

    /// Sets DC supply voltage in V, must be positive.
    pub fn set_vdc(&mut self, vdc: f64) -> Result<&mut Self, ConfigError> {
        self.vdc = check_positive(options::VDC, vdc)?;
        Ok(self)
    }

    /// Sets per-TRX sleep power in W, must be non-negative.
    pub fn set_sleep_power_w(&mut self, power: f64) -> Result<&mut Self, ConfigError> {
        self.sleep_power_w = check_non_negative(options::SLEEP_POWER_W, power)?;
        Ok(self)
    }

    /// Sets sleep threshold in dBm.
    pub fn set_sleep_threshold_dbm(&mut self, threshold: f64) -> Result<&mut Self, ConfigError> {
        self.sleep_threshold_dbm = check_finite(options::SLEEP_THRESHOLD_DBM, threshold)?;
        Ok(self)
    }

    /// Sets whether DC-DC, mains and cooling losses are applied to sleep power.
    pub fn set_losses_in_sleep(&mut self, losses_in_sleep: bool) -> &mut Self {
        self.losses_in_sleep = losses_in_sleep;
        self
    }

    /// Applies DC-DC, mains and cooling losses to the given power.
    pub fn apply_supply_losses(&self, power: f64) -> f64 {
        let dc = power / (1. - self.delta_dc);
        let mains = dc / (1. - self.delta_ms);
        mains / (1. - self.delta_cool)
    }
}

/// Builder of [`HardwareProfile`] validating all values on [`build()`](HardwareProfileBuilder::build).
///
/// Also serves as the serialized form of the profile, with fields named after the configuration options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardwareProfileBuilder {
    /// Power amplifier efficiency.
    #[serde(rename = "EtaPA", default = "default_eta_pa")]
    pub eta_pa: f64,
    /// Fixed per-TRX overhead power in W.
    #[serde(rename = "FixedOverheadW", default = "default_fixed_overhead_w")]
    pub fixed_overhead_w: f64,
    /// mmWave per-TRX overhead power in W.
    #[serde(rename = "MmwaveOverheadW", default)]
    pub mmwave_overhead_w: f64,
    /// Feeder loss fraction.
    #[serde(rename = "DeltaAf", default)]
    pub delta_af: f64,
    /// DC-DC conversion loss fraction.
    #[serde(rename = "DeltaDC", default = "default_delta_dc")]
    pub delta_dc: f64,
    /// Mains supply loss fraction.
    #[serde(rename = "DeltaMS", default = "default_delta_ms")]
    pub delta_ms: f64,
    /// Cooling loss fraction.
    #[serde(rename = "DeltaCool", default = "default_delta_cool")]
    pub delta_cool: f64,
    /// Number of TRX chains.
    #[serde(rename = "NumTrx", default = "default_num_trx")]
    pub num_trx: u32,
    /// DC supply voltage in V.
    #[serde(rename = "Vdc", default = "default_vdc")]
    pub vdc: f64,
    /// Per-TRX sleep power in W.
    #[serde(rename = "SleepPowerW", default = "default_sleep_power_w")]
    pub sleep_power_w: f64,
    /// Sleep threshold in dBm.
    #[serde(rename = "SleepThresholdDbm", default)]
    pub sleep_threshold_dbm: f64,
    /// Whether supply and cooling losses apply in sleep state.
    #[serde(rename = "LossesInSleep", default)]
    pub losses_in_sleep: bool,
}

fn default_eta_pa() -> f64 {
    DEFAULT_ETA_PA
}

fn default_fixed_overhead_w() -> f64 {
    DEFAULT_FIXED_OVERHEAD_W
}

fn default_delta_dc() -> f64 {
    DEFAULT_DELTA_DC
}

fn default_delta_ms() -> f64 {
    DEFAULT_DELTA_MS
}

fn default_delta_cool() -> f64 {
    DEFAULT_DELTA_COOL
}

fn default_num_trx() -> u32 {
    DEFAULT_NUM_TRX
}

fn default_vdc() -> f64 {
    DEFAULT_VDC
}

fn default_sleep_power_w() -> f64 {
    DEFAULT_SLEEP_POWER_W
}

impl Default for HardwareProfileBuilder {
    fn default() -> Self {
        HardwareProfile::default().into()
    }
}

impl HardwareProfileBuilder {
    /// Sets power amplifier efficiency.
    pub fn eta_pa(mut self, eta_pa: f64) -> Self {
        self.eta_pa = eta_pa;
        self
    }

    /// Sets fixed per-TRX overhead power in W.
    pub fn fixed_overhead_w(mut self, power: f64) -> Self {
        self.fixed_overhead_w = power;
        self
    }

    /// Sets mmWave per-TRX overhead power in W.
    pub fn mmwave_overhead_w(mut self, power: f64) -> Self {
        self.mmwave_overhead_w = power;
        self
    }

    /// Sets all four loss fractions: feeder, DC-DC, mains and cooling.
    pub fn losses(mut self, delta_af: f64, delta_dc: f64, delta_ms: f64, delta_cool: f64) -> Self {
        self.delta_af = delta_af;
        self.delta_dc = delta_dc;
        self.delta_ms = delta_ms;
        self.delta_cool = delta_cool;
        self
    }

    /// Sets number of TRX chains.
    pub fn num_trx(mut self, num_trx: u32) -> Self {
        self.num_trx = num_trx;
        self
    }

    /// Sets DC supply voltage in V.
    pub fn vdc(mut self, vdc: f64) -> Self {
        self.vdc = vdc;
        self
    }

    /// Sets per-TRX sleep power in W.
    pub fn sleep_power_w(mut self, power: f64) -> Self {
        self.sleep_power_w = power;
        self
    }

    /// Sets sleep threshold in dBm.
    pub fn sleep_threshold_dbm(mut self, threshold: f64) -> Self {
        self.sleep_threshold_dbm = threshold;
        self
    }

    /// Sets whether supply and cooling losses apply in sleep state.
    pub fn losses_in_sleep(mut self, losses_in_sleep: bool) -> Self {
        self.losses_in_sleep = losses_in_sleep;
        self
    }

    /// Validates the values and builds the profile.
    ///
    /// Returns the error for the first option found outside of its domain.
    pub fn build(self) -> Result<HardwareProfile, ConfigError> {
        let mut profile = HardwareProfile::default();
        profile
            .set_eta_pa(self.eta_pa)?
            .set_fixed_overhead_w(self.fixed_overhead_w)?
            .set_mmwave_overhead_w(self.mmwave_overhead_w)?
            .set_delta_af(self.delta_af)?
            .set_delta_dc(self.delta_dc)?
            .set_delta_ms(self.delta_ms)?
            .set_delta_cool(self.delta_cool)?
            .set_num_trx(self.num_trx)?
            .set_vdc(self.vdc)?
            .set_sleep_power_w(self.sleep_power_w)?
            .set_sleep_threshold_dbm(self.sleep_threshold_dbm)?
            .set_losses_in_sleep(self.losses_in_sleep);
        Ok(profile)
    }
}

impl TryFrom<HardwareProfileBuilder> for HardwareProfile {
    type Error = ConfigError;

    fn try_from(builder: HardwareProfileBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl From<HardwareProfile> for HardwareProfileBuilder {
    fn from(profile: HardwareProfile) -> Self {
        Self {
            eta_pa: profile.eta_pa,
            fixed_overhead_w: profile.fixed_overhead_w,
            mmwave_overhead_w: profile.mmwave_overhead_w,
            delta_af: profile.delta_af,
            delta_dc: profile.delta_dc,
            delta_ms: profile.delta_ms,
            delta_cool: profile.delta_cool,
            num_trx: profile.num_trx,
            vdc: profile.vdc,
            sleep_power_w: profile.sleep_power_w,
            sleep_threshold_dbm: profile.sleep_threshold_dbm,
            losses_in_sleep: profile.losses_in_sleep,
        }
    }
}

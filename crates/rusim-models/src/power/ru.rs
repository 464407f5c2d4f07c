//! Radio unit power model.

use serde::Serialize;

use crate::power::profile::HardwareProfile;
use crate::power::units::dbm_to_watts;

/// Operating state of a radio unit derived from its transmit power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperatingState {
    /// Transmit power is above the sleep threshold.
    Active,
    /// Transmit power is at or below the sleep threshold.
    Sleep,
}

/// Result of a single power computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleResult {
    /// Power drawn by the whole radio unit in W.
    pub power_w: f64,
    /// Current drawn from the DC supply in A.
    pub current_a: f64,
    /// Transmit power used for the computation in dBm.
    pub tx_power_dbm: f64,
    /// Operating state derived from the transmit power.
    pub state: OperatingState,
}

/// A model for estimating the power drawn by a radio unit based on its transmit power.
///
/// In active state the per-TRX power is obtained by passing the linear transmit power
/// through a chain of loss stages:
///
/// ```text
/// P_PA   = P_tx / (eta_PA * (1 - delta_af))
/// P_RF   = P_PA + P_fixed + P_mmwave
/// P_TRX  = P_RF / (1 - delta_dc) / (1 - delta_ms) / (1 - delta_cool)
/// ```
///
/// In sleep state the per-TRX power is the configured sleep power, optionally passed
/// through the same DC-DC, mains and cooling losses. The per-TRX power is then scaled
/// by the number of TRX chains, and the current is derived from the DC supply voltage.
///
/// The model has no state besides its profile, so repeated calls with the same input
/// give the same result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuPowerModel {
    profile: HardwareProfile,
}

impl RuPowerModel {
    /// Creates a power model with the specified hardware profile.
    pub fn new(profile: HardwareProfile) -> Self {
        Self { profile }
    }

    /// Returns the hardware profile.
    pub fn profile(&self) -> &HardwareProfile {
        &self.profile
    }

    /// Returns the hardware profile for reconfiguration via its setters.
    pub fn profile_mut(&mut self) -> &mut HardwareProfile {
        &mut self.profile
    }

    /// Replaces the hardware profile.
    pub fn set_profile(&mut self, profile: HardwareProfile) {
        self.profile = profile;
    }

    /// Returns the operating state for the given transmit power.
    ///
    /// The threshold is inclusive on the sleep side.
    pub fn state(&self, tx_power_dbm: f64) -> OperatingState {
        if tx_power_dbm <= self.profile.sleep_threshold_dbm() {
            OperatingState::Sleep
        } else {
            OperatingState::Active
        }
    }

    /// Returns the power drawn by a single TRX chain in W.
    pub fn trx_power(&self, tx_power_dbm: f64, state: OperatingState) -> f64 {
        let profile = &self.profile;
        match state {
            OperatingState::Active => {
                let tx_power = dbm_to_watts(tx_power_dbm);
                let pa_power = tx_power / (profile.eta_pa() * (1. - profile.delta_af()));
                let rf_power = pa_power + profile.fixed_overhead_w() + profile.mmwave_overhead_w();
                profile.apply_supply_losses(rf_power)
            }
            OperatingState::Sleep => {
                if profile.losses_in_sleep() {
                    profile.apply_supply_losses(profile.sleep_power_w())
                } else {
                    profile.sleep_power_w()
                }
            }
        }
    }

    /// Computes the radio unit power and current for the given transmit power.
    ///
    /// Negative and sub-milliwatt transmit powers are valid inputs.
    pub fn compute(&self, tx_power_dbm: f64) -> SampleResult {
        let state = self.state(tx_power_dbm);
        let power_w = self.trx_power(tx_power_dbm, state) * self.profile.num_trx() as f64;
        SampleResult {
            power_w,
            current_a: power_w / self.profile.vdc(),
            tx_power_dbm,
            state,
        }
    }
}

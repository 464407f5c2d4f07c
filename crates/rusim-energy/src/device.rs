//! Radio unit device energy model.

use thiserror::Error;

use rusim_core::{cast, log_debug, log_error, log_info, log_trace, log_warn};
use rusim_core::{Event, EventHandler, Id, SimulationContext};
use rusim_models::power::profile::{check_finite, options};
use rusim_models::power::{ConfigError, HardwareProfile, RuPowerModel, SampleResult};

use crate::events::{EnergyDepleted, EnergyRecharged, EnergyUpdateRequested, TxPowerChanged};
use crate::provider::{SharedTxPowerSource, TxPowerProvider};
use crate::source::{EnergyDraw, SharedEnergySource};
use crate::trace::{EnergySignal, SharedSignalListener, SignalUpdate};

const DEFAULT_TX_POWER_DBM: f64 = 30.;

/// Error returned when a sample can not be taken.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnergyModelError {
    /// No energy source was attached before sampling.
    #[error("energy source is not bound, call set_energy_source() before sampling")]
    EnergySourceNotBound,
    /// The live transmit power source reported NaN or infinity.
    #[error("transmit power source reported non-finite value {dbm} dBm")]
    NonFiniteTxPower {
        /// Reported value.
        dbm: f64,
    },
}

/// Energy model of a radio unit.
///
/// Each sample resolves the transmit power, computes the radio unit draw with [`RuPowerModel`],
/// reports the draw to the bound energy source, accumulates the consumed energy and notifies
/// the listeners. Samples are taken on [`EnergyUpdateRequested`] and [`TxPowerChanged`] events
/// or by calling [`update_energy()`](DeviceEnergyModel::update_energy) directly.
///
/// The energy of a sample is its power multiplied by the time elapsed since the previous sample,
/// or since the model was created or reset for the first sample.
pub struct DeviceEnergyModel {
    power_model: RuPowerModel,
    fallback_tx_power_dbm: f64,
    tx_power_source: Option<SharedTxPowerSource>,
    energy_source: Option<SharedEnergySource>,
    listeners: Vec<SharedSignalListener>,
    total_energy: f64,
    last_sample_time: f64,
    last_sample: Option<SampleResult>,
    depleted: bool,
    ctx: SimulationContext,
}

impl DeviceEnergyModel {
    /// Creates an energy model with the default hardware profile.
    pub fn new(ctx: SimulationContext) -> Self {
        Self::with_profile(HardwareProfile::default(), ctx)
    }

    /// Creates an energy model with the specified hardware profile.
    pub fn with_profile(profile: HardwareProfile, ctx: SimulationContext) -> Self {
        Self {
            power_model: RuPowerModel::new(profile),
            fallback_tx_power_dbm: DEFAULT_TX_POWER_DBM,
            tx_power_source: None,
            energy_source: None,
            listeners: Vec::new(),
            total_energy: 0.,
            last_sample_time: ctx.time(),
            last_sample: None,
            depleted: false,
            ctx,
        }
    }

    /// Returns the identifier of the model component.
    pub fn id(&self) -> Id {
        self.ctx.id()
    }

    /// Returns the power model.
    pub fn power_model(&self) -> &RuPowerModel {
        &self.power_model
    }

    /// Returns the power model for reconfiguration.
    pub fn power_model_mut(&mut self) -> &mut RuPowerModel {
        &mut self.power_model
    }

    /// Returns the transmit power in dBm used when no live source is bound.
    pub fn fallback_tx_power_dbm(&self) -> f64 {
        self.fallback_tx_power_dbm
    }

    /// Sets the transmit power in dBm used when no live source is bound.
    pub fn set_fallback_tx_power_dbm(&mut self, tx_power_dbm: f64) -> Result<&mut Self, ConfigError> {
        self.fallback_tx_power_dbm = check_finite(options::TX_POWER_DBM, tx_power_dbm)?;
        Ok(self)
    }

    /// Binds a live transmit power source, used from the next sample on.
    pub fn bind_tx_power_source(&mut self, source: SharedTxPowerSource) {
        log_debug!(self.ctx, "bound live transmit power source");
        self.tx_power_source = Some(source);
    }

    /// Unbinds the live transmit power source, so that next samples use the fallback value.
    pub fn unbind_tx_power_source(&mut self) {
        if self.tx_power_source.take().is_some() {
            log_debug!(self.ctx, "unbound live transmit power source");
        }
    }

    /// Returns whether a live transmit power source is bound.
    pub fn is_live(&self) -> bool {
        self.tx_power_source.is_some()
    }

    /// Returns the provider of transmit power for the next sample.
    pub fn tx_power_provider(&self) -> TxPowerProvider {
        match &self.tx_power_source {
            Some(source) => TxPowerProvider::Live(source.clone()),
            None => TxPowerProvider::Fallback(self.fallback_tx_power_dbm),
        }
    }

    /// Attaches the model to an energy source.
    ///
    /// If the model was attached to another source, it is detached from it first.
    /// The accumulated energy is preserved.
    pub fn set_energy_source(&mut self, source: SharedEnergySource) {
        let time = self.ctx.time();
        if let Some(previous) = self.energy_source.take() {
            previous.borrow_mut().detach(time, self.ctx.id());
            log_debug!(self.ctx, "detached from previous energy source");
        }
        source.borrow_mut().attach(self.ctx.id());
        self.energy_source = Some(source);
    }

    /// Returns whether an energy source is attached.
    pub fn has_energy_source(&self) -> bool {
        self.energy_source.is_some()
    }

    /// Registers a listener of current, power and transmit power updates.
    pub fn add_listener(&mut self, listener: SharedSignalListener) {
        self.listeners.push(listener);
    }

    /// Returns the total energy consumed in J.
    pub fn total_energy_consumption(&self) -> f64 {
        self.total_energy
    }

    /// Returns the current drawn at the last sample in A.
    pub fn current_a(&self) -> f64 {
        self.last_sample.map_or(0., |s| s.current_a)
    }

    /// Returns the power drawn at the last sample in W.
    pub fn power_w(&self) -> f64 {
        self.last_sample.map_or(0., |s| s.power_w)
    }

    /// Returns the result of the last sample.
    pub fn last_sample(&self) -> Option<SampleResult> {
        self.last_sample
    }

    /// Returns whether the energy source reported depletion.
    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    /// Resets the consumed energy, starting a new accounting period at the current time.
    pub fn reset(&mut self) {
        self.total_energy = 0.;
        self.last_sample_time = self.ctx.time();
        log_debug!(self.ctx, "energy account reset");
    }

    /// Takes a sample at the current simulation time.
    ///
    /// Fails without side effects if no energy source is attached
    /// or the live source reports a non-finite transmit power.
    pub fn update_energy(&mut self) -> Result<SampleResult, EnergyModelError> {
        let energy_source = self
            .energy_source
            .clone()
            .ok_or(EnergyModelError::EnergySourceNotBound)?;
        let tx_power_dbm = self.tx_power_provider().tx_power_dbm();
        if !tx_power_dbm.is_finite() {
            return Err(EnergyModelError::NonFiniteTxPower { dbm: tx_power_dbm });
        }
        let result = self.power_model.compute(tx_power_dbm);

        let time = self.ctx.time();
        energy_source.borrow_mut().update_draw(
            time,
            self.ctx.id(),
            EnergyDraw {
                current_a: result.current_a,
                power_w: result.power_w,
            },
        );
        self.total_energy += result.power_w * (time - self.last_sample_time);
        self.last_sample_time = time;

        let previous = self.last_sample.replace(result);
        self.notify_listeners(time, previous, &result);
        log_trace!(
            self.ctx,
            "{:?} at {:.2} dBm: {:.3} W, {:.3} A, total {:.3} J",
            result.state,
            result.tx_power_dbm,
            result.power_w,
            result.current_a,
            self.total_energy
        );
        Ok(result)
    }

    fn notify_listeners(&self, time: f64, previous: Option<SampleResult>, result: &SampleResult) {
        let updates = [
            SignalUpdate {
                time,
                signal: EnergySignal::Current,
                old_value: previous.map_or(0., |s| s.current_a),
                new_value: result.current_a,
            },
            SignalUpdate {
                time,
                signal: EnergySignal::Power,
                old_value: previous.map_or(0., |s| s.power_w),
                new_value: result.power_w,
            },
            SignalUpdate {
                time,
                signal: EnergySignal::TxPower,
                old_value: previous.map_or(0., |s| s.tx_power_dbm),
                new_value: result.tx_power_dbm,
            },
        ];
        for update in &updates {
            for listener in &self.listeners {
                listener.borrow_mut().on_update(update);
            }
        }
    }

    fn sample(&mut self) {
        if let Err(e) = self.update_energy() {
            log_error!(self.ctx, "failed to update energy: {}", e);
            panic!("Failed to update energy of {}: {}", self.ctx.name(), e);
        }
    }
}

impl EventHandler for DeviceEnergyModel {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            EnergyUpdateRequested {} => {
                self.sample();
            }
            TxPowerChanged { tx_power_dbm } => {
                log_debug!(self.ctx, "transmit power changed to {:.2} dBm", tx_power_dbm);
                self.sample();
            }
            EnergyDepleted {} => {
                self.depleted = true;
                log_warn!(self.ctx, "energy source depleted, consumed {:.3} J", self.total_energy);
            }
            EnergyRecharged {} => {
                self.depleted = false;
                log_info!(self.ctx, "energy source recharged");
            }
        })
    }
}

//! Energy sources tracking the remaining energy budget of their consumers.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use rusim_core::{cast, log_debug, log_info, log_warn};
use rusim_core::{Event, EventHandler, EventId, Id, SimulationContext};
use rusim_models::power::ConfigError;

use crate::events::{EnergyDepleted, EnergyRecharged, EnergySourceUpdate, EnergyUpdateRequested};

/// Draw reported by a consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EnergyDraw {
    /// Current drawn from the source in A.
    pub current_a: f64,
    /// Power drawn from the source in W.
    pub power_w: f64,
}

/// A finite energy budget shared by one or more consumers.
///
/// Consumers report their draw whenever it is recomputed. The source integrates the reported
/// draws over time itself, treating each draw as constant until the next report.
pub trait EnergySource {
    /// Registers a consumer for update requests and depletion notifications.
    fn attach(&mut self, consumer: Id);

    /// Records the new draw of a consumer at the given time.
    fn update_draw(&mut self, time: f64, consumer: Id, draw: EnergyDraw);

    /// Removes the consumer and its draw.
    fn detach(&mut self, time: f64, consumer: Id);

    /// Returns the initial energy in J.
    fn initial_energy(&self) -> f64;

    /// Returns the remaining energy in J.
    fn remaining_energy(&self) -> f64;

    /// Returns the supply voltage in V.
    fn supply_voltage(&self) -> f64;

    /// Returns the sum of currents drawn by all consumers in A.
    fn total_current(&self) -> f64;

    /// Returns whether the remaining energy is below the low threshold.
    fn is_depleted(&self) -> bool;
}

/// Shared handle to an energy source.
pub type SharedEnergySource = Rc<RefCell<dyn EnergySource>>;

const DEFAULT_INITIAL_ENERGY_J: f64 = 1e7;
const DEFAULT_SUPPLY_VOLTAGE_V: f64 = 48.;
const DEFAULT_UPDATE_INTERVAL: f64 = 1.;
const DEFAULT_LOW_THRESHOLD: f64 = 0.1;
const DEFAULT_HIGH_THRESHOLD: f64 = 0.15;

/// Parameters of [`BasicEnergySource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicEnergySourceConfig {
    /// Initial energy in J.
    #[serde(default = "default_initial_energy")]
    pub initial_energy_j: f64,
    /// Supply voltage in V.
    #[serde(default = "default_supply_voltage")]
    pub supply_voltage_v: f64,
    /// Period of energy updates in seconds.
    #[serde(default = "default_update_interval")]
    pub update_interval: f64,
    /// Fraction of initial energy at or below which the source is depleted.
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f64,
    /// Fraction of initial energy at or above which a depleted source is recharged.
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,
}

fn default_initial_energy() -> f64 {
    DEFAULT_INITIAL_ENERGY_J
}

fn default_supply_voltage() -> f64 {
    DEFAULT_SUPPLY_VOLTAGE_V
}

fn default_update_interval() -> f64 {
    DEFAULT_UPDATE_INTERVAL
}

fn default_low_threshold() -> f64 {
    DEFAULT_LOW_THRESHOLD
}

fn default_high_threshold() -> f64 {
    DEFAULT_HIGH_THRESHOLD
}

impl Default for BasicEnergySourceConfig {
    fn default() -> Self {
        Self {
            initial_energy_j: DEFAULT_INITIAL_ENERGY_J,
            supply_voltage_v: DEFAULT_SUPPLY_VOLTAGE_V,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

impl BasicEnergySourceConfig {
    /// Checks that all parameters are inside their domains.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |option, value: f64| {
            if value > 0. && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::out_of_domain(option, value, "a finite value > 0"))
            }
        };
        positive("InitialEnergyJ", self.initial_energy_j)?;
        positive("SupplyVoltageV", self.supply_voltage_v)?;
        positive("UpdateInterval", self.update_interval)?;
        if !(0. ..=1.).contains(&self.low_threshold) {
            return Err(ConfigError::out_of_domain(
                "LowThreshold",
                self.low_threshold,
                "a value in [0, 1]",
            ));
        }
        if !(self.low_threshold..=1.).contains(&self.high_threshold) || self.high_threshold == self.low_threshold {
            return Err(ConfigError::out_of_domain(
                "HighThreshold",
                self.high_threshold,
                "a value in (LowThreshold, 1]",
            ));
        }
        Ok(())
    }
}

/// Battery-like energy source with linear discharge.
///
/// The consumed energy is `total_current * supply_voltage * duration`, where the total
/// current is the sum of the last draws reported by consumers. The remaining energy
/// never goes below zero.
///
/// Once started, the source updates itself periodically and asks every attached consumer
/// to recompute its draw by sending [`EnergyUpdateRequested`]. Consumers are notified with
/// [`EnergyDepleted`] when the remaining energy reaches the low threshold, and with
/// [`EnergyRecharged`] when a recharge brings it back to the high threshold.
pub struct BasicEnergySource {
    config: BasicEnergySourceConfig,
    remaining_energy: f64,
    consumed_energy: f64,
    consumers: Vec<Id>,
    draws: BTreeMap<Id, EnergyDraw>,
    last_update_time: f64,
    depleted: bool,
    next_update: Option<EventId>,
    ctx: SimulationContext,
}

impl BasicEnergySource {
    /// Creates an energy source with the specified parameters.
    pub fn new(config: BasicEnergySourceConfig, ctx: SimulationContext) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            remaining_energy: config.initial_energy_j,
            consumed_energy: 0.,
            consumers: Vec::new(),
            draws: BTreeMap::new(),
            last_update_time: ctx.time(),
            depleted: false,
            next_update: None,
            config,
            ctx,
        })
    }

    /// Returns the identifier of the source component.
    pub fn id(&self) -> Id {
        self.ctx.id()
    }

    /// Returns the source parameters.
    pub fn config(&self) -> &BasicEnergySourceConfig {
        &self.config
    }

    /// Returns the energy consumed so far in J, as integrated by the source.
    pub fn consumed_energy(&self) -> f64 {
        self.consumed_energy
    }

    /// Returns the remaining fraction of initial energy.
    pub fn energy_fraction(&self) -> f64 {
        self.remaining_energy / self.config.initial_energy_j
    }

    /// Returns the sum of power drawn by all consumers in W.
    pub fn total_power(&self) -> f64 {
        self.draws.values().map(|d| d.power_w).sum()
    }

    /// Returns the last draw reported by the consumer.
    pub fn draw(&self, consumer: Id) -> Option<EnergyDraw> {
        self.draws.get(&consumer).copied()
    }

    /// Starts periodic updates.
    pub fn start(&mut self) {
        if self.next_update.is_none() {
            log_debug!(self.ctx, "started, update interval {}", self.config.update_interval);
            self.next_update = Some(self.ctx.emit_self(EnergySourceUpdate {}, self.config.update_interval));
        }
    }

    /// Stops periodic updates.
    pub fn stop(&mut self) {
        if let Some(event_id) = self.next_update.take() {
            self.ctx.cancel_event(event_id);
            log_debug!(self.ctx, "stopped");
        }
    }

    /// Adds energy to the source, up to its initial energy.
    pub fn recharge(&mut self, time: f64, energy_j: f64) -> Result<(), ConfigError> {
        if !(energy_j >= 0. && energy_j.is_finite()) {
            return Err(ConfigError::out_of_domain("RechargeEnergyJ", energy_j, "a finite value >= 0"));
        }
        self.settle(time);
        self.remaining_energy = (self.remaining_energy + energy_j).min(self.config.initial_energy_j);
        log_debug!(
            self.ctx,
            "recharged by {:.3} J, remaining {:.3} J",
            energy_j,
            self.remaining_energy
        );
        self.check_thresholds();
        Ok(())
    }

    fn settle(&mut self, time: f64) {
        let duration = time - self.last_update_time;
        if duration > 0. {
            let energy = self.total_current() * self.config.supply_voltage_v * duration;
            self.consumed_energy += energy;
            self.remaining_energy = (self.remaining_energy - energy).max(0.);
            self.last_update_time = time;
        }
    }

    fn check_thresholds(&mut self) {
        let initial = self.config.initial_energy_j;
        if !self.depleted && self.remaining_energy <= self.config.low_threshold * initial {
            self.depleted = true;
            log_warn!(
                self.ctx,
                "energy depleted, remaining {:.3} J of {:.3} J",
                self.remaining_energy,
                initial
            );
            for &consumer in &self.consumers {
                self.ctx.emit_now(EnergyDepleted {}, consumer);
            }
        } else if self.depleted && self.remaining_energy >= self.config.high_threshold * initial {
            self.depleted = false;
            log_info!(
                self.ctx,
                "energy recharged, remaining {:.3} J of {:.3} J",
                self.remaining_energy,
                initial
            );
            for &consumer in &self.consumers {
                self.ctx.emit_now(EnergyRecharged {}, consumer);
            }
        }
    }

    fn on_update(&mut self) {
        self.settle(self.ctx.time());
        self.check_thresholds();
        for &consumer in &self.consumers {
            self.ctx.emit_now(EnergyUpdateRequested {}, consumer);
        }
        self.next_update = Some(self.ctx.emit_self(EnergySourceUpdate {}, self.config.update_interval));
    }
}

impl EnergySource for BasicEnergySource {
    fn attach(&mut self, consumer: Id) {
        if !self.consumers.contains(&consumer) {
            self.consumers.push(consumer);
            log_debug!(self.ctx, "attached consumer {}", self.ctx.lookup_name(consumer));
        }
    }

    fn update_draw(&mut self, time: f64, consumer: Id, draw: EnergyDraw) {
        self.settle(time);
        self.draws.insert(consumer, draw);
        self.check_thresholds();
    }

    fn detach(&mut self, time: f64, consumer: Id) {
        self.settle(time);
        self.draws.remove(&consumer);
        self.consumers.retain(|&c| c != consumer);
        log_debug!(self.ctx, "detached consumer {}", self.ctx.lookup_name(consumer));
    }

    fn initial_energy(&self) -> f64 {
        self.config.initial_energy_j
    }

    fn remaining_energy(&self) -> f64 {
        self.remaining_energy
    }

    fn supply_voltage(&self) -> f64 {
        self.config.supply_voltage_v
    }

    fn total_current(&self) -> f64 {
        self.draws.values().map(|d| d.current_a).sum()
    }

    fn is_depleted(&self) -> bool {
        self.depleted
    }
}

impl EventHandler for BasicEnergySource {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            EnergySourceUpdate {} => {
                self.on_update();
            }
        })
    }
}

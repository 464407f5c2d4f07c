//! Energy consumption of radio units in a simulated environment.
//!
//! The [`DeviceEnergyModel`](device::DeviceEnergyModel) component samples the radio unit
//! power model whenever it is asked to, reports the resulting current draw to an
//! [`EnergySource`](source::EnergySource) and accumulates the consumed energy.
//! Transmit power comes from a live [`TransmitPowerSource`](provider::TransmitPowerSource)
//! when one is bound, or from a configured fallback value otherwise.

#![warn(missing_docs)]

pub mod config;
pub mod device;
pub mod events;
pub mod provider;
pub mod source;
pub mod trace;

pub use device::{DeviceEnergyModel, EnergyModelError};
pub use provider::{ConstantTxPowerSource, TransmitPowerSource, TxPowerProvider};
pub use source::{BasicEnergySource, BasicEnergySourceConfig, EnergyDraw, EnergySource};
pub use trace::{EnergySignal, SignalListener, SignalRecorder, SignalUpdate};

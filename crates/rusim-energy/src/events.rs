//! Events exchanged by energy sources, radio unit energy models and transmitters.

use serde::Serialize;

/// Asks a consumer to recompute its draw. Source: energy source, destination: consumer.
#[derive(Clone, Serialize)]
pub struct EnergyUpdateRequested {}

/// Notifies the energy model that the transmit power has changed and the draw should be recomputed.
/// Source: transmitter, destination: energy model.
#[derive(Clone, Serialize)]
pub struct TxPowerChanged {
    /// New transmit power in dBm as seen by the transmitter.
    pub tx_power_dbm: f64,
}

/// Remaining energy fell to or below the low threshold. Source: energy source, destination: consumer.
#[derive(Clone, Serialize)]
pub struct EnergyDepleted {}

/// Remaining energy of a depleted source rose to or above the high threshold.
/// Source: energy source, destination: consumer.
#[derive(Clone, Serialize)]
pub struct EnergyRecharged {}

// Periodic update of energy source.
#[derive(Clone, Serialize)]
pub(crate) struct EnergySourceUpdate {}

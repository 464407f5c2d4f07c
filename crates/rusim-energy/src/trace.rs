//! Observable signals of radio unit energy models.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

/// Signal emitted by the energy model on every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnergySignal {
    /// Instantaneous current in A.
    Current,
    /// Instantaneous power in W.
    Power,
    /// Transmit power used for the sample in dBm.
    TxPower,
}

/// Update of a signal value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalUpdate {
    /// Simulation time of the sample.
    pub time: f64,
    /// Updated signal.
    pub signal: EnergySignal,
    /// Previously emitted value, zero before the first sample.
    pub old_value: f64,
    /// New value.
    pub new_value: f64,
}

/// Consumer of signal updates.
pub trait SignalListener {
    /// Called for each signal update.
    fn on_update(&mut self, update: &SignalUpdate);
}

/// Shared handle to a signal listener.
pub type SharedSignalListener = Rc<RefCell<dyn SignalListener>>;

/// Listener storing all received updates.
#[derive(Debug, Default, Serialize)]
pub struct SignalRecorder {
    updates: Vec<SignalUpdate>,
}

impl SignalRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all updates in the order of arrival.
    pub fn updates(&self) -> &[SignalUpdate] {
        &self.updates
    }

    /// Returns `(time, value)` pairs of the given signal.
    pub fn values(&self, signal: EnergySignal) -> Vec<(f64, f64)> {
        self.updates
            .iter()
            .filter(|u| u.signal == signal)
            .map(|u| (u.time, u.new_value))
            .collect()
    }

    /// Returns the last value of the given signal.
    pub fn last_value(&self, signal: EnergySignal) -> Option<f64> {
        self.updates
            .iter()
            .rev()
            .find(|u| u.signal == signal)
            .map(|u| u.new_value)
    }

    /// Returns the number of received updates.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Returns whether no updates were received.
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Serializes the received updates to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.updates)
    }

    /// Writes the received updates to a JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        std::fs::write(path, self.to_json()?)
    }
}

impl SignalListener for SignalRecorder {
    fn on_update(&mut self, update: &SignalUpdate) {
        self.updates.push(*update);
    }
}

//! Transmit power providers.

use std::cell::RefCell;
use std::rc::Rc;

/// Component reporting its current transmit power, e.g. a PHY layer.
pub trait TransmitPowerSource {
    /// Returns the current transmit power in dBm.
    fn current_tx_power_dbm(&self) -> f64;
}

/// Shared handle to a live transmit power source.
pub type SharedTxPowerSource = Rc<RefCell<dyn TransmitPowerSource>>;

/// Where the transmit power used for a sample comes from.
#[derive(Clone)]
pub enum TxPowerProvider {
    /// Read the power from a bound live source.
    Live(SharedTxPowerSource),
    /// Use a static value in dBm.
    Fallback(f64),
}

impl TxPowerProvider {
    /// Returns the transmit power in dBm.
    pub fn tx_power_dbm(&self) -> f64 {
        match self {
            Self::Live(source) => source.borrow().current_tx_power_dbm(),
            Self::Fallback(dbm) => *dbm,
        }
    }

    /// Returns whether the power comes from a live source.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Live source reporting a settable transmit power.
#[derive(Debug, Clone)]
pub struct ConstantTxPowerSource {
    tx_power_dbm: f64,
}

impl ConstantTxPowerSource {
    /// Creates a source reporting the given transmit power in dBm.
    pub fn new(tx_power_dbm: f64) -> Self {
        Self { tx_power_dbm }
    }

    /// Changes the reported transmit power.
    pub fn set_tx_power_dbm(&mut self, tx_power_dbm: f64) {
        self.tx_power_dbm = tx_power_dbm;
    }
}

impl TransmitPowerSource for ConstantTxPowerSource {
    fn current_tx_power_dbm(&self) -> f64 {
        self.tx_power_dbm
    }
}

//! Power consumption models.

pub mod error;
pub mod profile;
pub mod ru;
pub mod units;

pub use error::ConfigError;
pub use profile::{HardwareProfile, HardwareProfileBuilder};
pub use ru::{OperatingState, RuPowerModel, SampleResult};

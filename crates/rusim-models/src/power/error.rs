//! Configuration errors.

use thiserror::Error;

/// Error returned when a configuration option is set to a value outside of its domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The option value is outside of its declared domain.
    #[error("invalid value {value} for option {option}, expected {expected}")]
    OutOfDomain {
        /// Option name.
        option: &'static str,
        /// Rejected value.
        value: f64,
        /// Human-readable description of the option domain.
        expected: &'static str,
    },
}

impl ConfigError {
    /// Creates an error for an option value outside of its domain.
    pub fn out_of_domain(option: &'static str, value: f64, expected: &'static str) -> Self {
        Self::OutOfDomain {
            option,
            value,
            expected,
        }
    }

    /// Returns the name of the rejected option.
    pub fn option(&self) -> &'static str {
        match self {
            Self::OutOfDomain { option, .. } => option,
        }
    }
}

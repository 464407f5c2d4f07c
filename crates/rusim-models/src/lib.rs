//! Models of radio unit hardware used by the energy simulation.

#![warn(missing_docs)]

pub mod power;

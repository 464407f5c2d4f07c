//! Discrete-event simulation core driving the radio unit energy models.
//!
//! A simulation is a set of named components exchanging timestamped events.
//! Components access the simulation through a [`SimulationContext`] and consume
//! events by implementing [`EventHandler`]. The engine is single-threaded: events
//! are delivered one at a time in the order of their timestamps.

#![warn(missing_docs)]

pub mod component;
pub mod context;
pub mod event;
pub mod handler;
pub mod log;
pub mod simulation;
mod state;

pub use colored;
pub use component::Id;
pub use context::SimulationContext;
pub use event::{Event, EventData, EventId};
pub use handler::{EventCancellationPolicy, EventHandler};
pub use simulation::Simulation;
pub use state::EPSILON;

//! Event handling.

use crate::event::Event;

/// Trait for consuming events in simulation components.
pub trait EventHandler {
    /// Processes event delivered to the component.
    fn on(&mut self, event: Event);
}

/// Enables pattern matching on event payloads by downcasting them from
/// [`EventData`](crate::event::EventData) to user-defined types.
///
/// Match arms need not be exhaustive. A payload not matching any arm is logged
/// as an unhandled event at `ERROR` level.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use serde::Serialize;
/// use rusim_core::{cast, Event, EventHandler, Simulation};
///
/// #[derive(Serialize)]
/// pub struct Ping {
///     seq: u32,
/// }
///
/// #[derive(Serialize)]
/// pub struct Reset {}
///
/// pub struct Counter {
///     last_seq: u32,
/// }
///
/// impl EventHandler for Counter {
///     fn on(&mut self, event: Event) {
///         cast!(match event.data {
///             Ping { seq } => {
///                 self.last_seq = seq;
///             }
///             Reset {} => {
///                 self.last_seq = 0;
///             }
///         })
///     }
/// }
///
/// let mut sim = Simulation::new(123);
/// let counter = Rc::new(RefCell::new(Counter { last_seq: 0 }));
/// let counter_id = sim.add_handler("counter", counter.clone());
/// let mut client = sim.create_context("client");
/// client.emit(Ping { seq: 7 }, counter_id, 1.5);
/// sim.step_until_no_events();
/// assert_eq!(counter.borrow().last_seq, 7);
/// assert_eq!(sim.time(), 1.5);
/// ```
#[macro_export]
macro_rules! cast {
    ( match $event:ident.data { $( $type:ident { $($tt:tt)* } => { $($expr:tt)* } )+ } ) => {
        $(
            if $event.data.is::<$type>() {
                if let Ok(__value) = $event.data.downcast::<$type>() {
                    let $type { $($tt)* } = *__value;
                    $($expr)*
                }
            } else
        )*
        {
            $crate::log::log_unhandled_event($event);
        }
    }
}

/// Specifies which pending events are cancelled on event handler removal.
pub enum EventCancellationPolicy {
    /// Cancel events destined to the component.
    Incoming,
    /// Cancel events produced by the component.
    Outgoing,
    /// Cancel all events related to the component.
    All,
    /// Do not cancel events.
    None,
}

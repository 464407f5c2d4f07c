//! Simulation configuration and execution.

use std::cell::RefCell;
use std::rc::Rc;

use log::Level::Trace;
use log::{debug, log_enabled, trace};
use rand::distributions::uniform::{SampleRange, SampleUniform};
use serde_json::json;
use serde_type_name::type_name;

use crate::component::Id;
use crate::context::SimulationContext;
use crate::handler::{EventCancellationPolicy, EventHandler};
use crate::log::{get_colored, log_undelivered_event};
use crate::state::SimulationState;

/// Represents a simulation, provides methods for its configuration and execution.
pub struct Simulation {
    sim_state: Rc<RefCell<SimulationState>>,
    handlers: Vec<Option<Rc<RefCell<dyn EventHandler>>>>,
}

impl Simulation {
    /// Creates a new simulation with specified random seed.
    pub fn new(seed: u64) -> Self {
        Self {
            sim_state: Rc::new(RefCell::new(SimulationState::new(seed))),
            handlers: Vec::new(),
        }
    }

    fn register(&mut self, name: &str) -> Id {
        let id = self.sim_state.borrow_mut().register(name);
        if self.handlers.len() <= id as usize {
            self.handlers.resize_with(id as usize + 1, || None);
        }
        id
    }

    /// Returns the identifier of component by its name.
    ///
    /// Panics if component with such name does not exist.
    pub fn lookup_id(&self, name: &str) -> Id {
        self.sim_state
            .borrow()
            .lookup_id(name)
            .unwrap_or_else(|| panic!("Unknown component {}", name))
    }

    /// Returns the name of component by its identifier.
    ///
    /// Panics if component with such id does not exist.
    pub fn lookup_name(&self, id: Id) -> String {
        self.sim_state
            .borrow()
            .lookup_name(id)
            .unwrap_or_else(|| panic!("Unknown component id {}", id))
            .to_owned()
    }

    /// Creates a new simulation context with specified name.
    ///
    /// Component ids are assigned sequentially starting from 0.
    /// Creating a context for an already registered name reuses its id.
    pub fn create_context<S>(&mut self, name: S) -> SimulationContext
    where
        S: AsRef<str>,
    {
        let id = self.register(name.as_ref());
        let ctx = SimulationContext::new(id, name.as_ref(), self.sim_state.clone());
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Created context: {}",
            self.time(),
            get_colored("DEBUG", colored::Color::Blue),
            json!({"name": ctx.name(), "id": ctx.id()})
        );
        ctx
    }

    /// Registers the event handler for component with specified name, returns the component id.
    pub fn add_handler<S>(&mut self, name: S, handler: Rc<RefCell<dyn EventHandler>>) -> Id
    where
        S: AsRef<str>,
    {
        let id = self.register(name.as_ref());
        self.handlers[id as usize] = Some(handler);
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Added handler: {}",
            self.time(),
            get_colored("DEBUG", colored::Color::Blue),
            json!({"name": name.as_ref(), "id": id})
        );
        id
    }

    /// Removes the event handler for component with specified name
    /// and cancels its pending events according to the policy.
    ///
    /// Events left for a component without handler are logged as undelivered.
    pub fn remove_handler<S>(&mut self, name: S, cancel_policy: EventCancellationPolicy)
    where
        S: AsRef<str>,
    {
        let id = self.lookup_id(name.as_ref());
        self.handlers[id as usize] = None;
        match cancel_policy {
            EventCancellationPolicy::Incoming => self.cancel_events(|e| e.dst == id),
            EventCancellationPolicy::Outgoing => self.cancel_events(|e| e.src == id),
            EventCancellationPolicy::All => self.cancel_events(|e| e.src == id || e.dst == id),
            EventCancellationPolicy::None => {}
        }
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Removed handler: {}",
            self.time(),
            get_colored("DEBUG", colored::Color::Blue),
            json!({"name": name.as_ref(), "id": id})
        );
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Performs a single step through the simulation.
    ///
    /// Takes the next event from the queue, advances the simulation time to event time
    /// and delivers the event to its destination. Returns `false` if there were no pending events.
    pub fn step(&mut self) -> bool {
        let next = self.sim_state.borrow_mut().next_event();
        let event = match next {
            Some(event) => event,
            None => return false,
        };
        match self.handlers.get(event.dst as usize).cloned().flatten() {
            Some(handler) => {
                if log_enabled!(Trace) {
                    let src_name = self.lookup_name(event.src);
                    let dst_name = self.lookup_name(event.dst);
                    trace!(
                        target: &dst_name,
                        "[{:.3} {} {}] {}",
                        event.time,
                        get_colored("EVENT", colored::Color::BrightBlack),
                        dst_name,
                        json!({"type": type_name(&event.data).unwrap_or("?"), "data": event.data, "src": src_name})
                    );
                }
                handler.borrow_mut().on(event);
            }
            None => log_undelivered_event(event),
        }
        true
    }

    /// Performs the specified number of steps through the simulation.
    ///
    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn steps(&mut self, step_count: u64) -> bool {
        for _ in 0..step_count {
            if !self.step() {
                return false;
            }
        }
        true
    }

    /// Steps through the simulation until there are no pending events left.
    pub fn step_until_no_events(&mut self) {
        while self.step() {}
    }

    /// Steps through the simulation with duration limit.
    ///
    /// Processes all events with time not exceeding the current time plus `duration`.
    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn step_for_duration(&mut self, duration: f64) -> bool {
        let end_time = self.time() + duration;
        self.step_until_time(end_time)
    }

    /// Steps through the simulation until the specified time.
    ///
    /// Processes all events with time not exceeding `time`.
    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn step_until_time(&mut self, time: f64) -> bool {
        loop {
            let next_time = self.sim_state.borrow_mut().peek_event().map(|e| e.time);
            match next_time {
                Some(t) if t > time => return true,
                Some(_) => {
                    self.step();
                }
                None => return false,
            }
        }
    }

    /// Returns a random float in the range _[0, 1)_
    /// using the simulation-wide random number generator.
    pub fn rand(&mut self) -> f64 {
        self.sim_state.borrow_mut().rand()
    }

    /// Returns a random value in the specified range
    /// using the simulation-wide random number generator.
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.sim_state.borrow_mut().gen_range(range)
    }

    /// Returns the total number of created events, including the cancelled and delivered ones.
    pub fn event_count(&self) -> u64 {
        self.sim_state.borrow().event_count()
    }

    /// Returns the number of events waiting for delivery.
    pub fn pending_event_count(&self) -> usize {
        self.sim_state.borrow().pending_event_count()
    }

    /// Returns the number of registered components.
    pub fn component_count(&self) -> usize {
        self.sim_state.borrow().component_count()
    }

    /// Cancels pending events that satisfy the given predicate.
    pub fn cancel_events<F>(&mut self, pred: F)
    where
        F: Fn(&crate::Event) -> bool,
    {
        self.sim_state.borrow_mut().cancel_events(pred);
    }
}

use std::collections::{BinaryHeap, HashMap, HashSet};

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::component::Id;
use crate::event::{Event, EventData, EventId};
use crate::log::log_incorrect_event;

/// Epsilon to compare floating point values for equality.
pub const EPSILON: f64 = 1e-12;

pub struct SimulationState {
    clock: f64,
    rand: Pcg64,
    events: BinaryHeap<Event>,
    canceled_events: HashSet<EventId>,
    event_count: u64,
    component_name_to_id: HashMap<String, Id>,
    component_names: Vec<String>,
}

impl SimulationState {
    pub fn new(seed: u64) -> Self {
        Self {
            clock: 0.,
            rand: Pcg64::seed_from_u64(seed),
            events: BinaryHeap::new(),
            canceled_events: HashSet::new(),
            event_count: 0,
            component_name_to_id: HashMap::new(),
            component_names: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &str) -> Id {
        if let Some(&id) = self.component_name_to_id.get(name) {
            return id;
        }
        let id = self.component_names.len() as Id;
        self.component_name_to_id.insert(name.to_owned(), id);
        self.component_names.push(name.to_owned());
        id
    }

    pub fn lookup_id(&self, name: &str) -> Option<Id> {
        self.component_name_to_id.get(name).copied()
    }

    pub fn lookup_name(&self, id: Id) -> Option<&str> {
        self.component_names.get(id as usize).map(|s| s.as_str())
    }

    pub fn component_count(&self) -> usize {
        self.component_names.len()
    }

    pub fn time(&self) -> f64 {
        self.clock
    }

    pub fn rand(&mut self) -> f64 {
        self.rand.gen_range(0.0..1.0)
    }

    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rand.gen_range(range)
    }

    pub fn add_event<T>(&mut self, data: T, src: Id, dst: Id, delay: f64) -> EventId
    where
        T: EventData,
    {
        let event_id = self.event_count;
        let event = Event {
            id: event_id,
            time: self.clock + delay.max(0.),
            src,
            dst,
            data: Box::new(data),
        };
        if delay < -EPSILON {
            log_incorrect_event(event, &format!("negative delay {}", delay));
            panic!("Event delay is negative! It is not allowed to add events from the past.");
        }
        self.events.push(event);
        self.event_count += 1;
        event_id
    }

    pub fn next_event(&mut self) -> Option<Event> {
        while let Some(event) = self.events.pop() {
            if !self.canceled_events.remove(&event.id) {
                self.clock = event.time;
                return Some(event);
            }
        }
        None
    }

    pub fn peek_event(&mut self) -> Option<&Event> {
        while let Some(event_id) = self.events.peek().map(|e| e.id) {
            if !self.canceled_events.remove(&event_id) {
                break;
            }
            self.events.pop();
        }
        self.events.peek()
    }

    pub fn cancel_event(&mut self, id: EventId) {
        self.canceled_events.insert(id);
    }

    pub fn cancel_events<F>(&mut self, pred: F)
    where
        F: Fn(&Event) -> bool,
    {
        for event in self.events.iter() {
            if pred(event) {
                self.canceled_events.insert(event.id);
            }
        }
    }

    pub fn pending_event_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| !self.canceled_events.contains(&e.id))
            .count()
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}

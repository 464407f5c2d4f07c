#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sugars::{rc, refcell};

use rusim_core::{Id, Simulation, SimulationContext};
use rusim_energy::events::EnergyUpdateRequested;
use rusim_energy::{BasicEnergySource, BasicEnergySourceConfig, DeviceEnergyModel, SignalRecorder};

pub const SEED: u64 = 123;
// Default profile at 30 dBm: (1 W / 0.3 + 80 W) / 0.93 / 0.91 / 0.9 * 64 TRX.
pub const ACTIVE_POWER_30DBM: f64 = 7002.157539791947;
pub const ACTIVE_CURRENT_30DBM: f64 = 145.8782820789989;

pub struct TestBed {
    pub sim: Simulation,
    pub source: Rc<RefCell<BasicEnergySource>>,
    pub model: Rc<RefCell<DeviceEnergyModel>>,
    pub model_id: Id,
    pub recorder: Rc<RefCell<SignalRecorder>>,
    pub root: SimulationContext,
}

impl TestBed {
    pub fn new(source_config: BasicEnergySourceConfig) -> Self {
        let mut sim = Simulation::new(SEED);
        let source = rc!(refcell!(
            BasicEnergySource::new(source_config, sim.create_context("battery")).unwrap()
        ));
        sim.add_handler("battery", source.clone());

        let model = rc!(refcell!(DeviceEnergyModel::new(sim.create_context("ru"))));
        let model_id = sim.add_handler("ru", model.clone());
        model.borrow_mut().set_energy_source(source.clone());

        let recorder = rc!(refcell!(SignalRecorder::new()));
        model.borrow_mut().add_listener(recorder.clone());

        let root = sim.create_context("root");
        Self {
            sim,
            source,
            model,
            model_id,
            recorder,
            root,
        }
    }

    /// Requests samples of the model at the given times and runs the simulation.
    pub fn sample_at(&mut self, times: &[f64]) {
        let now = self.sim.time();
        for &time in times {
            self.root.emit(EnergyUpdateRequested {}, self.model_id, time - now);
        }
        self.sim.step_until_no_events();
    }
}

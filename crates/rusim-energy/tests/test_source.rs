use approx::assert_abs_diff_eq;
use sugars::{rc, refcell};

use rusim_core::{cast, Event, EventHandler, Simulation};
use rusim_energy::events::{EnergyDepleted, EnergyRecharged, EnergyUpdateRequested};
use rusim_energy::{BasicEnergySource, BasicEnergySourceConfig, EnergyDraw, EnergySource};

#[derive(Default)]
struct Consumer {
    update_requests: Vec<f64>,
    depleted: u32,
    recharged: u32,
}

impl EventHandler for Consumer {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            EnergyUpdateRequested {} => {
                self.update_requests.push(event.time);
            }
            EnergyDepleted {} => {
                self.depleted += 1;
            }
            EnergyRecharged {} => {
                self.recharged += 1;
            }
        })
    }
}

fn draw(current_a: f64) -> EnergyDraw {
    EnergyDraw {
        current_a,
        power_w: current_a * 48.,
    }
}

#[test]
fn test_default_config() {
    let config = BasicEnergySourceConfig::default();
    assert_eq!(config.initial_energy_j, 1e7);
    assert_eq!(config.supply_voltage_v, 48.);
    assert_eq!(config.update_interval, 1.);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_config() {
    let mut sim = Simulation::new(123);
    let config = BasicEnergySourceConfig {
        initial_energy_j: 0.,
        ..BasicEnergySourceConfig::default()
    };
    let err = BasicEnergySource::new(config, sim.create_context("battery")).err().unwrap();
    assert_eq!(err.option(), "InitialEnergyJ");

    let config = BasicEnergySourceConfig {
        low_threshold: 0.5,
        high_threshold: 0.4,
        ..BasicEnergySourceConfig::default()
    };
    assert_eq!(config.validate().unwrap_err().option(), "HighThreshold");

    let config = BasicEnergySourceConfig {
        update_interval: f64::NAN,
        ..BasicEnergySourceConfig::default()
    };
    assert_eq!(config.validate().unwrap_err().option(), "UpdateInterval");
}

#[test]
fn test_draws_are_integrated_until_next_report() {
    let mut sim = Simulation::new(123);
    let mut source = BasicEnergySource::new(BasicEnergySourceConfig::default(), sim.create_context("battery")).unwrap();
    let first = sim.create_context("first").id();
    let second = sim.create_context("second").id();

    source.attach(first);
    source.attach(second);
    source.update_draw(0., first, draw(2.));
    source.update_draw(5., second, draw(1.));
    assert_eq!(source.total_current(), 3.);
    assert_eq!(source.total_power(), 144.);

    source.detach(10., first);
    // 2 A over [0, 5] and 3 A over [5, 10] at 48 V
    assert_abs_diff_eq!(source.consumed_energy(), 1200., epsilon = 1e-9);
    assert_abs_diff_eq!(source.remaining_energy(), 1e7 - 1200., epsilon = 1e-9);
    assert_eq!(source.total_current(), 1.);
    assert_eq!(source.draw(first), None);
    assert_eq!(source.draw(second), Some(draw(1.)));
}

#[test]
fn test_remaining_energy_does_not_go_negative() {
    let mut sim = Simulation::new(123);
    let config = BasicEnergySourceConfig {
        initial_energy_j: 100.,
        ..BasicEnergySourceConfig::default()
    };
    let mut source = BasicEnergySource::new(config, sim.create_context("battery")).unwrap();
    let consumer = sim.create_context("consumer").id();
    source.update_draw(0., consumer, draw(10.));
    source.update_draw(10., consumer, draw(10.));

    assert_eq!(source.remaining_energy(), 0.);
    assert_eq!(source.energy_fraction(), 0.);
    assert!(source.is_depleted());
}

#[test]
fn test_periodic_update_requests() {
    let mut sim = Simulation::new(123);
    let config = BasicEnergySourceConfig {
        update_interval: 2.5,
        ..BasicEnergySourceConfig::default()
    };
    let source = rc!(refcell!(BasicEnergySource::new(config, sim.create_context("battery")).unwrap()));
    sim.add_handler("battery", source.clone());
    let consumer = rc!(refcell!(Consumer::default()));
    let consumer_id = sim.add_handler("consumer", consumer.clone());
    source.borrow_mut().attach(consumer_id);
    source.borrow_mut().attach(consumer_id);

    source.borrow_mut().start();
    sim.step_until_time(10.);
    assert_eq!(consumer.borrow().update_requests, vec![2.5, 5., 7.5, 10.]);

    source.borrow_mut().stop();
    sim.step_until_no_events();
    assert_eq!(consumer.borrow().update_requests.len(), 4);
    assert_eq!(sim.pending_event_count(), 0);
}

#[test]
fn test_depletion_and_recharge() {
    let mut sim = Simulation::new(123);
    let config = BasicEnergySourceConfig {
        initial_energy_j: 4800.,
        low_threshold: 0.25,
        high_threshold: 0.5,
        ..BasicEnergySourceConfig::default()
    };
    let source = rc!(refcell!(BasicEnergySource::new(config, sim.create_context("battery")).unwrap()));
    sim.add_handler("battery", source.clone());
    let consumer = rc!(refcell!(Consumer::default()));
    let consumer_id = sim.add_handler("consumer", consumer.clone());
    source.borrow_mut().attach(consumer_id);

    // 1 A at 48 V drains 48 J per second
    source.borrow_mut().update_draw(0., consumer_id, draw(1.));
    source.borrow_mut().update_draw(70., consumer_id, draw(1.));
    assert!(!source.borrow().is_depleted());
    source.borrow_mut().update_draw(75., consumer_id, draw(1.));
    assert!(source.borrow().is_depleted());
    source.borrow_mut().update_draw(80., consumer_id, draw(1.));
    sim.step_until_no_events();
    assert_eq!(consumer.borrow().depleted, 1);

    // still below the high threshold
    source.borrow_mut().recharge(80., 1000.).unwrap();
    assert!(source.borrow().is_depleted());
    source.borrow_mut().recharge(80., 1000.).unwrap();
    assert!(!source.borrow().is_depleted());
    sim.step_until_no_events();
    assert_eq!(consumer.borrow().recharged, 1);

    assert!(source.borrow_mut().recharge(80., -1.).is_err());
}

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use sugars::{rc, refcell};

use rusim_core::Simulation;
use rusim_energy::events::{EnergyUpdateRequested, TxPowerChanged};
use rusim_energy::{
    BasicEnergySource, BasicEnergySourceConfig, ConstantTxPowerSource, DeviceEnergyModel, EnergyModelError,
    EnergySignal, EnergySource, SignalRecorder,
};
use rusim_models::power::{HardwareProfile, OperatingState};

use common::{TestBed, ACTIVE_CURRENT_30DBM, ACTIVE_POWER_30DBM};

#[test]
fn test_sample_without_energy_source_fails() {
    let mut sim = Simulation::new(common::SEED);
    let mut model = DeviceEnergyModel::new(sim.create_context("ru"));
    let recorder = rc!(refcell!(SignalRecorder::new()));
    model.add_listener(recorder.clone());

    assert_eq!(model.update_energy(), Err(EnergyModelError::EnergySourceNotBound));
    assert!(recorder.borrow().is_empty());
    assert_eq!(model.total_energy_consumption(), 0.);
    assert_eq!(model.last_sample(), None);
}

#[test]
#[should_panic(expected = "energy source is not bound")]
fn test_update_request_without_energy_source_is_fatal() {
    let mut sim = Simulation::new(common::SEED);
    let model = rc!(refcell!(DeviceEnergyModel::new(sim.create_context("ru"))));
    let model_id = sim.add_handler("ru", model);
    let mut root = sim.create_context("root");
    root.emit(EnergyUpdateRequested {}, model_id, 1.);
    sim.step_until_no_events();
}

#[test]
fn test_fallback_sample() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    bed.sample_at(&[2.]);

    let model = bed.model.borrow();
    let sample = model.last_sample().unwrap();
    assert!(!model.is_live());
    assert_eq!(sample.state, OperatingState::Active);
    assert_eq!(sample.tx_power_dbm, 30.);
    assert_abs_diff_eq!(model.power_w(), ACTIVE_POWER_30DBM, epsilon = 1e-9);
    assert_abs_diff_eq!(model.current_a(), ACTIVE_CURRENT_30DBM, epsilon = 1e-9);
    assert_eq!(model.current_a(), model.power_w() / 48.);
    // the first sample covers the time since the model was created
    assert_abs_diff_eq!(model.total_energy_consumption(), ACTIVE_POWER_30DBM * 2., epsilon = 1e-6);

    let draw = bed.source.borrow().draw(bed.model_id).unwrap();
    assert_eq!(draw.current_a, sample.current_a);
    assert_eq!(draw.power_w, sample.power_w);
}

#[test]
fn test_energy_does_not_depend_on_sampling_granularity() {
    let duration = 10.;

    let mut coarse = TestBed::new(BasicEnergySourceConfig::default());
    coarse.sample_at(&[duration]);

    let mut fine = TestBed::new(BasicEnergySourceConfig::default());
    let times: Vec<f64> = (1..=40).map(|i| i as f64 * duration / 40.).collect();
    fine.sample_at(&times);

    let expected = ACTIVE_POWER_30DBM * duration;
    assert_abs_diff_eq!(coarse.model.borrow().total_energy_consumption(), expected, epsilon = 1e-6);
    assert_abs_diff_eq!(fine.model.borrow().total_energy_consumption(), expected, epsilon = 1e-6);
}

#[test]
fn test_sample_at_same_time_adds_no_energy() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    bed.sample_at(&[1., 1., 1.]);
    assert_abs_diff_eq!(
        bed.model.borrow().total_energy_consumption(),
        ACTIVE_POWER_30DBM,
        epsilon = 1e-9
    );
    assert_eq!(bed.recorder.borrow().values(EnergySignal::Power).len(), 3);
}

#[test]
fn test_live_source_matches_fallback() {
    let mut fallback = TestBed::new(BasicEnergySourceConfig::default());
    fallback.model.borrow_mut().set_fallback_tx_power_dbm(17.5).unwrap();
    fallback.sample_at(&[1.]);

    let mut live = TestBed::new(BasicEnergySourceConfig::default());
    let phy = rc!(refcell!(ConstantTxPowerSource::new(17.5)));
    live.model.borrow_mut().bind_tx_power_source(phy);
    assert!(live.model.borrow().is_live());
    live.sample_at(&[1.]);

    assert_eq!(fallback.model.borrow().last_sample(), live.model.borrow().last_sample());
}

#[test]
fn test_binding_takes_effect_on_next_sample() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    let phy = rc!(refcell!(ConstantTxPowerSource::new(40.)));
    bed.model.borrow_mut().set_fallback_tx_power_dbm(-10.).unwrap();

    bed.sample_at(&[1.]);
    bed.model.borrow_mut().bind_tx_power_source(phy.clone());
    bed.sample_at(&[2.]);
    phy.borrow_mut().set_tx_power_dbm(43.);
    bed.sample_at(&[3.]);
    bed.model.borrow_mut().unbind_tx_power_source();
    bed.sample_at(&[4.]);

    let tx = bed.recorder.borrow().values(EnergySignal::TxPower);
    assert_eq!(tx, vec![(1., -10.), (2., 40.), (3., 43.), (4., -10.)]);

    let power = bed.recorder.borrow().values(EnergySignal::Power);
    assert_eq!(power[0].1, 320.);
    assert_eq!(power[3].1, 320.);
    assert!(power[2].1 > power[1].1);
    assert!(power[1].1 > power[0].1);
}

#[test]
fn test_non_finite_live_power_is_rejected() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    let phy = rc!(refcell!(ConstantTxPowerSource::new(f64::NAN)));
    bed.model.borrow_mut().bind_tx_power_source(phy);
    let result = bed.model.borrow_mut().update_energy();
    assert!(matches!(result, Err(EnergyModelError::NonFiniteTxPower { .. })));
    assert!(bed.recorder.borrow().is_empty());
    assert_eq!(bed.source.borrow().draw(bed.model_id), None);
}

#[test]
fn test_invalid_fallback_is_rejected() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    assert!(bed.model.borrow_mut().set_fallback_tx_power_dbm(f64::INFINITY).is_err());
    assert_eq!(bed.model.borrow().fallback_tx_power_dbm(), 30.);
}

#[test]
fn test_signals_are_emitted_on_every_sample() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    bed.sample_at(&[1., 2.]);

    let recorder = bed.recorder.borrow();
    let updates = recorder.updates();
    assert_eq!(updates.len(), 6);
    let signals: Vec<EnergySignal> = updates.iter().map(|u| u.signal).collect();
    assert_eq!(
        signals,
        vec![
            EnergySignal::Current,
            EnergySignal::Power,
            EnergySignal::TxPower,
            EnergySignal::Current,
            EnergySignal::Power,
            EnergySignal::TxPower,
        ]
    );
    // no deduplication of equal values
    assert_eq!(updates[0].old_value, 0.);
    assert_eq!(updates[4].old_value, updates[4].new_value);
    assert_eq!(recorder.last_value(EnergySignal::TxPower), Some(30.));
    assert!(recorder.to_json().unwrap().contains("\"TxPower\""));
}

#[test]
fn test_tx_power_change_triggers_sample() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    let phy = rc!(refcell!(ConstantTxPowerSource::new(-3.)));
    bed.model.borrow_mut().bind_tx_power_source(phy);
    bed.root.emit(TxPowerChanged { tx_power_dbm: -3. }, bed.model_id, 5.);
    bed.sim.step_until_no_events();

    let model = bed.model.borrow();
    assert_eq!(model.last_sample().unwrap().state, OperatingState::Sleep);
    assert_eq!(model.total_energy_consumption(), 320. * 5.);
}

#[test]
fn test_periodic_updates_from_energy_source() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    bed.source.borrow_mut().start();
    bed.sim.step_until_time(10.);

    assert_eq!(bed.recorder.borrow().values(EnergySignal::Power).len(), 10);
    assert_abs_diff_eq!(
        bed.model.borrow().total_energy_consumption(),
        ACTIVE_POWER_30DBM * 10.,
        epsilon = 1e-6
    );
    // the source integrates each draw until the next update, starting from the first report at t=1
    let source = bed.source.borrow();
    assert_abs_diff_eq!(source.consumed_energy(), ACTIVE_POWER_30DBM * 9., epsilon = 1e-6);
    assert_abs_diff_eq!(
        source.remaining_energy(),
        1e7 - ACTIVE_POWER_30DBM * 9.,
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(source.total_current(), ACTIVE_CURRENT_30DBM, epsilon = 1e-9);
}

#[test]
fn test_depletion_and_recharge_notifications() {
    let config = BasicEnergySourceConfig {
        initial_energy_j: ACTIVE_POWER_30DBM * 10.,
        low_threshold: 0.45,
        high_threshold: 0.6,
        ..BasicEnergySourceConfig::default()
    };
    let mut bed = TestBed::new(config);
    bed.source.borrow_mut().start();

    bed.sim.step_until_time(6.5);
    assert!(!bed.model.borrow().is_depleted());
    bed.sim.step_until_time(7.5);
    assert!(bed.source.borrow().is_depleted());
    assert!(bed.model.borrow().is_depleted());

    let time = bed.sim.time();
    bed.source
        .borrow_mut()
        .recharge(time, ACTIVE_POWER_30DBM * 10.)
        .unwrap();
    assert!(!bed.source.borrow().is_depleted());
    assert_eq!(bed.source.borrow().energy_fraction(), 1.);
    bed.sim.steps(1);
    assert!(!bed.model.borrow().is_depleted());
}

#[test]
fn test_reset_starts_new_account() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    bed.sample_at(&[3.]);
    assert!(bed.model.borrow().total_energy_consumption() > 0.);

    bed.model.borrow_mut().reset();
    assert_eq!(bed.model.borrow().total_energy_consumption(), 0.);
    bed.sample_at(&[5.]);
    assert_abs_diff_eq!(
        bed.model.borrow().total_energy_consumption(),
        ACTIVE_POWER_30DBM * 2.,
        epsilon = 1e-6
    );
}

#[test]
fn test_rebinding_energy_source_preserves_energy() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    bed.sample_at(&[2.]);
    let energy_before = bed.model.borrow().total_energy_consumption();

    let other: Rc<RefCell<BasicEnergySource>> = rc!(refcell!(BasicEnergySource::new(
        BasicEnergySourceConfig::default(),
        bed.sim.create_context("other-battery"),
    )
    .unwrap()));
    bed.sim.add_handler("other-battery", other.clone());
    bed.model.borrow_mut().set_energy_source(other.clone());

    assert_eq!(bed.source.borrow().draw(bed.model_id), None);
    assert_eq!(bed.source.borrow().total_current(), 0.);
    assert_eq!(bed.model.borrow().total_energy_consumption(), energy_before);

    bed.sample_at(&[4.]);
    assert!(other.borrow().draw(bed.model_id).is_some());
    assert_abs_diff_eq!(
        bed.model.borrow().total_energy_consumption(),
        ACTIVE_POWER_30DBM * 4.,
        epsilon = 1e-6
    );
}

#[test]
fn test_reconfigured_profile_is_used() {
    let mut bed = TestBed::new(BasicEnergySourceConfig::default());
    bed.model
        .borrow_mut()
        .power_model_mut()
        .set_profile(HardwareProfile::builder().num_trx(1).build().unwrap());
    bed.model
        .borrow_mut()
        .power_model_mut()
        .profile_mut()
        .set_vdc(12.)
        .unwrap();
    bed.sample_at(&[1.]);

    let model = bed.model.borrow();
    assert_abs_diff_eq!(model.power_w(), ACTIVE_POWER_30DBM / 64., epsilon = 1e-9);
    assert_abs_diff_eq!(model.current_a(), model.power_w() / 12., epsilon = 1e-12);
}

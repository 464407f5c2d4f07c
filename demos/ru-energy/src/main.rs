use std::cell::RefCell;
use std::error::Error;
use std::io::Write;
use std::rc::Rc;

use clap::Parser;
use env_logger::Builder;
use serde::Serialize;
use sugars::{rc, refcell};

use rusim_core::{cast, log_debug, log_info};
use rusim_core::{Event, EventHandler, Id, Simulation, SimulationContext};
use rusim_energy::config::RuEnergyConfig;
use rusim_energy::events::TxPowerChanged;
use rusim_energy::{BasicEnergySource, DeviceEnergyModel, EnergySource, SignalRecorder, TransmitPowerSource};

const TX_POWER_LEVELS_DBM: [f64; 5] = [-10., 10., 20., 30., 40.];
const MIN_CHANGE_INTERVAL: f64 = 0.5;
const MAX_CHANGE_INTERVAL: f64 = 30.;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to YAML config (defaults are used when absent)
    #[clap(long)]
    config: Option<String>,

    /// Simulation length in seconds, overrides config value
    #[clap(long)]
    duration: Option<f64>,

    /// Random seed, overrides config value
    #[clap(long)]
    seed: Option<u64>,

    /// Use static transmit power from config instead of the PHY
    #[clap(long)]
    fallback: bool,

    /// Path to save current, power and transmit power signals as JSON
    #[clap(long)]
    trace: Option<String>,
}

#[derive(Clone, Serialize)]
struct ChangeTxPower {}

/// PHY stub switching between transmit power levels at random instants.
struct Phy {
    tx_power_dbm: f64,
    ru_id: Id,
    ctx: SimulationContext,
}

impl Phy {
    fn new(tx_power_dbm: f64, ru_id: Id, ctx: SimulationContext) -> Self {
        Self {
            tx_power_dbm,
            ru_id,
            ctx,
        }
    }

    fn start(&mut self) {
        self.schedule_change();
    }

    fn schedule_change(&mut self) {
        let delay = self.ctx.gen_range(MIN_CHANGE_INTERVAL..MAX_CHANGE_INTERVAL);
        self.ctx.emit_self(ChangeTxPower {}, delay);
    }
}

impl TransmitPowerSource for Phy {
    fn current_tx_power_dbm(&self) -> f64 {
        self.tx_power_dbm
    }
}

impl EventHandler for Phy {
    fn on(&mut self, event: Event) {
        cast!(match event.data {
            ChangeTxPower {} => {
                let level = self.ctx.gen_range(0..TX_POWER_LEVELS_DBM.len());
                self.tx_power_dbm = TX_POWER_LEVELS_DBM[level];
                log_debug!(self.ctx, "transmit power set to {} dBm", self.tx_power_dbm);
                self.ctx.emit_now(
                    TxPowerChanged {
                        tx_power_dbm: self.tx_power_dbm,
                    },
                    self.ru_id,
                );
                self.schedule_change();
            }
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RuEnergyConfig::from_file(path)?,
        None => RuEnergyConfig::default(),
    };
    let duration = args.duration.unwrap_or(config.simulation.length);
    let seed = args.seed.unwrap_or(config.simulation.seed);

    let mut sim = Simulation::new(seed);

    let battery = rc!(refcell!(BasicEnergySource::new(
        config.energy_source.clone(),
        sim.create_context("battery")
    )?));
    sim.add_handler("battery", battery.clone());

    let ru = rc!(refcell!(DeviceEnergyModel::with_profile(
        config.profile.clone(),
        sim.create_context("ru")
    )));
    let ru_id = sim.add_handler("ru", ru.clone());
    ru.borrow_mut().set_fallback_tx_power_dbm(config.tx_power_dbm)?;
    ru.borrow_mut().set_energy_source(battery.clone());

    let recorder = rc!(refcell!(SignalRecorder::new()));
    if args.trace.is_some() {
        ru.borrow_mut().add_listener(recorder.clone());
    }

    if !args.fallback {
        let phy = rc!(refcell!(Phy::new(config.tx_power_dbm, ru_id, sim.create_context("phy"))));
        sim.add_handler("phy", phy.clone());
        ru.borrow_mut().bind_tx_power_source(phy.clone());
        phy.borrow_mut().start();
    }

    let root = sim.create_context("root");
    log_info!(
        root,
        "starting {} s run with {} TRX, {} transmit power",
        duration,
        config.profile.num_trx(),
        if args.fallback { "static" } else { "live" }
    );
    battery.borrow_mut().start();
    sim.step_until_time(duration);

    let ru = ru.borrow();
    let battery = battery.borrow();
    let elapsed = sim.time();
    println!("Simulated time: {:.3} s", elapsed);
    println!("Processed events: {}", sim.event_count());
    println!("RU energy: {:.3} J", ru.total_energy_consumption());
    if elapsed > 0. {
        println!("RU average power: {:.3} W", ru.total_energy_consumption() / elapsed);
    }
    println!(
        "Battery remaining: {:.3} J ({:.2}%){}",
        battery.remaining_energy(),
        battery.energy_fraction() * 100.,
        if battery.is_depleted() { ", depleted" } else { "" }
    );

    if let Some(path) = &args.trace {
        recorder.borrow().save_json(path)?;
        log_info!(root, "saved {} signal updates to {}", recorder.borrow().len(), path);
    }
    Ok(())
}

// SPDX-License-Identifier: MPL-2.0

//! Demo program: run the automatic irrigation loop on a small plantation.
//!
//! Plants a few trees and vegetables, starts both sensors and the
//! controller, lets them run, then stops everything and waits up to two
//! seconds for each unit.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example irrigation -- [seconds] [config.json]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=forestry_irrigation=debug cargo run --example irrigation -- 20
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use forestry_irrigation::{
    CropKind, IrrigationConfig, IrrigationEvent, IrrigationSystem, Plantation, PlantationService,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_RUN_SECS: u64 = 15;
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let run_for = match args.get(1) {
        Some(secs) => Duration::from_secs(secs.parse()?),
        None => Duration::from_secs(DEFAULT_RUN_SECS),
    };
    let config = match args.get(2) {
        Some(path) => IrrigationConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => IrrigationConfig::default(),
    };

    let plantation = Arc::new(Plantation::new("Finca del Madero", 1000.0));
    let service = Arc::new(PlantationService::new());
    for (name, count) in [("pine", 5), ("olive", 5), ("lettuce", 5), ("carrot", 5)] {
        let kind: CropKind = name.parse()?;
        service.plant(&plantation, kind, count)?;
    }
    println!(
        "Plantation '{}': {} crops, {}L of water, {:.2}m2 free",
        plantation.name(),
        plantation.crop_count(),
        plantation.water(),
        plantation.free_area()
    );

    let system = IrrigationSystem::new(&config, Arc::clone(&plantation), service)?;

    let mut events = system.controller().subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                IrrigationEvent::Irrigated {
                    liters,
                    temperature,
                    humidity,
                    ..
                } => println!("[IRRIGATION] T={temperature}C H={humidity}% -> {liters}L"),
                IrrigationEvent::IrrigationFailed { error, .. } => {
                    println!("[IRRIGATION] failed: {error}");
                }
                IrrigationEvent::ReadingDiscarded { reading, .. } => {
                    println!("[IRRIGATION] discarded {reading}");
                }
            }
        }
    });

    println!("Running for {}s...", run_for.as_secs());
    system.start()?;
    tokio::time::sleep(run_for).await;

    println!("Stopping...");
    system.stop();
    let report = system.join(Some(JOIN_TIMEOUT)).await;

    println!(
        "Irrigations: {}, failures: {}, water left: {}L",
        system.controller().irrigation_count(),
        system.controller().failure_count(),
        plantation.water()
    );
    if !report.all_stopped() {
        println!("Some units did not stop in time: {report:?}");
    }
    println!("Done!");
    Ok(())
}

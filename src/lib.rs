// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Forestry Irrigation - sensor-driven automatic irrigation for plantations.
//!
//! Two periodic sensor producers (temperature and humidity) publish tagged
//! readings to their observers. An irrigation controller subscribes to both,
//! keeps the latest value of each, and on its own schedule irrigates a
//! plantation whenever the threshold policy holds.
//!
//! # Components
//!
//! - **Subscription**: generic observer registry with fault-isolated fan-out
//! - **Sensors**: periodic producers of synthetic or injected readings
//! - **Irrigation**: threshold policy and the controller unit
//! - **Plantation**: crops, water reserve and the default irrigation action
//! - **System**: the three units wired together with uniform start/stop/join
//!
//! Every unit runs as a detached tokio task. Stopping wakes a unit that is
//! waiting for its next tick, and joining accepts an optional timeout.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use forestry_irrigation::{
//!     CropKind, IrrigationConfig, IrrigationSystem, Plantation, PlantationService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> forestry_irrigation::Result<()> {
//!     let plantation = Arc::new(Plantation::new("north", 200.0));
//!     let service = Arc::new(PlantationService::new());
//!     service.plant(&plantation, CropKind::Pine, 10)?;
//!     service.plant(&plantation, CropKind::Lettuce, 20)?;
//!
//!     let system = IrrigationSystem::new(&IrrigationConfig::default(), plantation, service)?;
//!
//!     let mut events = system.controller().subscribe_events();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{event:?}");
//!         }
//!     });
//!
//!     system.start()?;
//!     tokio::time::sleep(Duration::from_secs(15)).await;
//!     system.stop();
//!     system.join(Some(Duration::from_secs(2))).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Observing a Producer Directly
//!
//! ```
//! use forestry_irrigation::sensor::{Reading, SensorProducer};
//!
//! let producer = SensorProducer::temperature();
//! producer.subscribe_fn(|reading: &Reading| {
//!     println!("{reading}");
//!     Ok(())
//! });
//!
//! let reading = producer.read_once().unwrap();
//! assert!(reading.is_plausible());
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod irrigation;
pub mod lifecycle;
pub mod plantation;
pub mod sensor;
pub mod subscription;
pub mod system;

pub use config::IrrigationConfig;
pub use error::{
    ConfigError, Error, IrrigationError, LifecycleError, ObserverError, Result, SensorError,
};
pub use event::{EventBus, IrrigationEvent};
pub use irrigation::{
    ControllerConfig, IrrigationController, IrrigationPolicy, IrrigationService, TickOutcome,
};
pub use lifecycle::UnitState;
pub use plantation::{CropKind, Plantation, PlantationService};
pub use sensor::{Reading, SensorConfig, SensorKind, SensorProducer};
pub use subscription::{Observable, Observer, SubscriptionId};
pub use system::{IrrigationSystem, ShutdownReport};

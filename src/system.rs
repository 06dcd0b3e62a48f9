// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The assembled irrigation system: two producers and one controller.

use std::sync::Arc;
use std::time::Duration;

use crate::config::IrrigationConfig;
use crate::error::Result;
use crate::irrigation::{IrrigationController, IrrigationService};
use crate::sensor::{SensorKind, SensorProducer};

/// Outcome of [`IrrigationSystem::join`]: which units stopped in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// The temperature producer acknowledged the stop.
    pub temperature: bool,
    /// The humidity producer acknowledged the stop.
    pub humidity: bool,
    /// The controller acknowledged the stop.
    pub controller: bool,
}

impl ShutdownReport {
    /// Returns `true` if every unit stopped within the budget.
    #[must_use]
    pub fn all_stopped(&self) -> bool {
        self.temperature && self.humidity && self.controller
    }
}

/// Owns the three schedulable units and drives them together.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use forestry_irrigation::config::IrrigationConfig;
/// use forestry_irrigation::plantation::{CropKind, Plantation, PlantationService};
/// use forestry_irrigation::system::IrrigationSystem;
///
/// # async fn run() -> forestry_irrigation::Result<()> {
/// let plantation = Arc::new(Plantation::new("north", 100.0));
/// let service = Arc::new(PlantationService::new());
/// service.plant(&plantation, CropKind::Pine, 5)?;
///
/// let system = IrrigationSystem::new(&IrrigationConfig::default(), plantation, service)?;
/// system.start()?;
/// tokio::time::sleep(Duration::from_secs(15)).await;
/// system.stop();
/// let report = system.join(Some(Duration::from_secs(2))).await;
/// assert!(report.all_stopped());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct IrrigationSystem<S: IrrigationService> {
    temperature: SensorProducer,
    humidity: SensorProducer,
    controller: IrrigationController<S>,
}

impl<S: IrrigationService> IrrigationSystem<S> {
    /// Validates `config` and builds the producers and the controller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is invalid.
    pub fn new(
        config: &IrrigationConfig,
        plantation: Arc<S::Plantation>,
        service: Arc<S>,
    ) -> Result<Self> {
        let temperature = SensorProducer::new(SensorKind::Temperature, config.temperature)?;
        let humidity = SensorProducer::new(SensorKind::Humidity, config.humidity)?;
        Self::from_parts(temperature, humidity, plantation, service, config)
    }

    /// Builds a system around existing producers.
    ///
    /// Only the controller section of `config` is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the controller
    /// section is invalid.
    pub fn from_parts(
        temperature: SensorProducer,
        humidity: SensorProducer,
        plantation: Arc<S::Plantation>,
        service: Arc<S>,
        config: &IrrigationConfig,
    ) -> Result<Self> {
        let controller = IrrigationController::with_config(
            &temperature,
            &humidity,
            plantation,
            service,
            config.controller,
        )?;
        Ok(Self {
            temperature,
            humidity,
            controller,
        })
    }

    /// The temperature producer.
    #[must_use]
    pub fn temperature(&self) -> &SensorProducer {
        &self.temperature
    }

    /// The humidity producer.
    #[must_use]
    pub fn humidity(&self) -> &SensorProducer {
        &self.humidity
    }

    /// The irrigation controller.
    #[must_use]
    pub fn controller(&self) -> &IrrigationController<S> {
        &self.controller
    }

    /// Starts both producers, then the controller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Lifecycle`](crate::Error::Lifecycle) if a unit
    /// cannot start. Units started before the failure are stopped again.
    pub fn start(&self) -> Result<()> {
        let started = self
            .temperature
            .start()
            .and_then(|()| self.humidity.start())
            .and_then(|()| self.controller.start());
        if let Err(e) = started {
            tracing::warn!(error = %e, "Irrigation system failed to start");
            self.stop();
            return Err(e.into());
        }
        tracing::info!("Irrigation system started");
        Ok(())
    }

    /// Requests every unit to stop. Idempotent.
    pub fn stop(&self) {
        self.temperature.stop();
        self.humidity.stop();
        self.controller.stop();
    }

    /// Waits for all three units concurrently, each with its own `timeout`.
    pub async fn join(&self, timeout: Option<Duration>) -> ShutdownReport {
        let (temperature, humidity, controller) = tokio::join!(
            self.temperature.join(timeout),
            self.humidity.join(timeout),
            self.controller.join(timeout),
        );
        let report = ShutdownReport {
            temperature,
            humidity,
            controller,
        };
        if report.all_stopped() {
            tracing::info!("Irrigation system stopped");
        } else {
            tracing::warn!(?report, "Irrigation system shutdown incomplete");
        }
        report
    }
}

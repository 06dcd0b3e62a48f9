// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known sensor values cached by the controller.

use parking_lot::RwLock;

use crate::error::ObserverError;
use crate::event::{EventBus, IrrigationEvent};
use crate::sensor::{Reading, SensorKind};
use crate::subscription::Observer;

/// Point-in-time copy of the controller's cached readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadingsSnapshot {
    /// Last plausible temperature, if any was received.
    pub temperature: Option<f64>,
    /// Last plausible humidity, if any was received.
    pub humidity: Option<f64>,
}

/// The controller's subscriber: keeps the latest value of each kind.
///
/// Written from the producers' tasks, read from the controller's task.
#[derive(Debug)]
pub struct LastReadings {
    temperature: RwLock<Option<f64>>,
    humidity: RwLock<Option<f64>>,
    events: EventBus,
}

impl LastReadings {
    pub(crate) fn new(events: EventBus) -> Self {
        Self {
            temperature: RwLock::new(None),
            humidity: RwLock::new(None),
            events,
        }
    }

    /// Stores a reading in the field matching its kind.
    ///
    /// Returns `false` if the reading was implausible and discarded.
    pub fn record(&self, reading: &Reading) -> bool {
        if !reading.is_plausible() {
            tracing::warn!(
                sensor = %reading.kind,
                value = reading.value,
                "Discarding implausible reading"
            );
            self.events.publish(IrrigationEvent::reading_discarded(*reading));
            return false;
        }

        let slot = match reading.kind {
            SensorKind::Temperature => &self.temperature,
            SensorKind::Humidity => &self.humidity,
        };
        *slot.write() = Some(reading.value);
        true
    }

    /// Copies both fields.
    #[must_use]
    pub fn snapshot(&self) -> ReadingsSnapshot {
        ReadingsSnapshot {
            temperature: *self.temperature.read(),
            humidity: *self.humidity.read(),
        }
    }
}

impl Observer<Reading> for LastReadings {
    fn notify(&self, reading: &Reading) -> Result<(), ObserverError> {
        self.record(reading);
        Ok(())
    }

    fn name(&self) -> &str {
        "irrigation-controller"
    }
}

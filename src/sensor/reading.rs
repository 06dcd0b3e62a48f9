// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor kinds and the readings they publish.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Plausible temperature readings in °C. Anything outside is a sensor fault.
pub const TEMPERATURE_PLAUSIBLE: RangeInclusive<f64> = -50.0..=70.0;

/// Plausible relative humidity readings in %.
pub const HUMIDITY_PLAUSIBLE: RangeInclusive<f64> = 0.0..=100.0;

/// The physical quantity a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Ambient temperature in °C.
    Temperature,
    /// Relative humidity in %.
    Humidity,
}

impl SensorKind {
    /// Range of values a healthy sensor of this kind can report.
    #[must_use]
    pub fn plausible_range(self) -> RangeInclusive<f64> {
        match self {
            Self::Temperature => TEMPERATURE_PLAUSIBLE,
            Self::Humidity => HUMIDITY_PLAUSIBLE,
        }
    }

    /// Measurement unit suffix.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
        }
    }

    /// Name of the producer unit for this kind, used in logs.
    #[must_use]
    pub(crate) fn unit_name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature-sensor",
            Self::Humidity => "humidity-sensor",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => f.write_str("temperature"),
            Self::Humidity => f.write_str("humidity"),
        }
    }
}

/// One value published by a sensor producer, tagged with its kind.
///
/// # Examples
///
/// ```
/// use forestry_irrigation::sensor::{Reading, SensorKind};
///
/// let reading = Reading::temperature(12.5);
/// assert_eq!(reading.kind, SensorKind::Temperature);
/// assert!(reading.is_plausible());
/// assert!(!Reading::humidity(200.0).is_plausible());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Which sensor produced the value.
    pub kind: SensorKind,
    /// The measured value.
    pub value: f64,
}

impl Reading {
    /// Creates a reading of the given kind.
    #[must_use]
    pub fn new(kind: SensorKind, value: f64) -> Self {
        Self { kind, value }
    }

    /// Creates a temperature reading.
    #[must_use]
    pub fn temperature(value: f64) -> Self {
        Self::new(SensorKind::Temperature, value)
    }

    /// Creates a humidity reading.
    #[must_use]
    pub fn humidity(value: f64) -> Self {
        Self::new(SensorKind::Humidity, value)
    }

    /// Returns `true` if the value is finite and within the plausible range
    /// for its kind.
    #[must_use]
    pub fn is_plausible(&self) -> bool {
        self.value.is_finite() && self.kind.plausible_range().contains(&self.value)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:.1}{}", self.kind, self.value, self.kind.unit())
    }
}

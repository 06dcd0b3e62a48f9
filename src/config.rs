// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Aggregate configuration for the irrigation system.
//!
//! # Examples
//!
//! ```
//! use forestry_irrigation::config::IrrigationConfig;
//!
//! let config = IrrigationConfig::from_json_str(r#"{
//!     "controller": { "interval_secs": 1.0, "policy": { "humidity_max": 40.0 } }
//! }"#).unwrap();
//!
//! assert_eq!(config.controller.interval.as_secs(), 1);
//! assert_eq!(config.temperature.interval.as_secs(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::irrigation::ControllerConfig;
use crate::sensor::SensorConfig;

/// Configuration of both sensor producers and the controller.
///
/// Missing sections take their defaults when deserialized. A sensor
/// section, once present, must be complete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrigationConfig {
    /// Temperature producer settings.
    pub temperature: SensorConfig,
    /// Humidity producer settings.
    pub humidity: SensorConfig,
    /// Controller settings.
    pub controller: ControllerConfig,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            temperature: SensorConfig::temperature(),
            humidity: SensorConfig::humidity(),
            controller: ControllerConfig::default(),
        }
    }
}

impl IrrigationConfig {
    /// Sets the temperature producer settings.
    #[must_use]
    pub fn with_temperature(mut self, config: SensorConfig) -> Self {
        self.temperature = config;
        self
    }

    /// Sets the humidity producer settings.
    #[must_use]
    pub fn with_humidity(mut self, config: SensorConfig) -> Self {
        self.humidity = config;
        self
    }

    /// Sets the controller settings.
    #[must_use]
    pub fn with_controller(mut self, config: ControllerConfig) -> Self {
        self.controller = config;
        self
    }

    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is malformed, or the
    /// validation error of the first invalid section.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.temperature.validate("temperature")?;
        self.humidity.validate("humidity")?;
        self.controller.validate()
    }
}

/// Serde adapter encoding a [`Duration`](std::time::Duration) as
/// floating-point seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

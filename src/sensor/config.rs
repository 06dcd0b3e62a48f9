// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor producer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::SensorKind;
use crate::error::ConfigError;

/// Default temperature sampling interval.
pub const DEFAULT_TEMPERATURE_INTERVAL: Duration = Duration::from_secs(2);

/// Default humidity sampling interval.
pub const DEFAULT_HUMIDITY_INTERVAL: Duration = Duration::from_secs(3);

/// Configuration for a sensor producer.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use forestry_irrigation::sensor::SensorConfig;
///
/// let config = SensorConfig::temperature()
///     .with_interval(Duration::from_millis(500))
///     .with_range(0.0, 30.0);
/// assert!(config.validate("temperature").is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Time between two readings.
    #[serde(rename = "interval_secs", with = "crate::config::duration_secs")]
    pub interval: Duration,
    /// Lowest value the synthetic sensor generates.
    pub min_value: f64,
    /// Highest value the synthetic sensor generates.
    pub max_value: f64,
}

impl SensorConfig {
    /// Creates a configuration from its parts.
    #[must_use]
    pub fn new(interval: Duration, min_value: f64, max_value: f64) -> Self {
        Self {
            interval,
            min_value,
            max_value,
        }
    }

    /// Default temperature sensor: every 2 s, −25..50 °C.
    #[must_use]
    pub fn temperature() -> Self {
        Self::new(DEFAULT_TEMPERATURE_INTERVAL, -25.0, 50.0)
    }

    /// Default humidity sensor: every 3 s, 0..100 %.
    #[must_use]
    pub fn humidity() -> Self {
        Self::new(DEFAULT_HUMIDITY_INTERVAL, 0.0, 100.0)
    }

    /// Default configuration for the given kind.
    #[must_use]
    pub fn for_kind(kind: SensorKind) -> Self {
        match kind {
            SensorKind::Temperature => Self::temperature(),
            SensorKind::Humidity => Self::humidity(),
        }
    }

    /// Sets the sampling interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the generated value range.
    #[must_use]
    pub fn with_range(mut self, min_value: f64, max_value: f64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Checks that the interval is positive and the range is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInterval`] or [`ConfigError::InvalidRange`].
    pub fn validate(&self, sensor: &str) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidInterval {
                unit: format!("{sensor} sensor"),
            });
        }
        if !self.min_value.is_finite()
            || !self.max_value.is_finite()
            || self.min_value > self.max_value
        {
            return Err(ConfigError::InvalidRange {
                sensor: sensor.to_string(),
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_kind() {
        let temp = SensorConfig::for_kind(SensorKind::Temperature);
        assert_eq!(temp.interval, Duration::from_secs(2));
        assert!((temp.min_value - -25.0).abs() < f64::EPSILON);
        assert!((temp.max_value - 50.0).abs() < f64::EPSILON);

        let hum = SensorConfig::for_kind(SensorKind::Humidity);
        assert_eq!(hum.interval, Duration::from_secs(3));
        assert!((hum.max_value - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = SensorConfig::humidity().with_range(80.0, 20.0);
        assert!(matches!(
            config.validate("humidity"),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = SensorConfig::temperature().with_interval(Duration::ZERO);
        assert!(matches!(
            config.validate("temperature"),
            Err(ConfigError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn single_point_range_is_valid() {
        let config = SensorConfig::temperature().with_range(10.0, 10.0);
        assert!(config.validate("temperature").is_ok());
    }

    #[test]
    fn serializes_interval_as_seconds() {
        let config = SensorConfig::new(Duration::from_millis(1500), 0.0, 1.0);
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json["interval_secs"], 1.5);

        let back: SensorConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}

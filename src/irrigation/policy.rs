// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Threshold policy and controller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lowest temperature (°C) at which irrigation is allowed.
pub const DEFAULT_TEMPERATURE_MIN: f64 = 8.0;

/// Highest temperature (°C) at which irrigation is allowed.
pub const DEFAULT_TEMPERATURE_MAX: f64 = 15.0;

/// Humidity (%) at or above which irrigation is skipped.
pub const DEFAULT_HUMIDITY_MAX: f64 = 50.0;

/// Default time between two controller evaluations.
pub const DEFAULT_CONTROLLER_INTERVAL: Duration = Duration::from_millis(2500);

/// Decides whether the latest readings call for irrigation.
///
/// Irrigation happens iff both readings are known, the temperature lies in
/// `[temperature_min, temperature_max]` and the humidity is strictly below
/// `humidity_max`.
///
/// # Examples
///
/// ```
/// use forestry_irrigation::irrigation::IrrigationPolicy;
///
/// let policy = IrrigationPolicy::default();
/// assert!(policy.should_irrigate(Some(10.0), Some(40.0)));
/// assert!(!policy.should_irrigate(Some(10.0), Some(60.0)));
/// assert!(!policy.should_irrigate(None, Some(40.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrigationPolicy {
    /// Inclusive lower bound of the temperature window.
    pub temperature_min: f64,
    /// Inclusive upper bound of the temperature window.
    pub temperature_max: f64,
    /// Exclusive humidity threshold.
    pub humidity_max: f64,
}

impl Default for IrrigationPolicy {
    fn default() -> Self {
        Self {
            temperature_min: DEFAULT_TEMPERATURE_MIN,
            temperature_max: DEFAULT_TEMPERATURE_MAX,
            humidity_max: DEFAULT_HUMIDITY_MAX,
        }
    }
}

impl IrrigationPolicy {
    /// Sets the inclusive temperature window.
    #[must_use]
    pub fn with_temperature_window(mut self, min: f64, max: f64) -> Self {
        self.temperature_min = min;
        self.temperature_max = max;
        self
    }

    /// Sets the exclusive humidity threshold.
    #[must_use]
    pub fn with_humidity_max(mut self, humidity_max: f64) -> Self {
        self.humidity_max = humidity_max;
        self
    }

    /// Evaluates the policy. Unknown readings never trigger irrigation.
    #[must_use]
    pub fn should_irrigate(&self, temperature: Option<f64>, humidity: Option<f64>) -> bool {
        let (Some(temperature), Some(humidity)) = (temperature, humidity) else {
            return false;
        };
        (self.temperature_min..=self.temperature_max).contains(&temperature)
            && humidity < self.humidity_max
    }

    /// Checks that the thresholds are finite and the window is not inverted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPolicy`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if ![self.temperature_min, self.temperature_max, self.humidity_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ConfigError::InvalidPolicy(
                "thresholds must be finite".to_string(),
            ));
        }
        if self.temperature_min > self.temperature_max {
            return Err(ConfigError::InvalidPolicy(format!(
                "temperature window [{}, {}] is inverted",
                self.temperature_min, self.temperature_max
            )));
        }
        Ok(())
    }
}

/// Configuration for the irrigation controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Time between two evaluations.
    #[serde(rename = "interval_secs", with = "crate::config::duration_secs")]
    pub interval: Duration,
    /// Threshold policy applied on every evaluation.
    pub policy: IrrigationPolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CONTROLLER_INTERVAL,
            policy: IrrigationPolicy::default(),
        }
    }
}

impl ControllerConfig {
    /// Sets the evaluation interval.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the threshold policy.
    #[must_use]
    pub fn with_policy(mut self, policy: IrrigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validates the interval and the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidInterval {
                unit: "irrigation controller".to_string(),
            });
        }
        self.policy.validate()
    }
}

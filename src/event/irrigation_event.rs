// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Irrigation event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IrrigationError;
use crate::sensor::Reading;

/// Events emitted by the irrigation controller.
///
/// Each event carries the UTC time at which it happened.
///
/// # Examples
///
/// ```
/// use forestry_irrigation::event::IrrigationEvent;
/// use forestry_irrigation::sensor::Reading;
///
/// let irrigated = IrrigationEvent::irrigated(12, 10.0, 40.0);
/// assert!(irrigated.is_irrigated());
///
/// let discarded = IrrigationEvent::reading_discarded(Reading::humidity(200.0));
/// assert!(discarded.is_discarded());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IrrigationEvent {
    /// The policy held and the irrigation action succeeded.
    Irrigated {
        /// Liters consumed by the plantation.
        liters: u32,
        /// Temperature that triggered the decision.
        temperature: f64,
        /// Humidity that triggered the decision.
        humidity: f64,
        /// When the irrigation happened.
        at: DateTime<Utc>,
    },

    /// The policy held but the irrigation action failed or panicked.
    IrrigationFailed {
        /// Description of the failure.
        error: String,
        /// When the failure happened.
        at: DateTime<Utc>,
    },

    /// A reading was implausible for its kind and was dropped.
    ReadingDiscarded {
        /// The rejected reading.
        reading: Reading,
        /// When it was discarded.
        at: DateTime<Utc>,
    },
}

impl IrrigationEvent {
    /// Returns when the event happened.
    #[must_use]
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Irrigated { at, .. }
            | Self::IrrigationFailed { at, .. }
            | Self::ReadingDiscarded { at, .. } => *at,
        }
    }

    /// Returns `true` if this is a successful irrigation.
    #[must_use]
    pub fn is_irrigated(&self) -> bool {
        matches!(self, Self::Irrigated { .. })
    }

    /// Returns `true` if this is a failed irrigation.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::IrrigationFailed { .. })
    }

    /// Returns `true` if this is a discarded reading.
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::ReadingDiscarded { .. })
    }

    /// Creates an irrigated event stamped now.
    #[must_use]
    pub fn irrigated(liters: u32, temperature: f64, humidity: f64) -> Self {
        Self::Irrigated {
            liters,
            temperature,
            humidity,
            at: Utc::now(),
        }
    }

    /// Creates a failure event from an irrigation error.
    #[must_use]
    pub fn failed(error: &IrrigationError) -> Self {
        Self::failed_with(error.to_string())
    }

    /// Creates a failure event from a free-form message.
    #[must_use]
    pub fn failed_with(error: impl Into<String>) -> Self {
        Self::IrrigationFailed {
            error: error.into(),
            at: Utc::now(),
        }
    }

    /// Creates a discarded-reading event stamped now.
    #[must_use]
    pub fn reading_discarded(reading: Reading) -> Self {
        Self::ReadingDiscarded {
            reading,
            at: Utc::now(),
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the irrigation library.
//!
//! Errors are grouped by concern: configuration validation, unit lifecycle,
//! sensor sampling, subscriber delivery and the irrigation action itself.
//! Failures that happen inside a running unit's tick are logged by the
//! unit and never reach the caller; the types here are still used to
//! describe them.

use thiserror::Error;

use crate::lifecycle::UnitState;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration was rejected during validation or parsing.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A schedulable unit could not change state.
    #[error("lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// The irrigation action failed.
    #[error("irrigation error: {0}")]
    Irrigation(#[from] IrrigationError),

    /// The crop factory was given a name it does not know.
    #[error("unknown crop: {0}")]
    UnknownCrop(String),
}

/// Errors raised while validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A sensor range is inverted or not finite.
    #[error("invalid {sensor} range [{min}, {max}]")]
    InvalidRange {
        /// Which sensor the range belongs to.
        sensor: String,
        /// Lower bound that was provided.
        min: f64,
        /// Upper bound that was provided.
        max: f64,
    },

    /// An interval is zero or negative.
    #[error("{unit} interval must be positive")]
    InvalidInterval {
        /// Which unit the interval belongs to.
        unit: String,
    },

    /// The irrigation policy thresholds are inconsistent.
    #[error("invalid irrigation policy: {0}")]
    InvalidPolicy(String),

    /// The configuration document could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to starting and stopping schedulable units.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start()` was called on a unit that already left `Created`.
    #[error("{unit} cannot start from state {state}")]
    AlreadyStarted {
        /// Name of the unit.
        unit: &'static str,
        /// State the unit was in.
        state: UnitState,
    },

    /// `start()` was called outside a tokio runtime.
    #[error("{unit} must be started from within a tokio runtime")]
    NoRuntime {
        /// Name of the unit.
        unit: &'static str,
    },
}

/// Errors produced while sampling a sensor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    /// The reading source could not produce a value.
    #[error("sampling failed: {0}")]
    Sample(String),

    /// The reading source produced NaN or an infinity.
    #[error("malformed reading: {0}")]
    NonFinite(f64),
}

/// Error returned by a subscriber that rejects a delivery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The subscriber could not handle the published value.
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Errors raised by the irrigation action on a plantation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IrrigationError {
    /// The plantation does not hold enough water for a full irrigation.
    #[error("insufficient water: available={available}L, required={required}L")]
    WaterExhausted {
        /// Liters currently available.
        available: u32,
        /// Liters needed for the operation.
        required: u32,
    },

    /// There is not enough free area to plant the requested crops.
    #[error("insufficient area: required={required:.2}m2, available={available:.2}m2")]
    InsufficientArea {
        /// Square meters needed.
        required: f64,
        /// Square meters still free.
        available: f64,
    },

    /// The irrigation backend could not be reached or refused the request.
    #[error("irrigation unavailable: {0}")]
    Unavailable(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

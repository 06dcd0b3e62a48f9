// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Automatic irrigation control.
//!
//! The [`IrrigationController`] subscribes to a temperature and a humidity
//! [`SensorProducer`](crate::sensor::SensorProducer), caches the latest
//! value of each in [`LastReadings`], and on its own schedule applies an
//! [`IrrigationPolicy`]. When the policy holds it calls an
//! [`IrrigationService`] on the plantation it was given.
//!
//! With the default policy, irrigation happens when the temperature is in
//! 8..=15 °C and the humidity is below 50 %.

mod controller;
mod policy;
mod readings;
mod service;

pub use controller::{IrrigationController, TickOutcome};
pub use policy::{
    ControllerConfig, DEFAULT_CONTROLLER_INTERVAL, DEFAULT_HUMIDITY_MAX, DEFAULT_TEMPERATURE_MAX,
    DEFAULT_TEMPERATURE_MIN, IrrigationPolicy,
};
pub use readings::{LastReadings, ReadingsSnapshot};
pub use service::IrrigationService;

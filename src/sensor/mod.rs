// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic sensor producers.
//!
//! A [`SensorProducer`] samples a [`ReadingSource`] every configured
//! interval and publishes a tagged [`Reading`] to its observers. Two kinds
//! exist, [`SensorKind::Temperature`] and [`SensorKind::Humidity`].

mod config;
mod producer;
mod reading;
mod source;

pub use config::{DEFAULT_HUMIDITY_INTERVAL, DEFAULT_TEMPERATURE_INTERVAL, SensorConfig};
pub use producer::SensorProducer;
pub use reading::{HUMIDITY_PLAUSIBLE, Reading, SensorKind, TEMPERATURE_PLAUSIBLE};
pub use source::{ReadingSource, UniformSource};

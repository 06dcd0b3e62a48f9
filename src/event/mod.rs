// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for irrigation decisions.
//!
//! The irrigation controller publishes an [`IrrigationEvent`] on an
//! [`EventBus`] whenever it irrigates, fails to irrigate, or discards a
//! reading. The bus uses tokio's broadcast channel, so any number of
//! listeners can follow the controller without touching its loop.
//!
//! # Examples
//!
//! ```
//! use forestry_irrigation::event::{EventBus, IrrigationEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(IrrigationEvent::failed_with("pump offline"));
//! assert!(rx.try_recv().unwrap().is_failure());
//! ```

mod event_bus;
mod irrigation_event;

pub use event_bus::EventBus;
pub use irrigation_event::IrrigationEvent;

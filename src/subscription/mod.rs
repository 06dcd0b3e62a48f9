// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer-based subscription system.
//!
//! This module provides the generic fan-out used by the sensor producers:
//!
//! - [`Observer`] - Trait implemented by anything that wants published values
//! - [`Observable`] - Registry that stores observers and delivers values to them
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`DeliveryReport`] - How many observers handled or failed one publish
//!
//! # Usage
//!
//! ```
//! use forestry_irrigation::subscription::Observable;
//!
//! let observable = Observable::<f64>::new();
//!
//! let sub_id = observable.subscribe_fn(|value| {
//!     println!("received {value}");
//!     Ok(())
//! });
//!
//! let report = observable.publish(&18.5);
//! assert_eq!(report.delivered, 1);
//!
//! observable.unsubscribe_id(sub_id);
//! ```
//!
//! Delivery is synchronous and happens on the caller's task. Observers that
//! fail are isolated from each other; see [`Observable::publish`].

mod observable;
mod observer;

pub(crate) use observable::panic_message;
pub use observable::{DeliveryReport, Observable, SubscriptionId};
pub use observer::Observer;

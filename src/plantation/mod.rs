// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plantation model and the default irrigation action.
//!
//! [`PlantationService`] implements
//! [`IrrigationService`](crate::irrigation::IrrigationService) for a shared
//! [`Plantation`]: each irrigation reserves 3 L per crop, lets every crop
//! absorb water according to its [`Absorption`] strategy, grows trees, and
//! subtracts what was absorbed from the reserve.

mod absorption;
mod crop;
#[allow(clippy::module_inception)]
mod plantation;
mod service;

pub use absorption::Absorption;
pub use crop::{Crop, CropKind};
pub use plantation::{INITIAL_WATER, Plantation};
pub use service::{PlantationService, REQUIRED_WATER_PER_CROP};

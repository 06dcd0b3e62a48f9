// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The irrigation action invoked by the controller.

use crate::error::IrrigationError;

/// Performs the water-accounting mutation on a plantation.
///
/// The controller treats the plantation as opaque and only forwards it to
/// [`irrigate`](Self::irrigate). The call runs on the controller's task, so
/// a slow implementation delays the next evaluation.
///
/// # Examples
///
/// ```
/// use forestry_irrigation::error::IrrigationError;
/// use forestry_irrigation::irrigation::IrrigationService;
///
/// struct Sprinkler;
///
/// impl IrrigationService for Sprinkler {
///     type Plantation = String;
///
///     fn irrigate(&self, plantation: &String) -> Result<u32, IrrigationError> {
///         println!("watering {plantation}");
///         Ok(10)
///     }
/// }
///
/// assert_eq!(Sprinkler.irrigate(&"north".to_string()), Ok(10));
/// ```
pub trait IrrigationService: Send + Sync + 'static {
    /// The plantation handle this service operates on.
    type Plantation: Send + Sync + 'static;

    /// Irrigates the plantation and returns the liters consumed.
    ///
    /// # Errors
    ///
    /// Returns [`IrrigationError`] if the irrigation could not be performed,
    /// for instance when the plantation has run out of water.
    fn irrigate(&self, plantation: &Self::Plantation) -> Result<u32, IrrigationError>;
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The plantation: crops, area and water reserve.

use parking_lot::{Mutex, MutexGuard};

use super::Crop;

/// Water a new plantation starts with, in liters.
pub const INITIAL_WATER: u32 = 500;

/// A named plot holding crops and a water reserve.
///
/// The mutable part sits behind a lock so the plantation can be shared
/// between the irrigation controller and other callers.
///
/// # Examples
///
/// ```
/// use forestry_irrigation::plantation::Plantation;
///
/// let plantation = Plantation::new("north field", 120.0);
/// assert_eq!(plantation.water(), 500);
/// assert!((plantation.free_area() - 120.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug)]
pub struct Plantation {
    name: String,
    total_area: f64,
    state: Mutex<PlantationState>,
}

#[derive(Debug, Default)]
pub(crate) struct PlantationState {
    pub(crate) crops: Vec<Crop>,
    pub(crate) water: u32,
}

impl PlantationState {
    pub(crate) fn used_area(&self) -> f64 {
        self.crops.iter().map(Crop::area).sum()
    }
}

impl Plantation {
    /// Creates an empty plantation with [`INITIAL_WATER`] liters.
    #[must_use]
    pub fn new(name: impl Into<String>, total_area: f64) -> Self {
        Self {
            name: name.into(),
            total_area,
            state: Mutex::new(PlantationState {
                crops: Vec::new(),
                water: INITIAL_WATER,
            }),
        }
    }

    /// Sets the initial water reserve.
    #[must_use]
    pub fn with_water(mut self, liters: u32) -> Self {
        self.state.get_mut().water = liters;
        self
    }

    /// Plantation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total area in m².
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Area not yet covered by crops, in m².
    #[must_use]
    pub fn free_area(&self) -> f64 {
        self.total_area - self.state.lock().used_area()
    }

    /// Water left in the reserve, in liters.
    #[must_use]
    pub fn water(&self) -> u32 {
        self.state.lock().water
    }

    /// Refills or drains the reserve.
    pub fn set_water(&self, liters: u32) {
        self.state.lock().water = liters;
    }

    /// Number of planted crops.
    #[must_use]
    pub fn crop_count(&self) -> usize {
        self.state.lock().crops.len()
    }

    /// Copy of the planted crops.
    #[must_use]
    pub fn crops(&self) -> Vec<Crop> {
        self.state.lock().crops.clone()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, PlantationState> {
        self.state.lock()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planting and irrigating a plantation.

use chrono::{NaiveDate, Utc};

use super::{Crop, CropKind, Plantation};
use crate::error::IrrigationError;
use crate::irrigation::IrrigationService;

/// Water reserved per crop before an irrigation may start, in liters.
pub const REQUIRED_WATER_PER_CROP: u32 = 3;

/// Operations on a [`Plantation`].
///
/// # Examples
///
/// ```
/// use forestry_irrigation::plantation::{CropKind, Plantation, PlantationService};
///
/// let plantation = Plantation::new("north", 20.0);
/// let service = PlantationService::new();
///
/// service.plant(&plantation, CropKind::Lettuce, 4).unwrap();
/// let liters = service.irrigate_today(&plantation).unwrap();
/// assert_eq!(liters, 4);
/// assert_eq!(plantation.water(), 496);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantationService;

impl PlantationService {
    /// Creates the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Plants `count` crops of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`IrrigationError::InsufficientArea`] if the crops do not fit
    /// in the free area. Nothing is planted in that case.
    pub fn plant(
        &self,
        plantation: &Plantation,
        kind: CropKind,
        count: usize,
    ) -> Result<(), IrrigationError> {
        let mut state = plantation.lock();
        #[allow(clippy::cast_precision_loss)]
        let required = kind.area() * count as f64;
        let available = plantation.total_area() - state.used_area();
        if required > available {
            return Err(IrrigationError::InsufficientArea {
                required,
                available,
            });
        }

        state.crops.extend((0..count).map(|_| Crop::new(kind)));
        tracing::info!(
            plantation = plantation.name(),
            crop = %kind,
            count,
            area = required,
            "Planted crops"
        );
        Ok(())
    }

    /// Irrigates every crop as of `date` and returns the liters absorbed.
    ///
    /// Each crop needs [`REQUIRED_WATER_PER_CROP`] liters in reserve. Trees
    /// grow on every irrigation. The reserve never goes below zero.
    ///
    /// # Errors
    ///
    /// Returns [`IrrigationError::WaterExhausted`] if the reserve is below
    /// the required amount. Nothing changes in that case.
    pub fn irrigate_on(
        &self,
        plantation: &Plantation,
        date: NaiveDate,
    ) -> Result<u32, IrrigationError> {
        let mut state = plantation.lock();
        if state.crops.is_empty() {
            tracing::debug!(plantation = plantation.name(), "No crops to irrigate");
            return Ok(0);
        }

        let crop_count = u32::try_from(state.crops.len()).unwrap_or(u32::MAX);
        let required = crop_count.saturating_mul(REQUIRED_WATER_PER_CROP);
        if state.water < required {
            return Err(IrrigationError::WaterExhausted {
                available: state.water,
                required,
            });
        }

        let mut absorbed: u32 = 0;
        for crop in &mut state.crops {
            let liters = crop.kind.absorption().liters_on(date);
            crop.absorb(liters);
            absorbed = absorbed.saturating_add(liters);
        }
        state.water = state.water.saturating_sub(absorbed);

        tracing::info!(
            plantation = plantation.name(),
            absorbed,
            remaining = state.water,
            "Plantation irrigated"
        );
        Ok(absorbed)
    }

    /// Irrigates using today's UTC date.
    ///
    /// # Errors
    ///
    /// See [`irrigate_on`](Self::irrigate_on).
    pub fn irrigate_today(&self, plantation: &Plantation) -> Result<u32, IrrigationError> {
        self.irrigate_on(plantation, Utc::now().date_naive())
    }
}

impl IrrigationService for PlantationService {
    type Plantation = Plantation;

    fn irrigate(&self, plantation: &Plantation) -> Result<u32, IrrigationError> {
        self.irrigate_today(plantation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plantation::INITIAL_WATER;

    fn summer() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn winter() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 10).unwrap()
    }

    #[test]
    fn plant_within_area() {
        let plantation = Plantation::new("test", 10.0);
        let service = PlantationService::new();

        service.plant(&plantation, CropKind::Pine, 3).unwrap();
        assert_eq!(plantation.crop_count(), 3);
        assert!((plantation.free_area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn plant_beyond_area_fails_atomically() {
        let plantation = Plantation::new("test", 5.0);
        let service = PlantationService::new();

        let err = service.plant(&plantation, CropKind::Pine, 3).unwrap_err();
        assert!(matches!(err, IrrigationError::InsufficientArea { .. }));
        assert_eq!(plantation.crop_count(), 0);
    }

    #[test]
    fn irrigate_empty_plantation_is_free() {
        let plantation = Plantation::new("test", 10.0);
        let service = PlantationService::new();
        assert_eq!(service.irrigate_on(&plantation, summer()), Ok(0));
        assert_eq!(plantation.water(), INITIAL_WATER);
    }

    #[test]
    fn irrigate_uses_seasonal_and_constant_absorption() {
        let plantation = Plantation::new("test", 100.0);
        let service = PlantationService::new();
        service.plant(&plantation, CropKind::Pine, 2).unwrap();
        service.plant(&plantation, CropKind::Lettuce, 1).unwrap();
        service.plant(&plantation, CropKind::Carrot, 1).unwrap();

        // Summer: 5 + 5 + 1 + 2.
        assert_eq!(service.irrigate_on(&plantation, summer()), Ok(13));
        assert_eq!(plantation.water(), 487);

        // Winter: 2 + 2 + 1 + 2.
        assert_eq!(service.irrigate_on(&plantation, winter()), Ok(7));
        assert_eq!(plantation.water(), 480);
    }

    #[test]
    fn irrigate_grows_trees() {
        let plantation = Plantation::new("test", 100.0);
        let service = PlantationService::new();
        service.plant(&plantation, CropKind::Pine, 1).unwrap();

        service.irrigate_on(&plantation, winter()).unwrap();
        service.irrigate_on(&plantation, winter()).unwrap();

        let pine = &plantation.crops()[0];
        assert!((pine.height.unwrap() - 0.7).abs() < 1e-9);
        assert_eq!(pine.water, 6);
    }

    #[test]
    fn irrigate_without_enough_water_fails() {
        let plantation = Plantation::new("test", 100.0).with_water(8);
        let service = PlantationService::new();
        service.plant(&plantation, CropKind::Olive, 3).unwrap();

        let err = service.irrigate_on(&plantation, summer()).unwrap_err();
        assert_eq!(
            err,
            IrrigationError::WaterExhausted {
                available: 8,
                required: 9,
            }
        );
        assert_eq!(plantation.water(), 8);
        assert_eq!(plantation.crops()[0].water, 2);
    }

    #[test]
    fn reserve_is_floored_at_zero() {
        // 3 L reserved per crop, but pines absorb 5 L each in summer.
        let plantation = Plantation::new("test", 100.0).with_water(6);
        let service = PlantationService::new();
        service.plant(&plantation, CropKind::Pine, 2).unwrap();

        assert_eq!(service.irrigate_on(&plantation, summer()), Ok(10));
        assert_eq!(plantation.water(), 0);
    }

    #[test]
    fn implements_irrigation_service() {
        let plantation = Plantation::new("test", 10.0);
        let service = PlantationService::new();
        service.plant(&plantation, CropKind::Lettuce, 2).unwrap();
        assert_eq!(IrrigationService::irrigate(&service, &plantation), Ok(2));
    }
}

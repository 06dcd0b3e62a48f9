// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crop kinds and their per-kind constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Absorption;
use crate::error::Error;

/// The crops a plantation can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropKind {
    /// Pine tree.
    Pine,
    /// Olive tree.
    Olive,
    /// Lettuce.
    Lettuce,
    /// Carrot.
    Carrot,
}

impl CropKind {
    /// All crop kinds.
    pub const ALL: [Self; 4] = [Self::Pine, Self::Olive, Self::Lettuce, Self::Carrot];

    /// Ground area one crop occupies, in m².
    #[must_use]
    pub fn area(self) -> f64 {
        match self {
            Self::Pine => 2.0,
            Self::Olive => 1.5,
            Self::Lettuce => 0.5,
            Self::Carrot => 0.3,
        }
    }

    /// Water a freshly planted crop holds, in liters.
    #[must_use]
    pub fn initial_water(self) -> u32 {
        match self {
            Self::Pine | Self::Olive => 2,
            Self::Lettuce | Self::Carrot => 1,
        }
    }

    /// Height of a freshly planted tree in meters, `None` for vegetables.
    #[must_use]
    pub fn initial_height(self) -> Option<f64> {
        match self {
            Self::Pine => Some(0.5),
            Self::Olive => Some(1.0),
            Self::Lettuce | Self::Carrot => None,
        }
    }

    /// Height a tree gains per irrigation in meters, `None` for vegetables.
    #[must_use]
    pub fn growth_per_irrigation(self) -> Option<f64> {
        match self {
            Self::Pine => Some(0.10),
            Self::Olive => Some(0.01),
            Self::Lettuce | Self::Carrot => None,
        }
    }

    /// How this kind absorbs water.
    #[must_use]
    pub fn absorption(self) -> Absorption {
        match self {
            Self::Pine | Self::Olive => Absorption::SEASONAL,
            Self::Lettuce => Absorption::Constant(1),
            Self::Carrot => Absorption::Constant(2),
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pine => "pine",
            Self::Olive => "olive",
            Self::Lettuce => "lettuce",
            Self::Carrot => "carrot",
        }
    }
}

impl fmt::Display for CropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropKind {
    type Err = Error;

    /// Parses a crop name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownCrop(name.to_string()))
    }
}

/// One planted crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    /// What was planted.
    pub kind: CropKind,
    /// Liters absorbed so far, including the initial amount.
    pub water: u32,
    /// Current height for trees.
    pub height: Option<f64>,
}

impl Crop {
    /// Plants a new crop of the given kind with its initial water and height.
    #[must_use]
    pub fn new(kind: CropKind) -> Self {
        Self {
            kind,
            water: kind.initial_water(),
            height: kind.initial_height(),
        }
    }

    /// Ground area this crop occupies, in m².
    #[must_use]
    pub fn area(&self) -> f64 {
        self.kind.area()
    }

    /// Adds `liters` to the crop and grows it if it is a tree.
    pub(crate) fn absorb(&mut self, liters: u32) {
        self.water = self.water.saturating_add(liters);
        if let (Some(height), Some(growth)) = (self.height.as_mut(), self.kind.growth_per_irrigation())
        {
            *height += growth;
        }
    }
}

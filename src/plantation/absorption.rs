// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Water absorption strategies.

use chrono::{Datelike, NaiveDate};

/// How many liters a crop takes in one irrigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorption {
    /// Depends on the season: more in summer (December through February).
    Seasonal {
        /// Liters absorbed in summer.
        summer: u32,
        /// Liters absorbed the rest of the year.
        winter: u32,
    },
    /// Same amount all year.
    Constant(u32),
}

impl Absorption {
    /// Seasonal absorption used by trees.
    pub const SEASONAL: Self = Self::Seasonal {
        summer: 5,
        winter: 2,
    };

    /// Liters absorbed on `date`.
    #[must_use]
    pub fn liters_on(self, date: NaiveDate) -> u32 {
        match self {
            Self::Seasonal { summer, winter } => {
                if is_summer(date) {
                    summer
                } else {
                    winter
                }
            }
            Self::Constant(liters) => liters,
        }
    }
}

/// Southern-hemisphere summer: December, January, February.
fn is_summer(date: NaiveDate) -> bool {
    let month = date.month();
    month >= 12 || month <= 2
}

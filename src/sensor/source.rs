// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where sensor values come from.

use rand::Rng;

use crate::error::SensorError;

/// Produces raw sensor values, one per tick.
///
/// The default implementation is [`UniformSource`]. Custom sources can be
/// plugged into a producer with
/// [`SensorProducer::with_source`](super::SensorProducer::with_source).
pub trait ReadingSource: Send + Sync {
    /// Samples one value.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError`] if no value could be obtained. The producer
    /// logs it and skips the tick.
    fn sample(&self) -> Result<f64, SensorError>;
}

/// Synthetic source drawing uniformly from `[min, max]`, rounded to 0.1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformSource {
    min: f64,
    max: f64,
}

impl UniformSource {
    /// Creates a source for the inclusive range `[min, max]`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl ReadingSource for UniformSource {
    fn sample(&self) -> Result<f64, SensorError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SensorError::Sample(format!(
                "invalid range [{}, {}]",
                self.min, self.max
            )));
        }
        let raw = rand::rng().random_range(self.min..=self.max);
        Ok(((raw * 10.0).round() / 10.0).clamp(self.min, self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let source = UniformSource::new(-25.0, 50.0);
        for _ in 0..1000 {
            let value = source.sample().unwrap();
            assert!((-25.0..=50.0).contains(&value), "{value} out of range");
        }
    }

    #[test]
    fn samples_have_one_decimal() {
        let source = UniformSource::new(0.0, 100.0);
        for _ in 0..100 {
            let value = source.sample().unwrap();
            let scaled = value * 10.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn degenerate_range_returns_the_point() {
        let source = UniformSource::new(12.0, 12.0);
        assert!((source.sample().unwrap() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_range_is_an_error() {
        let source = UniformSource::new(10.0, 0.0);
        assert!(matches!(source.sample(), Err(SensorError::Sample(_))));
    }
}

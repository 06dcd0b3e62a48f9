// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer trait for receiving published values.

use crate::error::ObserverError;

/// A subscriber that receives values published by an [`Observable`].
///
/// Observers are invoked synchronously on the publishing unit's task, so
/// `notify` should return quickly. Returning an error (or panicking) only
/// affects this observer's delivery; the remaining subscribers still
/// receive the value.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use forestry_irrigation::error::ObserverError;
/// use forestry_irrigation::subscription::{Observable, Observer};
///
/// struct Counter(AtomicU32);
///
/// impl Observer<f64> for Counter {
///     fn notify(&self, _value: &f64) -> Result<(), ObserverError> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let observable = Observable::<f64>::new();
/// let counter = Arc::new(Counter(AtomicU32::new(0)));
/// observable.subscribe(counter.clone());
/// observable.publish(&21.5);
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
///
/// [`Observable`]: super::Observable
pub trait Observer<T>: Send + Sync {
    /// Receives one published value.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError`] if the value could not be handled. The
    /// publisher logs the error and moves on.
    fn notify(&self, value: &T) -> Result<(), ObserverError>;

    /// Short name used in log output.
    fn name(&self) -> &str {
        "observer"
    }
}

/// Adapter that turns a closure into an [`Observer`].
pub(crate) struct FnObserver<F> {
    callback: F,
}

impl<F> FnObserver<F> {
    pub(crate) fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(&T) -> Result<(), ObserverError> + Send + Sync,
{
    fn notify(&self, value: &T) -> Result<(), ObserverError> {
        (self.callback)(value)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

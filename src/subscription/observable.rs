// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriber registry and synchronous fan-out.
//!
//! This module provides the core types for managing subscriptions:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`Observable`] - Registry that stores observers and fans values out to them
//! - [`DeliveryReport`] - Outcome of a single `publish` call

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::observer::{FnObserver, Observer};
use crate::error::ObserverError;

/// Unique identifier for a subscription.
///
/// Returned when subscribing and usable to unsubscribe later. IDs are
/// unique within one observable's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Outcome of one [`Observable::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Observers that handled the value successfully.
    pub delivered: usize,
    /// Observers that returned an error or panicked.
    pub failed: usize,
}

impl DeliveryReport {
    /// Number of observers in the snapshot the value was delivered to.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

type SharedObserver<T> = Arc<dyn Observer<T>>;

struct Subscriber<T> {
    id: SubscriptionId,
    observer: SharedObserver<T>,
}

/// Registry of observers for values of type `T`.
///
/// Subscribing is idempotent: an observer is identified by its allocation,
/// so subscribing the same `Arc` twice yields one delivery per publish.
///
/// # Thread Safety
///
/// A single `parking_lot::Mutex` guards the subscriber list. `publish`
/// holds it only long enough to clone a snapshot of the list, then calls
/// the observers without the lock. Observers may therefore subscribe or
/// unsubscribe from inside `notify`; such changes take effect from the
/// next publish.
pub struct Observable<T> {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber<T>>>,
}

impl<T> Observable<T> {
    /// Creates an observable with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers an observer.
    ///
    /// If the same observer is already registered, nothing is added and the
    /// existing subscription ID is returned.
    pub fn subscribe(&self, observer: SharedObserver<T>) -> SubscriptionId {
        let mut subscribers = self.subscribers.lock();
        if let Some(existing) = subscribers
            .iter()
            .find(|s| same_observer(&s.observer, &observer))
        {
            return existing.id;
        }
        let id = self.next_id();
        subscribers.push(Subscriber { id, observer });
        id
    }

    /// Registers a closure as an observer.
    ///
    /// Every call registers a new subscriber, even for identical closures.
    pub fn subscribe_fn<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) -> Result<(), ObserverError> + Send + Sync + 'static,
        T: 'static,
    {
        self.subscribe(Arc::new(FnObserver::new(callback)))
    }

    /// Removes an observer.
    ///
    /// Returns `true` if it was registered.
    pub fn unsubscribe(&self, observer: &SharedObserver<T>) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| !same_observer(&s.observer, observer));
        subscribers.len() != before
    }

    /// Removes a subscription by its ID.
    ///
    /// Returns `true` if a subscription was found and removed.
    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Returns `true` if there are no registered observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriber_count() == 0
    }

    /// Delivers `value` to every observer registered when the call began.
    ///
    /// Observers are called synchronously, in registration order. A failing
    /// or panicking observer is logged and counted in the report; the
    /// remaining observers still receive the value.
    pub fn publish(&self, value: &T) -> DeliveryReport {
        let snapshot: Vec<SharedObserver<T>> = self
            .subscribers
            .lock()
            .iter()
            .map(|s| Arc::clone(&s.observer))
            .collect();

        let mut report = DeliveryReport::default();
        for observer in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| observer.notify(value))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(observer = observer.name(), error = %e, "Observer rejected value");
                    report.failed += 1;
                }
                Err(payload) => {
                    tracing::error!(
                        observer = observer.name(),
                        panic = %panic_message(payload.as_ref()),
                        "Observer panicked during delivery"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Compares observers by data pointer, ignoring vtables.
fn same_observer<T>(a: &SharedObserver<T>, b: &SharedObserver<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic sensor producer.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use super::{Reading, ReadingSource, SensorConfig, SensorKind, UniformSource};
use crate::error::{ConfigError, LifecycleError, ObserverError, SensorError};
use crate::lifecycle::{Lifecycle, StopSignal, UnitState};
use crate::subscription::{Observable, Observer, SubscriptionId, panic_message};

/// A schedulable unit that samples one sensor and fans the value out to
/// its observers.
///
/// Cloning a producer is cheap and yields a handle to the same unit.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use forestry_irrigation::sensor::{SensorConfig, SensorKind, SensorProducer};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let producer = SensorProducer::new(SensorKind::Humidity, SensorConfig::humidity())?;
/// producer.subscribe_fn(|reading| {
///     println!("{reading}");
///     Ok(())
/// });
///
/// producer.start()?;
/// tokio::time::sleep(Duration::from_secs(10)).await;
/// producer.stop();
/// producer.join(Some(Duration::from_secs(2))).await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SensorProducer {
    inner: Arc<ProducerInner>,
}

struct ProducerInner {
    kind: SensorKind,
    config: SensorConfig,
    source: Box<dyn ReadingSource>,
    observers: Observable<Reading>,
    lifecycle: Lifecycle,
}

impl SensorProducer {
    /// Creates a producer backed by a [`UniformSource`] over the configured
    /// range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the interval is zero or the range is
    /// inverted or not finite.
    pub fn new(kind: SensorKind, config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate(&kind.to_string())?;
        Ok(Self::uniform(kind, config))
    }

    /// Creates a temperature producer with default settings.
    #[must_use]
    pub fn temperature() -> Self {
        Self::uniform(SensorKind::Temperature, SensorConfig::temperature())
    }

    /// Creates a humidity producer with default settings.
    #[must_use]
    pub fn humidity() -> Self {
        Self::uniform(SensorKind::Humidity, SensorConfig::humidity())
    }

    fn uniform(kind: SensorKind, config: SensorConfig) -> Self {
        let source = UniformSource::new(config.min_value, config.max_value);
        Self::with_source(kind, config, source)
    }

    /// Creates a producer backed by a custom source.
    ///
    /// The configured range is ignored; only the interval is used.
    #[must_use]
    pub fn with_source<S>(kind: SensorKind, config: SensorConfig, source: S) -> Self
    where
        S: ReadingSource + 'static,
    {
        Self {
            inner: Arc::new(ProducerInner {
                kind,
                config,
                source: Box::new(source),
                observers: Observable::new(),
                lifecycle: Lifecycle::new(kind.unit_name()),
            }),
        }
    }

    /// The kind of readings this producer publishes.
    #[must_use]
    pub fn kind(&self) -> SensorKind {
        self.inner.kind
    }

    /// The producer's configuration.
    #[must_use]
    pub fn config(&self) -> &SensorConfig {
        &self.inner.config
    }

    /// Time between two readings.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.inner.config.interval
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> UnitState {
        self.inner.lifecycle.state()
    }

    /// The observer registry readings are published to.
    #[must_use]
    pub fn observable(&self) -> &Observable<Reading> {
        &self.inner.observers
    }

    /// Registers an observer. Registering the same observer twice is a no-op
    /// and returns the existing id.
    pub fn subscribe(&self, observer: Arc<dyn Observer<Reading>>) -> SubscriptionId {
        self.inner.observers.subscribe(observer)
    }

    /// Registers a closure as an observer.
    pub fn subscribe_fn<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Reading) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        self.inner.observers.subscribe_fn(callback)
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, observer: &Arc<dyn Observer<Reading>>) -> bool {
        self.inner.observers.unsubscribe(observer)
    }

    /// Removes an observer by the id returned when it subscribed.
    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe_id(id)
    }

    /// Number of registered observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.subscriber_count()
    }

    /// Performs one tick: samples the source and publishes the reading.
    ///
    /// Returns the published reading, or `None` if sampling failed. Failures
    /// are logged and never propagate.
    pub fn read_once(&self) -> Option<Reading> {
        self.inner.tick()
    }

    /// Starts the sampling loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] if the producer was already started or
    /// stopped, or if there is no runtime.
    pub fn start(&self) -> Result<(), LifecycleError> {
        let inner = Arc::clone(&self.inner);
        self.inner.lifecycle.spawn(move |stop| run(inner, stop))
    }

    /// Requests the sampling loop to stop. Idempotent.
    pub fn stop(&self) {
        self.inner.lifecycle.stop();
    }

    /// Waits for the sampling loop to exit; see [`Lifecycle::join`].
    pub async fn join(&self, timeout: Option<Duration>) -> bool {
        self.inner.lifecycle.join(timeout).await
    }
}

impl fmt::Debug for SensorProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorProducer")
            .field("kind", &self.inner.kind)
            .field("config", &self.inner.config)
            .field("state", &self.inner.lifecycle.state())
            .field("subscribers", &self.inner.observers.subscriber_count())
            .finish()
    }
}

impl ProducerInner {
    fn tick(&self) -> Option<Reading> {
        let value = match self.sample() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(sensor = %self.kind, error = %e, "Sensor reading skipped");
                return None;
            }
        };

        let reading = Reading::new(self.kind, value);
        let report = self.observers.publish(&reading);
        tracing::debug!(
            sensor = %self.kind,
            value = reading.value,
            delivered = report.delivered,
            failed = report.failed,
            "Published reading"
        );
        Some(reading)
    }

    fn sample(&self) -> Result<f64, SensorError> {
        let value = panic::catch_unwind(AssertUnwindSafe(|| self.source.sample()))
            .map_err(|payload| SensorError::Sample(panic_message(payload.as_ref())))??;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(SensorError::NonFinite(value))
        }
    }
}

async fn run(inner: Arc<ProducerInner>, mut stop: StopSignal) {
    tracing::info!(
        sensor = %inner.kind,
        interval_ms = u64::try_from(inner.config.interval.as_millis()).unwrap_or(u64::MAX),
        "Sensor started"
    );
    while !stop.is_stop_requested() {
        inner.tick();
        if stop.sleep(inner.config.interval).await {
            break;
        }
    }
    tracing::info!(sensor = %inner.kind, "Sensor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Fixed(f64);

    impl ReadingSource for Fixed {
        fn sample(&self) -> Result<f64, SensorError> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl ReadingSource for Broken {
        fn sample(&self) -> Result<f64, SensorError> {
            Err(SensorError::Sample("wire cut".to_string()))
        }
    }

    struct Panicking;

    impl ReadingSource for Panicking {
        fn sample(&self) -> Result<f64, SensorError> {
            panic!("adc fault");
        }
    }

    fn fixed(kind: SensorKind, value: f64) -> SensorProducer {
        SensorProducer::with_source(kind, SensorConfig::for_kind(kind), Fixed(value))
    }

    #[test]
    fn new_rejects_invalid_config() {
        let inverted = SensorConfig::temperature().with_range(50.0, -25.0);
        let err = SensorProducer::new(SensorKind::Temperature, inverted).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { ref sensor, .. } if sensor == "temperature"));

        let zero = SensorConfig::humidity().with_interval(Duration::ZERO);
        assert!(matches!(
            SensorProducer::new(SensorKind::Humidity, zero),
            Err(ConfigError::InvalidInterval { .. })
        ));

        let producer = SensorProducer::new(SensorKind::Humidity, SensorConfig::humidity()).unwrap();
        assert!(producer.read_once().is_some_and(|r| r.is_plausible()));
    }

    #[test]
    fn read_once_publishes_tagged_reading() {
        let producer = fixed(SensorKind::Humidity, 42.0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        producer.subscribe_fn(move |reading| {
            seen_clone.lock().push(*reading);
            Ok(())
        });

        let reading = producer.read_once().unwrap();
        assert_eq!(reading, Reading::humidity(42.0));
        assert_eq!(*seen.lock(), vec![Reading::humidity(42.0)]);
    }

    #[test]
    fn read_once_without_subscribers_still_samples() {
        let producer = fixed(SensorKind::Temperature, 10.0);
        assert_eq!(producer.read_once(), Some(Reading::temperature(10.0)));
    }

    #[test]
    fn default_source_respects_range() {
        let producer = SensorProducer::temperature();
        for _ in 0..100 {
            let reading = producer.read_once().unwrap();
            assert_eq!(reading.kind, SensorKind::Temperature);
            assert!((-25.0..=50.0).contains(&reading.value));
        }
    }

    #[test]
    fn failing_source_skips_tick() {
        let producer =
            SensorProducer::with_source(SensorKind::Humidity, SensorConfig::humidity(), Broken);
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        producer.subscribe_fn(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(producer.read_once().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn panicking_source_is_contained() {
        let producer = SensorProducer::with_source(
            SensorKind::Temperature,
            SensorConfig::temperature(),
            Panicking,
        );
        assert!(producer.read_once().is_none());
    }

    #[test]
    fn non_finite_value_is_not_published() {
        let producer = fixed(SensorKind::Temperature, f64::NAN);
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        producer.subscribe_fn(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(producer.read_once().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn clones_share_subscribers() {
        let producer = fixed(SensorKind::Humidity, 1.0);
        let clone = producer.clone();
        clone.subscribe_fn(|_| Ok(()));
        assert_eq!(producer.subscriber_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_publishes_on_interval_until_stopped() {
        let config = SensorConfig::temperature().with_interval(Duration::from_secs(2));
        let producer = SensorProducer::with_source(SensorKind::Temperature, config, Fixed(12.0));
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        producer.subscribe_fn(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        producer.start().unwrap();
        assert_eq!(producer.state(), UnitState::Running);

        // Ticks at t=0, 2, 4, 6.
        tokio::time::sleep(Duration::from_millis(7000)).await;
        producer.stop();
        assert!(producer.join(Some(Duration::from_secs(2))).await);

        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(producer.state(), UnitState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_failing_source() {
        let producer =
            SensorProducer::with_source(SensorKind::Humidity, SensorConfig::humidity(), Broken);
        producer.start().unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(producer.state(), UnitState::Running);

        producer.stop();
        assert!(producer.join(Some(Duration::from_secs(1))).await);
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let producer = fixed(SensorKind::Humidity, 1.0);
        producer.start().unwrap();
        assert!(matches!(
            producer.start(),
            Err(LifecycleError::AlreadyStarted { unit: "humidity-sensor", .. })
        ));
        producer.stop();
        assert!(producer.join(Some(Duration::from_secs(1))).await);
    }
}

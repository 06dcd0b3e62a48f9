// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The irrigation controller unit.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;

use super::{ControllerConfig, IrrigationService, LastReadings, ReadingsSnapshot};
use crate::error::{ConfigError, LifecycleError};
use crate::event::{EventBus, IrrigationEvent};
use crate::lifecycle::{Lifecycle, StopSignal, UnitState};
use crate::sensor::{Reading, SensorKind, SensorProducer};
use crate::subscription::{Observer, panic_message};

const UNIT_NAME: &str = "irrigation-controller";

/// Result of one evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The policy did not hold; nothing was done.
    Idle,
    /// The irrigation action ran and consumed `liters`.
    Irrigated {
        /// Liters reported by the irrigation action.
        liters: u32,
    },
    /// The policy held but the irrigation action failed or panicked.
    Failed,
}

/// Subscribes to both sensor producers and irrigates a plantation when the
/// policy holds.
///
/// Cloning a controller yields a handle to the same unit. Once the last
/// handle is dropped and the loop has exited, the controller unsubscribes
/// from both producers.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use forestry_irrigation::irrigation::IrrigationController;
/// use forestry_irrigation::plantation::{Plantation, PlantationService};
/// use forestry_irrigation::sensor::SensorProducer;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let temperature = SensorProducer::temperature();
/// let humidity = SensorProducer::humidity();
/// let plantation = Arc::new(Plantation::new("north", 1000.0));
///
/// let controller = IrrigationController::new(
///     &temperature,
///     &humidity,
///     plantation,
///     Arc::new(PlantationService::new()),
/// );
/// temperature.start()?;
/// humidity.start()?;
/// controller.start()?;
/// # Ok(())
/// # }
/// ```
pub struct IrrigationController<S: IrrigationService> {
    inner: Arc<ControllerInner<S>>,
}

struct ControllerInner<S: IrrigationService> {
    config: ControllerConfig,
    readings: Arc<LastReadings>,
    producers: [SensorProducer; 2],
    plantation: Arc<S::Plantation>,
    service: Arc<S>,
    events: EventBus,
    irrigations: AtomicU64,
    failures: AtomicU64,
    lifecycle: Lifecycle,
}

impl<S: IrrigationService> IrrigationController<S> {
    /// Creates a controller with the default configuration and subscribes
    /// it to both producers.
    #[must_use]
    pub fn new(
        temperature: &SensorProducer,
        humidity: &SensorProducer,
        plantation: Arc<S::Plantation>,
        service: Arc<S>,
    ) -> Self {
        Self::subscribed(
            temperature,
            humidity,
            plantation,
            service,
            ControllerConfig::default(),
        )
    }

    /// Creates a controller with a custom configuration and subscribes it to
    /// both producers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the interval is zero or the policy is
    /// malformed. Nothing is subscribed in that case.
    pub fn with_config(
        temperature: &SensorProducer,
        humidity: &SensorProducer,
        plantation: Arc<S::Plantation>,
        service: Arc<S>,
        config: ControllerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::subscribed(
            temperature,
            humidity,
            plantation,
            service,
            config,
        ))
    }

    fn subscribed(
        temperature: &SensorProducer,
        humidity: &SensorProducer,
        plantation: Arc<S::Plantation>,
        service: Arc<S>,
        config: ControllerConfig,
    ) -> Self {
        for (producer, expected) in [
            (temperature, SensorKind::Temperature),
            (humidity, SensorKind::Humidity),
        ] {
            if producer.kind() != expected {
                tracing::warn!(
                    expected = %expected,
                    actual = %producer.kind(),
                    "Producer kind does not match its controller slot"
                );
            }
        }

        let events = EventBus::new();
        let readings = Arc::new(LastReadings::new(events.clone()));
        let observer: Arc<dyn Observer<Reading>> = readings.clone();
        temperature.subscribe(Arc::clone(&observer));
        humidity.subscribe(observer);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                readings,
                producers: [temperature.clone(), humidity.clone()],
                plantation,
                service,
                events,
                irrigations: AtomicU64::new(0),
                failures: AtomicU64::new(0),
                lifecycle: Lifecycle::new(UNIT_NAME),
            }),
        }
    }

    /// The controller's configuration.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> UnitState {
        self.inner.lifecycle.state()
    }

    /// Handles a reading delivered by a producer.
    ///
    /// Producers call this through the subscription; it is public so that
    /// readings from other sources can be fed in directly.
    pub fn on_notified(&self, reading: &Reading) {
        self.inner.readings.record(reading);
    }

    /// The subscriber registered with both producers.
    ///
    /// Passing it to [`SensorProducer::unsubscribe`] detaches the controller
    /// early; dropping the last handle does the same.
    #[must_use]
    pub fn observer(&self) -> Arc<dyn Observer<Reading>> {
        self.inner.readings.clone()
    }

    /// Copies the cached readings.
    #[must_use]
    pub fn readings(&self) -> ReadingsSnapshot {
        self.inner.readings.snapshot()
    }

    /// Runs one evaluation tick on the caller's thread.
    pub fn evaluate(&self) -> TickOutcome {
        self.inner.evaluate()
    }

    /// Number of successful irrigations so far.
    #[must_use]
    pub fn irrigation_count(&self) -> u64 {
        self.inner.irrigations.load(Ordering::Relaxed)
    }

    /// Number of failed irrigation attempts so far.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.inner.failures.load(Ordering::Relaxed)
    }

    /// Subscribes to the controller's [`IrrigationEvent`]s.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<IrrigationEvent> {
        self.inner.events.subscribe()
    }

    /// Starts the evaluation loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] if the controller was already started or
    /// stopped, or if there is no runtime.
    pub fn start(&self) -> Result<(), LifecycleError> {
        let inner = Arc::clone(&self.inner);
        self.inner.lifecycle.spawn(move |stop| run(inner, stop))
    }

    /// Requests the evaluation loop to stop. Idempotent.
    pub fn stop(&self) {
        self.inner.lifecycle.stop();
    }

    /// Waits for the evaluation loop to exit; see [`Lifecycle::join`].
    pub async fn join(&self, timeout: Option<Duration>) -> bool {
        self.inner.lifecycle.join(timeout).await
    }
}

impl<S: IrrigationService> Clone for IrrigationController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: IrrigationService> fmt::Debug for IrrigationController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrrigationController")
            .field("config", &self.inner.config)
            .field("state", &self.inner.lifecycle.state())
            .field("readings", &self.inner.readings.snapshot())
            .field("irrigations", &self.irrigation_count())
            .field("failures", &self.failure_count())
            .finish_non_exhaustive()
    }
}

impl<S: IrrigationService> ControllerInner<S> {
    fn evaluate(&self) -> TickOutcome {
        let snapshot = self.readings.snapshot();
        let (Some(temperature), Some(humidity)) = (snapshot.temperature, snapshot.humidity)
        else {
            tracing::debug!(
                temperature = ?snapshot.temperature,
                humidity = ?snapshot.humidity,
                "Waiting for both readings"
            );
            return TickOutcome::Idle;
        };

        if !self
            .config
            .policy
            .should_irrigate(Some(temperature), Some(humidity))
        {
            tracing::debug!(temperature, humidity, "Irrigation not needed");
            return TickOutcome::Idle;
        }

        let result =
            panic::catch_unwind(AssertUnwindSafe(|| self.service.irrigate(&self.plantation)));
        match result {
            Ok(Ok(liters)) => {
                self.irrigations.fetch_add(1, Ordering::Relaxed);
                tracing::info!(temperature, humidity, liters, "Irrigation triggered");
                self.events
                    .publish(IrrigationEvent::irrigated(liters, temperature, humidity));
                TickOutcome::Irrigated { liters }
            }
            Ok(Err(e)) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(temperature, humidity, error = %e, "Irrigation failed");
                self.events.publish(IrrigationEvent::failed(&e));
                TickOutcome::Failed
            }
            Err(payload) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                let message = panic_message(payload.as_ref());
                tracing::error!(panic = %message, "Irrigation action panicked");
                self.events.publish(IrrigationEvent::failed_with(format!(
                    "irrigation action panicked: {message}"
                )));
                TickOutcome::Failed
            }
        }
    }
}

impl<S: IrrigationService> Drop for ControllerInner<S> {
    fn drop(&mut self) {
        let observer: Arc<dyn Observer<Reading>> = self.readings.clone();
        for producer in &self.producers {
            producer.unsubscribe(&observer);
        }
    }
}

async fn run<S: IrrigationService>(inner: Arc<ControllerInner<S>>, mut stop: StopSignal) {
    tracing::info!(
        interval_ms = u64::try_from(inner.config.interval.as_millis()).unwrap_or(u64::MAX),
        "Irrigation controller started"
    );
    while !stop.is_stop_requested() {
        inner.evaluate();
        if stop.sleep(inner.config.interval).await {
            break;
        }
    }
    tracing::info!("Irrigation controller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IrrigationError, SensorError};
    use crate::sensor::{ReadingSource, SensorConfig};
    use std::sync::atomic::AtomicU32;

    #[derive(Default)]
    struct CountingService {
        calls: AtomicU32,
    }

    impl IrrigationService for CountingService {
        type Plantation = ();

        fn irrigate(&self, _plantation: &()) -> Result<u32, IrrigationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(6)
        }
    }

    struct DryService;

    impl IrrigationService for DryService {
        type Plantation = ();

        fn irrigate(&self, _plantation: &()) -> Result<u32, IrrigationError> {
            Err(IrrigationError::WaterExhausted {
                available: 2,
                required: 6,
            })
        }
    }

    struct PanickingService;

    impl IrrigationService for PanickingService {
        type Plantation = ();

        fn irrigate(&self, _plantation: &()) -> Result<u32, IrrigationError> {
            panic!("valve stuck");
        }
    }

    struct Fixed(f64);

    impl ReadingSource for Fixed {
        fn sample(&self) -> Result<f64, SensorError> {
            Ok(self.0)
        }
    }

    fn producers() -> (SensorProducer, SensorProducer) {
        (SensorProducer::temperature(), SensorProducer::humidity())
    }

    fn controller<S: IrrigationService<Plantation = ()>>(service: S) -> IrrigationController<S> {
        let (temperature, humidity) = producers();
        IrrigationController::new(&temperature, &humidity, Arc::new(()), Arc::new(service))
    }

    #[test]
    fn constructor_subscribes_to_both_producers() {
        let (temperature, humidity) = producers();
        let controller = IrrigationController::new(
            &temperature,
            &humidity,
            Arc::new(()),
            Arc::new(CountingService::default()),
        );
        assert_eq!(temperature.subscriber_count(), 1);
        assert_eq!(humidity.subscriber_count(), 1);

        assert!(temperature.unsubscribe(&controller.observer()));
        assert_eq!(temperature.subscriber_count(), 0);
    }

    #[test]
    fn dropping_controller_unsubscribes() {
        let (temperature, humidity) = producers();
        let controller = IrrigationController::new(
            &temperature,
            &humidity,
            Arc::new(()),
            Arc::new(CountingService::default()),
        );
        let handle = controller.clone();

        drop(controller);
        assert_eq!(temperature.subscriber_count(), 1);

        drop(handle);
        assert_eq!(temperature.subscriber_count(), 0);
        assert_eq!(humidity.subscriber_count(), 0);
    }

    #[test]
    fn with_config_rejects_invalid_config() {
        let (temperature, humidity) = producers();
        let err = IrrigationController::with_config(
            &temperature,
            &humidity,
            Arc::new(()),
            Arc::new(CountingService::default()),
            ControllerConfig::default().with_interval(Duration::ZERO),
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidInterval { .. }));
        assert_eq!(temperature.subscriber_count(), 0);
        assert_eq!(humidity.subscriber_count(), 0);
    }

    #[test]
    fn notifications_reach_cached_fields() {
        let temperature = SensorProducer::with_source(
            SensorKind::Temperature,
            SensorConfig::temperature(),
            Fixed(11.0),
        );
        let humidity =
            SensorProducer::with_source(SensorKind::Humidity, SensorConfig::humidity(), Fixed(33.0));
        let controller = IrrigationController::new(
            &temperature,
            &humidity,
            Arc::new(()),
            Arc::new(CountingService::default()),
        );

        temperature.read_once();
        humidity.read_once();

        let snapshot = controller.readings();
        assert_eq!(snapshot.temperature, Some(11.0));
        assert_eq!(snapshot.humidity, Some(33.0));
    }

    #[test]
    fn idle_until_both_readings_known() {
        let controller = controller(CountingService::default());
        assert_eq!(controller.evaluate(), TickOutcome::Idle);

        controller.on_notified(&Reading::temperature(10.0));
        assert_eq!(controller.evaluate(), TickOutcome::Idle);

        controller.on_notified(&Reading::humidity(40.0));
        assert_eq!(controller.evaluate(), TickOutcome::Irrigated { liters: 6 });
        assert_eq!(controller.irrigation_count(), 1);
    }

    #[test]
    fn policy_gates_the_service() {
        let service = Arc::new(CountingService::default());
        let (temperature, humidity) = producers();
        let controller =
            IrrigationController::new(&temperature, &humidity, Arc::new(()), Arc::clone(&service));

        controller.on_notified(&Reading::temperature(10.0));
        controller.on_notified(&Reading::humidity(60.0));
        assert_eq!(controller.evaluate(), TickOutcome::Idle);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        controller.on_notified(&Reading::humidity(40.0));
        controller.evaluate();
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn implausible_reading_is_discarded() {
        let controller = controller(CountingService::default());
        let mut events = controller.subscribe_events();

        controller.on_notified(&Reading::temperature(200.0));
        controller.on_notified(&Reading::humidity(200.0));

        assert_eq!(controller.readings(), ReadingsSnapshot::default());
        assert!(events.try_recv().unwrap().is_discarded());
    }

    #[test]
    fn service_error_is_contained() {
        let controller = controller(DryService);
        let mut events = controller.subscribe_events();
        controller.on_notified(&Reading::temperature(10.0));
        controller.on_notified(&Reading::humidity(10.0));

        assert_eq!(controller.evaluate(), TickOutcome::Failed);
        assert_eq!(controller.evaluate(), TickOutcome::Failed);
        assert_eq!(controller.failure_count(), 2);
        assert_eq!(controller.irrigation_count(), 0);
        assert!(events.try_recv().unwrap().is_failure());
    }

    #[test]
    fn service_panic_is_contained() {
        let controller = controller(PanickingService);
        controller.on_notified(&Reading::temperature(10.0));
        controller.on_notified(&Reading::humidity(10.0));

        assert_eq!(controller.evaluate(), TickOutcome::Failed);
        assert_eq!(controller.failure_count(), 1);
    }

    #[test]
    fn successful_irrigation_emits_event() {
        let controller = controller(CountingService::default());
        let mut events = controller.subscribe_events();
        controller.on_notified(&Reading::temperature(9.5));
        controller.on_notified(&Reading::humidity(20.0));
        controller.evaluate();

        match events.try_recv().unwrap() {
            IrrigationEvent::Irrigated {
                liters,
                temperature,
                humidity,
                ..
            } => {
                assert_eq!(liters, 6);
                assert!((temperature - 9.5).abs() < f64::EPSILON);
                assert!((humidity - 20.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_running_after_failures() {
        let controller = controller(DryService);
        controller.on_notified(&Reading::temperature(10.0));
        controller.on_notified(&Reading::humidity(10.0));

        controller.start().unwrap();
        // Evaluations at t=0, 2.5, 5.0, 7.5.
        tokio::time::sleep(Duration::from_millis(8000)).await;
        assert_eq!(controller.state(), UnitState::Running);

        controller.stop();
        assert!(controller.join(Some(Duration::from_secs(2))).await);
        assert_eq!(controller.failure_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_prompt() {
        let (temperature, humidity) = producers();
        let controller = IrrigationController::with_config(
            &temperature,
            &humidity,
            Arc::new(()),
            Arc::new(CountingService::default()),
            ControllerConfig::default().with_interval(Duration::from_secs(3600)),
        )
        .unwrap();
        controller.start().unwrap();
        tokio::task::yield_now().await;

        let started = tokio::time::Instant::now();
        controller.stop();
        assert!(controller.join(Some(Duration::from_millis(10))).await);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}

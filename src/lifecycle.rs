// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Start/stop/join plumbing shared by every schedulable unit.
//!
//! Each unit (a sensor producer or the irrigation controller) owns one
//! [`Lifecycle`]. The unit's state lives in a `tokio::sync::watch` channel so
//! that a loop sleeping between ticks is woken the moment `stop()` is
//! called, and so that `join()` can wait for the loop to acknowledge.
//!
//! ```text
//! Created ──start()──▶ Running ──stop()──▶ StopRequested ──loop exits──▶ Stopped
//!    │                                                                      ▲
//!    └───────────────────────────stop()─────────────────────────────────────┘
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::LifecycleError;

/// Lifecycle state of a schedulable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Constructed but never started.
    Created,
    /// Loop is running.
    Running,
    /// `stop()` was called; the loop has not exited yet.
    StopRequested,
    /// Loop has exited, or the unit was stopped before it started.
    Stopped,
}

impl UnitState {
    /// Returns `true` once a stop has been requested or completed.
    #[must_use]
    pub fn is_stopping(self) -> bool {
        matches!(self, Self::StopRequested | Self::Stopped)
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::StopRequested => "stop-requested",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Cancellation handle passed to a unit's loop.
///
/// The loop checks [`is_stop_requested`](Self::is_stop_requested) at the top
/// of every iteration and waits between ticks with [`sleep`](Self::sleep).
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<UnitState>,
}

impl StopSignal {
    /// Returns `true` if the unit has been asked to stop.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.rx.borrow().is_stopping()
    }

    /// Waits for `period` or until a stop is requested, whichever is first.
    ///
    /// Returns `true` if the unit should stop.
    pub async fn sleep(&mut self, period: Duration) -> bool {
        if self.is_stop_requested() {
            return true;
        }
        let woken = tokio::select! {
            () = tokio::time::sleep(period) => false,
            () = wait_until(&mut self.rx, UnitState::is_stopping) => true,
        };
        woken || self.is_stop_requested()
    }
}

/// Resolves once the watched state satisfies `done`, or the sender is gone.
async fn wait_until(rx: &mut watch::Receiver<UnitState>, done: fn(UnitState) -> bool) {
    loop {
        if done(*rx.borrow_and_update()) {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Publishes `Stopped` when the unit's task ends, including on unwind.
struct StoppedGuard {
    unit: &'static str,
    state: Arc<watch::Sender<UnitState>>,
}

impl Drop for StoppedGuard {
    fn drop(&mut self) {
        self.state.send_replace(UnitState::Stopped);
        tracing::debug!(unit = self.unit, "Unit stopped");
    }
}

/// Owns the state machine and background task of one schedulable unit.
#[derive(Debug)]
pub struct Lifecycle {
    unit: &'static str,
    state: Arc<watch::Sender<UnitState>>,
}

impl Lifecycle {
    /// Creates a lifecycle in the `Created` state.
    #[must_use]
    pub fn new(unit: &'static str) -> Self {
        let (tx, _) = watch::channel(UnitState::Created);
        Self {
            unit,
            state: Arc::new(tx),
        }
    }

    /// Name of the unit, used in logs and errors.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// Current state of the unit.
    #[must_use]
    pub fn state(&self) -> UnitState {
        *self.state.borrow()
    }

    /// Transitions `Created → Running` and spawns `body` as a detached task.
    ///
    /// The task is not joined by anything; dropping the runtime reclaims it.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NoRuntime`] outside a tokio runtime, and
    /// [`LifecycleError::AlreadyStarted`] if the unit is not in `Created`.
    pub fn spawn<F, Fut>(&self, body: F) -> Result<(), LifecycleError>
    where
        F: FnOnce(StopSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| LifecycleError::NoRuntime { unit: self.unit })?;

        let mut previous = UnitState::Created;
        let started = self.state.send_if_modified(|state| {
            previous = *state;
            if *state == UnitState::Created {
                *state = UnitState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(LifecycleError::AlreadyStarted {
                unit: self.unit,
                state: previous,
            });
        }

        let signal = StopSignal {
            rx: self.state.subscribe(),
        };
        let guard = StoppedGuard {
            unit: self.unit,
            state: Arc::clone(&self.state),
        };
        let fut = body(signal);
        runtime.spawn(async move {
            let _guard = guard;
            fut.await;
        });
        tracing::debug!(unit = self.unit, "Unit spawned");
        Ok(())
    }

    /// Requests the unit to stop.
    ///
    /// A running unit moves to `StopRequested` and its loop is woken. A unit
    /// that was never started moves straight to `Stopped`. Calling this more
    /// than once has no further effect.
    pub fn stop(&self) {
        let unit = self.unit;
        self.state.send_if_modified(|state| match *state {
            UnitState::Running => {
                *state = UnitState::StopRequested;
                tracing::debug!(unit, "Stop requested");
                true
            }
            UnitState::Created => {
                *state = UnitState::Stopped;
                true
            }
            UnitState::StopRequested | UnitState::Stopped => false,
        });
    }

    /// Waits for the unit's loop to exit.
    ///
    /// With `Some(timeout)`, gives up after the budget and returns `false`;
    /// the unit keeps running detached. A unit that was never started
    /// returns `true` immediately.
    pub async fn join(&self, timeout: Option<Duration>) -> bool {
        let mut rx = self.state.subscribe();
        if *rx.borrow() == UnitState::Created {
            return true;
        }

        let stopped = async move {
            wait_until(&mut rx, |state| state == UnitState::Stopped).await;
        };
        match timeout {
            Some(budget) => {
                let finished = tokio::time::timeout(budget, stopped).await.is_ok();
                if !finished {
                    tracing::warn!(
                        unit = self.unit,
                        timeout_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                        "Unit did not stop within join timeout"
                    );
                }
                finished
            }
            None => {
                stopped.await;
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn new_lifecycle_is_created() {
        let lifecycle = Lifecycle::new("test-unit");
        assert_eq!(lifecycle.state(), UnitState::Created);
        assert_eq!(lifecycle.unit(), "test-unit");
    }

    #[test]
    fn unit_state_display() {
        assert_eq!(UnitState::StopRequested.to_string(), "stop-requested");
        assert!(UnitState::Stopped.is_stopping());
        assert!(!UnitState::Running.is_stopping());
    }

    #[test]
    fn spawn_outside_runtime_fails() {
        let lifecycle = Lifecycle::new("test-unit");
        let err = lifecycle.spawn(|_| async {}).unwrap_err();
        assert_eq!(err, LifecycleError::NoRuntime { unit: "test-unit" });
        assert_eq!(lifecycle.state(), UnitState::Created);
    }

    #[test]
    fn stop_before_start_goes_to_stopped() {
        let lifecycle = Lifecycle::new("test-unit");
        lifecycle.stop();
        assert_eq!(lifecycle.state(), UnitState::Stopped);
    }

    #[tokio::test]
    async fn join_unstarted_returns_immediately() {
        let lifecycle = Lifecycle::new("test-unit");
        assert!(lifecycle.join(None).await);
    }

    #[tokio::test]
    async fn cannot_start_twice() {
        let lifecycle = Lifecycle::new("test-unit");
        lifecycle.spawn(|_| async {}).unwrap();

        let err = lifecycle.spawn(|_| async {}).unwrap_err();
        assert!(matches!(err, LifecycleError::AlreadyStarted { .. }));
    }

    #[tokio::test]
    async fn cannot_restart_after_stop() {
        let lifecycle = Lifecycle::new("test-unit");
        lifecycle.stop();

        let err = lifecycle.spawn(|_| async {}).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::AlreadyStarted {
                unit: "test-unit",
                state: UnitState::Stopped,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_long_sleep() {
        let lifecycle = Lifecycle::new("test-unit");
        let ticks = Arc::new(AtomicU32::new(0));
        let ticks_clone = Arc::clone(&ticks);

        lifecycle
            .spawn(move |mut stop| async move {
                while !stop.is_stop_requested() {
                    ticks_clone.fetch_add(1, Ordering::SeqCst);
                    if stop.sleep(Duration::from_secs(3600)).await {
                        break;
                    }
                }
            })
            .unwrap();

        tokio::task::yield_now().await;
        assert_eq!(lifecycle.state(), UnitState::Running);

        let started = tokio::time::Instant::now();
        lifecycle.stop();
        assert!(lifecycle.join(Some(Duration::from_millis(50))).await);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(lifecycle.state(), UnitState::Stopped);
        assert!(ticks.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn join_times_out_without_stop() {
        let lifecycle = Lifecycle::new("test-unit");
        lifecycle
            .spawn(|mut stop| async move {
                while !stop.sleep(Duration::from_secs(1)).await {}
            })
            .unwrap();

        assert!(!lifecycle.join(Some(Duration::from_millis(100))).await);
        assert_eq!(lifecycle.state(), UnitState::Running);

        lifecycle.stop();
        assert!(lifecycle.join(None).await);
    }

    #[tokio::test]
    async fn panicking_body_still_reports_stopped() {
        let lifecycle = Lifecycle::new("test-unit");
        lifecycle
            .spawn(|_| async {
                panic!("loop blew up");
            })
            .unwrap();

        assert!(lifecycle.join(Some(Duration::from_secs(5))).await);
        assert_eq!(lifecycle.state(), UnitState::Stopped);
    }
}

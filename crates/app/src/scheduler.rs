//! Zone scheduler — owns every recurring poll task and auto-stop timer.
//!
//! Per zone there is at most one live [`ScheduledPoll`] (a spawned task
//! driven by [`tokio::time::interval`]) and at most one live auto-stop
//! timer (a spawned [`tokio::time::sleep`]). A single mutex around the
//! timer table serializes every scheduler operation; all bookkeeping is
//! synchronous under that lock, so no operation can observe another's
//! partial effects.
//!
//! Invariants:
//! - a zone has a poll entry iff its status is `Running`
//! - a zone never has two live poll tasks
//! - an auto-stop entry always belongs to a `Running` zone and is removed
//!   both on manual stop and when it fires
//! - `Disabled` zones never receive timers

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use thermobridge_domain::error::{BridgeError, InvalidParameterError, ZoneNotFoundError};
use thermobridge_domain::time::{Timestamp, now};
use thermobridge_domain::zone::{SensorStatus, ZoneId, ZoneStatus};

use crate::ports::{DeviceSession, SensorSession};
use crate::registry::ZoneRegistry;
use crate::services::telemetry_bridge::TelemetryBridge;

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Poll loop and auto-stop timer installed.
    Started,
    /// The zone was already running; nothing changed.
    AlreadyRunning {
        /// The period the live poll loop fires with.
        period_secs: u32,
    },
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Poll loop and auto-stop timer cancelled.
    Stopped,
    /// The zone was not running; nothing changed.
    AlreadyStopped,
}

/// Result of a reconfigure request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconfigureOutcome {
    /// The poll loop was replaced with the new period.
    Applied,
    /// The zone is not running; nothing changed.
    NotRunning,
}

struct ScheduledPoll {
    handle: JoinHandle<()>,
    period_secs: u32,
}

struct AutoStop {
    handle: JoinHandle<()>,
    started_at: Timestamp,
    minutes: u32,
    generation: u64,
}

#[derive(Default)]
struct TimerTable {
    polls: HashMap<ZoneId, ScheduledPoll>,
    auto_stops: HashMap<ZoneId, AutoStop>,
    next_generation: u64,
}

/// Per-zone lifecycle and polling state machine.
pub struct ZoneScheduler<DS, SS> {
    registry: Arc<ZoneRegistry<DS, SS>>,
    bridge: Arc<TelemetryBridge<DS, SS>>,
    timers: Mutex<TimerTable>,
}

impl<DS, SS> ZoneScheduler<DS, SS>
where
    DS: DeviceSession + Send + Sync + 'static,
    SS: SensorSession + Send + Sync + 'static,
{
    /// Create a scheduler over the given registry and telemetry bridge.
    #[must_use]
    pub fn new(registry: Arc<ZoneRegistry<DS, SS>>, bridge: Arc<TelemetryBridge<DS, SS>>) -> Self {
        Self {
            registry,
            bridge,
            timers: Mutex::new(TimerTable::default()),
        }
    }

    fn lock_timers(&self) -> MutexGuard<'_, TimerTable> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start polling a zone for `minutes` minutes.
    ///
    /// Installs a recurring poll with the zone's current period and an
    /// auto-stop timer that forces a stop when the duration elapses.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] when `minutes` is zero and
    /// [`BridgeError::ZoneNotFound`] when the zone is unknown or disabled.
    #[tracing::instrument(skip(self))]
    pub fn start(
        self: &Arc<Self>,
        id: &ZoneId,
        minutes: u32,
    ) -> Result<StartOutcome, BridgeError> {
        if minutes == 0 {
            return Err(InvalidParameterError::new("minutes", "must be a positive number").into());
        }

        let mut timers = self.lock_timers();
        // validated under the timer lock; `disable` serializes through it
        let zone = self.registry.schedulable(id)?;
        if timers.polls.contains_key(id) {
            return Ok(StartOutcome::AlreadyRunning {
                period_secs: zone.poll_period_secs,
            });
        }

        let poll = self.spawn_poll(id.clone(), zone.poll_period_secs);
        timers.polls.insert(id.clone(), poll);
        self.registry.set_status(id, ZoneStatus::Running);

        let generation = timers.next_generation;
        timers.next_generation += 1;
        let auto_stop = self.spawn_auto_stop(id.clone(), minutes, generation);
        timers.auto_stops.insert(id.clone(), auto_stop);

        tracing::info!(
            zone = %id,
            period_secs = zone.poll_period_secs,
            minutes,
            "polling started"
        );
        Ok(StartOutcome::Started)
    }

    /// Stop polling a zone, cancelling its poll loop and auto-stop timer.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ZoneNotFound`] when the zone is unknown.
    #[tracing::instrument(skip(self))]
    pub fn stop(&self, id: &ZoneId) -> Result<StopOutcome, BridgeError> {
        if self.registry.get(id).is_none() {
            return Err(ZoneNotFoundError {
                zone: id.to_string(),
            }
            .into());
        }

        let mut timers = self.lock_timers();
        let Some(poll) = timers.polls.remove(id) else {
            return Ok(StopOutcome::AlreadyStopped);
        };
        poll.handle.abort();
        if let Some(auto_stop) = timers.auto_stops.remove(id) {
            auto_stop.handle.abort();
        }
        self.registry.set_status(id, ZoneStatus::Stopped);

        tracing::info!(zone = %id, "polling stopped");
        Ok(StopOutcome::Stopped)
    }

    /// Permanently exclude a zone from scheduling, cancelling any live
    /// timers it holds.
    ///
    /// Runs entirely under the timer lock so it cannot interleave with a
    /// concurrent `start` or `reconfigure`: either the timers are installed
    /// first and cancelled here, or the zone is disabled first and the
    /// start fails its validation.
    pub fn disable(&self, id: &ZoneId) {
        let mut timers = self.lock_timers();
        if let Some(poll) = timers.polls.remove(id) {
            poll.handle.abort();
            tracing::warn!(zone = %id, "stopped running zone before disabling");
        }
        if let Some(auto_stop) = timers.auto_stops.remove(id) {
            auto_stop.handle.abort();
        }
        self.registry.mark_disabled(id);
    }

    /// Replace a running zone's poll loop with one firing every
    /// `period_secs`. The auto-stop timer keeps its original deadline.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidParameter`] when `period_secs` is zero
    /// and [`BridgeError::ZoneNotFound`] when the zone is unknown or
    /// disabled.
    #[tracing::instrument(skip(self))]
    pub fn reconfigure(
        self: &Arc<Self>,
        id: &ZoneId,
        period_secs: u32,
    ) -> Result<ReconfigureOutcome, BridgeError> {
        if period_secs == 0 {
            return Err(
                InvalidParameterError::new("interval", "must be a positive number").into(),
            );
        }

        let mut timers = self.lock_timers();
        // validated under the timer lock; `disable` serializes through it
        self.registry.schedulable(id)?;
        let Some(poll) = timers.polls.get_mut(id) else {
            return Ok(ReconfigureOutcome::NotRunning);
        };

        let old = std::mem::replace(poll, self.spawn_poll(id.clone(), period_secs));
        old.handle.abort();
        self.registry.set_poll_period(id, period_secs);

        tracing::info!(zone = %id, period_secs, "poll interval reconfigured");
        Ok(ReconfigureOutcome::Applied)
    }

    /// Cancel every live timer. Called on process shutdown.
    pub fn shutdown(&self) {
        let mut timers = self.lock_timers();
        for (zone, poll) in timers.polls.drain() {
            poll.handle.abort();
            self.registry.set_status(&zone, ZoneStatus::Stopped);
        }
        for (_, auto_stop) in timers.auto_stops.drain() {
            auto_stop.handle.abort();
        }
        tracing::info!("scheduler shut down");
    }

    /// Read-only projection of every enabled zone, safe to call at any
    /// time. Taking the timer lock serializes it against in-flight
    /// operations, so it never observes a partial update.
    #[must_use]
    pub fn status_snapshot(&self) -> Vec<ZoneReport> {
        let timers = self.lock_timers();
        self.registry
            .enabled_zones()
            .into_iter()
            .map(|zone| {
                let polling = LoopReport {
                    status: zone.status,
                    interval: timers.polls.get(&zone.id).map(|p| p.period_secs),
                };
                let timer = timers.auto_stops.get(&zone.id).map(|t| TimerReport {
                    started_at: t.started_at,
                    period: t.minutes,
                });
                let sensor = self.registry.sensor_health(&zone.id).map(|h| SensorReport {
                    status: h.status,
                    message: h.message,
                });
                ZoneReport {
                    demozone: zone.id.to_string(),
                    polling,
                    timer,
                    sensor,
                }
            })
            .collect()
    }

    /// Invoked by an auto-stop task when its deadline elapses.
    ///
    /// A timer that was cancelled or superseded after this firing was
    /// already queued identifies itself by generation and is ignored.
    fn auto_stop_fire(&self, id: &ZoneId, generation: u64) {
        let mut timers = self.lock_timers();
        match timers.auto_stops.get(id) {
            Some(auto_stop) if auto_stop.generation == generation => {}
            _ => {
                tracing::debug!(zone = %id, generation, "ignoring stale auto-stop firing");
                return;
            }
        }
        timers.auto_stops.remove(id);
        if let Some(poll) = timers.polls.remove(id) {
            poll.handle.abort();
        }
        self.registry.set_status(id, ZoneStatus::Stopped);
        tracing::info!(zone = %id, "auto-stop timer ended, polling stopped");
    }

    fn spawn_poll(&self, zone: ZoneId, period_secs: u32) -> ScheduledPoll {
        let bridge = Arc::clone(&self.bridge);
        let period = Duration::from_secs(u64::from(period_secs));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick of `interval` completes immediately; consume
            // it so the first poll fires one full period after start
            ticker.tick().await;
            loop {
                ticker.tick().await;
                bridge.poll_once(&zone).await;
            }
        });
        ScheduledPoll {
            handle,
            period_secs,
        }
    }

    fn spawn_auto_stop(self: &Arc<Self>, zone: ZoneId, minutes: u32, generation: u64) -> AutoStop {
        let scheduler = Arc::clone(self);
        let deadline = Duration::from_secs(u64::from(minutes) * 60);
        let started_at = now();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            scheduler.auto_stop_fire(&zone, generation);
        });
        AutoStop {
            handle,
            started_at,
            minutes,
            generation,
        }
    }
}

/// Per-zone entry of the STATUS projection.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneReport {
    pub demozone: String,
    #[serde(rename = "loop")]
    pub polling: LoopReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor: Option<SensorReport>,
}

/// Poll-loop half of the projection.
#[derive(Debug, Clone, Serialize)]
pub struct LoopReport {
    pub status: ZoneStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

/// Auto-stop half of the projection.
#[derive(Debug, Clone, Serialize)]
pub struct TimerReport {
    #[serde(rename = "startedAt")]
    pub started_at: Timestamp,
    /// Configured duration in minutes.
    pub period: u32,
}

/// Sensor-session health in the projection.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReport {
    pub status: SensorStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

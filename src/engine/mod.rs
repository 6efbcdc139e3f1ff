// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Retry-driven device state synchronization.
//!
//! A [`SyncEngine`] owns the hub's view of one device. It reads state through
//! a [`DeviceAdapter`], applies partial changes optimistically, retries
//! failed writes as a whole sequence and tracks availability.
//!
//! # Rules
//!
//! - A failed read never alters the stored snapshot; it only marks the
//!   device unavailable.
//! - Availability flips are published and logged once per edge: a warning
//!   when the device goes away, info when it comes back.
//! - A write stores the desired snapshot before any command is sent. If
//!   every attempt fails the device is marked unavailable and the
//!   [`WriteFailurePolicy`] decides what the snapshot shows.
//! - Refreshes are skipped, not queued, while a write is pending or any
//!   other I/O holds the device. Writes queue in arrival order.
//!
//! # Examples
//!
//! ```no_run
//! use hubsync::adapter::{HttpAdapter, HttpConfig};
//! use hubsync::engine::{ApplyOutcome, SyncConfig, SyncEngine};
//! use hubsync::state::LightChange;
//! use hubsync::types::Brightness;
//!
//! # async fn example() -> hubsync::Result<()> {
//! let adapter = HttpAdapter::new(HttpConfig::new("192.168.1.100"))?;
//! let engine = SyncEngine::new(adapter, SyncConfig::default());
//!
//! engine.refresh().await;
//! let outcome = engine
//!     .apply(LightChange::turn_on().brightness(Brightness::new(128)))
//!     .await;
//! assert!(matches!(outcome, ApplyOutcome::Applied { .. }));
//! # Ok(())
//! # }
//! ```

mod config;
mod sync_state;

pub use config::{SyncConfig, WriteFailurePolicy};
pub use sync_state::SyncState;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::adapter::DeviceAdapter;
use crate::capabilities::DeviceCapabilities;
use crate::command::{DeviceCommand, plan_commands};
use crate::error::AdapterError;
use crate::event::{DeviceId, EventBus, SyncEvent};
use crate::scheduler::{DataClass, PollOutcome, Throttle};
use crate::state::{DeviceSnapshot, LightChange};
use crate::types::{Brightness, PowerState};

use sync_state::PendingWrite;

/// Result of [`SyncEngine::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fresh snapshot was stored.
    Updated,
    /// Another operation held the device; nothing was read.
    Skipped,
    /// The read failed; the previous snapshot is kept.
    Failed,
}

/// Result of [`SyncEngine::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Every planned command was accepted. The list may be empty when the
    /// change matched the current state.
    Applied {
        /// Commands sent, in order.
        commands: Vec<DeviceCommand>,
    },
    /// Every attempt failed.
    Failed {
        /// Attempts made.
        attempts: u32,
    },
    /// The device could not be initialized; nothing was sent.
    NotReady,
}

impl ApplyOutcome {
    /// Returns `true` for [`ApplyOutcome::Applied`].
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Synchronization engine for a single device.
pub struct SyncEngine<A> {
    id: DeviceId,
    adapter: Arc<A>,
    config: SyncConfig,
    state: Mutex<SyncState>,
    io_lock: tokio::sync::Mutex<()>,
    throttle: Throttle,
    events: EventBus,
    snapshot_tx: watch::Sender<Option<DeviceSnapshot>>,
}

impl<A: DeviceAdapter> SyncEngine<A> {
    /// Creates an engine with its own event bus.
    #[must_use]
    pub fn new(adapter: A, config: SyncConfig) -> Self {
        Self::with_parts(DeviceId::new(), Arc::new(adapter), config, EventBus::new())
    }

    /// Creates an engine publishing on a shared bus under a given id.
    #[must_use]
    pub fn with_parts(id: DeviceId, adapter: Arc<A>, config: SyncConfig, events: EventBus) -> Self {
        let throttle = config.poll_intervals.throttle(DataClass::Fast);
        let state = SyncState::new(config.capabilities.clone());
        let (snapshot_tx, _) = watch::channel(None);

        Self {
            id,
            adapter,
            config,
            state: Mutex::new(state),
            io_lock: tokio::sync::Mutex::new(()),
            throttle,
            events,
            snapshot_tx,
        }
    }

    /// Identifier used in events.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// The adapter this engine drives.
    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Subscribes to this engine's event bus.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Copy of the whole synchronization state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state.lock().clone()
    }

    /// Last-known snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<DeviceSnapshot> {
        self.state.lock().snapshot.clone()
    }

    /// Device capabilities, once fetched.
    #[must_use]
    pub fn capabilities(&self) -> Option<DeviceCapabilities> {
        self.state.lock().capabilities.clone()
    }

    /// Whether the last interaction with the device succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.lock().available
    }

    /// When the snapshot was last replaced.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_updated
    }

    /// Whether a write has started and not finished.
    #[must_use]
    pub fn is_write_in_progress(&self) -> bool {
        self.state.lock().pending_writes > 0
    }

    /// Receiver that observes every snapshot replacement.
    #[must_use]
    pub fn watch_snapshot(&self) -> watch::Receiver<Option<DeviceSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Reads the device and stores the result.
    ///
    /// Fetches capabilities first if they are not known yet.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self.is_write_in_progress() {
            tracing::debug!(host = %self.adapter.host(), "Write in progress, skipping refresh");
            return RefreshOutcome::Skipped;
        }

        let Ok(_io) = self.io_lock.try_lock() else {
            tracing::debug!(host = %self.adapter.host(), "Device busy, skipping refresh");
            return RefreshOutcome::Skipped;
        };

        match self.read_device().await {
            Ok(snapshot) => {
                self.store_snapshot(snapshot);
                self.mark_available();
                RefreshOutcome::Updated
            }
            Err(e) => {
                self.mark_unavailable(&e);
                RefreshOutcome::Failed
            }
        }
    }

    /// Throttled [`refresh`](Self::refresh), at most once per fast interval.
    ///
    /// A skipped refresh makes no device call and gives its slot back.
    pub async fn poll(&self) -> PollOutcome<RefreshOutcome> {
        if !self.throttle.try_acquire() {
            return PollOutcome::Throttled;
        }
        let outcome = self.refresh().await;
        if outcome == RefreshOutcome::Skipped {
            self.throttle.reset();
        }
        PollOutcome::Ran(outcome)
    }

    /// Merges a change over the current snapshot and pushes it to the device.
    ///
    /// Adapter errors never escape: they are retried, then reported through
    /// availability, the returned outcome and a
    /// [`SyncEvent::WriteFailed`] event.
    pub async fn apply(&self, change: LightChange) -> ApplyOutcome {
        let _pending = PendingWrite::enter(&self.state);
        let _io = self.io_lock.lock().await;

        let initialized = self.state.lock().initialized();
        let (current, caps) = match initialized {
            Some(pair) => pair,
            None => match self.initialize().await {
                Ok(pair) => pair,
                Err(e) => {
                    self.mark_unavailable(&e);
                    return ApplyOutcome::NotReady;
                }
            },
        };

        let desired = current.merged(&change, &caps);
        let commands = plan_commands(&current, &desired);

        if commands.is_empty() {
            tracing::debug!(host = %self.adapter.host(), "Change matches current state");
            if desired != current {
                self.store_snapshot(desired);
            }
            return ApplyOutcome::Applied { commands };
        }

        self.store_snapshot(desired);

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_all(&commands).await {
                Ok(()) => {
                    self.mark_available();
                    return ApplyOutcome::Applied { commands };
                }
                Err(e) => {
                    tracing::debug!(
                        host = %self.adapter.host(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "Write attempt failed"
                    );
                    if attempt >= max_attempts {
                        self.write_failed(current, attempt, &e);
                        return ApplyOutcome::Failed { attempts: attempt };
                    }
                }
            }
        }
    }

    /// Turns the device on, merging any attributes in `change`.
    ///
    /// A dimmable device with no known brightness is brought to full.
    pub async fn turn_on(&self, change: LightChange) -> ApplyOutcome {
        let mut change = change.power(PowerState::On);
        if change.brightness.is_none() {
            let state = self.state.lock();
            let dimming = state.capabilities.as_ref().is_some_and(|c| c.dimming);
            let known = state.snapshot.as_ref().and_then(DeviceSnapshot::brightness);
            if dimming && known.is_none() {
                change.brightness = Some(Brightness::FULL);
            }
        }
        self.apply(change).await
    }

    /// Turns the device off.
    pub async fn turn_off(&self) -> ApplyOutcome {
        self.apply(LightChange::turn_off()).await
    }

    async fn read_device(&self) -> Result<DeviceSnapshot, AdapterError> {
        let known = self.state.lock().capabilities.clone();
        let caps = match known {
            Some(caps) => caps,
            None => {
                let caps = self.adapter.fetch_capabilities().await?;
                tracing::debug!(
                    host = %self.adapter.host(),
                    name = %caps.identity.name,
                    model = %caps.identity.model,
                    "Fetched device capabilities"
                );
                self.state.lock().capabilities = Some(caps.clone());
                caps
            }
        };

        let reading = self.adapter.fetch_state(&caps).await?;
        Ok(reading.into_snapshot(&caps))
    }

    async fn initialize(&self) -> Result<(DeviceSnapshot, DeviceCapabilities), AdapterError> {
        let snapshot = self.read_device().await?;
        self.store_snapshot(snapshot.clone());
        self.mark_available();

        let caps = self
            .state
            .lock()
            .capabilities
            .clone()
            .ok_or_else(|| AdapterError::protocol("capabilities missing after read"))?;
        Ok((snapshot, caps))
    }

    async fn send_all(&self, commands: &[DeviceCommand]) -> Result<(), AdapterError> {
        for &command in commands {
            tracing::debug!(host = %self.adapter.host(), command = %command, "Sending command");
            self.adapter.execute(command).await?;
        }
        Ok(())
    }

    fn write_failed(&self, previous: DeviceSnapshot, attempts: u32, error: &AdapterError) {
        self.mark_unavailable(error);
        tracing::warn!(
            host = %self.adapter.host(),
            attempts,
            error = %error,
            "Failed to update device state"
        );

        if self.config.write_failure_policy == WriteFailurePolicy::Rollback {
            self.store_snapshot(previous);
        }

        self.events.publish(SyncEvent::WriteFailed {
            device_id: self.id,
            attempts,
            error: error.to_string(),
        });
    }

    fn store_snapshot(&self, snapshot: DeviceSnapshot) {
        {
            let mut state = self.state.lock();
            state.snapshot = Some(snapshot.clone());
            state.last_updated = Some(Utc::now());
        }
        self.snapshot_tx.send_replace(Some(snapshot.clone()));
        self.events.publish(SyncEvent::SnapshotUpdated {
            device_id: self.id,
            snapshot,
        });
    }

    fn mark_available(&self) {
        let was_available = std::mem::replace(&mut self.state.lock().available, true);
        if !was_available {
            tracing::info!(host = %self.adapter.host(), "Device is available again");
            self.events.publish(SyncEvent::AvailabilityChanged {
                device_id: self.id,
                available: true,
            });
        }
    }

    fn mark_unavailable(&self, error: &AdapterError) {
        let was_available = std::mem::replace(&mut self.state.lock().available, false);
        if was_available {
            tracing::warn!(host = %self.adapter.host(), error = %error, "Device is unavailable");
            self.events.publish(SyncEvent::AvailabilityChanged {
                device_id: self.id,
                available: false,
            });
        } else {
            tracing::debug!(
                host = %self.adapter.host(),
                error = %error,
                "Device still unavailable"
            );
        }
    }
}

impl<A> std::fmt::Debug for SyncEngine<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("id", &self.id)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

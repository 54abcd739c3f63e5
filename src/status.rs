// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Transaction Status Notifier
//!
//! Process-wide single-slot status used by the workflows to report progress.
//!
//! - Exactly one status is observable at a time; later reports supersede
//!   earlier ones (no queue).
//! - `Success` auto-clears after 2 s, `Error` after 3 s. `Pending` stays
//!   until superseded, or until the [`PendingStatus`] guard holding it is
//!   dropped, which swaps it for a transient error.
//! - A report cancels the auto-clear timer of the previous one.
//!
//! Observers either poll [`TxStatusNotifier::current`] or hold a
//! [`watch::Receiver`] from [`TxStatusNotifier::subscribe`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

/// Auto-clear delay after a success report.
pub const SUCCESS_CLEAR_DELAY: Duration = Duration::from_secs(2);

/// Auto-clear delay after an error report.
pub const ERROR_CLEAR_DELAY: Duration = Duration::from_secs(3);

/// Error shown when a pending operation is dropped before it reports an outcome.
pub const ABANDONED_MESSAGE: &str = "Operation cancelled before completion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxPhase {
    Pending,
    Success,
    Error,
}

/// The single active status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TxStatus {
    pub visible: bool,
    pub phase: TxPhase,
    pub message: String,
}

impl TxStatus {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            phase: TxPhase::Pending,
            message: String::new(),
        }
    }
}

impl Default for TxStatus {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Pending auto-clear, identified by the generation of the report that
/// scheduled it.
#[derive(Default)]
struct ClearTimer {
    generation: u64,
    cancel: Option<CancellationToken>,
}

struct Inner {
    sender: watch::Sender<TxStatus>,
    timer: Mutex<ClearTimer>,
    success_delay: Duration,
    error_delay: Duration,
}

impl Inner {
    fn timer(&self) -> MutexGuard<'_, ClearTimer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_if_current(&self, generation: u64) {
        let mut timer = self.timer();
        if timer.generation == generation {
            timer.cancel = None;
            self.sender.send_replace(TxStatus::hidden());
        }
    }
}

/// Single-slot status publisher. Cloning shares the slot.
#[derive(Clone)]
pub struct TxStatusNotifier {
    inner: Arc<Inner>,
}

impl TxStatusNotifier {
    pub fn new() -> Self {
        Self::with_delays(SUCCESS_CLEAR_DELAY, ERROR_CLEAR_DELAY)
    }

    pub fn with_delays(success_delay: Duration, error_delay: Duration) -> Self {
        let (sender, _) = watch::channel(TxStatus::hidden());
        Self {
            inner: Arc::new(Inner {
                sender,
                timer: Mutex::new(ClearTimer::default()),
                success_delay,
                error_delay,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TxStatus> {
        self.inner.sender.subscribe()
    }

    pub fn current(&self) -> TxStatus {
        self.inner.sender.borrow().clone()
    }

    /// Publish a status, superseding whatever is displayed.
    pub fn report(&self, phase: TxPhase, message: impl Into<String>) {
        let mut timer = self.inner.timer();
        self.publish(&mut timer, phase, message.into());
    }

    /// Publish a pending status held by the returned guard.
    ///
    /// If the guard is dropped while its status is still the current one,
    /// the slot is released with a transient error instead of staying
    /// pending forever.
    pub fn pending(&self, message: impl Into<String>) -> PendingStatus {
        let mut timer = self.inner.timer();
        let generation = self.publish(&mut timer, TxPhase::Pending, message.into());
        PendingStatus {
            notifier: self.clone(),
            generation,
        }
    }

    fn publish(&self, timer: &mut ClearTimer, phase: TxPhase, message: String) -> u64 {
        timer.generation += 1;
        if let Some(previous) = timer.cancel.take() {
            previous.cancel();
        }
        let generation = timer.generation;

        tracing::debug!(?phase, message = %message, "Transaction status");
        self.inner.sender.send_replace(TxStatus {
            visible: true,
            phase,
            message,
        });

        let Some(delay) = self.clear_delay(phase) else {
            return generation;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, status will not auto-clear");
            return generation;
        };

        let token = CancellationToken::new();
        timer.cancel = Some(token.clone());
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => inner.clear_if_current(generation),
                _ = token.cancelled() => {}
            }
        });
        generation
    }

    fn release_pending(&self, generation: u64) {
        let mut timer = self.inner.timer();
        if timer.generation == generation {
            tracing::warn!("Pending operation abandoned before completion");
            self.publish(&mut timer, TxPhase::Error, ABANDONED_MESSAGE.to_string());
        }
    }

    /// Hide the status immediately.
    pub fn clear(&self) {
        let mut timer = self.inner.timer();
        timer.generation += 1;
        if let Some(previous) = timer.cancel.take() {
            previous.cancel();
        }
        self.inner.sender.send_replace(TxStatus::hidden());
    }

    fn clear_delay(&self, phase: TxPhase) -> Option<Duration> {
        match phase {
            TxPhase::Pending => None,
            TxPhase::Success => Some(self.inner.success_delay),
            TxPhase::Error => Some(self.inner.error_delay),
        }
    }
}

/// Holds a pending status. See [`TxStatusNotifier::pending`].
#[must_use = "dropping the guard releases the pending status"]
pub struct PendingStatus {
    notifier: TxStatusNotifier,
    generation: u64,
}

impl PendingStatus {
    /// Replace the pending message, keeping the guard armed.
    pub fn update(&mut self, message: impl Into<String>) {
        let mut timer = self.notifier.inner.timer();
        self.generation = self
            .notifier
            .publish(&mut timer, TxPhase::Pending, message.into());
    }
}

impl Drop for PendingStatus {
    fn drop(&mut self) {
        self.notifier.release_pending(self.generation);
    }
}

impl Default for TxStatusNotifier {
    fn default() -> Self {
        Self::new()
    }
}

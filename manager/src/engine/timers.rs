//! Per-event timers and the bookkeeping that lets them be cancelled.
//!
//! Every armed timer is a tokio task racing its sleep against a oneshot
//! receiver. Dropping the matching [`ArmedTimer`] drops the sender, which wins
//! the race unless the sleep already completed. Cancellation is therefore best
//! effort: a callback that already started runs to completion, and the engine
//! guards against that by re-checking the ledger under its lock.

use crate::errors::MaintenanceError;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tracing::debug;

pub type TimerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    /// Pre-maintenance notice the given number of minutes before start
    Notice { minutes: u32 },
    /// Optional notice 30 seconds before start
    FinalNotice,
    /// Transition into maintenance
    Start,
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKey::Notice { minutes } => write!(f, "notice-{}m", minutes),
            TimerKey::FinalNotice => write!(f, "notice-30s"),
            TimerKey::Start => write!(f, "start"),
        }
    }
}

/// Handle to a sleeping timer task. Dropping it cancels the timer.
#[derive(Debug)]
pub struct ArmedTimer {
    id: TimerId,
    _cancel: oneshot::Sender<()>,
}

impl ArmedTimer {
    pub fn id(&self) -> TimerId {
        self.id
    }
}

#[derive(Debug)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn enter(in_flight: &Arc<InFlight>) -> Self {
        in_flight.count.fetch_add(1, Ordering::SeqCst);
        Self(in_flight.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Spawns timer tasks and tracks how many callbacks are running.
#[derive(Debug)]
pub struct TimerPool {
    next_id: AtomicU64,
    closed: AtomicBool,
    in_flight: Arc<InFlight>,
}

impl TimerPool {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            in_flight: Arc::new(InFlight {
                count: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Run `on_fire` after `delay` unless the returned handle is dropped first.
    pub fn schedule<F, Fut>(
        &self,
        delay: Duration,
        on_fire: F,
    ) -> Result<ArmedTimer, MaintenanceError>
    where
        F: FnOnce(TimerId) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            return Err(MaintenanceError::ShuttingDown);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let in_flight = self.in_flight.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let _running = InFlightGuard::enter(&in_flight);
                    on_fire(id).await
                }
                _ = cancel_rx => debug!("Timer {} cancelled before firing", id),
            }
        });

        Ok(ArmedTimer {
            id,
            _cancel: cancel_tx,
        })
    }

    /// Refuse further submissions. Already spawned timers are unaffected.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of callbacks that fired and have not returned yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// Wait until no callback is running. Sleeping timers are not waited for.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.in_flight.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }
}

impl Default for TimerPool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct LedgerEntry {
    announced: bool,
    timers: HashMap<TimerKey, ArmedTimer>,
}

/// Per-event announcement marker and armed timers.
#[derive(Debug, Default)]
pub struct NotificationLedger {
    entries: HashMap<String, LedgerEntry>,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_announced(&self, event_id: &str) -> bool {
        self.entries
            .get(event_id)
            .map(|entry| entry.announced)
            .unwrap_or(false)
    }

    pub fn mark_announced(&mut self, event_id: &str) {
        self.entries.entry(event_id.to_string()).or_default().announced = true;
    }

    /// Store a timer, cancelling whatever was armed under the same key.
    pub fn insert_timer(&mut self, event_id: &str, key: TimerKey, timer: ArmedTimer) {
        self.entries
            .entry(event_id.to_string())
            .or_default()
            .timers
            .insert(key, timer);
    }

    /// Claim a fired timer. Returns false when the handle was cancelled or
    /// replaced since the task was spawned.
    pub fn take_timer(&mut self, event_id: &str, key: TimerKey, timer_id: TimerId) -> bool {
        let Some(entry) = self.entries.get_mut(event_id) else {
            return false;
        };

        match entry.timers.get(&key) {
            Some(timer) if timer.id() == timer_id => {
                entry.timers.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Cancel every timer of one event, keeping its announcement marker.
    pub fn disarm(&mut self, event_id: &str) -> usize {
        self.entries
            .get_mut(event_id)
            .map(|entry| entry.timers.drain().count())
            .unwrap_or(0)
    }

    /// Forget an event entirely, cancelling its timers.
    pub fn remove(&mut self, event_id: &str) -> bool {
        self.entries.remove(event_id).is_some()
    }

    pub fn disarm_all(&mut self) -> usize {
        self.entries
            .values_mut()
            .map(|entry| entry.timers.drain().count())
            .sum()
    }

    pub fn announced_map(&self) -> HashMap<String, bool> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.announced)
            .map(|(id, _)| (id.clone(), true))
            .collect()
    }

    pub fn armed_keys(&self, event_id: &str) -> Vec<TimerKey> {
        let mut keys: Vec<TimerKey> = self
            .entries
            .get(event_id)
            .map(|entry| entry.timers.keys().copied().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

//! Call duration tracking
//!
//! The start instant is taken the first time a call becomes active and kept
//! across hold. While the call state is `Active` or `OnHold` a timer task
//! publishes the elapsed whole seconds once per tick; it exits on its own as
//! soon as the state leaves that pair or the clock is reset.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::call::CallState;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct CallClock {
    started: Arc<Mutex<Option<Instant>>>,
    seconds: Arc<watch::Sender<u64>>,
    timer: Mutex<Option<(Instant, JoinHandle<()>)>>,
    tick: Duration,
}

impl CallClock {
    pub(crate) fn new(tick: Duration) -> Self {
        let (seconds, _) = watch::channel(0);
        Self {
            started: Arc::new(Mutex::new(None)),
            seconds: Arc::new(seconds),
            timer: Mutex::new(None),
            tick,
        }
    }

    /// Record the start instant unless the call already has one
    pub(crate) fn mark_started(&self) -> Instant {
        *lock(&self.started).get_or_insert_with(Instant::now)
    }

    pub(crate) fn started_at(&self) -> Option<Instant> {
        *lock(&self.started)
    }

    /// Forget the start instant and publish zero
    pub(crate) fn reset(&self) {
        let mut started = lock(&self.started);
        *started = None;
        self.seconds.send_replace(0);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.seconds.subscribe()
    }

    pub(crate) fn seconds(&self) -> u64 {
        *self.seconds.borrow()
    }

    /// Make sure a timer runs for the current start instant
    pub(crate) fn ensure_running(&self, state: watch::Receiver<CallState>, runtime: Option<&Handle>) {
        let Some(started) = self.started_at() else {
            return;
        };

        let mut timer = lock(&self.timer);
        if let Some((timer_start, handle)) = timer.as_ref() {
            if *timer_start == started && !handle.is_finished() {
                return;
            }
        }

        let Some(runtime) = runtime.cloned().or_else(|| Handle::try_current().ok()) else {
            warn!("no tokio runtime available, call duration will not be tracked");
            return;
        };

        let task = run_timer(
            state,
            Arc::clone(&self.started),
            Arc::clone(&self.seconds),
            started,
            self.tick,
        );
        *timer = Some((started, runtime.spawn(task)));
        debug!(tick_ms = self.tick.as_millis() as u64, "call duration timer started");
    }
}

async fn run_timer(
    mut state: watch::Receiver<CallState>,
    clock: Arc<Mutex<Option<Instant>>>,
    seconds: Arc<watch::Sender<u64>>,
    started: Instant,
    tick: Duration,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        {
            // Published under the clock lock so a concurrent reset always wins
            let current = lock(&clock);
            if *current != Some(started) || !state.borrow_and_update().is_in_call() {
                break;
            }
            seconds.send_replace(started.elapsed().as_secs());
        }

        tokio::select! {
            _ = interval.tick() => {}
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    debug!("call duration timer stopped");
}

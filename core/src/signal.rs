//! Run flag shared between the orchestrator and its suspension points

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

/// The single process-wide "running" flag of a benchmark
///
/// Every run gets its own channel, held in a slot until the run's
/// [`RunGuard`] is dropped. A stopped run keeps the slot while it winds down.
///
/// Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct RunFlag {
    active: Arc<Mutex<Option<watch::Sender<bool>>>>,
}

impl RunFlag {
    /// Create a flag with no active run
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<watch::Sender<bool>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a run
    ///
    /// Returns `None` while a previous run is still active, stopped or not.
    pub fn try_begin(&self) -> Option<RunGuard> {
        let mut slot = self.slot();
        if slot.is_some() {
            return None;
        }
        let (tx, rx) = watch::channel(true);
        *slot = Some(tx);
        Some(RunGuard {
            flag: self.clone(),
            signal: StopSignal { rx },
        })
    }

    /// Clear the flag of the active run
    ///
    /// Returns `false` if nothing runs or the run was already stopped.
    pub fn stop(&self) -> bool {
        match self.slot().as_ref() {
            Some(tx) => tx.send_if_modified(|running| std::mem::replace(running, false)),
            None => false,
        }
    }

    /// Whether a run is active and has not been asked to stop
    pub fn is_running(&self) -> bool {
        self.slot().as_ref().is_some_and(|tx| *tx.borrow())
    }

    /// Whether a run holds the flag, including one that is winding down
    pub fn is_active(&self) -> bool {
        self.slot().is_some()
    }
}

/// Ownership of the flag for one run; releases it on drop
#[derive(Debug)]
pub struct RunGuard {
    flag: RunFlag,
    signal: StopSignal,
}

impl RunGuard {
    /// Receiver side for this run's suspension points
    pub fn signal(&self) -> StopSignal {
        self.signal.clone()
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.flag.slot().take() {
            tx.send_replace(false);
        }
    }
}

/// Observer of one run's flag
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Whether the run flag has been cleared
    pub fn is_stopped(&self) -> bool {
        !*self.rx.borrow()
    }

    /// Resolve once the run flag is cleared (or its owner is gone)
    pub async fn stopped(&mut self) {
        let _ = self.rx.wait_for(|running| !*running).await;
    }

    /// Sleep for `duration` unless stopped first
    ///
    /// Returns `true` if the flag was cleared before or during the sleep.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        tokio::select! {
            biased;

            _ = self.stopped() => true,
            _ = tokio::time::sleep(duration) => self.is_stopped(),
        }
    }
}

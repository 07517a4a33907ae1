//! Debounced auto-save of patient assignments.
//!
//! [`Debouncer`] runs a job once a quiet period has passed since the last call to
//! [`Debouncer::schedule`]. Scheduling again before the period elapses cancels the pending
//! job and arms a new timer (trailing-edge debounce). Only the timer is cancellable: once
//! the job has started it runs to completion on its own task.
//!
//! Must be used from within a Tokio runtime.

use crate::repositories::shift_records::{RoomPatients, ShiftRecordService};
use chrono::NaiveDate;
use staffing_types::ShiftLabel;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancel-and-reschedule delayed task.
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `job` after the quiet period unless another job is scheduled first.
    pub fn schedule<F, Fut>(&self, job: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let quiet_period = self.quiet_period;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            tokio::spawn(job());
        }));
    }

    /// Drop the pending job, if its timer has not fired yet.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending().take() {
            previous.abort();
        }
    }

    /// True while a timer is armed and has not fired.
    pub fn is_pending(&self) -> bool {
        self.pending().as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Debounced writer of a shift's patient map.
///
/// Failures are logged and swallowed.
pub struct PatientAutoSaver {
    shifts: ShiftRecordService,
    debouncer: Debouncer,
}

impl PatientAutoSaver {
    pub fn new(shifts: ShiftRecordService, quiet_period: Duration) -> Self {
        Self {
            shifts,
            debouncer: Debouncer::new(quiet_period),
        }
    }

    /// Schedule a save of `patients` for the given shift, superseding any pending save.
    pub fn schedule(&self, date: NaiveDate, label: ShiftLabel, patients: RoomPatients) {
        let shifts = self.shifts.clone();
        self.debouncer.schedule(move || async move {
            if let Err(e) = shifts.save_patient_map(date, label, &patients).await {
                tracing::warn!(%date, shift = %label, error = %e, "auto-save of patient assignments failed");
            }
        });
    }

    pub fn cancel(&self) {
        self.debouncer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

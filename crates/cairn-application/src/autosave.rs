//! Periodic background save of the current session.
//!
//! `AutoSaveScheduler` is an owned value: it holds at most one running timer
//! task and cancels it on `stop`, on restart and on drop. Every tick publishes
//! an [`AutoSaveReport`] on a watch channel.

use cairn_core::error::{CairnError, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::session_store::{SaveOptions, SaveOutcome, SessionStore};

/// Result of one auto-save tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoSaveReport {
    pub at: DateTime<Utc>,
    pub outcome: SaveOutcome,
    /// Failed ticks since the last successful one
    pub consecutive_failures: u32,
}

struct RunningTimer {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
    interval: Duration,
}

pub struct AutoSaveScheduler {
    timer: Option<RunningTimer>,
    reports: Arc<watch::Sender<Option<AutoSaveReport>>>,
}

impl Default for AutoSaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoSaveScheduler {
    pub fn new() -> Self {
        Self {
            timer: None,
            reports: Arc::new(watch::Sender::new(None)),
        }
    }

    /// Starts saving `store` every `interval_ms` milliseconds, replacing any
    /// timer that is already running. The first tick fires one full interval
    /// from now; ticks missed while a save is slow are skipped.
    pub fn start(&mut self, store: Arc<SessionStore>, interval_ms: u64) -> Result<()> {
        if interval_ms == 0 {
            return Err(CairnError::config(
                "Auto-save interval must be a positive number of milliseconds",
            ));
        }
        self.stop();

        let interval = Duration::from_millis(interval_ms);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer(
            store,
            Instant::now() + interval,
            interval,
            cancel.clone(),
            Arc::clone(&self.reports),
        ));

        tracing::info!("[AutoSave] Started with interval {}ms", interval_ms);
        self.timer = Some(RunningTimer {
            handle,
            cancel,
            interval,
        });
        Ok(())
    }

    /// Starts or stops according to the store's auto-save preferences.
    pub fn start_from_store(&mut self, store: Arc<SessionStore>) -> Result<()> {
        let preferences = store.preferences();
        if preferences.auto_save_enabled {
            self.start(store, preferences.auto_save_interval_ms)
        } else {
            self.stop();
            Ok(())
        }
    }

    /// Cancels the timer. A save already in progress runs to completion.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
            tracing::debug!("[AutoSave] Stopped");
        }
    }

    /// Stops the timer and waits for its task to exit.
    pub async fn shutdown(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
            if let Err(e) = timer.handle.await {
                tracing::warn!("[AutoSave] Timer task ended abnormally: {}", e);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    pub fn interval(&self) -> Option<Duration> {
        self.timer.as_ref().map(|t| t.interval)
    }

    /// Receiver for tick reports. Holds `None` until the first tick.
    pub fn subscribe(&self) -> watch::Receiver<Option<AutoSaveReport>> {
        self.reports.subscribe()
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_timer(
    store: Arc<SessionStore>,
    first_tick: Instant,
    interval: Duration,
    cancel: CancellationToken,
    reports: Arc<watch::Sender<Option<AutoSaveReport>>>,
) {
    let mut ticker = tokio::time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let outcome = store.save_session_outcome(SaveOptions::default()).await;
        match &outcome {
            SaveOutcome::Failed(message) => {
                consecutive_failures += 1;
                tracing::warn!(
                    "[AutoSave] Save failed ({} in a row): {}",
                    consecutive_failures,
                    message
                );
            }
            SaveOutcome::Saved | SaveOutcome::Clean => consecutive_failures = 0,
            SaveOutcome::NoActiveSession | SaveOutcome::InProgress => {}
        }

        reports.send_replace(Some(AutoSaveReport {
            at: Utc::now(),
            outcome,
            consecutive_failures,
        }));
    }
}

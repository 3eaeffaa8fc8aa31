//! Polling driver: a background task that runs a callback on a fixed interval
//! (1 Hz in production) until stopped. Independent of any view or request.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct TickDriver {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Spawn the task. The first tick fires immediately. Must be called inside a tokio runtime.
    pub fn start<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => on_tick(),
                    _ = stop_rx.changed() => break,
                }
            }
            log::info!("Tick driver stopped");
        });
        log::info!("Tick driver started ({} ms interval)", interval.as_millis());
        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task and wait for it to exit. Calling it again does nothing.
    pub async fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.stop_tx.send(true);
        if let Err(e) = handle.await {
            log::warn!("Tick driver task ended abnormally: {}", e);
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

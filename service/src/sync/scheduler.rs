//! Periodic sync trigger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::SyncOrchestrator;
use crate::db::KeyValueStore;
use crate::remote::RemoteSource;

/// Runs [`SyncOrchestrator::run_sync`] every `interval` while enabled.
///
/// Disabling only stops new runs from starting; a run already in flight
/// completes. Ticks that fall due while a run is still going are dropped,
/// and the orchestrator's own guard covers manual syncs racing a tick.
#[derive(Debug)]
pub struct SyncScheduler {
    enabled: Arc<AtomicBool>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl SyncScheduler {
    pub fn new(interval: Duration, enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
            interval,
            handle: None,
            shutdown: None,
        }
    }

    /// Spawn the timer task. Restarts it if already running.
    ///
    /// The first run happens right after the call, later ones every interval.
    pub fn start<R, K>(&mut self, orchestrator: Arc<SyncOrchestrator<R, K>>)
    where
        R: RemoteSource,
        K: KeyValueStore,
    {
        self.signal_stop();

        let enabled = Arc::clone(&self.enabled);
        let period = self.interval;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                if !enabled.load(Ordering::Acquire) {
                    tracing::trace!("Periodic sync disabled, skipping tick");
                    continue;
                }

                // Outside the select so a stop request never cuts a run short
                let outcome = orchestrator.run_sync().await;
                tracing::debug!(summary = %outcome.summary(), "Periodic sync finished");
            }
        }));
        self.shutdown = Some(shutdown_tx);

        tracing::info!(interval_secs = period.as_secs(), "Sync scheduler started");
    }

    /// Stop the timer task, waiting for an in-flight run to finish first.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.signal_stop() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Sync scheduler task ended abnormally");
            }
            tracing::info!("Sync scheduler stopped");
        }
    }

    /// Ask the task to exit after its current run, without waiting.
    fn signal_stop(&mut self) -> Option<JoinHandle<()>> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        self.handle.take()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        tracing::info!(enabled, "Periodic sync toggled");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryKv;
    use crate::store::LocalStore;
    use quotesync_engine::Collection;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingRemote {
        fetches: AtomicUsize,
        delay: Option<Duration>,
    }

    impl RemoteSource for CountingRemote {
        async fn fetch_remote(&self) -> Collection {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Collection::new()
        }

        async fn push_local(&self, _collection: &Collection) -> bool {
            true
        }
    }

    async fn orchestrator() -> Arc<SyncOrchestrator<CountingRemote, MemoryKv>> {
        with_remote(CountingRemote::default()).await
    }

    async fn with_remote(remote: CountingRemote) -> Arc<SyncOrchestrator<CountingRemote, MemoryKv>> {
        Arc::new(SyncOrchestrator::open(LocalStore::new(MemoryKv::new()), remote).await)
    }

    #[tokio::test]
    async fn runs_periodically_while_enabled() {
        let orchestrator = orchestrator().await;
        let mut scheduler = SyncScheduler::new(Duration::from_millis(20), true);

        scheduler.start(Arc::clone(&orchestrator));
        assert!(scheduler.is_running());
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.stop().await;

        assert!(orchestrator.remote().fetches.load(Ordering::SeqCst) >= 2);
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn disabled_scheduler_does_not_sync() {
        let orchestrator = orchestrator().await;
        let mut scheduler = SyncScheduler::new(Duration::from_millis(20), false);

        scheduler.start(Arc::clone(&orchestrator));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(orchestrator.remote().fetches.load(Ordering::SeqCst), 0);
        assert!(!scheduler.is_enabled());
    }

    #[tokio::test]
    async fn stopped_scheduler_stays_quiet() {
        let orchestrator = orchestrator().await;
        let mut scheduler = SyncScheduler::new(Duration::from_millis(20), true);

        scheduler.start(Arc::clone(&orchestrator));
        scheduler.stop().await;
        let seen = orchestrator.remote().fetches.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(orchestrator.remote().fetches.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn first_run_happens_at_start() {
        let orchestrator = orchestrator().await;
        let mut scheduler = SyncScheduler::new(Duration::from_secs(10), true);

        scheduler.start(Arc::clone(&orchestrator));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(orchestrator.remote().fetches.load(Ordering::SeqCst), 1);
        assert!(orchestrator.store().last_sync().await.is_some());
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn stop_waits_for_inflight_run() {
        let orchestrator = with_remote(CountingRemote {
            delay: Some(Duration::from_millis(150)),
            ..Default::default()
        })
        .await;
        let mut scheduler = SyncScheduler::new(Duration::from_secs(10), true);

        scheduler.start(Arc::clone(&orchestrator));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(orchestrator.remote().fetches.load(Ordering::SeqCst), 1);
        assert!(orchestrator.store().last_sync().await.is_none());

        scheduler.stop().await;

        assert!(!scheduler.is_running());
        assert!(orchestrator.store().last_sync().await.is_some());
        assert_eq!(orchestrator.remote().fetches.load(Ordering::SeqCst), 1);
    }
}

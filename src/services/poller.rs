use futures::future::join;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::services::api_client::DelayMapApi;
use crate::services::dashboard::{Applied, Dashboard, Feed};
use crate::tools::prometheus::FleetMetrics;

/// Drives the periodic trains and works fetches.
///
/// Requests are never awaited by the timer, so a slow response can overlap
/// later ticks. Each request takes a fresh number from one counter and the
/// dashboard drops anything older than what it shows.
#[derive(Clone)]
pub struct Poller {
    api: Arc<dyn DelayMapApi>,
    dashboard: Arc<RwLock<Dashboard>>,
    metrics: FleetMetrics,
    next_seq: Arc<AtomicU64>,
    period: Duration,
}

impl Poller {
    pub fn new(
        api: Arc<dyn DelayMapApi>,
        dashboard: Arc<RwLock<Dashboard>>,
        metrics: FleetMetrics,
        period: Duration,
    ) -> Self {
        Self {
            api,
            dashboard,
            metrics,
            next_seq: Arc::new(AtomicU64::new(1)),
            period,
        }
    }

    fn take_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    fn record(&self, feed: Feed, applied: Applied, failed: bool) {
        match applied {
            Applied::Stale => self.metrics.stale_response(feed.as_str()),
            Applied::Yes if failed => self.metrics.fetch_failed(feed.as_str()),
            Applied::Yes => {}
        }
    }

    pub async fn refresh_trains(&self) -> Applied {
        let seq = self.take_seq();
        let language = self.dashboard.read().await.language();
        let result = self.api.fetch_trains(language).await;
        let failed = result.is_err();

        let mut dashboard = self.dashboard.write().await;
        let applied = dashboard.apply_trains(seq, result);
        if let (Applied::Yes, Some(summary)) = (applied, dashboard.stats().summary()) {
            self.metrics.observe_summary(summary);
        }
        drop(dashboard);

        self.record(Feed::Trains, applied, failed);
        applied
    }

    pub async fn refresh_works(&self) -> Applied {
        let seq = self.take_seq();
        let language = self.dashboard.read().await.language();
        let result = self.api.fetch_works(language).await;
        let failed = result.is_err();

        let applied = self.dashboard.write().await.apply_works(seq, result);
        self.record(Feed::Works, applied, failed);
        applied
    }

    /// Fetches both feeds and waits for both to be applied.
    pub async fn refresh_now(&self) -> (Applied, Applied) {
        join(self.refresh_trains(), self.refresh_works()).await
    }

    /// Fires one trains fetch and one works fetch without waiting for them.
    pub fn tick(&self) -> (JoinHandle<Applied>, JoinHandle<Applied>) {
        let trains = self.clone();
        let works = self.clone();
        (
            tokio::spawn(async move { trains.refresh_trains().await }),
            tokio::spawn(async move { works.refresh_works().await }),
        )
    }

    /// Like `tick`, with a watcher task that logs fetches which panicked or
    /// were cancelled.
    pub fn tick_detached(&self) -> JoinHandle<()> {
        let (trains, works) = self.tick();
        tokio::spawn(async move {
            for (feed, handle) in [(Feed::Trains, trains), (Feed::Works, works)] {
                if let Err(e) = handle.await {
                    error!("{} refresh task failed: {}", feed.as_str(), e);
                }
            }
        })
    }

    /// Runs forever. The first tick fires immediately.
    pub async fn start_polling(&self) {
        info!("Starting DelayMap polling every {:?}", self.period);
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!("Polling trains and works");
            self.tick_detached();
        }
    }
}

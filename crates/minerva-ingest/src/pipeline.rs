//! Pipeline orchestration.
//!
//! Three task groups connected by bounded channels:
//!
//! ```text
//! producer ──event channel──▶ worker pool ──geo channel──▶ enricher
//! ```
//!
//! plus a display task on a ticker. Shutdown is phased through channel
//! closure: the producer drops the event sender when input is exhausted;
//! each worker drops its geo sender on exit, so the last worker out closes
//! the geo channel; the enricher drains it and returns; then the done
//! signal stops the display loop. No task ever sends on a closed channel,
//! and every task terminates once its input closes.
//!
//! Per-line and per-IP errors never unwind the pipeline: they are absorbed
//! into counters and buffered messages. The run's success criterion is
//! "ran to completion".

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};

use minerva_core::parse;

use crate::dedupe::DedupeSet;
use crate::geo::GeoProvider;
use crate::progress::{Progress, Stats};
use crate::store::EventStore;

/// Number of concurrent event workers.
const WORKER_COUNT: usize = 20;

/// Event channel capacity: absorbs bursts between the fast producer and the
/// store-bound workers.
const EVENT_CHANNEL_CAPACITY: usize = 10_000;

/// Geo channel capacity. The rate limit dominates throughput; this only
/// keeps workers from blocking under extreme new-IP density.
const GEO_CHANNEL_CAPACITY: usize = 1_024;

/// Minimum interval between geolocation requests: 40/min, strictly below
/// the provider's 45/min ceiling.
const GEO_REQUEST_INTERVAL: Duration = Duration::from_millis(1500);

/// Cadence of the periodic display task.
const DISPLAY_INTERVAL: Duration = Duration::from_secs(1);

/// Minimum interval between hot-path displays triggered by workers.
const WORKER_DISPLAY_INTERVAL: Duration = Duration::from_millis(250);

/// The ingestion pipeline, generic over its store and geolocation seams.
pub struct Pipeline<S, G> {
    store: Arc<S>,
    provider: Arc<G>,
    stats: Arc<Stats>,
    progress: Arc<Progress>,
}

impl<S, G> Pipeline<S, G>
where
    S: EventStore + 'static,
    G: GeoProvider + 'static,
{
    pub fn new(store: S, provider: G) -> Self {
        let stats = Arc::new(Stats::new());
        let progress = Arc::new(Progress::new(Arc::clone(&stats)));
        Self {
            store: Arc::new(store),
            provider: Arc::new(provider),
            stats,
            progress,
        }
    }

    /// The shared counter bundle.
    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// Run the pipeline over `lines` to exhaustion.
    pub async fn run(&self, lines: Vec<String>) {
        let (event_tx, event_rx) = mpsc::channel::<String>(EVENT_CHANNEL_CAPACITY);
        let (geo_tx, geo_rx) = mpsc::channel::<String>(GEO_CHANNEL_CAPACITY);
        let (done_tx, done_rx) = watch::channel(false);

        let display = {
            let progress = Arc::clone(&self.progress);
            tokio::spawn(async move { progress.run_periodic(DISPLAY_INTERVAL, done_rx).await })
        };

        let producer = {
            let stats = Arc::clone(&self.stats);
            tokio::spawn(producer_loop(lines, event_tx, stats))
        };

        let dedupe = Arc::new(DedupeSet::new());
        let event_rx = Arc::new(Mutex::new(event_rx));
        let mut workers = Vec::with_capacity(WORKER_COUNT);
        for _ in 0..WORKER_COUNT {
            workers.push(tokio::spawn(worker_loop(
                Arc::clone(&event_rx),
                geo_tx.clone(),
                Arc::clone(&self.store),
                Arc::clone(&dedupe),
                Arc::clone(&self.stats),
                Arc::clone(&self.progress),
            )));
        }
        // The workers now hold the only geo senders; this drop arms the
        // channel-closure shutdown phase.
        drop(geo_tx);

        let enricher = tokio::spawn(enricher_loop(
            geo_rx,
            Arc::clone(&self.store),
            Arc::clone(&self.provider),
            Arc::clone(&self.stats),
            Arc::clone(&self.progress),
        ));

        let _ = producer.await;
        for worker in workers {
            let _ = worker.await;
        }
        let _ = enricher.await;
        let _ = done_tx.send(true);
        let _ = display.await;
    }
}

/// Stage 1: classify lines and feed the event channel.
async fn producer_loop(lines: Vec<String>, event_tx: mpsc::Sender<String>, stats: Arc<Stats>) {
    for line in lines {
        stats.lines_read.fetch_add(1, Ordering::Relaxed);
        if !parse::is_suspicious(&line) {
            stats.benign.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        stats.flagged.fetch_add(1, Ordering::Relaxed);
        if event_tx.send(line).await.is_err() {
            // All workers are gone; nothing left to feed.
            break;
        }
    }
    // event_tx drops here, closing the event channel.
}

/// Stage 2: extract, insert, and schedule enrichment for one line at a time.
async fn worker_loop<S: EventStore>(
    event_rx: Arc<Mutex<mpsc::Receiver<String>>>,
    geo_tx: mpsc::Sender<String>,
    store: Arc<S>,
    dedupe: Arc<DedupeSet>,
    stats: Arc<Stats>,
    progress: Arc<Progress>,
) {
    loop {
        let line = { event_rx.lock().await.recv().await };
        let Some(line) = line else { break };

        let event = parse::extract(&line);
        if event.is_malformed() {
            progress.buffer_message(format!(
                "skipping malformed event from {} (no destination address)",
                event.source_ip
            ));
            stats.malformed.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        match store.insert_event(&event).await {
            Ok(rows) => {
                stats.inserted.fetch_add(rows, Ordering::Relaxed);
            }
            Err(e) => {
                stats.errors.fetch_add(1, Ordering::Relaxed);
                progress.buffer_message(format!("insert failed for {}: {e}", event.source_ip));
                stats.processed.fetch_add(1, Ordering::Relaxed);
                continue;
            }
        }

        // First sighting this run: ask the store whether the IP still needs
        // enrichment. The insert above always precedes the dispatch below,
        // so an event's row exists before its geo row can.
        if !dedupe.test_and_insert(&event.source_ip) {
            match store.geo_exists(&event.source_ip).await {
                Ok(true) => {}
                Ok(false) => {
                    stats.geo_queued.fetch_add(1, Ordering::Relaxed);
                    if geo_tx.send(event.source_ip.clone()).await.is_err() {
                        stats.geo_queued.fetch_sub(1, Ordering::Relaxed);
                    }
                }
                Err(e) => {
                    // Conservative: without a membership answer, don't
                    // spend a rate-limited request on this IP.
                    stats.errors.fetch_add(1, Ordering::Relaxed);
                    progress.buffer_message(format!(
                        "geo membership check failed for {}: {e}",
                        event.source_ip
                    ));
                }
            }
        }

        stats.processed.fetch_add(1, Ordering::Relaxed);
        progress.display_if_needed(WORKER_DISPLAY_INTERVAL);
    }
    // This worker's geo_tx drops here; the last drop closes the geo channel.
}

/// Stage 3: single-threaded, rate-limited enrichment.
///
/// The ticker is the concurrency bound: one request per tick, 40 per
/// minute. Failed lookups are not retried within the run; the IP stays
/// absent from `ip_geo` until a future run rediscovers it.
async fn enricher_loop<S: EventStore, G: GeoProvider>(
    mut geo_rx: mpsc::Receiver<String>,
    store: Arc<S>,
    provider: Arc<G>,
    stats: Arc<Stats>,
    progress: Arc<Progress>,
) {
    let mut ticker = tokio::time::interval(GEO_REQUEST_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    while let Some(ip) = geo_rx.recv().await {
        ticker.tick().await;

        match provider.fetch_geo(&ip).await {
            Ok(geo) => match store.upsert_geo(&ip, &geo).await {
                Ok(()) => {
                    stats.geo_completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    stats.geo_errors.fetch_add(1, Ordering::Relaxed);
                    progress.buffer_message(format!("geo upsert failed for {ip}: {e}"));
                }
            },
            Err(e) => {
                stats.geo_errors.fetch_add(1, Ordering::Relaxed);
                progress.buffer_message(format!("geo lookup failed for {ip}: {e}"));
            }
        }

        stats.geo_queued.fetch_sub(1, Ordering::Relaxed);
    }
}

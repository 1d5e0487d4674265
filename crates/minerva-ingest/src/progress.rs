//! Pipeline statistics and the progress display.
//!
//! Counters are plain atomics so workers mutate them without a lock. The
//! display owns stdout: workers never print directly, they push diagnostics
//! through the message buffer and the renderer flushes it ahead of each
//! status block, keeping the two from interleaving. Diagnostic logs from the
//! rest of the process go to stderr via `tracing`.

use std::io::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::watch;

/// Pipeline counters.
///
/// All fields are monotonic except `geo_queued`, which tracks the current
/// depth of the enrichment queue and returns to zero by the end of a run.
#[derive(Debug, Default)]
pub struct Stats {
    pub lines_read: AtomicU64,
    pub flagged: AtomicU64,
    pub benign: AtomicU64,
    pub malformed: AtomicU64,
    pub inserted: AtomicU64,
    pub errors: AtomicU64,
    pub geo_queued: AtomicI64,
    pub geo_completed: AtomicU64,
    pub geo_errors: AtomicU64,
    pub processed: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Render-state deltas between displays.
struct DisplayState {
    last_render: Instant,
    last_processed: u64,
    last_geo_completed: u64,
}

/// Progress tracker: rate-limited multi-line display plus message buffering.
pub struct Progress {
    stats: Arc<Stats>,
    started: Instant,
    state: Mutex<DisplayState>,
    messages: Mutex<Vec<String>>,
}

impl Progress {
    pub fn new(stats: Arc<Stats>) -> Self {
        let now = Instant::now();
        Self {
            stats,
            started: now,
            state: Mutex::new(DisplayState {
                last_render: now,
                last_processed: 0,
                last_geo_completed: 0,
            }),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Queue a diagnostic line for the next render.
    ///
    /// Safe from any worker; the buffer is flushed and cleared on each
    /// display.
    pub fn buffer_message(&self, message: impl Into<String>) {
        self.messages.lock().push(message.into());
    }

    /// Number of currently buffered messages.
    pub fn buffered_messages(&self) -> usize {
        self.messages.lock().len()
    }

    /// Render a status block now.
    pub fn display(&self) {
        let mut state = self.state.lock();
        self.render(&mut state, Instant::now());
    }

    /// Render only if at least `min_interval` has passed since the last
    /// render. Cheap enough for worker hot paths; contention skips the
    /// render rather than queueing behind it.
    pub fn display_if_needed(&self, min_interval: Duration) {
        let Some(mut state) = self.state.try_lock() else {
            return;
        };
        let now = Instant::now();
        if now.duration_since(state.last_render) >= min_interval {
            self.render(&mut state, now);
        }
    }

    fn render(&self, state: &mut DisplayState, now: Instant) {
        let processed = self.stats.processed.load(Ordering::Relaxed);
        let geo_completed = self.stats.geo_completed.load(Ordering::Relaxed);
        let flagged = self.stats.flagged.load(Ordering::Relaxed);

        let delta = now.duration_since(state.last_render).as_secs_f64();
        let elapsed = now.duration_since(self.started).as_secs_f64();

        let inst_lines = rate(processed.saturating_sub(state.last_processed), delta);
        let inst_geo = rate(geo_completed.saturating_sub(state.last_geo_completed), delta);
        let avg_lines = rate(processed, elapsed);
        let avg_geo = rate(geo_completed, elapsed);

        let ratio = if flagged > 0 {
            processed as f64 / flagged as f64 * 100.0
        } else {
            0.0
        };

        let messages = std::mem::take(&mut *self.messages.lock());

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for message in &messages {
            let _ = writeln!(out, "{message}");
        }
        let _ = writeln!(
            out,
            "[{}] elapsed {:>6.1}s | progress {}/{} ({:.1}%)",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            elapsed,
            processed,
            flagged,
            ratio,
        );
        let _ = writeln!(
            out,
            "  rates: {inst_lines:.1} lines/s now, {avg_lines:.1} avg | \
             {inst_geo:.2} geo/s now, {avg_geo:.2} avg",
        );
        let _ = writeln!(
            out,
            "  lines={} flagged={} benign={} malformed={} inserted={} errors={}",
            self.stats.lines_read.load(Ordering::Relaxed),
            flagged,
            self.stats.benign.load(Ordering::Relaxed),
            self.stats.malformed.load(Ordering::Relaxed),
            self.stats.inserted.load(Ordering::Relaxed),
            self.stats.errors.load(Ordering::Relaxed),
        );
        let _ = writeln!(
            out,
            "  geo: queued={} completed={} errors={}",
            self.stats.geo_queued.load(Ordering::Relaxed),
            geo_completed,
            self.stats.geo_errors.load(Ordering::Relaxed),
        );
        let _ = out.flush();

        state.last_render = now;
        state.last_processed = processed;
        state.last_geo_completed = geo_completed;
    }

    /// Print the end-of-run summary.
    pub fn print_summary(&self) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "───────────────────────────────────────────────");
        let _ = writeln!(
            out,
            "Run complete in {:.1}s",
            self.started.elapsed().as_secs_f64()
        );
        let _ = writeln!(
            out,
            "  Lines read:    {}",
            self.stats.lines_read.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "  Flagged:       {}",
            self.stats.flagged.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "  Benign:        {}",
            self.stats.benign.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "  Malformed:     {}",
            self.stats.malformed.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "  Inserted:      {}",
            self.stats.inserted.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "  Store errors:  {}",
            self.stats.errors.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "  Geo completed: {}",
            self.stats.geo_completed.load(Ordering::Relaxed)
        );
        let _ = writeln!(
            out,
            "  Geo errors:    {}",
            self.stats.geo_errors.load(Ordering::Relaxed)
        );
        let _ = out.flush();
    }

    /// Drive periodic renders until `done` fires, then render one final
    /// frame and the summary.
    pub async fn run_periodic(&self, interval: Duration, mut done: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.display(),
                _ = done.changed() => {
                    self.display();
                    self.print_summary();
                    return;
                }
            }
        }
    }
}

fn rate(count: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        count as f64 / seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_flushed_on_display() {
        let progress = Progress::new(Arc::new(Stats::new()));
        progress.buffer_message("first warning");
        progress.buffer_message("second warning");
        assert_eq!(progress.buffered_messages(), 2);

        progress.display();
        assert_eq!(progress.buffered_messages(), 0);
    }

    #[test]
    fn display_if_needed_respects_interval() {
        let stats = Arc::new(Stats::new());
        let progress = Progress::new(Arc::clone(&stats));

        // A long interval right after construction: buffered messages stay
        // queued because nothing renders.
        progress.buffer_message("queued");
        progress.display_if_needed(Duration::from_secs(3600));
        assert_eq!(progress.buffered_messages(), 1);

        // Zero interval renders immediately and drains the buffer.
        progress.display_if_needed(Duration::ZERO);
        assert_eq!(progress.buffered_messages(), 0);
    }

    #[test]
    fn rate_handles_zero_window() {
        assert_eq!(rate(100, 0.0), 0.0);
        assert_eq!(rate(100, 2.0), 50.0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_periodic_exits_on_done() {
        let progress = Arc::new(Progress::new(Arc::new(Stats::new())));
        let (done_tx, done_rx) = watch::channel(false);

        let handle = {
            let progress = Arc::clone(&progress);
            tokio::spawn(
                async move { progress.run_periodic(Duration::from_secs(1), done_rx).await },
            )
        };

        tokio::time::sleep(Duration::from_millis(3500)).await;
        done_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}

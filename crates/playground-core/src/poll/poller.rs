use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Success/failure counters for one polling loop.
#[derive(Debug, Default)]
pub struct PollStats {
    successes: AtomicU64,
    failures: AtomicU64,
}

impl PollStats {
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Owner side of a running poller.
///
/// Holds the latest published snapshot. Dropping the handle cancels the
/// loop, so a poller never outlives the view that started it.
pub struct PollHandle<T> {
    name: &'static str,
    rx: watch::Receiver<Option<T>>,
    stats: Arc<PollStats>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<T: Clone> PollHandle<T> {
    /// Latest successfully fetched value, `None` until the first success.
    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next published value.
    ///
    /// Returns `None` once the poller has stopped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    /// Value published since the last call to `changed` or `take_update`, if any.
    pub fn take_update(&mut self) -> Option<T> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }
        self.rx.borrow_and_update().clone()
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Cancel the loop and wait for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(event = "core.poll.join_failed", poller = self.name, error = %e);
        }
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start polling `producer` every `interval`.
///
/// The first fetch runs immediately. The next one is scheduled `interval`
/// after the previous fetch completes, so invocations never overlap. A
/// failed fetch is logged and counted; the previously published value stays
/// in place and the loop keeps going.
pub fn spawn_poller<T, E, F, Fut>(
    name: &'static str,
    interval: Duration,
    producer: F,
) -> PollHandle<T>
where
    T: Send + Sync + 'static,
    E: Display + Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let (tx, rx) = watch::channel(None);
    let stats = Arc::new(PollStats::default());
    let cancel = CancellationToken::new();

    debug!(
        event = "core.poll.started",
        poller = name,
        interval_ms = interval.as_millis() as u64
    );

    let task = tokio::spawn(run_loop(
        name,
        interval,
        producer,
        tx,
        stats.clone(),
        cancel.clone(),
    ));

    PollHandle {
        name,
        rx,
        stats,
        cancel,
        task: Some(task),
    }
}

async fn run_loop<T, E, F, Fut>(
    name: &'static str,
    interval: Duration,
    mut producer: F,
    tx: watch::Sender<Option<T>>,
    stats: Arc<PollStats>,
    cancel: CancellationToken,
) where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            result = producer() => result,
        };

        match result {
            Ok(value) => {
                stats.successes.fetch_add(1, Ordering::Relaxed);
                tx.send_replace(Some(value));
            }
            Err(e) => {
                let failures = stats.failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    event = "core.poll.fetch_failed",
                    poller = name,
                    failures = failures,
                    error = %e
                );
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    debug!(event = "core.poll.stopped", poller = name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn scripted(
        script: Vec<Result<u32, String>>,
    ) -> (
        Arc<AtomicUsize>,
        impl FnMut() -> std::future::Ready<Result<u32, String>> + Send + 'static,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let queue = Arc::new(Mutex::new(VecDeque::from(script)));
        let counter = calls.clone();
        let producer = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let next = queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("exhausted".to_string()));
            std::future::ready(next)
        };
        (calls, producer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let (_, producer) = scripted(vec![Ok(7)]);
        let mut handle = spawn_poller("test", INTERVAL, producer);

        let start = tokio::time::Instant::now();
        assert_eq!(handle.changed().await, Some(7));
        assert!(start.elapsed() < INTERVAL);
        assert_eq!(handle.latest(), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_update_is_consumed_once() {
        let (_, producer) = scripted(vec![Ok(1)]);
        let mut handle = spawn_poller("test", INTERVAL, producer);
        assert_eq!(handle.take_update(), None);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(handle.take_update(), Some(1));
        assert_eq!(handle.take_update(), None);
        assert_eq!(handle.latest(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_keeps_loop_and_previous_value() {
        let (calls, producer) = scripted(vec![Ok(1), Err("boom".to_string()), Ok(3)]);
        let mut handle = spawn_poller("test", INTERVAL, producer);

        assert_eq!(handle.changed().await, Some(1));
        // The failure publishes nothing; the next change is the third fetch.
        assert_eq!(handle.changed().await, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(handle.stats().failures(), 1);
        assert_eq!(handle.stats().successes(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invocations_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let (flight, max) = (in_flight.clone(), max_in_flight.clone());

        let mut handle = spawn_poller("slow", INTERVAL, move || {
            let flight = flight.clone();
            let max = max.clone();
            async move {
                let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now, Ordering::SeqCst);
                // Slower than the interval itself.
                tokio::time::sleep(INTERVAL * 3).await;
                flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, String>(now)
            }
        });

        for _ in 0..4 {
            assert!(handle.changed().await.is_some());
        }
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_the_loop() {
        let (calls, producer) = scripted((0..100).map(Ok).collect());
        let mut handle = spawn_poller("test", INTERVAL, producer);
        handle.changed().await;
        drop(handle);

        let after_drop = calls.load(Ordering::SeqCst);
        tokio::time::sleep(INTERVAL * 10).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_drop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_task() {
        let (calls, producer) = scripted((0..100).map(Ok).collect());
        let mut handle = spawn_poller("test", INTERVAL, producer);
        handle.changed().await;
        handle.shutdown().await;

        let after = calls.load(Ordering::SeqCst);
        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), after);
    }
}

//! Fixed-interval refetching that cannot publish stale or late results.
//!
//! Every fetch is tagged with a generation number. A response older than the
//! newest one already published is dropped, so a slow tick can never
//! overwrite a fresher manual refresh. Dropping the [`Poller`] aborts the
//! loop together with every in-flight request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::error::Result;
use crate::view::ViewState;

pub struct Poller<T> {
    state: watch::Receiver<ViewState<T>>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Send + Sync + 'static,
{
    /// Fetch immediately, then every `interval`. Must be called inside a
    /// tokio runtime.
    pub fn spawn<F, Fut>(interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(ViewState::loading());
        let refresh = Arc::new(Notify::new());
        let task = tokio::spawn(run(interval, fetch, tx, refresh.clone()));
        Self {
            state: rx,
            refresh,
            task,
        }
    }

    /// Request an immediate fetch alongside the timer.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.clone()
    }

    /// Wait for the next published state. `None` once the poller has stopped.
    pub async fn next_update(&mut self) -> Option<ViewState<T>>
    where
        T: Clone,
    {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    pub fn current(&self) -> ViewState<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    /// Stop polling. In-flight requests are cancelled.
    pub fn stop(self) {}
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T, F, Fut>(
    interval: Duration,
    fetch: F,
    tx: watch::Sender<ViewState<T>>,
    refresh: Arc<Notify>,
) where
    T: Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: JoinSet<(u64, Result<T>)> = JoinSet::new();
    let mut issued = 0u64;
    let mut published = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
            Some(joined) = in_flight.join_next() => {
                let Ok((generation, result)) = joined else {
                    continue;
                };
                if generation > published {
                    published = generation;
                    let pending = !in_flight.is_empty();
                    tx.send_modify(|state| {
                        state.apply(result);
                        state.loading = pending;
                    });
                    trace!(generation, "published poll result");
                } else {
                    debug!(generation, published, "discarding stale poll result");
                    let pending = !in_flight.is_empty();
                    tx.send_if_modified(|state| {
                        let changed = state.loading != pending;
                        state.loading = pending;
                        changed
                    });
                }
                continue;
            }
        }

        issued += 1;
        let generation = issued;
        tx.send_modify(|state| state.loading = true);
        let request = fetch();
        in_flight.spawn(async move { (generation, request.await) });
    }
}

use std::time::Duration;

use futures::future::join;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
};

use crate::metric::Sample;

/// Everything a run observed, returned to the caller of
/// [`crate::run_load`] or [`crate::Executor::exec`].
///
/// `latencies` holds one entry per completed invocation, failed ones
/// included. `errors` holds the error of each failed invocation. The two are
/// collected from independent channels, so there is no positional
/// correspondence between `latencies[i]` and `errors[i]`, and neither is in
/// completion order across workers.
///
/// No statistics are computed here: percentiles, throughput and error ratios
/// belong to whoever consumes the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult<E> {
    pub latencies: Vec<Duration>,
    pub errors: Vec<E>,
}

impl<E> LoadResult<E> {
    /// Number of invocations that ran to completion.
    pub fn invocations(&self) -> usize {
        self.latencies.len()
    }
}

/// Write half handed to every worker.
pub(crate) struct SampleSink<E> {
    latencies: mpsc::Sender<Duration>,
    errors: mpsc::Sender<E>,
}

impl<E> Clone for SampleSink<E> {
    fn clone(&self) -> Self {
        Self {
            latencies: self.latencies.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl<E: Send + 'static> SampleSink<E> {
    /// Publish a sample. Returns once both halves have been queued, so a
    /// completion signalled afterwards is always ordered behind its sample.
    pub(crate) async fn record(&self, sample: Sample<E>) {
        if self.latencies.send(sample.latency).await.is_err() {
            tracing::debug!("Latency collector gone, dropping sample.");
        }
        if let Some(error) = sample.error {
            if self.errors.send(error).await.is_err() {
                tracing::debug!("Error collector gone, dropping sample.");
            }
        }
    }
}

/// Read half: two collector tasks draining the sample channels while the run
/// is in progress.
pub(crate) struct Aggregator<E> {
    latencies: JoinHandle<Vec<Duration>>,
    errors: JoinHandle<Vec<E>>,
}

impl<E: Send + 'static> Aggregator<E> {
    /// Spawn the collectors. `buffer` bounds each channel; collectors keep
    /// draining during the run so producers only wait when a burst outpaces
    /// them.
    pub(crate) fn spawn(buffer: usize) -> (SampleSink<E>, Self) {
        let (latency_tx, latency_rx) = mpsc::channel(buffer);
        let (error_tx, error_rx) = mpsc::channel(buffer);
        let aggregator = Self {
            latencies: tokio::spawn(collector_task(latency_rx, buffer)),
            errors: tokio::spawn(collector_task(error_rx, buffer)),
        };
        let sink = SampleSink {
            latencies: latency_tx,
            errors: error_tx,
        };
        (sink, aggregator)
    }

    /// Wait for both collectors to see their channel closed and return what
    /// they gathered.
    ///
    /// Only completes once every [`SampleSink`] clone has been dropped, which
    /// the executor guarantees by calling this after the pool has drained.
    pub(crate) async fn finish(self) -> Result<LoadResult<E>, JoinError> {
        let (latencies, errors) = join(self.latencies, self.errors).await;
        Ok(LoadResult {
            latencies: latencies?,
            errors: errors?,
        })
    }
}

/// Drain `rx` until every sender is gone, pulling whatever is already queued
/// in batches of up to `batch_size` after each wakeup.
pub(crate) async fn collector_task<T>(mut rx: mpsc::Receiver<T>, batch_size: usize) -> Vec<T> {
    let mut collected = Vec::new();

    // Wait for the first item or end once the channel is closed and empty
    while let Some(item) = rx.recv().await {
        collected.push(item);

        // Grab everything else that is already waiting
        for _ in 1..batch_size {
            match rx.try_recv() {
                Ok(item) => collected.push(item),
                Err(_) => break,
            }
        }
    }
    collected
}

use std::{future::Future, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use typed_builder::TypedBuilder;

use super::{
    controller::Controller,
    pool::{StartQueue, WorkerContext, WorkerPool},
    Executor,
};
use crate::{
    aggregate::{Aggregator, LoadResult},
    error::{ConfigurationError, LoadError},
    profile::ConcurrencyProfile,
    scenario::Scenario,
};

pub const DEFAULT_TICK: Duration = Duration::from_millis(100);
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_millis(50);
pub const DEFAULT_SAMPLE_BUFFER: usize = 10_000;

/// Task-count ceiling: 120 per cpu, never below 100 nor above 1000.
pub fn default_max_workers() -> usize {
    (num_cpus::get() * 120).clamp(100, 1000)
}

/// Executor that follows a [`ConcurrencyProfile`] with a ticking controller
/// and a bounded pool of reusable workers.
///
/// - The controller ticks every `tick`, computes the profile's target and
///   queues or retires start signals to match it.
/// - The pool hands each start signal to a worker slot; at most
///   `max_workers` invocations ever run at once.
/// - Latencies and errors are collected while the run progresses and handed
///   back once every slot has been returned.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use onda::{executor::AdaptiveExecutor, profile::RampUp, Executor, Scenario};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = AdaptiveExecutor::builder()
///     .profile(RampUp::new(1, 50, Duration::from_secs(30))?)
///     .max_workers(200)
///     .build();
/// let scenario = Scenario::builder()
///     .name("sleep")
///     .action(|_cancel: CancellationToken| async {
///         tokio::time::sleep(Duration::from_millis(5)).await;
///         Ok::<(), std::io::Error>(())
///     })
///     .build();
///
/// let result = executor.exec(&scenario, CancellationToken::new()).await?;
/// println!("{} invocations", result.invocations());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct AdaptiveExecutor<P> {
    /// How target concurrency evolves over the run.
    pub profile: P,
    /// Reconciliation interval of the controller.
    #[builder(default = DEFAULT_TICK)]
    pub tick: Duration,
    /// Longest a single retirement waits for a worker. Shorter than `tick`.
    #[builder(default = DEFAULT_STOP_TIMEOUT)]
    pub stop_timeout: Duration,
    /// Size of the slot arena, also the start queue capacity.
    #[builder(default = default_max_workers())]
    pub max_workers: usize,
    /// Capacity of each sample channel.
    #[builder(default = DEFAULT_SAMPLE_BUFFER)]
    pub sample_buffer: usize,
}

impl<P> AdaptiveExecutor<P> {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.tick.is_zero() {
            return Err(ConfigurationError::invalid("tick", "must be greater than zero"));
        }
        if self.stop_timeout.is_zero() || self.stop_timeout >= self.tick {
            return Err(ConfigurationError::invalid(
                "stop_timeout",
                format!(
                    "must be non-zero and shorter than the tick ({:?}), got {:?}",
                    self.tick, self.stop_timeout
                ),
            ));
        }
        if self.max_workers == 0 {
            return Err(ConfigurationError::invalid("max_workers", "must be at least 1"));
        }
        if self.sample_buffer == 0 {
            return Err(ConfigurationError::invalid(
                "sample_buffer",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

impl<P, F, Fut, E> Executor<F, Fut, E> for AdaptiveExecutor<P>
where
    P: ConcurrencyProfile + Clone + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    type Error = LoadError;

    async fn exec(
        &self,
        scenario: &Scenario<F>,
        cancel: CancellationToken,
    ) -> Result<LoadResult<E>, Self::Error> {
        self.validate()?;

        // Scenarios get a token of their own so the run can release them
        // without cancelling the caller's.
        let run = cancel.child_token();
        let starts = StartQueue::new(self.max_workers);
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let (sink, aggregator) = Aggregator::spawn(self.sample_buffer);

        tracing::info!(
            "Running scenario: {} for {:?}...",
            scenario.name,
            self.profile.total_duration()
        );
        let controller = tokio::spawn(
            Controller::new(
                self.profile.clone(),
                self.tick,
                self.stop_timeout,
                starts.clone(),
                done_rx,
                run.clone(),
            )
            .run(),
        );

        tracing::info!("Spawning worker pool with {} slots...", self.max_workers);
        let ctx = WorkerContext {
            action: scenario.action.clone(),
            cancel: run.clone(),
            starts: starts.clone(),
            done: done_tx,
            sink,
        };
        let pool = tokio::spawn(WorkerPool::new(self.max_workers, ctx).run());

        match controller.await {
            Ok(state) => tracing::info!(
                "Controller summary ({:?}): {} ticks, {} starts issued, {} dropped, {} withdrawn, {} stop timeouts.",
                state.exit,
                state.ticks,
                state.starts_issued,
                state.starts_dropped,
                state.stops_revoked,
                state.stop_timeouts
            ),
            Err(e) => {
                // Drain anyway: the samples gathered so far are still valid
                tracing::error!("Controller task failed, ending the run early: {e}");
                starts.close();
            }
        }
        // Deadline or cancellation, scenarios in flight are told to wrap up
        run.cancel();

        let pool_stats = pool.await?;
        tracing::info!("Collecting samples...");
        let result = aggregator.finish().await?;

        tracing::info!(
            "Done running scenario: {}! {} invocations, {} errors, {} workers spawned.",
            scenario.name,
            result.invocations(),
            result.errors.len(),
            pool_stats.workers_spawned
        );
        Ok(result)
    }
}

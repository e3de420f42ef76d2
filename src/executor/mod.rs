//! Executor: orchestration of a scenario at a changing concurrency
//!
//! The `Executor` trait is the runtime that executes a `Scenario`. Onda ships
//! a single implementation, [`AdaptiveExecutor`], built from three parts that
//! only talk through channels:
//!
//! 1. A **controller** ticking every 100 ms (by default). It samples the
//!    [`ConcurrencyProfile`](crate::profile::ConcurrencyProfile) and adds or
//!    retires workers until the live count matches the target.
//! 2. A **worker pool** of `max_workers` reusable slots. Every start signal
//!    becomes one scenario invocation inside a slot; a worker keeps its slot
//!    for as long as more start signals are queued.
//! 3. An **aggregator** collecting latencies and errors into a
//!    [`LoadResult`](crate::LoadResult).
//!
//! # Lifecycle
//! - *Running*: the controller reconciles on every tick and on every
//!   completion.
//! - *Draining*: the deadline passed or the run was cancelled. The controller
//!   closes the start queue and the scenarios' token is cancelled. In-flight
//!   invocations are never aborted; they end as soon as they observe it.
//! - *Terminated*: every slot is back in the pool and the aggregator has
//!   returned what it collected.
//!
//! Shutdown latency is bounded by one tick plus the longest invocation still
//! in flight, provided scenarios honour the cancellation token they receive.
//!
//! # Tuning knobs
//! - `tick`: reconciliation granularity. The live count lags the profile by
//!   at most one tick.
//! - `stop_timeout`: how long a single retirement waits for a worker before
//!   giving up on it. Must be shorter than `tick`.
//! - `max_workers`: size of the slot arena. Caps task creation, not logical
//!   concurrency. Default is `num_cpus * 120`, kept within `100..=1000`.
//! - `sample_buffer`: capacity of each sample channel.
mod adaptive;
mod controller;
mod pool;

pub use adaptive::AdaptiveExecutor;

#[cfg(feature = "internals")]
pub use controller::{Controller, Exit, RunState};
#[cfg(feature = "internals")]
pub use pool::{Completion, SlotId, StartQueue};

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::{aggregate::LoadResult, scenario::Scenario};

/// The runtime hook that executes a `Scenario`.
///
/// Implementations own the whole run: spawning, pacing, cancellation and
/// collection. They must return whatever samples were collected, even when
/// `cancel` fires before the run would have ended.
pub trait Executor<F, Fut, E>
where
    Self: Send + Sync + Sized,
    F: Fn(CancellationToken) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    type Error;

    /// Execute the scenario until the run ends or `cancel` fires.
    fn exec(
        &self,
        scenario: &Scenario<F>,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<LoadResult<E>, Self::Error>> + Send;
}

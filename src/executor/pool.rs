//! Worker pool: a fixed arena of reusable slots executing start signals.
//!
//! Start signals are permits on a [`Semaphore`], exactly one permit per
//! scenario invocation. The controller adds them without ever blocking, the
//! pool manager and the workers consume them. A worker that finishes an
//! invocation first tries to grab another queued permit and keeps its slot
//! if it gets one, so a busy pool does not churn tasks.
//!
//! Slots are plain ids circulating through a bounded channel used as a free
//! list. A [`SlotLease`] puts its id back on drop, which also covers a worker
//! whose scenario panicked.
use std::{future::Future, sync::Arc};

use tokio::{
    sync::{mpsc, Semaphore},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use crate::{aggregate::SampleSink, metric::Sample};

pub type SlotId = usize;

/// Sent to the controller once per finished invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub slot: SlotId,
}

/// Bounded queue of start signals.
#[derive(Debug, Clone)]
pub struct StartQueue {
    tokens: Arc<Semaphore>,
    capacity: usize,
}

impl StartQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            tokens: Arc::new(Semaphore::new(0)),
            capacity,
        }
    }

    /// Queue one start signal. Never waits: returns `false` when the queue is
    /// full or closed and the signal is dropped.
    pub fn try_start(&self) -> bool {
        if self.tokens.is_closed() || self.tokens.available_permits() >= self.capacity {
            return false;
        }
        self.tokens.add_permits(1);
        true
    }

    /// Withdraw a start signal nobody has claimed yet.
    pub fn try_revoke(&self) -> bool {
        self.try_next()
    }

    /// Claim a queued start signal without waiting.
    pub fn try_next(&self) -> bool {
        match self.tokens.try_acquire() {
            Ok(permit) => {
                // The controller alone decides how many permits exist
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Wait for a start signal. `false` once the queue is closed.
    pub async fn next(&self) -> bool {
        match self.tokens.acquire().await {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Stop accepting signals and discard the ones still queued.
    pub fn close(&self) {
        self.tokens.close();
    }

    pub fn is_closed(&self) -> bool {
        self.tokens.is_closed()
    }

    /// Signals waiting to be claimed.
    pub fn pending(&self) -> usize {
        self.tokens.available_permits()
    }
}

/// Ownership of one slot. Returns the id to the free list when dropped.
pub(crate) struct SlotLease {
    id: SlotId,
    free: mpsc::Sender<SlotId>,
}

impl SlotLease {
    pub(crate) fn id(&self) -> SlotId {
        self.id
    }
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        // The free list holds one place per slot, so this only fails once the
        // pool manager itself is gone.
        if self.free.try_send(self.id).is_err() {
            tracing::debug!("Slot {} returned after the pool shut down.", self.id);
        }
    }
}

/// Reports an invocation as finished when dropped, panics included.
struct InFlight<'a> {
    slot: SlotId,
    done: &'a mpsc::UnboundedSender<Completion>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // The controller stops listening once the run is over
        if self.done.send(Completion { slot: self.slot }).is_err() {
            tracing::debug!("Slot {} finished after the controller exited.", self.slot);
        }
    }
}

/// What every worker needs, cloned into each task.
pub(crate) struct WorkerContext<F, E> {
    pub(crate) action: F,
    pub(crate) cancel: CancellationToken,
    pub(crate) starts: StartQueue,
    pub(crate) done: mpsc::UnboundedSender<Completion>,
    pub(crate) sink: SampleSink<E>,
}

impl<F: Clone, E> Clone for WorkerContext<F, E> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            cancel: self.cancel.clone(),
            starts: self.starts.clone(),
            done: self.done.clone(),
            sink: self.sink.clone(),
        }
    }
}

/// Run the scenario once per start signal for as long as signals are queued,
/// then give the slot back.
pub(crate) async fn worker_task<F, Fut, E>(slot: SlotLease, ctx: WorkerContext<F, E>)
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    let id = slot.id();
    tracing::debug!("Worker {id} started.");
    let mut invocations = 0u64;

    loop {
        let in_flight = InFlight {
            slot: id,
            done: &ctx.done,
        };
        let started = Instant::now();
        let outcome = (ctx.action)(ctx.cancel.clone()).await;
        ctx.sink
            .record(Sample::from_outcome(started.elapsed(), outcome))
            .await;
        // sample first, completion second
        drop(in_flight);
        invocations += 1;

        if !ctx.starts.try_next() {
            break;
        }
    }

    tracing::debug!("Worker {id} returning slot after {invocations} invocations.");
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub workers_spawned: usize,
}

/// Hands free slots to new workers as start signals arrive and waits for
/// every slot to come home once the start queue closes.
pub(crate) struct WorkerPool<F, E> {
    max_workers: usize,
    free_tx: mpsc::Sender<SlotId>,
    free_rx: mpsc::Receiver<SlotId>,
    ctx: WorkerContext<F, E>,
}

impl<F, Fut, E> WorkerPool<F, E>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(max_workers: usize, ctx: WorkerContext<F, E>) -> Self {
        let (free_tx, free_rx) = mpsc::channel(max_workers);
        for id in 0..max_workers {
            // capacity == max_workers, cannot fail
            let _ = free_tx.try_send(id);
        }
        Self {
            max_workers,
            free_tx,
            free_rx,
            ctx,
        }
    }

    /// Returns once the start queue is closed and every slot is idle again.
    pub(crate) async fn run(self) -> PoolStats {
        let Self {
            max_workers,
            free_tx,
            mut free_rx,
            ctx,
        } = self;
        let mut stats = PoolStats::default();
        tracing::debug!("Worker pool ready with {max_workers} slots.");

        while ctx.starts.next().await {
            let Some(id) = free_rx.recv().await else {
                break;
            };
            if ctx.starts.is_closed() {
                // Run ended while we waited for a slot
                let _ = free_tx.try_send(id);
                break;
            }
            let lease = SlotLease {
                id,
                free: free_tx.clone(),
            };
            stats.workers_spawned += 1;
            tokio::spawn(worker_task(lease, ctx.clone()));
        }

        tracing::info!("Start queue closed, waiting for workers to drain...");
        // Our copies of the done and sample senders must not outlive the run
        drop(ctx);
        drop(free_tx);

        let mut idle = 0;
        while idle < max_workers {
            match free_rx.recv().await {
                Some(_) => idle += 1,
                None => break,
            }
        }
        tracing::info!(
            "Worker pool drained ({} workers spawned).",
            stats.workers_spawned
        );
        stats
    }
}

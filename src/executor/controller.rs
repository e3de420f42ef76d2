//! Controller: the single owner of the live worker count.
//!
//! Every `tick` the controller samples the profile for a new target. Between
//! ticks it listens for completions so finished invocations are replaced
//! straight away. After either event it reconciles:
//!
//! - below target, it queues `target - current` start signals. Queueing never
//!   waits; a signal that does not fit is dropped and retried on the next
//!   reconciliation.
//! - above target, it retires `current - target` workers. A start signal
//!   still sitting in the queue is simply withdrawn. Otherwise it waits up to
//!   `stop_timeout` for a completion and, if none comes, decrements anyway
//!   and logs a warning.
//!
//! The optimistic decrement means a wedged worker that finishes late is
//! counted twice, so the live count can briefly sit below what is really in
//! flight. That inaccuracy is bounded by the number of timed-out stops and
//! keeps the loop from ever waiting on a slow scenario.
//!
//! The loop exits at the run deadline or when the run token is cancelled,
//! whichever comes first, and closes the start queue on its way out. It does
//! not touch invocations in flight; draining them is the pool's job.
use std::time::Duration;

use tokio::{
    sync::mpsc,
    time::{sleep_until, timeout, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use super::pool::{Completion, StartQueue};
use crate::profile::ConcurrencyProfile;

/// Why the controller stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The profile's total duration elapsed.
    Expired,
    /// The run token was cancelled.
    Cancelled,
}

/// Controller-owned view of one run. Nothing else writes to it.
#[derive(Debug, Clone)]
pub struct RunState {
    pub started: Instant,
    pub deadline: Instant,
    /// Start signals issued and not yet accounted for by a completion,
    /// withdrawal or stop timeout.
    pub current: usize,
    /// Profile value at the last tick.
    pub target: usize,
    pub ticks: u64,
    pub starts_issued: u64,
    pub starts_dropped: u64,
    pub stops_revoked: u64,
    pub stop_timeouts: u64,
    pub exit: Option<Exit>,
}

impl RunState {
    fn new(total: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started + total,
            current: 0,
            target: 0,
            ticks: 0,
            starts_issued: 0,
            starts_dropped: 0,
            stops_revoked: 0,
            stop_timeouts: 0,
            exit: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn retire_one(&mut self) {
        self.current = self.current.saturating_sub(1);
    }
}

pub struct Controller<P> {
    profile: P,
    tick: Duration,
    stop_timeout: Duration,
    starts: StartQueue,
    done: mpsc::UnboundedReceiver<Completion>,
    cancel: CancellationToken,
}

impl<P: ConcurrencyProfile> Controller<P> {
    pub fn new(
        profile: P,
        tick: Duration,
        stop_timeout: Duration,
        starts: StartQueue,
        done: mpsc::UnboundedReceiver<Completion>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            profile,
            tick,
            stop_timeout,
            starts,
            done,
            cancel,
        }
    }

    /// Drive the run to its end and return the final state.
    pub async fn run(mut self) -> RunState {
        let mut state = RunState::new(self.profile.total_duration());
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let deadline = sleep_until(state.deadline);
        tokio::pin!(deadline);

        tracing::debug!("Controller started.");
        let exit = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break Exit::Cancelled,
                _ = &mut deadline => break Exit::Expired,
                _ = ticker.tick() => {
                    state.ticks += 1;
                    state.target = self.profile.concurrency(state.elapsed());
                    tracing::debug!(
                        "Tick {}: target {}, current {}, {} queued",
                        state.ticks,
                        state.target,
                        state.current,
                        self.starts.pending()
                    );
                }
                Some(done) = self.done.recv() => {
                    tracing::trace!("Slot {} finished an invocation.", done.slot);
                    state.retire_one();
                }
            }

            if let Some(exit) = self.reconcile(&mut state).await {
                break exit;
            }
        };

        self.starts.close();
        state.exit = Some(exit);
        tracing::info!(
            "Controller stopped ({exit:?}) after {:?}, entering drain.",
            state.elapsed()
        );
        state
    }

    /// Bring `current` toward `target`. Issues at most
    /// `|target - current|` start or stop operations.
    async fn reconcile(&mut self, state: &mut RunState) -> Option<Exit> {
        if state.current < state.target {
            let wanted = state.target - state.current;
            for issued in 0..wanted {
                if !self.starts.try_start() {
                    state.starts_dropped += (wanted - issued) as u64;
                    break;
                }
                state.current += 1;
                state.starts_issued += 1;
            }
        } else if state.current > state.target {
            let excess = state.current - state.target;
            for _ in 0..excess {
                if self.starts.try_revoke() {
                    state.retire_one();
                    state.stops_revoked += 1;
                    continue;
                }

                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Some(Exit::Cancelled),
                    _ = sleep_until(state.deadline) => return Some(Exit::Expired),
                    finished = timeout(self.stop_timeout, self.done.recv()) => {
                        if finished.is_err() {
                            state.stop_timeouts += 1;
                            tracing::warn!(
                                "No worker finished within {:?} of a stop request, retiring one optimistically.",
                                self.stop_timeout
                            );
                        }
                        state.retire_one();
                    }
                }
            }
        }
        None
    }
}

use std::time::Duration;

/// One observation: how long a single scenario invocation took and, if it
/// failed, the error it returned.
///
/// Produced by exactly one worker and consumed once by the aggregator.
/// Samples from different workers arrive in no particular order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<E> {
    pub latency: Duration,
    pub error: Option<E>,
}

impl<E> Sample<E> {
    /// Build a sample from the outcome of an invocation.
    pub fn from_outcome(latency: Duration, outcome: Result<(), E>) -> Self {
        Self {
            latency,
            error: outcome.err(),
        }
    }
}

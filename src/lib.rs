//! Onda: adaptive load generation for Rust.
//!
//! Onda drives a caller-supplied async operation (a *scenario*) at a target
//! concurrency that changes over time, and hands back the latency of every
//! invocation together with the errors it produced. Analysis of those samples
//! (percentiles, throughput, pass/fail rules) is left to the caller.
//!
//! # Architecture
//!
//! - [`profile`]: pure functions from elapsed time to target concurrency
//!   (constant, ramp-up, spike, wave, step). Validated at construction.
//! - [`Scenario`]: the action under load, receiving the run's
//!   [`CancellationToken`].
//! - [`Executor`]: runs a scenario. [`AdaptiveExecutor`] pairs a ticking
//!   controller with a bounded pool of reusable workers and keeps the number of
//!   in-flight invocations converging on the profile.
//! - [`Sample`] and [`LoadResult`]: what a run observes and returns.
//!
//! # Guarantees
//!
//! - The live count tracks the profile within one tick (100 ms by default).
//!   It is not exact at every instant.
//! - At most `max_workers` invocations run at once, whatever the profile asks
//!   for.
//! - A run ends at the profile's total duration or when the caller's token is
//!   cancelled. Either way the samples collected so far are returned.
//! - A scenario error is just a sample; it never stops the run.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use onda::{profile::Wave, run_load};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let profile = Wave::new(5, 50, Duration::from_secs(60), 3.0)?;
//!     let result = run_load(CancellationToken::new(), profile, |cancel: CancellationToken| async move {
//!         tokio::select! {
//!             _ = cancel.cancelled() => Err("cancelled"),
//!             _ = tokio::time::sleep(Duration::from_millis(20)) => Ok(()),
//!         }
//!     })
//!     .await?;
//!
//!     println!("{} invocations, {} errors", result.invocations(), result.errors.len());
//!     Ok(())
//! }
//! ```
//!
//! # Feature flags
//! - `internals`: expose the controller and pool building blocks
//!   (unstable).
use std::future::Future;

pub use tokio_util::sync::CancellationToken;

/// Sample collection
pub mod aggregate;
/// Configuration and run errors
pub mod error;
/// Orchestrators that define how things will actually run
pub mod executor;
/// Single observations
pub mod metric;
/// Target concurrency over time
pub mod profile;
/// The operation under load
pub mod scenario;

pub use aggregate::LoadResult;
pub use error::{ConfigurationError, LoadError};
pub use executor::{AdaptiveExecutor, Executor};
pub use metric::Sample;
pub use profile::{build_profile, ConcurrencyProfile, LoadProfile, ProfileConfig};
pub use scenario::Scenario;

/// Run `action` against `profile` with default executor settings.
///
/// Returns once the profile's duration has elapsed or `cancel` fired, and
/// every invocation still in flight at that point has finished.
pub async fn run_load<P, F, Fut, E>(
    cancel: CancellationToken,
    profile: P,
    action: F,
) -> Result<LoadResult<E>, LoadError>
where
    P: ConcurrencyProfile + Clone + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Send + 'static,
{
    let scenario = Scenario::builder().name("load").action(action).build();
    AdaptiveExecutor::builder()
        .profile(profile)
        .build()
        .exec(&scenario, cancel)
        .await
}

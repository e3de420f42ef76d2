use typed_builder::TypedBuilder;

/// The operation under load, plus a name for logs.
///
/// `action` is invoked once per start signal with the run's
/// [`CancellationToken`](tokio_util::sync::CancellationToken). It must observe
/// that token itself: the engine never interrupts an invocation, so a scenario
/// that ignores cancellation holds up shutdown for as long as it keeps running.
/// Retries, idempotence and any per-invocation state are the scenario's
/// business.
///
/// ```rust
/// use onda::Scenario;
/// use tokio_util::sync::CancellationToken;
///
/// let scenario = Scenario::builder()
///     .name("noop")
///     .action(|_cancel: CancellationToken| async { Ok::<(), std::io::Error>(()) })
///     .build();
/// assert_eq!(scenario.name, "noop");
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct Scenario<F> {
    #[builder(setter(into))]
    pub name: String,
    pub action: F,
}

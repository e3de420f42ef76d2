use std::time::Duration;

use onda::{
    executor::AdaptiveExecutor, profile::Wave, CancellationToken, Executor, LoadResult, Scenario,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Ctrl-C ends the run early, samples collected so far are still returned
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let result: LoadResult<String> = AdaptiveExecutor::builder()
        // 5 to 40 concurrent invocations, three full cycles over 30 seconds
        .profile(Wave::new(5, 40, Duration::from_secs(30), 3.0).unwrap())
        .build()
        .exec(
            &Scenario::builder()
                .name("Sleepy backend")
                .action(|cancel: CancellationToken| async move {
                    tokio::select! {
                        _ = cancel.cancelled() => Err("cancelled".to_string()),
                        _ = tokio::time::sleep(Duration::from_millis(25)) => Ok(()),
                    }
                })
                .build(),
            cancel,
        )
        .await
        .unwrap();

    // Statistics are up to the caller, keep it simple here
    let mut latencies = result.latencies;
    latencies.sort();
    let p99 = latencies
        .get(latencies.len().saturating_sub(1) * 99 / 100)
        .copied()
        .unwrap_or_default();
    println!(
        "{} invocations, {} errors, p99 {:?}",
        latencies.len(),
        result.errors.len(),
        p99
    );
}

use anyhow::{anyhow, Context, Result};
use klotho::{init_tracing, run_all, Console, DemoConfig};

fn main() -> Result<()> {
    let config = DemoConfig::default();
    init_tracing(&config.log_filter)
        .map_err(|e| anyhow!(e))
        .context("Failed to initialize logging")?;

    tracing::info!(
        workers = config.executor.worker_threads,
        shutdown_timeout = ?config.shutdown_timeout,
        "klotho demo starting"
    );

    let report = run_all(&Console::stdio(), &config).context("Demo run failed")?;

    tracing::info!(
        value = report.concurrency.value,
        outcome = ?report.concurrency.shutdown.outcome,
        "klotho demo finished"
    );
    Ok(())
}

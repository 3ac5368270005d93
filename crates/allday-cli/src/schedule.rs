//! Recurring crawl on a cron schedule.

use std::sync::Arc;

use allday_core::AppConfig;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::crawl::{run_crawl, CrawlOptions};

/// Builds and starts the scheduler with the crawl job registered.
///
/// The returned handle must be kept alive; dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is invalid, or the scheduler fails to start.
pub(crate) async fn build_scheduler(
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_crawl_job(&scheduler, pool, config).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the crawl job on `config.schedule_cron`.
///
/// Runs never overlap: a tick that fires while the previous crawl is still
/// going is skipped.
async fn register_crawl_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let running = Arc::new(Mutex::new(()));
    let cron = config.schedule_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);
        let running = Arc::clone(&running);

        Box::pin(async move {
            let Ok(_guard) = running.try_lock() else {
                tracing::warn!("scheduler: previous crawl still running; skipping this tick");
                return;
            };
            tracing::info!("scheduler: starting crawl run");
            let options = CrawlOptions {
                full_refresh: false,
                category: None,
                trigger_source: "scheduler",
            };
            match run_crawl(&pool, &config, &options).await {
                Ok(report) => tracing::info!(
                    new_products = report.new_products,
                    updated_products = report.updated_products,
                    coupons = report.coupons_collected,
                    partial = report.is_partial(),
                    "scheduler: crawl run complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: crawl run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: crawl job registered");
    Ok(())
}

/// Start the scheduler and block until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the scheduler cannot be built or shut down, or the
/// signal handler cannot be installed.
pub(crate) async fn run_scheduler(pool: PgPool, config: Arc<AppConfig>) -> anyhow::Result<()> {
    let mut scheduler = build_scheduler(pool, config).await?;
    tokio::signal::ctrl_c().await?;
    tracing::info!("scheduler: shutting down");
    scheduler.shutdown().await?;
    Ok(())
}

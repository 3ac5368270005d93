mod crawl;
mod schedule;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "allday")]
#[command(about = "Ranking catalog crawler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the ranking categories, reconcile the catalog and collect coupons
    Crawl {
        /// Overwrite catalog metadata of known products
        #[arg(long)]
        full_refresh: bool,

        /// Restrict the crawl to one category (by name)
        #[arg(long)]
        category: Option<String>,

        /// Collect and parse listings without writing to the database
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deactivate coupons whose expiry has passed
    Sweep,
    /// Show catalog totals and recent crawl runs
    Stats {
        /// Number of recent runs to list
        #[arg(long, default_value_t = 5)]
        runs: i64,
    },
    /// Show the latest recorded price of a product
    Price {
        /// Site product id (the `goodsNo` value)
        external_id: String,
    },
    /// Run the crawl on the configured cron schedule until interrupted
    Schedule,
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = allday_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("allday: no command given; see --help");
        return Ok(());
    };

    // Dry runs never open a database connection.
    if let Commands::Crawl {
        dry_run: true,
        full_refresh,
        ref category,
        json,
    } = command
    {
        let report = crawl::run_dry_run(&config, category.as_deref(), full_refresh).await?;
        crawl::print_report(&report, json)?;
        return Ok(());
    }

    let pool_config = allday_db::PoolConfig::from_app_config(&config);
    let pool = allday_db::connect_pool(config.require_database_url()?, pool_config).await?;

    match command {
        Commands::Crawl {
            full_refresh,
            category,
            json,
            ..
        } => {
            let options = crawl::CrawlOptions {
                full_refresh,
                category,
                trigger_source: "cli",
            };
            let report = crawl::run_crawl(&pool, &config, &options).await?;
            crawl::print_report(&report, json)?;
        }
        Commands::Sweep => crawl::run_sweep(&pool).await?,
        Commands::Stats { runs } => crawl::run_stats(&pool, runs).await?,
        Commands::Price { external_id } => crawl::run_price(&pool, &external_id).await?,
        Commands::Schedule => {
            allday_db::run_migrations(&pool).await?;
            schedule::run_scheduler(pool, Arc::new(config)).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                allday_db::ping(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = allday_db::run_migrations(&pool).await?;
                println!("migrations applied: {applied}");
            }
        },
    }

    Ok(())
}

/// Mark a run as failed, logging rather than propagating a failure to do so.
pub(crate) async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = allday_db::fail_crawl_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark crawl run as failed"
        );
    }
}

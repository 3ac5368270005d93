//! Crawl, sweep and reporting command handlers.
//!
//! Called from `main` once config (and, except for dry runs, the database
//! pool) is established.

use std::time::Duration;

use allday_core::{AppConfig, CatalogStore, CategoryConfig, SyncMode};
use allday_db::{CrawlRunCounts, PgCatalogStore};
use allday_scraper::HttpPageClient;
use allday_sync::{CrawlPipeline, CrawlReport, CrawlSettings, ExpirationSweeper};

use crate::fail_run_best_effort;

#[derive(Debug, Clone)]
pub(crate) struct CrawlOptions {
    pub full_refresh: bool,
    pub category: Option<String>,
    /// `cli` or `scheduler`, recorded on the crawl run.
    pub trigger_source: &'static str,
}

/// Load the category table, optionally narrowed to one category.
fn load_categories(
    config: &AppConfig,
    category_filter: Option<&str>,
) -> anyhow::Result<Vec<CategoryConfig>> {
    let file = allday_core::load_categories(&config.categories_path)?;
    match category_filter {
        Some(name) => {
            let category = file.only(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "category '{name}' not found in {}",
                    config.categories_path.display()
                )
            })?;
            Ok(vec![category])
        }
        None => Ok(file.categories),
    }
}

fn crawl_settings(config: &AppConfig, full_refresh: bool) -> CrawlSettings {
    let mut settings = CrawlSettings::from_app_config(config);
    if full_refresh {
        settings.mode = SyncMode::FullRefresh;
    }
    settings
}

fn page_client(config: &AppConfig) -> anyhow::Result<HttpPageClient> {
    Ok(HttpPageClient::new(
        &config.user_agent,
        Duration::from_secs(config.navigation_timeout_secs),
    )?)
}

fn count(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn run_counts(report: &CrawlReport) -> CrawlRunCounts {
    CrawlRunCounts {
        products_collected: count(report.products_collected),
        new_products: count(report.new_products),
        updated_products: count(report.updated_products),
        coupons_collected: count(report.coupons_collected),
        coupons_deactivated: i32::try_from(report.coupons_deactivated).unwrap_or(i32::MAX),
        persistence_failures: count(report.persistence_failures),
    }
}

/// Run a full crawl and record it as a crawl run.
///
/// # Errors
///
/// Returns an error if the category table cannot be loaded, the crawl run
/// cannot be created or started, or the run aborts during warm-up. Per-page,
/// per-record and per-brand failures are part of the returned report.
pub(crate) async fn run_crawl(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    options: &CrawlOptions,
) -> anyhow::Result<CrawlReport> {
    let categories = load_categories(config, options.category.as_deref())?;
    let settings = crawl_settings(config, options.full_refresh);
    let mut client = page_client(config)?;

    let run =
        allday_db::create_crawl_run(pool, &settings.mode.to_string(), options.trigger_source)
            .await?;
    if let Err(e) = allday_db::start_crawl_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }
    tracing::info!(
        run_id = run.id,
        public_id = %run.public_id,
        mode = %settings.mode,
        trigger = options.trigger_source,
        "crawl run started"
    );

    let store = PgCatalogStore::new(pool.clone());
    let report = match CrawlPipeline::new(&mut client, &store, &settings)
        .run(&categories)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
            return Err(e.into());
        }
    };

    if let Err(e) = allday_db::complete_crawl_run(pool, run.id, run_counts(&report)).await {
        fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }
    Ok(report)
}

/// Collect and parse listings only; nothing is written anywhere.
///
/// # Errors
///
/// Returns an error if the category table cannot be loaded or the session
/// cannot be established.
pub(crate) async fn run_dry_run(
    config: &AppConfig,
    category_filter: Option<&str>,
    full_refresh: bool,
) -> anyhow::Result<CrawlReport> {
    let categories = load_categories(config, category_filter)?;
    let settings = crawl_settings(config, full_refresh);
    let mut client = page_client(config)?;
    Ok(allday_sync::dry_run(&mut client, &settings, &categories).await?)
}

pub(crate) fn print_report(report: &CrawlReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

pub(crate) async fn run_sweep(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let store = PgCatalogStore::new(pool.clone());
    let deactivated = ExpirationSweeper::new(&store)
        .sweep(chrono::Utc::now())
        .await?;
    println!("coupons deactivated: {deactivated}");
    Ok(())
}

pub(crate) async fn run_stats(pool: &sqlx::PgPool, recent_runs: i64) -> anyhow::Result<()> {
    let stats = allday_db::catalog_stats(pool).await?;
    println!("catalog products: {}", stats.total_products);
    println!("active coupons:   {}", stats.active_coupons);

    let runs = allday_db::list_crawl_runs(pool, recent_runs).await?;
    if runs.is_empty() {
        println!("no crawl runs recorded");
        return Ok(());
    }
    println!("recent crawl runs:");
    for run in &runs {
        println!(
            "  #{:<5} {:<10} {:<12} {:<9} new={} updated={} coupons={} failures={} created={}",
            run.id,
            run.status,
            run.mode,
            run.trigger_source,
            run.new_products,
            run.updated_products,
            run.coupons_collected,
            run.persistence_failures,
            run.created_at.format("%Y-%m-%d %H:%M"),
        );
        if let Some(message) = &run.error_message {
            println!("         error: {message}");
        }
    }
    Ok(())
}

pub(crate) async fn run_price(pool: &sqlx::PgPool, external_id: &str) -> anyhow::Result<()> {
    let store = PgCatalogStore::new(pool.clone());
    let entry = store
        .find_by_external_id(external_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product '{external_id}' is not in the catalog"))?;

    println!("{} / {} ({})", entry.brand, entry.name, entry.category);
    match store.latest_price(entry.id).await? {
        Some(obs) if obs.is_on_sale => println!(
            "price: {} (was {}, -{}%) at {}",
            obs.price, obs.original_price, obs.discount_rate, obs.recorded_at
        ),
        Some(obs) => println!("price: {} at {}", obs.price, obs.recorded_at),
        None => println!("no price observations recorded"),
    }
    Ok(())
}

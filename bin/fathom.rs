use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use fathom::{
    db::models::{PriceSnapshot, TokenPrice},
    Database, PriceEngine, Settings,
};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    // Load configuration
    let settings = Arc::new(
        Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    );

    let db = Database::new(settings.clone())
        .await
        .context("Failed to initialize database connections")?;

    return run_pricing(settings, db).await;
}

/// One pricing run: load the snapshot and the anchor, iterate to a price
/// set, persist it. Scheduling belongs to the caller; this process runs the
/// computation exactly once and exits non-zero on any fatal condition.
async fn run_pricing(settings: Arc<Settings>, db: Database) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // Anchor first: nothing else is meaningful without it
    let anchor_token = settings.pricing.anchor_token.to_lowercase();
    let anchor_price_usd = db.postgres.get_anchor_price(&anchor_token).await?;
    info!("Anchor {} priced at ${:.2}", anchor_token, anchor_price_usd);

    let pools = db
        .postgres
        .get_pool_snapshot()
        .await
        .context("Failed to load pool snapshot")?;
    let prior_prices = db
        .postgres
        .get_latest_prices()
        .await
        .context("Failed to load prior price history")?;
    info!(
        "Loaded {} constant-product pools and {} carried-forward prices",
        pools.len(),
        prior_prices.len()
    );

    let engine = PriceEngine::new(
        anchor_token,
        settings.pricing.max_iterations,
        settings.pricing.convergence_tolerance_percent / 100.0,
    );
    let run = engine.run(&pools, anchor_price_usd, &prior_prices)?;

    if run.converged {
        info!(
            "Converged after {} iterations ({:.4}% average change)",
            run.iterations, run.final_convergence_percent
        );
    } else {
        warn!(
            "Iteration cap ({}) reached without convergence ({:.4}% average change); \
             persisting best-effort prices",
            run.iterations, run.final_convergence_percent
        );
    }

    // Persist: append-only history first, then the relational latest table
    let calculated_at = time::OffsetDateTime::now_utc();
    let snapshots: Vec<PriceSnapshot> = run
        .prices
        .iter()
        .map(|(token, &usd_price)| {
            PriceSnapshot::new(
                token.clone(),
                usd_price,
                run.anchor_price_usd,
                run.iterations,
                run.final_convergence_percent,
                calculated_at,
            )
        })
        .collect();
    db.clickhouse
        .insert_price_snapshots(&snapshots)
        .await
        .context("Failed to persist price history")?;

    let latest: Vec<TokenPrice> = run
        .prices
        .iter()
        .map(|(token, &usd_price)| {
            TokenPrice::new(token.clone(), usd_price, run.anchor_price_usd)
        })
        .collect();
    let written = db
        .postgres
        .upsert_token_prices(&latest)
        .await
        .context("Failed to update latest prices")?;

    info!(
        "Priced {} tokens in {:?} ({} latest rows written)",
        run.prices.len(),
        start.elapsed(),
        written
    );
    Ok(())
}

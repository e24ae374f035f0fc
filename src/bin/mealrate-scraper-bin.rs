use mealrate_rs::config::{StoreConfig, UpstreamConfig};
use mealrate_rs::constants::{DEFAULT_DB, NUTRISLICE_BASE};
use mealrate_rs::data_types::{parse_iso_date, Hall, Meal};
use mealrate_rs::db_operations::MenuDb;
use mealrate_rs::menu_fetcher::MenuFetcher;
use mealrate_rs::shared_main::logger_init;
use mealrate_rs::task_scheduler_funcs::{all_targets, run_scrapes, start_scrape_schedule};

use anyhow::bail;
use clap::Parser;
use std::sync::Arc;

/// Scrapes dining hall menus into the local rating store.
/// {n}Without --hall/--meal every hall and meal is scraped.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// SQLite file holding dishes, offers and ratings
    #[arg(long, env = "MEALRATE_DB", default_value = DEFAULT_DB)]
    db: String,
    /// Base URL of the menu API
    #[arg(long, env = "MEALRATE_API_BASE", default_value = NUTRISLICE_BASE)]
    api_base: String,
    /// Only this hall (feast, gather, open-kitchen)
    #[arg(long)]
    hall: Option<Hall>,
    /// Only this meal (breakfast, lunch, dinner)
    #[arg(long)]
    meal: Option<Meal>,
    /// Menu date as YYYY-MM-DD{n}[default: today]
    #[arg(long)]
    date: Option<String>,
    /// Scrape every hall and meal, ignoring --hall and --meal
    #[arg(long)]
    all: bool,
    /// Scrape a raw menu API URL instead; hall, meal and date are read from its path
    #[arg(long)]
    url: Vec<String>,
    /// Keep running and scrape every hall and meal for the current day on this schedule{n}Example: '0 0 5 * * *'
    #[arg(long, env = "MEALRATE_CRON")]
    cron: Option<String>,
    /// Log the raw upstream JSON
    #[arg(long)]
    dump_json: bool,
    /// Enable verbose logging (mostly performance metrics){n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose || args.dump_json {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());
    log::info!("Starting scraper...");

    let db = MenuDb::new(StoreConfig::new(&args.db));
    db.check_or_create_db_tables()?;
    let db = Arc::new(db);

    let fetcher = Arc::new(MenuFetcher::new(UpstreamConfig {
        base_url: args.api_base,
        dump_json: args.dump_json,
    }));

    if !args.url.is_empty() {
        let mut failed = 0;
        for url in &args.url {
            let saved = match fetcher.scrape_url(url).await {
                Ok(blocks) => db.save_station_blocks(&blocks).map_err(anyhow::Error::from),
                Err(err) => Err(err.into()),
            };
            if let Err(err) = saved {
                failed += 1;
                log::error!("{} failed: {}", url, err);
            }
        }

        if failed > 0 {
            bail!("{} of {} URLs failed", failed, args.url.len());
        }
        return Ok(());
    }

    let date = match args.date.as_deref() {
        Some(date) => parse_iso_date(date)?,
        None => chrono::Local::now().date_naive(),
    };

    let targets: Vec<(Hall, Meal)> = all_targets()
        .into_iter()
        .filter(|(hall, meal)| {
            args.all || (args.hall.map_or(true, |h| h == *hall) && args.meal.map_or(true, |m| m == *meal))
        })
        .collect();

    let total = targets.len();
    let failed = run_scrapes(fetcher.clone(), db.clone(), targets, date).await;

    match args.cron {
        Some(cron) => {
            let _sched = start_scrape_schedule(&cron, fetcher, db).await?;
            std::future::pending::<()>().await;
            Ok(())
        }
        None if failed > 0 => bail!("{} of {} scrapes failed", failed, total),
        None => Ok(()),
    }
}

use std::{sync::Arc, time::Instant};

use chrono::NaiveDate;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    data_types::{rating_data_types::SaveSummary, Hall, Meal},
    db_operations::MenuDb,
    errors::ScrapeError,
    menu_fetcher::MenuFetcher,
};

/// Every hall with every meal.
pub fn all_targets() -> Vec<(Hall, Meal)> {
    Hall::ALL
        .into_iter()
        .flat_map(|hall| Meal::ALL.into_iter().map(move |meal| (hall, meal)))
        .collect()
}

pub async fn scrape_and_save(
    fetcher: &MenuFetcher,
    db: &MenuDb,
    hall: Hall,
    meal: Meal,
    date: NaiveDate,
) -> Result<SaveSummary, ScrapeError> {
    let blocks = fetcher.scrape_menu(hall, meal, date).await?;
    Ok(db.save_station_blocks(&blocks)?)
}

/// Scrapes each target in its own task. A failing target is logged and does
/// not stop the others; returns how many failed.
pub async fn run_scrapes(
    fetcher: Arc<MenuFetcher>,
    db: Arc<MenuDb>,
    targets: Vec<(Hall, Meal)>,
    date: NaiveDate,
) -> usize {
    let now = Instant::now();

    let handles: Vec<_> = targets
        .into_iter()
        .map(|(hall, meal)| {
            let fetcher = fetcher.clone();
            let db = db.clone();
            let handle = tokio::spawn(async move { scrape_and_save(&fetcher, &db, hall, meal, date).await });
            (hall, meal, handle)
        })
        .collect();

    let mut failed = 0;
    for (hall, meal, handle) in handles {
        match handle.await {
            Ok(Ok(summary)) => log::debug!("{} {} ({}): {:?}", hall, meal, date, summary),
            Ok(Err(err)) => {
                failed += 1;
                log::error!("{} {} ({}) failed: {}", hall, meal, date, err);
            }
            Err(err) => {
                failed += 1;
                log::error!("{} {} ({}) task panicked: {}", hall, meal, date, err);
            }
        }
    }

    log::info!("Scrape run for {} done, {} failed: {:.2?}", date, failed, now.elapsed());
    failed
}

/// Registers a job that scrapes every hall and meal for the current local date
/// on each `cron` tick (six fields, seconds first), and starts the scheduler.
pub async fn start_scrape_schedule(
    cron: &str,
    fetcher: Arc<MenuFetcher>,
    db: Arc<MenuDb>,
) -> anyhow::Result<JobScheduler> {
    let job = Job::new_async(cron, move |_uuid, mut _l| {
        let fetcher = fetcher.clone();
        let db = db.clone();

        Box::pin(async move {
            let today = chrono::Local::now().date_naive();
            run_scrapes(fetcher, db, all_targets(), today).await;
        })
    })?;

    let sched = JobScheduler::new().await?;
    sched.add(job).await?;
    sched.start().await?;
    log::info!("Scrape schedule started: {}", cron);

    Ok(sched)
}

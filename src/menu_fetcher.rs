use std::time::Instant;

use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::constants::endpoint_for;
use crate::data_backend::MenuNormalizer;
use crate::data_types::{
    menu_data_types::{Station, StationBlock},
    parse_iso_date, Hall, Meal,
};
use crate::errors::{FetchError, ScrapeError};
use crate::url_meta::extract_meta_from_url;

pub fn build_menu_url(base_url: &str, hall: Hall, meal: Meal, date: NaiveDate) -> String {
    let endpoint = endpoint_for(hall, meal);
    format!(
        "{}/{}/menu-type/{}/{}/",
        base_url.trim_end_matches('/'),
        endpoint.school,
        endpoint.menu_type,
        date.format("%Y/%m/%d")
    )
}

pub fn stations_to_blocks(hall: Hall, meal: Meal, date: &str, stations: Vec<Station>) -> Vec<StationBlock> {
    stations
        .into_iter()
        .map(|station| StationBlock::from_station(hall, meal, date, station))
        .collect()
}

pub struct MenuFetcher {
    client: reqwest::Client,
    upstream: UpstreamConfig,
    normalizer: MenuNormalizer,
}

impl MenuFetcher {
    pub fn new(upstream: UpstreamConfig) -> Self {
        MenuFetcher::with_normalizer(upstream, MenuNormalizer::default())
    }

    pub fn with_normalizer(upstream: UpstreamConfig, normalizer: MenuNormalizer) -> Self {
        MenuFetcher {
            client: reqwest::Client::new(),
            upstream,
            normalizer,
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, ScrapeError> {
        let now = Instant::now();
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from)?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            }
            .into());
        }

        let body = resp.text().await.map_err(FetchError::from)?;
        log::debug!("upstream response: {:.2?}", now.elapsed());

        let doc: Value = serde_json::from_str(&body)?;
        if self.upstream.dump_json {
            log::debug!("raw JSON for {}:\n{}", url, serde_json::to_string_pretty(&doc)?);
        }

        Ok(doc)
    }

    async fn scrape(&self, url: &str, hall: Hall, meal: Meal, date: &str) -> Result<Vec<StationBlock>, ScrapeError> {
        log::info!("Scraping {} {} ({})", hall, meal, date);
        let doc = self.fetch_json(url).await?;

        let now = Instant::now();
        let stations = self.normalizer.normalize(&doc, date);
        log::debug!("normalize: {:.2?}", now.elapsed());

        if stations.is_empty() {
            log::warn!("No menu available for {} {} ({})", hall, meal, date);
        } else {
            log::info!(
                "{} {} ({}): {} stations, {} dishes",
                hall,
                meal,
                date,
                stations.len(),
                stations.iter().map(|s| s.dishes.len()).sum::<usize>()
            );
        }

        Ok(stations_to_blocks(hall, meal, date, stations))
    }

    pub async fn scrape_menu(&self, hall: Hall, meal: Meal, date: NaiveDate) -> Result<Vec<StationBlock>, ScrapeError> {
        let url = build_menu_url(&self.upstream.base_url, hall, meal, date);
        let date = date.format("%Y-%m-%d").to_string();
        self.scrape(&url, hall, meal, &date).await
    }

    /// Scrapes an arbitrary upstream URL; hall, meal and date are read from its path.
    pub async fn scrape_url(&self, url: &str) -> Result<Vec<StationBlock>, ScrapeError> {
        let meta = extract_meta_from_url(url);
        let hall = meta.hall.ok_or(ScrapeError::UnknownMeta("hall"))?;
        let meal = meta.meal.ok_or(ScrapeError::UnknownMeta("meal"))?;
        let date = meta
            .date
            .filter(|date| parse_iso_date(date).is_ok())
            .ok_or(ScrapeError::UnknownMeta("date"))?;

        self.scrape(url, hall, meal, &date).await
    }
}

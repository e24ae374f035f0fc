use rusqlite::{params, params_from_iter, Connection, TransactionBehavior};
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    time::{Duration, Instant},
};

use crate::{
    config::StoreConfig,
    constants::DEFAULT_STATION,
    data_types::{
        menu_data_types::StationBlock,
        rating_data_types::{DishRecord, NewRating, OfferRow, RatingRow, SaveSummary},
    },
    errors::PersistenceError,
};

/// SQLite-backed store for dishes, offers and ratings.
///
/// Every call opens its own connection, so a `MenuDb` can be shared freely
/// between tasks and processes; concurrent writers rely on the unique offer
/// key and the busy timeout.
#[derive(Debug, Clone)]
pub struct MenuDb {
    config: StoreConfig,
}

impl MenuDb {
    pub fn new(config: StoreConfig) -> Self {
        MenuDb { config }
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.config.db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    pub fn check_or_create_db_tables(&self) -> Result<(), PersistenceError> {
        let conn = self.open()?;

        conn.execute_batch(
            "create table if not exists dishes (
                id integer not null primary key,
                name_raw text not null
            );

            create table if not exists offers (
                dish_id integer not null,
                hall text not null,
                station text not null,
                meal text not null,
                offer_date text not null,
                unique (hall, meal, offer_date, station, dish_id),
                foreign key (dish_id) references dishes(id)
            );

            create table if not exists ratings (
                dish_id integer not null,
                meal text not null,
                offer_date text not null,
                rating integer not null check (rating between 1 and 5),
                created_at text not null default (datetime('now'))
            );

            create index if not exists ratings_by_meal_date on ratings (meal, offer_date);",
        )?;

        Ok(())
    }

    /// Last write wins on `name_raw`.
    pub fn upsert_dishes(&self, dishes: &[DishRecord]) -> Result<usize, PersistenceError> {
        let mut conn = self.open().map_err(PersistenceError::Dishes)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(PersistenceError::Dishes)?;
        {
            let mut stmt = tx
                .prepare_cached(
                    "insert into dishes (id, name_raw) values (?1, ?2)
                        on conflict(id) do update set name_raw = excluded.name_raw",
                )
                .map_err(PersistenceError::Dishes)?;

            for dish in dishes {
                stmt.execute(params![dish.id, dish.name_raw])
                    .map_err(PersistenceError::Dishes)?;
            }
        }
        tx.commit().map_err(PersistenceError::Dishes)?;

        Ok(dishes.len())
    }

    /// Inserts offers in chunks, one transaction per chunk; rows already present are no-ops.
    ///
    /// Returns the number of rows actually inserted. On failure, earlier chunks stay committed.
    pub fn upsert_offers(&self, offers: &[OfferRow]) -> Result<usize, PersistenceError> {
        let mut committed = 0;
        let mut inserted = 0;

        let mut conn = self
            .open()
            .map_err(|source| PersistenceError::Offers { committed, source })?;

        for chunk in offers.chunks(self.config.chunk_size.max(1)) {
            let chunk_inserted = insert_offer_chunk(&mut conn, chunk)
                .map_err(|source| PersistenceError::Offers { committed, source })?;
            committed += chunk.len();
            inserted += chunk_inserted;
        }

        Ok(inserted)
    }

    /// Persists one scrape's station blocks.
    ///
    /// Dishes without an id (or with id 0) are shown upstream but cannot be offered, so they are skipped.
    pub fn save_station_blocks(&self, blocks: &[StationBlock]) -> Result<SaveSummary, PersistenceError> {
        let now = Instant::now();

        let mut dishes: Vec<DishRecord> = Vec::new();
        let mut seen_dishes: HashSet<i64> = HashSet::new();
        let mut offers: Vec<OfferRow> = Vec::new();
        let mut seen_offers: HashSet<OfferRow> = HashSet::new();
        let mut skipped = 0;

        for block in blocks {
            let station = match block.station.trim() {
                "" => DEFAULT_STATION,
                name => name,
            };

            for dish in &block.dishes {
                let Some(id) = dish.id.filter(|id| *id != 0) else {
                    skipped += 1;
                    continue;
                };

                if seen_dishes.insert(id) {
                    dishes.push(DishRecord {
                        id,
                        name_raw: dish.name.clone(),
                    });
                }

                let offer = OfferRow {
                    dish_id: id,
                    hall: block.hall.as_str().to_string(),
                    station: station.to_string(),
                    meal: block.meal.as_str().to_string(),
                    offer_date: block.date.clone(),
                };
                if seen_offers.insert(offer.clone()) {
                    offers.push(offer);
                }
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} dishes without an id", skipped);
        }

        let dishes_upserted = self.upsert_dishes(&dishes)?;
        let offers_inserted = self.upsert_offers(&offers)?;

        log::debug!("save_station_blocks: {:.2?}", now.elapsed());
        log::info!(
            "Saved {} dishes, {} offers ({} new)",
            dishes_upserted,
            offers.len(),
            offers_inserted
        );

        Ok(SaveSummary {
            dishes_upserted,
            offers_seen: offers.len(),
            offers_inserted,
        })
    }

    pub fn insert_rating(&self, rating: &NewRating) -> Result<(), PersistenceError> {
        let conn = self.open().map_err(PersistenceError::Rating)?;
        let mut stmt = conn
            .prepare_cached(
                "insert into ratings (dish_id, meal, offer_date, rating)
                    values (?1, ?2, ?3, ?4)",
            )
            .map_err(PersistenceError::Rating)?;

        stmt.execute(params![
            rating.dish_id,
            rating.meal.as_str(),
            rating.offer_date,
            rating.rating
        ])
        .map_err(PersistenceError::Rating)?;

        Ok(())
    }

    /// (hall, dish_id) for every offer of a meal on a date.
    pub fn get_offers_for_meal(&self, meal: &str, offer_date: &str) -> Result<Vec<(String, i64)>, PersistenceError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare_cached(
            "SELECT hall, dish_id FROM offers
                WHERE meal = ?1 AND offer_date = ?2
                ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map(params![meal, offer_date], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// (station, dish_id) for one hall's meal on a date, in insertion order.
    pub fn get_offers_for_hall(
        &self,
        hall: &str,
        meal: &str,
        offer_date: &str,
    ) -> Result<Vec<(String, i64)>, PersistenceError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare_cached(
            "SELECT station, dish_id FROM offers
                WHERE hall = ?1 AND meal = ?2 AND offer_date = ?3
                ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map(params![hall, meal, offer_date], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn get_dish_names(&self, ids: &BTreeSet<i64>) -> Result<BTreeMap<i64, String>, PersistenceError> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let conn = self.open()?;
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT id, name_raw FROM dishes WHERE id IN ({})",
            placeholders
        ))?;

        let names = stmt
            .query_map(params_from_iter(ids.iter()), |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        Ok(names)
    }

    pub fn get_ratings(&self, meal: &str, offer_date: &str) -> Result<Vec<RatingRow>, PersistenceError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare_cached(
            "SELECT dish_id, rating FROM ratings
                WHERE meal = ?1 AND offer_date = ?2",
        )?;

        let rows = stmt
            .query_map(params![meal, offer_date], |row| {
                Ok(RatingRow {
                    dish_id: row.get(0)?,
                    rating: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

fn insert_offer_chunk(conn: &mut Connection, chunk: &[OfferRow]) -> rusqlite::Result<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut inserted = 0;
    {
        let mut stmt = tx.prepare_cached(
            "insert into offers (dish_id, hall, station, meal, offer_date)
                values (?1, ?2, ?3, ?4, ?5)
                on conflict(hall, meal, offer_date, station, dish_id) do nothing",
        )?;

        for offer in chunk {
            inserted += stmt.execute(params![
                offer.dish_id,
                offer.hall,
                offer.station,
                offer.meal,
                offer.offer_date
            ])?;
        }
    }
    tx.commit()?;

    Ok(inserted)
}

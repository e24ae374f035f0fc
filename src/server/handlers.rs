//! Read and rating endpoints over the offer store.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::{
    constants::DEFAULT_STATION,
    data_types::{
        parse_iso_date,
        rating_data_types::{DishStats, GroupedDish, RatedDish, StationDishes},
        today_iso, Hall, Meal,
    },
    db_operations::MenuDb,
    errors::{PersistenceError, ValidationError},
    grouping::group_dishes,
    ratings::{compute_stats, dish_ids_by_hall, hall_averages, round2, RatingSubmission},
};

pub enum ApiError {
    BadRequest(String),
    Store(PersistenceError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Store(err) => {
                log::error!("store error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct MenuParams {
    pub hall: Option<String>,
    pub meal: Option<String>,
    pub date: Option<String>,
}

impl MenuParams {
    fn meal(&self) -> Result<Meal, ApiError> {
        match self.meal.as_deref().filter(|m| !m.trim().is_empty()) {
            Some(meal) => Ok(meal.parse()?),
            None => Err(ApiError::BadRequest("meal is required".to_string())),
        }
    }

    fn hall_and_meal(&self) -> Result<(Hall, Meal), ApiError> {
        let hall = self.hall.as_deref().filter(|h| !h.trim().is_empty());
        let meal = self.meal.as_deref().filter(|m| !m.trim().is_empty());
        match (hall, meal) {
            (Some(hall), Some(meal)) => Ok((hall.parse()?, meal.parse()?)),
            _ => Err(ApiError::BadRequest("hall and meal are required".to_string())),
        }
    }

    /// Defaults to today.
    fn date(&self) -> Result<String, ApiError> {
        match self.date.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(date) => Ok(parse_iso_date(date)?.format("%Y-%m-%d").to_string()),
            None => Ok(today_iso()),
        }
    }
}

/// One station's offers, each with its dish name and unrounded rating stats.
struct StationOffers {
    station: String,
    dishes: Vec<(i64, Option<String>, DishStats)>,
}

fn load_station_offers(db: &MenuDb, hall: Hall, meal: Meal, date: &str) -> Result<Vec<StationOffers>, PersistenceError> {
    let offers = db.get_offers_for_hall(hall.as_str(), meal.as_str(), date)?;
    let names = db.get_dish_names(&offers.iter().map(|(_, id)| *id).collect())?;
    let per_dish = compute_stats(&db.get_ratings(meal.as_str(), date)?);

    let mut stations: Vec<StationOffers> = Vec::new();
    for (station, dish_id) in offers {
        let station = match station.trim() {
            "" => DEFAULT_STATION.to_string(),
            _ => station,
        };
        let entry = (
            dish_id,
            names.get(&dish_id).cloned(),
            per_dish.get(&dish_id).copied().unwrap_or_default(),
        );

        match stations.iter_mut().find(|s| s.station == station) {
            Some(existing) => existing.dishes.push(entry),
            None => stations.push(StationOffers {
                station,
                dishes: vec![entry],
            }),
        }
    }

    Ok(stations)
}

pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Rating-weighted average per hall for one meal and date.
pub async fn api_halls(
    State(state): State<AppState>,
    Query(params): Query<MenuParams>,
) -> Result<impl IntoResponse, ApiError> {
    let meal = params.meal()?;
    let date = params.date()?;

    let offers = state.db.get_offers_for_meal(meal.as_str(), &date)?;
    let per_dish = compute_stats(&state.db.get_ratings(meal.as_str(), &date)?);
    let halls = dish_ids_by_hall(&offers);

    Ok(Json(hall_averages(&halls, &per_dish)))
}

pub async fn api_dishes(
    State(state): State<AppState>,
    Query(params): Query<MenuParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (hall, meal) = params.hall_and_meal()?;
    let date = params.date()?;

    let stations: Vec<StationDishes<RatedDish>> = load_station_offers(&state.db, hall, meal, &date)?
        .into_iter()
        .map(|s| StationDishes {
            station: s.station,
            dishes: s
                .dishes
                .into_iter()
                .map(|(id, name, stats)| RatedDish {
                    id,
                    name,
                    avg_rating: stats.avg.map(round2),
                    num_ratings: stats.count,
                })
                .collect(),
        })
        .collect();

    Ok(Json(stations))
}

/// Like [`api_dishes`], with name variants collapsed per station.
pub async fn api_dishes_grouped(
    State(state): State<AppState>,
    Query(params): Query<MenuParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (hall, meal) = params.hall_and_meal()?;
    let date = params.date()?;

    let stations: Vec<StationDishes<GroupedDish>> = load_station_offers(&state.db, hall, meal, &date)?
        .iter()
        .map(|s| {
            let named = s
                .dishes
                .iter()
                .filter_map(|(_, name, stats)| name.as_deref().map(|name| (name, *stats)));
            let dishes = group_dishes(named)
                .into_iter()
                .map(|mut dish| {
                    dish.avg_rating = dish.avg_rating.map(round2);
                    dish
                })
                .collect();
            StationDishes {
                station: s.station.clone(),
                dishes,
            }
        })
        // stations holding only placeholders
        .filter(|s| !s.dishes.is_empty())
        .collect();

    Ok(Json(stations))
}

/// Body is read raw so that malformed JSON gets the same 400 as missing fields.
pub async fn api_rate(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let submission: RatingSubmission =
        serde_json::from_slice(&body).map_err(|_| ValidationError::MissingFields)?;
    let rating = submission.validate()?;

    state.db.insert_rating(&rating)?;
    log::info!(
        "Rated dish {} ({} {}): {}",
        rating.dish_id,
        rating.meal,
        rating.offer_date,
        rating.rating
    );

    Ok(Json(json!({ "success": true })))
}

//! HTTP API over the offer and rating store.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::db_operations::MenuDb;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<MenuDb>,
}

impl AppState {
    pub fn new(db: MenuDb) -> Self {
        AppState { db: Arc::new(db) }
    }
}

pub async fn serve(db: MenuDb, host: &str, port: u16) -> anyhow::Result<()> {
    db.check_or_create_db_tables()?;
    let app = create_router(AppState::new(db));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::config::StoreConfig;
    use crate::data_types::{
        menu_data_types::{Dish, StationBlock},
        rating_data_types::NewRating,
        Hall, Meal,
    };

    const DATE: &str = "2025-09-10";

    fn dish(id: i64, name: &str) -> Dish {
        Dish {
            id: Some(id),
            name: name.to_string(),
            allergens: vec![],
        }
    }

    fn block(hall: Hall, station: &str, dishes: Vec<Dish>) -> StationBlock {
        StationBlock {
            hall,
            meal: Meal::Lunch,
            date: DATE.to_string(),
            station: station.to_string(),
            dishes,
        }
    }

    fn rate(db: &MenuDb, dish_id: i64, rating: u8) {
        db.insert_rating(&NewRating {
            dish_id,
            meal: Meal::Lunch,
            offer_date: DATE.to_string(),
            rating,
        })
        .unwrap();
    }

    fn setup_test_app() -> (axum::Router, MenuDb, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = MenuDb::new(StoreConfig::new(dir.path().join("test.sqlite")));
        db.check_or_create_db_tables().unwrap();

        let app = create_router(AppState::new(db.clone()));
        (app, db, dir)
    }

    fn setup_test_app_with_data() -> (axum::Router, tempfile::TempDir) {
        let (app, db, dir) = setup_test_app();

        db.save_station_blocks(&[
            block(
                Hall::Feast,
                "Grill",
                vec![dish(1, "Burger - Beef"), dish(2, "Burger (Veggie)"), dish(3, "Fries")],
            ),
            block(
                Hall::Feast,
                "Soup",
                vec![dish(4, "Check dining location for daily offering(s)")],
            ),
            block(Hall::Gather, "Deli", vec![dish(5, "Club")]),
        ])
        .unwrap();

        rate(&db, 1, 5);
        rate(&db, 1, 3);
        rate(&db, 2, 2);
        rate(&db, 5, 1);

        (app, dir)
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_rating(app: axum::Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/rate")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db, _dir) = setup_test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_halls_requires_meal() {
        let (app, _db, _dir) = setup_test_app();
        let (status, json) = get_json(app, "/api/halls").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "meal is required");
    }

    #[tokio::test]
    async fn test_halls_weighted_averages() {
        let (app, _dir) = setup_test_app_with_data();
        let (status, json) = get_json(app, "/api/halls?meal=lunch&date=2025-09-10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([
                { "hall": "feast", "avg": 10.0 / 3.0, "rating_count": 3 },
                { "hall": "gather", "avg": 1.0, "rating_count": 1 }
            ])
        );
    }

    #[tokio::test]
    async fn test_halls_rejects_bad_date() {
        let (app, _db, _dir) = setup_test_app();
        let (status, _) = get_json(app, "/api/halls?meal=lunch&date=2025-9-10").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dishes_by_station() {
        let (app, _dir) = setup_test_app_with_data();
        let (status, json) = get_json(app, "/api/dishes?hall=feast&meal=lunch&date=2025-09-10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["station"], "Grill");
        assert_eq!(
            json[0]["dishes"][0],
            json!({ "id": 1, "name": "Burger - Beef", "avg_rating": 4.0, "num_ratings": 2 })
        );
        assert_eq!(json[0]["dishes"][2]["avg_rating"], Value::Null);
        assert_eq!(json[0]["dishes"][2]["num_ratings"], 0);
        assert_eq!(json[1]["station"], "Soup");
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_dishes_requires_hall_and_meal() {
        let (app, _db, _dir) = setup_test_app();
        let (status, json) = get_json(app.clone(), "/api/dishes?meal=lunch").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "hall and meal are required");

        let (status, json) = get_json(app, "/api/dishes?hall=nowhere&meal=lunch").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "unknown hall: nowhere");
    }

    #[tokio::test]
    async fn test_grouped_dishes() {
        let (app, _dir) = setup_test_app_with_data();
        let (status, json) =
            get_json(app, "/api/dishes/grouped?hall=feast&meal=lunch&date=2025-09-10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([{
                "station": "Grill",
                "dishes": [
                    { "name": "Burger - Beef", "base_name": "burger", "avg_rating": 3.33, "num_ratings": 3 },
                    { "name": "Fries", "base_name": "fries", "avg_rating": null, "num_ratings": 0 }
                ]
            }])
        );
    }

    #[tokio::test]
    async fn test_rate_then_read_back() {
        let (app, db, _dir) = setup_test_app();
        db.save_station_blocks(&[block(Hall::Feast, "Grill", vec![dish(9, "Pho")])])
            .unwrap();

        let (status, json) = post_rating(
            app.clone(),
            json!({ "dish_id": 9, "meal": "lunch", "date": DATE, "rating": "4" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "success": true }));

        let (_, json) = get_json(app, "/api/dishes?hall=feast&meal=lunch&date=2025-09-10").await;
        assert_eq!(json[0]["dishes"][0]["avg_rating"], 4.0);
        assert_eq!(json[0]["dishes"][0]["num_ratings"], 1);
    }

    #[tokio::test]
    async fn test_rate_validation() {
        let (app, db, _dir) = setup_test_app();

        let (status, json) = post_rating(app.clone(), json!({ "dish_id": 9, "meal": "lunch", "rating": 4 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "dish_id, meal, offer_date, and numeric rating are required");

        let (status, json) = post_rating(
            app.clone(),
            json!({ "dish_id": 9, "meal": "lunch", "offer_date": DATE, "rating": 6 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "rating must be a whole number between 1 and 5");

        let (status, _) = post_rating(app, json!("not an object")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(db.get_ratings("lunch", DATE).unwrap().is_empty());
    }
}

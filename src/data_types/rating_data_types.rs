use serde::{Deserialize, Serialize};

use super::Meal;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DishRecord {
    pub id: i64,
    pub name_raw: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OfferRow {
    pub dish_id: i64,
    pub hall: String,
    pub station: String,
    pub meal: String,
    pub offer_date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RatingRow {
    pub dish_id: i64,
    pub rating: u8,
}

/// A validated rating, ready to be appended to the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewRating {
    pub dish_id: i64,
    pub meal: Meal,
    pub offer_date: String,
    pub rating: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct DishStats {
    pub avg: Option<f64>,
    pub count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HallSummary {
    pub hall: String,
    pub avg: Option<f64>,
    pub rating_count: u64,
}

/// A stored dish together with its rating stats, as shown per station.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RatedDish {
    pub id: i64,
    pub name: Option<String>,
    pub avg_rating: Option<f64>,
    pub num_ratings: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StationDishes<T> {
    pub station: String,
    pub dishes: Vec<T>,
}

/// Dishes sharing a canonical base name, collapsed for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GroupedDish {
    /// first-seen display name in the group
    pub name: String,
    pub base_name: String,
    pub avg_rating: Option<f64>,
    pub num_ratings: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SaveSummary {
    pub dishes_upserted: usize,
    pub offers_seen: usize,
    pub offers_inserted: usize,
}

use serde::{Deserialize, Serialize};

use super::{Hall, Meal};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dish {
    /// missing for some upstream entries; such dishes are shown but never stored as offers
    pub id: Option<i64>,
    pub name: String,
    pub allergens: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Station {
    #[serde(rename = "station")]
    pub name: String,
    pub dishes: Vec<Dish>,
}

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Station {
            name: name.into(),
            dishes: Vec::new(),
        }
    }
}

/// A station as scraped for one hall, meal and date.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StationBlock {
    pub hall: Hall,
    pub meal: Meal,
    pub date: String,
    pub station: String,
    pub dishes: Vec<Dish>,
}

impl StationBlock {
    pub fn from_station(hall: Hall, meal: Meal, date: &str, station: Station) -> Self {
        StationBlock {
            hall,
            meal,
            date: date.to_string(),
            station: station.name,
            dishes: station.dishes,
        }
    }
}

/// Hall, meal and date recovered from an upstream URL. Any part may be unknown.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UrlMeta {
    pub hall: Option<Hall>,
    pub meal: Option<Meal>,
    pub date: Option<String>,
}

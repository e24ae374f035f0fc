pub mod menu_data_types;
pub mod rating_data_types;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hall {
    Feast,
    Gather,
    OpenKitchen,
}

impl Hall {
    pub const ALL: [Hall; 3] = [Hall::Feast, Hall::Gather, Hall::OpenKitchen];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hall::Feast => "feast",
            Hall::Gather => "gather",
            Hall::OpenKitchen => "open-kitchen",
        }
    }
}

impl fmt::Display for Hall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hall {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hall::ALL
            .into_iter()
            .find(|hall| hall.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownHall(s.to_string()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

impl Meal {
    pub const ALL: [Meal; 3] = [Meal::Breakfast, Meal::Lunch, Meal::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Dinner => "dinner",
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Meal::ALL
            .into_iter()
            .find(|meal| meal.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownMeal(s.to_string()))
    }
}

/// Accepts only `YYYY-MM-DD`.
pub fn parse_iso_date(s: &str) -> Result<chrono::NaiveDate, ValidationError> {
    let trimmed = s.trim();
    if trimmed.len() != 10 {
        return Err(ValidationError::InvalidDate(s.to_string()));
    }
    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

pub fn today_iso() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

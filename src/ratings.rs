use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use crate::data_backend::fields::integral;
use crate::data_types::{
    parse_iso_date,
    rating_data_types::{DishStats, HallSummary, NewRating, RatingRow},
    Meal,
};
use crate::errors::ValidationError;

/// Rating-weighted mean of per-dish averages: `Σ(avg·count) / Σcount`.
///
/// Entries without ratings are ignored; `avg` is `None` when nothing is rated.
/// Used for hall averages and for grouped dish variants alike.
pub fn weighted_average(stats: impl IntoIterator<Item = DishStats>) -> DishStats {
    let (sum, count) = stats
        .into_iter()
        .filter(|s| s.count > 0)
        .filter_map(|s| s.avg.map(|avg| (avg, s.count)))
        .fold((0.0, 0u64), |(sum, count), (avg, n)| {
            (sum + avg * n as f64, count + n)
        });

    DishStats {
        avg: (count > 0).then(|| sum / count as f64),
        count,
    }
}

pub fn compute_stats(rows: &[RatingRow]) -> BTreeMap<i64, DishStats> {
    let mut sums: BTreeMap<i64, (u64, u64)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(row.dish_id).or_default();
        entry.0 += u64::from(row.rating);
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(dish_id, (sum, count))| {
            let avg = (count > 0).then(|| sum as f64 / count as f64);
            (dish_id, DishStats { avg, count })
        })
        .collect()
}

/// Groups offered dish ids by hall, halls in first-seen order.
pub fn dish_ids_by_hall(offers: &[(String, i64)]) -> Vec<(String, BTreeSet<i64>)> {
    let mut halls: Vec<(String, BTreeSet<i64>)> = Vec::new();
    for (hall, dish_id) in offers {
        match halls.iter_mut().find(|(name, _)| name == hall) {
            Some((_, ids)) => {
                ids.insert(*dish_id);
            }
            None => halls.push((hall.clone(), BTreeSet::from([*dish_id]))),
        }
    }
    halls
}

pub fn hall_averages(
    halls: &[(String, BTreeSet<i64>)],
    per_dish: &BTreeMap<i64, DishStats>,
) -> Vec<HallSummary> {
    halls
        .iter()
        .map(|(hall, dish_ids)| {
            let stats = weighted_average(dish_ids.iter().filter_map(|id| per_dish.get(id).copied()));
            HallSummary {
                hall: hall.clone(),
                avg: stats.avg,
                rating_count: stats.count,
            }
        })
        .collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Body of a rating submission, as loosely typed as clients send it.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct RatingSubmission {
    pub dish_id: Option<Value>,
    pub meal: Option<String>,
    pub offer_date: Option<String>,
    pub date: Option<String>,
    pub rating: Option<Value>,
}

fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

fn loose_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(_) => integral(value),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl RatingSubmission {
    pub fn validate(&self) -> Result<NewRating, ValidationError> {
        let dish_id = self
            .dish_id
            .as_ref()
            .and_then(loose_id)
            .filter(|id| *id != 0)
            .ok_or(ValidationError::MissingFields)?;

        let meal = self
            .meal
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or(ValidationError::MissingFields)?;

        // offer_date wins over date
        let offer_date = self
            .offer_date
            .as_deref()
            .or(self.date.as_deref())
            .filter(|d| !d.trim().is_empty())
            .ok_or(ValidationError::MissingFields)?;

        let rating = self
            .rating
            .as_ref()
            .and_then(loose_number)
            .ok_or(ValidationError::MissingFields)?;

        if !(1.0..=5.0).contains(&rating) || rating.fract() != 0.0 {
            return Err(ValidationError::RatingOutOfRange);
        }

        let meal: Meal = meal.parse()?;
        let offer_date = parse_iso_date(offer_date)?.format("%Y-%m-%d").to_string();

        Ok(NewRating {
            dish_id,
            meal,
            offer_date,
            rating: rating as u8,
        })
    }
}

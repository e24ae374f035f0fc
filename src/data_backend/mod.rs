//! Menu tree normalization.
//!
//! Upstream menu documents come in more than one shape. Each shape is handled
//! by a [`MenuStrategy`]; [`MenuNormalizer`] tries them in priority order and
//! the first one that recognizes its structure produces the stations. A
//! document no strategy recognizes has no menu and yields no stations.

use std::collections::HashMap;

use serde_json::Value;

use crate::data_types::menu_data_types::Station;

pub mod fields;
pub mod legacy_parser;
pub mod structured_parser;

use legacy_parser::SequentialArrayStrategy;
use structured_parser::StructuredDayStrategy;

/// What happens to a station whose name was already seen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum StationMerge {
    /// append its dishes to the first station of that name
    #[default]
    MergeByName,
    /// drop it along with its dishes
    KeepFirst,
}

pub trait MenuStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the document does not have this strategy's structure.
    fn try_extract(&self, doc: &Value, target_date: &str) -> Option<Vec<Station>>;
}

pub(crate) fn collapse_stations(stations: Vec<Station>, merge: StationMerge) -> Vec<Station> {
    let mut out: Vec<Station> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for station in stations {
        match by_name.get(&station.name) {
            Some(&idx) => {
                if merge == StationMerge::MergeByName {
                    out[idx].dishes.extend(station.dishes);
                }
            }
            None => {
                by_name.insert(station.name.clone(), out.len());
                out.push(station);
            }
        }
    }

    out
}

pub struct MenuNormalizer {
    strategies: Vec<Box<dyn MenuStrategy>>,
}

impl MenuNormalizer {
    pub fn new(merge: StationMerge) -> Self {
        MenuNormalizer {
            strategies: vec![
                Box::new(StructuredDayStrategy),
                Box::new(SequentialArrayStrategy::new(merge)),
            ],
        }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn MenuStrategy>>) -> Self {
        MenuNormalizer { strategies }
    }

    /// Stations of the menu for `target_date` (`YYYY-MM-DD`); empty means no menu.
    pub fn normalize(&self, doc: &Value, target_date: &str) -> Vec<Station> {
        for strategy in &self.strategies {
            if let Some(stations) = strategy.try_extract(doc, target_date) {
                log::debug!(
                    "{} matched: {} stations",
                    strategy.name(),
                    stations.len()
                );
                return stations;
            }
        }

        log::debug!("no menu structure recognized");
        Vec::new()
    }
}

impl Default for MenuNormalizer {
    fn default() -> Self {
        MenuNormalizer::new(StationMerge::default())
    }
}

pub fn normalize_menu(doc: &Value, target_date: &str) -> Vec<Station> {
    MenuNormalizer::default().normalize(doc, target_date)
}

use serde_json::Value;

use super::fields::{
    extract_allergens, first_nonempty_str, first_object, has_truthy, scalar_text, truthy,
    HEADER_FLAG_KEYS, HEADER_LABEL_KEYS, LEGACY_DISH, LEGACY_FOOD_KEYS,
};
use super::{collapse_stations, MenuStrategy, StationMerge};
use crate::constants::{DEFAULT_STATION, MAX_WALK_DEPTH};
use crate::data_types::menu_data_types::{Dish, Station};

/// Finds flat arrays where header markers separate runs of food entries,
/// anywhere in the document.
#[derive(Debug, Clone, Copy)]
pub struct SequentialArrayStrategy {
    pub merge: StationMerge,
    pub max_depth: usize,
}

impl SequentialArrayStrategy {
    pub fn new(merge: StationMerge) -> Self {
        SequentialArrayStrategy {
            merge,
            max_depth: MAX_WALK_DEPTH,
        }
    }
}

impl Default for SequentialArrayStrategy {
    fn default() -> Self {
        SequentialArrayStrategy::new(StationMerge::default())
    }
}

impl MenuStrategy for SequentialArrayStrategy {
    fn name(&self) -> &'static str {
        "sequential-array"
    }

    fn try_extract(&self, doc: &Value, _target_date: &str) -> Option<Vec<Station>> {
        let mut walker = TreeWalker {
            stations: Vec::new(),
            max_depth: self.max_depth,
        };
        walker.walk(doc, 0);

        if walker.stations.is_empty() {
            return None;
        }
        Some(collapse_stations(walker.stations, self.merge))
    }
}

struct TreeWalker {
    stations: Vec<Station>,
    max_depth: usize,
}

impl TreeWalker {
    fn walk(&mut self, node: &Value, depth: usize) {
        if depth > self.max_depth {
            log::debug!("menu walk stopped at depth {}", depth);
            return;
        }

        match node {
            Value::Array(items) => {
                let before = self.stations.len();
                self.parse_array(items, depth);
                if self.stations.len() > before {
                    return;
                }
                for child in items {
                    self.walk(child, depth + 1);
                }
            }
            Value::Object(map) => {
                for child in map.values() {
                    self.walk(child, depth + 1);
                }
            }
            _ => {}
        }
    }

    fn parse_array(&mut self, items: &[Value], depth: usize) {
        if depth > self.max_depth {
            return;
        }

        let mut current = Station::new(DEFAULT_STATION);
        let mut seen_any = false;

        for item in items.iter().filter(|item| item.is_object()) {
            if is_header(item) {
                if !current.dishes.is_empty() || seen_any {
                    self.stations.push(current);
                }
                current = Station::new(header_label(item));
                seen_any = true;
                continue;
            }

            if let Some(food) = food_entry(item) {
                if let Some(dish) = legacy_dish(food, item) {
                    current.dishes.push(dish);
                    seen_any = true;
                }
                continue;
            }

            // neither header nor food: nested arrays splice their stations in here
            if let Some(map) = item.as_object() {
                for nested in map.values().filter_map(Value::as_array) {
                    self.parse_array(nested, depth + 1);
                }
            }
        }

        if !current.dishes.is_empty() {
            self.stations.push(current);
        }
    }
}

fn is_header(item: &Value) -> bool {
    let flagged = HEADER_FLAG_KEYS
        .iter()
        .any(|key| item.get(key) == Some(&Value::Bool(true)));

    // heuristic: a text line without a food reference, unless explicitly not a title
    let text_only = has_truthy(item, "text")
        && !has_truthy(item, "food")
        && item.get("is_section_title") != Some(&Value::Bool(false));

    flagged || text_only
}

fn header_label(item: &Value) -> String {
    let label = HEADER_LABEL_KEYS
        .iter()
        .filter_map(|key| item.get(key))
        .find(|value| truthy(value))
        .and_then(scalar_text)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    if label.is_empty() {
        "Section".to_string()
    } else {
        label
    }
}

/// The food object of an entry, or the entry itself when it carries name and id inline.
fn food_entry(item: &Value) -> Option<&Value> {
    first_object(item, LEGACY_FOOD_KEYS)
        .or_else(|| (has_truthy(item, "name") && has_truthy(item, "id")).then_some(item))
}

// a nested food object without a name may still be labelled by its entry
fn legacy_dish(food: &Value, item: &Value) -> Option<Dish> {
    let name = LEGACY_DISH
        .name(food)
        .or_else(|| first_nonempty_str(item, &["name"]))?;

    Some(Dish {
        id: LEGACY_DISH.id(food),
        name,
        allergens: extract_allergens(food),
    })
}

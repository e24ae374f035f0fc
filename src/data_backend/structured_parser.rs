use std::collections::HashMap;

use serde_json::Value;

use super::fields::{
    first_object, has_truthy, lookup_path, scalar_text, FOOD_KEYS, SECTION_ID_KEYS,
    SECTION_NAME_PATHS, STRUCTURED_DISH,
};
use super::MenuStrategy;
use crate::constants::DEFAULT_STATION;
use crate::data_types::menu_data_types::Station;

/// Reads the `days[].menu_info` + `days[].menu_items` shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredDayStrategy;

impl MenuStrategy for StructuredDayStrategy {
    fn name(&self) -> &'static str {
        "structured-day"
    }

    fn try_extract(&self, doc: &Value, target_date: &str) -> Option<Vec<Station>> {
        let day = select_day(doc, target_date)?;
        let menu_info = day.get("menu_info").filter(|info| info.is_object())?;
        let menu_items = day.get("menu_items").and_then(Value::as_array)?;

        let section_names = section_names(menu_info);

        let mut stations: Vec<Station> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for item in menu_items {
            // inline subheaders like "Sides" carry no dish
            if has_truthy(item, "is_section_title") {
                continue;
            }

            let Some(food) = first_object(item, FOOD_KEYS) else {
                continue;
            };
            let Some(dish) = STRUCTURED_DISH.dish(food) else {
                continue;
            };

            let station_name = section_names
                .get(&section_id(item))
                .map(String::as_str)
                .unwrap_or(DEFAULT_STATION);

            // sections sharing a display name share a station
            let idx = *by_name.entry(station_name.to_string()).or_insert_with(|| {
                stations.push(Station::new(station_name));
                stations.len() - 1
            });
            stations[idx].dishes.push(dish);
        }

        Some(stations)
    }
}

/// Day whose `date` matches, else the first day with menu items, else the first day.
fn select_day<'a>(doc: &'a Value, target_date: &str) -> Option<&'a Value> {
    let days = doc.get("days").and_then(Value::as_array)?;

    days.iter()
        .find(|day| day.get("date").and_then(Value::as_str) == Some(target_date))
        .or_else(|| {
            days.iter().find(|day| {
                day.get("menu_items")
                    .and_then(Value::as_array)
                    .is_some_and(|items| !items.is_empty())
            })
        })
        .or_else(|| days.first())
}

fn section_names(menu_info: &Value) -> HashMap<String, String> {
    let Some(sections) = menu_info.as_object() else {
        return HashMap::new();
    };

    sections
        .iter()
        .map(|(sid, info)| {
            let name = SECTION_NAME_PATHS
                .iter()
                .filter_map(|path| lookup_path(info, path))
                .filter_map(scalar_text)
                .map(|name| name.trim().to_string())
                .find(|name| !name.is_empty())
                .unwrap_or_else(|| format!("Section {}", sid));
            (sid.clone(), name)
        })
        .collect()
}

fn section_id(item: &Value) -> String {
    SECTION_ID_KEYS
        .iter()
        .filter_map(|key| item.get(key))
        .find(|value| !value.is_null())
        .and_then(scalar_text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::menu_data_types::Dish;
    use serde_json::json;

    fn extract(doc: &Value, date: &str) -> Option<Vec<Station>> {
        StructuredDayStrategy.try_extract(doc, date)
    }

    #[test]
    fn single_grill_item() {
        let doc = json!({
            "days": [{
                "date": "2025-09-10",
                "menu_info": { "10": { "display_name": "Grill" } },
                "menu_items": [{ "section_id": "10", "food": { "id": 501, "name": "Burger" } }]
            }]
        });

        let stations = extract(&doc, "2025-09-10").unwrap();
        assert_eq!(
            stations,
            vec![Station {
                name: "Grill".to_string(),
                dishes: vec![Dish {
                    id: Some(501),
                    name: "Burger".to_string(),
                    allergens: vec![],
                }],
            }]
        );
        assert_eq!(
            serde_json::to_value(&stations).unwrap(),
            json!([{ "station": "Grill", "dishes": [{ "id": 501, "name": "Burger", "allergens": [] }] }])
        );
    }

    #[test]
    fn picks_the_day_matching_the_target_date() {
        let doc = json!({
            "days": [
                {
                    "date": "2025-09-09",
                    "menu_info": { "1": { "name": "Monday Grill" } },
                    "menu_items": [{ "section_id": 1, "food": { "id": 1, "name": "Fries" } }]
                },
                {
                    "date": "2025-09-10",
                    "menu_info": { "1": { "name": "Tuesday Grill" } },
                    "menu_items": [{ "section_id": 1, "food": { "id": 2, "name": "Wrap" } }]
                }
            ]
        });

        let stations = extract(&doc, "2025-09-10").unwrap();
        assert_eq!(stations[0].name, "Tuesday Grill");
        assert_eq!(stations[0].dishes[0].name, "Wrap");

        // no date match -> first day with items
        let stations = extract(&doc, "2030-01-01").unwrap();
        assert_eq!(stations[0].name, "Monday Grill");
    }

    #[test]
    fn falls_back_to_first_non_empty_day() {
        let doc = json!({
            "days": [
                { "date": "2025-09-08", "menu_info": {}, "menu_items": [] },
                {
                    "date": "2025-09-09",
                    "menu_info": { "3": {} },
                    "menu_items": [{ "sectionId": "3", "menu_item": { "menuItemId": 8, "title": "Soup" } }]
                }
            ]
        });

        let stations = extract(&doc, "2025-09-12").unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Section 3");
        assert_eq!(stations[0].dishes[0].id, Some(8));
    }

    #[test]
    fn empty_week_falls_back_to_first_day() {
        let doc = json!({
            "days": [
                { "date": "2025-09-08", "menu_info": { "1": { "display_name": "Monday Grill" } }, "menu_items": [] },
                { "date": "2025-09-09", "menu_info": { "1": { "display_name": "Tuesday Grill" } }, "menu_items": [] }
            ]
        });

        let day = select_day(&doc, "2030-01-01").unwrap();
        assert_eq!(day["date"], "2025-09-08");
        assert_eq!(section_names(&day["menu_info"])["1"], "Monday Grill");
        assert_eq!(extract(&doc, "2030-01-01"), Some(vec![]));
    }

    #[test]
    fn section_name_priority_and_default_station() {
        let doc = json!({
            "days": [{
                "date": "2025-09-10",
                "menu_info": {
                    "1": { "section_options": { "display_name": "Pizza" }, "display_name": "Oven", "name": "oven-1" },
                    "2": { "display_name": "Deli", "name": "deli" }
                },
                "menu_items": [
                    { "section_id": "1", "food": { "id": 1, "name": "Margherita" } },
                    { "section_id": "2", "food": { "id": 2, "name": "Club" } },
                    { "section_id": "99", "food": { "id": 3, "name": "Apple" } },
                    { "food": { "id": 4, "name": "Banana" } }
                ]
            }]
        });

        let stations = extract(&doc, "2025-09-10").unwrap();
        let names: Vec<&str> = stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Pizza", "Deli", "General"]);
        assert_eq!(stations[2].dishes.len(), 2);
    }

    #[test]
    fn same_section_and_same_name_merge() {
        let doc = json!({
            "days": [{
                "date": "2025-09-10",
                "menu_info": {
                    "10": { "display_name": "Grill" },
                    "11": { "display_name": "Grill" },
                    "12": { "display_name": "Salad" }
                },
                "menu_items": [
                    { "section_id": "10", "food": { "id": 1, "name": "Burger" } },
                    { "section_id": "12", "food": { "id": 2, "name": "Caesar" } },
                    { "section_id": "10", "food": { "id": 1, "name": "Burger" } },
                    { "section_id": "11", "food": { "id": 3, "name": "Hot Dog" } }
                ]
            }]
        });

        let stations = extract(&doc, "2025-09-10").unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "Grill");
        // duplicates are kept at this stage
        let grill: Vec<&str> = stations[0].dishes.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(grill, vec!["Burger", "Burger", "Hot Dog"]);
    }

    #[test]
    fn skips_headers_foodless_and_nameless_entries() {
        let doc = json!({
            "days": [{
                "date": "2025-09-10",
                "menu_info": { "1": { "display_name": "Grill" } },
                "menu_items": [
                    { "section_id": "1", "is_section_title": true, "text": "Sides" },
                    { "section_id": "1", "text": "No food here" },
                    { "section_id": "1", "food": { "id": 5, "name": "   " } },
                    { "section_id": "1", "menuItem": { "name": "Fries", "icons": { "food_icons": [{ "slug": "vegan" }] } } }
                ]
            }]
        });

        let stations = extract(&doc, "2025-09-10").unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(
            stations[0].dishes,
            vec![Dish {
                id: None,
                name: "Fries".to_string(),
                allergens: vec!["vegan".to_string()],
            }]
        );
    }

    #[test]
    fn requires_menu_info_and_menu_items() {
        assert!(extract(&json!({}), "2025-09-10").is_none());
        assert!(extract(&json!({ "days": [] }), "2025-09-10").is_none());
        assert!(extract(&json!({ "days": [{ "date": "2025-09-10", "menu_items": [] }] }), "2025-09-10").is_none());
        assert!(extract(&json!({ "days": [{ "date": "2025-09-10", "menu_info": {} }] }), "2025-09-10").is_none());

        // structure present but empty is still a match
        let empty = extract(
            &json!({ "days": [{ "date": "2025-09-10", "menu_info": {}, "menu_items": [] }] }),
            "2025-09-10",
        );
        assert_eq!(empty, Some(vec![]));
    }
}

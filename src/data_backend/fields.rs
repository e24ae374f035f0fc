//! Field accessors for upstream menu entries.
//!
//! The provider renames fields between halls and snapshots, so every value is
//! read through an ordered alias list: the first alias that yields a usable
//! value wins. Both extraction strategies read dishes through these tables.

use serde_json::Value;

use crate::data_types::menu_data_types::Dish;

/// Keys under which a structured `menu_items` entry nests its food object.
pub const FOOD_KEYS: &[&str] = &["food", "menu_item", "menuItem"];
/// Food object keys seen in legacy sequential arrays.
pub const LEGACY_FOOD_KEYS: &[&str] = &[
    "food",
    "menu",
    "menu_item",
    "item",
    "menuItem",
    "menu_item_detail",
];

pub const SECTION_ID_KEYS: &[&str] = &["section_id", "sectionId"];
pub const SECTION_NAME_PATHS: &[&[&str]] = &[
    &["section_options", "display_name"],
    &["display_name"],
    &["name"],
];

/// Boolean flags marking an entry as a section header.
pub const HEADER_FLAG_KEYS: &[&str] = &["is_section_title", "isSectionTitle", "is_section", "isSection"];
pub const HEADER_LABEL_KEYS: &[&str] = &[
    "text",
    "title",
    "sectionTitle",
    "name",
    "label",
    "section_name",
];

pub const ALLERGEN_LABEL_KEYS: &[&str] = &["slug", "name", "synced_name", "label"];

/// Ordered id and name aliases for one upstream shape.
pub struct DishFields {
    pub id_keys: &'static [&'static str],
    pub name_keys: &'static [&'static str],
    /// accept ids sent as numeric strings
    pub numeric_string_ids: bool,
}

pub const STRUCTURED_DISH: DishFields = DishFields {
    id_keys: &["id", "menuItemId"],
    name_keys: &["name", "title"],
    numeric_string_ids: false,
};

pub const LEGACY_DISH: DishFields = DishFields {
    id_keys: &["id", "menuItemId", "menu_item_id", "masterItemId"],
    name_keys: &["name", "title", "itemName", "displayName"],
    numeric_string_ids: true,
};

impl DishFields {
    pub fn id(&self, food: &Value) -> Option<i64> {
        self.id_keys
            .iter()
            .filter_map(|key| food.get(key))
            .find_map(|value| match value {
                Value::Number(_) => integral(value),
                Value::String(s) if self.numeric_string_ids => s.trim().parse().ok(),
                _ => None,
            })
    }

    pub fn name(&self, food: &Value) -> Option<String> {
        first_nonempty_str(food, self.name_keys)
    }

    /// Builds a dish from a food object; `None` when it has no usable name.
    pub fn dish(&self, food: &Value) -> Option<Dish> {
        Some(Dish {
            id: self.id(food),
            name: self.name(food)?,
            allergens: extract_allergens(food),
        })
    }
}

/// Whole-number JSON value as `i64`; `None` when fractional or out of range.
pub fn integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Loose truthiness: null, false, 0, "" and missing are all "no value".
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn has_truthy(obj: &Value, key: &str) -> bool {
    obj.get(key).is_some_and(truthy)
}

/// Strings pass through, numbers and booleans are rendered, everything else is nothing.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn first_object<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(key))
        .find(|value| value.is_object())
}

pub fn first_nonempty_str(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(key))
        .filter_map(scalar_text)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

pub fn lookup_path<'a>(obj: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(obj, |node, key| node.get(key))
}

fn allergen_label(tag: &Value) -> Option<String> {
    if !truthy(tag) {
        return None;
    }
    match tag {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => ALLERGEN_LABEL_KEYS
            .iter()
            .filter_map(|key| tag.get(key))
            .find(|value| truthy(value))
            .and_then(scalar_text),
        _ => None,
    }
}

/// Collects the provider's allergen/icon tags of a food object.
///
/// Tags are gathered from `icons.food_icons`, `food_icons`, `icons` when it is
/// an array, and every array value of `icons` when it is an object. Object
/// tags are labelled by `slug`, `name`, `synced_name` or `label`, in that
/// order. The result is deduplicated and keeps first-seen order.
pub fn extract_allergens(food: &Value) -> Vec<String> {
    let icons = food.get("icons");

    let mut buckets: Vec<&Value> = Vec::new();
    buckets.extend(icons.and_then(|icons| icons.get("food_icons")));
    buckets.extend(food.get("food_icons"));
    match icons {
        Some(arr @ Value::Array(_)) => buckets.push(arr),
        Some(Value::Object(map)) => buckets.extend(map.values()),
        _ => {}
    }

    let mut tags: Vec<String> = Vec::new();
    for tag in buckets
        .into_iter()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(allergen_label)
    {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    tags
}

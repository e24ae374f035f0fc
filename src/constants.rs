use crate::data_types::{Hall, Meal};

pub const NUTRISLICE_BASE: &str = "https://ubc.api.nutrislice.com/menu/api/weeks/school";

pub const DEFAULT_DB: &str = "mealrate.sqlite";
pub const DEFAULT_STATION: &str = "General";

/// Rows per offers upsert statement batch.
pub const OFFER_CHUNK_SIZE: usize = 100;

/// Nesting limit for the legacy tree walk. Upstream payloads are a handful of levels deep.
pub const MAX_WALK_DEPTH: usize = 64;

/// Dish names the provider uses when a station has no real menu for the day.
pub const NO_OFFERING_PLACEHOLDERS: [&str; 3] = [
    "check dining location for daily offering(s)",
    "check dining location for daily offerings",
    "check dining location for daily offering",
];

pub struct Endpoint {
    pub school: &'static str,
    pub menu_type: &'static str,
}

// verified per hall and meal; lunch and dinner share one payload in every hall
pub fn endpoint_for(hall: Hall, meal: Meal) -> Endpoint {
    let (school, menu_type) = match (hall, meal) {
        (Hall::Feast, Meal::Breakfast) => ("ubc-feast-totem-park-residence", "feast-at-totem-park"),
        (Hall::Feast, Meal::Lunch | Meal::Dinner) => (
            "ubc-feast-totem-park-residence",
            "feast-totem-park-residence-lunch",
        ),
        (Hall::Gather, Meal::Breakfast) => (
            "ubc-gather-place-vanier-residence",
            "gather-place-vanier-residence-breakfast",
        ),
        (Hall::Gather, Meal::Lunch | Meal::Dinner) => (
            "ubc-gather-place-vanier-residence",
            "gather-place-vanier-residence-lunch",
        ),
        (Hall::OpenKitchen, Meal::Breakfast) => (
            "ubc-open-kitchen",
            "open-kitchen-orchard-commons-residence-breakfast",
        ),
        (Hall::OpenKitchen, Meal::Lunch | Meal::Dinner) => {
            ("ubc-open-kitchen", "open-kitchen-at-orchard-commons")
        }
    };

    Endpoint { school, menu_type }
}

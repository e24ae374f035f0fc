//! Recovers hall, meal and date from an upstream menu URL.
//!
//! Upstream URLs look like
//! `.../school/<school>/menu-type/<menu-type>/<YYYY>/<M>/<D>/`, where the hall
//! and meal are only present as tokens inside the slugs.

use regex_lite::Regex;
use reqwest::Url;
use static_init::dynamic;

use crate::data_types::{menu_data_types::UrlMeta, Hall, Meal};

fn path_segments(input: &str) -> Vec<String> {
    // not an absolute URL -> treat the whole input as a path
    let path = match Url::parse(input) {
        Ok(url) => url.path().to_string(),
        Err(_) => input.to_string(),
    };

    path.split('/')
        .filter(|seg| !seg.is_empty())
        .map(str::to_string)
        .collect()
}

fn all_digits(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

fn date_from_segments(parts: &[String]) -> Option<String> {
    if let [.., year, month, day] = parts {
        if all_digits(year, 4, 4) && all_digits(month, 1, 2) && all_digits(day, 1, 2) {
            return Some(format!("{}-{:0>2}-{:0>2}", year, month, day));
        }
    }

    #[dynamic]
    static RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    parts.iter().rev().find(|seg| RE.is_match(seg)).cloned()
}

fn meal_from_segments(parts: &[String]) -> Option<Meal> {
    #[dynamic]
    static RE: Regex = Regex::new(r"(?i)(breakfast|lunch|dinner)").unwrap();
    // first segment carrying a token wins
    let segment = parts.iter().find(|seg| RE.is_match(seg))?;
    let token = RE.find(segment)?.as_str().to_lowercase();
    token.parse().ok()
}

fn hall_from_segments(parts: &[String]) -> Option<Hall> {
    #[dynamic]
    static RE: Regex = Regex::new(r"(?i)(feast|gather|open-?kitchen|open)").unwrap();
    let segment = parts.iter().find(|seg| RE.is_match(seg))?;
    let token = RE.find(segment)?.as_str().to_lowercase();

    match token.as_str() {
        "feast" => Some(Hall::Feast),
        "gather" => Some(Hall::Gather),
        // "open", "openkitchen" and "open-kitchen" all name the same hall
        _ => Some(Hall::OpenKitchen),
    }
}

pub fn extract_meta_from_url(input: &str) -> UrlMeta {
    let parts = path_segments(input);

    UrlMeta {
        hall: hall_from_segments(&parts),
        meal: meal_from_segments(&parts),
        date: date_from_segments(&parts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_upstream_url() {
        let meta = extract_meta_from_url(
            "https://ubc.api.nutrislice.com/menu/api/weeks/school/ubc-feast-totem-park-residence/menu-type/feast-totem-park-residence-lunch/2025/09/10",
        );
        assert_eq!(
            meta,
            UrlMeta {
                hall: Some(Hall::Feast),
                meal: Some(Meal::Lunch),
                date: Some("2025-09-10".to_string()),
            }
        );
    }

    #[test]
    fn pads_single_digit_month_and_day() {
        let meta = extract_meta_from_url(
            "https://example.com/school/ubc-gather-place/menu-type/gather-dinner/2025/9/3/",
        );
        assert_eq!(meta.date.as_deref(), Some("2025-09-03"));
        assert_eq!(meta.hall, Some(Hall::Gather));
        assert_eq!(meta.meal, Some(Meal::Dinner));
    }

    #[test]
    fn open_normalizes_to_open_kitchen() {
        let meta = extract_meta_from_url(
            "https://example.com/school/ubc-open-kitchen/menu-type/open-kitchen-at-orchard-commons/2025/10/01",
        );
        assert_eq!(meta.hall, Some(Hall::OpenKitchen));
        assert_eq!(meta.meal, None);

        let meta = extract_meta_from_url("https://example.com/OPEN/Breakfast/2025-01-02");
        assert_eq!(meta.hall, Some(Hall::OpenKitchen));
        assert_eq!(meta.meal, Some(Meal::Breakfast));
        assert_eq!(meta.date.as_deref(), Some("2025-01-02"));
    }

    #[test]
    fn falls_back_to_iso_segment() {
        let meta = extract_meta_from_url("https://example.com/feast/2025-11-20/lunch");
        assert_eq!(meta.date.as_deref(), Some("2025-11-20"));
    }

    #[test]
    fn unknown_parts_stay_none() {
        let meta = extract_meta_from_url("https://example.com/menu/api/weeks/2025/123/4");
        assert_eq!(meta, UrlMeta::default());
    }

    #[test]
    fn bare_paths_are_accepted() {
        let meta = extract_meta_from_url("/feast/lunch/2024/2/29");
        assert_eq!(meta.hall, Some(Hall::Feast));
        assert_eq!(meta.date.as_deref(), Some("2024-02-29"));
    }
}

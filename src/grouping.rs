//! Collapses dish name variants for display.
//!
//! The provider lists variants of one dish separately ("Pizza - Pepperoni",
//! "Pizza (Vegan)"); for display they are grouped under a canonical base name
//! and their ratings combined.

use std::collections::HashMap;

use regex_lite::Regex;
use static_init::dynamic;

use crate::constants::NO_OFFERING_PLACEHOLDERS;
use crate::data_types::rating_data_types::{DishStats, GroupedDish};
use crate::ratings::weighted_average;

pub fn is_placeholder(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    NO_OFFERING_PLACEHOLDERS.contains(&name.as_str())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn base_dish_name(name: &str) -> String {
    #[dynamic]
    static TRAILING_QUALIFIER: Regex = Regex::new(r"\s*\([^()]*\)\s*$").unwrap();

    let lowered = name.trim().to_lowercase();

    let head = match lowered.find(&['-', '–', '—'][..]) {
        Some(idx) => &lowered[..idx],
        None => lowered.as_str(),
    };
    let head = TRAILING_QUALIFIER.replace(head, "");
    let base = collapse_whitespace(&head);

    // "- Special" and the like would otherwise collapse to nothing
    if base.is_empty() {
        collapse_whitespace(&lowered)
    } else {
        base
    }
}

/// Groups one station's dishes by base name, in first-seen order.
pub fn group_dishes<'a>(dishes: impl IntoIterator<Item = (&'a str, DishStats)>) -> Vec<GroupedDish> {
    let mut groups: Vec<(GroupedDish, Vec<DishStats>)> = Vec::new();
    let mut by_base: HashMap<String, usize> = HashMap::new();

    for (name, stats) in dishes {
        if is_placeholder(name) {
            continue;
        }

        let base_name = base_dish_name(name);
        let idx = *by_base.entry(base_name.clone()).or_insert_with(|| {
            groups.push((
                GroupedDish {
                    name: name.trim().to_string(),
                    base_name,
                    avg_rating: None,
                    num_ratings: 0,
                },
                Vec::new(),
            ));
            groups.len() - 1
        });
        groups[idx].1.push(stats);
    }

    groups
        .into_iter()
        .map(|(mut group, stats)| {
            let combined = weighted_average(stats);
            group.avg_rating = combined.avg;
            group.num_ratings = combined.count;
            group
        })
        .collect()
}

//! Entity name resolution against the registry.

use adv_core::{EntityId, World};
use strsim::jaro_winkler;

const ARTICLES: &[&str] = &["the ", "a ", "an "];

/// Resolve a typed name: exact, then case-insensitive, then again without a
/// leading article. Never guesses.
pub fn resolve_entity(world: &World, input: &str) -> Option<EntityId> {
    let input = input.trim();
    world.find(input).or_else(|| {
        let lower = input.to_lowercase();
        ARTICLES
            .iter()
            .find_map(|a| lower.strip_prefix(a))
            .and_then(|rest| world.find(rest))
    })
}

/// Find entities matching the input with a similarity score above the threshold.
///
/// Returns a list of (EntityId, score) sorted by score descending.
pub fn fuzzy_match(world: &World, input: &str, threshold: f64) -> Vec<(EntityId, f64)> {
    let input_lower = input.to_lowercase();
    let mut matches: Vec<(EntityId, f64)> = world
        .all_entities()
        .into_iter()
        .filter_map(|entity| {
            let score = jaro_winkler(&input_lower, &entity.name.to_lowercase());
            (score >= threshold).then_some((entity.id, score))
        })
        .collect();

    matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    matches
}

/// Registry names that start with, contain, or closely resemble `partial`.
pub fn suggest_entities(world: &World, partial: &str, threshold: f64, limit: usize) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    if partial_lower.is_empty() {
        return Vec::new();
    }
    let mut suggestions: Vec<(String, f64)> = world
        .all_entities()
        .into_iter()
        .filter_map(|entity| {
            let name_lower = entity.name.to_lowercase();
            if name_lower.starts_with(&partial_lower) {
                Some((entity.name.clone(), 2.0))
            } else if name_lower.contains(&partial_lower) {
                Some((entity.name.clone(), 1.0))
            } else {
                None
            }
        })
        .collect();
    for (id, score) in fuzzy_match(world, partial, threshold) {
        let Ok(name) = world.name_of(id) else {
            continue;
        };
        if !suggestions.iter().any(|(n, _)| n == name) {
            suggestions.push((name.to_string(), score));
        }
    }

    suggestions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    suggestions
        .into_iter()
        .take(limit)
        .map(|(name, _)| name)
        .collect()
}

//! Crop alias resolution
//!
//! The district tables spell the same crop several ways ("Rice" vs "Paddy",
//! "Cotton(Lint)" vs "Cotton Lint"). Queries filter on the full variant set
//! so every spelling of a crop is counted.

use crate::normalize::normalize_name;
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref CROP_ALIASES: HashMap<&'static str, Vec<&'static str>> = {
        let mut aliases = HashMap::new();
        aliases.insert("Rice", vec!["Rice", "Paddy"]);
        aliases.insert("Cotton", vec!["Cotton", "Cotton(Lint)", "Cotton Lint"]);
        aliases.insert(
            "Rapeseed And Mustard",
            vec!["Rapeseed And Mustard", "Rapeseed & Mustard"],
        );
        aliases
    };
}

/// Expand a crop name into every label it may carry in the data.
///
/// The input is trimmed, whitespace-collapsed and title-cased first. The
/// canonical name always comes first; an unmapped crop resolves to itself.
pub fn resolve(crop: &str) -> Vec<String> {
    let key = normalize_name(crop);
    match CROP_ALIASES.get(key.as_str()) {
        Some(variants) => variants.iter().map(|v| v.to_string()).collect(),
        None => vec![key],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_expands_synonyms() {
        assert_eq!(resolve("rice"), vec!["Rice", "Paddy"]);
        assert_eq!(resolve("  COTTON "), vec!["Cotton", "Cotton(Lint)", "Cotton Lint"]);
        assert_eq!(
            resolve("rapeseed   and mustard"),
            vec!["Rapeseed And Mustard", "Rapeseed & Mustard"]
        );
    }

    #[test]
    fn test_unmapped_crop_resolves_to_itself() {
        assert_eq!(resolve("sugarcane"), vec!["Sugarcane"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for name in CROP_ALIASES.keys().copied() {
            let variants = resolve(name);
            assert_eq!(variants[0], name);
            assert_eq!(resolve(&variants[0]), variants);
        }
        assert_eq!(resolve(&resolve("maize")[0]), vec!["Maize"]);
    }
}

use crate::model::Recipe;
use log::debug;

/// Case-insensitive substring match of `token` inside `ingredients`.
///
/// Both sides are uppercased before comparing. There is no word-boundary
/// check, so "beef" also matches "Beefsteak tomatoes".
pub fn mentions_ingredient(ingredients: &str, token: &str) -> bool {
    ingredients.to_uppercase().contains(&token.to_uppercase())
}

/// Keep only the recipes whose ingredient text mentions `token`.
///
/// Records without an ingredient list are dropped. Input order is preserved.
pub fn filter_by_ingredient(records: Vec<Recipe>, token: &str) -> Vec<Recipe> {
    let total = records.len();
    let retained: Vec<Recipe> = records
        .into_iter()
        .filter(|recipe| {
            recipe
                .ingredients
                .as_deref()
                .is_some_and(|ingredients| mentions_ingredient(ingredients, token))
        })
        .collect();

    debug!(
        "Ingredient filter '{}': kept {} of {} records",
        token,
        retained.len(),
        total
    );
    retained
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(ingredients: Option<&str>) -> Recipe {
        Recipe::new(ingredients, None, None)
    }

    #[test]
    fn test_case_insensitive_match() {
        let records = vec![recipe(Some("BEEF stew")), recipe(Some("beef stew"))];
        let kept = filter_by_ingredient(records, "beef");
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_excludes_non_matching_and_missing() {
        let records = vec![
            recipe(Some("chicken breast")),
            recipe(None),
            recipe(Some("2 lbs beef, diced")),
        ];
        let kept = filter_by_ingredient(records, "beef");
        assert_eq!(kept, vec![recipe(Some("2 lbs beef, diced"))]);
    }

    #[test]
    fn test_matches_inside_other_words() {
        assert!(mentions_ingredient("Beefsteak tomatoes", "beef"));
        assert!(mentions_ingredient("corned-BEEF hash", "Beef"));
        assert!(!mentions_ingredient("bee pollen, f", "beef"));
    }

    #[test]
    fn test_preserves_input_order() {
        let records = vec![
            recipe(Some("beef a")),
            recipe(Some("pork")),
            recipe(Some("beef b")),
            recipe(Some("Beef c")),
        ];
        let kept: Vec<_> = filter_by_ingredient(records, "beef")
            .into_iter()
            .filter_map(|r| r.ingredients)
            .collect();
        assert_eq!(kept, vec!["beef a", "beef b", "Beef c"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = vec![
            recipe(Some("beef")),
            recipe(Some("lamb")),
            recipe(Some("ground BEEF")),
        ];
        let once = filter_by_ingredient(records, "beef");
        let twice = filter_by_ingredient(once.clone(), "beef");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_token_keeps_records_with_ingredients() {
        let records = vec![recipe(Some("anything")), recipe(None), recipe(Some(""))];
        assert_eq!(filter_by_ingredient(records, "").len(), 2);
    }
}

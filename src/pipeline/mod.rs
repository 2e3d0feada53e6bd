pub mod difficulty;
pub mod duration;
pub mod filter;

pub use difficulty::classify;
pub use duration::{parse_minutes, total_minutes};
pub use filter::{filter_by_ingredient, mentions_ingredient};

use crate::model::{EnrichedRecipe, Recipe};
use log::debug;

/// Derive `totalTimeMinutes` and `difficulty` for every record
pub fn enrich(records: Vec<Recipe>) -> Vec<EnrichedRecipe> {
    records
        .into_iter()
        .map(|recipe| {
            let total_time_minutes =
                total_minutes(recipe.prep_time.as_deref(), recipe.cook_time.as_deref());
            let difficulty = classify(i64::from(total_time_minutes));
            EnrichedRecipe {
                recipe,
                total_time_minutes,
                difficulty,
            }
        })
        .collect()
}

/// Run the transform stages in order: ingredient filter, then enrichment
pub fn transform(records: Vec<Recipe>, ingredient: &str) -> Vec<EnrichedRecipe> {
    let filtered = filter_by_ingredient(records, ingredient);
    let enriched = enrich(filtered);
    debug!("Enriched {} records", enriched.len());
    enriched
}

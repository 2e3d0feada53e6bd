use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::EtlError;

pub const INGREDIENTS: &str = "ingredients";
pub const PREP_TIME: &str = "prepTime";
pub const COOK_TIME: &str = "cookTime";

/// Source fields the job reads, in output column order
pub const CONSUMED_FIELDS: [&str; 3] = [INGREDIENTS, PREP_TIME, COOK_TIME];

/// A single record of the source collection.
///
/// The three fields the job reads are exposed as text. Source records are not
/// validated, so those fields may arrive with another JSON type: an array of
/// strings for `ingredients` is joined with `", "`, anything else reads as
/// absent. The value as it appeared in the source is kept in `raw` and is what
/// gets written back out. Every other top-level field is kept as-is in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Value>",
    into = "BTreeMap<String, Value>"
)]
pub struct Recipe {
    pub ingredients: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    /// Source values of the fields above that were neither strings nor null
    pub raw: BTreeMap<String, Value>,
    pub extra: BTreeMap<String, Value>,
}

impl Recipe {
    pub fn new(
        ingredients: Option<&str>,
        prep_time: Option<&str>,
        cook_time: Option<&str>,
    ) -> Self {
        Self {
            ingredients: ingredients.map(str::to_string),
            prep_time: prep_time.map(str::to_string),
            cook_time: cook_time.map(str::to_string),
            ..Self::default()
        }
    }

    /// Attach a field as if it had been read from the source
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert_field(name.into(), value);
        self
    }

    /// Store a source field, routing the consumed ones to their text view
    pub fn insert_field(&mut self, name: String, value: Value) {
        let text = match name.as_str() {
            INGREDIENTS => &mut self.ingredients,
            PREP_TIME => &mut self.prep_time,
            COOK_TIME => &mut self.cook_time,
            _ => {
                self.extra.insert(name, value);
                return;
            }
        };
        *text = if name == INGREDIENTS {
            ingredient_text(&value)
        } else {
            value.as_str().map(str::to_string)
        };

        if matches!(value, Value::String(_) | Value::Null) {
            self.raw.remove(&name);
        } else {
            self.raw.insert(name, value);
        }
    }

    /// Value of a consumed field as it should be written out
    pub fn source_value(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.raw.get(name) {
            return Some(value.clone());
        }
        let text = match name {
            INGREDIENTS => &self.ingredients,
            PREP_TIME => &self.prep_time,
            COOK_TIME => &self.cook_time,
            _ => return None,
        };
        text.clone().map(Value::String)
    }
}

impl From<BTreeMap<String, Value>> for Recipe {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        let mut recipe = Recipe::default();
        for (name, value) in fields {
            recipe.insert_field(name, value);
        }
        recipe
    }
}

impl From<Recipe> for BTreeMap<String, Value> {
    fn from(recipe: Recipe) -> Self {
        let mut fields: BTreeMap<String, Value> = CONSUMED_FIELDS
            .into_iter()
            .map(|name| {
                let value = recipe.source_value(name).unwrap_or(Value::Null);
                (name.to_string(), value)
            })
            .collect();
        fields.extend(recipe.extra);
        fields
    }
}

fn ingredient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str())
            .collect::<Option<Vec<_>>>()
            .map(|lines| lines.join(", ")),
        _ => None,
    }
}

/// A recipe that made it through the filter, with its derived fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub total_time_minutes: u32,
    pub difficulty: Difficulty,
}

/// Difficulty tier derived from the total preparation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Hard,
    Medium,
    Easy,
    Unknown,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Hard,
        Difficulty::Medium,
        Difficulty::Easy,
        Difficulty::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Hard => "Hard",
            Difficulty::Medium => "Medium",
            Difficulty::Easy => "Easy",
            Difficulty::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| EtlError::ParseError(format!("unknown difficulty label '{s}'")))
    }
}

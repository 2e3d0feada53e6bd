mod file;
mod http;

pub use file::FileSource;
pub use http::HttpSource;

use crate::error::EtlError;
use crate::model::Recipe;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

/// Somewhere the raw recipe document can be read from
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Human readable location, used in logs
    fn describe(&self) -> String;

    /// Fetch the raw JSON document
    async fn fetch(&self) -> Result<String, EtlError>;

    /// Fetch the document and decode it into records
    async fn load(&self) -> Result<Vec<Recipe>, EtlError> {
        let text = self.fetch().await?;
        let records = parse_recipes(&text)?;
        debug!("Loaded {} records from {}", records.len(), self.describe());
        Ok(records)
    }
}

/// A document held in memory
pub struct JsonSource {
    document: String,
}

impl JsonSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

#[async_trait]
impl RecipeSource for JsonSource {
    fn describe(&self) -> String {
        format!("inline document ({} bytes)", self.document.len())
    }

    async fn fetch(&self) -> Result<String, EtlError> {
        Ok(self.document.clone())
    }
}

/// Decode a recipe collection.
///
/// Accepts either a JSON array of objects or newline-delimited JSON with one
/// object per line, optionally preceded by a UTF-8 byte order mark. Lines or
/// elements that are not recipe objects are skipped with a warning naming
/// their line (or element) number; a non-empty document without a single
/// usable record is an error.
pub fn parse_recipes(text: &str) -> Result<Vec<Recipe>, EtlError> {
    let entries = entries(text)?;
    let candidates = entries.len();
    let records: Vec<Recipe> = entries
        .into_iter()
        .filter_map(|(position, value)| {
            match value.and_then(serde_json::from_value::<Recipe>) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    warn!("Skipping record {}: {}", position, e);
                    None
                }
            }
        })
        .collect();

    if records.is_empty() && candidates > 0 {
        return Err(EtlError::ParseError(format!(
            "none of the {candidates} entries is a recipe object"
        )));
    }

    Ok(records)
}

type Entry = (usize, Result<Value, serde_json::Error>);

/// Candidate values with their 1-based element or line number
fn entries(text: &str) -> Result<Vec<Entry>, EtlError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)
            .map_err(|e| EtlError::ParseError(format!("invalid JSON array: {e}")))?;
        return Ok(values
            .into_iter()
            .enumerate()
            .map(|(i, value)| (i + 1, Ok(value)))
            .collect());
    }

    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, serde_json::from_str(line)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let text = r#"[
            {"name": "Stew", "ingredients": "beef", "prepTime": "PT10M", "cookTime": "PT2H"},
            {"name": "Salad", "ingredients": "lettuce"}
        ]"#;

        let records = parse_recipes(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cook_time.as_deref(), Some("PT2H"));
        assert!(records[1].prep_time.is_none());
    }

    #[test]
    fn test_parse_newline_delimited() {
        let text = concat!(
            r#"{"name": "Stew", "ingredients": "beef", "prepTime": "PT10M"}"#,
            "\n\n",
            r#"{"name": "Chili", "ingredients": "ground beef", "cookTime": "PT1H"}"#,
            "\n"
        );

        let records = parse_recipes(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].extra["name"], "Chili");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = concat!(
            r#"{"ingredients": "beef"}"#,
            "\n",
            r#"{"ingredients": "#,
            "\n",
            "42\n",
            r#"{"ingredients": "pork"}"#,
        );

        let records = parse_recipes(text).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_line_numbers_count_leading_blank_lines() {
        let text = "\n\n{\"ingredients\": \"beef\"}\nnot json\n\n{\"ingredients\": \"pork\"}\n";

        let positions: Vec<(usize, bool)> = entries(text)
            .unwrap()
            .into_iter()
            .map(|(line, value)| (line, value.is_ok()))
            .collect();
        assert_eq!(positions, vec![(3, true), (4, false), (6, true)]);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let ndjson = "\u{feff}{\"ingredients\": \"beef\"}\n{\"ingredients\": \"pork\"}\n";
        let records = parse_recipes(ndjson).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ingredients.as_deref(), Some("beef"));

        let array = "\u{feff}[{\"ingredients\": \"beef\"}]";
        assert_eq!(parse_recipes(array).unwrap().len(), 1);
        assert!(parse_recipes("\u{feff}").unwrap().is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_recipes("").unwrap().is_empty());
        assert!(parse_recipes("  \n ").unwrap().is_empty());
        assert!(parse_recipes("[]").unwrap().is_empty());
    }

    #[test]
    fn test_document_without_records_is_an_error() {
        assert!(matches!(
            parse_recipes("<html>not json</html>"),
            Err(EtlError::ParseError(_))
        ));
        assert!(matches!(
            parse_recipes("[1, 2, 3]"),
            Err(EtlError::ParseError(_))
        ));
        assert!(matches!(
            parse_recipes("[{\"ingredients\": \"beef\""),
            Err(EtlError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_json_source_load() {
        let source = JsonSource::new(r#"[{"ingredients": "beef"}]"#);
        let records = source.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(source.describe().contains("inline"));
    }
}

use super::RecordSink;
use crate::error::EtlError;
use crate::model::{EnrichedRecipe, Recipe, CONSUMED_FIELDS};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TOTAL_TIME_MINUTES: &str = "totalTimeMinutes";
const DIFFICULTY: &str = "difficulty";

const DERIVED_COLUMNS: [&str; 2] = [TOTAL_TIME_MINUTES, DIFFICULTY];

/// Field metadata marking a Utf8 column whose cells hold JSON text
const ENCODING_KEY: &str = "recipes_etl.encoding";
const JSON_ENCODING: &str = "json";

/// Writes the enriched records as a single parquet file
pub struct ParquetSink {
    path: PathBuf,
    compression: Compression,
}

impl ParquetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            compression: Compression::SNAPPY,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

#[async_trait]
impl RecordSink for ParquetSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn write(&self, records: &[EnrichedRecipe]) -> Result<PathBuf, EtlError> {
        let batch = to_record_batch(records)?;
        let path = self.path.clone();
        let compression = self.compression;

        let rows = batch.num_rows();
        tokio::task::spawn_blocking(move || write_atomically(&path, &batch, compression))
            .await
            .map_err(|e| EtlError::IoError(std::io::Error::other(e)))??;

        info!("Wrote {} records to {}", rows, self.path.display());
        Ok(self.path.clone())
    }
}

/// Encode to `<path>.tmp` and move it over `path` once the footer is written
fn write_atomically(
    path: &Path,
    batch: &RecordBatch,
    compression: Compression,
) -> Result<(), EtlError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result = encode(&tmp, batch, compression)
        .and_then(|()| fs::rename(&tmp, path).map_err(EtlError::from));
    if result.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!("Could not remove {}: {}", tmp.display(), e);
        }
    }
    result
}

fn encode(path: &Path, batch: &RecordBatch, compression: Compression) -> Result<(), EtlError> {
    let props = WriterProperties::builder()
        .set_compression(compression)
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(batch)?;
    writer.close()?;
    debug!("Encoded {} rows into {}", batch.num_rows(), path.display());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Text,
    Integer,
    Float,
    Boolean,
    Json,
}

impl ColumnKind {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(_) => Some(ColumnKind::Text),
            Value::Number(n) if n.is_i64() => Some(ColumnKind::Integer),
            Value::Number(_) => Some(ColumnKind::Float),
            Value::Bool(_) => Some(ColumnKind::Boolean),
            Value::Array(_) | Value::Object(_) => Some(ColumnKind::Json),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Json,
        }
    }

    /// Column type for a set of cells; all-null columns are stored as text
    fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        values
            .into_iter()
            .filter_map(ColumnKind::of)
            .reduce(ColumnKind::merge)
            .unwrap_or(ColumnKind::Text)
    }
}

/// Build the columnar batch written by [`ParquetSink`].
///
/// Columns are `ingredients`, `prepTime`, `cookTime`, then every other source
/// field in name order, then `totalTimeMinutes` and `difficulty`. The type of a
/// source field is inferred from its values across all records; fields whose
/// values do not share a scalar type are stored as JSON text. The consumed
/// fields are written with their source values, so an `ingredients` array or
/// a numeric `prepTime` is stored as it arrived.
pub fn to_record_batch(records: &[EnrichedRecipe]) -> Result<RecordBatch, EtlError> {
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for name in CONSUMED_FIELDS {
        let owned: Vec<Option<Value>> = records
            .iter()
            .map(|r| r.recipe.source_value(name))
            .collect();
        let cells: Vec<Option<&Value>> = owned.iter().map(Option::as_ref).collect();
        let (field, column) = value_column(name, &cells);
        fields.push(field);
        columns.push(column);
    }

    let extra_names: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.recipe.extra.keys().map(String::as_str))
        .collect();

    for name in extra_names {
        if DERIVED_COLUMNS.contains(&name) {
            warn!("Source field '{}' is replaced by the derived column", name);
            continue;
        }
        let cells: Vec<Option<&Value>> = records
            .iter()
            .map(|r| r.recipe.extra.get(name).filter(|v| !v.is_null()))
            .collect();
        let (field, column) = value_column(name, &cells);
        fields.push(field);
        columns.push(column);
    }

    fields.push(Field::new(TOTAL_TIME_MINUTES, DataType::Int64, false));
    columns.push(Arc::new(Int64Array::from(
        records
            .iter()
            .map(|r| i64::from(r.total_time_minutes))
            .collect::<Vec<_>>(),
    )));

    fields.push(Field::new(DIFFICULTY, DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(
        records
            .iter()
            .map(|r| r.difficulty.as_str())
            .collect::<Vec<_>>(),
    )));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn value_column(name: &str, cells: &[Option<&Value>]) -> (Field, ArrayRef) {
    let kind = ColumnKind::infer(cells.iter().flatten().copied());

    let column: ArrayRef = match kind {
        ColumnKind::Text => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|v| v.and_then(Value::as_str))
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Integer => Arc::new(Int64Array::from(
            cells
                .iter()
                .map(|v| v.and_then(Value::as_i64))
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Float => Arc::new(Float64Array::from(
            cells
                .iter()
                .map(|v| v.and_then(Value::as_f64))
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Boolean => Arc::new(BooleanArray::from(
            cells
                .iter()
                .map(|v| v.and_then(Value::as_bool))
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Json => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|v| v.map(|value| value.to_string()))
                .collect::<Vec<_>>(),
        )),
    };

    let field = Field::new(name, column.data_type().clone(), true);
    let field = if kind == ColumnKind::Json {
        field.with_metadata(HashMap::from([(
            ENCODING_KEY.to_string(),
            JSON_ENCODING.to_string(),
        )]))
    } else {
        field
    };

    (field, column)
}

/// Read a file produced by [`ParquetSink`] back into records
pub fn read_parquet(path: &Path) -> Result<Vec<EnrichedRecipe>, EtlError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        records.extend(records_from_batch(&batch?)?);
    }
    Ok(records)
}

fn records_from_batch(batch: &RecordBatch) -> Result<Vec<EnrichedRecipe>, EtlError> {
    let totals = typed_column::<Int64Array>(batch, TOTAL_TIME_MINUTES)?;
    let difficulty = typed_column::<StringArray>(batch, DIFFICULTY)?;

    let schema = batch.schema();
    let sources: Vec<(&Field, &ArrayRef)> = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .filter(|(field, _)| !DERIVED_COLUMNS.contains(&field.name().as_str()))
        .map(|(field, column)| (field.as_ref(), column))
        .collect();

    (0..batch.num_rows())
        .map(|row| -> Result<EnrichedRecipe, EtlError> {
            let mut recipe = Recipe::default();
            for (field, column) in &sources {
                if let Some(value) = cell_value(field, column, row)? {
                    recipe.insert_field(field.name().clone(), value);
                }
            }

            let total = totals.value(row);
            Ok(EnrichedRecipe {
                recipe,
                total_time_minutes: u32::try_from(total).map_err(|_| {
                    EtlError::ParseError(format!("{TOTAL_TIME_MINUTES} out of range: {total}"))
                })?,
                difficulty: difficulty.value(row).parse()?,
            })
        })
        .collect()
}

fn typed_column<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a T, EtlError> {
    batch
        .column_by_name(name)
        .and_then(|column| column.as_any().downcast_ref::<T>())
        .ok_or_else(|| EtlError::ParseError(format!("missing or mistyped column '{name}'")))
}

fn cell_value(field: &Field, column: &ArrayRef, row: usize) -> Result<Option<Value>, EtlError> {
    if column.is_null(row) {
        return Ok(None);
    }

    let mistyped = || EtlError::ParseError(format!("column '{}' has mismatched data", field.name()));
    let value = match field.data_type() {
        DataType::Utf8 => {
            let text = column
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(mistyped)?
                .value(row);
            let is_json = field
                .metadata()
                .get(ENCODING_KEY)
                .is_some_and(|encoding| encoding == JSON_ENCODING);
            if is_json {
                serde_json::from_str(text).map_err(|e| {
                    EtlError::ParseError(format!("column '{}': {}", field.name(), e))
                })?
            } else {
                Value::String(text.to_string())
            }
        }
        DataType::Int64 => Value::from(
            column
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(mistyped)?
                .value(row),
        ),
        DataType::Float64 => Value::from(
            column
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(mistyped)?
                .value(row),
        ),
        DataType::Boolean => Value::Bool(
            column
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(mistyped)?
                .value(row),
        ),
        other => {
            return Err(EtlError::ParseError(format!(
                "column '{}' has unsupported type {}",
                field.name(),
                other
            )))
        }
    };
    Ok(Some(value))
}

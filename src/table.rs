// src/table.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{new_null_array, ArrayRef, TimestampMicrosecondArray},
    compute::{can_cast_types, cast, concat_batches},
    datatypes::{DataType, Field, FieldRef, Schema, TimeUnit},
    record_batch::{RecordBatch, RecordBatchReader},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

use crate::schema::{
    arrow::UTC, declared_schema, extraction_timestamp_type, EXTRACTION_TIMESTAMP_COLUMN,
};

/// Zero rows, zero columns.
pub fn empty_table() -> RecordBatch {
    RecordBatch::new_empty(Arc::new(Schema::empty()))
}

/// Decode a whole parquet file held in memory into a single batch.
pub fn decode_parquet(body: Bytes) -> Result<RecordBatch> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(body)
        .context("reading parquet metadata")?
        .build()
        .context("building parquet reader")?;
    let schema = reader.schema();
    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context("decoding parquet row groups")?;
    debug!(row_groups = batches.len(), "decoded parquet");
    concat_batches(&schema, &batches).context("combining row groups")
}

/// Append `extraction_timestamp` set to `at` on every row.
///
/// An existing column of that name is dropped first so the tag is always last.
pub fn with_extraction_timestamp(table: RecordBatch, at: DateTime<Utc>) -> Result<RecordBatch> {
    let schema = table.schema();
    let rows = table.num_rows();

    let (mut fields, mut columns): (Vec<FieldRef>, Vec<ArrayRef>) = schema
        .fields()
        .iter()
        .zip(table.columns())
        .filter(|(field, _)| field.name() != EXTRACTION_TIMESTAMP_COLUMN)
        .map(|(field, column)| (field.clone(), column.clone()))
        .unzip();

    let stamp = TimestampMicrosecondArray::from_value(at.timestamp_micros(), rows).with_timezone(UTC);
    fields.push(Arc::new(Field::new(
        EXTRACTION_TIMESTAMP_COLUMN,
        extraction_timestamp_type(),
        false,
    )));
    columns.push(Arc::new(stamp));

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    RecordBatch::try_new(Arc::new(schema), columns).context("appending extraction timestamp")
}

/// Stack `tables` row-wise, in order, over the union of their columns.
///
/// Columns are ordered by first appearance and a table without some column
/// gets nulls there. A column whose type differs between tables is widened
/// to a common type (see [`common_type`]). Values that cannot be converted
/// become nulls rather than failing the whole result.
pub fn concat_tables(tables: &[RecordBatch]) -> Result<RecordBatch> {
    if tables.is_empty() {
        return Ok(empty_table());
    }

    let schema = unified_schema(tables);
    let aligned = tables
        .iter()
        .map(|table| align_to(table, &schema))
        .collect::<Result<Vec<_>>>()?;

    concat_batches(&schema, &aligned).context("concatenating fetched tables")
}

/// Smallest type both `first` and `other` can be cast into, if there is one.
///
/// - equal types and `Null` + anything keep the non-null type
/// - integers of one signedness take the wider width; mixed signedness is Int64
/// - integers and floats together are Float64
/// - timestamps of any unit are microseconds, keeping `first`'s zone
/// - string flavours are LargeUtf8
pub fn common_type(first: &DataType, other: &DataType) -> Option<DataType> {
    match (first, other) {
        (a, b) if a == b => Some(a.clone()),
        (DataType::Null, t) | (t, DataType::Null) => Some(t.clone()),
        (DataType::Timestamp(_, tz), DataType::Timestamp(_, _)) => {
            Some(DataType::Timestamp(TimeUnit::Microsecond, tz.clone()))
        }
        (a, b) if a.is_integer() && b.is_integer() => {
            if a.is_signed_integer() != b.is_signed_integer() {
                Some(DataType::Int64)
            } else if a.primitive_width() >= b.primitive_width() {
                Some(a.clone())
            } else {
                Some(b.clone())
            }
        }
        (a, b) if a.is_numeric() && b.is_numeric() => Some(DataType::Float64),
        (
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View,
        ) => Some(DataType::LargeUtf8),
        _ => None,
    }
}

fn unified_schema(tables: &[RecordBatch]) -> Arc<Schema> {
    let declared = declared_schema();
    let mut order: Vec<String> = Vec::new();
    let mut types: HashMap<String, DataType> = HashMap::new();

    for table in tables {
        for field in table.schema().fields() {
            match types.get_mut(field.name()) {
                None => {
                    order.push(field.name().clone());
                    types.insert(field.name().clone(), field.data_type().clone());
                }
                Some(existing) if existing != field.data_type() => {
                    let widened = common_type(existing, field.data_type()).unwrap_or_else(|| {
                        // no common type: a declared column keeps its declared type
                        declared
                            .field_with_name(field.name())
                            .map(|f| f.data_type().clone())
                            .unwrap_or(DataType::Utf8)
                    });
                    debug!(
                        column = %field.name(),
                        from = %existing,
                        with = %field.data_type(),
                        to = %widened,
                        "widening column type"
                    );
                    *existing = widened;
                }
                Some(_) => {}
            }
        }
    }

    let fields: Vec<Field> = order
        .into_iter()
        .map(|name| {
            let dt = types.remove(&name).unwrap_or(DataType::Null);
            Field::new(name, dt, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

fn align_to(table: &RecordBatch, schema: &Arc<Schema>) -> Result<RecordBatch> {
    let rows = table.num_rows();
    let columns: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| match table.column_by_name(field.name()) {
            Some(column) if column.data_type() == field.data_type() => column.clone(),
            Some(column) => {
                let target = field.data_type();
                let cast_result = if can_cast_types(column.data_type(), target) {
                    cast(column, target).map_err(anyhow::Error::from)
                } else {
                    Err(anyhow!("no cast from {} to {}", column.data_type(), target))
                };
                cast_result.unwrap_or_else(|e| {
                    warn!(column = %field.name(), "nulling column in one table: {:#}", e);
                    new_null_array(target, rows)
                })
            }
            None => new_null_array(field.data_type(), rows),
        })
        .collect();
    RecordBatch::try_new(schema.clone(), columns).context("aligning table to unified schema")
}

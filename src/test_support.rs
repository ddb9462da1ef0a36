// src/test_support.rs

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray},
    datatypes::Schema,
    record_batch::RecordBatch,
};
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::sync::Arc;

use crate::schema::{build_arrow_schema, ColumnType, TRIP_COLUMNS};

/// A trip table with every declared column, one row per vendor id.
pub fn sample_trip_table(vendor_ids: &[i64]) -> RecordBatch {
    let schema: Arc<Schema> = build_arrow_schema(TRIP_COLUMNS);
    let base = 1_672_531_200_000_000i64; // 2023-01-01T00:00:00Z
    let columns: Vec<ArrayRef> = TRIP_COLUMNS
        .iter()
        .map(|col| -> ArrayRef {
            match col.ty {
                ColumnType::Integer => Arc::new(Int64Array::from(vendor_ids.to_vec())),
                ColumnType::Float => Arc::new(Float64Array::from_iter_values(
                    vendor_ids.iter().map(|v| *v as f64 * 1.5),
                )),
                ColumnType::String => Arc::new(StringArray::from_iter_values(
                    vendor_ids.iter().map(|v| if v % 2 == 0 { "Y" } else { "N" }),
                )),
                ColumnType::Timestamp => Arc::new(TimestampMicrosecondArray::from_iter_values(
                    vendor_ids.iter().map(|v| base + v * 60_000_000),
                )),
            }
        })
        .collect();
    RecordBatch::try_new(schema, columns).expect("sample columns match declared schema")
}

/// Serialize `table` to an in-memory parquet file.
pub fn to_parquet_bytes(table: &RecordBatch, max_row_group_size: Option<usize>) -> Result<Bytes> {
    let mut props = WriterProperties::builder();
    if let Some(size) = max_row_group_size {
        props = props.set_max_row_group_size(size);
    }
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, table.schema(), Some(props.build()))?;
    writer.write(table)?;
    writer.close()?;
    Ok(Bytes::from(buf))
}

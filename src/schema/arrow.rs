// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, TimeUnit};
use std::sync::Arc;

use super::types::{Column, ColumnType, EXTRACTION_COLUMN, TRIP_COLUMNS};

pub const UTC: &str = "UTC";

/// Map a declared column type into an Arrow DataType.
///
/// - integer   → Int64
/// - float     → Float64
/// - string    → Utf8
/// - timestamp → Timestamp(µs)
pub fn map_to_arrow_type(ty: ColumnType) -> DataType {
    match ty {
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::String => DataType::Utf8,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

/// Arrow type of `extraction_timestamp`: UTC microseconds.
pub fn extraction_timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some(Arc::from(UTC)))
}

/// Build an ArrowSchema (inside an Arc) from a slice of declared `Column`s.
pub fn build_arrow_schema(cols: &[Column]) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| {
            let dt = if *col == EXTRACTION_COLUMN {
                extraction_timestamp_type()
            } else {
                map_to_arrow_type(col.ty)
            };
            ArrowField::new(col.name, dt, /* nullable = */ true)
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// Full declared output schema: trip columns plus `extraction_timestamp`.
pub fn declared_schema() -> Arc<ArrowSchema> {
    let cols: Vec<Column> = TRIP_COLUMNS
        .iter()
        .copied()
        .chain(std::iter::once(EXTRACTION_COLUMN))
        .collect();
    build_arrow_schema(&cols)
}

/// Declared trip columns that `schema` does not contain, by name.
pub fn missing_columns(schema: &ArrowSchema) -> Vec<&'static str> {
    TRIP_COLUMNS
        .iter()
        .filter(|col| schema.field_with_name(col.name).is_err())
        .map(|col| col.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EXTRACTION_TIMESTAMP_COLUMN;

    #[test]
    fn declared_schema_ends_with_extraction_column() {
        let schema = declared_schema();
        assert_eq!(schema.fields().len(), TRIP_COLUMNS.len() + 1);

        let last = schema.field(schema.fields().len() - 1);
        assert_eq!(last.name(), EXTRACTION_TIMESTAMP_COLUMN);
        assert_eq!(last.data_type(), &extraction_timestamp_type());
        assert_eq!(
            schema.field_with_name("store_and_fwd_flag").unwrap().data_type(),
            &DataType::Utf8
        );
    }

    #[test]
    fn reports_missing_trip_columns() {
        assert!(missing_columns(&declared_schema()).is_empty());

        let partial = ArrowSchema::new(vec![
            ArrowField::new("VendorID", DataType::Int64, true),
            ArrowField::new("trip_distance", DataType::Float64, true),
        ]);
        let missing = missing_columns(&partial);
        assert_eq!(missing.len(), TRIP_COLUMNS.len() - 2);
        assert!(missing.contains(&"airport_fee"));
        assert!(!missing.contains(&"VendorID"));
    }
}

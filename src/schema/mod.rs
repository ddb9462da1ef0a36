pub mod arrow;
pub mod types;

pub use self::arrow::{
    build_arrow_schema, declared_schema, extraction_timestamp_type, map_to_arrow_type,
    missing_columns,
};
pub use types::{Column, ColumnType, EXTRACTION_TIMESTAMP_COLUMN, TRIP_COLUMNS};

// src/schema/types.rs

/// Logical column types used in the declared trip table.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Timestamp,
}

/// A single declared output column.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty }
}

pub const EXTRACTION_TIMESTAMP_COLUMN: &str = "extraction_timestamp";

/// Columns every trip file is expected to carry, in published order.
pub const TRIP_COLUMNS: &[Column] = &[
    col("VendorID", ColumnType::Integer),
    col("tpep_pickup_datetime", ColumnType::Timestamp),
    col("tpep_dropoff_datetime", ColumnType::Timestamp),
    col("passenger_count", ColumnType::Float),
    col("trip_distance", ColumnType::Float),
    col("RatecodeID", ColumnType::Float),
    col("store_and_fwd_flag", ColumnType::String),
    col("PULocationID", ColumnType::Integer),
    col("DOLocationID", ColumnType::Integer),
    col("payment_type", ColumnType::Integer),
    col("fare_amount", ColumnType::Float),
    col("extra", ColumnType::Float),
    col("mta_tax", ColumnType::Float),
    col("tip_amount", ColumnType::Float),
    col("tolls_amount", ColumnType::Float),
    col("improvement_surcharge", ColumnType::Float),
    col("total_amount", ColumnType::Float),
    col("congestion_surcharge", ColumnType::Float),
    col("airport_fee", ColumnType::Float),
];

/// The appended lineage column.
pub const EXTRACTION_COLUMN: Column = col(EXTRACTION_TIMESTAMP_COLUMN, ColumnType::Timestamp);

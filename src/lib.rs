pub mod config;
pub mod fetch;
pub mod ingest;
pub mod months;
pub mod output;
pub mod schema;
pub mod table;

#[cfg(test)]
mod test_support;

pub use config::{RunConfig, RunWindow};
pub use ingest::{FetchOutcome, Fetcher, IngestRun, RunReport};

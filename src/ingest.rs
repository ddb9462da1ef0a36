// src/ingest.rs

use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::config::{RunConfig, RunWindow};
use crate::fetch::{HttpSource, SourceClient, SourceRef};
use crate::schema::missing_columns;
use crate::table::{concat_tables, decode_parquet, empty_table, with_extraction_timestamp};

/// What happened to one source reference.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched { rows: usize },
    Failed { error: anyhow::Error },
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched { .. })
    }
}

/// Every attempted source reference, in attempt order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<(SourceRef, FetchOutcome)>,
}

impl RunReport {
    fn record(&mut self, source: SourceRef, outcome: FetchOutcome) {
        self.entries.push((source, outcome));
    }

    pub fn attempted(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_fetched()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&SourceRef, &anyhow::Error)> {
        self.entries.iter().filter_map(|(source, outcome)| match outcome {
            FetchOutcome::Failed { error } => Some((source, error)),
            FetchOutcome::Fetched { .. } => None,
        })
    }
}

/// Result table plus the per-reference report that produced it.
#[derive(Debug)]
pub struct IngestRun {
    pub table: RecordBatch,
    pub report: RunReport,
}

impl IngestRun {
    fn empty(report: RunReport) -> Self {
        Self {
            table: empty_table(),
            report,
        }
    }
}

/// Downloads every (month, taxi type) trip file in the run window and stacks them.
pub struct Fetcher<S> {
    config: RunConfig,
    source: S,
}

impl Fetcher<HttpSource> {
    /// HTTP-backed fetcher honoring `config.request_timeout`.
    pub fn from_config(config: RunConfig) -> Result<Self> {
        let source = HttpSource::new(config.request_timeout)?;
        Ok(Self::new(config, source))
    }
}

impl<S: SourceClient> Fetcher<S> {
    pub fn new(config: RunConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Source references for `window`: months ascending, then taxi types in list order.
    pub fn source_refs(&self, window: RunWindow) -> impl Iterator<Item = SourceRef> + '_ {
        window.months().flat_map(move |month| {
            self.config.taxi_types.iter().filter_map(move |taxi_type| {
                SourceRef::new(&self.config.base_url, taxi_type, month)
                    .map_err(|e| error!(%taxi_type, %month, "skipping source: {:#}", e))
                    .ok()
            })
        })
    }

    /// Fetch the whole window. Nothing here is fatal: download and parse
    /// failures land in the report, and a result that cannot be assembled is
    /// logged and comes back empty.
    #[instrument(level = "info", skip(self), fields(taxi_types = ?self.config.taxi_types))]
    pub async fn run(&self) -> IngestRun {
        let Some(window) = self.config.window else {
            warn!("run window start or end date not set; returning empty table");
            return IngestRun::empty(RunReport::default());
        };

        let mut tables = Vec::new();
        let mut report = RunReport::default();

        for source in self.source_refs(window) {
            info!(url = %source.url, "downloading");
            let start = Instant::now();
            match self.fetch_one(&source).await {
                Ok(table) => {
                    let rows = table.num_rows();
                    info!(%source, rows, elapsed = ?start.elapsed(), "downloaded");
                    tables.push(table);
                    report.record(source, FetchOutcome::Fetched { rows });
                }
                Err(error) => {
                    error!(url = %source.url, "failed to download: {:#}", error);
                    report.record(source, FetchOutcome::Failed { error });
                }
            }
        }

        if tables.is_empty() {
            info!(attempted = report.attempted(), "no data found for the given range");
            return IngestRun::empty(report);
        }

        let table = match concat_tables(&tables) {
            Ok(table) => table,
            Err(e) => {
                error!(tables = tables.len(), "could not build result table: {:#}", e);
                return IngestRun::empty(report);
            }
        };
        info!(
            rows = table.num_rows(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "ingest complete"
        );
        IngestRun { table, report }
    }

    /// The host contract: just the result table.
    pub async fn materialize(&self) -> RecordBatch {
        self.run().await.table
    }

    async fn fetch_one(&self, source: &SourceRef) -> Result<RecordBatch> {
        let body = self.source.fetch(&source.url).await?;
        let table =
            decode_parquet(body).with_context(|| format!("parsing parquet from {}", source.url))?;

        let missing = missing_columns(&table.schema());
        if !missing.is_empty() {
            warn!(%source, ?missing, "file lacks declared columns");
        }

        with_extraction_timestamp(table, Utc::now())
    }
}

// src/output.rs

use anyhow::{bail, Context, Result};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{fs, fs::File, path::Path};
use tracing::info;

/// Write the result table to a single SNAPPY-compressed parquet file at `path`.
pub fn write_parquet(table: &RecordBatch, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if table.num_columns() == 0 {
        bail!("refusing to write a table with no columns to {:?}", path);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }

    let file = File::create(path).with_context(|| format!("creating output file {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, table.schema(), Some(props))
        .context("creating Arrow writer for output")?;
    writer.write(table).context("writing output batch")?;
    writer.close().context("closing output writer")?;

    info!(path = %path.display(), rows = table.num_rows(), "wrote parquet");
    Ok(())
}

//! Parquet writing for projected segment tables.
//!
//! Writes one Parquet file per segment name into `segment=<NAME>/`
//! partition directories, building each table's column set as the union
//! of cell keys across its rows in first-seen order.

use crate::config::ProcessorConfig;
use crate::constants::{
    MESSAGE_CONTROL_ID_COLUMN, OUTPUT_FILE_PREFIX, OUTPUT_FILE_TIMESTAMP_FORMAT,
    SEGMENT_PARTITION_PREFIX,
};
use crate::error::{Hl7Error, Result};
use crate::models::ProjectedRow;

use chrono::Utc;
use polars::prelude::{Column, DataFrame, ParquetWriter as PolarsParquetWriter};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// One written segment table
#[derive(Debug, Clone)]
pub struct WrittenTable {
    pub segment: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes projected row sets to partitioned Parquet files
#[derive(Debug)]
pub struct TableWriter {
    output_path: PathBuf,
    config: ProcessorConfig,
}

impl TableWriter {
    pub fn new(output_path: PathBuf, config: ProcessorConfig) -> Self {
        Self {
            output_path,
            config,
        }
    }

    /// Write every table to its partition directory, returning the
    /// written locations in segment-name order.
    pub fn write_tables(
        &self,
        tables: &HashMap<String, Vec<ProjectedRow>>,
    ) -> Result<Vec<WrittenTable>> {
        let mut written = Vec::new();
        let timestamp = Utc::now().format(OUTPUT_FILE_TIMESTAMP_FORMAT);

        let mut segment_names: Vec<&String> = tables.keys().collect();
        segment_names.sort();

        for segment_name in segment_names {
            let rows = &tables[segment_name];
            if rows.is_empty() {
                continue;
            }

            let mut df = build_dataframe(rows)?;

            let partition_dir = self
                .output_path
                .join(format!("{}{}", SEGMENT_PARTITION_PREFIX, segment_name));
            std::fs::create_dir_all(&partition_dir)?;

            let file_path =
                partition_dir.join(format!("{}{}.parquet", OUTPUT_FILE_PREFIX, timestamp));
            let file = std::fs::File::create(&file_path)?;

            PolarsParquetWriter::new(file)
                .with_compression(self.config.compression.to_polars_compression())
                .finish(&mut df)
                .map_err(|e| Hl7Error::ProcessingFailed {
                    path: file_path.clone(),
                    reason: format!("Failed to write segment table: {}", e),
                })?;

            debug!(
                "Wrote {} rows for segment {} to {}",
                rows.len(),
                segment_name,
                file_path.display()
            );

            written.push(WrittenTable {
                segment: segment_name.clone(),
                path: file_path,
                rows: rows.len(),
            });
        }

        Ok(written)
    }
}

/// Build a DataFrame from one segment's rows.
///
/// Columns are the correlation key followed by the union of cell keys in
/// first-seen order; rows missing a column get a null cell.
fn build_dataframe(rows: &[ProjectedRow]) -> Result<DataFrame> {
    let mut column_order: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for row in rows {
        for (name, _) in &row.cells {
            if seen.insert(name) {
                column_order.push(name.clone());
            }
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(column_order.len() + 1);

    let ids: Vec<&str> = rows
        .iter()
        .map(|row| row.message_control_id.as_str())
        .collect();
    columns.push(Column::new(MESSAGE_CONTROL_ID_COLUMN.into(), ids));

    for name in &column_order {
        let values: Vec<Option<&str>> = rows.iter().map(|row| row.cell(name)).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

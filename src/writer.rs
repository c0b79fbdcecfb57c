//! Batch writer: rows → Parquet row groups.
//!
//! [`get_writer`] resolves the write schema of a table type once and returns a
//! [`BatchWriter`]. Each [`BatchWriter::write`] call streams an input row
//! sequence into a new Parquet file, one row group per `recs_per_group` rows.
//!
//! ```no_run
//! use ironbeam_columnar::{FieldType, LogicalType, PrimitiveKind, Row, TypeSystem, Value, get_writer};
//! # fn main() -> anyhow::Result<()> {
//! let types = TypeSystem::new();
//! let table = LogicalType::table(vec![FieldType::new("x", LogicalType::req(PrimitiveKind::Int64))]);
//! let writer = get_writer(&types, &table, 5000)?;
//!
//! let rows = (0..3).map(|i| Row::new(vec![Value::Int64(i)]));
//! let mut out = Vec::new();
//! let groups = writer.write(rows, &mut out, None, 10)?;
//! assert_eq!(groups, 1);
//! # Ok(())
//! # }
//! ```

use crate::codegen::{Extract, synthesize};
use crate::config::{WriteOptions, clamp_freq, clamp_recs_per_group};
use crate::error::CodecError;
use crate::io::parquet::ParquetGroupWriter;
use crate::observability::{log_debug, log_info};
use crate::schema::{DroppedColumn, SchemaInfo};
use crate::types::{LogicalType, TypeSystem};
use crate::value::Row;
use anyhow::{Context, Result};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes row sequences of one table type as Parquet files.
pub struct BatchWriter {
    info: SchemaInfo,
    extract: Extract,
    recs_per_group: usize,
    options: WriteOptions,
}

/// Build a writer for `table` with `recs_per_group` rows per row group
/// (clamped to `[1, 1_000_000]`, `<= 0` meaning 5000).
///
/// # Errors
///
/// Returns [`CodecError::Precondition`] if `table` is not a table of records.
pub fn get_writer(types: &TypeSystem, table: &LogicalType, recs_per_group: i64) -> Result<BatchWriter> {
    get_writer_with(
        types,
        table,
        &WriteOptions {
            recs_per_group,
            ..WriteOptions::default()
        },
    )
}

/// [`get_writer`] with full [`WriteOptions`].
///
/// # Errors
///
/// Returns [`CodecError::Precondition`] if `table` is not a table of records.
pub fn get_writer_with(types: &TypeSystem, table: &LogicalType, options: &WriteOptions) -> Result<BatchWriter> {
    let info = SchemaInfo::for_write(types, table)?;
    let routines = synthesize(&info)?;
    let recs_per_group = clamp_recs_per_group(options.recs_per_group);
    log_debug!(
        component = "writer",
        event = "writer_created",
        record = %info.record_type(),
        fields = info.fields().len(),
        dropped = info.dropped().len(),
        recs_per_group,
    );
    Ok(BatchWriter {
        info,
        extract: routines.extract,
        recs_per_group,
        options: options.clone(),
    })
}

impl BatchWriter {
    /// Names of the written columns, in output order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.info.field_names()
    }

    /// Table fields that are not written.
    #[must_use]
    pub fn dropped_fields(&self) -> &[DroppedColumn] {
        self.info.dropped()
    }

    #[must_use]
    pub const fn recs_per_group(&self) -> usize {
        self.recs_per_group
    }

    /// Write `rows` to `sink` as one Parquet file and return the number of
    /// row groups written.
    ///
    /// Rows must have one value per field of the table's record type.
    /// `progress` receives the cumulative row count before each flush and
    /// every `freq` rows (clamped like the reader's cadence) while
    /// accumulating. Empty input still produces one empty row group.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] for rows that do not fit the table type, and
    /// the library error if encoding or writing fails.
    pub fn write<I, W>(
        &self,
        rows: I,
        sink: W,
        mut progress: Option<&mut dyn FnMut(u64)>,
        freq: i64,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Row>,
        W: Write + Send,
    {
        let freq = clamp_freq(freq) as u64;
        let width = self.info.layout().width();
        let props = WriterProperties::builder()
            .set_compression(self.options.compression.to_parquet())
            .build();
        let mut out = ParquetGroupWriter::try_new(sink, self.extract.schema().clone(), props)?;

        let mut buffer: Vec<Row> = Vec::with_capacity(self.recs_per_group.min(64 * 1024));
        let mut total: u64 = 0;
        let mut report = |n: u64| {
            if let Some(p) = progress.as_deref_mut() {
                p(n);
            }
        };

        for row in rows {
            if row.width() != width {
                return Err(CodecError::RowWidth {
                    expected: width,
                    actual: row.width(),
                }
                .into());
            }
            buffer.push(row);
            total += 1;
            if total % freq == 0 {
                report(total);
            }
            if buffer.len() == self.recs_per_group {
                report(total);
                self.flush(&mut out, &mut buffer)?;
            }
        }
        if !buffer.is_empty() || out.row_groups() == 0 {
            report(total);
            self.flush(&mut out, &mut buffer)?;
        }

        let groups = out.finish()?;
        log_info!(
            component = "writer",
            event = "write_completed",
            rows = total,
            row_groups = groups,
        );
        Ok(groups)
    }

    fn flush<W: Write + Send>(&self, out: &mut ParquetGroupWriter<W>, buffer: &mut Vec<Row>) -> Result<()> {
        let columns = self.extract.extract(buffer, buffer.len())?;
        out.write_row_group(&columns)?;
        log_debug!(
            component = "writer",
            event = "row_group_written",
            group = out.row_groups() - 1,
            rows = buffer.len(),
        );
        buffer.clear();
        Ok(())
    }
}

/// Write `rows` of `table` to a new file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created, plus everything
/// [`BatchWriter::write`] returns.
pub fn write_path<I>(
    types: &TypeSystem,
    table: &LogicalType,
    rows: I,
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> Result<usize>
where
    I: IntoIterator<Item = Row>,
{
    let path = path.as_ref();
    let writer = get_writer_with(types, table, options)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    writer.write(rows, file, None, options.freq)
}

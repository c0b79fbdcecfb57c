//! Streaming reader: Parquet row groups → [`RowSequence`].
//!
//! A [`Reader`] is built in two steps:
//! 1. [`Reader::create`] opens the file, resolves the [`SchemaInfo`] and
//!    synthesizes the populate routine. Nothing is decoded yet.
//! 2. [`Reader::run`] decodes every row group in file order and appends the
//!    rows to the reader's [`RowSequence`]. Consumers holding a clone of the
//!    sequence can iterate it from another thread while `run` is going.
//!
//! [`read`] does both in one call.
//!
//! ```no_run
//! use ironbeam_columnar::{ReadOptions, TypeSystem, read};
//! use std::fs::File;
//! # fn main() -> anyhow::Result<()> {
//! let types = TypeSystem::new();
//! let file = File::open("data.parquet")?;
//! let (ty, rows) = read(&types, file, &ReadOptions::default(), None, None)?;
//! println!("{ty}: {} rows", rows.len());
//! # Ok(())
//! # }
//! ```

use crate::codegen::{Populate, synthesize};
use crate::config::{ReadOptions, clamp_freq};
use crate::error::CodecError;
use crate::io::ColumnarReader;
use crate::io::parquet::{ParquetColumnReader, SharedSource};
use crate::observability::{log_debug, log_info, log_warn};
use crate::schema::{DroppedColumn, SchemaInfo};
use crate::sequence::RowSequence;
use crate::types::{LogicalType, TypeSystem};
use crate::value::Row;
use anyhow::{Context, Result};
use arrow::array::ArrayRef;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Progress callback: receives the cumulative number of rows produced (or
/// written) so far. Values never decrease.
pub type Progress = Box<dyn FnMut(u64) + Send>;

/// Lifecycle of a [`Reader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderState {
    Created,
    Running,
    Completed,
    Failed,
}

/// Decodes a columnar file into a [`RowSequence`].
pub struct Reader {
    info: SchemaInfo,
    populate: Populate,
    sequence: RowSequence,
    progress: Option<Progress>,
    freq: i64,
    state: ReaderState,
}

impl Reader {
    /// Open `stream` as a Parquet file and prepare to decode it.
    ///
    /// The stream is consumed: it is released when the reader is dropped, or
    /// immediately if construction fails.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Precondition`] if the stream cannot seek or read,
    /// and the library error if the footer cannot be decoded.
    pub fn create<S>(
        types: &TypeSystem,
        stream: S,
        options: &ReadOptions,
        progress: Option<Progress>,
    ) -> Result<Self>
    where
        S: Read + Seek + Send + 'static,
    {
        let source = SharedSource::new(stream)?;
        let columnar = ParquetColumnReader::open(source)?;
        Self::with_columnar(types, Box::new(columnar), options, progress)
    }

    /// Prepare to decode from any [`ColumnarReader`], taking ownership of it.
    ///
    /// # Errors
    ///
    /// Fails if no populate routine can be built for the resolved schema.
    pub fn with_columnar(
        types: &TypeSystem,
        columnar: Box<dyn ColumnarReader>,
        options: &ReadOptions,
        progress: Option<Progress>,
    ) -> Result<Self> {
        let info = SchemaInfo::for_read(types, columnar, options.suppress_optional)?;
        let routines = synthesize(&info)?;
        log_debug!(
            component = "reader",
            event = "reader_created",
            record = %info.record_type(),
            fields = info.fields().len(),
            dropped = info.dropped().len(),
            suppress_optional = options.suppress_optional,
        );
        Ok(Self {
            info,
            populate: routines.populate,
            sequence: RowSequence::new(),
            progress,
            freq: options.freq,
            state: ReaderState::Created,
        })
    }

    /// Names of the surviving fields, in schema order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.info.field_names()
    }

    /// Logical type of the result: a sequence of the inferred record type.
    #[must_use]
    pub fn logical_type(&self) -> LogicalType {
        LogicalType::sequence(self.info.record_type().clone())
    }

    /// Handle to the output sequence. Clones share the same rows.
    #[must_use]
    pub fn sequence(&self) -> RowSequence {
        self.sequence.clone()
    }

    #[must_use]
    pub const fn state(&self) -> ReaderState {
        self.state
    }

    #[must_use]
    pub const fn schema(&self) -> &SchemaInfo {
        &self.info
    }

    /// Columns excluded from the inferred schema.
    #[must_use]
    pub fn dropped_columns(&self) -> &[DroppedColumn] {
        self.info.dropped()
    }

    /// Decode every row group into the output sequence.
    ///
    /// On success the sequence is completed. On failure it is failed with the
    /// error's message, and the original error is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Precondition`] if called more than once, and
    /// otherwise whatever the columnar library or the populate routine raised.
    pub fn run(&mut self) -> Result<()> {
        if self.state != ReaderState::Created {
            return Err(CodecError::precondition(format!(
                "reader already ran (state {:?})",
                self.state
            ))
            .into());
        }
        self.state = ReaderState::Running;
        match self.produce() {
            Ok(total) => {
                self.sequence.complete();
                self.state = ReaderState::Completed;
                log_info!(component = "reader", event = "read_completed", rows = total);
                Ok(())
            }
            Err(err) => {
                self.sequence.fail(format!("{err:#}"));
                self.state = ReaderState::Failed;
                log_warn!(component = "reader", event = "read_failed", error = %err);
                Err(err)
            }
        }
    }

    fn report(&mut self, rows: u64) {
        if let Some(progress) = self.progress.as_mut() {
            progress(rows);
        }
    }

    fn produce(&mut self) -> Result<u64> {
        let batch = clamp_freq(self.freq);
        let width = self.info.layout().width();
        let columns: Vec<usize> = self.info.fields().iter().map(|f| f.column).collect();
        let groups = self.source()?.num_row_groups();
        let mut total: u64 = 0;
        let mut buffer: Vec<Row> = Vec::with_capacity(batch);

        for group in 0..groups {
            let len = self.source()?.row_group_len(group);
            let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());
            for (field, &column) in columns.iter().enumerate() {
                self.report(total);
                let array = self.source()?.read_column(group, column)?;
                if array.len() != len {
                    return Err(CodecError::ColumnLength {
                        group,
                        field: self.info.fields()[field].name.clone(),
                        expected: len,
                        actual: array.len(),
                    }
                    .into());
                }
                arrays.push(array);
            }
            log_debug!(
                component = "reader",
                event = "row_group_decoded",
                group,
                rows = len,
            );

            let mut offset = 0;
            while offset < len {
                let count = batch.min(len - offset);
                buffer.resize_with(count, || Row::blank(width));
                self.populate.populate(&mut buffer, count, offset, &arrays)?;
                self.sequence.extend(buffer.drain(..));
                offset += count;
                total += count as u64;
                self.report(total);
            }
        }
        Ok(total)
    }

    fn source(&mut self) -> Result<&mut (dyn ColumnarReader + 'static)> {
        self.info
            .source_mut()
            .ok_or_else(|| CodecError::precondition("schema has no physical reader").into())
    }
}

impl Drop for Reader {
    // Consumers must never wait on a producer that is gone, whether it was
    // never run or unwound out of `run`.
    fn drop(&mut self) {
        if matches!(self.state, ReaderState::Created | ReaderState::Running)
            && self.sequence.fail("reader dropped before completion")
        {
            log_warn!(
                component = "reader",
                event = "reader_dropped",
                state = ?self.state,
                rows = self.sequence.len(),
            );
        }
    }
}

/// Open `stream`, optionally hand `(type, sequence)` to `notify`, then decode
/// everything and return the pair.
///
/// `notify` runs before population starts, so it can hand the sequence to a
/// consumer on another thread.
///
/// # Errors
///
/// See [`Reader::create`] and [`Reader::run`].
pub fn read<S>(
    types: &TypeSystem,
    stream: S,
    options: &ReadOptions,
    progress: Option<Progress>,
    notify: Option<&mut dyn FnMut(&LogicalType, &RowSequence)>,
) -> Result<(LogicalType, RowSequence)>
where
    S: Read + Seek + Send + 'static,
{
    let mut reader = Reader::create(types, stream, options, progress)?;
    let ty = reader.logical_type();
    let sequence = reader.sequence();
    if let Some(notify) = notify {
        notify(&ty, &sequence);
    }
    reader.run()?;
    Ok((ty, sequence))
}

/// [`read`] from a file path.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, plus everything [`read`] returns.
pub fn read_path(
    types: &TypeSystem,
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<(LogicalType, RowSequence)> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read(types, file, options, None, None)
}

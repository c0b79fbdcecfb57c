//! Mock I/O helpers for testing without hand-made files.
//!
//! - [`TempFilePath`]: a temporary `.parquet` path deleted on drop
//! - [`parquet_bytes`]: encode arbitrary Arrow batches as an in-memory
//!   Parquet file, one row group per batch
//! - [`MemoryColumnarReader`]: a [`ColumnarReader`] over Arrow batches
//! - [`FailingColumnarReader`]: fails every column read of one row group
//! - [`Unseekable`]: a stream whose `seek` always fails

use crate::error::CodecError;
use crate::io::ColumnarReader;
use crate::io::parquet::{ParquetColumnReader, SharedSource};
use crate::schema::PhysicalColumn;
use anyhow::{Result, ensure};
use arrow::array::{ArrayRef, RecordBatch};
use arrow::datatypes::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::errors::ParquetError;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// A temporary file that is automatically deleted when dropped.
pub struct TempFilePath {
    #[allow(dead_code)]
    temp_file: NamedTempFile,
    path: PathBuf,
}

impl TempFilePath {
    /// Create a new temporary file with a `.parquet` suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created.
    pub fn parquet() -> io::Result<Self> {
        let temp_file = tempfile::Builder::new().suffix(".parquet").tempfile()?;
        let path = temp_file.path().to_path_buf();
        Ok(Self { temp_file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Encode `batches` as a Parquet file with one row group per non-empty batch.
///
/// With no batches (or only empty ones) the file has zero row groups.
///
/// # Errors
///
/// Returns an error if a batch does not match `schema` or encoding fails.
pub fn parquet_bytes(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Vec<u8>> {
    let mut writer = ArrowWriter::try_new(Vec::new(), schema, None)?;
    for batch in batches {
        writer.write(batch)?;
        writer.flush()?;
    }
    Ok(writer.into_inner()?)
}

/// Open in-memory Parquet bytes as a [`ParquetColumnReader`].
///
/// # Errors
///
/// Returns an error if the footer cannot be decoded.
pub fn parquet_reader(bytes: Vec<u8>) -> Result<ParquetColumnReader> {
    ParquetColumnReader::open(SharedSource::new(Cursor::new(bytes))?)
}

/// [`ColumnarReader`] serving Arrow batches from memory, one row group each.
pub struct MemoryColumnarReader {
    columns: Vec<PhysicalColumn>,
    groups: Vec<RecordBatch>,
}

impl MemoryColumnarReader {
    /// # Errors
    ///
    /// Returns an error if a batch's schema differs from `schema`.
    pub fn new(schema: &SchemaRef, groups: Vec<RecordBatch>) -> Result<Self> {
        for (i, batch) in groups.iter().enumerate() {
            ensure!(
                batch.schema().fields() == schema.fields(),
                "row group {i} does not match the reader schema"
            );
        }
        let columns = schema
            .fields()
            .iter()
            .map(|f| PhysicalColumn::from_arrow(f))
            .collect();
        Ok(Self { columns, groups })
    }
}

impl ColumnarReader for MemoryColumnarReader {
    fn columns(&self) -> &[PhysicalColumn] {
        &self.columns
    }

    fn num_row_groups(&self) -> usize {
        self.groups.len()
    }

    fn row_group_len(&self, group: usize) -> usize {
        self.groups.get(group).map_or(0, RecordBatch::num_rows)
    }

    fn read_column(&mut self, group: usize, column: usize) -> Result<ArrayRef> {
        let batch = self
            .groups
            .get(group)
            .ok_or_else(|| CodecError::precondition(format!("no row group {group}")))?;
        ensure!(column < batch.num_columns(), "no column {column}");
        Ok(Arc::clone(batch.column(column)))
    }
}

/// Wraps a [`ColumnarReader`] and fails every column read of one row group
/// with a [`ParquetError::General`].
pub struct FailingColumnarReader {
    inner: Box<dyn ColumnarReader>,
    fail_group: usize,
    message: String,
    reads: usize,
}

impl FailingColumnarReader {
    #[must_use]
    pub fn new(inner: Box<dyn ColumnarReader>, fail_group: usize, message: impl Into<String>) -> Self {
        Self {
            inner,
            fail_group,
            message: message.into(),
            reads: 0,
        }
    }

    /// Column reads that reached the inner reader.
    #[must_use]
    pub const fn successful_reads(&self) -> usize {
        self.reads
    }
}

impl ColumnarReader for FailingColumnarReader {
    fn columns(&self) -> &[PhysicalColumn] {
        self.inner.columns()
    }

    fn num_row_groups(&self) -> usize {
        self.inner.num_row_groups()
    }

    fn row_group_len(&self, group: usize) -> usize {
        self.inner.row_group_len(group)
    }

    fn read_column(&mut self, group: usize, column: usize) -> Result<ArrayRef> {
        if group == self.fail_group {
            return Err(ParquetError::General(self.message.clone()).into());
        }
        let array = self.inner.read_column(group, column)?;
        self.reads += 1;
        Ok(array)
    }
}

/// A readable stream that refuses to seek.
pub struct Unseekable<R>(pub R);

impl<R: Read> Read for Unseekable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R> Seek for Unseekable<R> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "stream is not seekable"))
    }
}

//! Parquet physical layer.
//!
//! This module provides:
//! - [`SharedSource`]: a cloneable [`ChunkReader`] over any `Read + Seek`
//!   stream. It owns the stream; the last clone to drop releases it.
//! - [`ParquetColumnReader`]: [`ColumnarReader`] over a Parquet file, decoding
//!   one column of one row group at a time through
//!   `ParquetRecordBatchReaderBuilder` with a single-root projection.
//! - [`ParquetGroupWriter`]: writes one row group per call from Arrow arrays
//!   via `SerializedFileWriter` and column writers from an
//!   `ArrowRowGroupWriterFactory`, which (unlike `ArrowWriter`) can emit a
//!   zero-row group.
//!
//! Uses Arrow 58 and the `parquet` crate's `arrow` integration.

use crate::error::CodecError;
use crate::io::ColumnarReader;
use crate::schema::PhysicalColumn;
use anyhow::Result;
use arrow::array::{Array, ArrayRef, new_empty_array};
use arrow::compute::concat;
use arrow::datatypes::SchemaRef;
use bytes::Bytes;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use parquet::arrow::arrow_writer::{ArrowRowGroupWriterFactory, compute_leaves};
use parquet::arrow::{ArrowSchemaConverter, ProjectionMask};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{ChunkReader, Length};
use parquet::file::writer::SerializedFileWriter;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

/// Streams the codec can read from.
pub trait SeekRead: Read + Seek + Send {}
impl<T: Read + Seek + Send> SeekRead for T {}

/// Exclusive owner of an input stream, shareable as a Parquet [`ChunkReader`].
#[derive(Clone)]
pub struct SharedSource {
    stream: Arc<Mutex<Box<dyn SeekRead>>>,
    len: u64,
}

impl SharedSource {
    /// Take ownership of `stream` after checking that it can seek and read.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Precondition`] if the stream cannot seek or
    /// cannot be read. The stream is dropped in that case.
    pub fn new<S: Read + Seek + Send + 'static>(mut stream: S) -> Result<Self, CodecError> {
        let len = stream
            .seek(SeekFrom::End(0))
            .and_then(|len| stream.seek(SeekFrom::Start(0)).map(|_| len))
            .map_err(|e| CodecError::precondition(format!("stream must be seekable: {e}")))?;
        if len > 0 {
            let mut probe = [0u8; 1];
            stream
                .read(&mut probe)
                .map_err(|e| CodecError::precondition(format!("stream must be readable: {e}")))?;
        }
        Ok(Self {
            stream: Arc::new(Mutex::new(Box::new(stream))),
            len,
        })
    }

    fn read_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut stream = self
            .stream
            .lock()
            .map_err(|_| io::Error::other("input stream lock poisoned"))?;
        stream.seek(SeekFrom::Start(pos))?;
        stream.read(buf)
    }

    fn read_exact_at(&self, pos: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut stream = self
            .stream
            .lock()
            .map_err(|_| io::Error::other("input stream lock poisoned"))?;
        stream.seek(SeekFrom::Start(pos))?;
        stream.read_exact(buf)
    }
}

impl Length for SharedSource {
    fn len(&self) -> u64 {
        self.len
    }
}

impl ChunkReader for SharedSource {
    type T = SourceRead;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        Ok(SourceRead {
            source: self.clone(),
            pos: start,
        })
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        let mut buf = vec![0u8; length];
        self.read_exact_at(start, &mut buf)?;
        Ok(Bytes::from(buf))
    }
}

/// Sequential reader at an offset of a [`SharedSource`].
pub struct SourceRead {
    source: SharedSource,
    pos: u64,
}

impl Read for SourceRead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.source.read_at(self.pos, buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

/// [`ColumnarReader`] over a Parquet file.
pub struct ParquetColumnReader {
    source: SharedSource,
    metadata: ArrowReaderMetadata,
    columns: Vec<PhysicalColumn>,
}

impl ParquetColumnReader {
    /// Read the footer of `source` and describe its top-level columns.
    ///
    /// # Errors
    ///
    /// Returns the library error if the footer cannot be decoded.
    pub fn open(source: SharedSource) -> Result<Self> {
        let metadata = ArrowReaderMetadata::load(&source, ArrowReaderOptions::new())?;
        let roots = metadata.parquet_schema().root_schema().get_fields();
        let columns = metadata
            .schema()
            .fields()
            .iter()
            .zip(roots)
            .map(|(field, parquet)| PhysicalColumn::describe(field, parquet))
            .collect();
        Ok(Self {
            source,
            metadata,
            columns,
        })
    }

    /// Arrow schema inferred from the file.
    #[must_use]
    pub fn arrow_schema(&self) -> &SchemaRef {
        self.metadata.schema()
    }
}

impl ColumnarReader for ParquetColumnReader {
    fn columns(&self) -> &[PhysicalColumn] {
        &self.columns
    }

    fn num_row_groups(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }

    fn row_group_len(&self, group: usize) -> usize {
        let rows = self.metadata.metadata().row_group(group).num_rows();
        usize::try_from(rows).unwrap_or(0)
    }

    fn read_column(&mut self, group: usize, column: usize) -> Result<ArrayRef> {
        let rows = self.row_group_len(group);
        let mask = ProjectionMask::roots(self.metadata.parquet_schema(), [column]);
        let reader = ParquetRecordBatchReaderBuilder::new_with_metadata(
            self.source.clone(),
            self.metadata.clone(),
        )
        .with_row_groups(vec![group])
        .with_projection(mask)
        .with_batch_size(rows.max(1))
        .build()?;

        let mut parts: Vec<ArrayRef> = Vec::new();
        for batch in reader {
            parts.push(Arc::clone(batch?.column(0)));
        }
        if parts.len() > 1 {
            let refs: Vec<&dyn Array> = parts.iter().map(AsRef::as_ref).collect();
            return Ok(concat(&refs)?);
        }
        Ok(parts.pop().unwrap_or_else(|| {
            new_empty_array(self.metadata.schema().field(column).data_type())
        }))
    }
}

/// Writes Arrow arrays to a Parquet sink, one row group per call.
pub struct ParquetGroupWriter<W: Write + Send> {
    writer: SerializedFileWriter<W>,
    schema: SchemaRef,
    factory: ArrowRowGroupWriterFactory,
    groups: usize,
}

impl<W: Write + Send> ParquetGroupWriter<W> {
    /// Start a file on `sink` with the given Arrow schema.
    ///
    /// # Errors
    ///
    /// Returns the library error if the schema cannot be converted or the
    /// header cannot be written.
    pub fn try_new(sink: W, schema: SchemaRef, props: WriterProperties) -> Result<Self> {
        let parquet_schema = ArrowSchemaConverter::new().convert(&schema)?;
        let writer =
            SerializedFileWriter::new(sink, parquet_schema.root_schema_ptr(), Arc::new(props))?;
        let factory = ArrowRowGroupWriterFactory::new(&writer, Arc::clone(&schema));
        Ok(Self {
            writer,
            schema,
            factory,
            groups: 0,
        })
    }

    /// Write one row group holding `columns`, in schema order.
    ///
    /// Zero-length arrays produce a valid empty row group.
    ///
    /// # Errors
    ///
    /// Returns the library error if encoding or writing fails.
    pub fn write_row_group(&mut self, columns: &[ArrayRef]) -> Result<()> {
        let mut writers = self.factory.create_column_writers(self.groups)?;
        for ((writer, field), array) in writers.iter_mut().zip(self.schema.fields()).zip(columns) {
            for leaf in compute_leaves(field, array)? {
                writer.write(&leaf)?;
            }
        }
        let mut group = self.writer.next_row_group()?;
        for writer in writers {
            writer.close()?.append_to_row_group(&mut group)?;
        }
        group.close()?;
        self.groups += 1;
        Ok(())
    }

    /// Row groups written so far.
    #[must_use]
    pub const fn row_groups(&self) -> usize {
        self.groups
    }

    /// Write the footer and return the number of row groups.
    ///
    /// # Errors
    ///
    /// Returns the library error if the footer cannot be written.
    pub fn finish(self) -> Result<usize> {
        self.writer.close()?;
        Ok(self.groups)
    }
}

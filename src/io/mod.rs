//! Physical layer seam.
//!
//! The codec talks to the columnar library only through [`ColumnarReader`]
//! (reads) and [`parquet::ParquetGroupWriter`] (writes). The Parquet-backed
//! implementations live in [`parquet`]; tests and alternative backends can
//! supply their own `ColumnarReader`.

pub mod parquet;

use crate::schema::PhysicalColumn;
use anyhow::Result;
use arrow::array::ArrayRef;

/// Row-group oriented access to a columnar file.
///
/// Errors returned from [`ColumnarReader::read_column`] are passed through to
/// callers of [`crate::Reader::run`] unchanged.
pub trait ColumnarReader: Send {
    /// Top-level columns of the file, in physical order.
    fn columns(&self) -> &[PhysicalColumn];

    fn num_row_groups(&self) -> usize;

    /// Number of rows in row group `group`.
    fn row_group_len(&self, group: usize) -> usize;

    /// Decode column `column` of row group `group` into one Arrow array.
    ///
    /// # Errors
    ///
    /// Returns the library's decode error.
    fn read_column(&mut self, group: usize, column: usize) -> Result<ArrayRef>;
}

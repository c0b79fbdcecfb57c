//! Testing utilities for codec users.
//!
//! This module bundles what the crate's own tests use, so downstream crates
//! can test code built on the reader and writer the same way:
//!
//! - **Assertions**: compare decoded rows with NaN-aware equality
//! - **Fixtures**: a table type covering every primitive kind, with rows
//! - **Mock I/O**: temporary files, hand-built Parquet bytes, in-memory and
//!   fault-injecting [`crate::ColumnarReader`]s
//!
//! # Quick Start
//!
//! ```no_run
//! use ironbeam_columnar::*;
//! use ironbeam_columnar::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let types = TypeSystem::new();
//! let table = every_kind_table(true);
//! let rows = every_kind_rows(20);
//!
//! let mut bytes = Vec::new();
//! get_writer(&types, &table, 8)?.write(rows.clone(), &mut bytes, None, 10)?;
//!
//! let (_, seq) = read(&types, std::io::Cursor::new(bytes), &ReadOptions::default(), None, None)?;
//! assert_rows_equal(&seq.wait_all()?, &rows);
//! # Ok(())
//! # }
//! ```
//!
//! # Fault injection
//!
//! [`FailingColumnarReader`] wraps another reader and fails every column read
//! of one row group, which drives [`crate::Reader::run`] down its failure path:
//!
//! ```no_run
//! use ironbeam_columnar::*;
//! use ironbeam_columnar::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let bytes = int64_column_bytes("x", &[1, 2, 3, 4, 5, 6], 2)?;
//! let inner = parquet_reader(bytes)?;
//! let failing = FailingColumnarReader::new(Box::new(inner), 1, "disk on fire");
//!
//! let types = TypeSystem::new();
//! let mut reader = Reader::with_columnar(&types, Box::new(failing), &ReadOptions::default(), None)?;
//! assert!(reader.run().is_err());
//! assert!(reader.sequence().failure().is_some());
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;

//! # Ironbeam Columnar
//!
//! A **streaming Parquet ⇄ row codec** for Ironbeam batch pipelines. It reads
//! self-describing Parquet files into strongly-typed rows and writes rows back
//! out as Parquet, without per-value type dispatch in either direction.
//!
//! ## Key Features
//!
//! - **Schema inference** - physical columns map onto a fixed set of logical
//!   primitive types; unsupported and array-typed columns are dropped
//! - **Null suppression** - optionally force nullable columns into required
//!   fields (NaN for floats, zero/false/epoch for everything else)
//! - **Specialized routines** - populate/extract closures are built once per
//!   schema from generic, monomorphized column loops
//! - **Streaming reads** - consumers iterate a [`RowSequence`] while the
//!   reader is still decoding later row groups
//! - **Batched writes** - rows are grouped into fixed-size row groups
//!
//! ## Quick Start
//!
//! ```no_run
//! use ironbeam_columnar::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let types = TypeSystem::new();
//! let table = LogicalType::table(vec![
//!     FieldType::new("id", LogicalType::req(PrimitiveKind::Int64)),
//!     FieldType::new("score", LogicalType::opt(PrimitiveKind::Float64)),
//! ]);
//!
//! // Write three rows
//! let rows = vec![
//!     Row::new(vec![Value::Int64(1), Value::Float64(0.5)]),
//!     Row::new(vec![Value::Int64(2), Value::Null]),
//!     Row::new(vec![Value::Int64(3), Value::Float64(1.5)]),
//! ];
//! let mut bytes = Vec::new();
//! get_writer(&types, &table, 5000)?.write(rows, &mut bytes, None, 10)?;
//!
//! // Read them back
//! let (ty, seq) = read(&types, std::io::Cursor::new(bytes), &ReadOptions::default(), None, None)?;
//! assert_eq!(ty, table);
//! for row in &seq {
//!     println!("{:?}", row?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrent consumption
//!
//! ```no_run
//! use ironbeam_columnar::*;
//! use std::fs::File;
//! # fn main() -> anyhow::Result<()> {
//! let types = TypeSystem::new();
//! let mut reader = Reader::create(&types, File::open("big.parquet")?, &ReadOptions::default(), None)?;
//! let seq = reader.sequence();
//!
//! let producer = std::thread::spawn(move || reader.run());
//! for row in &seq {
//!     let row = row?; // ends with an error if the producer failed
//!     # let _ = row;
//! }
//! producer.join().expect("reader thread")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`types`] - logical types, the type system and row layouts
//! - [`value`] - row values
//! - [`schema`] - physical → logical mapping and schema resolution
//! - [`codegen`] - per-schema populate/extract routines
//! - [`sequence`] - the producer/consumer row sequence
//! - [`reader`] - the streaming reader
//! - [`writer`] - the batch writer
//! - [`io`] - the Parquet physical layer
//! - [`config`] - read/write options
//! - [`testing`] - fixtures and fault injection for tests

pub(crate) mod observability;

pub mod codegen;
pub mod config;
pub mod error;
pub mod io;
pub mod reader;
pub mod schema;
pub mod sequence;
pub mod testing;
pub mod types;
pub mod value;
pub mod writer;

pub use config::{Compression, ReadOptions, WriteOptions};
pub use error::CodecError;
pub use io::ColumnarReader;
pub use reader::{Progress, Reader, ReaderState, read, read_path};
pub use schema::{
    CoercionKind, DropReason, DroppedColumn, FieldMapping, PhysicalColumn, PhysicalKind, SchemaInfo,
    TemporalConvert, is_valid_field_name,
};
pub use sequence::{RowIter, RowSequence, SequenceFailure};
pub use types::{FieldType, LogicalType, PrimitiveKind, RowLayout, TypeKind, TypeSystem};
pub use value::{Row, Value};
pub use writer::{BatchWriter, get_writer, get_writer_with, write_path};

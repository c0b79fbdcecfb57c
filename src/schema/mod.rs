//! Type mapping and schema resolution.
//!
//! - [`mapper`]: pure physical → logical mapping plus the suppression policy
//! - [`resolver`]: builds the immutable [`SchemaInfo`] for a reader or writer

pub mod mapper;
pub mod resolver;

pub use mapper::{CoercionKind, PhysicalColumn, PhysicalKind, TemporalConvert};
pub use resolver::{DropReason, DroppedColumn, FieldMapping, SchemaInfo, is_valid_field_name};

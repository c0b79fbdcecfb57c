//! Logical types and row layouts.
//!
//! This module provides:
//! - [`LogicalType`]: the domain-level type descriptor used by the runtime
//!   (optional/required primitives, records, sequences). Equality and hashing
//!   are structural.
//! - [`PrimitiveKind`]: the fixed set of logical primitive kinds the codec maps
//!   physical columns onto.
//! - [`TypeSystem`]: hands out one shared [`RowLayout`] per structurally
//!   distinct record type, so every reader/writer over the same record shape
//!   produces rows with the same layout instance.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Logical primitive kinds.
///
/// Temporal representations are fixed:
/// - `Date`: days since the Unix epoch
/// - `Timestamp`: microseconds since the Unix epoch
/// - `Time`: nanoseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Text,
    Date,
    Timestamp,
    Time,
}

impl PrimitiveKind {
    pub const ALL: [Self; 15] = [
        Self::Bool,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float32,
        Self::Float64,
        Self::Text,
        Self::Date,
        Self::Timestamp,
        Self::Time,
    ];

    /// Lower-case name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Text => "text",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Time => "time",
        }
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::Timestamp | Self::Time)
    }
}

/// Broad shape of a [`LogicalType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Record,
    Sequence,
}

/// A named field of a record type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldType {
    pub name: String,
    pub ty: LogicalType,
}

impl FieldType {
    pub fn new(name: impl Into<String>, ty: LogicalType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Domain-level type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    Primitive { kind: PrimitiveKind, opt: bool },
    Record { fields: Vec<FieldType>, opt: bool },
    /// A sequence of items. Sequences are never optional.
    Sequence(Box<LogicalType>),
}

impl LogicalType {
    /// Required primitive of `kind`.
    #[must_use]
    pub const fn req(kind: PrimitiveKind) -> Self {
        Self::Primitive { kind, opt: false }
    }

    /// Optional primitive of `kind`.
    #[must_use]
    pub const fn opt(kind: PrimitiveKind) -> Self {
        Self::Primitive { kind, opt: true }
    }

    /// Required record with the given fields.
    #[must_use]
    pub fn record(fields: Vec<FieldType>) -> Self {
        Self::Record { fields, opt: false }
    }

    /// Sequence of `item`.
    #[must_use]
    pub fn sequence(item: Self) -> Self {
        Self::Sequence(Box::new(item))
    }

    /// Sequence of required records: the shape of a table.
    #[must_use]
    pub fn table(fields: Vec<FieldType>) -> Self {
        Self::sequence(Self::record(fields))
    }

    #[must_use]
    pub const fn is_opt(&self) -> bool {
        match self {
            Self::Primitive { opt, .. } | Self::Record { opt, .. } => *opt,
            Self::Sequence(_) => false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive { kind, .. } => TypeKind::Primitive(*kind),
            Self::Record { .. } => TypeKind::Record,
            Self::Sequence(_) => TypeKind::Sequence,
        }
    }

    /// The optional form of this type. Sequences are returned unchanged.
    #[must_use]
    pub fn to_opt(&self) -> Self {
        self.with_opt(true)
    }

    /// The required form of this type. Sequences are returned unchanged.
    #[must_use]
    pub fn to_req(&self) -> Self {
        self.with_opt(false)
    }

    fn with_opt(&self, opt: bool) -> Self {
        match self {
            Self::Primitive { kind, .. } => Self::Primitive { kind: *kind, opt },
            Self::Record { fields, .. } => Self::Record {
                fields: fields.clone(),
                opt,
            },
            Self::Sequence(item) => Self::Sequence(item.clone()),
        }
    }

    /// Record fields, if this is a record type.
    #[must_use]
    pub fn fields(&self) -> Option<&[FieldType]> {
        match self {
            Self::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Item type, if this is a sequence type.
    #[must_use]
    pub fn item(&self) -> Option<&Self> {
        match self {
            Self::Sequence(item) => Some(item),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { kind, opt } => {
                write!(f, "{}", kind.name())?;
                if *opt {
                    f.write_str("?")?;
                }
                Ok(())
            }
            Self::Record { fields, opt } => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                f.write_str("}")?;
                if *opt {
                    f.write_str("?")?;
                }
                Ok(())
            }
            Self::Sequence(item) => write!(f, "{item}*"),
        }
    }
}

/// Concrete layout of a row for one record type.
///
/// Slot `i` of a [`crate::Row`] holds the value of field `i`.
#[derive(Debug, PartialEq, Eq)]
pub struct RowLayout {
    record: LogicalType,
    index: HashMap<String, usize>,
}

impl RowLayout {
    fn new(record: LogicalType) -> Self {
        let index = record
            .fields()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self { record, index }
    }

    /// The record type this layout was built for.
    #[must_use]
    pub const fn record_type(&self) -> &LogicalType {
        &self.record
    }

    /// Number of value slots in a row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.fields().len()
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldType] {
        self.record.fields().unwrap_or_default()
    }

    /// Slot index of the field called `name`.
    #[must_use]
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// Supplies row layouts for record types.
///
/// Layouts are interned structurally: two equal record types always resolve
/// to the same `Arc<RowLayout>`. Clones share the same cache.
#[derive(Clone, Default)]
pub struct TypeSystem {
    layouts: Arc<Mutex<HashMap<LogicalType, Arc<RowLayout>>>>,
}

impl TypeSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the layout for `record`, building it on first use.
    ///
    /// Optionality of the record itself does not affect its layout.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Precondition`] if `record` is not a record type.
    pub fn layout_for(&self, record: &LogicalType) -> Result<Arc<RowLayout>, CodecError> {
        if record.kind() != TypeKind::Record {
            return Err(CodecError::precondition(format!(
                "row layouts exist only for record types, got {record}"
            )));
        }
        let key = record.to_req();
        let mut layouts = self
            .layouts
            .lock()
            .map_err(|_| CodecError::precondition("type system layout cache poisoned"))?;
        let layout = layouts
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RowLayout::new(key)));
        Ok(Arc::clone(layout))
    }

    /// Number of distinct layouts built so far.
    #[must_use]
    pub fn layout_count(&self) -> usize {
        self.layouts.lock().map(|l| l.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_round_trips() {
        let t = LogicalType::req(PrimitiveKind::Int64);
        assert!(!t.is_opt());
        assert!(t.to_opt().is_opt());
        assert_eq!(t.to_opt().to_req(), t);
        let s = LogicalType::table(vec![]);
        assert!(!s.to_opt().is_opt());
    }

    #[test]
    fn layouts_are_interned_structurally() {
        let ts = TypeSystem::new();
        let a = LogicalType::record(vec![FieldType::new("x", LogicalType::req(PrimitiveKind::Int64))]);
        let b = LogicalType::record(vec![FieldType::new("x", LogicalType::req(PrimitiveKind::Int64))]);
        let l1 = ts.layout_for(&a).unwrap();
        let l2 = ts.layout_for(&b).unwrap();
        assert!(Arc::ptr_eq(&l1, &l2));
        assert_eq!(ts.layout_count(), 1);
        assert_eq!(l1.slot_of("x"), Some(0));
        assert!(ts.layout_for(&LogicalType::req(PrimitiveKind::Bool)).is_err());
    }

    #[test]
    fn display_is_compact() {
        let t = LogicalType::table(vec![
            FieldType::new("x", LogicalType::req(PrimitiveKind::Int64)),
            FieldType::new("s", LogicalType::opt(PrimitiveKind::Text)),
        ]);
        assert_eq!(t.to_string(), "{x: int64, s: text?}*");
    }
}

//! Schema resolution: physical columns (or a table type) → [`SchemaInfo`].

use crate::error::CodecError;
use crate::io::ColumnarReader;
use crate::observability::log_debug;
use crate::schema::mapper::{self, CoercionKind, PhysicalKind};
use crate::types::{FieldType, LogicalType, PrimitiveKind, RowLayout, TypeKind, TypeSystem};
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

/// Non-empty, no control characters, no leading or trailing whitespace.
static FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s\p{Cc}](?:[^\p{Cc}]*[^\s\p{Cc}])?$").expect("valid field name regex")
});

/// Whether `name` can be used as a record field name.
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME.is_match(name)
}

/// One surviving field and how to convert it.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldMapping {
    pub name: String,
    /// Physical column index in the file (reads) or output column position (writes).
    pub column: usize,
    pub coercion: CoercionKind,
    /// Logical type of the field after coercion.
    pub ty: LogicalType,
    /// Physical kind decoded from (reads) or encoded to (writes).
    pub physical: PhysicalKind,
    /// Slot of the field in the row layout.
    pub slot: usize,
}

impl FieldMapping {
    /// Logical primitive kind of this field.
    ///
    /// Mappings are only ever built for primitive fields.
    #[must_use]
    pub fn kind(&self) -> PrimitiveKind {
        match self.ty.kind() {
            TypeKind::Primitive(kind) => kind,
            TypeKind::Record | TypeKind::Sequence => {
                unreachable!("field mappings are built for primitive fields only")
            }
        }
    }
}

/// Why a column was left out of the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    InvalidName,
    DuplicateName,
    ArrayTyped,
    Unsupported,
}

/// A column excluded from the schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DroppedColumn {
    pub name: String,
    pub column: usize,
    pub reason: DropReason,
}

/// Immutable result of schema resolution.
///
/// For reads it owns the physical reader; dropping the `SchemaInfo` releases
/// the underlying stream.
pub struct SchemaInfo {
    fields: Vec<FieldMapping>,
    record: LogicalType,
    layout: Arc<RowLayout>,
    dropped: Vec<DroppedColumn>,
    source: Option<Box<dyn ColumnarReader>>,
}

impl SchemaInfo {
    /// Resolve the read schema of `source`, taking ownership of it.
    ///
    /// # Errors
    ///
    /// Fails only if the type system rejects the inferred record type.
    pub fn for_read(
        types: &TypeSystem,
        source: Box<dyn ColumnarReader>,
        suppress_optional: bool,
    ) -> Result<Self, CodecError> {
        let mut fields = Vec::new();
        let mut dropped = Vec::new();
        let mut seen = HashSet::new();

        for (index, col) in source.columns().iter().enumerate() {
            let reason = if !is_valid_field_name(&col.name) {
                Some(DropReason::InvalidName)
            } else if seen.contains(col.name.as_str()) {
                Some(DropReason::DuplicateName)
            } else if col.is_array {
                Some(DropReason::ArrayTyped)
            } else {
                None
            };
            let mapped = match reason {
                Some(reason) => Err(reason),
                None => mapper::map(col.kind, col.nullable, col.is_array).ok_or(DropReason::Unsupported),
            };
            match mapped {
                Ok((ty, coercion)) => {
                    let (ty, coercion) = if suppress_optional {
                        mapper::suppress(ty, coercion)
                    } else {
                        (ty, coercion)
                    };
                    seen.insert(col.name.clone());
                    fields.push(FieldMapping {
                        name: col.name.clone(),
                        column: index,
                        coercion,
                        ty,
                        physical: col.kind,
                        slot: fields.len(),
                    });
                }
                Err(reason) => {
                    log_debug!(
                        component = "schema",
                        event = "column_dropped",
                        column = %col.name,
                        index,
                        reason = ?reason,
                        kind = ?col.kind,
                    );
                    dropped.push(DroppedColumn {
                        name: col.name.clone(),
                        column: index,
                        reason,
                    });
                }
            }
        }

        let record = LogicalType::record(
            fields
                .iter()
                .map(|f| FieldType::new(f.name.clone(), f.ty.clone()))
                .collect(),
        );
        let layout = types.layout_for(&record)?;
        Ok(Self {
            fields,
            record,
            layout,
            dropped,
            source: Some(source),
        })
    }

    /// Resolve the write schema of a table type (a sequence of records, or a record).
    ///
    /// Non-primitive fields are dropped. Slots refer to the full table record,
    /// so rows keep one value per declared field.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Precondition`] when `table` is not a record or a
    /// sequence of records.
    pub fn for_write(types: &TypeSystem, table: &LogicalType) -> Result<Self, CodecError> {
        let record = match table.kind() {
            TypeKind::Sequence => table.item().cloned(),
            TypeKind::Record => Some(table.clone()),
            TypeKind::Primitive(_) => None,
        }
        .filter(|r| r.kind() == TypeKind::Record)
        .ok_or_else(|| {
            CodecError::precondition(format!("cannot write rows of type {table}; expected a table of records"))
        })?;
        let record = record.to_req();
        let layout = types.layout_for(&record)?;

        let mut fields = Vec::new();
        let mut dropped = Vec::new();
        for (slot, field) in layout.fields().iter().enumerate() {
            match field.ty.kind() {
                TypeKind::Primitive(kind) => fields.push(FieldMapping {
                    name: field.name.clone(),
                    column: fields.len(),
                    coercion: CoercionKind::Identity,
                    ty: field.ty.clone(),
                    physical: PhysicalKind::for_logical(kind),
                    slot,
                }),
                TypeKind::Record | TypeKind::Sequence => {
                    log_debug!(
                        component = "schema",
                        event = "field_dropped",
                        field = %field.name,
                        ty = %field.ty,
                    );
                    dropped.push(DroppedColumn {
                        name: field.name.clone(),
                        column: slot,
                        reason: DropReason::Unsupported,
                    });
                }
            }
        }

        Ok(Self {
            fields,
            record,
            layout,
            dropped,
            source: None,
        })
    }

    /// Surviving fields in schema order.
    #[must_use]
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// The record type rows are laid out by.
    #[must_use]
    pub const fn record_type(&self) -> &LogicalType {
        &self.record
    }

    #[must_use]
    pub fn layout(&self) -> &Arc<RowLayout> {
        &self.layout
    }

    /// Columns (or fields) excluded from the schema, in physical order.
    #[must_use]
    pub fn dropped(&self) -> &[DroppedColumn] {
        &self.dropped
    }

    /// The owned physical reader; `None` for write schemas.
    pub(crate) fn source_mut(&mut self) -> Option<&mut (dyn ColumnarReader + 'static)> {
        self.source.as_deref_mut()
    }
}

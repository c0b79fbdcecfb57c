//! Rows → columns.

use crate::error::CodecError;
use crate::schema::{FieldMapping, PhysicalKind};
use crate::types::PrimitiveKind;
use crate::value::{Row, Value};
use anyhow::Result;
use arrow::array::{ArrayRef, BooleanBuilder, PrimitiveBuilder, StringBuilder};
use arrow::datatypes::{
    ArrowPrimitiveType, Date32Type, Field, Float32Type, Float64Type, Int8Type, Int16Type,
    Int32Type, Int64Type, Schema, SchemaRef, Time64NanosecondType, TimestampMicrosecondType,
    UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use std::sync::Arc;

/// Builds one output column from a batch of rows.
type ColumnTake = Box<dyn Fn(&[Row]) -> Result<ArrayRef> + Send + Sync>;

/// Extract routine for one schema.
pub struct Extract {
    takes: Vec<ColumnTake>,
    width: usize,
    schema: SchemaRef,
}

impl Extract {
    pub(crate) fn build(fields: &[FieldMapping], width: usize) -> Result<Self, CodecError> {
        let mut arrow_fields = Vec::with_capacity(fields.len());
        for f in fields {
            let data_type = PhysicalKind::for_logical(f.kind())
                .to_arrow()
                .ok_or_else(|| CodecError::precondition(format!("cannot encode field `{}`", f.name)))?;
            arrow_fields.push(Field::new(f.name.clone(), data_type, f.ty.is_opt()));
        }
        Ok(Self {
            takes: fields.iter().map(take_for).collect(),
            width,
            schema: Arc::new(Schema::new(arrow_fields)),
        })
    }

    /// Arrow schema of the arrays this routine produces.
    #[must_use]
    pub const fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Build one array per mapped field from `rows[0..count)`.
    ///
    /// # Errors
    ///
    /// Fails if `count` exceeds `rows.len()`, a row has the wrong width, a
    /// required field holds null, or a value's kind differs from its field's kind.
    pub fn extract(&self, rows: &[Row], count: usize) -> Result<Vec<ArrayRef>> {
        let rows = rows.get(..count).ok_or_else(|| {
            CodecError::precondition(format!("cannot extract {count} rows from {}", rows.len()))
        })?;
        if let Some(bad) = rows.iter().find(|r| r.width() != self.width) {
            return Err(CodecError::RowWidth {
                expected: self.width,
                actual: bad.width(),
            }
            .into());
        }
        self.takes.iter().map(|take| take(rows)).collect()
    }
}

/// Reject a value `get` could not read: null in a required field, or a kind mismatch.
fn reject(name: &str, expected: PrimitiveKind, value: &Value, row: usize) -> anyhow::Error {
    if value.is_null() {
        CodecError::NullInRequired {
            field: name.to_owned(),
            row,
        }
        .into()
    } else {
        CodecError::ValueKind {
            field: name.to_owned(),
            expected: expected.name(),
            actual: value.kind_name(),
            row,
        }
        .into()
    }
}

fn take_primitive<T, G>(field: &FieldMapping, get: G) -> ColumnTake
where
    T: ArrowPrimitiveType,
    G: Fn(&Value) -> Option<T::Native> + Send + Sync + 'static,
{
    let slot = field.slot;
    let nullable = field.ty.is_opt();
    let kind = field.kind();
    let name = field.name.clone();
    Box::new(move |rows: &[Row]| -> Result<ArrayRef> {
        let mut builder = PrimitiveBuilder::<T>::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let value = &row.values()[slot];
            match get(value) {
                Some(v) => builder.append_value(v),
                None if nullable && value.is_null() => builder.append_null(),
                None => return Err(reject(&name, kind, value, i)),
            }
        }
        Ok(Arc::new(builder.finish()))
    })
}

fn take_bool(field: &FieldMapping) -> ColumnTake {
    let slot = field.slot;
    let nullable = field.ty.is_opt();
    let name = field.name.clone();
    Box::new(move |rows: &[Row]| -> Result<ArrayRef> {
        let mut builder = BooleanBuilder::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let value = &row.values()[slot];
            match value.as_bool() {
                Some(v) => builder.append_value(v),
                None if nullable && value.is_null() => builder.append_null(),
                None => return Err(reject(&name, PrimitiveKind::Bool, value, i)),
            }
        }
        Ok(Arc::new(builder.finish()))
    })
}

fn take_text(field: &FieldMapping) -> ColumnTake {
    let slot = field.slot;
    let nullable = field.ty.is_opt();
    let name = field.name.clone();
    Box::new(move |rows: &[Row]| -> Result<ArrayRef> {
        let mut builder = StringBuilder::with_capacity(rows.len(), rows.len() * 8);
        for (i, row) in rows.iter().enumerate() {
            let value = &row.values()[slot];
            match value.as_text() {
                Some(v) => builder.append_value(v),
                None if nullable && value.is_null() => builder.append_null(),
                None => return Err(reject(&name, PrimitiveKind::Text, value, i)),
            }
        }
        Ok(Arc::new(builder.finish()))
    })
}

fn take_for(field: &FieldMapping) -> ColumnTake {
    match field.kind() {
        PrimitiveKind::Bool => take_bool(field),
        PrimitiveKind::Int8 => take_primitive::<Int8Type, _>(field, Value::as_i8),
        PrimitiveKind::Int16 => take_primitive::<Int16Type, _>(field, Value::as_i16),
        PrimitiveKind::Int32 => take_primitive::<Int32Type, _>(field, Value::as_i32),
        PrimitiveKind::Int64 => take_primitive::<Int64Type, _>(field, Value::as_i64),
        PrimitiveKind::UInt8 => take_primitive::<UInt8Type, _>(field, Value::as_u8),
        PrimitiveKind::UInt16 => take_primitive::<UInt16Type, _>(field, Value::as_u16),
        PrimitiveKind::UInt32 => take_primitive::<UInt32Type, _>(field, Value::as_u32),
        PrimitiveKind::UInt64 => take_primitive::<UInt64Type, _>(field, Value::as_u64),
        PrimitiveKind::Float32 => take_primitive::<Float32Type, _>(field, Value::as_f32),
        PrimitiveKind::Float64 => take_primitive::<Float64Type, _>(field, Value::as_f64),
        PrimitiveKind::Text => take_text(field),
        PrimitiveKind::Date => take_primitive::<Date32Type, _>(field, Value::as_date),
        PrimitiveKind::Timestamp => {
            take_primitive::<TimestampMicrosecondType, _>(field, Value::as_timestamp)
        }
        PrimitiveKind::Time => take_primitive::<Time64NanosecondType, _>(field, Value::as_time),
    }
}

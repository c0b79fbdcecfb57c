//! Columns → rows.
//!
//! Each mapped field gets one [`ColumnFill`] built from a generic function
//! monomorphized over the Arrow array type and the value constructor. The
//! downcast to the concrete array happens once per call; the per-row loop only
//! distinguishes null from non-null.

use crate::error::CodecError;
use crate::schema::{CoercionKind, FieldMapping, PhysicalKind};
use crate::value::{Row, Value};
use anyhow::Result;
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    ArrowPrimitiveType, Date32Type, Date64Type, DurationMicrosecondType,
    DurationMillisecondType, DurationNanosecondType, DurationSecondType, Float32Type, Float64Type,
    Int8Type, Int16Type, Int32Type, Int64Type, Time32MillisecondType, Time32SecondType,
    Time64MicrosecondType, Time64NanosecondType, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};

/// Fills one row slot from one column: `(array, source_offset, rows)`.
type ColumnFill = Box<dyn Fn(&dyn Array, usize, &mut [Row]) -> Result<()> + Send + Sync>;

/// Populate routine for one schema.
pub struct Populate {
    fills: Vec<ColumnFill>,
    width: usize,
}

impl Populate {
    pub(crate) fn build(fields: &[FieldMapping], width: usize) -> Result<Self, CodecError> {
        let fills = fields.iter().map(fill_for).collect::<Result<_, _>>()?;
        Ok(Self { fills, width })
    }

    /// Row width this routine fills.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Fill `rows[0..count)` from `columns[i][source_offset..source_offset + count)`.
    ///
    /// `columns` holds one array per mapped field, in mapping order.
    ///
    /// # Errors
    ///
    /// Fails if `count` exceeds `rows.len()`, `columns` does not hold one array
    /// per field, a row has the wrong width, a column has an unexpected type,
    /// or a column is shorter than `source_offset + count`.
    pub fn populate(
        &self,
        rows: &mut [Row],
        count: usize,
        source_offset: usize,
        columns: &[ArrayRef],
    ) -> Result<()> {
        if columns.len() != self.fills.len() {
            return Err(CodecError::precondition(format!(
                "populate needs {} columns, got {}",
                self.fills.len(),
                columns.len()
            ))
            .into());
        }
        let available = rows.len();
        let rows = rows.get_mut(..count).ok_or_else(|| {
            CodecError::precondition(format!("cannot populate {count} rows into {available}"))
        })?;
        if let Some(bad) = rows.iter().find(|r| r.width() != self.width) {
            return Err(CodecError::RowWidth {
                expected: self.width,
                actual: bad.width(),
            }
            .into());
        }
        for (fill, column) in self.fills.iter().zip(columns) {
            anyhow::ensure!(
                source_offset + count <= column.len(),
                "column has {} values, cannot read {count} from offset {source_offset}",
                column.len()
            );
            fill(column.as_ref(), source_offset, rows)?;
        }
        Ok(())
    }
}

fn mismatch(field: &FieldMapping, actual: &dyn Array) -> CodecError {
    CodecError::ColumnType {
        field: field.name.clone(),
        expected: format!("{:?}", field.physical),
        actual: actual.data_type().to_string(),
    }
}

fn fill_primitive<T, F>(field: &FieldMapping, make: F) -> ColumnFill
where
    T: ArrowPrimitiveType,
    F: Fn(T::Native) -> Value + Send + Sync + 'static,
{
    let slot = field.slot;
    let null_fill = field.coercion.null_fill(field.kind());
    let probe = field.clone();
    Box::new(move |array: &dyn Array, offset: usize, rows: &mut [Row]| -> Result<()> {
        let array = array
            .as_primitive_opt::<T>()
            .ok_or_else(|| mismatch(&probe, array))?;
        for (i, row) in rows.iter_mut().enumerate() {
            let at = offset + i;
            row.values_mut()[slot] = if array.is_null(at) {
                null_fill.clone()
            } else {
                make(array.value(at))
            };
        }
        Ok(())
    })
}

fn fill_bool(field: &FieldMapping) -> ColumnFill {
    let slot = field.slot;
    let null_fill = field.coercion.null_fill(field.kind());
    let probe = field.clone();
    Box::new(move |array: &dyn Array, offset: usize, rows: &mut [Row]| -> Result<()> {
        let array = array
            .as_boolean_opt()
            .ok_or_else(|| mismatch(&probe, array))?;
        for (i, row) in rows.iter_mut().enumerate() {
            let at = offset + i;
            row.values_mut()[slot] = if array.is_null(at) {
                null_fill.clone()
            } else {
                Value::Bool(array.value(at))
            };
        }
        Ok(())
    })
}

macro_rules! fill_text {
    ($field:expr, $as_array:ident $(::<$offset:ty>)?) => {{
        let slot = $field.slot;
        let probe = $field.clone();
        Box::new(move |array: &dyn Array, offset: usize, rows: &mut [Row]| -> Result<()> {
            let array = array
                .$as_array$(::<$offset>)?()
                .ok_or_else(|| mismatch(&probe, array))?;
            for (i, row) in rows.iter_mut().enumerate() {
                let at = offset + i;
                row.values_mut()[slot] = if array.is_null(at) {
                    Value::Null
                } else {
                    Value::Text(array.value(at).to_owned())
                };
            }
            Ok(())
        }) as ColumnFill
    }};
}

/// Build the temporal fill for `T`, converting units when the coercion says so.
fn fill_temporal<T, W>(field: &FieldMapping, wrap: W) -> ColumnFill
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
    W: Fn(i64) -> Value + Copy + Send + Sync + 'static,
{
    match field.coercion {
        CoercionKind::DateRepresentationConvert(conv) => {
            fill_primitive::<T, _>(field, move |v| wrap(conv.apply(v.into())))
        }
        _ => fill_primitive::<T, _>(field, move |v| wrap(v.into())),
    }
}

fn date(v: i64) -> Value {
    Value::Date(i32::try_from(v).unwrap_or(if v < 0 { i32::MIN } else { i32::MAX }))
}

fn fill_for(field: &FieldMapping) -> Result<ColumnFill, CodecError> {
    let fill = match field.physical {
        PhysicalKind::Boolean => fill_bool(field),
        PhysicalKind::Int8 => fill_primitive::<Int8Type, _>(field, Value::Int8),
        PhysicalKind::Int16 => fill_primitive::<Int16Type, _>(field, Value::Int16),
        PhysicalKind::Int32 => fill_primitive::<Int32Type, _>(field, Value::Int32),
        PhysicalKind::Int64 => fill_primitive::<Int64Type, _>(field, Value::Int64),
        PhysicalKind::UInt8 => fill_primitive::<UInt8Type, _>(field, Value::UInt8),
        PhysicalKind::UInt16 => fill_primitive::<UInt16Type, _>(field, Value::UInt16),
        PhysicalKind::UInt32 => fill_primitive::<UInt32Type, _>(field, Value::UInt32),
        PhysicalKind::UInt64 => fill_primitive::<UInt64Type, _>(field, Value::UInt64),
        PhysicalKind::Float32 => fill_primitive::<Float32Type, _>(field, Value::Float32),
        PhysicalKind::Float64 => fill_primitive::<Float64Type, _>(field, Value::Float64),
        PhysicalKind::Utf8 => fill_text!(field, as_string_opt::<i32>),
        PhysicalKind::LargeUtf8 => fill_text!(field, as_string_opt::<i64>),
        PhysicalKind::Utf8View => fill_text!(field, as_string_view_opt),
        PhysicalKind::Date32 => fill_temporal::<Date32Type, _>(field, date),
        PhysicalKind::Date64 => fill_temporal::<Date64Type, _>(field, date),
        PhysicalKind::Timestamp(unit) => match unit {
            TimeUnit::Second => fill_temporal::<TimestampSecondType, _>(field, Value::Timestamp),
            TimeUnit::Millisecond => fill_temporal::<TimestampMillisecondType, _>(field, Value::Timestamp),
            TimeUnit::Microsecond => fill_temporal::<TimestampMicrosecondType, _>(field, Value::Timestamp),
            TimeUnit::Nanosecond => fill_temporal::<TimestampNanosecondType, _>(field, Value::Timestamp),
        },
        PhysicalKind::Time32(TimeUnit::Second) => fill_temporal::<Time32SecondType, _>(field, Value::Time),
        PhysicalKind::Time32(TimeUnit::Millisecond) => {
            fill_temporal::<Time32MillisecondType, _>(field, Value::Time)
        }
        PhysicalKind::Time64(TimeUnit::Microsecond) => {
            fill_temporal::<Time64MicrosecondType, _>(field, Value::Time)
        }
        PhysicalKind::Time64(TimeUnit::Nanosecond) => {
            fill_temporal::<Time64NanosecondType, _>(field, Value::Time)
        }
        PhysicalKind::Duration(unit) => match unit {
            TimeUnit::Second => fill_temporal::<DurationSecondType, _>(field, Value::Time),
            TimeUnit::Millisecond => fill_temporal::<DurationMillisecondType, _>(field, Value::Time),
            TimeUnit::Microsecond => fill_temporal::<DurationMicrosecondType, _>(field, Value::Time),
            TimeUnit::Nanosecond => fill_temporal::<DurationNanosecondType, _>(field, Value::Time),
        },
        PhysicalKind::Time32(_)
        | PhysicalKind::Time64(_)
        | PhysicalKind::Float16
        | PhysicalKind::Int96
        | PhysicalKind::ByteArray
        | PhysicalKind::Decimal
        | PhysicalKind::Interval
        | PhysicalKind::Unspecified => {
            return Err(CodecError::precondition(format!(
                "no populate routine for field `{}` of physical kind {:?}",
                field.name, field.physical
            )));
        }
    };
    Ok(fill)
}

//! Physical → logical type mapping.
//!
//! [`map`] is a pure function of a column's physical kind, nullability and
//! array-ness. It never looks at file content. [`suppress`] applies the
//! "suppress optional" policy on top of a mapped type.

use crate::types::{LogicalType, PrimitiveKind, TypeKind};
use crate::value::Value;
use arrow::datatypes::{DataType, Field, TimeUnit};
use parquet::basic::Type as ParquetPhysicalType;
use parquet::schema::types::Type as ParquetType;

/// Physical primitive kinds as reported by the columnar library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhysicalKind {
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
    Utf8,
    LargeUtf8,
    Utf8View,
    Date32,
    Date64,
    Timestamp(TimeUnit),
    Time32(TimeUnit),
    Time64(TimeUnit),
    Duration(TimeUnit),
    Int96,
    ByteArray,
    Decimal,
    Interval,
    Unspecified,
}

impl PhysicalKind {
    /// Classify an Arrow data type. Nested types classify as `Unspecified`;
    /// array-ness is tracked separately on [`PhysicalColumn`].
    #[must_use]
    pub fn from_arrow(data_type: &DataType) -> Self {
        match data_type {
            DataType::Boolean => Self::Boolean,
            DataType::Int8 => Self::Int8,
            DataType::Int16 => Self::Int16,
            DataType::Int32 => Self::Int32,
            DataType::Int64 => Self::Int64,
            DataType::UInt8 => Self::UInt8,
            DataType::UInt16 => Self::UInt16,
            DataType::UInt32 => Self::UInt32,
            DataType::UInt64 => Self::UInt64,
            DataType::Float16 => Self::Float16,
            DataType::Float32 => Self::Float32,
            DataType::Float64 => Self::Float64,
            DataType::Utf8 => Self::Utf8,
            DataType::LargeUtf8 => Self::LargeUtf8,
            DataType::Utf8View => Self::Utf8View,
            DataType::Date32 => Self::Date32,
            DataType::Date64 => Self::Date64,
            DataType::Timestamp(unit, _) => Self::Timestamp(*unit),
            DataType::Time32(unit) => Self::Time32(*unit),
            DataType::Time64(unit) => Self::Time64(*unit),
            DataType::Duration(unit) => Self::Duration(*unit),
            DataType::Binary
            | DataType::LargeBinary
            | DataType::BinaryView
            | DataType::FixedSizeBinary(_) => Self::ByteArray,
            DataType::Decimal32(_, _)
            | DataType::Decimal64(_, _)
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => Self::Decimal,
            DataType::Interval(_) => Self::Interval,
            _ => Self::Unspecified,
        }
    }

    /// The physical kind the writer emits for a logical primitive.
    #[must_use]
    pub const fn for_logical(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::Boolean,
            PrimitiveKind::Int8 => Self::Int8,
            PrimitiveKind::Int16 => Self::Int16,
            PrimitiveKind::Int32 => Self::Int32,
            PrimitiveKind::Int64 => Self::Int64,
            PrimitiveKind::UInt8 => Self::UInt8,
            PrimitiveKind::UInt16 => Self::UInt16,
            PrimitiveKind::UInt32 => Self::UInt32,
            PrimitiveKind::UInt64 => Self::UInt64,
            PrimitiveKind::Float32 => Self::Float32,
            PrimitiveKind::Float64 => Self::Float64,
            PrimitiveKind::Text => Self::Utf8,
            PrimitiveKind::Date => Self::Date32,
            PrimitiveKind::Timestamp => Self::Timestamp(TimeUnit::Microsecond),
            PrimitiveKind::Time => Self::Time64(TimeUnit::Nanosecond),
        }
    }

    /// Arrow data type of this kind, if it has one the codec can decode.
    #[must_use]
    pub fn to_arrow(self) -> Option<DataType> {
        Some(match self {
            Self::Boolean => DataType::Boolean,
            Self::Int8 => DataType::Int8,
            Self::Int16 => DataType::Int16,
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::UInt8 => DataType::UInt8,
            Self::UInt16 => DataType::UInt16,
            Self::UInt32 => DataType::UInt32,
            Self::UInt64 => DataType::UInt64,
            Self::Float32 => DataType::Float32,
            Self::Float64 => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
            Self::LargeUtf8 => DataType::LargeUtf8,
            Self::Utf8View => DataType::Utf8View,
            Self::Date32 => DataType::Date32,
            Self::Date64 => DataType::Date64,
            Self::Timestamp(unit) => DataType::Timestamp(unit, None),
            Self::Time32(unit) => DataType::Time32(unit),
            Self::Time64(unit) => DataType::Time64(unit),
            Self::Duration(unit) => DataType::Duration(unit),
            Self::Float16
            | Self::Int96
            | Self::ByteArray
            | Self::Decimal
            | Self::Interval
            | Self::Unspecified => return None,
        })
    }
}

/// Descriptor of one top-level physical column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhysicalColumn {
    pub name: String,
    pub kind: PhysicalKind,
    pub nullable: bool,
    pub is_array: bool,
}

impl PhysicalColumn {
    /// Describe a top-level column from its Arrow field and its Parquet type.
    ///
    /// The Parquet type is consulted only to detect INT96 columns, which the
    /// Arrow reader otherwise presents as nanosecond timestamps.
    #[must_use]
    pub fn describe(field: &Field, parquet: &ParquetType) -> Self {
        let mut column = Self::from_arrow(field);
        if parquet.is_primitive() && parquet.get_physical_type() == ParquetPhysicalType::INT96 {
            column.kind = PhysicalKind::Int96;
        }
        column
    }

    /// Describe a column from its Arrow field alone.
    #[must_use]
    pub fn from_arrow(field: &Field) -> Self {
        let kind = PhysicalKind::from_arrow(field.data_type());
        let is_array = matches!(
            field.data_type(),
            DataType::List(_)
                | DataType::LargeList(_)
                | DataType::FixedSizeList(_, _)
                | DataType::ListView(_)
                | DataType::LargeListView(_)
                | DataType::Map(_, _)
        );
        Self {
            name: field.name().clone(),
            kind,
            nullable: field.is_nullable(),
            is_array,
        }
    }
}

/// Scale between a physical temporal unit and the logical representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemporalConvert {
    /// Multiply the physical value by this factor...
    pub mul: i64,
    /// ...then floor-divide by this one.
    pub div: i64,
    /// Replace nulls with the epoch (set under suppression).
    pub fill_nulls: bool,
}

impl TemporalConvert {
    const fn scale(mul: i64, div: i64) -> Self {
        Self {
            mul,
            div,
            fill_nulls: false,
        }
    }

    /// Convert one physical value to the logical representation.
    #[must_use]
    pub const fn apply(self, raw: i64) -> i64 {
        raw.saturating_mul(self.mul).div_euclid(self.div)
    }

    /// Convert one logical value back to the physical representation.
    #[must_use]
    pub const fn invert(self, logical: i64) -> i64 {
        logical.saturating_mul(self.div).div_euclid(self.mul)
    }
}

/// Per-field value coercion, selected once during schema resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoercionKind {
    Identity,
    NullToNaN,
    NullToDefault,
    DateRepresentationConvert(TemporalConvert),
}

impl CoercionKind {
    /// The value a null physical cell becomes under this coercion.
    #[must_use]
    pub fn null_fill(self, kind: PrimitiveKind) -> Value {
        match self {
            Self::Identity => Value::Null,
            Self::NullToNaN => match kind {
                PrimitiveKind::Float32 => Value::Float32(f32::NAN),
                _ => Value::Float64(f64::NAN),
            },
            Self::NullToDefault => Value::default_of(kind),
            Self::DateRepresentationConvert(c) if c.fill_nulls => Value::default_of(kind),
            Self::DateRepresentationConvert(_) => Value::Null,
        }
    }
}

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Nanoseconds in one tick of `unit`.
const fn nanos_per(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Second => NANOS_PER_SECOND,
        TimeUnit::Millisecond => 1_000_000,
        TimeUnit::Microsecond => 1_000,
        TimeUnit::Nanosecond => 1,
    }
}

/// Conversion from `unit` ticks into ticks of `target_nanos` nanoseconds,
/// or `None` when the units already agree.
const fn rescale(unit: TimeUnit, target_nanos: i64) -> Option<TemporalConvert> {
    let from = nanos_per(unit);
    if from == target_nanos {
        None
    } else if from > target_nanos {
        Some(TemporalConvert::scale(from / target_nanos, 1))
    } else {
        Some(TemporalConvert::scale(1, target_nanos / from))
    }
}

fn coercion_for(convert: Option<TemporalConvert>) -> CoercionKind {
    convert.map_or(CoercionKind::Identity, CoercionKind::DateRepresentationConvert)
}

/// Map a physical column descriptor to its logical type and coercion.
///
/// Returns `None` for array-typed columns and unsupported kinds. A nullable
/// column maps to an optional logical type.
#[must_use]
pub fn map(kind: PhysicalKind, has_nulls: bool, is_array: bool) -> Option<(LogicalType, CoercionKind)> {
    if is_array {
        return None;
    }
    let (logical, coercion) = match kind {
        PhysicalKind::Boolean => (PrimitiveKind::Bool, CoercionKind::Identity),
        PhysicalKind::Int8 => (PrimitiveKind::Int8, CoercionKind::Identity),
        PhysicalKind::Int16 => (PrimitiveKind::Int16, CoercionKind::Identity),
        PhysicalKind::Int32 => (PrimitiveKind::Int32, CoercionKind::Identity),
        PhysicalKind::Int64 => (PrimitiveKind::Int64, CoercionKind::Identity),
        PhysicalKind::UInt8 => (PrimitiveKind::UInt8, CoercionKind::Identity),
        PhysicalKind::UInt16 => (PrimitiveKind::UInt16, CoercionKind::Identity),
        PhysicalKind::UInt32 => (PrimitiveKind::UInt32, CoercionKind::Identity),
        PhysicalKind::UInt64 => (PrimitiveKind::UInt64, CoercionKind::Identity),
        PhysicalKind::Float32 => (PrimitiveKind::Float32, CoercionKind::Identity),
        PhysicalKind::Float64 => (PrimitiveKind::Float64, CoercionKind::Identity),
        PhysicalKind::Utf8 | PhysicalKind::LargeUtf8 | PhysicalKind::Utf8View => {
            (PrimitiveKind::Text, CoercionKind::Identity)
        }
        PhysicalKind::Date32 => (PrimitiveKind::Date, CoercionKind::Identity),
        PhysicalKind::Date64 => (
            PrimitiveKind::Date,
            CoercionKind::DateRepresentationConvert(TemporalConvert::scale(1, MILLIS_PER_DAY)),
        ),
        PhysicalKind::Timestamp(unit) => (
            PrimitiveKind::Timestamp,
            coercion_for(rescale(unit, nanos_per(TimeUnit::Microsecond))),
        ),
        PhysicalKind::Time32(unit) | PhysicalKind::Time64(unit) | PhysicalKind::Duration(unit) => {
            (PrimitiveKind::Time, coercion_for(rescale(unit, 1)))
        }
        PhysicalKind::Float16
        | PhysicalKind::Int96
        | PhysicalKind::ByteArray
        | PhysicalKind::Decimal
        | PhysicalKind::Interval
        | PhysicalKind::Unspecified => return None,
    };
    let ty = LogicalType::Primitive {
        kind: logical,
        opt: has_nulls,
    };
    Some((ty, coercion))
}

/// Apply the "suppress optional" policy to a mapped field.
///
/// Optional floats become required with NaN for nulls; other optional numerics,
/// booleans and temporals become required with their zero/epoch value. Text
/// and already-required types are returned unchanged.
#[must_use]
pub fn suppress(ty: LogicalType, coercion: CoercionKind) -> (LogicalType, CoercionKind) {
    let TypeKind::Primitive(kind) = ty.kind() else {
        return (ty, coercion);
    };
    if !ty.is_opt() || kind == PrimitiveKind::Text {
        return (ty, coercion);
    }
    let coercion = match coercion {
        CoercionKind::DateRepresentationConvert(c) => {
            CoercionKind::DateRepresentationConvert(TemporalConvert {
                fill_nulls: true,
                ..c
            })
        }
        _ if kind.is_float() => CoercionKind::NullToNaN,
        _ => CoercionKind::NullToDefault,
    };
    (ty.to_req(), coercion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_and_arrays_are_dropped() {
        for kind in [
            PhysicalKind::Int96,
            PhysicalKind::ByteArray,
            PhysicalKind::Decimal,
            PhysicalKind::Interval,
            PhysicalKind::Unspecified,
        ] {
            assert_eq!(map(kind, false, false), None, "{kind:?}");
        }
        assert_eq!(map(PhysicalKind::Int64, false, true), None);
    }

    #[test]
    fn nulls_promote_to_optional() {
        let (ty, c) = map(PhysicalKind::Int64, true, false).unwrap();
        assert_eq!(ty, LogicalType::opt(PrimitiveKind::Int64));
        assert_eq!(c, CoercionKind::Identity);
        let (ty, _) = map(PhysicalKind::Int64, false, false).unwrap();
        assert_eq!(ty, LogicalType::req(PrimitiveKind::Int64));
    }

    #[test]
    fn temporal_units_convert_once() {
        let (_, c) = map(PhysicalKind::Timestamp(TimeUnit::Microsecond), false, false).unwrap();
        assert_eq!(c, CoercionKind::Identity);

        let (_, c) = map(PhysicalKind::Timestamp(TimeUnit::Nanosecond), false, false).unwrap();
        let CoercionKind::DateRepresentationConvert(conv) = c else {
            panic!("expected conversion, got {c:?}");
        };
        assert_eq!(conv.apply(1_500), 1);
        assert_eq!(conv.apply(-1), -1);

        let (_, c) = map(PhysicalKind::Date64, false, false).unwrap();
        let CoercionKind::DateRepresentationConvert(conv) = c else {
            panic!("expected conversion, got {c:?}");
        };
        assert_eq!(conv.apply(MILLIS_PER_DAY * 3), 3);

        let (_, c) = map(PhysicalKind::Time32(TimeUnit::Second), false, false).unwrap();
        let CoercionKind::DateRepresentationConvert(conv) = c else {
            panic!("expected conversion, got {c:?}");
        };
        assert_eq!(conv.apply(2), 2 * NANOS_PER_SECOND);
        assert_eq!(conv.invert(2 * NANOS_PER_SECOND), 2);
    }

    #[test]
    fn suppression_table() {
        let cases = [
            (PhysicalKind::Float64, CoercionKind::NullToNaN),
            (PhysicalKind::Float32, CoercionKind::NullToNaN),
            (PhysicalKind::Int32, CoercionKind::NullToDefault),
            (PhysicalKind::Boolean, CoercionKind::NullToDefault),
            (PhysicalKind::Date32, CoercionKind::NullToDefault),
        ];
        for (kind, expected) in cases {
            let (ty, c) = map(kind, true, false).unwrap();
            let (ty, c) = suppress(ty, c);
            assert!(!ty.is_opt(), "{kind:?}");
            assert_eq!(c, expected, "{kind:?}");
        }

        let (ty, c) = map(PhysicalKind::Utf8, true, false).unwrap();
        let (ty, c) = suppress(ty, c);
        assert_eq!(ty, LogicalType::opt(PrimitiveKind::Text));
        assert_eq!(c, CoercionKind::Identity);

        let (ty, c) = map(PhysicalKind::Timestamp(TimeUnit::Millisecond), true, false).unwrap();
        let (ty, c) = suppress(ty, c);
        assert!(!ty.is_opt());
        assert_eq!(c.null_fill(PrimitiveKind::Timestamp), Value::Timestamp(0));
    }

    #[test]
    fn null_fill_values() {
        assert!(matches!(
            CoercionKind::NullToNaN.null_fill(PrimitiveKind::Float64),
            Value::Float64(v) if v.is_nan()
        ));
        assert_eq!(CoercionKind::NullToDefault.null_fill(PrimitiveKind::Bool), Value::Bool(false));
        assert_eq!(CoercionKind::Identity.null_fill(PrimitiveKind::Int8), Value::Null);
    }
}

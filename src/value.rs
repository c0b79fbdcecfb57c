//! Row values.
//!
//! A [`Row`] is a fixed-width slice of [`Value`]s laid out by a
//! [`crate::RowLayout`]: slot `i` holds the value of the layout's field `i`.

use crate::types::PrimitiveKind;
use serde::{Deserialize, Serialize};

/// One cell of a row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Text(String),
    /// Days since the Unix epoch.
    Date(i32),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    /// Nanoseconds.
    Time(i64),
}

macro_rules! accessors {
    ($($fn_name:ident => $variant:ident: $ty:ty),* $(,)?) => {
        $(
            #[must_use]
            pub const fn $fn_name(&self) -> Option<$ty> {
                match self {
                    Self::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        )*
    };
}

impl Value {
    accessors! {
        as_bool => Bool: bool,
        as_i8 => Int8: i8,
        as_i16 => Int16: i16,
        as_i32 => Int32: i32,
        as_i64 => Int64: i64,
        as_u8 => UInt8: u8,
        as_u16 => UInt16: u16,
        as_u32 => UInt32: u32,
        as_u64 => UInt64: u64,
        as_f32 => Float32: f32,
        as_f64 => Float64: f64,
        as_date => Date: i32,
        as_timestamp => Timestamp: i64,
        as_time => Time: i64,
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The zero/false/epoch value of `kind`. Text defaults to the empty string.
    #[must_use]
    pub fn default_of(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::Bool(false),
            PrimitiveKind::Int8 => Self::Int8(0),
            PrimitiveKind::Int16 => Self::Int16(0),
            PrimitiveKind::Int32 => Self::Int32(0),
            PrimitiveKind::Int64 => Self::Int64(0),
            PrimitiveKind::UInt8 => Self::UInt8(0),
            PrimitiveKind::UInt16 => Self::UInt16(0),
            PrimitiveKind::UInt32 => Self::UInt32(0),
            PrimitiveKind::UInt64 => Self::UInt64(0),
            PrimitiveKind::Float32 => Self::Float32(0.0),
            PrimitiveKind::Float64 => Self::Float64(0.0),
            PrimitiveKind::Text => Self::Text(String::new()),
            PrimitiveKind::Date => Self::Date(0),
            PrimitiveKind::Timestamp => Self::Timestamp(0),
            PrimitiveKind::Time => Self::Time(0),
        }
    }

    /// Name of this value's kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => PrimitiveKind::Bool.name(),
            Self::Int8(_) => PrimitiveKind::Int8.name(),
            Self::Int16(_) => PrimitiveKind::Int16.name(),
            Self::Int32(_) => PrimitiveKind::Int32.name(),
            Self::Int64(_) => PrimitiveKind::Int64.name(),
            Self::UInt8(_) => PrimitiveKind::UInt8.name(),
            Self::UInt16(_) => PrimitiveKind::UInt16.name(),
            Self::UInt32(_) => PrimitiveKind::UInt32.name(),
            Self::UInt64(_) => PrimitiveKind::UInt64.name(),
            Self::Float32(_) => PrimitiveKind::Float32.name(),
            Self::Float64(_) => PrimitiveKind::Float64.name(),
            Self::Text(_) => PrimitiveKind::Text.name(),
            Self::Date(_) => PrimitiveKind::Date.name(),
            Self::Timestamp(_) => PrimitiveKind::Timestamp.name(),
            Self::Time(_) => PrimitiveKind::Time.name(),
        }
    }
}

/// A single record: one value per layout field.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    values: Box<[Value]>,
}

impl Row {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_boxed_slice(),
        }
    }

    /// A row of `width` nulls.
    #[must_use]
    pub fn blank(width: usize) -> Self {
        Self::new(vec![Value::Null; width])
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.values.get(slot)
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values.into_vec()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

//! Pre-built tables and rows for common test scenarios.

use super::mock_io::parquet_bytes;
use crate::types::{FieldType, LogicalType, PrimitiveKind};
use crate::value::{Row, Value};
use anyhow::Result;
use arrow::array::{Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

/// Field name used for `kind` in [`every_kind_table`].
#[must_use]
pub fn kind_field_name(kind: PrimitiveKind) -> String {
    format!("f_{}", kind.name())
}

/// A table with one field per primitive kind, all optional or all required.
#[must_use]
pub fn every_kind_table(optional: bool) -> LogicalType {
    let fields = PrimitiveKind::ALL
        .iter()
        .map(|&kind| {
            let ty = if optional {
                LogicalType::opt(kind)
            } else {
                LogicalType::req(kind)
            };
            FieldType::new(kind_field_name(kind), ty)
        })
        .collect();
    LogicalType::table(fields)
}

/// The value of `kind` in row `i` of [`every_kind_rows`].
#[must_use]
pub fn sample_value(kind: PrimitiveKind, i: u64) -> Value {
    let n = i as i64;
    match kind {
        PrimitiveKind::Bool => Value::Bool(i % 2 == 0),
        PrimitiveKind::Int8 => Value::Int8((i % 200) as i8),
        PrimitiveKind::Int16 => Value::Int16((n * 7 - 300) as i16),
        PrimitiveKind::Int32 => Value::Int32((n * 1_001 - 50_000) as i32),
        PrimitiveKind::Int64 => Value::Int64(n * 1_000_000_007 - i64::MAX / 2),
        PrimitiveKind::UInt8 => Value::UInt8((i % 256) as u8),
        PrimitiveKind::UInt16 => Value::UInt16((i * 13 % 65_536) as u16),
        PrimitiveKind::UInt32 => Value::UInt32(u32::MAX - i as u32),
        PrimitiveKind::UInt64 => Value::UInt64(u64::MAX - i),
        PrimitiveKind::Float32 => Value::Float32(i as f32 * 0.5 - 3.0),
        PrimitiveKind::Float64 => Value::Float64(i as f64 * -1.25),
        PrimitiveKind::Text => Value::Text(format!("row-{i}")),
        PrimitiveKind::Date => Value::Date(18_000 + n as i32),
        PrimitiveKind::Timestamp => Value::Timestamp(1_600_000_000_000_000 + n * 1_000_001),
        PrimitiveKind::Time => Value::Time(n * 3_600_000_000_001 % 86_400_000_000_000),
    }
}

/// `n` fully populated rows for [`every_kind_table`].
#[must_use]
pub fn every_kind_rows(n: u64) -> Vec<Row> {
    (0..n)
        .map(|i| Row::new(PrimitiveKind::ALL.iter().map(|&k| sample_value(k, i)).collect()))
        .collect()
}

/// Like [`every_kind_rows`], but every third row is entirely null.
///
/// Only valid for `every_kind_table(true)`.
#[must_use]
pub fn every_kind_rows_with_nulls(n: u64) -> Vec<Row> {
    (0..n)
        .map(|i| {
            if i % 3 == 2 {
                Row::blank(PrimitiveKind::ALL.len())
            } else {
                Row::new(PrimitiveKind::ALL.iter().map(|&k| sample_value(k, i)).collect())
            }
        })
        .collect()
}

/// A Parquet file with one required int64 column, `per_group` rows per row
/// group.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn int64_column_bytes(name: &str, values: &[i64], per_group: usize) -> Result<Vec<u8>> {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Int64, false)]));
    let batches = values
        .chunks(per_group.max(1))
        .map(|chunk| {
            RecordBatch::try_new(
                Arc::clone(&schema),
                vec![Arc::new(Int64Array::from(chunk.to_vec()))],
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    parquet_bytes(schema, &batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_table_has_one_field_per_kind() {
        let table = every_kind_table(true);
        let fields = table.item().and_then(LogicalType::fields).unwrap();
        assert_eq!(fields.len(), PrimitiveKind::ALL.len());
        assert!(fields.iter().all(|f| f.ty.is_opt()));
        assert_eq!(fields[0].name, "f_bool");
    }

    #[test]
    fn nulls_every_third_row() {
        let rows = every_kind_rows_with_nulls(6);
        assert!(rows[2].values().iter().all(Value::is_null));
        assert!(rows[5].values().iter().all(Value::is_null));
        assert!(!rows[0].values().iter().any(Value::is_null));
    }
}

//! Row assertions.
//!
//! Decoded rows are compared value by value. Floats compare equal when both
//! sides are NaN, since null suppression turns missing floats into NaN.

use crate::value::{Row, Value};

/// Value equality that treats two NaNs of the same width as equal.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float32(x), Value::Float32(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Float64(x), Value::Float64(y)) => x == y || (x.is_nan() && y.is_nan()),
        _ => a == b,
    }
}

/// Row equality built on [`values_equal`].
#[must_use]
pub fn rows_equal(a: &Row, b: &Row) -> bool {
    a.width() == b.width() && a.values().iter().zip(b.values()).all(|(x, y)| values_equal(x, y))
}

/// Assert that two row lists are equal in order.
///
/// # Panics
///
/// Panics with the first differing row and slot if the lists differ.
pub fn assert_rows_equal(actual: &[Row], expected: &[Row]) {
    if actual.len() != expected.len() {
        panic!(
            "Row lists have different lengths:\n  actual: {} rows\n  expected: {} rows",
            actual.len(),
            expected.len()
        );
    }

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if a.width() != e.width() {
            panic!(
                "Row {i} has a different width:\n  actual: {}\n  expected: {}",
                a.width(),
                e.width()
            );
        }
        for (slot, (av, ev)) in a.values().iter().zip(e.values()).enumerate() {
            if !values_equal(av, ev) {
                panic!("Row {i} differs at slot {slot}:\n  actual: {av:?}\n  expected: {ev:?}");
            }
        }
    }
}

/// Assert that every value in `slot` is present (not [`Value::Null`]).
///
/// # Panics
///
/// Panics with the first row holding a null.
pub fn assert_no_nulls(rows: &[Row], slot: usize) {
    if let Some(i) = rows
        .iter()
        .position(|r| r.get(slot).is_none_or(Value::is_null))
    {
        panic!("Row {i} has no value at slot {slot}: {:?}", rows[i]);
    }
}

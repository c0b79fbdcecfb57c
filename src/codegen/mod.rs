//! Schema-specialized conversion routines.
//!
//! [`synthesize`] turns a [`SchemaInfo`] into a [`Routines`] pair, once per
//! reader or writer:
//! - [`Populate`]: Arrow columns → [`crate::Row`]s
//! - [`Extract`]: [`crate::Row`]s → Arrow columns
//!
//! All per-type decisions (which Arrow array to downcast to, which value
//! constructor to use, which null fill to apply, which unit conversion to run)
//! are made here, while building one closure per field. Each closure body is a
//! generic function instantiated for its concrete Arrow type, so the per-value
//! loops contain no type dispatch.
//!
//! Routines are tied to the schema that built them: both check the row width
//! against the layout they were synthesized for.

mod extract;
mod populate;

pub use extract::Extract;
pub use populate::Populate;

use crate::error::CodecError;
use crate::schema::SchemaInfo;

/// The populate/extract pair for one schema.
pub struct Routines {
    pub populate: Populate,
    pub extract: Extract,
}

/// Build both routines for `info`.
///
/// # Errors
///
/// Returns [`CodecError::Precondition`] if a mapped field has a physical kind
/// no routine exists for.
pub fn synthesize(info: &SchemaInfo) -> Result<Routines, CodecError> {
    let width = info.layout().width();
    Ok(Routines {
        populate: Populate::build(info.fields(), width)?,
        extract: Extract::build(info.fields(), width)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldType, LogicalType, PrimitiveKind, TypeSystem};
    use crate::value::{Row, Value};
    use arrow::array::{ArrayRef, Int64Array};
    use std::sync::Arc;

    fn routines() -> Routines {
        let types = TypeSystem::new();
        let table = LogicalType::table(vec![FieldType::new("x", LogicalType::req(PrimitiveKind::Int64))]);
        let info = SchemaInfo::for_write(&types, &table).unwrap();
        synthesize(&info).unwrap()
    }

    fn is_precondition(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<CodecError>(), Some(CodecError::Precondition(_)))
    }

    #[test]
    fn extract_then_populate() {
        let r = routines();
        let rows = vec![Row::new(vec![Value::Int64(3)]), Row::new(vec![Value::Int64(4)])];
        let columns = r.extract.extract(&rows, 2).unwrap();
        let mut back = vec![Row::blank(1)];
        r.populate.populate(&mut back, 1, 1, &columns).unwrap();
        assert_eq!(back, vec![Row::new(vec![Value::Int64(4)])]);
    }

    #[test]
    fn count_beyond_rows_is_rejected() {
        let r = routines();
        let err = r.extract.extract(&[Row::new(vec![Value::Int64(1)])], 3).unwrap_err();
        assert!(is_precondition(&err));

        let column: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3]));
        let mut rows = vec![Row::blank(1)];
        let err = r.populate.populate(&mut rows, 3, 0, &[column]).unwrap_err();
        assert!(is_precondition(&err));
    }

    #[test]
    fn missing_columns_are_rejected() {
        let r = routines();
        let mut rows = vec![Row::blank(1)];
        let err = r.populate.populate(&mut rows, 1, 0, &[]).unwrap_err();
        assert!(is_precondition(&err));
        assert_eq!(rows[0], Row::blank(1));
    }
}

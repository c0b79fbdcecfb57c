use anyhow::Result;
use ironbeam_columnar::testing::*;
use ironbeam_columnar::*;
use std::io::Cursor;

fn xy_table() -> LogicalType {
    LogicalType::table(vec![
        FieldType::new("x", LogicalType::req(PrimitiveKind::Int64)),
        FieldType::new("y", LogicalType::opt(PrimitiveKind::Float64)),
    ])
}

fn xy(x: i64, y: Option<f64>) -> Row {
    Row::new(vec![Value::Int64(x), y.map_or(Value::Null, Value::Float64)])
}

fn codec_error(err: &anyhow::Error) -> &CodecError {
    err.downcast_ref::<CodecError>().expect("codec error")
}

#[test]
fn rejects_non_table_types() {
    let types = TypeSystem::new();
    for ty in [
        LogicalType::req(PrimitiveKind::Int64),
        LogicalType::sequence(LogicalType::req(PrimitiveKind::Text)),
    ] {
        let err = get_writer(&types, &ty, 10).err().expect("not a table");
        assert!(matches!(codec_error(&err), CodecError::Precondition(_)), "{ty}");
    }
}

#[test]
fn a_bare_record_is_accepted() -> Result<()> {
    let types = TypeSystem::new();
    let record = LogicalType::record(vec![FieldType::new("x", LogicalType::req(PrimitiveKind::Int32))]);
    let writer = get_writer(&types, &record, 10)?;
    assert_eq!(writer.field_names(), vec!["x"]);
    Ok(())
}

#[test]
fn wrong_row_width_is_rejected() {
    let types = TypeSystem::new();
    let writer = get_writer(&types, &xy_table(), 10).unwrap();
    let err = writer
        .write(vec![Row::new(vec![Value::Int64(1)])], Vec::new(), None, 10)
        .unwrap_err();
    assert!(matches!(
        codec_error(&err),
        CodecError::RowWidth { expected: 2, actual: 1 }
    ));
}

#[test]
fn null_in_required_field_is_rejected() {
    let types = TypeSystem::new();
    let writer = get_writer(&types, &xy_table(), 10).unwrap();
    let rows = vec![xy(1, None), Row::new(vec![Value::Null, Value::Float64(1.0)])];
    let err = writer.write(rows, Vec::new(), None, 10).unwrap_err();
    match codec_error(&err) {
        CodecError::NullInRequired { field, row } => {
            assert_eq!(field, "x");
            assert_eq!(*row, 1);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn value_of_the_wrong_kind_is_rejected() {
    let types = TypeSystem::new();
    let writer = get_writer(&types, &xy_table(), 10).unwrap();
    let rows = vec![Row::new(vec![Value::Int64(1), Value::Text("1.5".into())])];
    let err = writer.write(rows, Vec::new(), None, 10).unwrap_err();
    match codec_error(&err) {
        CodecError::ValueKind { field, expected, actual, .. } => {
            assert_eq!(field, "y");
            assert_eq!(*expected, "float64");
            assert_eq!(*actual, "text");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn nested_fields_are_dropped_from_output() -> Result<()> {
    let types = TypeSystem::new();
    let table = LogicalType::table(vec![
        FieldType::new("id", LogicalType::req(PrimitiveKind::Int32)),
        FieldType::new(
            "inner",
            LogicalType::record(vec![FieldType::new("a", LogicalType::req(PrimitiveKind::Bool))]),
        ),
        FieldType::new("name", LogicalType::opt(PrimitiveKind::Text)),
    ]);
    let writer = get_writer(&types, &table, 10)?;
    assert_eq!(writer.field_names(), vec!["id", "name"]);
    assert_eq!(writer.dropped_fields().len(), 1);
    assert_eq!(writer.dropped_fields()[0].name, "inner");

    let rows = vec![
        Row::new(vec![Value::Int32(1), Value::Null, Value::Text("a".into())]),
        Row::new(vec![Value::Int32(2), Value::Null, Value::Null]),
    ];
    let mut bytes = Vec::new();
    writer.write(rows, &mut bytes, None, 10)?;

    let (ty, seq) = read(&types, Cursor::new(bytes), &ReadOptions::default(), None, None)?;
    assert_eq!(
        ty,
        LogicalType::table(vec![
            FieldType::new("id", LogicalType::req(PrimitiveKind::Int32)),
            FieldType::new("name", LogicalType::opt(PrimitiveKind::Text)),
        ])
    );
    assert_rows_equal(
        &seq.wait_all()?,
        &[
            Row::new(vec![Value::Int32(1), Value::Text("a".into())]),
            Row::new(vec![Value::Int32(2), Value::Null]),
        ],
    );
    Ok(())
}

#[test]
fn progress_reports_cadence_and_flushes() -> Result<()> {
    let types = TypeSystem::new();
    let writer = get_writer(&types, &xy_table(), 20)?;
    let rows: Vec<Row> = (0..50).map(|i| xy(i, Some(i as f64))).collect();

    let mut seen = Vec::new();
    let mut progress = |n: u64| seen.push(n);
    let groups = writer.write(rows, Vec::new(), Some(&mut progress), 8)?;
    assert_eq!(groups, 3);

    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&50));
    for expected in [8, 16, 20, 40, 48] {
        assert!(seen.contains(&expected), "missing report at {expected}: {seen:?}");
    }
    Ok(())
}

#[test]
fn writer_can_be_reused() -> Result<()> {
    let types = TypeSystem::new();
    let writer = get_writer(&types, &xy_table(), 2)?;
    for n in [0_i64, 3, 5] {
        let mut bytes = Vec::new();
        let groups = writer.write((0..n).map(|i| xy(i, None)), &mut bytes, None, 10)?;
        assert_eq!(groups, usize::try_from(n.max(1) + 1)? / 2);
        let (_, seq) = read(&types, Cursor::new(bytes), &ReadOptions::default(), None, None)?;
        assert_eq!(seq.len(), usize::try_from(n)?);
    }
    Ok(())
}

#[test]
fn options_load_from_json() -> Result<()> {
    let options = WriteOptions::from_json(r#"{"recs_per_group": 3}"#)?;
    assert_eq!(options.recs_per_group, 3);
    assert_eq!(options.freq, 10);

    let types = TypeSystem::new();
    let mut bytes = Vec::new();
    let groups = get_writer_with(&types, &xy_table(), &options)?.write(
        (0..7).map(|i| xy(i, Some(0.5))),
        &mut bytes,
        None,
        options.freq,
    )?;
    assert_eq!(groups, 3);

    let read_options = ReadOptions::from_json(r#"{"suppress_optional": true}"#)?;
    let (ty, _) = read(&types, Cursor::new(bytes), &read_options, None, None)?;
    let fields = ty.item().and_then(LogicalType::fields).unwrap_or_default();
    assert!(fields.iter().all(|f| !f.ty.is_opt()));
    Ok(())
}

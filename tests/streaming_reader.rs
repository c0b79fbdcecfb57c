use anyhow::Result;
use ironbeam_columnar::testing::*;
use ironbeam_columnar::*;
use parquet::errors::ParquetError;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::thread;

fn recorder() -> (Arc<Mutex<Vec<u64>>>, Progress) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: Progress = Box::new(move |n| sink.lock().unwrap().push(n));
    (seen, progress)
}

#[test]
fn failure_in_a_later_row_group_reaches_run_and_consumers() -> Result<()> {
    let types = TypeSystem::new();
    let bytes = int64_column_bytes("x", &(0..30).collect::<Vec<_>>(), 10)?;
    let inner = parquet_reader(bytes)?;
    assert_eq!(inner.num_row_groups(), 3);
    let failing = FailingColumnarReader::new(Box::new(inner), 1, "checksum mismatch");

    let mut reader = Reader::with_columnar(&types, Box::new(failing), &ReadOptions::default(), None)?;
    let seq = reader.sequence();
    let consumer = thread::spawn(move || seq.iter().collect::<Vec<_>>());

    let err = reader.run().unwrap_err();
    let parquet = err.downcast_ref::<ParquetError>().expect("library error passes through");
    assert!(parquet.to_string().contains("checksum mismatch"));
    assert_eq!(reader.state(), ReaderState::Failed);

    let items = consumer.join().unwrap();
    let (oks, errs): (Vec<_>, Vec<_>) = items.iter().partition(|r| r.is_ok());
    assert_eq!(oks.len(), 10);
    assert_eq!(errs.len(), 1);
    assert!(items.last().unwrap().is_err());
    assert!(reader.sequence().failure().unwrap().message.contains("checksum mismatch"));
    Ok(())
}

#[test]
fn failure_in_first_row_group_yields_only_the_error() -> Result<()> {
    let types = TypeSystem::new();
    let inner = parquet_reader(int64_column_bytes("x", &[1, 2, 3], 3)?)?;
    let failing = FailingColumnarReader::new(Box::new(inner), 0, "bad page");
    let mut reader = Reader::with_columnar(&types, Box::new(failing), &ReadOptions::default(), None)?;
    assert!(reader.run().is_err());

    let mut iter = reader.sequence().iter();
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
    Ok(())
}

#[test]
fn consumer_sees_rows_while_reader_runs() -> Result<()> {
    let types = TypeSystem::new();
    let values: Vec<i64> = (0..1_000).collect();
    let bytes = int64_column_bytes("x", &values, 100)?;

    let mut reader = Reader::create(&types, Cursor::new(bytes), &ReadOptions::default(), None)?;
    let seq = reader.sequence();
    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let seq = seq.clone();
            thread::spawn(move || {
                seq.iter()
                    .map(|r| r.map(|row| row.get(0).and_then(Value::as_i64).unwrap()))
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .collect();

    let producer = thread::spawn(move || reader.run());
    producer.join().unwrap()?;
    for consumer in consumers {
        assert_eq!(consumer.join().unwrap()?, values);
    }
    Ok(())
}

#[test]
fn progress_is_monotonic_and_ends_at_total() -> Result<()> {
    let types = TypeSystem::new();
    let values: Vec<i64> = (0..250).collect();
    let bytes = int64_column_bytes("x", &values, 64)?;
    let (seen, progress) = recorder();

    let options = ReadOptions {
        freq: 16,
        ..ReadOptions::default()
    };
    let (_, seq) = read(&types, Cursor::new(bytes), &options, Some(progress), None)?;
    assert_eq!(seq.len(), 250);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*seen.last().unwrap(), 250);
    // Sub-batches of 16 rows: 64 rows per group gives 4 reports per group.
    assert!(seen.contains(&16));
    assert!(seen.contains(&32));
    Ok(())
}

#[test]
fn freq_is_clamped() -> Result<()> {
    let types = TypeSystem::new();
    let values: Vec<i64> = (0..600).collect();

    for (freq, step) in [(1, 8), (0, 256), (-3, 256), (10_000, 256), (100, 100)] {
        let bytes = int64_column_bytes("x", &values, 600)?;
        let (seen, progress) = recorder();
        let options = ReadOptions {
            freq,
            ..ReadOptions::default()
        };
        read(&types, Cursor::new(bytes), &options, Some(progress), None)?;
        let seen = seen.lock().unwrap();
        assert!(seen.contains(&step), "freq {freq} should report after {step} rows");
        assert_eq!(*seen.last().unwrap(), 600);
    }
    Ok(())
}

#[test]
fn run_twice_is_a_precondition_error() -> Result<()> {
    let types = TypeSystem::new();
    let bytes = int64_column_bytes("x", &[1, 2], 2)?;
    let mut reader = Reader::create(&types, Cursor::new(bytes), &ReadOptions::default(), None)?;
    assert_eq!(reader.state(), ReaderState::Created);
    reader.run()?;
    assert_eq!(reader.state(), ReaderState::Completed);

    let err = reader.run().unwrap_err();
    assert!(matches!(err.downcast_ref::<CodecError>(), Some(CodecError::Precondition(_))));
    assert_eq!(reader.sequence().len(), 2);
    assert_eq!(reader.sequence().failure(), None);
    Ok(())
}

#[test]
fn unseekable_stream_is_rejected_at_create() -> Result<()> {
    let types = TypeSystem::new();
    let bytes = int64_column_bytes("x", &[1], 1)?;
    let err = Reader::create(&types, Unseekable(Cursor::new(bytes)), &ReadOptions::default(), None)
        .err()
        .expect("unseekable stream");
    assert!(matches!(err.downcast_ref::<CodecError>(), Some(CodecError::Precondition(_))));
    Ok(())
}

#[test]
fn garbage_input_fails_at_create_with_library_error() {
    let types = TypeSystem::new();
    let err = Reader::create(&types, Cursor::new(b"not a parquet file".to_vec()), &ReadOptions::default(), None)
        .err()
        .expect("garbage input");
    assert!(err.downcast_ref::<ParquetError>().is_some());
}

#[test]
fn notify_runs_before_population() -> Result<()> {
    let types = TypeSystem::new();
    let bytes = int64_column_bytes("x", &[7, 8, 9], 3)?;
    let mut observed = None;
    let mut notify = |ty: &LogicalType, seq: &RowSequence| {
        observed = Some((ty.clone(), seq.len(), seq.is_ended()));
    };

    let (ty, seq) = read(&types, Cursor::new(bytes), &ReadOptions::default(), None, Some(&mut notify))?;
    let (seen_ty, seen_len, seen_ended) = observed.expect("notify called");
    assert_eq!(seen_ty, ty);
    assert_eq!(seen_len, 0);
    assert!(!seen_ended);
    assert_eq!(seq.len(), 3);
    assert!(seq.is_ended());
    Ok(())
}

#[test]
fn field_names_follow_physical_order() -> Result<()> {
    let types = TypeSystem::new();
    let table = every_kind_table(false);
    let mut bytes = Vec::new();
    get_writer(&types, &table, 10)?.write(every_kind_rows(2), &mut bytes, None, 10)?;

    let reader = Reader::create(&types, Cursor::new(bytes), &ReadOptions::default(), None)?;
    let expected: Vec<String> = PrimitiveKind::ALL.iter().map(|&k| kind_field_name(k)).collect();
    assert_eq!(reader.field_names(), expected);
    assert!(reader.dropped_columns().is_empty());
    Ok(())
}

#[test]
fn in_memory_columns_stream_like_files() -> Result<()> {
    use arrow::array::{Float64Array, RecordBatch, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};

    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, true),
        Field::new("score", DataType::Float64, false),
    ]));
    let batch = |names: Vec<Option<&str>>, scores: Vec<f64>| {
        RecordBatch::try_new(
            Arc::clone(&schema),
            vec![Arc::new(StringArray::from(names)), Arc::new(Float64Array::from(scores))],
        )
    };
    let groups = vec![
        batch(vec![Some("a"), None], vec![1.0, 2.0])?,
        batch(vec![Some("c")], vec![3.0])?,
    ];
    let memory = MemoryColumnarReader::new(&schema, groups)?;

    let types = TypeSystem::new();
    let mut reader = Reader::with_columnar(&types, Box::new(memory), &ReadOptions::default(), None)?;
    reader.run()?;
    let rows = reader.sequence().wait_all()?;
    assert_rows_equal(
        &rows,
        &[
            Row::new(vec![Value::Text("a".into()), Value::Float64(1.0)]),
            Row::new(vec![Value::Null, Value::Float64(2.0)]),
            Row::new(vec![Value::Text("c".into()), Value::Float64(3.0)]),
        ],
    );
    Ok(())
}

#[test]
fn short_column_is_reported() -> Result<()> {
    use arrow::array::{ArrayRef, Int64Array};
    use arrow::datatypes::{DataType, Field};

    struct ShortColumn {
        columns: Vec<PhysicalColumn>,
    }

    impl ColumnarReader for ShortColumn {
        fn columns(&self) -> &[PhysicalColumn] {
            &self.columns
        }
        fn num_row_groups(&self) -> usize {
            1
        }
        fn row_group_len(&self, _group: usize) -> usize {
            3
        }
        fn read_column(&mut self, _group: usize, _column: usize) -> Result<ArrayRef> {
            Ok(Arc::new(Int64Array::from(vec![1, 2])))
        }
    }

    let types = TypeSystem::new();
    let columns = vec![PhysicalColumn::from_arrow(&Field::new("x", DataType::Int64, false))];
    let mut reader = Reader::with_columnar(&types, Box::new(ShortColumn { columns }), &ReadOptions::default(), None)?;
    let err = reader.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CodecError>(),
        Some(CodecError::ColumnLength { expected: 3, actual: 2, .. })
    ));
    assert!(reader.sequence().failure().is_some());
    Ok(())
}

#[test]
fn dropping_an_unrun_reader_ends_the_sequence() -> Result<()> {
    let types = TypeSystem::new();
    let bytes = int64_column_bytes("x", &[1, 2, 3], 3)?;
    let reader = Reader::create(&types, Cursor::new(bytes), &ReadOptions::default(), None)?;
    let seq = reader.sequence();
    let consumer = {
        let seq = seq.clone();
        thread::spawn(move || seq.iter().collect::<Vec<_>>())
    };

    drop(reader);
    let items = consumer.join().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].is_err());
    assert!(seq.failure().unwrap().message.contains("dropped"));
    Ok(())
}

#[test]
fn panicking_progress_callback_ends_the_sequence() -> Result<()> {
    let types = TypeSystem::new();
    let values: Vec<i64> = (0..200).collect();
    let bytes = int64_column_bytes("x", &values, 200)?;
    let progress: Progress = Box::new(|n| assert!(n < 50, "progress callback gave up at {n}"));
    let options = ReadOptions {
        freq: 16,
        ..ReadOptions::default()
    };

    let mut reader = Reader::create(&types, Cursor::new(bytes), &options, Some(progress))?;
    let seq = reader.sequence();
    let consumer = {
        let seq = seq.clone();
        thread::spawn(move || seq.wait_all())
    };

    let producer = thread::spawn(move || reader.run());
    assert!(producer.join().is_err());
    let err = consumer.join().unwrap().unwrap_err();
    assert!(err.message.contains("dropped"));
    assert!(seq.is_ended());
    Ok(())
}

#[test]
fn dropping_a_finished_reader_keeps_its_outcome() -> Result<()> {
    let types = TypeSystem::new();
    let bytes = int64_column_bytes("x", &[4, 5], 2)?;
    let mut reader = Reader::create(&types, Cursor::new(bytes), &ReadOptions::default(), None)?;
    reader.run()?;
    let seq = reader.sequence();
    drop(reader);
    assert_eq!(seq.failure(), None);
    assert_eq!(seq.wait_all()?.len(), 2);
    Ok(())
}

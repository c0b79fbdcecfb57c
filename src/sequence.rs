//! Producer/consumer row sequence.
//!
//! A [`RowSequence`] is filled by one producer ([`crate::Reader::run`]) and
//! can be iterated by any number of consumers, on any thread, while the
//! producer is still running. Iterators block until more rows arrive or the
//! sequence ends. The end is explicit: either [`RowSequence::complete`] or
//! [`RowSequence::fail`], posted exactly once.
//!
//! ```
//! use ironbeam_columnar::{Row, RowSequence, Value};
//!
//! let seq = RowSequence::new();
//! seq.extend(vec![Row::new(vec![Value::Int64(1)])]);
//! seq.complete();
//! let rows: Vec<Row> = seq.iter().collect::<Result<_, _>>().unwrap();
//! assert_eq!(rows.len(), 1);
//! ```

use crate::value::Row;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use thiserror::Error;

/// Failure signal observed by consumers of a failed sequence.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("row sequence failed: {message}")]
pub struct SequenceFailure {
    pub message: String,
}

#[derive(Clone, Debug)]
enum End {
    Completed,
    Failed(SequenceFailure),
}

#[derive(Default)]
struct State {
    rows: Vec<Row>,
    end: Option<End>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    changed: Condvar,
}

/// Cloneable handle to a shared, append-only row buffer.
#[derive(Clone, Default)]
pub struct RowSequence {
    shared: Arc<Shared>,
}

impl RowSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Rows are only ever appended, so a poisoned buffer is still consistent.
        self.shared
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append rows and wake waiting consumers. Ignored once the sequence ended.
    pub fn extend(&self, rows: impl IntoIterator<Item = Row>) {
        let mut state = self.lock();
        if state.end.is_some() {
            return;
        }
        state.rows.extend(rows);
        drop(state);
        self.shared.changed.notify_all();
    }

    /// Post the completion signal. Returns `false` if the sequence had already ended.
    pub fn complete(&self) -> bool {
        self.finish(End::Completed)
    }

    /// Post the failure signal. Returns `false` if the sequence had already ended.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.finish(End::Failed(SequenceFailure {
            message: message.into(),
        }))
    }

    fn finish(&self, end: End) -> bool {
        let mut state = self.lock();
        if state.end.is_some() {
            return false;
        }
        state.end = Some(end);
        drop(state);
        self.shared.changed.notify_all();
        true
    }

    /// Rows appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an end signal has been posted.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.lock().end.is_some()
    }

    /// The failure, if the sequence ended with one.
    #[must_use]
    pub fn failure(&self) -> Option<SequenceFailure> {
        match &self.lock().end {
            Some(End::Failed(f)) => Some(f.clone()),
            _ => None,
        }
    }

    /// Iterate from the first row, blocking for rows not yet produced.
    #[must_use]
    pub fn iter(&self) -> RowIter {
        RowIter {
            sequence: self.clone(),
            next: 0,
            done: false,
        }
    }

    /// Block until the sequence ends and return all rows, or the failure.
    ///
    /// # Errors
    ///
    /// Returns the [`SequenceFailure`] if the producer failed.
    pub fn wait_all(&self) -> Result<Vec<Row>, SequenceFailure> {
        let mut state = self.lock();
        loop {
            match &state.end {
                Some(End::Completed) => return Ok(state.rows.clone()),
                Some(End::Failed(f)) => return Err(f.clone()),
                None => {
                    state = self
                        .shared
                        .changed
                        .wait(state)
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                }
            }
        }
    }
}

impl fmt::Debug for RowSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("RowSequence")
            .field("rows", &state.rows.len())
            .field("end", &state.end)
            .finish()
    }
}

impl IntoIterator for &RowSequence {
    type Item = Result<Row, SequenceFailure>;
    type IntoIter = RowIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Blocking iterator over a [`RowSequence`].
///
/// Yields every row in order, then ends on completion or yields the failure
/// once and ends.
pub struct RowIter {
    sequence: RowSequence,
    next: usize,
    done: bool,
}

impl Iterator for RowIter {
    type Item = Result<Row, SequenceFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut state = self.sequence.lock();
        loop {
            if let Some(row) = state.rows.get(self.next) {
                self.next += 1;
                return Some(Ok(row.clone()));
            }
            match &state.end {
                Some(End::Completed) => {
                    self.done = true;
                    return None;
                }
                Some(End::Failed(f)) => {
                    self.done = true;
                    return Some(Err(f.clone()));
                }
                None => {
                    state = self
                        .sequence
                        .shared
                        .changed
                        .wait(state)
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                }
            }
        }
    }
}

//! Prescription events.

use chrono::NaiveDate;

use crate::{ModelError, SubjectId};

/// One prescription record.
///
/// `values` lines up with [`EventTable::columns`]; a `None` entry is a cell
/// that was empty or not numeric and contributes nothing to sums.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub subject: SubjectId,
    pub date: NaiveDate,
    pub data_provider: Option<f64>,
    pub time_in_sample: Option<f64>,
    pub values: Vec<Option<f64>>,
}

/// The ingested event stream with its numeric indicator columns.
#[derive(Debug, Clone, Default)]
pub struct EventTable {
    columns: Vec<String>,
    events: Vec<Event>,
}

impl EventTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: Event) -> Result<(), ModelError> {
        if event.values.len() != self.columns.len() {
            return Err(ModelError::ValueCountMismatch {
                expected: self.columns.len(),
                actual: event.values.len(),
            });
        }
        self.events.push(event);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//! Record / Column - the unit of data flowing through the relay
//!
//! A record is a flat map of named, typed columns.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// One typed value carried by a record field.
///
/// The variant is the type: strings carry log text, the three numeric
/// variants carry metric semantics that encoders map onto their wire
/// format (e.g. statsd `g`/`m`/`c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// Free-form text (a log line, a parsed field).
    String(String),
    /// Point-in-time measurement.
    Gauge(i64),
    /// Timing / rate style metric.
    Metric(i64),
    /// Monotonic count increment.
    Counter(i64),
}

/// Discriminant of a [`Column`] without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Gauge,
    Metric,
    Counter,
}

impl Column {
    /// The kind of this column.
    #[inline]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::String(_) => ColumnKind::String,
            Column::Gauge(_) => ColumnKind::Gauge,
            Column::Metric(_) => ColumnKind::Metric,
            Column::Counter(_) => ColumnKind::Counter,
        }
    }

    /// The text value, if this is a string column.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Column::String(value) => Some(value),
            _ => None,
        }
    }

    /// The numeric value, if this is one of the numeric columns.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Column::String(_) => None,
            Column::Gauge(value) | Column::Metric(value) | Column::Counter(value) => Some(*value),
        }
    }
}

// Serialized as the raw value: the wire formats carry no type tag.
impl Serialize for Column {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Column::String(value) => serializer.serialize_str(value),
            Column::Gauge(value) | Column::Metric(value) | Column::Counter(value) => {
                serializer.serialize_i64(*value)
            }
        }
    }
}

/// A named set of typed columns.
///
/// Records are built by a producer, handed to the relay by value, and
/// only ever read on the delivery side. Column order is unspecified.
///
/// # Examples
/// ```
/// use contracts::{Column, Record};
///
/// let mut record = Record::new();
/// record.insert("msg", Column::String("service started".into()));
/// record.insert("workers", Column::Gauge(4));
///
/// assert_eq!(record.len(), 2);
/// assert_eq!(record.get("workers").and_then(|c| c.as_i64()), Some(4));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: HashMap<String, Column>,
}

impl Record {
    /// Create an empty record.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a column, returning the previous value for the field if any.
    pub fn insert(&mut self, field: impl Into<String>, column: Column) -> Option<Column> {
        self.columns.insert(field.into(), column)
    }

    /// Look up a column by field name.
    #[inline]
    pub fn get(&self, field: &str) -> Option<&Column> {
        self.columns.get(field)
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the record carries no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over `(field, column)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(field, column)| (field.as_str(), column))
    }
}

impl<F: Into<String>> FromIterator<(F, Column)> for Record {
    fn from_iter<I: IntoIterator<Item = (F, Column)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(field, column)| (field.into(), column))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Column);
    type IntoIter = std::collections::hash_map::IntoIter<String, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

// Serialized as a plain object: field name -> raw value.
impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (field, column) in &self.columns {
            map.serialize_entry(field, column)?;
        }
        map.end()
    }
}

//! Ordered logs of typed entries and the filters that query them

use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::Document;
use crate::{Error, Result};

/// An entry that can be stored in a [`Log`].
pub trait LogEntry: Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug {
    /// When the entry was created.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Check value-level constraints before the entry is appended.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// An append-only sequence of log entries, persisted as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Log<T> {
    entries: Vec<T>,
}

impl<T> Default for Log<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Log<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<T>) -> Self {
        Self { entries }
    }

    pub fn add_entry(&mut self, entry: T) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

impl<T: LogEntry> Log<T> {
    /// Timestamp of the newest entry, or `None` for an empty log.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.entries.last().map(LogEntry::timestamp)
    }

    /// Entries strictly newer than `cursor`, in their original order.
    ///
    /// `None` means "before everything" and returns every entry.
    pub fn entries_after(&self, cursor: Option<DateTime<Utc>>) -> Self {
        let entries = match cursor {
            Some(cursor) => self
                .entries
                .iter()
                .filter(|e| e.timestamp() > cursor)
                .cloned()
                .collect(),
            None => self.entries.clone(),
        };
        Self { entries }
    }
}

impl<T> Index<usize> for Log<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.entries[index]
    }
}

impl<'a, T> IntoIterator for &'a Log<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T> FromIterator<T> for Log<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: LogEntry> Document for Log<T> {
    fn validate(&self) -> std::result::Result<(), String> {
        for (i, entry) in self.entries.iter().enumerate() {
            entry
                .validate()
                .map_err(|reason| format!("entry {i}: {reason}"))?;
        }
        Ok(())
    }
}

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Le,
    Ge,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    fn is_ordering(&self) -> bool {
        matches!(self, Self::Le | Self::Ge)
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Le => ordering != Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }
}

impl FromStr for FilterOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            other => Err(Error::unsupported_filter(format!(
                "unknown operator '{other}', expected one of ==, !=, <=, >="
            ))),
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How field values are interpreted when filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    String,
    Number,
    Datetime,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "str",
            Self::Number => "number",
            Self::Datetime => "datetime",
        }
    }
}

impl FromStr for FilterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "str" | "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "datetime" | "date" => Ok(Self::Datetime),
            other => Err(Error::unsupported_filter(format!(
                "unknown filter type '{other}', expected one of str, number, datetime"
            ))),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-field predicate over log entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field_name: String,
    pub filter_value: String,
    pub filter_type: FilterType,
    pub operator: FilterOperator,
}

impl Filter {
    /// Build a filter, rejecting combinations that can never be evaluated.
    ///
    /// Ordering operators are not defined for string fields, and the filter
    /// value must parse as the declared type.
    pub fn new(
        field_name: impl Into<String>,
        operator: FilterOperator,
        filter_value: impl Into<String>,
        filter_type: FilterType,
    ) -> Result<Self> {
        let filter = Self {
            field_name: field_name.into(),
            filter_value: filter_value.into(),
            filter_type,
            operator,
        };
        filter.check()?;
        Ok(filter)
    }

    /// Reject filters that can never be evaluated, however they were built.
    pub(crate) fn check(&self) -> Result<()> {
        if self.filter_type == FilterType::String && self.operator.is_ordering() {
            return Err(Error::unsupported_filter(format!(
                "operator '{}' is not supported on string field '{}'",
                self.operator, self.field_name
            )));
        }
        match self.filter_type {
            FilterType::String => {}
            FilterType::Number => {
                parse_number(&self.filter_value)?;
            }
            FilterType::Datetime => {
                parse_datetime(&self.filter_value)?;
            }
        }
        Ok(())
    }

    /// Evaluate the filter against one serialized entry.
    pub(crate) fn matches(&self, row: &Map<String, Value>) -> Result<bool> {
        let field = row.get(&self.field_name).ok_or_else(|| {
            Error::unsupported_filter(format!("unknown field '{}'", self.field_name))
        })?;

        let ordering = match self.filter_type {
            FilterType::String => as_text(field).cmp(&self.filter_value),
            FilterType::Number => {
                let lhs = match field {
                    Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                    other => parse_number(&as_text(other))?,
                };
                let rhs = parse_number(&self.filter_value)?;
                match lhs.partial_cmp(&rhs) {
                    Some(ordering) => ordering,
                    None => return Ok(false),
                }
            }
            FilterType::Datetime => {
                let lhs = parse_datetime(&as_text(field))?;
                let rhs = parse_datetime(&self.filter_value)?;
                lhs.cmp(&rhs)
            }
        };
        Ok(self.operator.accepts(ordering))
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_number(raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::unsupported_filter(format!("'{raw}' is not a number")))
}

fn parse_datetime(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::unsupported_filter(format!("'{raw}' is not an RFC 3339 datetime")))
}

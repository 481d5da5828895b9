//! CRM query rows and their scalar values.
//!
//! Rows come back from the CRM as loosely typed JSON objects. [`Record`]
//! keeps the scalar columns of a row and drops the `attributes` envelope and
//! any nested relationship objects, which the reporting transform never
//! reads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ArmLinkError, Result};

/// A single scalar column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Truthiness as the CRM payloads were designed around: null, `false`,
    /// zero, NaN and the empty string are all falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a JSON value, returning `None` for objects and arrays.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            // integral values print without a trailing `.0`
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One row returned by a CRM query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// Source-system id (`Id` column) when the query selected it.
    pub id: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful for fixtures.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        if name == "Id" {
            if let FieldValue::Text(id) = &value {
                self.id = Some(id.clone());
            }
        }
        self.fields.insert(name, value);
    }

    /// Looks a field up by API name. CRM field names are case-insensitive,
    /// so an exact match is tried first and then an ASCII case-folded one.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).or_else(|| {
            self.fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    /// Rendered text of a non-null field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_null()).map(ToString::to_string)
    }

    /// Builds a record from one element of a query response `records` array.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            ArmLinkError::Crm(format!("expected a record object, got {value}"))
        })?;

        let mut record = Self::new();
        for (name, raw) in object {
            if name == "attributes" {
                continue;
            }
            if let Some(field) = FieldValue::from_json(raw) {
                record.insert(name.clone(), field);
            }
        }
        Ok(record)
    }
}

/// One page of query results plus the cursor for the next page, if any.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPage {
    pub records: Vec<Record>,
    pub next_cursor: Option<String>,
}

impl QueryPage {
    pub fn last(records: Vec<Record>) -> Self {
        Self { records, next_cursor: None }
    }

    pub fn with_cursor(records: Vec<Record>, cursor: impl Into<String>) -> Self {
        Self { records, next_cursor: Some(cursor.into()) }
    }
}

//! Query filters and write payloads.
//!
//! `Filter` and `Record` carry column names plus bindable values. Column
//! and table names are validated identifiers interpolated into SQL text;
//! the values themselves are never interpolated, only numbered `$n`
//! placeholders are emitted and the values returned for binding.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::validation::{validate_identifier, IdentifierError};

/// A SQL-bindable scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<&Value> for SqlValue {
    /// Lossy conversion from JSON. Arrays and objects are carried as their
    /// JSON text since they have no scalar column representation.
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Comparison operators usable in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    IsNull,
    NotNull,
}

impl FilterOp {
    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Like => "LIKE",
            // rendered without a bound value
            Self::IsNull => "IS NULL",
            Self::NotNull => "IS NOT NULL",
        }
    }
}

/// A single column predicate.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: SqlValue,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, FilterOp::Ne, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, FilterOp::Gt, value)
    }

    pub fn ge(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, FilterOp::Ge, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, FilterOp::Lt, value)
    }

    pub fn le(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, FilterOp::Le, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Like, pattern.into())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOp::IsNull, SqlValue::Null)
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOp::NotNull, SqlValue::Null)
    }
}

/// Render filters into a `WHERE` clause (AND semantics) with placeholders
/// numbered from `start`. An empty slice renders to an empty string.
pub fn where_clause(
    filters: &[Filter],
    start: usize,
) -> Result<(String, Vec<SqlValue>), IdentifierError> {
    if filters.is_empty() {
        return Ok((String::new(), Vec::new()));
    }

    let mut sql = String::from(" WHERE ");
    let mut binds = Vec::new();

    for (i, filter) in filters.iter().enumerate() {
        if i > 0 {
            sql.push_str(" AND ");
        }
        let column = validate_identifier(&filter.column)?;
        sql.push_str(column);
        sql.push(' ');
        sql.push_str(filter.op.sql());
        match filter.op {
            FilterOp::IsNull | FilterOp::NotNull => {}
            _ => {
                sql.push_str(&format!(" ${}", start + binds.len()));
                binds.push(filter.value.clone());
            }
        }
    }

    Ok((sql, binds))
}

/// A write payload must be a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payload must be a JSON object")]
pub struct RecordError;

/// Ordered column -> value map for INSERT/UPDATE payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any earlier value for the same name.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let column = column.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == column) {
            entry.1 = value;
        } else {
            self.entries.push((column, value));
        }
        self
    }

    /// Build from a JSON value; anything other than an object is rejected.
    pub fn from_json(value: &Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(map) => {
                let mut record = Self::new();
                for (column, value) in map {
                    record = record.set(column.clone(), SqlValue::from(value));
                }
                Ok(record)
            }
            _ => Err(RecordError),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(String, SqlValue)] {
        &self.entries
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

use std::{fmt, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;

use crate::types::{
    FIELD_SEPARATOR, NULL_SENTINEL,
    error::{DatabaseError, Result},
    is_null_sentinel,
};

static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("static numeric pattern"));

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern"));

/// Declared type of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Double,
    Bool,
    /// `VARCHAR(n)` / `CHAR(n)` carry a length limit, `STRING` / `TEXT` do not.
    Varchar(Option<usize>),
    Date,
}

impl DataType {
    /// Parses a declared type such as `INTEGER`, `varchar(20)` or `DATE`.
    pub fn parse(type_text: &str) -> Result<DataType> {
        let upper = type_text.trim().to_ascii_uppercase();
        let (base, args) = match upper.find('(') {
            Some(open) => {
                let close = upper
                    .rfind(')')
                    .filter(|close| *close > open)
                    .ok_or_else(|| DatabaseError::UnsupportedDataType(type_text.to_string()))?;
                (upper[..open].trim(), Some(upper[open + 1..close].trim()))
            }
            None => (upper.as_str(), None),
        };

        let data_type = match base {
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" => DataType::Integer,
            "DOUBLE" | "FLOAT" | "REAL" | "DECIMAL" | "NUMERIC" => DataType::Double,
            "BOOL" | "BOOLEAN" => DataType::Bool,
            "VARCHAR" | "CHAR" => match args {
                Some(len) => DataType::Varchar(Some(len.parse().map_err(|_| {
                    DatabaseError::UnsupportedDataType(type_text.to_string())
                })?)),
                None => DataType::Varchar(None),
            },
            "STRING" | "TEXT" => DataType::Varchar(None),
            "DATE" => DataType::Date,
            _ => return Err(DatabaseError::UnsupportedDataType(type_text.to_string())),
        };

        // Only the character types and the decimal family take arguments.
        if args.is_some() && matches!(data_type, DataType::Integer | DataType::Bool | DataType::Date) {
            return Err(DatabaseError::UnsupportedDataType(type_text.to_string()));
        }
        Ok(data_type)
    }

    /// Converts a runtime value into its stored field text, validating it against this type.
    pub fn coerce(&self, column: &str, value: &Value) -> Result<String> {
        let mismatch = || DatabaseError::TypeMismatch {
            column: column.to_string(),
            expected: self.to_string(),
            actual: value.describe(),
        };

        let field = match (self, value) {
            (_, Value::Null) => return Ok(NULL_SENTINEL.to_string()),
            (DataType::Integer, Value::Integer(i)) => i.to_string(),
            (DataType::Integer, Value::Real(r))
                if r.fract() == 0.0 && *r >= i64::MIN as f64 && *r <= i64::MAX as f64 =>
            {
                (*r as i64).to_string()
            }
            (DataType::Double, Value::Integer(i)) => i.to_string(),
            (DataType::Double, Value::Real(r)) if r.is_finite() => r.to_string(),
            (DataType::Bool, Value::Boolean(b)) => b.to_string(),
            // Text that already spells a value of the type, e.g. a stored field or a quoted
            // number. Stored in canonical form, so '01' and 1 are the same key.
            (DataType::Integer, Value::Text(s)) => match s.trim().parse::<i64>() {
                Ok(i) => i.to_string(),
                Err(_) => return Err(mismatch()),
            },
            (DataType::Double, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(r) if r.is_finite() => r.to_string(),
                _ => return Err(mismatch()),
            },
            (DataType::Bool, Value::Text(s))
                if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") =>
            {
                s.to_ascii_lowercase()
            }
            (DataType::Varchar(limit), Value::Text(s)) => {
                if let Some(limit) = limit {
                    if s.chars().count() > *limit {
                        return Err(DatabaseError::TypeMismatch {
                            column: column.to_string(),
                            expected: self.to_string(),
                            actual: format!("string of length {}", s.chars().count()),
                        });
                    }
                }
                s.clone()
            }
            (DataType::Date, Value::Text(s)) if value.as_date().is_some() => s.clone(),
            _ => return Err(mismatch()),
        };

        check_storable(column, &field)?;
        Ok(field)
    }

    /// Whether an already-stored field is a legal value of this type.
    pub fn accepts_field(&self, field: &str) -> bool {
        if is_null_sentinel(field) {
            return true;
        }
        match self {
            DataType::Integer => field.parse::<i64>().is_ok(),
            DataType::Double => field.parse::<f64>().is_ok(),
            DataType::Bool => field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("false"),
            DataType::Varchar(Some(limit)) => field.chars().count() <= *limit,
            DataType::Varchar(None) => true,
            DataType::Date => Value::Text(field.to_string()).as_date().is_some(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Bool => write!(f, "BOOL"),
            DataType::Varchar(Some(len)) => write!(f, "VARCHAR({})", len),
            DataType::Varchar(None) => write!(f, "STRING"),
            DataType::Date => write!(f, "DATE"),
        }
    }
}

/// Rejects text that would corrupt the line-oriented file format or read back as NULL.
pub fn check_storable(column: &str, field: &str) -> Result<()> {
    if field.contains(FIELD_SEPARATOR) || field.contains('\n') || field.contains('\r') {
        return Err(DatabaseError::ReservedValue {
            column: column.to_string(),
            reason: "values may not contain the field separator or line breaks".to_string(),
        });
    }
    if is_null_sentinel(field) {
        return Err(DatabaseError::ReservedValue {
            column: column.to_string(),
            reason: format!("the text '{}' is the NULL marker, use NULL instead", field),
        });
    }
    Ok(())
}

/// Runtime operand produced by literals, stored fields and arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl Value {
    /// Reads a stored field; everything but the sentinel stays text until compared.
    pub fn from_field(field: &str) -> Value {
        if is_null_sentinel(field) {
            Value::Null
        } else {
            Value::Text(field.to_string())
        }
    }

    /// Parses a numeric literal, preferring integers.
    pub fn from_number(literal: &str) -> Option<Value> {
        if let Ok(i) = literal.parse::<i64>() {
            return Some(Value::Integer(i));
        }
        literal.parse::<f64>().ok().filter(|r| r.is_finite()).map(Value::Real)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used by comparisons: text only counts when it looks like `-?\d+(\.\d+)?`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(s) if NUMERIC_PATTERN.is_match(s.trim()) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric value used by arithmetic, keeping integers exact.
    pub fn to_numeric(&self) -> Option<Value> {
        match self {
            Value::Integer(_) | Value::Real(_) => Some(self.clone()),
            Value::Text(s) if NUMERIC_PATTERN.is_match(s.trim()) => Value::from_number(s.trim()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Text(s) if DATE_PATTERN.is_match(s.trim()) => {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
            }
            _ => None,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Real(r) => *r != 0.0,
            Value::Text(s) => s.eq_ignore_ascii_case("true") || s == "1",
            Value::Null => false,
        }
    }

    /// Short description used in type mismatch messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => format!("integer {}", i),
            Value::Real(r) => format!("number {}", r),
            Value::Boolean(b) => format!("boolean {}", b),
            Value::Text(s) => format!("string '{}'", s),
        }
    }

    /// Text as it appears in result tables and on disk.
    pub fn to_field(&self) -> String {
        match self {
            Value::Null => NULL_SENTINEL.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_field())
    }
}

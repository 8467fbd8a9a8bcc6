use crate::types::{FIELD_SEPARATOR, NULL_SENTINEL, error::DatabaseError, value::Value};

/// One line of a record file: positional, string-encoded fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    /// A row of `width` NULL fields.
    pub fn nulls(width: usize) -> Self {
        Self {
            values: vec![NULL_SENTINEL.to_string(); width],
        }
    }

    /// Splits a record line, keeping trailing empty fields.
    pub fn from_line(line: &str) -> Self {
        Self {
            values: line.split(FIELD_SEPARATOR).map(str::to_string).collect(),
        }
    }

    pub fn to_line(&self) -> String {
        let mut sep = [0u8; 4];
        self.values.join(FIELD_SEPARATOR.encode_utf8(&mut sep))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_value(&self, column_index: usize) -> Option<&str> {
        self.values.get(column_index).map(String::as_str)
    }

    /// Typed view of a field; missing positions read as NULL.
    pub fn value_at(&self, column_index: usize) -> Value {
        self.get_value(column_index)
            .map(Value::from_field)
            .unwrap_or(Value::Null)
    }

    pub fn set_value(&mut self, column_index: usize, value: String) -> Result<(), DatabaseError> {
        if column_index >= self.values.len() {
            return Err(DatabaseError::execution(format!(
                "column index {} out of bounds for row of width {}",
                column_index,
                self.values.len()
            )));
        }
        self.values[column_index] = value;
        Ok(())
    }

    pub fn push(&mut self, value: String) {
        self.values.push(value);
    }

    pub fn remove(&mut self, column_index: usize) -> Option<String> {
        (column_index < self.values.len()).then(|| self.values.remove(column_index))
    }
}

use std::sync::Arc;

use crate::error::{RelqError, Result};
use crate::value::{FromValue, Value};

/// One result row: column names shared across the result set, plus values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first column named `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Typed access by column name.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use relq_core::{Row, Value};
    ///
    /// let row = Row::new(Arc::from(["id".to_string()]), vec![Value::Integer(7)]);
    /// assert_eq!(row.get_as::<i64>("id").unwrap(), 7);
    /// assert!(row.get_as::<i64>("missing").is_err());
    /// ```
    pub fn get_as<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| RelqError::Mapping(format!("no column `{column}` in row")))?;
        T::from_value(value)
    }
}

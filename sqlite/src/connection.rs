//! rusqlite-backed [`Executor`].

use std::path::Path;
use std::sync::Arc;

use relq_core::{ExecutionError, Executor, Row, Value};
use rusqlite::{Connection, params_from_iter};

use crate::values::{SqlValue, from_value_ref};

/// Runs compiled relations on a single rusqlite connection.
///
/// ```
/// use relq_sqlite::SqliteExecutor;
/// use relq_core::{Executor, Value};
///
/// let db = SqliteExecutor::open_in_memory()?;
/// db.execute_batch("CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT);
///                   INSERT INTO posts (title) VALUES ('hello');")?;
/// let rows = db.execute("SELECT title FROM posts WHERE id = ?", &[Value::Integer(1)])?;
/// assert_eq!(rows[0].get("title"), Some(&Value::from("hello")));
/// # Ok::<(), relq_core::ExecutionError>(())
/// ```
#[derive(Debug)]
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExecutionError> {
        Connection::open(path)
            .map(Self::new)
            .map_err(ExecutionError::from_source)
    }

    pub fn open_in_memory() -> Result<Self, ExecutionError> {
        Connection::open_in_memory()
            .map(Self::new)
            .map_err(ExecutionError::from_source)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_inner(self) -> Connection {
        self.conn
    }

    /// Runs semicolon-separated statements without parameters, e.g. DDL.
    pub fn execute_batch(&self, sql: &str) -> Result<(), ExecutionError> {
        self.conn
            .execute_batch(sql)
            .map_err(ExecutionError::from_source)
    }
}

impl From<Connection> for SqliteExecutor {
    fn from(conn: Connection) -> Self {
        Self::new(conn)
    }
}

impl Executor for SqliteExecutor {
    fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, ExecutionError> {
        let mut stmt = self
            .conn
            .prepare_cached(sql)
            .map_err(ExecutionError::from_source)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = columns.len();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(SqlValue)))
            .map_err(ExecutionError::from_source)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().map_err(ExecutionError::from_source)? {
            let values = (0..width)
                .map(|index| row.get_ref(index).map(from_value_ref))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(ExecutionError::from_source)?;
            results.push(Row::new(Arc::clone(&columns), values));
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(rows = results.len(), columns = width, "relq.sqlite.rows");

        Ok(results)
    }
}

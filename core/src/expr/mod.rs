//! Composable filter expressions.
//!
//! Leaves are built through [`PredicateBuilder`] (schema-validated) or
//! [`Predicate::raw`] (placeholder-validated) and combined with [`and`],
//! [`or`], [`not`] or the `&`, `|` and `!` operators.

mod builder;
mod logical;
mod predicate;
mod raw;

use std::fmt;

pub use builder::PredicateBuilder;
pub(crate) use builder::walk;
pub use logical::{and, not, or};
pub use predicate::{ColumnResolver, CompareOp, Predicate};
pub use raw::RawFragment;

/// A column, optionally reached through a path of association names.
///
/// `"title"` is a root column; `"comments.guest.name"` is column `name` at
/// path `["comments", "guest"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    path: Vec<String>,
    column: String,
}

impl ColumnRef {
    pub fn root(column: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            column: column.into(),
        }
    }

    pub fn new<I, S>(path: I, column: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            column: column.into(),
        }
    }

    /// Splits a dotted name: everything before the last dot is the path.
    pub fn parse(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((path, column)) => Self::new(path.split('.'), column),
            None => Self::root(name),
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.path {
            write!(f, "{segment}.")?;
        }
        f.write_str(&self.column)
    }
}

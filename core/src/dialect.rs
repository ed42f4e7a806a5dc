//! SQL dialects and their rendering differences.

use std::borrow::Cow;
use std::fmt::Write;

use serde::Deserialize;

/// The SQL dialect a compiled statement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "sqlite3")]
    SQLite,
    #[serde(alias = "postgres")]
    PostgreSQL,
    MySQL,
}

impl Dialect {
    /// Renders a placeholder for this dialect with the given 1-based index.
    ///
    /// Returns `Cow::Borrowed("?")` for SQLite/MySQL (zero allocation),
    /// `Cow::Owned` for PostgreSQL numbered placeholders.
    ///
    /// # Examples
    /// - PostgreSQL: `$1`, `$2`, `$3`
    /// - SQLite/MySQL: `?`
    #[inline]
    pub fn render_placeholder(&self, index: usize) -> Cow<'static, str> {
        match self {
            Dialect::PostgreSQL => Cow::Owned(format!("${index}")),
            Dialect::SQLite | Dialect::MySQL => Cow::Borrowed("?"),
        }
    }

    /// Identifier quote character.
    #[inline]
    pub const fn quote(&self) -> char {
        match self {
            Dialect::MySQL => '`',
            Dialect::SQLite | Dialect::PostgreSQL => '"',
        }
    }

    /// The LIMIT value meaning "no limit", for dialects that cannot write a
    /// bare OFFSET.
    pub(crate) const fn unbounded_limit(&self) -> Option<&'static str> {
        match self {
            Dialect::SQLite => Some("-1"),
            Dialect::MySQL => Some("18446744073709551615"),
            Dialect::PostgreSQL => None,
        }
    }
}

/// Writes a placeholder directly into `buf` without allocating.
#[inline]
pub(crate) fn write_placeholder(dialect: Dialect, index: usize, buf: &mut impl Write) {
    match dialect {
        Dialect::PostgreSQL => {
            let _ = write!(buf, "${index}");
        }
        Dialect::SQLite | Dialect::MySQL => {
            let _ = buf.write_char('?');
        }
    }
}

use std::borrow::Cow;
use std::fmt::Write;

use crate::dialect::Dialect;
use crate::sql::tokens::Token;
use crate::value::Value;

/// A SQL chunk represents a part of an SQL statement.
///
/// - `Token` - SQL keywords and operators (SELECT, FROM, =, etc.)
/// - `Ident` - Quoted identifiers ("table_name", "column_name")
/// - `Raw` - Unquoted SQL text treated as a word (function calls, `1=0`)
/// - `Fragment` - Verbatim text from a raw condition template, carries its own spacing
/// - `Param` - Bound parameter value, rendered as a placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SQLChunk {
    /// SQL keywords and operators: SELECT, FROM, WHERE, =, AND, etc.
    Token(Token),

    /// Quoted identifier for table, column and alias names.
    /// Renders as: "name" (or `name` for MySQL)
    Ident(Cow<'static, str>),

    /// Raw SQL text (unquoted), spaced like a word.
    Raw(Cow<'static, str>),

    /// Raw text glued to its neighbours without automatic spacing.
    Fragment(Cow<'static, str>),

    /// Parameter value.
    /// Renders as: ? or $1 depending on the dialect
    Param(Value),
}

impl SQLChunk {
    /// Creates raw SQL text from a static string - const
    #[inline]
    pub const fn raw_static(text: &'static str) -> Self {
        Self::Raw(Cow::Borrowed(text))
    }

    /// Creates a quoted identifier from a runtime string
    #[inline]
    pub fn ident(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates raw SQL text from a runtime string
    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Raw(text.into())
    }

    /// Write chunk content to buffer. Parameters are handled by the caller,
    /// which owns placeholder numbering.
    pub(crate) fn write(&self, buf: &mut impl Write, dialect: Dialect) {
        match self {
            SQLChunk::Token(token) => {
                let _ = buf.write_str(token.as_str());
            }
            SQLChunk::Ident(name) => {
                let quote = dialect.quote();
                let _ = buf.write_char(quote);
                for c in name.chars() {
                    // Double embedded quote characters
                    if c == quote {
                        let _ = buf.write_char(quote);
                    }
                    let _ = buf.write_char(c);
                }
                let _ = buf.write_char(quote);
            }
            SQLChunk::Raw(text) | SQLChunk::Fragment(text) => {
                let _ = buf.write_str(text);
            }
            SQLChunk::Param(_) => {
                let _ = buf.write_char('?');
            }
        }
    }

    /// Whether this chunk is separated from other word-like chunks by a space.
    pub(crate) const fn is_word_like(&self) -> bool {
        match self {
            SQLChunk::Token(t) => !matches!(
                t,
                Token::LPAREN
                    | Token::RPAREN
                    | Token::COMMA
                    | Token::DOT
                    | Token::EQ
                    | Token::NE
                    | Token::LT
                    | Token::GT
                    | Token::LE
                    | Token::GE
            ),
            SQLChunk::Ident(_) | SQLChunk::Raw(_) | SQLChunk::Param(_) => true,
            SQLChunk::Fragment(_) => false,
        }
    }
}

impl From<Token> for SQLChunk {
    #[inline]
    fn from(value: Token) -> Self {
        SQLChunk::Token(value)
    }
}

impl From<Value> for SQLChunk {
    #[inline]
    fn from(value: Value) -> Self {
        SQLChunk::Param(value)
    }
}

//! The predicate tree and its rendering into SQL.

use crate::error::CompileError;
use crate::sql::{SQL, Token};
use crate::value::Value;

use super::{ColumnRef, RawFragment};

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
}

impl CompareOp {
    const fn token(self) -> Token {
        match self {
            CompareOp::Eq => Token::EQ,
            CompareOp::NotEq => Token::NE,
            CompareOp::Lt => Token::LT,
            CompareOp::Lte => Token::LE,
            CompareOp::Gt => Token::GT,
            CompareOp::Gte => Token::GE,
            CompareOp::Like => Token::LIKE,
        }
    }
}

/// Turns a column reference into a qualified SQL identifier.
///
/// Implemented by the compiler, which knows the root table and the aliases
/// chosen for every joined association path.
pub trait ColumnResolver {
    fn column_sql(&self, column: &ColumnRef) -> Result<SQL, CompileError>;
}

/// A node of a filter expression.
///
/// Values are held as [`Value`]s and always rendered as bound parameters.
/// Build leaves through [`PredicateBuilder`](super::PredicateBuilder) (which
/// validates columns) or [`Predicate::raw`], and combine them with
/// [`and`](super::and), [`or`](super::or), [`not`](super::not) or the
/// `&`, `|` and `!` operators.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: ColumnRef,
        op: CompareOp,
        value: Value,
    },
    Null {
        column: ColumnRef,
        negated: bool,
    },
    Range {
        column: ColumnRef,
        low: Value,
        high: Value,
    },
    In {
        column: ColumnRef,
        values: Vec<Value>,
        negated: bool,
    },
    Raw(RawFragment),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Escape hatch for textual conditions.
    ///
    /// `?` placeholders outside single-quoted literals are bound to `params`
    /// in order. The template is not checked against the schema, but the
    /// placeholder count is: a mismatch fails here, not at execution.
    ///
    /// ```
    /// use relq_core::{Predicate, Value};
    ///
    /// assert!(Predicate::raw("created_at < ?", [Value::from("2024-01-01")]).is_ok());
    /// assert!(Predicate::raw("created_at < ? AND id > ?", [Value::from(1)]).is_err());
    /// ```
    pub fn raw<I>(template: impl Into<String>, params: I) -> Result<Self, CompileError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        RawFragment::parse(template, params.into_iter().map(Into::into).collect()).map(Predicate::Raw)
    }

    /// Wraps this predicate in NOT.
    #[must_use]
    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Renders the predicate, resolving every column through `resolver`.
    pub fn to_sql(&self, resolver: &dyn ColumnResolver) -> Result<SQL, CompileError> {
        let sql = match self {
            Predicate::Compare { column, op, value } => resolver
                .column_sql(column)?
                .push(op.token())
                .append(SQL::param(value.clone())),
            Predicate::Null { column, negated } => {
                let sql = resolver.column_sql(column)?.push(Token::IS);
                if *negated {
                    sql.push(Token::NOT).push(Token::NULL)
                } else {
                    sql.push(Token::NULL)
                }
            }
            Predicate::Range { column, low, high } => resolver
                .column_sql(column)?
                .push(Token::BETWEEN)
                .append(SQL::param(low.clone()))
                .push(Token::AND)
                .append(SQL::param(high.clone())),
            // IN () is not valid SQL; an empty set matches nothing
            Predicate::In { values, negated, .. } if values.is_empty() => {
                SQL::raw(if *negated { "1=1" } else { "1=0" })
            }
            Predicate::In {
                column,
                values,
                negated,
            } => {
                let mut sql = resolver.column_sql(column)?;
                if *negated {
                    sql.push_mut(Token::NOT);
                }
                sql.push(Token::IN)
                    .append(SQL::param_list(values.iter().cloned()).parens())
            }
            Predicate::Raw(fragment) => fragment.sql().clone().parens(),
            Predicate::And(children) => combine(children, Token::AND, "1=1", resolver)?,
            Predicate::Or(children) => combine(children, Token::OR, "1=0", resolver)?,
            Predicate::Not(inner) => {
                let inner_sql = inner.to_sql(resolver)?;
                if inner.is_parenthesized() {
                    SQL::token(Token::NOT).append(inner_sql)
                } else {
                    SQL::token(Token::NOT).append(inner_sql.parens())
                }
            }
        };
        Ok(sql)
    }

    /// Whether the rendered form is already wrapped in parentheses.
    fn is_parenthesized(&self) -> bool {
        match self {
            Predicate::Raw(_) => true,
            Predicate::And(children) | Predicate::Or(children) => match children.as_slice() {
                [only] => only.is_parenthesized(),
                _ => children.len() > 1,
            },
            _ => false,
        }
    }

    /// Collects `root_column = value` pairs reachable through AND nodes.
    pub(crate) fn collect_equalities(&self, out: &mut Vec<(String, Value)>) {
        match self {
            Predicate::Compare {
                column,
                op: CompareOp::Eq,
                value,
            } if column.is_root() => {
                out.retain(|(name, _)| name != column.column());
                out.push((column.column().to_string(), value.clone()));
            }
            Predicate::Null {
                column,
                negated: false,
            } if column.is_root() => {
                out.retain(|(name, _)| name != column.column());
                out.push((column.column().to_string(), Value::Null));
            }
            Predicate::And(children) => {
                for child in children {
                    child.collect_equalities(out);
                }
            }
            _ => {}
        }
    }
}

fn combine(
    children: &[Predicate],
    separator: Token,
    identity: &'static str,
    resolver: &dyn ColumnResolver,
) -> Result<SQL, CompileError> {
    match children {
        [] => Ok(SQL::raw(identity)),
        [only] => only.to_sql(resolver),
        _ => {
            let parts = children
                .iter()
                .map(|child| child.to_sql(resolver))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SQL::join(parts, separator).parens())
        }
    }
}
